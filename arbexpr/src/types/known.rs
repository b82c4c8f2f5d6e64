//! Well-known types
//!
//! Primitive types are plain named types. Delegates follow the `Func`/`Action`
//! convention: ``Func`N`` takes `N - 1` parameters followed by the return type,
//! ``Action`N`` takes `N` parameters (and the non-generic `Action` none).
use super::{Type, TypeKind};

pub const VOID: &str = "void";
pub const BOOL: &str = "bool";
pub const I32: &str = "i32";
pub const I64: &str = "i64";
pub const F64: &str = "f64";
pub const STRING: &str = "string";
pub const OBJECT: &str = "object";
pub const NULLABLE: &str = "Nullable`1";
pub const EXPRESSION: &str = "Expression`1";
pub const ACTION: &str = "Action";

const FUNC_PREFIX: &str = "Func`";
const ACTION_PREFIX: &str = "Action`";

/// Integral type names understood by [`Type::is_integral`].
pub const INTEGRAL: [&str; 8] = ["i8", "i16", "i32", "i64", "u8", "u16", "u32", "u64"];

/// Floating-point type names understood by [`Type::is_floating`].
pub const FLOATING: [&str; 2] = ["f32", "f64"];

impl Type {
    pub fn void() -> Self {
        Self::simple(VOID)
    }

    pub fn bool() -> Self {
        Self::simple(BOOL)
    }

    pub fn i32() -> Self {
        Self::simple(I32)
    }

    pub fn i64() -> Self {
        Self::simple(I64)
    }

    pub fn f64() -> Self {
        Self::simple(F64)
    }

    pub fn string() -> Self {
        Self::simple(STRING)
    }

    pub fn object() -> Self {
        Self::simple(OBJECT)
    }

    /// ``Nullable`1<inner>``
    pub fn nullable(inner: Type) -> Self {
        Self::generic(Self::simple(NULLABLE), [inner])
    }

    /// ``Expression`1<delegate>``, the type of a quoted lambda.
    pub fn expression(delegate: Type) -> Self {
        Self::generic(Self::simple(EXPRESSION), [delegate])
    }

    /// Delegate type returning `ret` from `params`.
    pub fn func(params: impl IntoIterator<Item = Type>, ret: Type) -> Self {
        let mut arguments: Vec<Type> = params.into_iter().collect();
        arguments.push(ret);
        Self::generic(
            Self::simple(format!("{FUNC_PREFIX}{}", arguments.len())),
            arguments,
        )
    }

    /// Delegate type returning nothing from `params`.
    pub fn action(params: impl IntoIterator<Item = Type>) -> Self {
        let arguments: Vec<Type> = params.into_iter().collect();
        if arguments.is_empty() {
            return Self::simple(ACTION);
        }
        Self::generic(
            Self::simple(format!("{ACTION_PREFIX}{}", arguments.len())),
            arguments,
        )
    }

    /// The delegate type a lambda with the given signature has when none is
    /// specified explicitly.
    pub fn delegate_for(params: impl IntoIterator<Item = Type>, ret: Type) -> Self {
        if ret.is_void() {
            Self::action(params)
        } else {
            Self::func(params, ret)
        }
    }

    /// Parameter types and return type of a `Func`/`Action` delegate type.
    pub fn delegate_signature(&self) -> Option<(&[Type], Type)> {
        if self.simple_name() == Some(ACTION) {
            let none: &[Type] = &[];
            return Some((none, Self::void()));
        }
        let (definition, arguments) = self.generic_parts()?;
        let name = definition.simple_name()?;
        if name.starts_with(FUNC_PREFIX) {
            let (ret, params) = arguments.split_last()?;
            Some((params, ret.clone()))
        } else if name.starts_with(ACTION_PREFIX) {
            Some((arguments, Self::void()))
        } else {
            None
        }
    }

    pub fn is_void(&self) -> bool {
        self.simple_name() == Some(VOID)
    }

    pub fn is_bool(&self) -> bool {
        self.simple_name() == Some(BOOL)
    }

    pub fn is_integral(&self) -> bool {
        self.simple_name().is_some_and(|n| INTEGRAL.contains(&n))
    }

    pub fn is_floating(&self) -> bool {
        self.simple_name().is_some_and(|n| FLOATING.contains(&n))
    }

    /// Underlying type of ``Nullable`1<T>``.
    pub fn nullable_underlying(&self) -> Option<&Type> {
        match self.generic_parts() {
            Some((definition, [inner])) if definition.simple_name() == Some(NULLABLE) => {
                Some(inner)
            }
            _ => None,
        }
    }

    /// Delegate type of ``Expression`1<T>``.
    pub fn quoted_delegate(&self) -> Option<&Type> {
        match self.generic_parts() {
            Some((definition, [delegate])) if definition.simple_name() == Some(EXPRESSION) => {
                Some(delegate)
            }
            _ => None,
        }
    }

    /// Whether values of this type may be null.
    pub fn is_nullable_value(&self) -> bool {
        match self.kind() {
            TypeKind::Simple { .. } => {
                !(self.is_bool() || self.is_integral() || self.is_floating() || self.is_void())
            }
            TypeKind::Generic { .. } | TypeKind::Array { .. } | TypeKind::Record { .. } => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delegate_signatures_roundtrip() {
        let f = Type::func([Type::i32(), Type::string()], Type::bool());
        let (params, ret) = f.delegate_signature().unwrap();
        assert_eq!(params, &[Type::i32(), Type::string()]);
        assert_eq!(ret, Type::bool());

        let a = Type::action([Type::i32()]);
        let (params, ret) = a.delegate_signature().unwrap();
        assert_eq!(params, &[Type::i32()]);
        assert!(ret.is_void());

        let empty = Type::action([]);
        let (params, ret) = empty.delegate_signature().unwrap();
        assert!(params.is_empty());
        assert!(ret.is_void());

        assert!(Type::i32().delegate_signature().is_none());
    }

    #[test]
    fn nullable_underlying_is_recovered() {
        let n = Type::nullable(Type::i32());
        assert_eq!(n.nullable_underlying(), Some(&Type::i32()));
        assert!(Type::i32().nullable_underlying().is_none());
    }
}
