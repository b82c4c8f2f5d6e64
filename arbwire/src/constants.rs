//! Constant transcoding
//!
//! The codec does not know how values of arbitrary types are represented on
//! the wire. For each distinct constant type it asks a [`ConstantCodec`] for a
//! lift function (value to wire) and a reduce function (wire to value), and
//! memoizes both for the rest of the session.
//!
//! Constants may embed whole expression trees ([`Value::Expr`]). Those are
//! handed back to the session through [`TreeLifter`] / [`TreeReducer`], which
//! either encode them into the enclosing context (merge mode) or produce an
//! independent envelope.
use std::rc::Rc;

use arbexpr::{Expr, Type, TypeKind, Value};
use serde_json::{Number, Value as Json};

use crate::error::{WireError, WireResult};

/// Encodes a tree embedded in a constant.
pub trait TreeLifter {
    fn lift_tree(&mut self, tree: &Expr) -> WireResult<Json>;
}

/// Decodes a tree embedded in a constant.
pub trait TreeReducer {
    fn reduce_tree(&mut self, wire: &Json) -> WireResult<Expr>;
}

pub type LiftFn = Rc<dyn Fn(&Value, &mut dyn TreeLifter) -> WireResult<Json>>;
pub type ReduceFn = Rc<dyn Fn(&Json, &mut dyn TreeReducer) -> WireResult<Value>>;

/// Factory of per-type constant transcoders.
pub trait ConstantCodec {
    fn lift_factory(&self, ty: &Type) -> WireResult<LiftFn>;
    fn reduce_factory(&self, ty: &Type) -> WireResult<ReduceFn>;
}

impl<C: ConstantCodec + ?Sized> ConstantCodec for &C {
    fn lift_factory(&self, ty: &Type) -> WireResult<LiftFn> {
        (**self).lift_factory(ty)
    }

    fn reduce_factory(&self, ty: &Type) -> WireResult<ReduceFn> {
        (**self).reduce_factory(ty)
    }
}

/// Plain JSON representation of constants.
///
/// Both directions follow the declared type:
/// - `bool`, integral, floating and `string` types expect the matching JSON
///   scalar;
/// - ``Nullable`1<T>`` and reference types also accept `null`;
/// - vectors are arrays of their element representation;
/// - ``Expression`1<D>`` holds an embedded tree;
/// - any other type is decoded dynamically from the JSON value, and holds
///   no embedded tree.
///
/// A value the declared type cannot hold is rejected when lifting.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonConstants;

fn constant_error(ty: &Type, message: impl Into<String>) -> WireError {
    WireError::Constant {
        ty: ty.to_string(),
        message: message.into(),
    }
}

fn lift_float(ty: &Type, f: f64) -> WireResult<Json> {
    Number::from_f64(f)
        .map(Json::Number)
        .ok_or_else(|| constant_error(ty, format!("non-finite float {f}")))
}

fn mismatch(ty: &Type, value: &Value) -> WireError {
    let found: &'static str = value.into();
    constant_error(ty, format!("`{found}` value does not fit the declared type"))
}

/// Lifts `value` the way [`reducer_for`] reads it back under `ty`, rejecting
/// values the reducer would not return.
fn lift_value(ty: &Type, value: &Value, lifter: &mut dyn TreeLifter) -> WireResult<Json> {
    if let Some(inner) = ty.nullable_underlying() {
        return match value {
            Value::Null => Ok(Json::Null),
            value => lift_value(inner, value, lifter),
        };
    }

    if ty.quoted_delegate().is_some() {
        return match value {
            Value::Null => Ok(Json::Null),
            Value::Expr(tree) => lifter.lift_tree(tree),
            value => Err(mismatch(ty, value)),
        };
    }

    if let TypeKind::Array {
        element,
        rank: None,
    } = ty.kind()
    {
        return match value {
            Value::Null => Ok(Json::Null),
            Value::Array(items) => items
                .iter()
                .map(|item| lift_value(element, item, lifter))
                .collect::<WireResult<_>>()
                .map(Json::Array),
            value => Err(mismatch(ty, value)),
        };
    }

    match value {
        Value::Null if ty.is_nullable_value() => Ok(Json::Null),
        Value::Bool(b) if ty.is_bool() => Ok(Json::Bool(*b)),
        Value::Int(i) if ty.is_integral() => Ok(Json::from(*i)),
        Value::Float(f) if ty.is_floating() => lift_float(ty, *f),
        Value::String(s) if ty.simple_name() == Some(arbexpr::types::known::STRING) => {
            Ok(Json::String(s.to_string()))
        }
        _ if is_scalar(ty) => Err(mismatch(ty, value)),
        value => lift_dynamic(ty, value),
    }
}

fn is_scalar(ty: &Type) -> bool {
    ty.is_bool()
        || ty.is_integral()
        || ty.is_floating()
        || ty.simple_name() == Some(arbexpr::types::known::STRING)
}

/// Values of types without a dedicated representation, read back by
/// [`reduce_dynamic`]. Embedded trees need ``Expression`1``.
fn lift_dynamic(ty: &Type, value: &Value) -> WireResult<Json> {
    match value {
        Value::Null => Ok(Json::Null),
        Value::Bool(b) => Ok(Json::Bool(*b)),
        Value::Int(i) => Ok(Json::from(*i)),
        Value::Float(f) => lift_float(ty, *f),
        Value::String(s) => Ok(Json::String(s.to_string())),
        Value::Array(items) => items
            .iter()
            .map(|item| lift_dynamic(ty, item))
            .collect::<WireResult<_>>()
            .map(Json::Array),
        Value::Expr(_) => Err(mismatch(ty, value)),
    }
}

fn reduce_dynamic(ty: &Type, wire: &Json) -> WireResult<Value> {
    Ok(match wire {
        Json::Null => Value::Null,
        Json::Bool(b) => Value::Bool(*b),
        Json::Number(n) => match n.as_i64() {
            Some(i) => Value::Int(i),
            None => Value::Float(
                n.as_f64()
                    .ok_or_else(|| constant_error(ty, format!("unrepresentable number {n}")))?,
            ),
        },
        Json::String(s) => Value::String(s.as_str().into()),
        Json::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| reduce_dynamic(ty, item))
                .collect::<WireResult<_>>()?,
        ),
        Json::Object(_) => return Err(constant_error(ty, "objects have no value representation")),
    })
}

fn reducer_for(ty: &Type) -> ReduceFn {
    let ty = ty.clone();

    if let Some(inner) = ty.nullable_underlying() {
        let inner = reducer_for(inner);
        return Rc::new(move |wire: &Json, reducer: &mut dyn TreeReducer| match wire {
            Json::Null => Ok(Value::Null),
            wire => inner(wire, reducer),
        });
    }

    if ty.quoted_delegate().is_some() {
        return Rc::new(move |wire: &Json, reducer: &mut dyn TreeReducer| match wire {
            Json::Null => Ok(Value::Null),
            wire => Ok(Value::Expr(Box::new(reducer.reduce_tree(wire)?))),
        });
    }

    if let TypeKind::Array {
        element,
        rank: None,
    } = ty.kind()
    {
        let element = reducer_for(element);
        return Rc::new(move |wire: &Json, reducer: &mut dyn TreeReducer| match wire {
            Json::Null => Ok(Value::Null),
            Json::Array(items) => items
                .iter()
                .map(|item| element(item, reducer))
                .collect::<WireResult<Vec<_>>>()
                .map(Value::Array),
            _ => Err(constant_error(&ty, "expected an array")),
        });
    }

    let nullable = ty.is_nullable_value();
    Rc::new(move |wire: &Json, _: &mut dyn TreeReducer| {
        let value = match wire {
            Json::Null if nullable => return Ok(Value::Null),
            Json::Null => None,
            _ if ty.is_bool() => wire.as_bool().map(Value::Bool),
            _ if ty.is_integral() => wire.as_i64().map(Value::Int),
            _ if ty.is_floating() => wire.as_f64().map(Value::Float),
            _ if ty.simple_name() == Some(arbexpr::types::known::STRING) => {
                wire.as_str().map(Value::from)
            }
            _ => return reduce_dynamic(&ty, wire),
        };
        value.ok_or_else(|| constant_error(&ty, format!("unexpected value {wire}")))
    })
}

impl ConstantCodec for JsonConstants {
    fn lift_factory(&self, ty: &Type) -> WireResult<LiftFn> {
        let ty = ty.clone();
        Ok(Rc::new(move |value: &Value, lifter: &mut dyn TreeLifter| lift_value(&ty, value, lifter)))
    }

    fn reduce_factory(&self, ty: &Type) -> WireResult<ReduceFn> {
        Ok(reducer_for(ty))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    struct NoTrees;

    impl TreeLifter for NoTrees {
        fn lift_tree(&mut self, _: &Expr) -> WireResult<Json> {
            Err(WireError::InvalidTree("unexpected tree".into()))
        }
    }

    impl TreeReducer for NoTrees {
        fn reduce_tree(&mut self, _: &Json) -> WireResult<Expr> {
            Err(WireError::InvalidTree("unexpected tree".into()))
        }
    }

    fn reduce(ty: &Type, wire: Json) -> WireResult<Value> {
        JsonConstants.reduce_factory(ty)?(&wire, &mut NoTrees)
    }

    #[test]
    fn scalars_follow_the_declared_type() {
        assert_eq!(reduce(&Type::i32(), json!(4)).unwrap(), Value::Int(4));
        assert_eq!(reduce(&Type::f64(), json!(4)).unwrap(), Value::Float(4.0));
        assert_eq!(reduce(&Type::string(), json!("a")).unwrap(), Value::from("a"));
        assert!(reduce(&Type::bool(), json!(1)).unwrap_err().is_constant());
        assert!(reduce(&Type::i32(), Json::Null).is_err());
        assert_eq!(reduce(&Type::string(), Json::Null).unwrap(), Value::Null);
    }

    #[test]
    fn lifting_checks_the_value_against_the_type() {
        let lift = |ty: &Type, value: Value| JsonConstants.lift_factory(ty)?(&value, &mut NoTrees);

        assert_eq!(lift(&Type::i32(), Value::Int(3)).unwrap(), json!(3));
        assert!(lift(&Type::f64(), Value::Int(3)).unwrap_err().is_constant());
        assert!(lift(&Type::i64(), Value::Float(3.0)).unwrap_err().is_constant());
        assert!(lift(&Type::bool(), Value::from("true")).unwrap_err().is_constant());
        assert!(lift(&Type::string(), Value::Bool(true)).unwrap_err().is_constant());
        assert!(lift(&Type::i32(), Value::Null).unwrap_err().is_constant());
        assert_eq!(lift(&Type::string(), Value::Null).unwrap(), Json::Null);

        let nullable = Type::nullable(Type::f64());
        assert_eq!(lift(&nullable, Value::Null).unwrap(), Json::Null);
        assert!(lift(&nullable, Value::Int(1)).unwrap_err().is_constant());

        let vector = Type::array(Type::i32());
        assert!(lift(&vector, Value::Int(1)).unwrap_err().is_constant());
        assert!(
            lift(&vector, Value::Array(vec![Value::Int(1), Value::Float(2.0)]))
                .unwrap_err()
                .is_constant()
        );
    }

    #[test]
    fn trees_need_a_quoted_type() {
        let tree = Value::from(Expr::int(7));
        for ty in [Type::object(), Type::array(Type::object()), Type::i32()] {
            let lift = JsonConstants.lift_factory(&ty).unwrap();
            assert!(lift(&tree, &mut NoTrees).unwrap_err().is_constant(), "{ty}");
        }
        let nested = Value::Array(vec![Value::Int(1), tree]);
        let lift = JsonConstants.lift_factory(&Type::object()).unwrap();
        assert!(lift(&nested, &mut NoTrees).unwrap_err().is_constant());

        let quoted = Type::expression(Type::i32());
        let lift = JsonConstants.lift_factory(&quoted).unwrap();
        assert!(lift(&Value::from(Expr::int(7)), &mut NoTrees).unwrap_err().is_invalid_tree());
        assert!(lift(&Value::Int(7), &mut NoTrees).unwrap_err().is_constant());
    }

    #[test]
    fn composite_types() {
        let nullable = Type::nullable(Type::i32());
        assert_eq!(reduce(&nullable, Json::Null).unwrap(), Value::Null);
        assert_eq!(reduce(&nullable, json!(3)).unwrap(), Value::Int(3));

        let vector = Type::array(Type::f64());
        assert_eq!(
            reduce(&vector, json!([1, 2.5])).unwrap(),
            Value::Array(vec![Value::Float(1.0), Value::Float(2.5)])
        );
        assert_eq!(
            reduce(&Type::object(), json!([true, 1, 1.5])).unwrap(),
            Value::Array(vec![Value::Bool(true), Value::Int(1), Value::Float(1.5)])
        );
    }

    #[test]
    fn lifting_rejects_non_finite_floats() {
        let lift = JsonConstants.lift_factory(&Type::f64()).unwrap();
        assert_eq!(lift(&Value::Float(0.5), &mut NoTrees).unwrap(), json!(0.5));
        assert!(lift(&Value::Float(f64::NAN), &mut NoTrees).is_err());
        let lift = JsonConstants.lift_factory(&Type::object()).unwrap();
        assert_eq!(
            lift(&Value::from(vec![1i64, 2]), &mut NoTrees).unwrap(),
            json!([1, 2])
        );
    }
}
