//! Identity handles for bound variables and jump targets.
//!
//! Unlike types and members, a [`Parameter`] or [`Label`] is compared by
//! identity: two parameters named `x` of type `i32` are different variables
//! unless they are clones of the same handle.
use std::{
    fmt,
    hash::{Hash, Hasher},
    sync::Arc,
};

use crate::types::Type;

#[derive(Debug)]
struct Binding {
    name: Option<Box<str>>,
    ty: Type,
}

macro_rules! identity_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone)]
        pub struct $name(Arc<Binding>);

        impl $name {
            pub fn new(ty: Type, name: Option<&str>) -> Self {
                Self(Arc::new(Binding {
                    name: name.map(Box::from),
                    ty,
                }))
            }

            pub fn named(ty: Type, name: &str) -> Self {
                Self::new(ty, Some(name))
            }

            pub fn unnamed(ty: Type) -> Self {
                Self::new(ty, None)
            }

            pub fn name(&self) -> Option<&str> {
                self.0.name.as_deref()
            }

            pub fn ty(&self) -> &Type {
                &self.0.ty
            }

            fn address(&self) -> usize {
                Arc::as_ptr(&self.0) as usize
            }
        }

        impl PartialEq for $name {
            fn eq(&self, other: &Self) -> bool {
                Arc::ptr_eq(&self.0, &other.0)
            }
        }

        impl Eq for $name {}

        impl Hash for $name {
            fn hash<H: Hasher>(&self, state: &mut H) {
                self.address().hash(state)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({self} @ {:#x})", stringify!($name), self.address())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                match self.name() {
                    Some(name) => write!(f, "{name}: {}", self.ty()),
                    None => write!(f, "_: {}", self.ty()),
                }
            }
        }
    };
}

identity_handle!(
    /// A variable declared by a lambda parameter list, a block or a catch handler.
    Parameter
);

identity_handle!(
    /// Target of `goto`, `break`, `continue` and `return` jumps.
    Label
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parameters_compare_by_identity() {
        let a = Parameter::named(Type::i32(), "x");
        let b = Parameter::named(Type::i32(), "x");
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
        assert_eq!(a.name(), Some("x"));
        assert_eq!(Label::unnamed(Type::void()).name(), None);
    }
}
