//! Types module
//!
//! This module contains the canonical representation of the types referenced by
//! expression trees. A [`Type`] is a cheap, reference-counted handle onto a
//! [`TypeKind`] description. Equality and hashing are structural, so two
//! independently built descriptions of `List`1<i32>` are the same type and are
//! interned once by the wire codec.
//!
//! Four shapes exist:
//! - named types, optionally qualified by the assembly (module) defining them;
//! - closed generic instantiations of a named definition;
//! - arrays, either single-dimensional vectors or rank-`n` arrays;
//! - records, an ordered list of named fields (optionally anonymous).
//!
//! Commonly used names (`i32`, `bool`, delegate definitions, ...) live in
//! [`known`].
use std::{fmt, sync::Arc};

use strum::EnumIs;

pub mod known;

/// A shareable handle onto a type description.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Type(Arc<TypeKind>);

/// Structural description of a type.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIs)]
pub enum TypeKind {
    /// A named type, e.g. `i32` or the generic definition ``List`1``.
    Simple {
        name: Box<str>,
        assembly: Option<Box<str>>,
    },

    /// A closed instantiation of a generic definition.
    Generic {
        definition: Type,
        arguments: Vec<Type>,
    },

    /// An array of `element`. A `rank` of `None` denotes a single-dimensional,
    /// zero-based vector; `Some(n)` a multi-dimensional array of rank `n`.
    Array { element: Type, rank: Option<u32> },

    /// A structural record. Field order is significant.
    Record {
        fields: Vec<(Box<str>, Type)>,
        anonymous: bool,
    },
}

impl Type {
    /// Wrap a raw description.
    pub fn new(kind: TypeKind) -> Self {
        Self(Arc::new(kind))
    }

    /// A named type without assembly qualification.
    pub fn simple(name: impl Into<Box<str>>) -> Self {
        Self::new(TypeKind::Simple {
            name: name.into(),
            assembly: None,
        })
    }

    /// A named type qualified by the assembly that defines it.
    pub fn qualified(name: impl Into<Box<str>>, assembly: impl Into<Box<str>>) -> Self {
        Self::new(TypeKind::Simple {
            name: name.into(),
            assembly: Some(assembly.into()),
        })
    }

    /// Instantiate the generic `definition` with `arguments`.
    pub fn generic(definition: Type, arguments: impl IntoIterator<Item = Type>) -> Self {
        Self::new(TypeKind::Generic {
            definition,
            arguments: arguments.into_iter().collect(),
        })
    }

    /// A single-dimensional vector of `element`.
    pub fn array(element: Type) -> Self {
        Self::new(TypeKind::Array {
            element,
            rank: None,
        })
    }

    /// A multi-dimensional array of `element` with the given `rank`.
    pub fn array_of_rank(element: Type, rank: u32) -> Self {
        Self::new(TypeKind::Array {
            element,
            rank: Some(rank),
        })
    }

    /// A named record type.
    pub fn record<N: Into<Box<str>>>(fields: impl IntoIterator<Item = (N, Type)>) -> Self {
        Self::new(TypeKind::Record {
            fields: fields.into_iter().map(|(n, t)| (n.into(), t)).collect(),
            anonymous: false,
        })
    }

    /// An anonymous record type.
    pub fn anonymous<N: Into<Box<str>>>(fields: impl IntoIterator<Item = (N, Type)>) -> Self {
        Self::new(TypeKind::Record {
            fields: fields.into_iter().map(|(n, t)| (n.into(), t)).collect(),
            anonymous: true,
        })
    }

    /// Access the structural description.
    pub fn kind(&self) -> &TypeKind {
        &self.0
    }

    /// Name of an unqualified named type.
    pub fn simple_name(&self) -> Option<&str> {
        match self.kind() {
            TypeKind::Simple {
                name,
                assembly: None,
            } => Some(name),
            _ => None,
        }
    }

    /// Element type of an array type.
    pub fn element_type(&self) -> Option<&Type> {
        match self.kind() {
            TypeKind::Array { element, .. } => Some(element),
            _ => None,
        }
    }

    /// Generic definition and arguments of an instantiated generic type.
    pub fn generic_parts(&self) -> Option<(&Type, &[Type])> {
        match self.kind() {
            TypeKind::Generic {
                definition,
                arguments,
            } => Some((definition, arguments.as_slice())),
            _ => None,
        }
    }
}

impl fmt::Debug for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Type({self})")
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            TypeKind::Simple { name, assembly } => match assembly {
                Some(assembly) => write!(f, "{name}@{assembly}"),
                None => write!(f, "{name}"),
            },
            TypeKind::Generic {
                definition,
                arguments,
            } => {
                write!(f, "{definition}<")?;
                for (i, arg) in arguments.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                write!(f, ">")
            }
            TypeKind::Array { element, rank } => match rank {
                None => write!(f, "{element}[]"),
                Some(rank) => {
                    write!(f, "{element}[")?;
                    for _ in 1..*rank {
                        write!(f, ",")?;
                    }
                    write!(f, "]")
                }
            },
            TypeKind::Record { fields, anonymous } => {
                if *anonymous {
                    write!(f, "new ")?;
                }
                write!(f, "{{")?;
                for (i, (name, ty)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, " {name}: {ty}")?;
                }
                write!(f, " }}")
            }
        }
    }
}
