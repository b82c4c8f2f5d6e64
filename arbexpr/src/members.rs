//! Member descriptors
//!
//! A [`Member`] identifies a constructor, method, property or field of a
//! declaring type by signature. Like [`Type`], members are value objects:
//! equality and hashing are structural.
use std::{fmt, sync::Arc};

use strum::{EnumDiscriminants, EnumIs};

use crate::types::Type;

/// A shareable handle onto a member description.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Member(Arc<MemberKind>);

/// Structural description of a member.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIs, EnumDiscriminants)]
#[strum_discriminants(name(MemberCategory))]
pub enum MemberKind {
    Constructor {
        declaring_type: Type,
        parameters: Vec<Type>,
    },
    Method {
        declaring_type: Type,
        name: Box<str>,
        parameters: Vec<Type>,
        return_type: Type,
        /// Type arguments of a generic method instantiation, empty otherwise.
        generic_arguments: Vec<Type>,
    },
    Property {
        declaring_type: Type,
        name: Box<str>,
        property_type: Type,
        /// Parameters of an indexed property, empty otherwise.
        index_parameters: Vec<Type>,
    },
    Field {
        declaring_type: Type,
        name: Box<str>,
        field_type: Type,
    },
}

impl Member {
    pub fn new(kind: MemberKind) -> Self {
        Self(Arc::new(kind))
    }

    pub fn constructor(declaring_type: Type, parameters: impl IntoIterator<Item = Type>) -> Self {
        Self::new(MemberKind::Constructor {
            declaring_type,
            parameters: parameters.into_iter().collect(),
        })
    }

    pub fn method(
        declaring_type: Type,
        name: impl Into<Box<str>>,
        parameters: impl IntoIterator<Item = Type>,
        return_type: Type,
    ) -> Self {
        Self::new(MemberKind::Method {
            declaring_type,
            name: name.into(),
            parameters: parameters.into_iter().collect(),
            return_type,
            generic_arguments: Vec::new(),
        })
    }

    /// Instantiate a generic method with `generic_arguments`. Parameter and
    /// return types are given already substituted.
    pub fn generic_method(
        declaring_type: Type,
        name: impl Into<Box<str>>,
        parameters: impl IntoIterator<Item = Type>,
        return_type: Type,
        generic_arguments: impl IntoIterator<Item = Type>,
    ) -> Self {
        Self::new(MemberKind::Method {
            declaring_type,
            name: name.into(),
            parameters: parameters.into_iter().collect(),
            return_type,
            generic_arguments: generic_arguments.into_iter().collect(),
        })
    }

    pub fn property(declaring_type: Type, name: impl Into<Box<str>>, property_type: Type) -> Self {
        Self::new(MemberKind::Property {
            declaring_type,
            name: name.into(),
            property_type,
            index_parameters: Vec::new(),
        })
    }

    /// An indexed property (indexer).
    pub fn indexer(
        declaring_type: Type,
        name: impl Into<Box<str>>,
        property_type: Type,
        index_parameters: impl IntoIterator<Item = Type>,
    ) -> Self {
        Self::new(MemberKind::Property {
            declaring_type,
            name: name.into(),
            property_type,
            index_parameters: index_parameters.into_iter().collect(),
        })
    }

    pub fn field(declaring_type: Type, name: impl Into<Box<str>>, field_type: Type) -> Self {
        Self::new(MemberKind::Field {
            declaring_type,
            name: name.into(),
            field_type,
        })
    }

    pub fn kind(&self) -> &MemberKind {
        &self.0
    }

    pub fn category(&self) -> MemberCategory {
        self.kind().into()
    }

    pub fn declaring_type(&self) -> &Type {
        match self.kind() {
            MemberKind::Constructor { declaring_type, .. }
            | MemberKind::Method { declaring_type, .. }
            | MemberKind::Property { declaring_type, .. }
            | MemberKind::Field { declaring_type, .. } => declaring_type,
        }
    }

    /// Member name, `None` for constructors.
    pub fn name(&self) -> Option<&str> {
        match self.kind() {
            MemberKind::Constructor { .. } => None,
            MemberKind::Method { name, .. }
            | MemberKind::Property { name, .. }
            | MemberKind::Field { name, .. } => Some(name),
        }
    }

    /// Type of the value obtained through the member: the field or property
    /// type, the method return type, or the constructed type.
    pub fn member_type(&self) -> &Type {
        match self.kind() {
            MemberKind::Constructor { declaring_type, .. } => declaring_type,
            MemberKind::Method { return_type, .. } => return_type,
            MemberKind::Property { property_type, .. } => property_type,
            MemberKind::Field { field_type, .. } => field_type,
        }
    }

    /// Parameter types of a constructor or method, index parameters of a
    /// property, nothing for a field.
    pub fn parameters(&self) -> &[Type] {
        match self.kind() {
            MemberKind::Constructor { parameters, .. } | MemberKind::Method { parameters, .. } => {
                parameters
            }
            MemberKind::Property {
                index_parameters, ..
            } => index_parameters,
            MemberKind::Field { .. } => &[],
        }
    }
}

impl fmt::Debug for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Member({self})")
    }
}

impl fmt::Display for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let write_list = |f: &mut fmt::Formatter<'_>, items: &[Type]| -> fmt::Result {
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{item}")?;
            }
            Ok(())
        };

        match self.kind() {
            MemberKind::Constructor {
                declaring_type,
                parameters,
            } => {
                write!(f, "{declaring_type}::new(")?;
                write_list(f, parameters)?;
                write!(f, ")")
            }
            MemberKind::Method {
                declaring_type,
                name,
                parameters,
                return_type,
                generic_arguments,
            } => {
                write!(f, "{declaring_type}::{name}")?;
                if !generic_arguments.is_empty() {
                    write!(f, "<")?;
                    write_list(f, generic_arguments)?;
                    write!(f, ">")?;
                }
                write!(f, "(")?;
                write_list(f, parameters)?;
                write!(f, ") -> {return_type}")
            }
            MemberKind::Property {
                declaring_type,
                name,
                property_type,
                index_parameters,
            } => {
                write!(f, "{declaring_type}::{name}")?;
                if !index_parameters.is_empty() {
                    write!(f, "[")?;
                    write_list(f, index_parameters)?;
                    write!(f, "]")?;
                }
                write!(f, ": {property_type}")
            }
            MemberKind::Field {
                declaring_type,
                name,
                field_type,
            } => write!(f, "{declaring_type}::{name}: {field_type}"),
        }
    }
}
