//! Expression trees for the arbor wire codec.
//!
//! The crate exposes an immutable, closed tree model:
//! - [`types::Type`]: structural type descriptors (named, generic, array, record);
//! - [`members::Member`]: constructors, methods, properties and fields of a type;
//! - [`variable::Parameter`] and [`variable::Label`]: identity handles for bound
//!   variables and jump targets;
//! - [`expr::Expr`]: one variant per node kind, with builders and result typing.
//!
//! Trees are plain values. Two trees can be compared modulo the identity of their
//! bound variables with [`equality::structurally_equal`].
pub mod equality;
pub mod expr;
pub mod members;
pub mod types;
pub mod utils;
pub mod value;
pub mod variable;

pub use expr::Expr;
pub use members::{Member, MemberKind};
pub use types::{Type, TypeKind};
pub use value::Value;
pub use variable::{Label, Parameter};
