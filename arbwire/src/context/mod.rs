//! Context: the interning table of an envelope.
//!
//! Types, members and labels referenced by a tree are stored once in three
//! index spaces and referred to by position. The [`ContextWriter`] assigns
//! indices in first-use order while encoding; the [`ContextReader`] resolves
//! descriptors lazily while decoding and caches the result per index.
//!
//! A descriptor only mentions entries that were interned before it: a generic
//! type lists its definition and arguments first, a member its declaring type
//! and signature types.
use strum::{Display, EnumIter};

pub mod reader;
pub mod writer;

pub use reader::ContextReader;
pub use writer::ContextWriter;

/// One of the three index spaces of a context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum IndexSpace {
    #[strum(serialize = "Type")]
    Types,
    #[strum(serialize = "Member")]
    Members,
    #[strum(serialize = "Label")]
    Labels,
}
