//! Versioned array notation for arbor expression trees.
//!
//! A tree is serialized into an envelope `{ "Context": ..., "Expression": ... }`.
//! The expression is a nest of JSON arrays, one per node, whose first element
//! is a short discriminator token; the context interns the types, members and
//! labels the nodes refer to by index. See [`encoder`] and [`decoder`] for the
//! two directions, [`conf::CodecOptions`] for the session options.
//!
//! ```
//! use arbexpr::{Expr, Parameter, Type};
//!
//! let x = Parameter::named(Type::i32(), "x");
//! let tree = Expr::lambda([x.clone()], Expr::add(Expr::parameter(&x), Expr::int(1)));
//! let text = arbwire::to_string(&tree).unwrap();
//! let back = arbwire::from_str(&text).unwrap();
//! assert!(arbexpr::equality::structurally_equal(&tree, &back));
//! ```
use arbexpr::Expr;
use serde_json::Value as Json;

pub mod conf;
pub mod constants;
pub mod context;
pub mod decoder;
pub mod discriminator;
pub mod encoder;
pub mod error;
pub mod magic;
pub mod scope;
pub mod version;
mod wire;

pub use conf::CodecOptions;
pub use constants::{ConstantCodec, JsonConstants};
pub use decoder::Decoder;
pub use encoder::Encoder;
pub use error::{WireError, WireResult};
pub use version::Version;

/// Reusable codec: a set of options and a constant transcoder.
///
/// Every call runs an independent session with its own context and scope.
#[derive(Debug, Clone, Default)]
pub struct Codec<C = JsonConstants> {
    options: CodecOptions,
    constants: C,
}

impl Codec {
    pub fn new(options: CodecOptions) -> Self {
        Self::with_constants(options, JsonConstants)
    }
}

impl<C: ConstantCodec> Codec<C> {
    pub fn with_constants(options: CodecOptions, constants: C) -> Self {
        Self { options, constants }
    }

    pub fn options(&self) -> &CodecOptions {
        &self.options
    }

    pub fn serialize(&self, tree: &Expr) -> WireResult<Json> {
        self.serialize_opt(Some(tree))
    }

    /// Serialize a possibly absent tree; `None` yields a `null` expression.
    pub fn serialize_opt(&self, tree: Option<&Expr>) -> WireResult<Json> {
        Encoder::new(self.options, &self.constants).serialize(tree)
    }

    /// Deserialize an envelope that must hold a tree.
    pub fn deserialize(&self, envelope: &Json) -> WireResult<Expr> {
        self.deserialize_opt(envelope)?
            .ok_or_else(|| WireError::malformed("envelope holds no expression", envelope))
    }

    pub fn deserialize_opt(&self, envelope: &Json) -> WireResult<Option<Expr>> {
        Decoder::deserialize(self.options, &self.constants, envelope)
    }

    /// Serialize to compact JSON text.
    pub fn to_string(&self, tree: &Expr) -> WireResult<String> {
        Ok(serde_json::to_string(&self.serialize(tree)?)?)
    }

    pub fn from_str(&self, text: &str) -> WireResult<Expr> {
        let envelope: Json = serde_json::from_str(text)?;
        self.deserialize(&envelope)
    }
}

fn codec() -> Codec {
    Codec::new(CodecOptions::default())
}

/// Serialize with default options.
pub fn serialize(tree: &Expr) -> WireResult<Json> {
    codec().serialize(tree)
}

pub fn serialize_opt(tree: Option<&Expr>) -> WireResult<Json> {
    codec().serialize_opt(tree)
}

/// Deserialize with default options.
pub fn deserialize(envelope: &Json) -> WireResult<Expr> {
    codec().deserialize(envelope)
}

pub fn deserialize_opt(envelope: &Json) -> WireResult<Option<Expr>> {
    codec().deserialize_opt(envelope)
}

pub fn to_string(tree: &Expr) -> WireResult<String> {
    codec().to_string(tree)
}

pub fn from_str(text: &str) -> WireResult<Expr> {
    codec().from_str(text)
}
