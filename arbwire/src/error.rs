use serde_json::Value as Json;
use strum::EnumIs;
use thiserror::Error;

use crate::{context::IndexSpace, version::Version};

/// Errors raised while encoding or decoding.
///
/// Grammar and reference errors keep a copy of the offending wire node, see
/// [`WireError::node`] and [`WireError::render`].
#[derive(Debug, Error, EnumIs)]
pub enum WireError {
    /// Wrong shape: not an array, missing discriminator, a field of the wrong
    /// JSON type, a malformed envelope or descriptor.
    #[error("Malformed node: {message}.")]
    Malformed { message: String, node: Json },

    #[error("Unknown discriminator `{token}`.")]
    UnknownDiscriminator { token: String, node: Json },

    #[error("Node `{kind}` has {found} elements, expected {expected}.")]
    Arity {
        kind: &'static str,
        found: usize,
        expected: String,
        node: Json,
    },

    #[error("{space} index {index} is out of range (the context holds {len} entries).")]
    IndexOutOfRange {
        space: IndexSpace,
        index: u64,
        len: usize,
        node: Json,
    },

    #[error("{space} entry {index} refers to itself.")]
    SelfReference {
        space: IndexSpace,
        index: usize,
        node: Json,
    },

    /// A parameter reference that matches no declaration in scope.
    #[error("Variable `{name}` (skip {skip}) is not declared in any enclosing scope.")]
    UnresolvedVariable { name: String, skip: u64, node: Json },

    /// A parameter used outside of the constructs that declare it.
    #[error("Parameter `{name}` is referenced outside of its declaring scope.")]
    UnboundParameter { name: String },

    #[error("{construct} is not supported by wire version {version}.")]
    UnsupportedByVersion {
        construct: &'static str,
        version: Version,
    },

    #[error("Cannot transcode constant of type `{ty}`: {message}.")]
    Constant { ty: String, message: String },

    /// The tree violates an invariant of the node model.
    #[error("Invalid expression tree: {0}.")]
    InvalidTree(String),

    #[error("Maximum nesting depth of {limit} exceeded.")]
    DepthExceeded { limit: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse codec configuration '{file}': {source}")]
    Config {
        source: toml::de::Error,
        file: String,
    },

    #[error("Failed to serialize codec configuration to '{path}': {source}")]
    ConfigSerialize {
        source: toml::ser::Error,
        path: String,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type WireResult<T> = Result<T, WireError>;

impl WireError {
    pub(crate) fn malformed(message: impl Into<String>, node: &Json) -> Self {
        WireError::Malformed {
            message: message.into(),
            node: node.clone(),
        }
    }

    /// The wire node the error refers to, if any.
    pub fn node(&self) -> Option<&Json> {
        match self {
            WireError::Malformed { node, .. }
            | WireError::UnknownDiscriminator { node, .. }
            | WireError::Arity { node, .. }
            | WireError::IndexOutOfRange { node, .. }
            | WireError::SelfReference { node, .. }
            | WireError::UnresolvedVariable { node, .. } => Some(node),
            _ => None,
        }
    }

    /// Errors caused by input that does not follow the wire grammar.
    pub fn is_grammar(&self) -> bool {
        matches!(
            self,
            WireError::Malformed { .. }
                | WireError::UnknownDiscriminator { .. }
                | WireError::Arity { .. }
        )
    }

    /// Errors caused by a dangling context index or variable reference.
    pub fn is_reference(&self) -> bool {
        matches!(
            self,
            WireError::IndexOutOfRange { .. }
                | WireError::SelfReference { .. }
                | WireError::UnresolvedVariable { .. }
                | WireError::UnboundParameter { .. }
        )
    }

    /// Message followed by the pretty-printed offending node.
    pub fn render(&self) -> String {
        match self.node() {
            Some(node) => {
                let pretty = serde_json::to_string_pretty(node).unwrap_or_else(|_| node.to_string());
                format!("{self}\n  --> {}", pretty.replace('\n', "\n      "))
            }
            None => self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn render_includes_node() {
        let err = WireError::UnknownDiscriminator {
            token: "???".into(),
            node: json!(["???", 1, 2]),
        };
        assert!(err.is_grammar());
        assert!(!err.is_reference());
        let rendered = err.render();
        assert!(rendered.starts_with("Unknown discriminator `???`."));
        assert!(rendered.contains("\"???\""));
    }

    #[test]
    fn classification() {
        let err = WireError::UnsupportedByVersion {
            construct: "Indexer access",
            version: Version::V0_8,
        };
        assert!(err.is_unsupported_by_version());
        assert!(!err.is_grammar());
        assert!(err.node().is_none());
        assert_eq!(
            err.to_string(),
            "Indexer access is not supported by wire version 0.8."
        );
    }
}
