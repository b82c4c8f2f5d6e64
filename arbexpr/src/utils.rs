use strum::EnumIs;
use thiserror::Error;

use crate::expr::UnaryOp;

/// Errors raised while assembling expression trees.
#[derive(Debug, Clone, PartialEq, Eq, Hash, EnumIs, Error)]
pub enum Error {
    /// A jump kind number outside of `0..=3`.
    #[error("Unknown jump kind `{0}`. Expected 0 (goto), 1 (return), 2 (break) or 3 (continue).")]
    InvalidGotoKind(u64),

    /// An array creation with explicit bounds must specify at least one bound.
    #[error("Array creation with bounds requires at least one bound expression.")]
    EmptyArrayBounds,

    /// The explicit delegate type of a lambda disagrees with its parameter list.
    #[error(
        "Delegate type `{delegate}` takes {expected} parameters, but the lambda declares {found}."
    )]
    DelegateArityMismatch {
        delegate: String,
        expected: usize,
        found: usize,
    },

    /// A custom method on an operator that cannot be user-defined.
    #[error("Operator `{0:?}` does not take an implementing method.")]
    MethodNotAccepted(UnaryOp),

    /// An explicit result type on an operator whose type is derived.
    #[error("Operator `{0:?}` derives its result type and takes no explicit one.")]
    UnexpectedResultType(UnaryOp),
}
