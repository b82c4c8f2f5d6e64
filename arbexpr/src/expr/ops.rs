//! Operator families
//!
//! Unary and binary nodes share their layout across operators; the operator
//! itself is a plain `Copy` enum.
use strum::{EnumIter, IntoStaticStr};

use crate::utils::Error;

/// Operators of [`super::UnaryExpr`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter, IntoStaticStr)]
pub enum UnaryOp {
    Negate,
    NegateChecked,
    UnaryPlus,
    Not,
    OnesComplement,
    IsTrue,
    IsFalse,
    Increment,
    Decrement,
    PreIncrementAssign,
    PreDecrementAssign,
    PostIncrementAssign,
    PostDecrementAssign,
    Convert,
    ConvertChecked,
    TypeAs,
    Quote,
    ArrayLength,
    Unbox,
}

impl UnaryOp {
    /// Operators whose result type is an explicit operand of the node.
    pub fn has_explicit_type(self) -> bool {
        matches!(
            self,
            UnaryOp::Convert | UnaryOp::ConvertChecked | UnaryOp::TypeAs | UnaryOp::Unbox
        )
    }

    /// Operators that may be implemented by a user-defined method.
    pub fn accepts_method(self) -> bool {
        !matches!(
            self,
            UnaryOp::TypeAs | UnaryOp::Quote | UnaryOp::ArrayLength | UnaryOp::Unbox
        )
    }

    /// Operators that write back to their operand.
    pub fn is_assignment(self) -> bool {
        matches!(
            self,
            UnaryOp::PreIncrementAssign
                | UnaryOp::PreDecrementAssign
                | UnaryOp::PostIncrementAssign
                | UnaryOp::PostDecrementAssign
        )
    }
}

/// Operators of [`super::BinaryExpr`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter, IntoStaticStr)]
pub enum BinaryOp {
    Add,
    AddChecked,
    Subtract,
    SubtractChecked,
    Multiply,
    MultiplyChecked,
    Divide,
    Modulo,
    Power,
    And,
    Or,
    ExclusiveOr,
    AndAlso,
    OrElse,
    LeftShift,
    RightShift,
    Equal,
    NotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    Coalesce,
    ArrayIndex,
    Assign,
    AddAssign,
    AddAssignChecked,
    SubtractAssign,
    SubtractAssignChecked,
    MultiplyAssign,
    MultiplyAssignChecked,
    DivideAssign,
    ModuloAssign,
    PowerAssign,
    AndAssign,
    OrAssign,
    ExclusiveOrAssign,
    LeftShiftAssign,
    RightShiftAssign,
}

impl BinaryOp {
    /// Comparisons, the only operators that carry a lifted-to-null flag.
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOp::Equal
                | BinaryOp::NotEqual
                | BinaryOp::LessThan
                | BinaryOp::LessThanOrEqual
                | BinaryOp::GreaterThan
                | BinaryOp::GreaterThanOrEqual
        )
    }

    /// Compound assignments such as `+=`.
    pub fn is_compound_assignment(self) -> bool {
        matches!(
            self,
            BinaryOp::AddAssign
                | BinaryOp::AddAssignChecked
                | BinaryOp::SubtractAssign
                | BinaryOp::SubtractAssignChecked
                | BinaryOp::MultiplyAssign
                | BinaryOp::MultiplyAssignChecked
                | BinaryOp::DivideAssign
                | BinaryOp::ModuloAssign
                | BinaryOp::PowerAssign
                | BinaryOp::AndAssign
                | BinaryOp::OrAssign
                | BinaryOp::ExclusiveOrAssign
                | BinaryOp::LeftShiftAssign
                | BinaryOp::RightShiftAssign
        )
    }

    /// Operators that may carry a conversion lambda: coalescing and compound
    /// assignments.
    pub fn accepts_conversion(self) -> bool {
        self == BinaryOp::Coalesce || self.is_compound_assignment()
    }

    /// Operators that may be implemented by a user-defined method.
    pub fn accepts_method(self) -> bool {
        !matches!(self, BinaryOp::ArrayIndex | BinaryOp::Assign)
    }
}

/// Flavour of a [`super::GotoExpr`]. The discriminant is the wire number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, EnumIter, IntoStaticStr)]
#[repr(u8)]
pub enum GotoKind {
    #[default]
    Goto = 0,
    Return = 1,
    Break = 2,
    Continue = 3,
}

impl GotoKind {
    pub fn number(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u64> for GotoKind {
    type Error = Error;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(GotoKind::Goto),
            1 => Ok(GotoKind::Return),
            2 => Ok(GotoKind::Break),
            3 => Ok(GotoKind::Continue),
            other => Err(Error::InvalidGotoKind(other)),
        }
    }
}
