//! Discriminator table
//!
//! Every wire node is an array whose first element names its kind. The
//! forward direction (`kind -> token`) is a `match`, the reverse direction a
//! perfect hash map built at compile time. Both are checked against each other
//! in the tests below.
use arbexpr::expr::{BinaryOp, UnaryOp};
use phf::phf_map;
use strum::{EnumIter, IntoEnumIterator, IntoStaticStr};

/// Kind of a wire node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoStaticStr)]
pub enum NodeKind {
    Constant,
    Default,
    Parameter,
    Lambda,
    Conditional,
    Invoke,
    MemberAccess,
    Call,
    Index,
    New,
    MemberInit,
    ListInit,
    NewArrayInit,
    NewArrayBounds,
    Block,
    Goto,
    Label,
    Loop,
    Switch,
    Try,
    TypeIs,
    TypeEqual,
    Throw,
    Unary(UnaryOp),
    Binary(BinaryOp),
}

/// Kind of a member binding inside a member initializer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, IntoStaticStr)]
pub enum BindingKind {
    Assignment,
    MemberBinding,
    ListBinding,
}

static NODE_TOKENS: phf::Map<&'static str, NodeKind> = phf_map! {
    ":" => NodeKind::Constant,
    "df" => NodeKind::Default,
    "$" => NodeKind::Parameter,
    "=>" => NodeKind::Lambda,
    "?:" => NodeKind::Conditional,
    "()" => NodeKind::Invoke,
    "." => NodeKind::MemberAccess,
    ".()" => NodeKind::Call,
    "[.]" => NodeKind::Index,
    "new" => NodeKind::New,
    "{=}" => NodeKind::MemberInit,
    "{+}" => NodeKind::ListInit,
    "[]" => NodeKind::NewArrayInit,
    "[n]" => NodeKind::NewArrayBounds,
    "{}" => NodeKind::Block,
    "->" => NodeKind::Goto,
    "L:" => NodeKind::Label,
    "@" => NodeKind::Loop,
    "sw" => NodeKind::Switch,
    "try" => NodeKind::Try,
    "is" => NodeKind::TypeIs,
    "is=" => NodeKind::TypeEqual,
    "!!" => NodeKind::Throw,

    "u-" => NodeKind::Unary(UnaryOp::Negate),
    "u-$" => NodeKind::Unary(UnaryOp::NegateChecked),
    "u+" => NodeKind::Unary(UnaryOp::UnaryPlus),
    "!" => NodeKind::Unary(UnaryOp::Not),
    "~" => NodeKind::Unary(UnaryOp::OnesComplement),
    "?T" => NodeKind::Unary(UnaryOp::IsTrue),
    "?F" => NodeKind::Unary(UnaryOp::IsFalse),
    "1+" => NodeKind::Unary(UnaryOp::Increment),
    "1-" => NodeKind::Unary(UnaryOp::Decrement),
    "++_" => NodeKind::Unary(UnaryOp::PreIncrementAssign),
    "--_" => NodeKind::Unary(UnaryOp::PreDecrementAssign),
    "_++" => NodeKind::Unary(UnaryOp::PostIncrementAssign),
    "_--" => NodeKind::Unary(UnaryOp::PostDecrementAssign),
    "<:" => NodeKind::Unary(UnaryOp::Convert),
    "<:$" => NodeKind::Unary(UnaryOp::ConvertChecked),
    "as" => NodeKind::Unary(UnaryOp::TypeAs),
    "'" => NodeKind::Unary(UnaryOp::Quote),
    "#" => NodeKind::Unary(UnaryOp::ArrayLength),
    "ub" => NodeKind::Unary(UnaryOp::Unbox),

    "+" => NodeKind::Binary(BinaryOp::Add),
    "+$" => NodeKind::Binary(BinaryOp::AddChecked),
    "-" => NodeKind::Binary(BinaryOp::Subtract),
    "-$" => NodeKind::Binary(BinaryOp::SubtractChecked),
    "*" => NodeKind::Binary(BinaryOp::Multiply),
    "*$" => NodeKind::Binary(BinaryOp::MultiplyChecked),
    "/" => NodeKind::Binary(BinaryOp::Divide),
    "%" => NodeKind::Binary(BinaryOp::Modulo),
    "^^" => NodeKind::Binary(BinaryOp::Power),
    "&" => NodeKind::Binary(BinaryOp::And),
    "|" => NodeKind::Binary(BinaryOp::Or),
    "^" => NodeKind::Binary(BinaryOp::ExclusiveOr),
    "&&" => NodeKind::Binary(BinaryOp::AndAlso),
    "||" => NodeKind::Binary(BinaryOp::OrElse),
    "<<" => NodeKind::Binary(BinaryOp::LeftShift),
    ">>" => NodeKind::Binary(BinaryOp::RightShift),
    "==" => NodeKind::Binary(BinaryOp::Equal),
    "!=" => NodeKind::Binary(BinaryOp::NotEqual),
    "<" => NodeKind::Binary(BinaryOp::LessThan),
    "<=" => NodeKind::Binary(BinaryOp::LessThanOrEqual),
    ">" => NodeKind::Binary(BinaryOp::GreaterThan),
    ">=" => NodeKind::Binary(BinaryOp::GreaterThanOrEqual),
    "??" => NodeKind::Binary(BinaryOp::Coalesce),
    "[i]" => NodeKind::Binary(BinaryOp::ArrayIndex),
    "=" => NodeKind::Binary(BinaryOp::Assign),
    "+=" => NodeKind::Binary(BinaryOp::AddAssign),
    "+=$" => NodeKind::Binary(BinaryOp::AddAssignChecked),
    "-=" => NodeKind::Binary(BinaryOp::SubtractAssign),
    "-=$" => NodeKind::Binary(BinaryOp::SubtractAssignChecked),
    "*=" => NodeKind::Binary(BinaryOp::MultiplyAssign),
    "*=$" => NodeKind::Binary(BinaryOp::MultiplyAssignChecked),
    "/=" => NodeKind::Binary(BinaryOp::DivideAssign),
    "%=" => NodeKind::Binary(BinaryOp::ModuloAssign),
    "^^=" => NodeKind::Binary(BinaryOp::PowerAssign),
    "&=" => NodeKind::Binary(BinaryOp::AndAssign),
    "|=" => NodeKind::Binary(BinaryOp::OrAssign),
    "^=" => NodeKind::Binary(BinaryOp::ExclusiveOrAssign),
    "<<=" => NodeKind::Binary(BinaryOp::LeftShiftAssign),
    ">>=" => NodeKind::Binary(BinaryOp::RightShiftAssign),
};

impl NodeKind {
    pub fn token(self) -> &'static str {
        match self {
            NodeKind::Constant => ":",
            NodeKind::Default => "df",
            NodeKind::Parameter => "$",
            NodeKind::Lambda => "=>",
            NodeKind::Conditional => "?:",
            NodeKind::Invoke => "()",
            NodeKind::MemberAccess => ".",
            NodeKind::Call => ".()",
            NodeKind::Index => "[.]",
            NodeKind::New => "new",
            NodeKind::MemberInit => "{=}",
            NodeKind::ListInit => "{+}",
            NodeKind::NewArrayInit => "[]",
            NodeKind::NewArrayBounds => "[n]",
            NodeKind::Block => "{}",
            NodeKind::Goto => "->",
            NodeKind::Label => "L:",
            NodeKind::Loop => "@",
            NodeKind::Switch => "sw",
            NodeKind::Try => "try",
            NodeKind::TypeIs => "is",
            NodeKind::TypeEqual => "is=",
            NodeKind::Throw => "!!",
            NodeKind::Unary(op) => unary_token(op),
            NodeKind::Binary(op) => binary_token(op),
        }
    }

    pub fn from_token(token: &str) -> Option<NodeKind> {
        NODE_TOKENS.get(token).copied()
    }

    /// Human-readable name used in diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            NodeKind::Unary(op) => op.into(),
            NodeKind::Binary(op) => op.into(),
            other => other.into(),
        }
    }

    /// Every node kind, operators included.
    pub fn all() -> impl Iterator<Item = NodeKind> {
        const STRUCTURAL: [NodeKind; 23] = [
            NodeKind::Constant,
            NodeKind::Default,
            NodeKind::Parameter,
            NodeKind::Lambda,
            NodeKind::Conditional,
            NodeKind::Invoke,
            NodeKind::MemberAccess,
            NodeKind::Call,
            NodeKind::Index,
            NodeKind::New,
            NodeKind::MemberInit,
            NodeKind::ListInit,
            NodeKind::NewArrayInit,
            NodeKind::NewArrayBounds,
            NodeKind::Block,
            NodeKind::Goto,
            NodeKind::Label,
            NodeKind::Loop,
            NodeKind::Switch,
            NodeKind::Try,
            NodeKind::TypeIs,
            NodeKind::TypeEqual,
            NodeKind::Throw,
        ];
        STRUCTURAL
            .into_iter()
            .chain(UnaryOp::iter().map(NodeKind::Unary))
            .chain(BinaryOp::iter().map(NodeKind::Binary))
    }
}

pub fn unary_token(op: UnaryOp) -> &'static str {
    match op {
        UnaryOp::Negate => "u-",
        UnaryOp::NegateChecked => "u-$",
        UnaryOp::UnaryPlus => "u+",
        UnaryOp::Not => "!",
        UnaryOp::OnesComplement => "~",
        UnaryOp::IsTrue => "?T",
        UnaryOp::IsFalse => "?F",
        UnaryOp::Increment => "1+",
        UnaryOp::Decrement => "1-",
        UnaryOp::PreIncrementAssign => "++_",
        UnaryOp::PreDecrementAssign => "--_",
        UnaryOp::PostIncrementAssign => "_++",
        UnaryOp::PostDecrementAssign => "_--",
        UnaryOp::Convert => "<:",
        UnaryOp::ConvertChecked => "<:$",
        UnaryOp::TypeAs => "as",
        UnaryOp::Quote => "'",
        UnaryOp::ArrayLength => "#",
        UnaryOp::Unbox => "ub",
    }
}

pub fn binary_token(op: BinaryOp) -> &'static str {
    match op {
        BinaryOp::Add => "+",
        BinaryOp::AddChecked => "+$",
        BinaryOp::Subtract => "-",
        BinaryOp::SubtractChecked => "-$",
        BinaryOp::Multiply => "*",
        BinaryOp::MultiplyChecked => "*$",
        BinaryOp::Divide => "/",
        BinaryOp::Modulo => "%",
        BinaryOp::Power => "^^",
        BinaryOp::And => "&",
        BinaryOp::Or => "|",
        BinaryOp::ExclusiveOr => "^",
        BinaryOp::AndAlso => "&&",
        BinaryOp::OrElse => "||",
        BinaryOp::LeftShift => "<<",
        BinaryOp::RightShift => ">>",
        BinaryOp::Equal => "==",
        BinaryOp::NotEqual => "!=",
        BinaryOp::LessThan => "<",
        BinaryOp::LessThanOrEqual => "<=",
        BinaryOp::GreaterThan => ">",
        BinaryOp::GreaterThanOrEqual => ">=",
        BinaryOp::Coalesce => "??",
        BinaryOp::ArrayIndex => "[i]",
        BinaryOp::Assign => "=",
        BinaryOp::AddAssign => "+=",
        BinaryOp::AddAssignChecked => "+=$",
        BinaryOp::SubtractAssign => "-=",
        BinaryOp::SubtractAssignChecked => "-=$",
        BinaryOp::MultiplyAssign => "*=",
        BinaryOp::MultiplyAssignChecked => "*=$",
        BinaryOp::DivideAssign => "/=",
        BinaryOp::ModuloAssign => "%=",
        BinaryOp::PowerAssign => "^^=",
        BinaryOp::AndAssign => "&=",
        BinaryOp::OrAssign => "|=",
        BinaryOp::ExclusiveOrAssign => "^=",
        BinaryOp::LeftShiftAssign => "<<=",
        BinaryOp::RightShiftAssign => ">>=",
    }
}

impl BindingKind {
    pub fn token(self) -> &'static str {
        match self {
            BindingKind::Assignment => ".=",
            BindingKind::MemberBinding => ".{",
            BindingKind::ListBinding => ".+",
        }
    }

    pub fn from_token(token: &str) -> Option<BindingKind> {
        match token {
            ".=" => Some(BindingKind::Assignment),
            ".{" => Some(BindingKind::MemberBinding),
            ".+" => Some(BindingKind::ListBinding),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn node_tokens_are_bijective() {
        let mut seen = HashSet::new();
        for kind in NodeKind::all() {
            let token = kind.token();
            assert!((1..=3).contains(&token.chars().count()), "{token}");
            assert!(seen.insert(token), "duplicate token {token}");
            assert_eq!(NodeKind::from_token(token), Some(kind));
        }
        assert_eq!(seen.len(), NODE_TOKENS.len());
    }

    #[test]
    fn binding_tokens_are_bijective() {
        let mut seen = HashSet::new();
        for kind in BindingKind::iter() {
            assert!(seen.insert(kind.token()));
            assert_eq!(BindingKind::from_token(kind.token()), Some(kind));
        }
        assert_eq!(BindingKind::from_token("???"), None);
    }

    #[test]
    fn unknown_tokens() {
        assert_eq!(NodeKind::from_token("???"), None);
        assert_eq!(NodeKind::from_token(""), None);
        assert_eq!(NodeKind::Binary(BinaryOp::AddAssignChecked).name(), "AddAssignChecked");
    }
}
