//! Expression nodes
//!
//! [`Expr`] is a closed tagged union over every node kind understood by the
//! wire codec. Each variant wraps a small node structure with public fields,
//! so trees are easy to build and inspect; the associated constructors in
//! [`builders`] cover the common shapes.
//!
//! Every node has a result type (see [`Expr::ty`]). Nodes whose type cannot be
//! derived from their children store it explicitly; for those, the
//! `natural_type` helpers in [`typing`] report the type a node would have
//! without an explicit annotation.
use strum::{EnumDiscriminants, EnumIs, EnumTryAs};

use crate::{
    members::Member,
    types::Type,
    value::Value,
    variable::{Label, Parameter},
};

pub mod builders;
pub mod ops;
pub mod typing;

pub use ops::{BinaryOp, GotoKind, UnaryOp};

/// Discriminated union covering all expression node kinds.
///
/// The generated [`ExprKind`] discriminant (via `strum`) allows cheap
/// classification without matching on payloads.
#[derive(Debug, Clone, PartialEq, EnumIs, EnumTryAs, EnumDiscriminants)]
#[strum_discriminants(name(ExprKind))]
#[strum_discriminants(derive(Hash, strum::EnumIter, strum::IntoStaticStr))]
pub enum Expr {
    Constant(ConstantExpr),
    Default(Type),
    Unary(UnaryExpr),
    Binary(BinaryExpr),
    Conditional(ConditionalExpr),
    Lambda(LambdaExpr),
    Parameter(Parameter),
    Index(IndexExpr),
    Invoke(InvokeExpr),
    MemberAccess(MemberExpr),
    Call(CallExpr),
    New(NewExpr),
    MemberInit(MemberInitExpr),
    ListInit(ListInitExpr),
    NewArrayInit(NewArrayExpr),
    NewArrayBounds(NewArrayExpr),
    Block(BlockExpr),
    Goto(GotoExpr),
    Label(LabelExpr),
    Loop(LoopExpr),
    Switch(SwitchExpr),
    Try(TryExpr),
    TypeIs(TypeBinaryExpr),
    TypeEqual(TypeBinaryExpr),
    Throw(ThrowExpr),
}

/// A value of a given type.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstantExpr {
    pub value: Value,
    pub ty: Type,
}

/// Unary operation. `ty` is present exactly for operators with an explicit
/// result type (see [`UnaryOp::has_explicit_type`]).
#[derive(Debug, Clone, PartialEq)]
pub struct UnaryExpr {
    pub op: UnaryOp,
    pub operand: Box<Expr>,
    pub ty: Option<Type>,
    pub method: Option<Member>,
}

/// Binary operation.
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryExpr {
    pub op: BinaryOp,
    pub left: Box<Expr>,
    pub right: Box<Expr>,
    /// Only meaningful for comparisons: the lifted comparison yields a
    /// nullable boolean instead of `false` when an operand is null.
    pub lifted_to_null: bool,
    pub method: Option<Member>,
    /// Only meaningful for coalescing and compound assignments.
    pub conversion: Option<Box<LambdaExpr>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConditionalExpr {
    pub test: Box<Expr>,
    pub if_true: Box<Expr>,
    pub if_false: Box<Expr>,
    pub ty: Type,
}

/// Lambda abstraction. `parameters` are in scope within `body` only.
#[derive(Debug, Clone, PartialEq)]
pub struct LambdaExpr {
    pub ty: Type,
    pub body: Box<Expr>,
    pub parameters: Vec<Parameter>,
}

/// Indexed access. Without an `indexer` the object is a multi-dimensional
/// array indexed by `arguments`.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexExpr {
    pub object: Box<Expr>,
    pub indexer: Option<Member>,
    pub arguments: Vec<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InvokeExpr {
    pub callee: Box<Expr>,
    pub arguments: Vec<Expr>,
}

/// Field or property access, static when `object` is `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberExpr {
    pub object: Option<Box<Expr>>,
    pub member: Member,
}

/// Method call, static when `object` is `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct CallExpr {
    pub object: Option<Box<Expr>>,
    pub method: Member,
    pub arguments: Vec<Expr>,
}

/// Object construction.
#[derive(Debug, Clone, PartialEq, EnumIs)]
pub enum NewExpr {
    /// Default-initialized value type, no constructor involved.
    Value(Type),

    /// Constructor invocation. `members` optionally maps each argument to the
    /// member it initializes (anonymous types).
    Constructor {
        constructor: Member,
        arguments: Vec<Expr>,
        members: Vec<Member>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct MemberInitExpr {
    pub new: NewExpr,
    pub bindings: Vec<MemberBinding>,
}

/// Initialization of one member inside a [`MemberInitExpr`].
#[derive(Debug, Clone, PartialEq, EnumIs)]
pub enum MemberBinding {
    /// `member = expression`
    Assignment { member: Member, expression: Expr },
    /// `member = { bindings... }` applied to the existing member value.
    Member {
        member: Member,
        bindings: Vec<MemberBinding>,
    },
    /// `member = { initializers... }` applied to the existing collection.
    List {
        member: Member,
        initializers: Vec<ElementInit>,
    },
}

impl MemberBinding {
    pub fn member(&self) -> &Member {
        match self {
            MemberBinding::Assignment { member, .. }
            | MemberBinding::Member { member, .. }
            | MemberBinding::List { member, .. } => member,
        }
    }
}

/// One call to a collection's add method.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementInit {
    pub add_method: Member,
    pub arguments: Vec<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListInitExpr {
    pub new: NewExpr,
    pub initializers: Vec<ElementInit>,
}

/// Array creation, from either element values or dimension bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct NewArrayExpr {
    pub element_type: Type,
    pub expressions: Vec<Expr>,
}

/// Sequence of expressions with block-scoped `variables`.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockExpr {
    pub variables: Vec<Parameter>,
    pub expressions: Vec<Expr>,
    pub ty: Type,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GotoExpr {
    pub kind: GotoKind,
    pub target: Label,
    pub value: Option<Box<Expr>>,
    pub ty: Type,
}

/// Marks the position of `target`; evaluates to `default_value` when reached
/// by fall-through.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelExpr {
    pub target: Label,
    pub default_value: Option<Box<Expr>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoopExpr {
    pub body: Box<Expr>,
    pub break_label: Option<Label>,
    pub continue_label: Option<Label>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SwitchExpr {
    pub value: Box<Expr>,
    pub cases: Vec<SwitchCase>,
    pub default_body: Option<Box<Expr>>,
    pub comparison: Option<Member>,
    pub ty: Type,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SwitchCase {
    pub body: Expr,
    pub test_values: Vec<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TryExpr {
    pub body: Box<Expr>,
    pub handlers: Vec<CatchBlock>,
    pub finally: Option<Box<Expr>>,
    pub fault: Option<Box<Expr>>,
    pub ty: Type,
}

/// Exception handler. The optional `variable` is in scope in `body` and
/// `filter`.
#[derive(Debug, Clone, PartialEq)]
pub struct CatchBlock {
    pub test: Type,
    pub variable: Option<Parameter>,
    pub body: Expr,
    pub filter: Option<Expr>,
}

/// Shared layout of type tests (`TypeIs`, `TypeEqual`).
#[derive(Debug, Clone, PartialEq)]
pub struct TypeBinaryExpr {
    pub expression: Box<Expr>,
    pub type_operand: Type,
}

/// Throw `value`, or rethrow the current exception when `value` is `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct ThrowExpr {
    pub value: Option<Box<Expr>>,
    pub ty: Type,
}
