//! Result types of expression nodes.
//!
//! Types of operator nodes are derived deterministically from their operands
//! and optional implementing method, so a tree rebuilt from the same pieces
//! always reports the same type.
use crate::types::Type;

use super::{
    BinaryExpr, BinaryOp, BlockExpr, ConditionalExpr, Expr, IndexExpr, InvokeExpr, LambdaExpr,
    LoopExpr, NewExpr, SwitchExpr, TryExpr, UnaryExpr, UnaryOp,
};

impl Expr {
    /// Static type of the value this node evaluates to.
    pub fn ty(&self) -> Type {
        match self {
            Expr::Constant(constant) => constant.ty.clone(),
            Expr::Default(ty) => ty.clone(),
            Expr::Unary(unary) => unary.result_type(),
            Expr::Binary(binary) => binary.result_type(),
            Expr::Conditional(conditional) => conditional.ty.clone(),
            Expr::Lambda(lambda) => lambda.ty.clone(),
            Expr::Parameter(parameter) => parameter.ty().clone(),
            Expr::Index(index) => index.result_type(),
            Expr::Invoke(invoke) => invoke.result_type(),
            Expr::MemberAccess(access) => access.member.member_type().clone(),
            Expr::Call(call) => call.method.member_type().clone(),
            Expr::New(new) => new.ty(),
            Expr::MemberInit(init) => init.new.ty(),
            Expr::ListInit(init) => init.new.ty(),
            Expr::NewArrayInit(array) => Type::array(array.element_type.clone()),
            Expr::NewArrayBounds(array) => match array.expressions.len() {
                0 | 1 => Type::array(array.element_type.clone()),
                rank => Type::array_of_rank(array.element_type.clone(), rank as u32),
            },
            Expr::Block(block) => block.ty.clone(),
            Expr::Goto(goto) => goto.ty.clone(),
            Expr::Label(label) => label.target.ty().clone(),
            Expr::Loop(lp) => lp.result_type(),
            Expr::Switch(switch) => switch.ty.clone(),
            Expr::Try(tr) => tr.ty.clone(),
            Expr::TypeIs(_) | Expr::TypeEqual(_) => Type::bool(),
            Expr::Throw(throw) => throw.ty.clone(),
        }
    }
}

impl UnaryExpr {
    pub fn result_type(&self) -> Type {
        if self.op.has_explicit_type() {
            if let Some(ty) = &self.ty {
                return ty.clone();
            }
        }

        match self.op {
            UnaryOp::IsTrue | UnaryOp::IsFalse => Type::bool(),
            UnaryOp::ArrayLength => Type::i32(),
            UnaryOp::Quote => Type::expression(self.operand.ty()),
            op if op.is_assignment() => self.operand.ty(),
            _ => match &self.method {
                Some(method) => method.member_type().clone(),
                None => self.operand.ty(),
            },
        }
    }
}

impl BinaryExpr {
    pub fn result_type(&self) -> Type {
        if self.op == BinaryOp::Assign || self.op.is_compound_assignment() {
            return self.left.ty();
        }

        if let Some(method) = &self.method {
            return method.member_type().clone();
        }

        match self.op {
            op if op.is_comparison() => {
                if self.lifted_to_null {
                    Type::nullable(Type::bool())
                } else {
                    Type::bool()
                }
            }
            BinaryOp::Coalesce => self.right.ty(),
            BinaryOp::ArrayIndex => self
                .left
                .ty()
                .element_type()
                .cloned()
                .unwrap_or_else(Type::object),
            _ => self.left.ty(),
        }
    }
}

impl ConditionalExpr {
    /// The type of the `if_true` branch.
    pub fn natural_type(&self) -> Type {
        self.if_true.ty()
    }
}

impl LambdaExpr {
    /// `Func`/`Action` delegate matching the parameters and body.
    pub fn natural_type(&self) -> Type {
        Self::natural_type_of(&self.parameters, &self.body)
    }

    pub(crate) fn natural_type_of(parameters: &[crate::variable::Parameter], body: &Expr) -> Type {
        Type::delegate_for(parameters.iter().map(|p| p.ty().clone()), body.ty())
    }
}

impl IndexExpr {
    pub fn result_type(&self) -> Type {
        match &self.indexer {
            Some(indexer) => indexer.member_type().clone(),
            None => self
                .object
                .ty()
                .element_type()
                .cloned()
                .unwrap_or_else(Type::object),
        }
    }
}

impl InvokeExpr {
    pub fn result_type(&self) -> Type {
        let callee = self.callee.ty();
        let delegate = callee.quoted_delegate().unwrap_or(&callee);
        delegate
            .delegate_signature()
            .map(|(_, ret)| ret)
            .unwrap_or_else(Type::object)
    }
}

impl NewExpr {
    pub fn ty(&self) -> Type {
        match self {
            NewExpr::Value(ty) => ty.clone(),
            NewExpr::Constructor { constructor, .. } => constructor.declaring_type().clone(),
        }
    }
}

impl BlockExpr {
    /// The type of the last expression, `void` for an empty block.
    pub fn natural_type(&self) -> Type {
        self.expressions
            .last()
            .map(Expr::ty)
            .unwrap_or_else(Type::void)
    }
}

impl LoopExpr {
    pub fn result_type(&self) -> Type {
        self.break_label
            .as_ref()
            .map(|label| label.ty().clone())
            .unwrap_or_else(Type::void)
    }
}

impl SwitchExpr {
    /// The type of the first case body, else of the default body, else `void`.
    pub fn natural_type(&self) -> Type {
        self.cases
            .first()
            .map(|case| case.body.ty())
            .or_else(|| self.default_body.as_ref().map(|body| body.ty()))
            .unwrap_or_else(Type::void)
    }
}

impl TryExpr {
    /// The type of the protected body.
    pub fn natural_type(&self) -> Type {
        self.body.ty()
    }
}
