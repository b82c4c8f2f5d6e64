//! Structural equality modulo variable identity.
//!
//! The derived `PartialEq` on [`Expr`] compares parameters and labels by
//! identity, so a tree and its decoded copy are never equal under `==`.
//! [`structurally_equal`] instead requires the bound variables and labels of
//! both trees to correspond one-to-one.
use std::{collections::HashMap, hash::Hash};

use crate::{
    expr::{
        BinaryExpr, CatchBlock, ElementInit, Expr, LambdaExpr, MemberBinding, NewExpr, SwitchCase,
    },
    value::Value,
    variable::{Label, Parameter},
};

/// Compare two trees structurally. Parameters and labels match when they are
/// consistently paired across both trees, and floats compare by bit pattern.
pub fn structurally_equal(a: &Expr, b: &Expr) -> bool {
    Matcher::default().expr(a, b)
}

struct Bijection<T> {
    forward: HashMap<T, T>,
    backward: HashMap<T, T>,
}

impl<T> Default for Bijection<T> {
    fn default() -> Self {
        Self {
            forward: HashMap::new(),
            backward: HashMap::new(),
        }
    }
}

impl<T: Clone + Eq + Hash> Bijection<T> {
    fn pair(&mut self, a: &T, b: &T) -> bool {
        match (self.forward.get(a), self.backward.get(b)) {
            (Some(fa), Some(bb)) => fa == b && bb == a,
            (None, None) => {
                self.forward.insert(a.clone(), b.clone());
                self.backward.insert(b.clone(), a.clone());
                true
            }
            _ => false,
        }
    }
}

#[derive(Default)]
struct Matcher {
    parameters: Bijection<Parameter>,
    labels: Bijection<Label>,
}

impl Matcher {
    fn parameter(&mut self, a: &Parameter, b: &Parameter) -> bool {
        a.ty() == b.ty() && a.name() == b.name() && self.parameters.pair(a, b)
    }

    fn label(&mut self, a: &Label, b: &Label) -> bool {
        a.ty() == b.ty() && a.name() == b.name() && self.labels.pair(a, b)
    }

    fn opt_label(&mut self, a: &Option<Label>, b: &Option<Label>) -> bool {
        match (a, b) {
            (Some(a), Some(b)) => self.label(a, b),
            (None, None) => true,
            _ => false,
        }
    }

    fn parameters(&mut self, a: &[Parameter], b: &[Parameter]) -> bool {
        a.len() == b.len() && a.iter().zip(b).all(|(a, b)| self.parameter(a, b))
    }

    fn exprs(&mut self, a: &[Expr], b: &[Expr]) -> bool {
        a.len() == b.len() && a.iter().zip(b).all(|(a, b)| self.expr(a, b))
    }

    fn opt_expr(&mut self, a: Option<&Expr>, b: Option<&Expr>) -> bool {
        match (a, b) {
            (Some(a), Some(b)) => self.expr(a, b),
            (None, None) => true,
            _ => false,
        }
    }

    fn value(&mut self, a: &Value, b: &Value) -> bool {
        match (a, b) {
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::Array(a), Value::Array(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(a, b)| self.value(a, b))
            }
            (Value::Expr(a), Value::Expr(b)) => self.expr(a, b),
            (a, b) => a == b,
        }
    }

    fn lambda(&mut self, a: &LambdaExpr, b: &LambdaExpr) -> bool {
        a.ty == b.ty && self.parameters(&a.parameters, &b.parameters) && self.expr(&a.body, &b.body)
    }

    fn binary(&mut self, a: &BinaryExpr, b: &BinaryExpr) -> bool {
        let conversion = match (&a.conversion, &b.conversion) {
            (Some(a), Some(b)) => self.lambda(a, b),
            (None, None) => true,
            _ => false,
        };
        a.op == b.op
            && a.lifted_to_null == b.lifted_to_null
            && a.method == b.method
            && conversion
            && self.expr(&a.left, &b.left)
            && self.expr(&a.right, &b.right)
    }

    fn new_expr(&mut self, a: &NewExpr, b: &NewExpr) -> bool {
        match (a, b) {
            (NewExpr::Value(a), NewExpr::Value(b)) => a == b,
            (
                NewExpr::Constructor {
                    constructor: ca,
                    arguments: aa,
                    members: ma,
                },
                NewExpr::Constructor {
                    constructor: cb,
                    arguments: ab,
                    members: mb,
                },
            ) => ca == cb && ma == mb && self.exprs(aa, ab),
            _ => false,
        }
    }

    fn initializers(&mut self, a: &[ElementInit], b: &[ElementInit]) -> bool {
        a.len() == b.len()
            && a.iter().zip(b).all(|(a, b)| {
                a.add_method == b.add_method && self.exprs(&a.arguments, &b.arguments)
            })
    }

    fn bindings(&mut self, a: &[MemberBinding], b: &[MemberBinding]) -> bool {
        a.len() == b.len()
            && a.iter().zip(b).all(|(a, b)| match (a, b) {
                (
                    MemberBinding::Assignment {
                        member: ma,
                        expression: ea,
                    },
                    MemberBinding::Assignment {
                        member: mb,
                        expression: eb,
                    },
                ) => ma == mb && self.expr(ea, eb),
                (
                    MemberBinding::Member {
                        member: ma,
                        bindings: ba,
                    },
                    MemberBinding::Member {
                        member: mb,
                        bindings: bb,
                    },
                ) => ma == mb && self.bindings(ba, bb),
                (
                    MemberBinding::List {
                        member: ma,
                        initializers: ia,
                    },
                    MemberBinding::List {
                        member: mb,
                        initializers: ib,
                    },
                ) => ma == mb && self.initializers(ia, ib),
                _ => false,
            })
    }

    fn cases(&mut self, a: &[SwitchCase], b: &[SwitchCase]) -> bool {
        a.len() == b.len()
            && a.iter().zip(b).all(|(a, b)| {
                self.exprs(&a.test_values, &b.test_values) && self.expr(&a.body, &b.body)
            })
    }

    fn handlers(&mut self, a: &[CatchBlock], b: &[CatchBlock]) -> bool {
        a.len() == b.len()
            && a.iter().zip(b).all(|(a, b)| {
                let variable = match (&a.variable, &b.variable) {
                    (Some(a), Some(b)) => self.parameter(a, b),
                    (None, None) => true,
                    _ => false,
                };
                a.test == b.test
                    && variable
                    && self.opt_expr(a.filter.as_ref(), b.filter.as_ref())
                    && self.expr(&a.body, &b.body)
            })
    }

    fn expr(&mut self, a: &Expr, b: &Expr) -> bool {
        match (a, b) {
            (Expr::Constant(a), Expr::Constant(b)) => a.ty == b.ty && self.value(&a.value, &b.value),
            (Expr::Default(a), Expr::Default(b)) => a == b,
            (Expr::Unary(a), Expr::Unary(b)) => {
                a.op == b.op
                    && a.ty == b.ty
                    && a.method == b.method
                    && self.expr(&a.operand, &b.operand)
            }
            (Expr::Binary(a), Expr::Binary(b)) => self.binary(a, b),
            (Expr::Conditional(a), Expr::Conditional(b)) => {
                a.ty == b.ty
                    && self.expr(&a.test, &b.test)
                    && self.expr(&a.if_true, &b.if_true)
                    && self.expr(&a.if_false, &b.if_false)
            }
            (Expr::Lambda(a), Expr::Lambda(b)) => self.lambda(a, b),
            (Expr::Parameter(a), Expr::Parameter(b)) => self.parameter(a, b),
            (Expr::Index(a), Expr::Index(b)) => {
                a.indexer == b.indexer
                    && self.expr(&a.object, &b.object)
                    && self.exprs(&a.arguments, &b.arguments)
            }
            (Expr::Invoke(a), Expr::Invoke(b)) => {
                self.expr(&a.callee, &b.callee) && self.exprs(&a.arguments, &b.arguments)
            }
            (Expr::MemberAccess(a), Expr::MemberAccess(b)) => {
                a.member == b.member && self.opt_expr(a.object.as_deref(), b.object.as_deref())
            }
            (Expr::Call(a), Expr::Call(b)) => {
                a.method == b.method
                    && self.opt_expr(a.object.as_deref(), b.object.as_deref())
                    && self.exprs(&a.arguments, &b.arguments)
            }
            (Expr::New(a), Expr::New(b)) => self.new_expr(a, b),
            (Expr::MemberInit(a), Expr::MemberInit(b)) => {
                self.new_expr(&a.new, &b.new) && self.bindings(&a.bindings, &b.bindings)
            }
            (Expr::ListInit(a), Expr::ListInit(b)) => {
                self.new_expr(&a.new, &b.new) && self.initializers(&a.initializers, &b.initializers)
            }
            (Expr::NewArrayInit(a), Expr::NewArrayInit(b))
            | (Expr::NewArrayBounds(a), Expr::NewArrayBounds(b)) => {
                a.element_type == b.element_type && self.exprs(&a.expressions, &b.expressions)
            }
            (Expr::Block(a), Expr::Block(b)) => {
                a.ty == b.ty
                    && self.parameters(&a.variables, &b.variables)
                    && self.exprs(&a.expressions, &b.expressions)
            }
            (Expr::Goto(a), Expr::Goto(b)) => {
                a.kind == b.kind
                    && a.ty == b.ty
                    && self.label(&a.target, &b.target)
                    && self.opt_expr(a.value.as_deref(), b.value.as_deref())
            }
            (Expr::Label(a), Expr::Label(b)) => {
                self.label(&a.target, &b.target)
                    && self.opt_expr(a.default_value.as_deref(), b.default_value.as_deref())
            }
            (Expr::Loop(a), Expr::Loop(b)) => {
                self.opt_label(&a.break_label, &b.break_label)
                    && self.opt_label(&a.continue_label, &b.continue_label)
                    && self.expr(&a.body, &b.body)
            }
            (Expr::Switch(a), Expr::Switch(b)) => {
                a.ty == b.ty
                    && a.comparison == b.comparison
                    && self.expr(&a.value, &b.value)
                    && self.cases(&a.cases, &b.cases)
                    && self.opt_expr(a.default_body.as_deref(), b.default_body.as_deref())
            }
            (Expr::Try(a), Expr::Try(b)) => {
                a.ty == b.ty
                    && self.expr(&a.body, &b.body)
                    && self.handlers(&a.handlers, &b.handlers)
                    && self.opt_expr(a.finally.as_deref(), b.finally.as_deref())
                    && self.opt_expr(a.fault.as_deref(), b.fault.as_deref())
            }
            (Expr::TypeIs(a), Expr::TypeIs(b)) | (Expr::TypeEqual(a), Expr::TypeEqual(b)) => {
                a.type_operand == b.type_operand && self.expr(&a.expression, &b.expression)
            }
            (Expr::Throw(a), Expr::Throw(b)) => {
                a.ty == b.ty && self.opt_expr(a.value.as_deref(), b.value.as_deref())
            }
            _ => false,
        }
    }
}
