//! Tree to wire.
//!
//! The [`Encoder`] walks a tree depth-first and emits one wire array per node,
//! always in its shortest legal arity: optional trailing fields holding their
//! default (no method, no explicit type equal to the derived one, no value)
//! are left out.
use std::collections::HashMap;

use arbexpr::{
    Expr, Member, Parameter, Type,
    expr::{
        BinaryExpr, BlockExpr, CallExpr, CatchBlock, ConditionalExpr, ConstantExpr, ElementInit,
        GotoExpr, IndexExpr, InvokeExpr, LabelExpr, LambdaExpr, ListInitExpr, LoopExpr,
        MemberBinding, MemberExpr, MemberInitExpr, NewArrayExpr, NewExpr, SwitchCase, SwitchExpr,
        ThrowExpr, TryExpr, TypeBinaryExpr, UnaryExpr,
    },
};
use log::info;
use serde_json::{Map, Value as Json};

use crate::{
    conf::CodecOptions,
    constants::{ConstantCodec, LiftFn, TreeLifter},
    context::ContextWriter,
    discriminator::{BindingKind, NodeKind, binary_token, unary_token},
    error::{WireError, WireResult},
    magic::{ENVELOPE_CONTEXT, ENVELOPE_EXPRESSION},
    scope::Scope,
    wire::{trimmed, wire},
};

/// State of one serialization session.
pub struct Encoder<'c> {
    options: CodecOptions,
    constants: &'c dyn ConstantCodec,
    context: ContextWriter,
    scope: Scope,
    lifts: HashMap<Type, LiftFn>,
    depth: usize,
}

impl<'c> Encoder<'c> {
    pub fn new(options: CodecOptions, constants: &'c dyn ConstantCodec) -> Self {
        Self {
            options,
            constants,
            context: ContextWriter::new(),
            scope: Scope::new(),
            lifts: HashMap::new(),
            depth: 0,
        }
    }

    pub fn context(&self) -> &ContextWriter {
        &self.context
    }

    /// Encode `tree` and wrap it in an envelope with the finalized context.
    /// An absent tree is encoded as a `null` expression.
    pub fn serialize(mut self, tree: Option<&Expr>) -> WireResult<Json> {
        let expression = match tree {
            Some(tree) => self.encode(tree)?,
            None => Json::Null,
        };
        debug_assert!(self.scope.is_empty(), "unbalanced scope after encoding");

        let (types, members, labels) = self.context.counts();
        info!(
            "Serialized expression tree (version {}, {types} types, {members} members, {labels} labels)",
            self.options.version
        );

        let mut envelope = Map::new();
        envelope.insert(ENVELOPE_CONTEXT.to_string(), self.context.finalize());
        envelope.insert(ENVELOPE_EXPRESSION.to_string(), expression);
        Ok(Json::Object(envelope))
    }

    /// Encode one node and its children.
    pub fn encode(&mut self, expr: &Expr) -> WireResult<Json> {
        if self.depth >= self.options.max_depth {
            return Err(WireError::DepthExceeded {
                limit: self.options.max_depth,
            });
        }
        self.depth += 1;
        let result = self.encode_node(expr);
        self.depth -= 1;
        result
    }

    fn ty(&mut self, ty: &Type) -> Json {
        Json::from(self.context.add_type(ty))
    }

    fn member(&mut self, member: &Member) -> Json {
        Json::from(self.context.add_member(member))
    }

    fn opt_member(&mut self, member: Option<&Member>) -> Json {
        member.map_or(Json::Null, |m| self.member(m))
    }

    fn opt_expr(&mut self, expr: Option<&Expr>) -> WireResult<Json> {
        expr.map_or(Ok(Json::Null), |e| self.encode(e))
    }

    fn list(&mut self, exprs: &[Expr]) -> WireResult<Json> {
        exprs
            .iter()
            .map(|e| self.encode(e))
            .collect::<WireResult<_>>()
            .map(Json::Array)
    }

    fn lift_for(&mut self, ty: &Type) -> WireResult<LiftFn> {
        if let Some(lift) = self.lifts.get(ty) {
            return Ok(lift.clone());
        }
        let lift = self.constants.lift_factory(ty)?;
        self.lifts.insert(ty.clone(), lift.clone());
        Ok(lift)
    }

    fn declaration(&mut self, parameter: &Parameter) -> Json {
        let ty = self.ty(parameter.ty());
        match parameter.name() {
            Some(name) => wire![ty, name],
            None => wire![ty],
        }
    }

    /// Declare `parameters`, run `body` with them in scope, and return their
    /// wire declarations with the result.
    fn scoped<T>(
        &mut self,
        parameters: &[Parameter],
        body: impl FnOnce(&mut Self) -> WireResult<T>,
    ) -> WireResult<(Vec<Json>, T)> {
        let declarations = parameters.iter().map(|p| self.declaration(p)).collect();
        let pushed = self.scope.push(parameters.iter().cloned());
        let result = body(self);
        if pushed {
            self.scope.pop();
        }
        Ok((declarations, result?))
    }

    // Every arm delegates to a method so the recursive frame stays small.
    fn encode_node(&mut self, expr: &Expr) -> WireResult<Json> {
        match expr {
            Expr::Constant(constant) => self.constant(constant),
            Expr::Default(ty) => Ok(wire![NodeKind::Default.token(), self.ty(ty)]),
            Expr::Parameter(parameter) => self.parameter(parameter),
            Expr::Unary(unary) => self.unary(unary),
            Expr::Binary(binary) => self.binary(binary),
            Expr::Conditional(conditional) => self.conditional(conditional),
            Expr::Lambda(lambda) => self.lambda(lambda),
            Expr::Index(index) => self.index(index),
            Expr::Invoke(invoke) => self.invoke(invoke),
            Expr::MemberAccess(access) => self.member_access(access),
            Expr::Call(call) => self.call(call),
            Expr::New(new) => self.new_node(new),
            Expr::MemberInit(init) => self.member_init(init),
            Expr::ListInit(init) => self.list_init(init),
            Expr::NewArrayInit(array) => self.new_array(NodeKind::NewArrayInit, array),
            Expr::NewArrayBounds(array) => self.new_array(NodeKind::NewArrayBounds, array),
            Expr::Block(block) => self.block(block),
            Expr::Goto(goto) => self.goto(goto),
            Expr::Label(label) => self.label(label),
            Expr::Loop(lp) => self.loop_node(lp),
            Expr::Switch(switch) => self.switch(switch),
            Expr::Try(tr) => self.try_node(tr),
            Expr::TypeIs(test) => self.type_test(NodeKind::TypeIs, test),
            Expr::TypeEqual(test) => self.type_test(NodeKind::TypeEqual, test),
            Expr::Throw(throw) => self.throw(throw),
        }
    }

    fn constant(&mut self, constant: &ConstantExpr) -> WireResult<Json> {
        let ty = self.ty(&constant.ty);
        let lift = self.lift_for(&constant.ty)?;
        let value = lift(&constant.value, self)?;
        Ok(wire![NodeKind::Constant.token(), value, ty])
    }

    fn parameter(&mut self, parameter: &Parameter) -> WireResult<Json> {
        let (name, skip) =
            self.scope
                .reference(parameter)
                .ok_or_else(|| WireError::UnboundParameter {
                    name: parameter.to_string(),
                })?;
        Ok(if skip == 0 {
            wire![NodeKind::Parameter.token(), name]
        } else {
            wire![NodeKind::Parameter.token(), name, skip]
        })
    }

    fn conditional(&mut self, conditional: &ConditionalExpr) -> WireResult<Json> {
        let natural = conditional.natural_type();
        let mut items = vec![
            Json::from(NodeKind::Conditional.token()),
            self.encode(&conditional.test)?,
            self.encode(&conditional.if_true)?,
            self.encode(&conditional.if_false)?,
        ];
        if conditional.ty != natural {
            let version = self.options.version;
            version.require(
                version.supports_conditional_type(),
                "An explicit conditional result type",
            )?;
            items.push(self.ty(&conditional.ty));
        }
        Ok(Json::Array(items))
    }

    fn index(&mut self, index: &IndexExpr) -> WireResult<Json> {
        let version = self.options.version;
        version.require(version.supports_indexer(), "Indexer access")?;
        let object = self.encode(&index.object)?;
        let arguments = self.list(&index.arguments)?;
        Ok(match &index.indexer {
            Some(indexer) => wire![
                NodeKind::Index.token(),
                object,
                self.member(indexer),
                arguments
            ],
            None => wire![NodeKind::Index.token(), object, arguments],
        })
    }

    fn invoke(&mut self, invoke: &InvokeExpr) -> WireResult<Json> {
        Ok(wire![
            NodeKind::Invoke.token(),
            self.encode(&invoke.callee)?,
            self.list(&invoke.arguments)?
        ])
    }

    fn member_access(&mut self, access: &MemberExpr) -> WireResult<Json> {
        let member = self.member(&access.member);
        Ok(match &access.object {
            Some(object) => wire![NodeKind::MemberAccess.token(), member, self.encode(object)?],
            None => wire![NodeKind::MemberAccess.token(), member],
        })
    }

    fn call(&mut self, call: &CallExpr) -> WireResult<Json> {
        let method = self.member(&call.method);
        Ok(match &call.object {
            Some(object) => wire![
                NodeKind::Call.token(),
                method,
                self.encode(object)?,
                self.list(&call.arguments)?
            ],
            None => wire![NodeKind::Call.token(), method, self.list(&call.arguments)?],
        })
    }

    fn member_init(&mut self, init: &MemberInitExpr) -> WireResult<Json> {
        let new = self.new_node(&init.new)?;
        let bindings = init
            .bindings
            .iter()
            .map(|binding| self.binding(binding))
            .collect::<WireResult<Vec<_>>>()?;
        Ok(wire![NodeKind::MemberInit.token(), new, bindings])
    }

    fn list_init(&mut self, init: &ListInitExpr) -> WireResult<Json> {
        let new = self.new_node(&init.new)?;
        let initializers = self.initializers(&init.initializers)?;
        Ok(wire![NodeKind::ListInit.token(), new, initializers])
    }

    fn new_array(&mut self, kind: NodeKind, array: &NewArrayExpr) -> WireResult<Json> {
        if kind == NodeKind::NewArrayBounds && array.expressions.is_empty() {
            return Err(WireError::InvalidTree(
                "array creation with bounds requires at least one bound".into(),
            ));
        }
        Ok(wire![
            kind.token(),
            self.ty(&array.element_type),
            self.list(&array.expressions)?
        ])
    }

    fn block(&mut self, block: &BlockExpr) -> WireResult<Json> {
        let natural = block.natural_type();
        let (declarations, expressions) =
            self.scoped(&block.variables, |this| this.list(&block.expressions))?;
        let mut items = vec![Json::from(NodeKind::Block.token()), expressions];
        let typed = block.ty != natural;
        if !declarations.is_empty() || typed {
            items.push(Json::Array(declarations));
        }
        if typed {
            items.push(self.ty(&block.ty));
        }
        Ok(Json::Array(items))
    }

    fn goto(&mut self, goto: &GotoExpr) -> WireResult<Json> {
        let label = Json::from(self.context.add_label(&goto.target));
        let value = self.opt_expr(goto.value.as_deref())?;
        let ty = if goto.ty.is_void() {
            Json::Null
        } else {
            self.ty(&goto.ty)
        };
        Ok(trimmed(
            vec![
                NodeKind::Goto.token().into(),
                goto.kind.number().into(),
                label,
                value,
                ty,
            ],
            3,
        ))
    }

    fn label(&mut self, label: &LabelExpr) -> WireResult<Json> {
        let target = Json::from(self.context.add_label(&label.target));
        let default_value = self.opt_expr(label.default_value.as_deref())?;
        Ok(trimmed(
            vec![NodeKind::Label.token().into(), target, default_value],
            2,
        ))
    }

    fn loop_node(&mut self, lp: &LoopExpr) -> WireResult<Json> {
        let body = self.encode(&lp.body)?;
        let break_label = lp
            .break_label
            .as_ref()
            .map_or(Json::Null, |l| self.context.add_label(l).into());
        let continue_label = lp
            .continue_label
            .as_ref()
            .map_or(Json::Null, |l| self.context.add_label(l).into());
        Ok(trimmed(
            vec![
                NodeKind::Loop.token().into(),
                body,
                break_label,
                continue_label,
            ],
            2,
        ))
    }

    fn switch(&mut self, switch: &SwitchExpr) -> WireResult<Json> {
        let natural = switch.natural_type();
        let value = self.encode(&switch.value)?;
        let cases = switch
            .cases
            .iter()
            .map(|case| self.case(case))
            .collect::<WireResult<Vec<_>>>()?;
        let default_body = self.opt_expr(switch.default_body.as_deref())?;
        let comparison = self.opt_member(switch.comparison.as_ref());
        let ty = if switch.ty == natural {
            Json::Null
        } else {
            self.ty(&switch.ty)
        };
        Ok(trimmed(
            vec![
                NodeKind::Switch.token().into(),
                value,
                Json::Array(cases),
                default_body,
                comparison,
                ty,
            ],
            4,
        ))
    }

    fn try_node(&mut self, tr: &TryExpr) -> WireResult<Json> {
        let natural = tr.natural_type();
        let body = self.encode(&tr.body)?;
        let handlers = tr
            .handlers
            .iter()
            .map(|handler| self.handler(handler))
            .collect::<WireResult<Vec<_>>>()?;
        let finally = self.opt_expr(tr.finally.as_deref())?;
        let fault = self.opt_expr(tr.fault.as_deref())?;
        let ty = if tr.ty == natural {
            Json::Null
        } else {
            self.ty(&tr.ty)
        };
        Ok(trimmed(
            vec![
                NodeKind::Try.token().into(),
                body,
                Json::Array(handlers),
                finally,
                fault,
                ty,
            ],
            3,
        ))
    }

    fn type_test(&mut self, kind: NodeKind, test: &TypeBinaryExpr) -> WireResult<Json> {
        Ok(wire![
            kind.token(),
            self.encode(&test.expression)?,
            self.ty(&test.type_operand)
        ])
    }

    fn throw(&mut self, throw: &ThrowExpr) -> WireResult<Json> {
        let value = self.opt_expr(throw.value.as_deref())?;
        let ty = if throw.ty.is_void() {
            Json::Null
        } else {
            self.ty(&throw.ty)
        };
        Ok(trimmed(vec![NodeKind::Throw.token().into(), value, ty], 2))
    }

    fn unary(&mut self, unary: &UnaryExpr) -> WireResult<Json> {
        if unary.method.is_some() && !unary.op.accepts_method() {
            return Err(WireError::InvalidTree(format!(
                "operator {} does not take a method",
                unary_token(unary.op)
            )));
        }
        if unary.ty.is_some() && !unary.op.has_explicit_type() {
            return Err(WireError::InvalidTree(format!(
                "operator {} takes no explicit result type",
                unary_token(unary.op)
            )));
        }

        let token = Json::from(unary_token(unary.op));
        let operand = self.encode(&unary.operand)?;
        if unary.op.has_explicit_type() {
            let ty = self.ty(&unary.result_type());
            let method = self.opt_member(unary.method.as_ref());
            Ok(trimmed(vec![token, operand, ty, method], 3))
        } else {
            let method = self.opt_member(unary.method.as_ref());
            Ok(trimmed(vec![token, operand, method], 2))
        }
    }

    fn binary(&mut self, binary: &BinaryExpr) -> WireResult<Json> {
        if binary.lifted_to_null && !binary.op.is_comparison() {
            return Err(WireError::InvalidTree(format!(
                "operator {} cannot be lifted to null",
                binary_token(binary.op)
            )));
        }
        if binary.conversion.is_some() && !binary.op.accepts_conversion() {
            return Err(WireError::InvalidTree(format!(
                "operator {} does not take a conversion",
                binary_token(binary.op)
            )));
        }

        let left = self.encode(&binary.left)?;
        let right = self.encode(&binary.right)?;
        let method = self.opt_member(binary.method.as_ref());
        let fifth = match &binary.conversion {
            Some(conversion) => self.lambda(conversion)?,
            None if binary.lifted_to_null => Json::Bool(true),
            None => Json::Null,
        };
        Ok(trimmed(
            vec![binary_token(binary.op).into(), left, right, method, fifth],
            3,
        ))
    }

    fn lambda(&mut self, lambda: &LambdaExpr) -> WireResult<Json> {
        let delegate = if lambda.ty == lambda.natural_type() {
            Json::Null
        } else {
            self.ty(&lambda.ty)
        };
        let (declarations, body) = self.scoped(&lambda.parameters, |this| this.encode(&lambda.body))?;
        Ok(wire![
            NodeKind::Lambda.token(),
            delegate,
            body,
            declarations
        ])
    }

    fn new_node(&mut self, new: &NewExpr) -> WireResult<Json> {
        Ok(match new {
            NewExpr::Value(ty) => wire![NodeKind::New.token(), self.ty(ty)],
            NewExpr::Constructor {
                constructor,
                arguments,
                members,
            } => {
                let constructor = self.member(constructor);
                let arguments = self.list(arguments)?;
                if members.is_empty() {
                    wire![NodeKind::New.token(), constructor, arguments]
                } else {
                    let members: Vec<Json> = members.iter().map(|m| self.member(m)).collect();
                    wire![NodeKind::New.token(), constructor, arguments, members]
                }
            }
        })
    }

    fn binding(&mut self, binding: &MemberBinding) -> WireResult<Json> {
        let member = self.member(binding.member());
        Ok(match binding {
            MemberBinding::Assignment { expression, .. } => {
                wire![BindingKind::Assignment.token(), member, self.encode(expression)?]
            }
            MemberBinding::Member { bindings, .. } => {
                let bindings = bindings
                    .iter()
                    .map(|binding| self.binding(binding))
                    .collect::<WireResult<Vec<_>>>()?;
                wire![BindingKind::MemberBinding.token(), member, bindings]
            }
            MemberBinding::List { initializers, .. } => {
                let initializers = self.initializers(initializers)?;
                wire![BindingKind::ListBinding.token(), member, initializers]
            }
        })
    }

    fn initializers(&mut self, initializers: &[ElementInit]) -> WireResult<Json> {
        initializers
            .iter()
            .map(|init| {
                let add_method = self.member(&init.add_method);
                Ok(wire![add_method, self.list(&init.arguments)?])
            })
            .collect::<WireResult<_>>()
            .map(Json::Array)
    }

    fn case(&mut self, case: &SwitchCase) -> WireResult<Json> {
        let body = self.encode(&case.body)?;
        let test_values = self.list(&case.test_values)?;
        Ok(wire![body, test_values])
    }

    fn handler(&mut self, handler: &CatchBlock) -> WireResult<Json> {
        let test = self.ty(&handler.test);
        let (mut declarations, (body, filter)) =
            self.scoped(handler.variable.as_slice(), |this| {
                let body = this.encode(&handler.body)?;
                let filter = this.opt_expr(handler.filter.as_ref())?;
                Ok((body, filter))
            })?;
        let variable = declarations.pop().unwrap_or(Json::Null);
        Ok(trimmed(vec![test, body, variable, filter], 2))
    }
}

impl TreeLifter for Encoder<'_> {
    /// Encode a tree embedded in a constant. In merge mode the tree shares
    /// this session's context and is emitted as a bare node, with no outer
    /// variable in scope; otherwise it becomes an independent envelope.
    fn lift_tree(&mut self, tree: &Expr) -> WireResult<Json> {
        if self.options.merge_context {
            let outer = std::mem::take(&mut self.scope);
            let result = self.encode(tree);
            debug_assert!(self.scope.is_empty(), "unbalanced scope in embedded tree");
            self.scope = outer;
            result
        } else {
            let mut nested = Encoder::new(self.options, self.constants);
            nested.depth = self.depth;
            nested.serialize(Some(tree))
        }
    }
}
