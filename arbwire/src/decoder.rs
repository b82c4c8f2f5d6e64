//! Wire to tree.
//!
//! The [`Decoder`] validates every node against the legal arities of its kind
//! before looking at its fields, resolves context indices through a
//! [`ContextReader`] and variable references through the same scope walk the
//! encoder used to produce them.
use std::collections::HashMap;

use arbexpr::{
    Expr, Label, Member, Parameter, Type,
    expr::{
        BinaryExpr, BinaryOp, BlockExpr, CallExpr, CatchBlock, ConditionalExpr, ConstantExpr,
        ElementInit, GotoExpr, GotoKind, IndexExpr, InvokeExpr, LabelExpr, LambdaExpr,
        ListInitExpr, LoopExpr, MemberBinding, MemberExpr, MemberInitExpr, NewArrayExpr, NewExpr,
        SwitchCase, SwitchExpr, ThrowExpr, TryExpr, TypeBinaryExpr, UnaryExpr, UnaryOp,
    },
};
use log::info;
use serde_json::Value as Json;

use crate::{
    conf::CodecOptions,
    constants::{ConstantCodec, ReduceFn, TreeReducer},
    context::ContextReader,
    discriminator::{BindingKind, NodeKind},
    error::{WireError, WireResult},
    magic::{ENVELOPE_CONTEXT, ENVELOPE_EXPRESSION},
    scope::Scope,
    wire::{Node, index_of},
};

/// Split an envelope into its context and expression.
fn split_envelope(envelope: &Json) -> WireResult<(&Json, &Json)> {
    let object = envelope
        .as_object()
        .ok_or_else(|| WireError::malformed("envelope must be an object", envelope))?;
    if let Some(key) = object
        .keys()
        .find(|key| *key != ENVELOPE_CONTEXT && *key != ENVELOPE_EXPRESSION)
    {
        return Err(WireError::malformed(
            format!("unexpected envelope field `{key}`"),
            envelope,
        ));
    }

    let field = |key: &str| {
        object
            .get(key)
            .ok_or_else(|| WireError::malformed(format!("envelope lacks `{key}`"), envelope))
    };
    Ok((field(ENVELOPE_CONTEXT)?, field(ENVELOPE_EXPRESSION)?))
}

/// State of one deserialization session.
pub struct Decoder<'a, 'c> {
    options: CodecOptions,
    constants: &'c dyn ConstantCodec,
    context: ContextReader<'a>,
    scope: Scope,
    reduces: HashMap<Type, ReduceFn>,
    depth: usize,
}

impl<'a, 'c> Decoder<'a, 'c> {
    /// Decoder over the `Context` object of an envelope.
    pub fn new(
        options: CodecOptions,
        constants: &'c dyn ConstantCodec,
        context: &'a Json,
    ) -> WireResult<Self> {
        Ok(Self {
            options,
            constants,
            context: ContextReader::new(context)?,
            scope: Scope::new(),
            reduces: HashMap::new(),
            depth: 0,
        })
    }

    /// Decode a whole envelope. A `null` expression yields `None`.
    pub fn deserialize(
        options: CodecOptions,
        constants: &'c dyn ConstantCodec,
        envelope: &'a Json,
    ) -> WireResult<Option<Expr>> {
        let (context, expression) = split_envelope(envelope)?;
        Decoder::new(options, constants, context)?.finish(expression)
    }

    fn finish(mut self, expression: &Json) -> WireResult<Option<Expr>> {
        let tree = match expression {
            Json::Null => None,
            wire => Some(self.decode(wire)?),
        };
        debug_assert!(self.scope.is_empty(), "unbalanced scope after decoding");

        let (types, members, labels) = self.context.counts();
        info!(
            "Deserialized expression tree (version {}, {types} types, {members} members, {labels} labels)",
            self.options.version
        );
        Ok(tree)
    }

    /// Decode one node and its children.
    pub fn decode(&mut self, wire: &Json) -> WireResult<Expr> {
        if self.depth >= self.options.max_depth {
            return Err(WireError::DepthExceeded {
                limit: self.options.max_depth,
            });
        }
        self.depth += 1;
        let result = self.decode_node(wire);
        self.depth -= 1;
        result
    }

    fn ty(&mut self, node: &Node, i: usize) -> WireResult<Type> {
        let index = node.index(i)?;
        self.context.get_type(index, node.wire)
    }

    fn opt_ty(&mut self, node: &Node, i: usize) -> WireResult<Option<Type>> {
        match node.opt(i) {
            Some(_) => self.ty(node, i).map(Some),
            None => Ok(None),
        }
    }

    fn member(&mut self, node: &Node, i: usize) -> WireResult<Member> {
        let index = node.index(i)?;
        self.context.get_member(index, node.wire)
    }

    fn opt_member(&mut self, node: &Node, i: usize) -> WireResult<Option<Member>> {
        match node.opt(i) {
            Some(_) => self.member(node, i).map(Some),
            None => Ok(None),
        }
    }

    fn label(&mut self, node: &Node, i: usize) -> WireResult<Label> {
        let index = node.index(i)?;
        self.context.get_label(index, node.wire)
    }

    fn opt_label(&mut self, node: &Node, i: usize) -> WireResult<Option<Label>> {
        match node.opt(i) {
            Some(_) => self.label(node, i).map(Some),
            None => Ok(None),
        }
    }

    fn opt_expr(&mut self, node: &Node, i: usize) -> WireResult<Option<Box<Expr>>> {
        match node.opt(i) {
            Some(wire) => Ok(Some(Box::new(self.decode(wire)?))),
            None => Ok(None),
        }
    }

    fn list(&mut self, node: &Node, i: usize) -> WireResult<Vec<Expr>> {
        node.array(i)?.iter().map(|wire| self.decode(wire)).collect()
    }

    fn reduce_for(&mut self, ty: &Type) -> WireResult<ReduceFn> {
        if let Some(reduce) = self.reduces.get(ty) {
            return Ok(reduce.clone());
        }
        let reduce = self.constants.reduce_factory(ty)?;
        self.reduces.insert(ty.clone(), reduce.clone());
        Ok(reduce)
    }

    /// Materialize one `[type]` or `[type, name]` declaration.
    fn declaration(&mut self, wire: &Json) -> WireResult<Parameter> {
        let decl = Node::tuple(wire)?;
        let len = decl.arity("declaration", &[1, 2])?;
        let ty = self.ty(&decl, 0)?;
        let name = if len == 2 { Some(decl.string(1)?) } else { None };
        Ok(Parameter::new(ty, name))
    }

    fn declarations(&mut self, wires: &[Json]) -> WireResult<Vec<Parameter>> {
        wires.iter().map(|wire| self.declaration(wire)).collect()
    }

    /// Run `body` with `parameters` in scope.
    fn scoped<T>(
        &mut self,
        parameters: &[Parameter],
        body: impl FnOnce(&mut Self) -> WireResult<T>,
    ) -> WireResult<T> {
        let pushed = self.scope.push(parameters.iter().cloned());
        let result = body(self);
        if pushed {
            self.scope.pop();
        }
        result
    }

    // Every arm delegates to a method so the recursive frame stays small.
    fn decode_node(&mut self, wire: &Json) -> WireResult<Expr> {
        let (token, node) = Node::open(wire)?;
        let kind = NodeKind::from_token(token).ok_or_else(|| WireError::UnknownDiscriminator {
            token: token.to_string(),
            node: wire.clone(),
        })?;

        match kind {
            NodeKind::Constant => self.constant(&node),
            NodeKind::Default => self.default(&node),
            NodeKind::Parameter => self.parameter(&node),
            NodeKind::Unary(op) => self.unary(op, &node),
            NodeKind::Binary(op) => self.binary(op, &node),
            NodeKind::Conditional => self.conditional(&node),
            NodeKind::Lambda => self.lambda(&node).map(Expr::Lambda),
            NodeKind::Index => self.index(&node),
            NodeKind::Invoke => self.invoke(&node),
            NodeKind::MemberAccess => self.member_access(&node),
            NodeKind::Call => self.call(&node),
            NodeKind::New => self.new_expr(&node).map(Expr::New),
            NodeKind::MemberInit => self.member_init(&node),
            NodeKind::ListInit => self.list_init(&node),
            NodeKind::NewArrayInit => self.new_array_init(&node),
            NodeKind::NewArrayBounds => self.new_array_bounds(&node),
            NodeKind::Block => self.block(&node),
            NodeKind::Goto => self.goto(&node),
            NodeKind::Label => self.label_node(&node),
            NodeKind::Loop => self.loop_node(&node),
            NodeKind::Switch => self.switch(&node),
            NodeKind::Try => self.try_node(&node),
            NodeKind::TypeIs | NodeKind::TypeEqual => self.type_test(kind, &node),
            NodeKind::Throw => self.throw(&node),
        }
    }

    fn constant(&mut self, node: &Node) -> WireResult<Expr> {
        node.arity(NodeKind::Constant.name(), &[3])?;
        let ty = self.ty(node, 2)?;
        let reduce = self.reduce_for(&ty)?;
        let value = reduce(node.field(1), self)?;
        Ok(Expr::Constant(ConstantExpr { value, ty }))
    }

    fn default(&mut self, node: &Node) -> WireResult<Expr> {
        node.arity(NodeKind::Default.name(), &[2])?;
        Ok(Expr::Default(self.ty(node, 1)?))
    }

    fn parameter(&mut self, node: &Node) -> WireResult<Expr> {
        let len = node.arity(NodeKind::Parameter.name(), &[2, 3])?;
        let variable = node.string(1)?;
        let skip = if len == 3 { node.index(2)? } else { 0 };
        let parameter =
            self.scope
                .resolve(variable, skip)
                .ok_or_else(|| WireError::UnresolvedVariable {
                    name: variable.to_string(),
                    skip: skip as u64,
                    node: node.wire.clone(),
                })?;
        Ok(Expr::Parameter(parameter.clone()))
    }

    fn unary(&mut self, op: UnaryOp, node: &Node) -> WireResult<Expr> {
        let typed = op.has_explicit_type();
        let arities: &[usize] = if typed { &[3, 4] } else { &[2, 3] };
        node.arity(NodeKind::Unary(op).name(), arities)?;
        let method_slot = if typed { 3 } else { 2 };
        if node.opt(method_slot).is_some() && !op.accepts_method() {
            return Err(node.malformed("operator takes no method"));
        }

        let operand = self.decode(node.field(1))?;
        let ty = if typed { Some(self.ty(node, 2)?) } else { None };
        Ok(Expr::Unary(UnaryExpr {
            op,
            operand: Box::new(operand),
            ty,
            method: self.opt_member(node, method_slot)?,
        }))
    }

    fn conditional(&mut self, node: &Node) -> WireResult<Expr> {
        let len = node.arity(NodeKind::Conditional.name(), &[4, 5])?;
        if len == 5 {
            let version = self.options.version;
            version.require(
                version.supports_conditional_type(),
                "An explicit conditional result type",
            )?;
        }
        let test = self.decode(node.field(1))?;
        let if_true = self.decode(node.field(2))?;
        let if_false = self.decode(node.field(3))?;
        let ty = match self.opt_ty(node, 4)? {
            Some(ty) => ty,
            None => if_true.ty(),
        };
        Ok(Expr::Conditional(ConditionalExpr {
            test: Box::new(test),
            if_true: Box::new(if_true),
            if_false: Box::new(if_false),
            ty,
        }))
    }

    fn index(&mut self, node: &Node) -> WireResult<Expr> {
        let version = self.options.version;
        version.require(version.supports_indexer(), "Indexer access")?;
        let len = node.arity(NodeKind::Index.name(), &[3, 4])?;
        let object = self.decode(node.field(1))?;
        let (indexer, arguments) = if len == 4 {
            (Some(self.member(node, 2)?), self.list(node, 3)?)
        } else {
            (None, self.list(node, 2)?)
        };
        Ok(Expr::Index(IndexExpr {
            object: Box::new(object),
            indexer,
            arguments,
        }))
    }

    fn invoke(&mut self, node: &Node) -> WireResult<Expr> {
        node.arity(NodeKind::Invoke.name(), &[3])?;
        let callee = self.decode(node.field(1))?;
        Ok(Expr::Invoke(InvokeExpr {
            callee: Box::new(callee),
            arguments: self.list(node, 2)?,
        }))
    }

    fn member_access(&mut self, node: &Node) -> WireResult<Expr> {
        node.arity(NodeKind::MemberAccess.name(), &[2, 3])?;
        Ok(Expr::MemberAccess(MemberExpr {
            member: self.member(node, 1)?,
            object: self.opt_expr(node, 2)?,
        }))
    }

    fn call(&mut self, node: &Node) -> WireResult<Expr> {
        let len = node.arity(NodeKind::Call.name(), &[3, 4])?;
        let method = self.member(node, 1)?;
        let (object, arguments) = if len == 4 {
            let object = self.decode(node.field(2))?;
            (Some(Box::new(object)), self.list(node, 3)?)
        } else {
            (None, self.list(node, 2)?)
        };
        Ok(Expr::Call(CallExpr {
            object,
            method,
            arguments,
        }))
    }

    fn member_init(&mut self, node: &Node) -> WireResult<Expr> {
        node.arity(NodeKind::MemberInit.name(), &[3])?;
        let new = self.nested_new(node.field(1))?;
        let bindings = node
            .array(2)?
            .iter()
            .map(|binding| self.binding(binding))
            .collect::<WireResult<_>>()?;
        Ok(Expr::MemberInit(MemberInitExpr { new, bindings }))
    }

    fn list_init(&mut self, node: &Node) -> WireResult<Expr> {
        node.arity(NodeKind::ListInit.name(), &[3])?;
        let new = self.nested_new(node.field(1))?;
        let initializers = self.initializers(node.array(2)?)?;
        Ok(Expr::ListInit(ListInitExpr { new, initializers }))
    }

    fn new_array_init(&mut self, node: &Node) -> WireResult<Expr> {
        node.arity(NodeKind::NewArrayInit.name(), &[3])?;
        Ok(Expr::NewArrayInit(NewArrayExpr {
            element_type: self.ty(node, 1)?,
            expressions: self.list(node, 2)?,
        }))
    }

    fn new_array_bounds(&mut self, node: &Node) -> WireResult<Expr> {
        node.arity(NodeKind::NewArrayBounds.name(), &[3])?;
        let element_type = self.ty(node, 1)?;
        let expressions = self.list(node, 2)?;
        if expressions.is_empty() {
            return Err(node.malformed("array creation with bounds has no bound"));
        }
        Ok(Expr::NewArrayBounds(NewArrayExpr {
            element_type,
            expressions,
        }))
    }

    fn block(&mut self, node: &Node) -> WireResult<Expr> {
        let len = node.arity(NodeKind::Block.name(), &[2, 3, 4])?;
        let variables = if len >= 3 {
            self.declarations(node.array(2)?)?
        } else {
            Vec::new()
        };
        let expressions = self.scoped(&variables, |this| this.list(node, 1))?;
        let ty = match self.opt_ty(node, 3)? {
            Some(ty) => ty,
            None => expressions.last().map(Expr::ty).unwrap_or_else(Type::void),
        };
        Ok(Expr::Block(BlockExpr {
            variables,
            expressions,
            ty,
        }))
    }

    fn goto(&mut self, node: &Node) -> WireResult<Expr> {
        node.arity(NodeKind::Goto.name(), &[3, 4, 5])?;
        let number = node
            .field(1)
            .as_u64()
            .ok_or_else(|| node.malformed("jump kind is not a number"))?;
        let kind = GotoKind::try_from(number).map_err(|e| node.malformed(e.to_string()))?;
        Ok(Expr::Goto(GotoExpr {
            kind,
            target: self.label(node, 2)?,
            value: self.opt_expr(node, 3)?,
            ty: self.opt_ty(node, 4)?.unwrap_or_else(Type::void),
        }))
    }

    fn label_node(&mut self, node: &Node) -> WireResult<Expr> {
        node.arity(NodeKind::Label.name(), &[2, 3])?;
        Ok(Expr::Label(LabelExpr {
            target: self.label(node, 1)?,
            default_value: self.opt_expr(node, 2)?,
        }))
    }

    fn loop_node(&mut self, node: &Node) -> WireResult<Expr> {
        node.arity(NodeKind::Loop.name(), &[2, 3, 4])?;
        let body = self.decode(node.field(1))?;
        Ok(Expr::Loop(LoopExpr {
            body: Box::new(body),
            break_label: self.opt_label(node, 2)?,
            continue_label: self.opt_label(node, 3)?,
        }))
    }

    fn switch(&mut self, node: &Node) -> WireResult<Expr> {
        node.arity(NodeKind::Switch.name(), &[4, 5, 6])?;
        let value = self.decode(node.field(1))?;
        let cases = node
            .array(2)?
            .iter()
            .map(|case| self.case(case))
            .collect::<WireResult<Vec<_>>>()?;
        let default_body = self.opt_expr(node, 3)?;
        let comparison = self.opt_member(node, 4)?;
        let mut switch = SwitchExpr {
            value: Box::new(value),
            cases,
            default_body,
            comparison,
            ty: Type::void(),
        };
        switch.ty = match self.opt_ty(node, 5)? {
            Some(ty) => ty,
            None => switch.natural_type(),
        };
        Ok(Expr::Switch(switch))
    }

    fn try_node(&mut self, node: &Node) -> WireResult<Expr> {
        node.arity(NodeKind::Try.name(), &[3, 4, 5, 6])?;
        let body = self.decode(node.field(1))?;
        let handlers = node
            .array(2)?
            .iter()
            .map(|handler| self.handler(handler))
            .collect::<WireResult<_>>()?;
        let finally = self.opt_expr(node, 3)?;
        let fault = self.opt_expr(node, 4)?;
        let ty = match self.opt_ty(node, 5)? {
            Some(ty) => ty,
            None => body.ty(),
        };
        Ok(Expr::Try(TryExpr {
            body: Box::new(body),
            handlers,
            finally,
            fault,
            ty,
        }))
    }

    fn type_test(&mut self, kind: NodeKind, node: &Node) -> WireResult<Expr> {
        node.arity(kind.name(), &[3])?;
        let expression = self.decode(node.field(1))?;
        let test = TypeBinaryExpr {
            expression: Box::new(expression),
            type_operand: self.ty(node, 2)?,
        };
        Ok(if kind == NodeKind::TypeIs {
            Expr::TypeIs(test)
        } else {
            Expr::TypeEqual(test)
        })
    }

    fn throw(&mut self, node: &Node) -> WireResult<Expr> {
        node.arity(NodeKind::Throw.name(), &[2, 3])?;
        Ok(Expr::Throw(ThrowExpr {
            value: self.opt_expr(node, 1)?,
            ty: self.opt_ty(node, 2)?.unwrap_or_else(Type::void),
        }))
    }

    fn binary(&mut self, op: BinaryOp, node: &Node) -> WireResult<Expr> {
        node.arity(NodeKind::Binary(op).name(), &[3, 4, 5])?;
        let left = self.decode(node.field(1))?;
        let right = self.decode(node.field(2))?;
        let method = self.opt_member(node, 3)?;

        let mut lifted_to_null = false;
        let mut conversion = None;
        if let Some(fifth) = node.opt(4) {
            if op.is_comparison() {
                lifted_to_null = node.boolean(4)?;
            } else if op.accepts_conversion() {
                match self.decode(fifth)? {
                    Expr::Lambda(lambda) => conversion = Some(Box::new(lambda)),
                    _ => return Err(node.malformed("conversion is not a lambda")),
                }
            } else {
                return Err(node.malformed("operator takes no fifth element"));
            }
        }

        Ok(Expr::Binary(BinaryExpr {
            op,
            left: Box::new(left),
            right: Box::new(right),
            lifted_to_null,
            method,
            conversion,
        }))
    }

    fn lambda(&mut self, node: &Node) -> WireResult<LambdaExpr> {
        node.arity(NodeKind::Lambda.name(), &[4])?;
        let delegate = self.opt_ty(node, 1)?;
        let parameters = self.declarations(node.array(3)?)?;
        let body = self.scoped(&parameters, |this| this.decode(node.field(2)))?;
        match delegate {
            Some(ty) => {
                LambdaExpr::typed(ty, parameters, body).map_err(|e| node.malformed(e.to_string()))
            }
            None => Ok(LambdaExpr::new(parameters, body)),
        }
    }

    fn new_expr(&mut self, node: &Node) -> WireResult<NewExpr> {
        let len = node.arity(NodeKind::New.name(), &[2, 3, 4])?;
        if len == 2 {
            return Ok(NewExpr::Value(self.ty(node, 1)?));
        }

        let constructor = self.member(node, 1)?;
        let arguments = self.list(node, 2)?;
        let mut members = Vec::new();
        if len == 4 {
            for wire in node.array(3)? {
                let index =
                    index_of(wire).ok_or_else(|| node.malformed("member list holds a non-index"))?;
                members.push(self.context.get_member(index, node.wire)?);
            }
        }
        Ok(NewExpr::Constructor {
            constructor,
            arguments,
            members,
        })
    }

    /// The `new` node heading a member or list initializer.
    fn nested_new(&mut self, wire: &Json) -> WireResult<NewExpr> {
        let (token, node) = Node::open(wire)?;
        if NodeKind::from_token(token) != Some(NodeKind::New) {
            return Err(node.malformed("initializer does not start with a `new` node"));
        }
        if self.depth >= self.options.max_depth {
            return Err(WireError::DepthExceeded {
                limit: self.options.max_depth,
            });
        }
        self.depth += 1;
        let result = self.new_expr(&node);
        self.depth -= 1;
        result
    }

    fn binding(&mut self, wire: &Json) -> WireResult<MemberBinding> {
        let (token, node) = Node::open(wire)?;
        let kind = BindingKind::from_token(token).ok_or_else(|| WireError::UnknownDiscriminator {
            token: token.to_string(),
            node: wire.clone(),
        })?;
        node.arity(kind.into(), &[3])?;
        let member = self.member(&node, 1)?;
        Ok(match kind {
            BindingKind::Assignment => MemberBinding::Assignment {
                member,
                expression: self.decode(node.field(2))?,
            },
            BindingKind::MemberBinding => MemberBinding::Member {
                member,
                bindings: node
                    .array(2)?
                    .iter()
                    .map(|binding| self.binding(binding))
                    .collect::<WireResult<_>>()?,
            },
            BindingKind::ListBinding => MemberBinding::List {
                member,
                initializers: self.initializers(node.array(2)?)?,
            },
        })
    }

    fn initializers(&mut self, wires: &[Json]) -> WireResult<Vec<ElementInit>> {
        wires
            .iter()
            .map(|wire| {
                let init = Node::tuple(wire)?;
                init.arity("element initializer", &[2])?;
                Ok(ElementInit {
                    add_method: self.member(&init, 0)?,
                    arguments: self.list(&init, 1)?,
                })
            })
            .collect()
    }

    fn case(&mut self, wire: &Json) -> WireResult<SwitchCase> {
        let case = Node::tuple(wire)?;
        case.arity("switch case", &[2])?;
        Ok(SwitchCase {
            body: self.decode(case.field(0))?,
            test_values: self.list(&case, 1)?,
        })
    }

    fn handler(&mut self, wire: &Json) -> WireResult<CatchBlock> {
        let handler = Node::tuple(wire)?;
        handler.arity("catch handler", &[2, 3, 4])?;
        let test = self.ty(&handler, 0)?;
        let variable = match handler.opt(2) {
            Some(declaration) => Some(self.declaration(declaration)?),
            None => None,
        };
        let (body, filter) = self.scoped(variable.as_slice(), |this| {
            let body = this.decode(handler.field(1))?;
            let filter = match handler.opt(3) {
                Some(filter) => Some(this.decode(filter)?),
                None => None,
            };
            Ok((body, filter))
        })?;
        Ok(CatchBlock {
            test,
            variable,
            body,
            filter,
        })
    }
}

impl TreeReducer for Decoder<'_, '_> {
    /// Decode a tree embedded in a constant, the inverse of the encoder's
    /// [`TreeLifter`](crate::constants::TreeLifter) implementation.
    fn reduce_tree(&mut self, wire: &Json) -> WireResult<Expr> {
        if self.options.merge_context {
            let outer = std::mem::take(&mut self.scope);
            let result = self.decode(wire);
            debug_assert!(self.scope.is_empty(), "unbalanced scope in embedded tree");
            self.scope = outer;
            result
        } else {
            let (context, expression) = split_envelope(wire)?;
            let mut nested = Decoder::new(self.options, self.constants, context)?;
            nested.depth = self.depth;
            nested
                .finish(expression)?
                .ok_or_else(|| WireError::malformed("embedded tree is null", wire))
        }
    }
}
