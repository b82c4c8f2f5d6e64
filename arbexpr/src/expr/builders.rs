//! Associated constructors for [`Expr`].
//!
//! Builders fill in every field that can be derived (result types, delegate
//! types, absent methods). Explicit variants (`*_typed`, `*_with_method`) exist
//! for the cases where the caller needs to override the derived value.
use crate::{
    members::Member,
    types::Type,
    utils::Error,
    value::Value,
    variable::{Label, Parameter},
};

use super::{
    BinaryExpr, BinaryOp, BlockExpr, CallExpr, CatchBlock, ConditionalExpr, ConstantExpr,
    ElementInit, Expr, GotoExpr, GotoKind, IndexExpr, InvokeExpr, LabelExpr, LambdaExpr,
    ListInitExpr, LoopExpr, MemberBinding, MemberExpr, MemberInitExpr, NewArrayExpr, NewExpr,
    SwitchCase, SwitchExpr, ThrowExpr, TryExpr, TypeBinaryExpr, UnaryExpr, UnaryOp,
};

macro_rules! binary_builders {
    ($($(#[$meta:meta])* $fn_name:ident => $op:ident),* $(,)?) => {
        $(
            $(#[$meta])*
            pub fn $fn_name(left: Expr, right: Expr) -> Self {
                Self::binary(BinaryOp::$op, left, right)
            }
        )*
    };
}

macro_rules! unary_builders {
    ($($fn_name:ident => $op:ident),* $(,)?) => {
        $(
            pub fn $fn_name(operand: Expr) -> Self {
                Self::unary(UnaryOp::$op, operand)
            }
        )*
    };
}

impl Expr {
    /// Constant of an explicit type.
    pub fn constant(value: impl Into<Value>, ty: Type) -> Self {
        Expr::Constant(ConstantExpr {
            value: value.into(),
            ty,
        })
    }

    /// Constant whose type follows from the value: `bool`, `i64`, `f64`,
    /// `string`, ``Expression`1`` for trees, `object` for anything else.
    pub fn literal(value: impl Into<Value>) -> Self {
        let value = value.into();
        let ty = match &value {
            Value::Bool(_) => Type::bool(),
            Value::Int(_) => Type::i64(),
            Value::Float(_) => Type::f64(),
            Value::String(_) => Type::string(),
            Value::Expr(tree) => Type::expression(tree.ty()),
            Value::Null | Value::Array(_) => Type::object(),
        };
        Self::constant(value, ty)
    }

    /// `i32` constant.
    pub fn int(value: i32) -> Self {
        Self::constant(value, Type::i32())
    }

    pub fn default_of(ty: Type) -> Self {
        Expr::Default(ty)
    }

    pub fn parameter(parameter: &Parameter) -> Self {
        Expr::Parameter(parameter.clone())
    }

    /// Unary operation without a custom method. For operators with an explicit
    /// result type the operand type is used; see [`Expr::convert`].
    pub fn unary(op: UnaryOp, operand: Expr) -> Self {
        let ty = op.has_explicit_type().then(|| operand.ty());
        Expr::Unary(UnaryExpr {
            op,
            operand: Box::new(operand),
            ty,
            method: None,
        })
    }

    pub fn unary_with_method(op: UnaryOp, operand: Expr, method: Member) -> Result<Self, Error> {
        if !op.accepts_method() {
            return Err(Error::MethodNotAccepted(op));
        }
        Ok(Expr::Unary(UnaryExpr {
            op,
            ty: op.has_explicit_type().then(|| operand.ty()),
            operand: Box::new(operand),
            method: Some(method),
        }))
    }

    /// Operation with an explicit result type (conversions, `as`, unboxing).
    pub fn unary_typed(
        op: UnaryOp,
        operand: Expr,
        ty: Type,
        method: Option<Member>,
    ) -> Result<Self, Error> {
        if !op.has_explicit_type() {
            return Err(Error::UnexpectedResultType(op));
        }
        if method.is_some() && !op.accepts_method() {
            return Err(Error::MethodNotAccepted(op));
        }
        Ok(Expr::Unary(UnaryExpr {
            op,
            operand: Box::new(operand),
            ty: Some(ty),
            method,
        }))
    }

    fn typed_unary(op: UnaryOp, operand: Expr, ty: Type) -> Self {
        Expr::Unary(UnaryExpr {
            op,
            operand: Box::new(operand),
            ty: Some(ty),
            method: None,
        })
    }

    pub fn convert(operand: Expr, ty: Type) -> Self {
        Self::typed_unary(UnaryOp::Convert, operand, ty)
    }

    pub fn convert_checked(operand: Expr, ty: Type) -> Self {
        Self::typed_unary(UnaryOp::ConvertChecked, operand, ty)
    }

    pub fn type_as(operand: Expr, ty: Type) -> Self {
        Self::typed_unary(UnaryOp::TypeAs, operand, ty)
    }

    pub fn unbox(operand: Expr, ty: Type) -> Self {
        Self::typed_unary(UnaryOp::Unbox, operand, ty)
    }

    unary_builders! {
        negate => Negate,
        negate_checked => NegateChecked,
        unary_plus => UnaryPlus,
        not => Not,
        ones_complement => OnesComplement,
        is_true => IsTrue,
        is_false => IsFalse,
        increment => Increment,
        decrement => Decrement,
        pre_increment_assign => PreIncrementAssign,
        pre_decrement_assign => PreDecrementAssign,
        post_increment_assign => PostIncrementAssign,
        post_decrement_assign => PostDecrementAssign,
        quote => Quote,
        array_length => ArrayLength,
    }

    /// Binary operation without a custom method.
    pub fn binary(op: BinaryOp, left: Expr, right: Expr) -> Self {
        Expr::Binary(BinaryExpr {
            op,
            left: Box::new(left),
            right: Box::new(right),
            lifted_to_null: false,
            method: None,
            conversion: None,
        })
    }

    pub fn binary_with_method(op: BinaryOp, left: Expr, right: Expr, method: Member) -> Self {
        let mut node = BinaryExpr {
            op,
            left: Box::new(left),
            right: Box::new(right),
            lifted_to_null: false,
            method: None,
            conversion: None,
        };
        if op.accepts_method() {
            node.method = Some(method);
        }
        Expr::Binary(node)
    }

    /// Comparison whose result is a nullable `bool` when an operand is null.
    pub fn lifted_comparison(
        op: BinaryOp,
        left: Expr,
        right: Expr,
        method: Option<Member>,
    ) -> Self {
        debug_assert!(op.is_comparison());
        Expr::Binary(BinaryExpr {
            op,
            left: Box::new(left),
            right: Box::new(right),
            lifted_to_null: true,
            method,
            conversion: None,
        })
    }

    /// Coalescing or compound assignment with a conversion lambda.
    pub fn binary_with_conversion(
        op: BinaryOp,
        left: Expr,
        right: Expr,
        method: Option<Member>,
        conversion: LambdaExpr,
    ) -> Self {
        debug_assert!(op.accepts_conversion());
        Expr::Binary(BinaryExpr {
            op,
            left: Box::new(left),
            right: Box::new(right),
            lifted_to_null: false,
            method,
            conversion: Some(Box::new(conversion)),
        })
    }

    binary_builders! {
        add => Add,
        add_checked => AddChecked,
        subtract => Subtract,
        subtract_checked => SubtractChecked,
        multiply => Multiply,
        multiply_checked => MultiplyChecked,
        divide => Divide,
        modulo => Modulo,
        power => Power,
        and => And,
        or => Or,
        exclusive_or => ExclusiveOr,
        and_also => AndAlso,
        or_else => OrElse,
        left_shift => LeftShift,
        right_shift => RightShift,
        equal => Equal,
        not_equal => NotEqual,
        less_than => LessThan,
        less_than_or_equal => LessThanOrEqual,
        greater_than => GreaterThan,
        greater_than_or_equal => GreaterThanOrEqual,
        coalesce => Coalesce,
        /// Element of a vector: `left[right]`.
        array_index => ArrayIndex,
        assign => Assign,
        add_assign => AddAssign,
        subtract_assign => SubtractAssign,
        multiply_assign => MultiplyAssign,
    }

    /// `test ? if_true : if_false`, typed after `if_true`.
    pub fn condition(test: Expr, if_true: Expr, if_false: Expr) -> Self {
        let ty = if_true.ty();
        Self::condition_typed(test, if_true, if_false, ty)
    }

    pub fn condition_typed(test: Expr, if_true: Expr, if_false: Expr, ty: Type) -> Self {
        Expr::Conditional(ConditionalExpr {
            test: Box::new(test),
            if_true: Box::new(if_true),
            if_false: Box::new(if_false),
            ty,
        })
    }

    /// Lambda with its natural `Func`/`Action` delegate type.
    pub fn lambda(parameters: impl IntoIterator<Item = Parameter>, body: Expr) -> Self {
        Expr::Lambda(LambdaExpr::new(parameters, body))
    }

    /// Lambda with an explicit delegate type. The delegate must accept as many
    /// parameters as the lambda declares when its signature is known.
    pub fn lambda_typed(
        ty: Type,
        parameters: impl IntoIterator<Item = Parameter>,
        body: Expr,
    ) -> Result<Self, Error> {
        LambdaExpr::typed(ty, parameters, body).map(Expr::Lambda)
    }

    /// Multi-dimensional array access.
    pub fn array_access(array: Expr, indexes: impl IntoIterator<Item = Expr>) -> Self {
        Expr::Index(IndexExpr {
            object: Box::new(array),
            indexer: None,
            arguments: indexes.into_iter().collect(),
        })
    }

    /// Indexed property access, `object[arguments]`.
    pub fn property_index(
        object: Expr,
        indexer: Member,
        arguments: impl IntoIterator<Item = Expr>,
    ) -> Self {
        Expr::Index(IndexExpr {
            object: Box::new(object),
            indexer: Some(indexer),
            arguments: arguments.into_iter().collect(),
        })
    }

    pub fn invoke(callee: Expr, arguments: impl IntoIterator<Item = Expr>) -> Self {
        Expr::Invoke(InvokeExpr {
            callee: Box::new(callee),
            arguments: arguments.into_iter().collect(),
        })
    }

    /// Field or property access on `object`.
    pub fn member(object: Expr, member: Member) -> Self {
        Expr::MemberAccess(MemberExpr {
            object: Some(Box::new(object)),
            member,
        })
    }

    pub fn static_member(member: Member) -> Self {
        Expr::MemberAccess(MemberExpr {
            object: None,
            member,
        })
    }

    pub fn call(object: Expr, method: Member, arguments: impl IntoIterator<Item = Expr>) -> Self {
        Expr::Call(CallExpr {
            object: Some(Box::new(object)),
            method,
            arguments: arguments.into_iter().collect(),
        })
    }

    pub fn static_call(method: Member, arguments: impl IntoIterator<Item = Expr>) -> Self {
        Expr::Call(CallExpr {
            object: None,
            method,
            arguments: arguments.into_iter().collect(),
        })
    }

    /// Default-initialized value of a value type.
    pub fn new_value(ty: Type) -> Self {
        Expr::New(NewExpr::Value(ty))
    }

    pub fn new_object(constructor: Member, arguments: impl IntoIterator<Item = Expr>) -> Self {
        Expr::New(NewExpr::constructor(constructor, arguments))
    }

    /// Anonymous type construction: each argument initializes the member at
    /// the same position.
    pub fn new_anonymous(
        constructor: Member,
        arguments: impl IntoIterator<Item = Expr>,
        members: impl IntoIterator<Item = Member>,
    ) -> Self {
        Expr::New(NewExpr::Constructor {
            constructor,
            arguments: arguments.into_iter().collect(),
            members: members.into_iter().collect(),
        })
    }

    pub fn member_init(new: NewExpr, bindings: impl IntoIterator<Item = MemberBinding>) -> Self {
        Expr::MemberInit(MemberInitExpr {
            new,
            bindings: bindings.into_iter().collect(),
        })
    }

    pub fn list_init(new: NewExpr, initializers: impl IntoIterator<Item = ElementInit>) -> Self {
        Expr::ListInit(ListInitExpr {
            new,
            initializers: initializers.into_iter().collect(),
        })
    }

    /// One-dimensional array holding `expressions`.
    pub fn new_array_init(element_type: Type, expressions: impl IntoIterator<Item = Expr>) -> Self {
        Expr::NewArrayInit(NewArrayExpr {
            element_type,
            expressions: expressions.into_iter().collect(),
        })
    }

    /// Array of `element_type` with one dimension per bound.
    pub fn new_array_bounds(
        element_type: Type,
        bounds: impl IntoIterator<Item = Expr>,
    ) -> Result<Self, Error> {
        let expressions: Vec<Expr> = bounds.into_iter().collect();
        if expressions.is_empty() {
            return Err(Error::EmptyArrayBounds);
        }
        Ok(Expr::NewArrayBounds(NewArrayExpr {
            element_type,
            expressions,
        }))
    }

    /// Block typed after its last expression.
    pub fn block(
        variables: impl IntoIterator<Item = Parameter>,
        expressions: impl IntoIterator<Item = Expr>,
    ) -> Self {
        let expressions: Vec<Expr> = expressions.into_iter().collect();
        let ty = expressions
            .last()
            .map(Expr::ty)
            .unwrap_or_else(Type::void);
        Self::block_typed(variables, expressions, ty)
    }

    pub fn block_typed(
        variables: impl IntoIterator<Item = Parameter>,
        expressions: impl IntoIterator<Item = Expr>,
        ty: Type,
    ) -> Self {
        Expr::Block(BlockExpr {
            variables: variables.into_iter().collect(),
            expressions: expressions.into_iter().collect(),
            ty,
        })
    }

    /// Jump of the given kind, typed `void`.
    pub fn jump(kind: GotoKind, target: &Label, value: Option<Expr>) -> Self {
        Self::jump_typed(kind, target, value, Type::void())
    }

    pub fn jump_typed(kind: GotoKind, target: &Label, value: Option<Expr>, ty: Type) -> Self {
        Expr::Goto(GotoExpr {
            kind,
            target: target.clone(),
            value: value.map(Box::new),
            ty,
        })
    }

    pub fn goto(target: &Label) -> Self {
        Self::jump(GotoKind::Goto, target, None)
    }

    pub fn return_value(target: &Label, value: Expr) -> Self {
        Self::jump(GotoKind::Return, target, Some(value))
    }

    pub fn break_to(target: &Label) -> Self {
        Self::jump(GotoKind::Break, target, None)
    }

    pub fn continue_to(target: &Label) -> Self {
        Self::jump(GotoKind::Continue, target, None)
    }

    pub fn label(target: &Label, default_value: Option<Expr>) -> Self {
        Expr::Label(LabelExpr {
            target: target.clone(),
            default_value: default_value.map(Box::new),
        })
    }

    pub fn loop_(body: Expr, break_label: Option<Label>, continue_label: Option<Label>) -> Self {
        Expr::Loop(LoopExpr {
            body: Box::new(body),
            break_label,
            continue_label,
        })
    }

    /// Switch typed after its first case (or default body).
    pub fn switch(
        value: Expr,
        cases: impl IntoIterator<Item = SwitchCase>,
        default_body: Option<Expr>,
    ) -> Self {
        let mut node = SwitchExpr {
            value: Box::new(value),
            cases: cases.into_iter().collect(),
            default_body: default_body.map(Box::new),
            comparison: None,
            ty: Type::void(),
        };
        node.ty = node.natural_type();
        Expr::Switch(node)
    }

    pub fn switch_typed(
        value: Expr,
        cases: impl IntoIterator<Item = SwitchCase>,
        default_body: Option<Expr>,
        comparison: Option<Member>,
        ty: Type,
    ) -> Self {
        Expr::Switch(SwitchExpr {
            value: Box::new(value),
            cases: cases.into_iter().collect(),
            default_body: default_body.map(Box::new),
            comparison,
            ty,
        })
    }

    /// Protected region typed after its body.
    pub fn try_catch(body: Expr, handlers: impl IntoIterator<Item = CatchBlock>) -> Self {
        let ty = body.ty();
        Self::try_full(body, handlers, None, None, ty)
    }

    pub fn try_finally(body: Expr, finally: Expr) -> Self {
        let ty = body.ty();
        Self::try_full(body, [], Some(finally), None, ty)
    }

    pub fn try_fault(body: Expr, fault: Expr) -> Self {
        let ty = body.ty();
        Self::try_full(body, [], None, Some(fault), ty)
    }

    pub fn try_full(
        body: Expr,
        handlers: impl IntoIterator<Item = CatchBlock>,
        finally: Option<Expr>,
        fault: Option<Expr>,
        ty: Type,
    ) -> Self {
        Expr::Try(TryExpr {
            body: Box::new(body),
            handlers: handlers.into_iter().collect(),
            finally: finally.map(Box::new),
            fault: fault.map(Box::new),
            ty,
        })
    }

    pub fn type_is(expression: Expr, type_operand: Type) -> Self {
        Expr::TypeIs(TypeBinaryExpr {
            expression: Box::new(expression),
            type_operand,
        })
    }

    pub fn type_equal(expression: Expr, type_operand: Type) -> Self {
        Expr::TypeEqual(TypeBinaryExpr {
            expression: Box::new(expression),
            type_operand,
        })
    }

    pub fn throw(value: Expr) -> Self {
        Expr::Throw(ThrowExpr {
            value: Some(Box::new(value)),
            ty: Type::void(),
        })
    }

    /// Rethrow the exception being handled.
    pub fn rethrow() -> Self {
        Expr::Throw(ThrowExpr {
            value: None,
            ty: Type::void(),
        })
    }
}

impl LambdaExpr {
    pub fn new(parameters: impl IntoIterator<Item = Parameter>, body: Expr) -> Self {
        let parameters: Vec<Parameter> = parameters.into_iter().collect();
        let ty = Self::natural_type_of(&parameters, &body);
        Self {
            ty,
            body: Box::new(body),
            parameters,
        }
    }

    pub fn typed(
        ty: Type,
        parameters: impl IntoIterator<Item = Parameter>,
        body: Expr,
    ) -> Result<Self, Error> {
        let parameters: Vec<Parameter> = parameters.into_iter().collect();
        if let Some((params, _)) = ty.delegate_signature() {
            if params.len() != parameters.len() {
                return Err(Error::DelegateArityMismatch {
                    delegate: ty.to_string(),
                    expected: params.len(),
                    found: parameters.len(),
                });
            }
        }
        Ok(Self {
            ty,
            body: Box::new(body),
            parameters,
        })
    }
}

impl NewExpr {
    pub fn constructor(constructor: Member, arguments: impl IntoIterator<Item = Expr>) -> Self {
        NewExpr::Constructor {
            constructor,
            arguments: arguments.into_iter().collect(),
            members: Vec::new(),
        }
    }
}

impl MemberBinding {
    pub fn assign(member: Member, expression: Expr) -> Self {
        MemberBinding::Assignment { member, expression }
    }

    pub fn nested(member: Member, bindings: impl IntoIterator<Item = MemberBinding>) -> Self {
        MemberBinding::Member {
            member,
            bindings: bindings.into_iter().collect(),
        }
    }

    pub fn list(member: Member, initializers: impl IntoIterator<Item = ElementInit>) -> Self {
        MemberBinding::List {
            member,
            initializers: initializers.into_iter().collect(),
        }
    }
}

impl ElementInit {
    pub fn new(add_method: Member, arguments: impl IntoIterator<Item = Expr>) -> Self {
        Self {
            add_method,
            arguments: arguments.into_iter().collect(),
        }
    }
}

impl SwitchCase {
    pub fn new(body: Expr, test_values: impl IntoIterator<Item = Expr>) -> Self {
        Self {
            body,
            test_values: test_values.into_iter().collect(),
        }
    }
}

impl CatchBlock {
    /// Handler for exceptions of type `test`, binding the exception to
    /// `variable` if given.
    pub fn new(test: Type, variable: Option<Parameter>, body: Expr) -> Self {
        Self {
            test,
            variable,
            body,
            filter: None,
        }
    }

    pub fn with_filter(mut self, filter: Expr) -> Self {
        self.filter = Some(filter);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lambda_gets_natural_delegate_type() {
        let x = Parameter::named(Type::i32(), "x");
        let lambda = Expr::lambda([x.clone()], Expr::add(Expr::parameter(&x), Expr::int(1)));
        assert_eq!(lambda.ty(), Type::func([Type::i32()], Type::i32()));

        let unit = Expr::lambda([], Expr::block([], []));
        assert_eq!(unit.ty(), Type::action([]));
    }

    #[test]
    fn typed_lambda_checks_arity() {
        let x = Parameter::named(Type::i32(), "x");
        let err = Expr::lambda_typed(Type::action([]), [x], Expr::block([], [])).unwrap_err();
        assert!(err.is_delegate_arity_mismatch());
    }

    #[test]
    fn bounds_are_required() {
        assert_eq!(
            Expr::new_array_bounds(Type::i32(), []).unwrap_err(),
            Error::EmptyArrayBounds
        );
        let matrix =
            Expr::new_array_bounds(Type::i32(), [Expr::int(2), Expr::int(3)]).unwrap();
        assert_eq!(matrix.ty(), Type::array_of_rank(Type::i32(), 2));
    }

    #[test]
    fn unary_extras_are_checked() {
        let length = Member::property(Type::array(Type::i32()), "Length", Type::i32());
        let array = || Expr::new_array_init(Type::i32(), []);
        assert_eq!(
            Expr::unary_with_method(UnaryOp::ArrayLength, array(), length.clone()).unwrap_err(),
            Error::MethodNotAccepted(UnaryOp::ArrayLength)
        );
        assert_eq!(
            Expr::unary_typed(UnaryOp::Negate, Expr::int(1), Type::i64(), None).unwrap_err(),
            Error::UnexpectedResultType(UnaryOp::Negate)
        );
        assert!(
            Expr::unary_typed(UnaryOp::TypeAs, array(), Type::object(), Some(length))
                .unwrap_err()
                .is_method_not_accepted()
        );

        let parse = Member::method(Type::i32(), "op_Explicit", [Type::f64()], Type::i32());
        let converted =
            Expr::unary_typed(UnaryOp::Convert, Expr::literal(1.5), Type::i32(), Some(parse))
                .unwrap();
        assert_eq!(converted.ty(), Type::i32());
    }

    #[test]
    fn comparison_types() {
        let cmp = Expr::less_than(Expr::int(1), Expr::int(2));
        assert_eq!(cmp.ty(), Type::bool());
        let lifted = Expr::lifted_comparison(BinaryOp::Equal, Expr::int(1), Expr::int(2), None);
        assert_eq!(lifted.ty(), Type::nullable(Type::bool()));
    }

    #[test]
    fn quote_and_invoke_types() {
        let lambda = Expr::lambda([], Expr::int(3));
        let quoted = Expr::quote(lambda.clone());
        assert_eq!(quoted.ty(), Type::expression(Type::func([], Type::i32())));
        assert_eq!(Expr::invoke(lambda, []).ty(), Type::i32());
        assert_eq!(Expr::invoke(quoted, []).ty(), Type::i32());
    }
}
