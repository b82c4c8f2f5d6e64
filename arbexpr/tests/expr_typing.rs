use arbexpr::expr::{BinaryOp, CatchBlock, Expr, GotoKind, NewExpr, SwitchCase, UnaryOp};
use arbexpr::{Label, Member, Parameter, Type};

fn point() -> Type {
    Type::qualified("Point", "geometry")
}

#[test]
fn operator_result_types() {
    let one = Expr::int(1);
    assert_eq!(Expr::add(one.clone(), Expr::int(2)).ty(), Type::i32());
    assert_eq!(Expr::is_true(Expr::literal(true)).ty(), Type::bool());
    assert_eq!(Expr::convert(one.clone(), Type::i64()).ty(), Type::i64());
    assert_eq!(Expr::unary(UnaryOp::Convert, one.clone()).ty(), Type::i32());

    let op_add = Member::method(point(), "op_Addition", [point(), point()], point());
    let sum = Expr::binary_with_method(
        BinaryOp::Add,
        Expr::new_value(point()),
        Expr::new_value(point()),
        op_add,
    );
    assert_eq!(sum.ty(), point());

    let array = Expr::new_array_init(Type::string(), [Expr::literal("a")]);
    assert_eq!(array.ty(), Type::array(Type::string()));
    assert_eq!(Expr::array_length(array.clone()).ty(), Type::i32());
    assert_eq!(Expr::array_index(array, one).ty(), Type::string());
}

#[test]
fn assignment_keeps_target_type() {
    let x = Parameter::named(Type::i64(), "x");
    let assign = Expr::assign(Expr::parameter(&x), Expr::literal(4i64));
    assert_eq!(assign.ty(), Type::i64());
    assert_eq!(Expr::post_increment_assign(Expr::parameter(&x)).ty(), Type::i64());
}

#[test]
fn member_and_construction_types() {
    let x = Member::field(point(), "X", Type::f64());
    let ctor = Member::constructor(point(), [Type::f64(), Type::f64()]);
    let made = Expr::new_object(ctor.clone(), [Expr::literal(1.0), Expr::literal(2.0)]);
    assert_eq!(made.ty(), point());
    assert_eq!(Expr::member(made, x).ty(), Type::f64());
    assert_eq!(Expr::list_init(NewExpr::constructor(ctor, []), []).ty(), point());

    let item = Member::indexer(point(), "Item", Type::f64(), [Type::i32()]);
    let indexed = Expr::property_index(Expr::new_value(point()), item, [Expr::int(0)]);
    assert_eq!(indexed.ty(), Type::f64());

    let grid = Expr::new_array_bounds(Type::bool(), [Expr::int(2), Expr::int(2)]).unwrap();
    let cell = Expr::array_access(grid, [Expr::int(0), Expr::int(1)]);
    assert_eq!(cell.ty(), Type::bool());
}

#[test]
fn control_flow_types() {
    let ret = Label::named(Type::i32(), "ret");
    let body = Expr::block(
        [],
        [
            Expr::return_value(&ret, Expr::int(1)),
            Expr::label(&ret, Some(Expr::int(0))),
        ],
    );
    assert_eq!(body.ty(), Type::i32());

    let brk = Label::unnamed(Type::string());
    let lp = Expr::loop_(Expr::jump(GotoKind::Break, &brk, Some(Expr::literal("done"))), Some(brk), None);
    assert_eq!(lp.ty(), Type::string());

    let sw = Expr::switch(
        Expr::int(3),
        [SwitchCase::new(Expr::literal("three"), [Expr::int(3)])],
        Some(Expr::literal("other")),
    );
    assert_eq!(sw.ty(), Type::string());

    let e = Parameter::named(Type::simple("Exception"), "e");
    let tr = Expr::try_catch(
        Expr::int(1),
        [CatchBlock::new(Type::simple("Exception"), Some(e), Expr::int(2))],
    );
    assert_eq!(tr.ty(), Type::i32());
    assert!(Expr::rethrow().ty().is_void());
    assert_eq!(Expr::type_is(Expr::int(1), Type::object()).ty(), Type::bool());
}
