use arbexpr::equality::structurally_equal;
use arbexpr::expr::{CatchBlock, Expr, MemberBinding, NewExpr};
use arbexpr::{Label, Member, Parameter, Type};

fn counter_loop(limit: i32) -> Expr {
    let i = Parameter::named(Type::i32(), "i");
    let exit = Label::named(Type::void(), "exit");
    Expr::block(
        [i.clone()],
        [
            Expr::assign(Expr::parameter(&i), Expr::int(0)),
            Expr::loop_(
                Expr::condition(
                    Expr::less_than(Expr::parameter(&i), Expr::int(limit)),
                    Expr::post_increment_assign(Expr::parameter(&i)),
                    Expr::break_to(&exit),
                ),
                Some(exit),
                None,
            ),
        ],
    )
}

#[test]
fn independently_built_trees_are_equal() {
    assert!(structurally_equal(&counter_loop(10), &counter_loop(10)));
    assert!(!structurally_equal(&counter_loop(10), &counter_loop(11)));
}

#[test]
fn shadowing_pattern_is_significant() {
    let outer = Parameter::named(Type::i32(), "x");
    let inner = Parameter::named(Type::i32(), "x");

    // x => x => x (inner)
    let a = Expr::lambda(
        [outer.clone()],
        Expr::lambda([inner.clone()], Expr::parameter(&inner)),
    );
    // x => x => x (outer)
    let b = Expr::lambda(
        [outer.clone()],
        Expr::lambda([inner.clone()], Expr::parameter(&outer)),
    );
    assert!(structurally_equal(&a, &a.clone()));
    assert!(!structurally_equal(&a, &b));
}

#[test]
fn catch_variables_take_part_in_the_pairing() {
    let exception = Type::simple("Exception");
    let build = |bind: bool| {
        let e = Parameter::named(exception.clone(), "e");
        let handler = CatchBlock::new(
            exception.clone(),
            bind.then(|| e.clone()),
            Expr::throw(Expr::parameter(&e)),
        );
        Expr::try_catch(Expr::int(0), [handler])
    };
    assert!(structurally_equal(&build(true), &build(true)));
    assert!(!structurally_equal(&build(true), &build(false)));
}

#[test]
fn member_bindings_compare_members_structurally() {
    let ty = Type::simple("Options");
    let ctor = Member::constructor(ty.clone(), []);
    let verbose = Member::property(ty.clone(), "Verbose", Type::bool());
    let a = Expr::member_init(
        NewExpr::constructor(ctor.clone(), []),
        [MemberBinding::assign(verbose, Expr::literal(true))],
    );
    let b = Expr::member_init(
        NewExpr::constructor(ctor, []),
        [MemberBinding::assign(
            Member::property(ty, "Verbose", Type::bool()),
            Expr::literal(true),
        )],
    );
    assert_eq!(a, b);
    assert!(structurally_equal(&a, &b));
}
