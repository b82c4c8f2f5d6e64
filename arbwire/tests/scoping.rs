use arbexpr::equality::structurally_equal;
use arbexpr::expr::CatchBlock;
use arbexpr::{Expr, Parameter, Type};
use arbwire::{deserialize, serialize};
use serde_json::json;

#[test]
fn shadowed_lambda_parameters() {
    let outer = Parameter::named(Type::i32(), "x");
    let inner = Parameter::named(Type::i32(), "x");
    let tree = Expr::lambda(
        [outer.clone()],
        Expr::lambda(
            [inner.clone()],
            Expr::add(Expr::parameter(&outer), Expr::parameter(&inner)),
        ),
    );

    let wire = serialize(&tree).unwrap();
    assert_eq!(
        wire["Expression"],
        json!([
            "=>", null,
            ["=>", null, ["+", ["$", "x", 1], ["$", "x"]], [[0, "x"]]],
            [[0, "x"]]
        ])
    );

    let back = deserialize(&wire).unwrap();
    assert!(structurally_equal(&tree, &back));

    let Expr::Lambda(outer_lambda) = &back else {
        panic!("expected a lambda");
    };
    let Expr::Lambda(inner_lambda) = outer_lambda.body.as_ref() else {
        panic!("expected a nested lambda");
    };
    let Expr::Binary(add) = inner_lambda.body.as_ref() else {
        panic!("expected an addition");
    };
    let decoded_outer = &outer_lambda.parameters[0];
    let decoded_inner = &inner_lambda.parameters[0];
    assert_ne!(decoded_outer, decoded_inner);
    assert_eq!(*add.left, Expr::Parameter(decoded_outer.clone()));
    assert_eq!(*add.right, Expr::Parameter(decoded_inner.clone()));
}

#[test]
fn swapping_shadowed_references_is_detected() {
    let outer = Parameter::named(Type::i32(), "x");
    let inner = Parameter::named(Type::i32(), "x");
    let build = |left: &Parameter, right: &Parameter| {
        Expr::lambda(
            [outer.clone()],
            Expr::lambda(
                [inner.clone()],
                Expr::subtract(Expr::parameter(left), Expr::parameter(right)),
            ),
        )
    };
    let tree = build(&outer, &inner);
    let swapped = build(&inner, &outer);
    let back = deserialize(&serialize(&tree).unwrap()).unwrap();
    assert!(structurally_equal(&tree, &back));
    assert!(!structurally_equal(&swapped, &back));
}

#[test]
fn duplicate_names_in_one_frame() {
    let first = Parameter::named(Type::i32(), "a");
    let second = Parameter::named(Type::i32(), "a");
    let tree = Expr::block(
        [first.clone(), second.clone()],
        [
            Expr::assign(Expr::parameter(&first), Expr::int(1)),
            Expr::assign(Expr::parameter(&second), Expr::int(2)),
            Expr::subtract(Expr::parameter(&second), Expr::parameter(&first)),
        ],
    );
    let wire = serialize(&tree).unwrap();
    assert_eq!(
        wire["Expression"][1][2],
        json!(["-", ["$", "a", 1], ["$", "a"]])
    );
    assert_eq!(wire["Expression"][2], json!([[0, "a"], [0, "a"]]));

    let back = deserialize(&wire).unwrap();
    assert!(structurally_equal(&tree, &back));
}

#[test]
fn unnamed_variables() {
    let p = Parameter::unnamed(Type::i32());
    let q = Parameter::unnamed(Type::i32());
    let tree = Expr::lambda([p.clone(), q.clone()], Expr::multiply(Expr::parameter(&q), Expr::parameter(&p)));
    let wire = serialize(&tree).unwrap();
    assert_eq!(
        wire["Expression"],
        json!(["=>", null, ["*", ["$", "", 1], ["$", ""]], [[0], [0]]])
    );
    assert!(structurally_equal(&tree, &deserialize(&wire).unwrap()));
}

#[test]
fn catch_variable_is_scoped_to_its_handler() {
    let error = Type::simple("Exception");
    let e = Parameter::named(error.clone(), "e");
    let tree = Expr::try_catch(
        Expr::block([], []),
        [CatchBlock::new(error.clone(), Some(e.clone()), Expr::throw(Expr::parameter(&e)))
            .with_filter(Expr::type_is(Expr::parameter(&e), error.clone()))],
    );
    let back = deserialize(&serialize(&tree).unwrap()).unwrap();
    assert!(structurally_equal(&tree, &back));

    // the same variable referenced from the protected body is free there
    let leaking = Expr::try_catch(
        Expr::throw(Expr::parameter(&e)),
        [CatchBlock::new(error, Some(e.clone()), Expr::block([], []))],
    );
    assert!(serialize(&leaking).unwrap_err().is_unbound_parameter());
}

#[test]
fn free_variables_are_rejected() {
    let x = Parameter::named(Type::i32(), "x");
    let err = serialize(&Expr::negate(Expr::parameter(&x))).unwrap_err();
    assert!(err.is_unbound_parameter());
    assert!(err.is_reference());

    // a block variable does not outlive its block
    let tree = Expr::block(
        [],
        [
            Expr::block([x.clone()], [Expr::parameter(&x)]),
            Expr::parameter(&x),
        ],
    );
    assert!(serialize(&tree).unwrap_err().is_unbound_parameter());
}

#[test]
fn unresolved_references() {
    let context = json!({"Types": [["::", "i32"]]});
    for (expression, name, skip) in [
        (json!(["=>", null, ["$", "y"], [[0, "x"]]]), "y", 0),
        (json!(["=>", null, ["$", "x", 1], [[0, "x"]]]), "x", 1),
        (json!(["{}", [["$", "x"]]]), "x", 0),
    ] {
        let err = deserialize(&json!({"Context": context, "Expression": expression})).unwrap_err();
        match err {
            arbwire::WireError::UnresolvedVariable {
                name: found,
                skip: found_skip,
                ..
            } => {
                assert_eq!(found, name);
                assert_eq!(found_skip, skip);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }
}
