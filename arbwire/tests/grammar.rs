use arbwire::{WireError, deserialize};
use serde_json::{Value as Json, json};

fn envelope(expression: Json) -> Json {
    json!({
        "Context": {
            "Types": [["::", "i32"], ["::", "bool"]],
            "Members": [["m", 0, "Parse", [0], 0]],
            "Labels": [[0, "end"]],
        },
        "Expression": expression,
    })
}

fn decode_err(expression: Json) -> WireError {
    deserialize(&envelope(expression)).expect_err("decoding should fail")
}

#[test]
fn unknown_discriminator_is_named() {
    let err = decode_err(json!(["???", 1, 2]));
    match &err {
        WireError::UnknownDiscriminator { token, node } => {
            assert_eq!(token, "???");
            assert_eq!(node, &json!(["???", 1, 2]));
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert!(err.to_string().contains("???"));
    assert!(err.is_grammar());
}

#[test]
fn binary_arity_is_checked() {
    let one = json!([":", 1, 0]);
    for bad in [
        json!(["+", one]),
        json!(["+", one, one, null, null, null]),
    ] {
        let err = decode_err(bad.clone());
        assert!(err.is_arity(), "{err}");
        assert_eq!(err.node(), Some(&bad));
    }
    let err = decode_err(json!(["+", one]));
    assert_eq!(err.to_string(), "Node `Add` has 2 elements, expected 3, 4 or 5.");
}

#[test]
fn innermost_node_is_reported() {
    let err = decode_err(json!(["?:", [":", true, 1], ["df"], ["df", 0]]));
    assert!(err.is_arity());
    assert_eq!(err.node(), Some(&json!(["df"])));
    let rendered = err.render();
    assert!(rendered.starts_with("Node `Default` has 1 elements"));
    assert!(rendered.contains("-->"));
}

#[test]
fn shape_errors() {
    for bad in [
        json!(5),
        json!("$"),
        json!([]),
        json!([1, 2]),
        json!(["df", "zero"]),
        json!(["{}", {}]),
        json!(["->", 9, 0]),
        json!(["->", "break", 0]),
        json!(["$", 0]),
        json!(["[n]", 0, []]),
    ] {
        let err = decode_err(bad.clone());
        assert!(err.is_malformed(), "{bad} gave {err}");
    }
}

#[test]
fn nested_structures_are_validated() {
    // a lambda declaration with too many elements
    assert!(decode_err(json!(["=>", null, [":", 1, 0], [[0, "x", 1]]])).is_arity());
    // member initializer not headed by `new`
    assert!(decode_err(json!(["{=}", ["df", 0], []])).is_malformed());
    // unknown binding kind
    let err = decode_err(json!(["{=}", ["new", 0], [[".?", 0, [":", 1, 0]]]]));
    assert!(err.is_unknown_discriminator());
    // switch case with a missing test list
    assert!(decode_err(json!(["sw", [":", 1, 0], [[[":", 1, 0]]], null])).is_arity());
    // conversion slot holding something else than a lambda
    assert!(decode_err(json!(["??", [":", 1, 0], [":", 2, 0], null, [":", 3, 0]])).is_malformed());
    // typed lambda whose delegate disagrees with its parameters
    let context = json!({
        "Types": [["::", "i32"], ["::", "Func`2"], ["<>", 1, [0, 0]]],
    });
    let err = deserialize(&json!({
        "Context": context,
        "Expression": ["=>", 2, [":", 1, 0], []],
    }))
    .unwrap_err();
    assert!(err.is_malformed());
}

#[test]
fn unary_method_only_where_accepted() {
    let one = json!([":", 1, 0]);
    assert!(decode_err(json!(["#", one, 0])).is_malformed());
    assert!(decode_err(json!(["as", one, 0, 0])).is_malformed());
    assert!(decode_err(json!(["'", one, 0])).is_malformed());

    // a custom negation and a conversion through a method are fine
    let wire = envelope(json!(["u-", one, 0]));
    assert!(deserialize(&wire).is_ok());
    let wire = envelope(json!(["<:", one, 0, 0]));
    assert!(deserialize(&wire).is_ok());
}

#[test]
fn reference_errors() {
    assert!(decode_err(json!(["df", 2])).is_index_out_of_range());
    assert!(decode_err(json!([".", 4])).is_index_out_of_range());
    assert!(decode_err(json!(["L:", 1])).is_index_out_of_range());
    assert!(decode_err(json!(["$", "x"])).is_reference());

    let err = decode_err(json!(["df", 2]));
    assert_eq!(
        err.to_string(),
        "Type index 2 is out of range (the context holds 2 entries)."
    );
}

#[test]
fn envelope_is_validated() {
    assert!(deserialize(&json!({"Expression": null})).unwrap_err().is_malformed());
    assert!(deserialize(&json!({"Context": [], "Expression": null})).unwrap_err().is_malformed());
    assert!(
        deserialize(&json!({"Context": {"Kinds": []}, "Expression": null}))
            .unwrap_err()
            .is_malformed()
    );
    assert!(arbwire::from_str("{\"Context\": {").unwrap_err().is_json());
}
