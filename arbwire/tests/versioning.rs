use arbexpr::{Expr, Member, Parameter, Type};
use arbwire::{Codec, CodecOptions, Version, WireError};
use serde_json::json;

fn codec(version: Version) -> Codec {
    Codec::new(CodecOptions::default().with_version(version))
}

fn indexed() -> Expr {
    let grid = Parameter::named(Type::array_of_rank(Type::i32(), 2), "grid");
    Expr::lambda(
        [grid.clone()],
        Expr::array_access(Expr::parameter(&grid), [Expr::int(0), Expr::int(0)]),
    )
}

#[test]
fn indexer_requires_newer_version() {
    let err = codec(Version::V0_8).serialize(&indexed()).unwrap_err();
    match &err {
        WireError::UnsupportedByVersion { construct, version } => {
            assert_eq!(*construct, "Indexer access");
            assert_eq!(*version, Version::V0_8);
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert_eq!(
        err.to_string(),
        "Indexer access is not supported by wire version 0.8."
    );

    let wire = codec(Version::V0_9).serialize(&indexed()).unwrap();
    assert_eq!(wire["Expression"][2][0], json!("[.]"));
}

#[test]
fn indexer_is_rejected_when_decoding_older_version() {
    let wire = codec(Version::V0_9).serialize(&indexed()).unwrap();
    let err = codec(Version::V0_8).deserialize(&wire).unwrap_err();
    assert!(err.is_unsupported_by_version());
}

#[test]
fn property_indexer_is_gated_too() {
    let list = Type::generic(Type::simple("List`1"), [Type::i32()]);
    let item = Member::indexer(list.clone(), "Item", Type::i32(), [Type::i32()]);
    let tree = Expr::property_index(Expr::new_value(list), item, [Expr::int(3)]);
    assert!(codec(Version::V0_8).serialize(&tree).unwrap_err().is_unsupported_by_version());
    let wire = codec(Version::V0_9).serialize(&tree).unwrap();
    assert_eq!(wire["Expression"].as_array().map(Vec::len), Some(4));
}

#[test]
fn explicit_conditional_type() {
    let tree = Expr::condition_typed(Expr::literal(true), Expr::int(1), Expr::int(2), Type::object());
    let err = codec(Version::V0_8).serialize(&tree).unwrap_err();
    assert!(err.is_unsupported_by_version());
    assert!(err.to_string().contains("0.8"));

    let wire = codec(Version::V0_9).serialize(&tree).unwrap();
    assert_eq!(wire["Expression"].as_array().map(Vec::len), Some(5));
    assert!(codec(Version::V0_8).deserialize(&wire).unwrap_err().is_unsupported_by_version());

    // a type equal to the natural one is not written, so any version accepts it
    let natural = Expr::condition_typed(Expr::literal(true), Expr::int(1), Expr::int(2), Type::i32());
    let old = codec(Version::V0_8).serialize(&natural).unwrap();
    assert_eq!(old, codec(Version::V0_9).serialize(&natural).unwrap());
}

#[test]
fn portable_trees_encode_identically() {
    let x = Parameter::named(Type::f64(), "x");
    let tree = Expr::lambda(
        [x.clone()],
        Expr::condition(
            Expr::greater_than(Expr::parameter(&x), Expr::literal(0.0)),
            Expr::parameter(&x),
            Expr::negate(Expr::parameter(&x)),
        ),
    );
    assert_eq!(
        codec(Version::V0_8).serialize(&tree).unwrap(),
        codec(Version::V0_9).serialize(&tree).unwrap()
    );
}

#[test]
fn version_from_configuration() {
    let options = CodecOptions::from_toml_str("version = \"0.8\"\nmax_depth = 64\n").unwrap();
    assert_eq!(options.version, Version::V0_8);
    assert_eq!(options.max_depth, 64);
    assert!(!options.merge_context);
    assert!(Codec::new(options).serialize(&indexed()).is_err());

    assert!(CodecOptions::from_toml_str("version = \"1.0\"").unwrap_err().is_config());
    assert_eq!(Version::LATEST.to_string(), "0.9");
}
