/// Parser contract tests: JSON text to `Value`, including the error surface.
use mfjson_core::{parse, parse_with_limits, Limits, ParseErrorKind, Value};

fn kind_of(input: &str) -> ParseErrorKind {
    parse(input).unwrap_err().kind
}

// ============================================================================
// Documents
// ============================================================================

#[test]
fn basic_deserialization() {
    let json = r#"[{"stringtest":"hello world","nulltest":null,"collection":[-1,null,24.565657576,"blah",false]}]"#;
    let tree = parse(json).unwrap();
    assert_eq!(tree.len(), 1);

    let table = &tree[0];
    assert_eq!(table.len(), 3);
    assert_eq!(table["stringtest"].as_str(), Some("hello world"));
    assert!(table["nulltest"].is_null());

    let collection = &table["collection"];
    assert_eq!(collection.len(), 5);
    assert_eq!(collection[0], Value::Integer(-1));
    assert!(collection[1].is_null());
    assert_eq!(collection[2], Value::Float(24.565657576));
    assert_eq!(collection[3].as_str(), Some("blah"));
    assert_eq!(collection[4], Value::Bool(false));
}

#[test]
fn whitespace_between_tokens() {
    let tree = parse(" \t\r\n{ \"a\" :\n[ 1 , 2 ] }\n").unwrap();
    assert_eq!(tree["a"][1], Value::Integer(2));
}

#[test]
fn number_classification() {
    assert_eq!(parse("0").unwrap(), Value::Integer(0));
    assert_eq!(parse("-0").unwrap(), Value::Integer(0));
    assert_eq!(parse("1.0").unwrap(), Value::Float(1.0));
    assert_eq!(parse("1e2").unwrap(), Value::Float(100.0));
    assert_eq!(parse("-2.5E-3").unwrap(), Value::Float(-0.0025));
    assert_eq!(
        parse("9223372036854775807").unwrap(),
        Value::Integer(i64::MAX)
    );
    assert_eq!(
        parse("-9223372036854775808").unwrap(),
        Value::Integer(i64::MIN)
    );
    assert_eq!(
        parse("9223372036854775808").unwrap(),
        Value::Float(9223372036854775808.0)
    );
}

#[test]
fn malformed_numbers() {
    for bad in ["01", "-", "1.", ".5", "1e", "1e+", "+1", "--1", "0x10"] {
        assert!(parse(bad).is_err(), "accepted {bad:?}");
    }
    assert_eq!(kind_of("1e400"), ParseErrorKind::NumberOutOfRange);
}

#[test]
fn string_escapes_decoded() {
    let tree = parse(r#""a\"b\\c\/d\b\f\n\r\tAé😀""#).unwrap();
    assert_eq!(
        tree.as_str(),
        Some("a\"b\\c/d\u{08}\u{0c}\n\r\tAé\u{1F600}")
    );
}

#[test]
fn string_errors() {
    assert_eq!(kind_of("\"abc"), ParseErrorKind::UnterminatedString);
    assert_eq!(kind_of("\"a\u{01}b\""), ParseErrorKind::ControlCharacter(0x01));
    assert_eq!(kind_of(r#""\x""#), ParseErrorKind::InvalidEscape('x'));
    assert_eq!(kind_of(r#""\u12G4""#), ParseErrorKind::InvalidUnicodeEscape);
    assert_eq!(kind_of(r#""\ud83d""#), ParseErrorKind::LoneSurrogate(0xd83d));
    assert_eq!(kind_of(r#""\ude00""#), ParseErrorKind::LoneSurrogate(0xde00));
}

#[test]
fn literal_errors() {
    assert_eq!(kind_of("nul"), ParseErrorKind::InvalidLiteral);
    assert_eq!(kind_of("True"), ParseErrorKind::UnexpectedCharacter('T'));
}

#[test]
fn duplicate_keys_preserved_last_wins_on_lookup() {
    let tree = parse(r#"{"id":1,"id":2}"#).unwrap();
    assert_eq!(tree.len(), 2);
    assert_eq!(tree["id"], Value::Integer(2));
    assert_eq!(tree.to_json_string().unwrap(), r#"{"id":1,"id":2}"#);
}

#[test]
fn canonical_output_drops_whitespace_only() {
    let text = "{ \"b\" : [ 1 , 2.50 , \"x/y\" ] , \"a\" : null }";
    assert_eq!(
        parse(text).unwrap().to_json_string().unwrap(),
        r#"{"b":[1,2.5,"x/y"],"a":null}"#
    );
}

// ============================================================================
// Positions and limits
// ============================================================================

#[test]
fn error_position_counts_characters() {
    let err = parse("[\"é\", x]").unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::UnexpectedCharacter('x'));
    assert_eq!(err.offset, 7);
    assert_eq!((err.line, err.column), (1, 7));
}

#[test]
fn error_display_includes_position() {
    let err = parse("[1,\n  ]").unwrap_err();
    assert_eq!(
        err.to_string(),
        "parse error at line 2, column 3: expected a value"
    );
}

#[test]
fn strict_limits() {
    let deep = format!("{}{}", "[".repeat(33), "]".repeat(33));
    let err = parse_with_limits(&deep, Limits::strict()).unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::NestingTooDeep(32));

    let shallow = format!("{}{}", "[".repeat(32), "]".repeat(32));
    assert!(parse_with_limits(&shallow, Limits::strict()).is_ok());
}

#[test]
fn deep_objects_hit_limit() {
    let deep = "{\"a\":".repeat(200);
    assert_eq!(kind_of(&deep), ParseErrorKind::NestingTooDeep(128));
}
