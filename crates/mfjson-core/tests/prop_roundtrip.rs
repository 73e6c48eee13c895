/// Property-based tests for the codec.
///
/// - scalars survive `parse(serialize(v))` unchanged
/// - dates survive the ISO-8601 and Ajax formats at millisecond precision
/// - the parser agrees with `serde_json` on documents `serde_json` writes
/// - canonical output is a fixed point of parse + serialize
use chrono::DateTime;
use mfjson_core::{
    from_ajax, from_iso8601, parse, serialize, to_ajax, to_iso8601, Registry, Value,
};
use proptest::prelude::*;

// ============================================================================
// Strategies
// ============================================================================

/// Milliseconds between 0000-01-01 and 9999-12-31T23:59:59.999.
const MIN_MILLIS: i64 = -62_167_219_200_000;
const MAX_MILLIS: i64 = 253_402_300_799_999;

fn arb_key() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-zA-Z_][a-zA-Z0-9_]{0,12}",
        Just(String::new()),
        Just("quote\"d".to_string()),
        Just("caf\u{00e9}".to_string()),
    ]
}

fn arb_string() -> impl Strategy<Value = String> {
    prop_oneof![
        any::<String>(),
        "[ -~]{0,24}",
        Just("path\\to/file".to_string()),
        Just("line1\nline2\ttab\u{0001}".to_string()),
        Just("\u{1F600}\u{4f60}\u{597d}".to_string()),
    ]
}

fn arb_float() -> impl Strategy<Value = f64> {
    prop_oneof![
        any::<f64>().prop_filter("finite", |f| f.is_finite()),
        (-1_000_000i64..1_000_000, 0u32..6).prop_map(|(m, d)| m as f64 / 10f64.powi(d as i32)),
    ]
}

fn arb_json_leaf() -> impl Strategy<Value = serde_json::Value> {
    prop_oneof![
        Just(serde_json::Value::Null),
        any::<bool>().prop_map(serde_json::Value::Bool),
        any::<i64>().prop_map(serde_json::Value::from),
        arb_float().prop_filter_map("representable", |f| {
            serde_json::Number::from_f64(f).map(serde_json::Value::Number)
        }),
        arb_string().prop_map(serde_json::Value::String),
    ]
}

fn arb_json() -> impl Strategy<Value = serde_json::Value> {
    arb_json_leaf().prop_recursive(4, 48, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(serde_json::Value::Array),
            prop::collection::vec((arb_key(), inner), 0..6).prop_map(|pairs| {
                serde_json::Value::Object(pairs.into_iter().collect())
            }),
        ]
    })
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn integers_round_trip(n in any::<i64>()) {
        let json = serialize(&n, &Registry::new()).unwrap();
        prop_assert_eq!(parse(&json).unwrap(), Value::Integer(n));
    }

    #[test]
    fn booleans_round_trip(b in any::<bool>()) {
        let json = serialize(&b, &Registry::new()).unwrap();
        prop_assert_eq!(parse(&json).unwrap(), Value::Bool(b));
    }

    #[test]
    fn strings_round_trip(s in arb_string()) {
        let json = serialize(&s, &Registry::new()).unwrap();
        prop_assert_eq!(parse(&json).unwrap(), Value::String(s));
    }

    #[test]
    fn floats_round_trip_as_floats(f in arb_float()) {
        let json = serialize(&f, &Registry::new()).unwrap();
        prop_assert_eq!(parse(&json).unwrap(), Value::Float(f));
    }

    #[test]
    fn iso8601_round_trip(ms in MIN_MILLIS..=MAX_MILLIS) {
        let t = DateTime::from_timestamp_millis(ms).unwrap();
        let text = to_iso8601(&t).unwrap();
        prop_assert_eq!(text.len(), 24);
        prop_assert_eq!(from_iso8601(&text).unwrap(), t);
    }

    #[test]
    fn ajax_round_trip(ms in MIN_MILLIS..=MAX_MILLIS) {
        let t = DateTime::from_timestamp_millis(ms).unwrap();
        prop_assert_eq!(from_ajax(&to_ajax(&t)).unwrap(), t);
    }

    #[test]
    fn parser_agrees_with_serde_json(doc in arb_json()) {
        let text = serde_json::to_string(&doc).unwrap();
        let parsed: serde_json::Value = parse(&text).unwrap().into();
        prop_assert_eq!(parsed, doc);
    }

    #[test]
    fn canonical_output_is_stable(doc in arb_json()) {
        let pretty = serde_json::to_string_pretty(&doc).unwrap();
        let once = parse(&pretty).unwrap().to_json_string().unwrap();
        let twice = parse(&once).unwrap().to_json_string().unwrap();
        prop_assert_eq!(once, twice);
    }
}
