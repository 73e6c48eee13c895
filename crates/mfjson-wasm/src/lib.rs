//! WASM bindings for mfjson-core.
//!
//! Exposes canonicalization and the ISO-8601 date helpers as
//! `#[wasm_bindgen]` functions. Errors surface in JavaScript as thrown
//! strings.
//!
//! ## Build process
//!
//! ```sh
//! cargo build -p mfjson-wasm --target wasm32-unknown-unknown --release
//! wasm-bindgen --target nodejs --out-dir pkg/ \
//!   target/wasm32-unknown-unknown/release/mfjson_wasm.wasm
//! ```

use wasm_bindgen::prelude::*;

/// Parse JSON text and return it in canonical compact form.
///
/// Throws if the input is not valid JSON.
#[wasm_bindgen]
pub fn canonicalize(json: &str) -> std::result::Result<String, JsValue> {
    canonicalize_impl(json).map_err(|e| JsValue::from_str(&e))
}

/// Format epoch milliseconds as `YYYY-MM-DDTHH:mm:ss.fffZ`.
///
/// JavaScript numbers are doubles; the fractional part is dropped.
#[wasm_bindgen(js_name = toIso8601)]
pub fn to_iso8601(epoch_ms: f64) -> std::result::Result<String, JsValue> {
    to_iso8601_impl(epoch_ms).map_err(|e| JsValue::from_str(&e))
}

/// Parse `YYYY-MM-DDTHH:mm:ss.fffZ` into epoch milliseconds.
#[wasm_bindgen(js_name = fromIso8601)]
pub fn from_iso8601(text: &str) -> std::result::Result<f64, JsValue> {
    from_iso8601_impl(text).map_err(|e| JsValue::from_str(&e))
}

fn canonicalize_impl(json: &str) -> Result<String, String> {
    let value = mfjson_core::parse(json).map_err(|e| e.to_string())?;
    value.to_json_string().map_err(|e| e.to_string())
}

fn to_iso8601_impl(epoch_ms: f64) -> Result<String, String> {
    if !epoch_ms.is_finite() {
        return Err(format!("timestamp {} is not a finite number", epoch_ms));
    }
    // Saturating cast; anything beyond the chrono range is rejected below.
    let millis = epoch_ms.trunc() as i64;
    let t = chrono::DateTime::from_timestamp_millis(millis)
        .ok_or_else(|| format!("timestamp {} is out of range", epoch_ms))?;
    mfjson_core::to_iso8601(&t).map_err(|e| e.to_string())
}

fn from_iso8601_impl(text: &str) -> Result<f64, String> {
    let t = mfjson_core::from_iso8601(text).map_err(|e| e.to_string())?;
    Ok(t.timestamp_millis() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonicalize_compacts() {
        assert_eq!(
            canonicalize_impl("{ \"a\" : [ 1 , 2.0 ] }").unwrap(),
            r#"{"a":[1,2.0]}"#
        );
    }

    #[test]
    fn canonicalize_reports_position() {
        let err = canonicalize_impl("[1,]").unwrap_err();
        assert!(err.contains("line 1, column 4"), "{err}");
    }

    #[test]
    fn iso8601_helpers_round_trip() {
        let text = to_iso8601_impl(1_429_703_799_456.0).unwrap();
        assert_eq!(text, "2015-04-22T11:56:39.456Z");
        assert_eq!(from_iso8601_impl(&text).unwrap(), 1_429_703_799_456.0);
    }

    #[test]
    fn years_outside_iso_range_rejected() {
        assert_eq!(
            to_iso8601_impl(253_402_300_799_999.0).unwrap(),
            "9999-12-31T23:59:59.999Z"
        );
        let err = to_iso8601_impl(253_402_300_800_000.0).unwrap_err();
        assert!(err.contains("0000-9999"), "{err}");
        assert!(to_iso8601_impl(-62_200_000_000_000.0).is_err());
    }

    #[test]
    fn non_finite_timestamp_rejected() {
        assert!(to_iso8601_impl(f64::NAN).is_err());
        assert!(to_iso8601_impl(f64::INFINITY).is_err());
    }
}
