//! Bridges between [`Value`] and the serde ecosystem.
//!
//! The tree itself stays free of serde; these impls let a parsed document be
//! handed to `serde_json` or mapped onto a `#[derive(Deserialize)]` type.
//! `serde_json` objects cannot hold repeated keys, so converting collapses
//! them and the last value wins, matching [`Value::get`].

use serde::de::DeserializeOwned;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::Result;
use crate::value::Value;

impl From<Value> for serde_json::Value {
    /// Non-finite floats have no JSON form and become `null`.
    fn from(value: Value) -> Self {
        match value {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(b),
            Value::Integer(n) => serde_json::Value::from(n),
            Value::Float(f) => serde_json::Number::from_f64(f)
                .map_or(serde_json::Value::Null, serde_json::Value::Number),
            Value::String(s) => serde_json::Value::String(s),
            Value::Array(items) => {
                serde_json::Value::Array(items.into_iter().map(Into::into).collect())
            }
            Value::Object(pairs) => serde_json::Value::Object(
                pairs.into_iter().map(|(k, v)| (k, v.into())).collect(),
            ),
        }
    }
}

impl From<serde_json::Value> for Value {
    /// Numbers become `Integer` when they fit `i64`, `Float` otherwise.
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Integer(i),
                None => n.as_f64().map_or(Value::Null, Value::Float),
            },
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Into::into).collect())
            }
            serde_json::Value::Object(map) => {
                Value::Object(map.into_iter().map(|(k, v)| (k, v.into())).collect())
            }
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Integer(n) => serializer.serialize_i64(*n),
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::String(s) => serializer.serialize_str(s),
            Value::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Object(pairs) => {
                let mut map = serializer.serialize_map(Some(pairs.len()))?;
                for (key, value) in pairs {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(Value::from)
    }
}

/// Map a parsed tree onto a concrete type.
///
/// ```
/// use serde::Deserialize;
/// use mfjson_core::{from_value, parse};
///
/// #[derive(Deserialize)]
/// struct Person {
///     name: String,
///     age: u32,
/// }
///
/// let person: Person = from_value(parse(r#"{"name":"Ada","age":36}"#)?)?;
/// assert_eq!(person.name, "Ada");
/// assert_eq!(person.age, 36);
/// # Ok::<(), mfjson_core::Error>(())
/// ```
pub fn from_value<T: DeserializeOwned>(value: Value) -> Result<T> {
    Ok(serde_json::from_value(value.into())?)
}

/// Convert any `serde::Serialize` type into a tree.
pub fn to_value<T: Serialize + ?Sized>(value: &T) -> Result<Value> {
    Ok(serde_json::to_value(value)?.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    #[test]
    fn into_serde_json_keeps_order() {
        let v = parse(r#"{"z":1,"a":[true,null,1.5]}"#).unwrap();
        let json: serde_json::Value = v.into();
        assert_eq!(json.to_string(), r#"{"z":1,"a":[true,null,1.5]}"#);
    }

    #[test]
    fn repeated_keys_collapse_last_wins() {
        let v = parse(r#"{"k":1,"k":2}"#).unwrap();
        let json: serde_json::Value = v.into();
        assert_eq!(json["k"], 2);
        assert_eq!(json.as_object().unwrap().len(), 1);
    }

    #[test]
    fn non_finite_float_becomes_null() {
        let json: serde_json::Value = Value::Float(f64::NAN).into();
        assert!(json.is_null());
    }

    #[test]
    fn from_serde_json_splits_numbers() {
        let v = Value::from(serde_json::json!([1, -2, 1.5, 18446744073709551615u64]));
        assert_eq!(v[0], Value::Integer(1));
        assert_eq!(v[1], Value::Integer(-2));
        assert_eq!(v[2], Value::Float(1.5));
        assert!(v[3].is_float());
    }

    #[test]
    fn serialize_through_serde_json() {
        let v = parse(r#"{"name":"x","list":[1,2.5,null]}"#).unwrap();
        assert_eq!(
            serde_json::to_string(&v).unwrap(),
            r#"{"name":"x","list":[1,2.5,null]}"#
        );
    }

    #[test]
    fn deserialize_value_from_serde_json() {
        let v: Value = serde_json::from_str(r#"{"a":[1,"b"]}"#).unwrap();
        assert_eq!(v["a"][1], Value::from("b"));
    }

    #[test]
    fn from_value_reports_mapping_errors() {
        let err = from_value::<Vec<u8>>(Value::from("nope")).unwrap_err();
        assert!(err.to_string().starts_with("mapping error:"));
    }

    #[test]
    fn to_value_from_serde_type() {
        let v = to_value(&vec![("a", 1)]).unwrap();
        assert_eq!(v, Value::Array(vec![Value::Array(vec![Value::from("a"), Value::from(1)])]));
    }
}
