//! The dynamically-typed JSON value tree.
//!
//! `Value` is what [`crate::parse`] returns. Integers and floats stay distinct
//! (`1` and `1.0` are different values), and objects are a list of pairs so
//! that key order survives a parse/serialize round trip without pulling a map
//! type into the model.

use std::ops::Index;

use crate::error::SerializeError;

/// Any JSON value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Array(Vec<Value>),
    /// Key-value pairs in insertion order.
    Object(Vec<(String, Value)>),
}

static NULL: Value = Value::Null;

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_bool(&self) -> bool {
        matches!(self, Value::Bool(_))
    }

    pub fn is_integer(&self) -> bool {
        matches!(self, Value::Integer(_))
    }

    pub fn is_float(&self) -> bool {
        matches!(self, Value::Float(_))
    }

    /// True for both integers and floats.
    pub fn is_number(&self) -> bool {
        matches!(self, Value::Integer(_) | Value::Float(_))
    }

    pub fn is_string(&self) -> bool {
        matches!(self, Value::String(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Value::Array(_))
    }

    pub fn is_object(&self) -> bool {
        matches!(self, Value::Object(_))
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Floats as-is; integers are widened (possibly losing precision above 2^53).
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Integer(n) => Some(*n as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&[(String, Value)]> {
        match self {
            Value::Object(pairs) => Some(pairs),
            _ => None,
        }
    }

    /// Look up `key` in an object. When a key repeats, the last pair wins.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_object()?
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Element `index` of an array.
    pub fn get_index(&self, index: usize) -> Option<&Value> {
        self.as_array()?.get(index)
    }

    /// Number of elements or pairs; zero for scalars.
    pub fn len(&self) -> usize {
        match self {
            Value::Array(items) => items.len(),
            Value::Object(pairs) => pairs.len(),
            _ => 0,
        }
    }

    /// True for empty containers and for every scalar.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Short name of the variant, used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }

    /// Serialize this tree to canonical JSON.
    ///
    /// Fails only for non-finite floats or trees nested deeper than the
    /// default limit.
    pub fn to_json_string(&self) -> std::result::Result<String, SerializeError> {
        crate::writer::serialize(self, &crate::resolver::Registry::new())
    }
}

impl Index<&str> for Value {
    type Output = Value;

    fn index(&self, key: &str) -> &Value {
        self.get(key).unwrap_or(&NULL)
    }
}

impl Index<usize> for Value {
    type Output = Value;

    fn index(&self, index: usize) -> &Value {
        self.get_index(index).unwrap_or(&NULL)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

macro_rules! from_integer {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(n: $ty) -> Self {
                    Value::Integer(i64::from(n))
                }
            }
        )*
    };
}

from_integer!(i8, i16, i32, i64, u8, u16, u32);

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<f32> for Value {
    fn from(f: f32) -> Self {
        Value::Float(crate::shape::widen_f32(f))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Value::Null, Into::into)
    }
}

impl FromIterator<Value> for Value {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Value::Array(iter.into_iter().collect())
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Value {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Value::Object(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Value {
        Value::Object(vec![
            ("name".to_string(), Value::from("Alice")),
            ("age".to_string(), Value::from(30)),
            (
                "tags".to_string(),
                Value::Array(vec![Value::from("a"), Value::Null]),
            ),
        ])
    }

    #[test]
    fn integer_and_float_are_distinct() {
        assert_ne!(Value::Integer(1), Value::Float(1.0));
        assert_eq!(Value::Integer(1).as_f64(), Some(1.0));
        assert_eq!(Value::Float(1.0).as_i64(), None);
    }

    #[test]
    fn f32_converts_like_f32_serializes() {
        assert_eq!(Value::from(0.1f32), Value::Float(0.1));
        assert_eq!(Value::from(0.1f32).to_json_string().unwrap(), "0.1");
        assert_eq!(
            Value::from(0.1f32).to_json_string().unwrap(),
            crate::serialize(&0.1f32, &crate::Registry::new()).unwrap()
        );
    }

    #[test]
    fn get_and_index() {
        let v = sample();
        assert_eq!(v.get("name").and_then(Value::as_str), Some("Alice"));
        assert_eq!(v["age"].as_i64(), Some(30));
        assert!(v["tags"][1].is_null());
        assert!(v["missing"].is_null());
        assert!(v["tags"][9].is_null());
        assert!(v[0].is_null());
    }

    #[test]
    fn repeated_key_last_wins() {
        let v = Value::Object(vec![
            ("k".to_string(), Value::from(1)),
            ("k".to_string(), Value::from(2)),
        ]);
        assert_eq!(v["k"], Value::Integer(2));
        assert_eq!(v.len(), 2);
    }

    #[test]
    fn len_of_scalars_is_zero() {
        assert_eq!(Value::from("text").len(), 0);
        assert!(Value::Null.is_empty());
        assert_eq!(sample().len(), 3);
    }

    #[test]
    fn option_conversion() {
        assert_eq!(Value::from(None::<i32>), Value::Null);
        assert_eq!(Value::from(Some("x")), Value::String("x".to_string()));
    }

    #[test]
    fn collect_into_object_preserves_order() {
        let v: Value = vec![("b", Value::from(1)), ("a", Value::from(2))]
            .into_iter()
            .collect();
        let keys: Vec<&str> = v
            .as_object()
            .unwrap()
            .iter()
            .map(|(k, _)| k.as_str())
            .collect();
        assert_eq!(keys, ["b", "a"]);
    }

    #[test]
    fn to_json_string_is_compact() {
        assert_eq!(
            sample().to_json_string().unwrap(),
            r#"{"name":"Alice","age":30,"tags":["a",null]}"#
        );
    }
}
