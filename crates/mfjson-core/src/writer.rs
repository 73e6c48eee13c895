//! Serializer: native values to compact JSON text.
//!
//! The writer walks a value's [`Shape`] depth-first into a private buffer.
//! Output is all-or-nothing: on any error the buffer is dropped and the
//! caller sees only the error.

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, trace};

use crate::datetime::DateFormat;
use crate::error::SerializeError;
use crate::limits::Limits;
use crate::resolver::{ResolvedType, TypeResolver};
use crate::shape::{RecordRef, Serializable, Shape};

/// Serialize `value` with default limits and ISO-8601 dates.
///
/// # Examples
///
/// ```
/// use std::collections::BTreeMap;
/// use mfjson_core::{serialize, Registry};
///
/// let mut map = BTreeMap::new();
/// map.insert("quote", "---\"---");
/// let json = serialize(&map, &Registry::new()).unwrap();
/// assert_eq!(json, r#"{"quote":"---\"---"}"#);
/// ```
pub fn serialize<T: Serializable + ?Sized>(
    value: &T,
    resolver: &dyn TypeResolver,
) -> Result<String, SerializeError> {
    Writer::new(resolver).serialize(value)
}

/// Serializer configuration. Cheap to build; holds no per-call state.
#[derive(Clone, Copy)]
pub struct Writer<'r> {
    resolver: &'r dyn TypeResolver,
    limits: Limits,
    date_format: DateFormat,
}

impl<'r> Writer<'r> {
    pub fn new(resolver: &'r dyn TypeResolver) -> Self {
        Self {
            resolver,
            limits: Limits::default(),
            date_format: DateFormat::default(),
        }
    }

    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    pub fn with_date_format(mut self, date_format: DateFormat) -> Self {
        self.date_format = date_format;
        self
    }

    /// Serialize one value into a fresh string.
    pub fn serialize<T: Serializable + ?Sized>(
        &self,
        value: &T,
    ) -> Result<String, SerializeError> {
        trace!("serialize start");
        let mut state = WriteState {
            config: self,
            out: String::new(),
            types: HashMap::new(),
            in_progress: Vec::new(),
            depth: 0,
        };
        match state.write_value(value.shape()) {
            Ok(()) => {
                trace!(len = state.out.len(), "serialize finished");
                Ok(state.out)
            }
            Err(err) => {
                debug!(error = %err, "serialize failed");
                Err(err)
            }
        }
    }
}

/// Per-call state: output buffer, resolver cache and the records currently
/// being written.
struct WriteState<'w, 'r> {
    config: &'w Writer<'r>,
    out: String,
    types: HashMap<TypeId, Arc<ResolvedType>>,
    in_progress: Vec<(usize, TypeId)>,
    depth: usize,
}

impl WriteState<'_, '_> {
    fn write_value(&mut self, shape: Shape<'_>) -> Result<(), SerializeError> {
        match shape {
            Shape::Null => self.out.push_str("null"),
            Shape::Bool(true) => self.out.push_str("true"),
            Shape::Bool(false) => self.out.push_str("false"),
            Shape::Integer(n) => self.out.push_str(&n.to_string()),
            Shape::Float(f) => self.out.push_str(&format_float(f)?),
            Shape::Str(s) => write_string(&mut self.out, &s),
            Shape::DateTime(t) => self.write_date(&t)?,
            Shape::Seq(items) => {
                self.enter()?;
                self.out.push('[');
                for (i, item) in items.enumerate() {
                    if i > 0 {
                        self.out.push(',');
                    }
                    self.write_value(item.shape())?;
                }
                self.out.push(']');
                self.depth -= 1;
            }
            Shape::Map(entries) => {
                self.enter()?;
                self.out.push('{');
                for (i, (key, value)) in entries.enumerate() {
                    if i > 0 {
                        self.out.push(',');
                    }
                    write_string(&mut self.out, key);
                    self.out.push(':');
                    self.write_value(value.shape())?;
                }
                self.out.push('}');
                self.depth -= 1;
            }
            Shape::Record(record) => self.write_record(record)?,
        }
        Ok(())
    }

    fn enter(&mut self) -> Result<(), SerializeError> {
        self.depth += 1;
        if self.depth > self.config.limits.max_depth {
            return Err(SerializeError::NestingTooDeep(self.config.limits.max_depth));
        }
        Ok(())
    }

    fn write_date(&mut self, t: &DateTime<Utc>) -> Result<(), SerializeError> {
        let text = match self.config.date_format {
            DateFormat::Iso8601 => crate::datetime::to_iso8601(t)
                .map_err(|err| SerializeError::DateOutOfRange(err.input))?,
            DateFormat::Ajax => crate::datetime::to_ajax(t),
        };
        write_string(&mut self.out, &text);
        Ok(())
    }

    /// Look up a record's members, asking the resolver at most once per type.
    fn resolve(&mut self, record: &RecordRef<'_>) -> Result<Arc<ResolvedType>, SerializeError> {
        if let Some(resolved) = self.types.get(&record.type_id()) {
            return Ok(Arc::clone(resolved));
        }
        let resolved = self
            .config
            .resolver
            .resolve(record.type_id())
            .ok_or_else(|| SerializeError::UnresolvedType {
                type_name: record.type_name().to_string(),
            })?;
        debug!(
            rust_type = record.type_name(),
            members = resolved.members().len(),
            "resolved record type"
        );
        self.types.insert(record.type_id(), Arc::clone(&resolved));
        Ok(resolved)
    }

    fn write_record(&mut self, record: RecordRef<'_>) -> Result<(), SerializeError> {
        self.enter()?;

        let identity = record.identity();
        if self.in_progress.contains(&identity) {
            return Err(SerializeError::Cycle {
                type_name: record.type_name().to_string(),
            });
        }

        let resolved = self.resolve(&record)?;
        if resolved.members().is_empty() {
            return Err(SerializeError::NoMembers {
                type_name: resolved.name().to_string(),
            });
        }

        self.in_progress.push(identity);
        self.out.push('{');
        for (i, member) in resolved.members().iter().enumerate() {
            let field = member
                .read(record.value())
                .map_err(|source| SerializeError::Member {
                    type_name: resolved.name().to_string(),
                    member: member.name().to_string(),
                    source,
                })?;
            let shape = field.as_dyn().shape();

            if let Some(found) = shape.kind() {
                if !member.kind().accepts(found) {
                    return Err(SerializeError::KindMismatch {
                        type_name: resolved.name().to_string(),
                        member: member.name().to_string(),
                        expected: member.kind().as_str(),
                        found: found.as_str(),
                    });
                }
            }

            if i > 0 {
                self.out.push(',');
            }
            write_string(&mut self.out, member.name());
            self.out.push(':');
            self.write_value(shape)?;
        }
        self.out.push('}');
        self.in_progress.pop();
        self.depth -= 1;
        Ok(())
    }
}

/// Format a finite double as the shortest text that parses back to it.
///
/// Integral values keep a `.0` so they read back as floats. Magnitudes of
/// at least 1e16 or below 1e-5 switch to exponent form.
pub fn format_float(f: f64) -> Result<String, SerializeError> {
    if !f.is_finite() {
        return Err(SerializeError::NonFiniteFloat(f));
    }
    let magnitude = f.abs();
    if magnitude != 0.0 && !(1e-5..1e16).contains(&magnitude) {
        return Ok(format!("{:e}", f));
    }
    let mut text = f.to_string();
    if !text.contains('.') {
        text.push_str(".0");
    }
    Ok(text)
}

/// Append `s` as a quoted JSON string. `/` is left as is.
pub fn write_string(out: &mut String, s: &str) {
    out.reserve(s.len() + 2);
    out.push('"');
    let mut start = 0;
    for (i, ch) in s.char_indices() {
        let escape = match ch {
            '"' => "\\\"",
            '\\' => "\\\\",
            '\u{08}' => "\\b",
            '\u{0c}' => "\\f",
            '\n' => "\\n",
            '\r' => "\\r",
            '\t' => "\\t",
            c if (c as u32) < 0x20 => "",
            _ => continue,
        };
        out.push_str(&s[start..i]);
        if escape.is_empty() {
            out.push_str(&format!("\\u{:04x}", ch as u32));
        } else {
            out.push_str(escape);
        }
        start = i + ch.len_utf8();
    }
    out.push_str(&s[start..]);
    out.push('"');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::Registry;

    fn quoted(s: &str) -> String {
        let mut out = String::new();
        write_string(&mut out, s);
        out
    }

    #[test]
    fn float_formatting() {
        assert_eq!(format_float(24.565657576).unwrap(), "24.565657576");
        assert_eq!(format_float(1.0).unwrap(), "1.0");
        assert_eq!(format_float(-0.0).unwrap(), "-0.0");
        assert_eq!(format_float(0.1).unwrap(), "0.1");
        assert_eq!(format_float(1e15).unwrap(), "1000000000000000.0");
        assert_eq!(format_float(1e16).unwrap(), "1e16");
        assert_eq!(format_float(1e300).unwrap(), "1e300");
        assert_eq!(format_float(1.5e-7).unwrap(), "1.5e-7");
        assert_eq!(format_float(0.00001).unwrap(), "0.00001");
    }

    #[test]
    fn non_finite_floats_rejected() {
        assert!(matches!(
            format_float(f64::INFINITY),
            Err(SerializeError::NonFiniteFloat(_))
        ));
        assert!(format_float(f64::NAN).is_err());
    }

    #[test]
    fn string_escapes() {
        assert_eq!(quoted("---\"---"), r#""---\"---""#);
        assert_eq!(quoted("---\\---"), r#""---\\---""#);
        assert_eq!(quoted("a/b"), r#""a/b""#);
        assert_eq!(quoted("\u{08}\u{0c}\n\r\t"), r#""\b\f\n\r\t""#);
        assert_eq!(quoted("\u{01}\u{1f}"), r#""\u0001\u001f""#);
        assert_eq!(quoted("héllo 你好"), "\"héllo 你好\"");
    }

    #[test]
    fn integers_cover_unsigned_range() {
        let registry = Registry::new();
        assert_eq!(serialize(&u64::MAX, &registry).unwrap(), "18446744073709551615");
        assert_eq!(serialize(&i64::MIN, &registry).unwrap(), "-9223372036854775808");
    }

    #[test]
    fn depth_limit_applies_to_sequences() {
        let registry = Registry::new();
        let nested = vec![vec![vec![1]]];
        let writer = Writer::new(&registry).with_limits(Limits::default().with_max_depth(2));
        assert_eq!(
            writer.serialize(&nested),
            Err(SerializeError::NestingTooDeep(2))
        );
        assert_eq!(
            Writer::new(&registry).serialize(&nested).unwrap(),
            "[[[1]]]"
        );
    }

    #[test]
    fn dates_follow_writer_format() {
        let registry = Registry::new();
        let t = DateTime::from_timestamp_millis(1_429_703_799_456).unwrap();
        assert_eq!(
            serialize(&t, &registry).unwrap(),
            r#""2015-04-22T11:56:39.456Z""#
        );
        let ajax = Writer::new(&registry).with_date_format(DateFormat::Ajax);
        assert_eq!(ajax.serialize(&t).unwrap(), r#""/Date(1429703799456)/""#);
    }

    #[test]
    fn five_digit_year_rejected_for_iso() {
        let registry = Registry::new();
        let ajax = Writer::new(&registry).with_date_format(DateFormat::Ajax);
        for millis in [253_402_300_800_000, -62_200_000_000_000] {
            let t = DateTime::from_timestamp_millis(millis).unwrap();
            assert_eq!(
                serialize(&t, &registry),
                Err(SerializeError::DateOutOfRange(t.to_string()))
            );
            assert!(ajax.serialize(&t).is_ok());
        }
    }
}
