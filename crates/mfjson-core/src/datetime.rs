//! Date/time wire formats.
//!
//! The default format is fixed-width ISO-8601 in UTC with millisecond
//! precision, `YYYY-MM-DDTHH:mm:ss.fffZ`. The legacy ASP.NET Ajax form
//! `/Date(<epoch-ms>)/` is also available for peers that expect it.

use chrono::{DateTime, Datelike, NaiveDate, Utc};

use crate::error::FormatError;

const ISO8601_LEN: usize = 24;
const ISO8601_LAYOUT: &str = "expected YYYY-MM-DDTHH:mm:ss.fffZ";

/// Wire format used for date/time values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateFormat {
    #[default]
    Iso8601,
    Ajax,
}

impl DateFormat {
    pub fn format(self, t: &DateTime<Utc>) -> Result<String, FormatError> {
        match self {
            DateFormat::Iso8601 => to_iso8601(t),
            DateFormat::Ajax => Ok(to_ajax(t)),
        }
    }

    pub fn parse(self, text: &str) -> Result<DateTime<Utc>, FormatError> {
        match self {
            DateFormat::Iso8601 => from_iso8601(text),
            DateFormat::Ajax => from_ajax(text),
        }
    }
}

/// Format `t` as `YYYY-MM-DDTHH:mm:ss.fffZ`.
///
/// Sub-millisecond digits are truncated, not rounded. Years outside 0000
/// through 9999 do not fit the fixed-width layout and are rejected.
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use mfjson_core::to_iso8601;
///
/// let t = Utc.with_ymd_and_hms(1988, 4, 23, 0, 0, 0).unwrap();
/// assert_eq!(to_iso8601(&t).unwrap(), "1988-04-23T00:00:00.000Z");
///
/// let far = Utc.with_ymd_and_hms(10000, 1, 1, 0, 0, 0).unwrap();
/// assert!(to_iso8601(&far).is_err());
/// ```
pub fn to_iso8601(t: &DateTime<Utc>) -> Result<String, FormatError> {
    if !(0..=9999).contains(&t.year()) {
        return Err(FormatError::new(
            &t.to_string(),
            "year outside 0000-9999 cannot be written as ISO-8601",
        ));
    }
    Ok(t.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string())
}

/// Parse the exact output of [`to_iso8601`].
///
/// Offsets other than `Z`, missing milliseconds, and extra fraction digits
/// are all rejected.
pub fn from_iso8601(text: &str) -> Result<DateTime<Utc>, FormatError> {
    let bytes = text.as_bytes();
    if bytes.len() != ISO8601_LEN {
        return Err(FormatError::new(text, ISO8601_LAYOUT));
    }

    const SEPARATORS: [(usize, u8); 7] = [
        (4, b'-'),
        (7, b'-'),
        (10, b'T'),
        (13, b':'),
        (16, b':'),
        (19, b'.'),
        (23, b'Z'),
    ];
    if SEPARATORS.iter().any(|&(i, sep)| bytes[i] != sep) {
        return Err(FormatError::new(text, ISO8601_LAYOUT));
    }

    let field = |start: usize, end: usize| -> Result<u32, FormatError> {
        bytes[start..end].iter().try_fold(0u32, |acc, &b| {
            if b.is_ascii_digit() {
                Ok(acc * 10 + u32::from(b - b'0'))
            } else {
                Err(FormatError::new(text, "non-digit in date/time field"))
            }
        })
    };

    let year = field(0, 4)?;
    let month = field(5, 7)?;
    let day = field(8, 10)?;
    let hour = field(11, 13)?;
    let minute = field(14, 16)?;
    let second = field(17, 19)?;
    let milli = field(20, 23)?;

    // `year` has at most four digits, so the cast cannot truncate.
    let date = NaiveDate::from_ymd_opt(year as i32, month, day)
        .ok_or_else(|| FormatError::new(text, "date out of range"))?;
    if second > 59 {
        return Err(FormatError::new(text, "time out of range"));
    }
    let naive = date
        .and_hms_milli_opt(hour, minute, second, milli)
        .ok_or_else(|| FormatError::new(text, "time out of range"))?;

    Ok(naive.and_utc())
}

/// Format `t` as `/Date(<epoch-ms>)/`.
pub fn to_ajax(t: &DateTime<Utc>) -> String {
    format!("/Date({})/", t.timestamp_millis())
}

/// Parse `/Date(<epoch-ms>)/`. The millisecond count may be negative.
pub fn from_ajax(text: &str) -> Result<DateTime<Utc>, FormatError> {
    let digits = text
        .strip_prefix("/Date(")
        .and_then(|rest| rest.strip_suffix(")/"))
        .ok_or_else(|| FormatError::new(text, "expected /Date(<milliseconds>)/"))?;

    let unsigned = digits.strip_prefix('-').unwrap_or(digits);
    if unsigned.is_empty() || !unsigned.bytes().all(|b| b.is_ascii_digit()) {
        return Err(FormatError::new(text, "milliseconds must be an integer"));
    }

    let millis: i64 = digits
        .parse()
        .map_err(|_| FormatError::new(text, "milliseconds out of range"))?;
    DateTime::from_timestamp_millis(millis)
        .ok_or_else(|| FormatError::new(text, "milliseconds out of range"))
}
