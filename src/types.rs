use std::fmt::Write as _;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Serialize, Serializer};

/// Values that can be stored in a record or bound as query parameters.
///
/// The same enum flows both ways, so callers build parameters and read cells
/// without touching driver types:
/// ```rust
/// use mssql_db::prelude::*;
///
/// let params = vec![
///     RowValues::Int(1),
///     RowValues::Text("alice".into()),
///     RowValues::Bool(true),
/// ];
/// # let _ = params;
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum RowValues {
    /// Integer value (64-bit)
    Int(i64),
    /// Floating point value (64-bit); DECIMAL/NUMERIC/MONEY land here too
    Float(f64),
    /// Text/string value
    Text(String),
    /// Boolean value (BIT)
    Bool(bool),
    /// Timestamp value (DATETIME, DATETIME2, SMALLDATETIME, DATETIMEOFFSET in UTC)
    Timestamp(NaiveDateTime),
    /// Calendar date (DATE)
    Date(NaiveDate),
    /// Time of day (TIME)
    Time(NaiveTime),
    /// Binary data
    Blob(Vec<u8>),
    /// NULL value
    Null,
}

impl RowValues {
    /// Check if this value is NULL
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub fn as_int(&self) -> Option<&i64> {
        if let RowValues::Int(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        if let RowValues::Text(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<&bool> {
        if let RowValues::Bool(value) = self {
            return Some(value);
        } else if let Some(i) = self.as_int() {
            if *i == 1 {
                return Some(&true);
            } else if *i == 0 {
                return Some(&false);
            }
        }
        None
    }

    #[must_use]
    pub fn as_timestamp(&self) -> Option<NaiveDateTime> {
        match self {
            RowValues::Timestamp(value) => Some(*value),
            RowValues::Date(date) => date.and_hms_opt(0, 0, 0),
            RowValues::Text(s) => NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f").ok(),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            RowValues::Float(value) => Some(*value),
            #[allow(clippy::cast_precision_loss)]
            RowValues::Int(value) => Some(*value as f64),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_blob(&self) -> Option<&[u8]> {
        if let RowValues::Blob(bytes) = self {
            Some(bytes)
        } else {
            None
        }
    }

    /// Text form used when stored procedure arguments are coerced to strings.
    ///
    /// Matches what a dynamically typed caller would have sent: `True`/`False`
    /// for booleans, a trailing `.0` on integral floats, microseconds only
    /// when non-zero. Returns `None` for NULL, which is bound as NULL.
    #[must_use]
    pub fn to_param_text(&self) -> Option<String> {
        match self {
            RowValues::Null => None,
            RowValues::Int(i) => Some(i.to_string()),
            RowValues::Float(f) => Some(float_text(*f)),
            RowValues::Text(s) => Some(s.clone()),
            RowValues::Bool(true) => Some("True".to_string()),
            RowValues::Bool(false) => Some("False".to_string()),
            RowValues::Timestamp(dt) => {
                Some(format!("{} {}", dt.date().format("%Y-%m-%d"), time_text(&dt.time())))
            }
            RowValues::Date(d) => Some(d.format("%Y-%m-%d").to_string()),
            RowValues::Time(t) => Some(time_text(t)),
            RowValues::Blob(bytes) => {
                let mut s = String::with_capacity(2 + bytes.len() * 2);
                s.push_str("0x");
                for b in bytes {
                    let _ = write!(s, "{b:02X}");
                }
                Some(s)
            }
        }
    }
}

fn float_text(f: f64) -> String {
    if f.is_nan() {
        return "nan".to_string();
    }
    // `{:?}` already gives the shortest round-trip digits and a `.0` suffix;
    // only the exponent needs an explicit sign and two digits.
    let debug = format!("{f:?}");
    match debug.split_once('e') {
        Some((mantissa, exp)) => {
            let (sign, digits) = match exp.strip_prefix('-') {
                Some(rest) => ('-', rest),
                None => ('+', exp),
            };
            format!("{mantissa}e{sign}{digits:0>2}")
        }
        None => debug,
    }
}

fn time_text(t: &NaiveTime) -> String {
    let micros = (t.nanosecond() / 1_000) % 1_000_000;
    if micros == 0 {
        t.format("%H:%M:%S").to_string()
    } else {
        format!("{}.{micros:06}", t.format("%H:%M:%S"))
    }
}

impl Serialize for RowValues {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            RowValues::Int(i) => serializer.serialize_i64(*i),
            RowValues::Float(f) => serializer.serialize_f64(*f),
            RowValues::Text(s) => serializer.serialize_str(s),
            RowValues::Bool(b) => serializer.serialize_bool(*b),
            RowValues::Timestamp(dt) => {
                serializer.collect_str(&dt.format("%Y-%m-%dT%H:%M:%S%.f"))
            }
            RowValues::Date(d) => serializer.collect_str(&d.format("%Y-%m-%d")),
            RowValues::Time(t) => serializer.collect_str(&t.format("%H:%M:%S%.f")),
            RowValues::Blob(_) => match self.to_param_text() {
                Some(hex) => serializer.serialize_str(&hex),
                None => serializer.serialize_unit(),
            },
            RowValues::Null => serializer.serialize_unit(),
        }
    }
}
