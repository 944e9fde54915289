//! Field value types read out of records

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A polymorphic field value that can hold different types
///
/// Records expose their fields as `FieldValue`s so the filter and sort stages
/// can compare them without knowing the record's concrete type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum FieldValue {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    DateTime(DateTime<Utc>),
    Null,
    /// Nested arrays and objects, kept as JSON
    Object(Value),
}

impl FieldValue {
    /// Convert a JSON value into a field value
    ///
    /// Numbers that fit an `i64` become `Integer`, every other number becomes
    /// `Float`. Arrays and objects are kept as `Object`.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => FieldValue::Null,
            Value::Bool(b) => FieldValue::Boolean(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => FieldValue::Integer(i),
                None => n.as_f64().map(FieldValue::Float).unwrap_or(FieldValue::Null),
            },
            Value::String(s) => FieldValue::String(s.clone()),
            Value::Array(_) | Value::Object(_) => FieldValue::Object(value.clone()),
        }
    }

    /// Get the value as a string if possible
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get the value as a number
    ///
    /// Numeric strings (`"12.5"`) are parsed, which is how balances and prices
    /// usually arrive from indexers.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Integer(i) => Some(*i as f64),
            FieldValue::Float(f) => Some(*f),
            FieldValue::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
    }

    /// Get the value as a UTC timestamp
    ///
    /// Accepts RFC 3339 strings, `YYYY-MM-DD` and `YYYY-MM-DD HH:MM:SS`
    /// strings, and integers as epoch milliseconds.
    pub fn as_datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            FieldValue::DateTime(dt) => Some(*dt),
            FieldValue::Integer(ms) => Utc.timestamp_millis_opt(*ms).single(),
            FieldValue::Float(ms) if ms.is_finite() => {
                Utc.timestamp_millis_opt(ms.trunc() as i64).single()
            }
            FieldValue::String(s) => parse_datetime(s),
            _ => None,
        }
    }

    /// Check if the value is null
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Stringify the value the way it is shown in a table cell
    ///
    /// Whole floats print without a fractional part (`2.0` → `"2"`), null
    /// prints as the empty string.
    pub fn to_display_string(&self) -> String {
        match self {
            FieldValue::String(s) => s.clone(),
            FieldValue::Integer(i) => i.to_string(),
            FieldValue::Float(f) => {
                if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 {
                    format!("{}", *f as i64)
                } else {
                    f.to_string()
                }
            }
            FieldValue::Boolean(b) => b.to_string(),
            FieldValue::DateTime(dt) => dt.to_rfc3339(),
            FieldValue::Null => String::new(),
            FieldValue::Object(v) => v.to_string(),
        }
    }
}

fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::String(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::String(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        FieldValue::Integer(value as i64)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Float(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Boolean(value)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(value: DateTime<Utc>) -> Self {
        FieldValue::DateTime(value)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(FieldValue::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_value_string() {
        let value = FieldValue::String("test".to_string());
        assert_eq!(value.as_str(), Some("test"));
        assert!(!value.is_null());
    }

    #[test]
    fn test_field_value_null() {
        let value = FieldValue::Null;
        assert!(value.is_null());
        assert_eq!(value.as_str(), None);
        assert_eq!(value.to_display_string(), "");
    }

    #[test]
    fn test_from_json_numbers() {
        assert_eq!(FieldValue::from_json(&json!(42)), FieldValue::Integer(42));
        assert_eq!(FieldValue::from_json(&json!(1.5)), FieldValue::Float(1.5));
        assert_eq!(FieldValue::from_json(&json!(null)), FieldValue::Null);
        assert_eq!(
            FieldValue::from_json(&json!({"a": 1})),
            FieldValue::Object(json!({"a": 1}))
        );
    }

    #[test]
    fn test_as_f64_parses_numeric_strings() {
        assert_eq!(FieldValue::from(" 12.5 ").as_f64(), Some(12.5));
        assert_eq!(FieldValue::from("twelve").as_f64(), None);
        assert_eq!(FieldValue::Boolean(true).as_f64(), None);
    }

    #[test]
    fn test_as_datetime_formats() {
        let rfc = FieldValue::from("2024-03-01T12:00:00Z").as_datetime();
        assert!(rfc.is_some());

        let day = FieldValue::from("2024-03-01").as_datetime().expect("date should parse");
        assert_eq!(day.timestamp_millis(), 1_709_251_200_000);

        let ms = FieldValue::Integer(1_709_251_200_000).as_datetime();
        assert_eq!(ms, Some(day));

        assert!(FieldValue::from("not a date").as_datetime().is_none());
    }

    #[test]
    fn test_display_string_whole_float() {
        assert_eq!(FieldValue::Float(2.0).to_display_string(), "2");
        assert_eq!(FieldValue::Float(2.5).to_display_string(), "2.5");
        assert_eq!(FieldValue::Boolean(false).to_display_string(), "false");
    }

    #[test]
    fn test_option_conversion() {
        let none: Option<&str> = None;
        assert!(FieldValue::from(none).is_null());
        assert_eq!(FieldValue::from(Some(3_i64)), FieldValue::Integer(3));
    }

    #[test]
    fn test_serde_roundtrip_integer() {
        let original = FieldValue::Integer(42);
        let json = serde_json::to_string(&original).expect("serialize should succeed");
        let restored: FieldValue =
            serde_json::from_str(&json).expect("deserialize should succeed");
        assert_eq!(original, restored);
    }
}
