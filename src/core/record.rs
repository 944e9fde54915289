//! Record trait: read-only field access for the table pipeline

use crate::core::field::FieldValue;
use indexmap::IndexMap;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// A row displayed by a table view
///
/// The pipeline reads fields by name and never mutates a record. A field the
/// record does not have is reported as `None`, which every stage treats the
/// same as [`FieldValue::Null`].
///
/// # Example
///
/// ```
/// use tabula::core::{FieldValue, Record};
///
/// struct Asset {
///     symbol: String,
///     value_usd: Option<f64>,
/// }
///
/// impl Record for Asset {
///     fn field(&self, key: &str) -> Option<FieldValue> {
///         match key {
///             "symbol" => Some(self.symbol.as_str().into()),
///             "value_usd" => Some(self.value_usd.into()),
///             _ => None,
///         }
///     }
/// }
///
/// let asset = Asset { symbol: "APT".to_string(), value_usd: None };
/// assert_eq!(asset.field("symbol"), Some(FieldValue::from("APT")));
/// assert!(asset.field_or_null("value_usd").is_null());
/// ```
pub trait Record {
    /// Read a field by name
    fn field(&self, key: &str) -> Option<FieldValue>;

    /// Read a field, mapping a missing field to `Null`
    fn field_or_null(&self, key: &str) -> FieldValue {
        self.field(key).unwrap_or(FieldValue::Null)
    }
}

/// JSON records, as returned by indexer and price APIs
///
/// A key is first looked up verbatim; if absent and it contains dots it is
/// treated as a path into nested objects (`"token.symbol"`).
impl Record for Value {
    fn field(&self, key: &str) -> Option<FieldValue> {
        let obj = self.as_object()?;
        if let Some(value) = obj.get(key) {
            return Some(FieldValue::from_json(value));
        }
        if !key.contains('.') {
            return None;
        }

        let mut current = self;
        for segment in key.split('.') {
            current = current.as_object()?.get(segment)?;
        }
        Some(FieldValue::from_json(current))
    }
}

impl Record for IndexMap<String, FieldValue> {
    fn field(&self, key: &str) -> Option<FieldValue> {
        self.get(key).cloned()
    }
}

impl Record for HashMap<String, FieldValue> {
    fn field(&self, key: &str) -> Option<FieldValue> {
        self.get(key).cloned()
    }
}

impl<R: Record + ?Sized> Record for &R {
    fn field(&self, key: &str) -> Option<FieldValue> {
        (**self).field(key)
    }
}

impl<R: Record + ?Sized> Record for Arc<R> {
    fn field(&self, key: &str) -> Option<FieldValue> {
        (**self).field(key)
    }
}

impl<R: Record + ?Sized> Record for Box<R> {
    fn field(&self, key: &str) -> Option<FieldValue> {
        (**self).field(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_record_top_level() {
        let record = json!({"symbol": "APT", "amount": 12});
        assert_eq!(record.field("symbol"), Some(FieldValue::from("APT")));
        assert_eq!(record.field("amount"), Some(FieldValue::Integer(12)));
        assert_eq!(record.field("missing"), None);
    }

    #[test]
    fn test_json_record_dotted_path() {
        let record = json!({"token": {"symbol": "USDC", "meta": {"decimals": 6}}});
        assert_eq!(record.field("token.symbol"), Some(FieldValue::from("USDC")));
        assert_eq!(record.field("token.meta.decimals"), Some(FieldValue::Integer(6)));
        assert_eq!(record.field("token.name"), None);
    }

    #[test]
    fn test_json_record_literal_dotted_key_wins() {
        let record = json!({"a.b": 1, "a": {"b": 2}});
        assert_eq!(record.field("a.b"), Some(FieldValue::Integer(1)));
    }

    #[test]
    fn test_non_object_json_has_no_fields() {
        assert_eq!(json!([1, 2]).field("0"), None);
        assert!(json!("x").field_or_null("x").is_null());
    }

    #[test]
    fn test_map_records() {
        let mut row: IndexMap<String, FieldValue> = IndexMap::new();
        row.insert("name".to_string(), "Thala".into());
        assert_eq!(row.field("name"), Some(FieldValue::from("Thala")));

        let by_ref = &row;
        assert_eq!(by_ref.field("name"), Some(FieldValue::from("Thala")));

        let shared = Arc::new(row.clone());
        assert!(shared.field_or_null("tvl").is_null());
    }
}
