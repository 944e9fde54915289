//! Filter stage: conjunctive predicates keyed by filter name
//!
//! A [`FilterSet`] maps filter keys to [`FilterValue`]s. Every active entry
//! must match for a record to be kept. How a key is evaluated is decided by
//! [`FilterRules`]:
//!
//! 1. a custom matcher registered for the key,
//! 2. the search key (`"search"` by default), whose text is parsed as a
//!    [`ParsedQuery`] over the configured search fields,
//! 3. otherwise the key names a record field, matched according to the
//!    value's kind.
//!
//! Inactive values (`""`, `"all"`, empty category lists, ranges with no
//! bounds) and keys the rules ignore are passed through. Filtering never fails.

use crate::core::field::FieldValue;
use crate::core::record::Record;
use crate::pipeline::search::ParsedQuery;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

/// One filter condition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub enum FilterValue {
    /// Case-insensitive substring match
    Text(String),
    /// Boolean equality
    Flag(bool),
    /// Set membership on the field's display string
    Categories(Vec<String>),
    /// Inclusive numeric range, either bound optional
    Range { min: Option<f64>, max: Option<f64> },
    /// Inclusive date range, either bound optional
    DateRange {
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    },
}

impl FilterValue {
    pub fn text(value: impl Into<String>) -> Self {
        FilterValue::Text(value.into())
    }

    pub fn range(min: Option<f64>, max: Option<f64>) -> Self {
        FilterValue::Range { min, max }
    }

    pub fn categories<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FilterValue::Categories(values.into_iter().map(Into::into).collect())
    }

    /// Whether this value restricts anything
    ///
    /// Empty text, `"all"`, empty category lists, bound-less ranges and NaN
    /// bounds are inactive.
    pub fn is_active(&self) -> bool {
        match self {
            FilterValue::Text(s) => {
                let s = s.trim();
                !s.is_empty() && !s.eq_ignore_ascii_case("all")
            }
            FilterValue::Flag(_) => true,
            FilterValue::Categories(values) => !values.is_empty(),
            FilterValue::Range { min, max } => {
                (min.is_some() || max.is_some())
                    && !min.is_some_and(f64::is_nan)
                    && !max.is_some_and(f64::is_nan)
            }
            FilterValue::DateRange { start, end } => start.is_some() || end.is_some(),
        }
    }

    /// Match a single field value against this condition
    ///
    /// A missing or null field never matches an active condition.
    pub fn matches_value(&self, value: Option<&FieldValue>) -> bool {
        if !self.is_active() {
            return true;
        }
        let Some(value) = value.filter(|v| !v.is_null()) else {
            return false;
        };

        match self {
            FilterValue::Text(needle) => value
                .to_display_string()
                .to_lowercase()
                .contains(&needle.trim().to_lowercase()),
            FilterValue::Flag(expected) => matches!(value, FieldValue::Boolean(b) if b == expected),
            FilterValue::Categories(values) => {
                let shown = value.to_display_string();
                values.iter().any(|v| *v == shown)
            }
            FilterValue::Range { min, max } => match value.as_f64() {
                Some(n) if !n.is_nan() => {
                    min.is_none_or(|lo| n >= lo) && max.is_none_or(|hi| n <= hi)
                }
                _ => false,
            },
            FilterValue::DateRange { start, end } => match value.as_datetime() {
                Some(dt) => start.is_none_or(|s| dt >= s) && end.is_none_or(|e| dt <= e),
                None => false,
            },
        }
    }
}

/// Error produced when a JSON value cannot be read as a filter value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterValueError(pub String);

impl fmt::Display for FilterValueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for FilterValueError {}

impl TryFrom<Value> for FilterValue {
    type Error = FilterValueError;

    /// JSON shapes:
    /// - `"text"` → `Text`, `true` → `Flag`, `["a", "b"]` → `Categories`
    /// - `12` → `Range { min: 12, max: 12 }`
    /// - `{"min": 1, "max": 5}` → `Range` (numeric strings accepted)
    /// - `{"start": "2024-01-01", "end": ...}` → `DateRange`
    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::String(s) => Ok(FilterValue::Text(s)),
            Value::Bool(b) => Ok(FilterValue::Flag(b)),
            Value::Number(n) => {
                let n = n
                    .as_f64()
                    .ok_or_else(|| FilterValueError("number out of range".to_string()))?;
                Ok(FilterValue::Range {
                    min: Some(n),
                    max: Some(n),
                })
            }
            Value::Array(items) => Ok(FilterValue::Categories(
                items
                    .iter()
                    .map(|item| FieldValue::from_json(item).to_display_string())
                    .collect(),
            )),
            Value::Object(obj) => object_to_filter(&obj),
            Value::Null => Err(FilterValueError("null is not a filter value".to_string())),
        }
    }
}

fn object_to_filter(obj: &Map<String, Value>) -> Result<FilterValue, FilterValueError> {
    let bound = |key: &str| -> Result<Option<f64>, FilterValueError> {
        match obj.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(v) => FieldValue::from_json(v)
                .as_f64()
                .map(Some)
                .ok_or_else(|| FilterValueError(format!("'{}' must be a number", key))),
        }
    };
    let date = |key: &str| -> Result<Option<DateTime<Utc>>, FilterValueError> {
        match obj.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(v) => FieldValue::from_json(v)
                .as_datetime()
                .map(Some)
                .ok_or_else(|| FilterValueError(format!("'{}' must be a date", key))),
        }
    };

    if obj.contains_key("min") || obj.contains_key("max") {
        Ok(FilterValue::Range {
            min: bound("min")?,
            max: bound("max")?,
        })
    } else if obj.contains_key("start") || obj.contains_key("end") {
        Ok(FilterValue::DateRange {
            start: date("start")?,
            end: date("end")?,
        })
    } else {
        Err(FilterValueError(
            "filter object needs min/max or start/end".to_string(),
        ))
    }
}

impl From<FilterValue> for Value {
    fn from(value: FilterValue) -> Self {
        match value {
            FilterValue::Text(s) => Value::String(s),
            FilterValue::Flag(b) => Value::Bool(b),
            FilterValue::Categories(values) => json!(values),
            FilterValue::Range { min, max } => json!({ "min": min, "max": max }),
            FilterValue::DateRange { start, end } => json!({
                "start": start.map(|d| d.to_rfc3339()),
                "end": end.map(|d| d.to_rfc3339()),
            }),
        }
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        FilterValue::Text(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        FilterValue::Text(value)
    }
}

impl From<bool> for FilterValue {
    fn from(value: bool) -> Self {
        FilterValue::Flag(value)
    }
}

/// Filter key → filter value, in insertion order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterSet(IndexMap<String, FilterValue>);

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a key, overwriting any previous value
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<FilterValue>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.set(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&FilterValue> {
        self.0.get(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<FilterValue> {
        self.0.shift_remove(key)
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FilterValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Entries that restrict something
    pub fn active(&self) -> impl Iterator<Item = (&str, &FilterValue)> {
        self.iter().filter(|(_, v)| v.is_active())
    }

    pub fn has_active_filters(&self) -> bool {
        self.active().next().is_some()
    }

    /// Merge another set into this one; the other set's values win
    pub fn extend(&mut self, other: FilterSet) {
        self.0.extend(other.0);
    }
}

impl<K: Into<String>, V: Into<FilterValue>> FromIterator<(K, V)> for FilterSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        FilterSet(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Custom predicate for one filter key
pub type Matcher<R> = Arc<dyn Fn(&R, &FilterValue) -> bool + Send + Sync>;

/// How each filter key is evaluated against a record
pub struct FilterRules<R> {
    matchers: HashMap<String, Matcher<R>>,
    search_key: String,
    search_fields: Vec<String>,
    allowed_fields: Option<HashSet<String>>,
}

impl<R> Default for FilterRules<R> {
    fn default() -> Self {
        Self {
            matchers: HashMap::new(),
            search_key: "search".to_string(),
            search_fields: Vec::new(),
            allowed_fields: None,
        }
    }
}

impl<R> Clone for FilterRules<R> {
    fn clone(&self) -> Self {
        Self {
            matchers: self.matchers.clone(),
            search_key: self.search_key.clone(),
            search_fields: self.search_fields.clone(),
            allowed_fields: self.allowed_fields.clone(),
        }
    }
}

impl<R> fmt::Debug for FilterRules<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterRules")
            .field("matchers", &self.matchers.keys().collect::<Vec<_>>())
            .field("search_key", &self.search_key)
            .field("search_fields", &self.search_fields)
            .field("allowed_fields", &self.allowed_fields)
            .finish()
    }
}

impl<R: Record> FilterRules<R> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a custom predicate for a key
    pub fn matcher<F>(mut self, key: impl Into<String>, f: F) -> Self
    where
        F: Fn(&R, &FilterValue) -> bool + Send + Sync + 'static,
    {
        self.matchers.insert(key.into(), Arc::new(f));
        self
    }

    /// Configure the free-text search key and the fields it searches
    pub fn search<I, S>(mut self, key: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.search_key = key.into();
        self.search_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Only evaluate field filters for these fields; other keys are ignored
    pub fn restrict_to<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    pub fn search_key(&self) -> &str {
        &self.search_key
    }

    pub fn search_fields(&self) -> &[String] {
        &self.search_fields
    }

    /// Whether a key would be evaluated at all
    pub fn handles(&self, key: &str) -> bool {
        self.matchers.contains_key(key)
            || key == self.search_key
            || self
                .allowed_fields
                .as_ref()
                .is_none_or(|allowed| allowed.contains(key))
    }

    /// Evaluate one filter entry
    pub fn matches_entry(&self, record: &R, key: &str, value: &FilterValue) -> bool {
        if !value.is_active() {
            return true;
        }
        if let Some(matcher) = self.matchers.get(key) {
            return matcher(record, value);
        }
        if key == self.search_key {
            return match value {
                FilterValue::Text(query) if !self.search_fields.is_empty() => {
                    ParsedQuery::parse(query).matches(record, &self.search_fields)
                }
                // Without search fields the search key is an ordinary field filter
                _ => value.matches_value(record.field(key).as_ref()),
            };
        }
        if !self.handles(key) {
            return true;
        }
        value.matches_value(record.field(key).as_ref())
    }

    /// Evaluate every entry of a filter set (logical AND)
    pub fn matches(&self, record: &R, filters: &FilterSet) -> bool {
        filters
            .active()
            .all(|(key, value)| self.matches_entry(record, key, value))
    }
}

/// Keep the records that match every active filter
pub fn apply_filters<R: Record + Clone>(
    records: &[R],
    filters: &FilterSet,
    rules: &FilterRules<R>,
) -> Vec<R> {
    if !filters.has_active_filters() {
        return records.to_vec();
    }
    records
        .iter()
        .filter(|record| rules.matches(record, filters))
        .cloned()
        .collect()
}

/// Plain substring search over several fields (any field may match)
pub fn search_filter<R: Record + Clone>(records: &[R], query: &str, fields: &[&str]) -> Vec<R> {
    let needle = FilterValue::text(query);
    if !needle.is_active() {
        return records.to_vec();
    }
    records
        .iter()
        .filter(|record| {
            fields
                .iter()
                .any(|field| needle.matches_value(record.field(field).as_ref()))
        })
        .cloned()
        .collect()
}

/// Keep records whose field is a number within `[min, max]`
///
/// Records whose field is missing or not numeric are dropped, even when
/// both bounds are `None`.
pub fn range_filter<R: Record + Clone>(
    records: &[R],
    field: &str,
    min: Option<f64>,
    max: Option<f64>,
) -> Vec<R> {
    records
        .iter()
        .filter(|record| match record.field_or_null(field).as_f64() {
            Some(n) if !n.is_nan() => min.is_none_or(|lo| n >= lo) && max.is_none_or(|hi| n <= hi),
            _ => false,
        })
        .cloned()
        .collect()
}

/// Keep records whose field is a date within `[start, end]`
///
/// Records whose field is missing or unparseable are dropped.
pub fn date_range_filter<R: Record + Clone>(
    records: &[R],
    field: &str,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
) -> Vec<R> {
    records
        .iter()
        .filter(|record| match record.field_or_null(field).as_datetime() {
            Some(dt) => start.is_none_or(|s| dt >= s) && end.is_none_or(|e| dt <= e),
            None => false,
        })
        .cloned()
        .collect()
}

/// Keep records whose field is one of `categories`; no categories keeps all
pub fn category_filter<R: Record + Clone>(
    records: &[R],
    field: &str,
    categories: &[String],
) -> Vec<R> {
    let condition = FilterValue::Categories(categories.to_vec());
    records
        .iter()
        .filter(|record| condition.matches_value(record.field(field).as_ref()))
        .cloned()
        .collect()
}

/// One choice in a filter dropdown
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOption {
    pub value: String,
    pub label: String,
    pub count: usize,
}

/// Build dropdown options from the distinct values of a field
///
/// Options are ordered by descending count; equal counts keep the order in
/// which the values first appear. Missing values are counted under `""`.
pub fn build_filter_options<R: Record>(
    records: &[R],
    field: &str,
    label: Option<&dyn Fn(&str) -> String>,
) -> Vec<FilterOption> {
    let mut counts: IndexMap<String, usize> = IndexMap::new();
    for record in records {
        *counts
            .entry(record.field_or_null(field).to_display_string())
            .or_insert(0) += 1;
    }

    let mut options: Vec<FilterOption> = counts
        .into_iter()
        .map(|(value, count)| FilterOption {
            label: label.map(|f| f(&value)).unwrap_or_else(|| value.clone()),
            value,
            count,
        })
        .collect();
    options.sort_by(|a, b| b.count.cmp(&a.count));
    options
}
