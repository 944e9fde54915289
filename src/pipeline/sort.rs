//! Sort stage: type-aware, null-aware, non-mutating ordering of records

use crate::core::error::QueryError;
use crate::core::field::FieldValue;
use crate::core::record::Record;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SortOrder {
    #[default]
    #[serde(rename = "asc", alias = "ascending")]
    Ascending,
    #[serde(rename = "desc", alias = "descending")]
    Descending,
}

impl SortOrder {
    /// The opposite direction
    pub fn toggle(self) -> Self {
        match self {
            SortOrder::Ascending => SortOrder::Descending,
            SortOrder::Descending => SortOrder::Ascending,
        }
    }

    /// Orient an ascending comparison result for this direction
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortOrder::Ascending => ordering,
            SortOrder::Descending => ordering.reverse(),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::Ascending => "asc",
            SortOrder::Descending => "desc",
        }
    }

    /// Parse `asc`/`desc` (and their long forms), case-insensitive
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Some(SortOrder::Ascending),
            "desc" | "descending" => Some(SortOrder::Descending),
            _ => None,
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where null and missing values go, independent of the sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NullsPlacement {
    #[default]
    Last,
    First,
}

/// A (field, direction) pair governing ordering
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub key: String,
    #[serde(default)]
    pub order: SortOrder,
    #[serde(default)]
    pub nulls: NullsPlacement,
}

impl SortSpec {
    pub fn new(key: impl Into<String>, order: SortOrder) -> Self {
        Self {
            key: key.into(),
            order,
            nulls: NullsPlacement::Last,
        }
    }

    pub fn asc(key: impl Into<String>) -> Self {
        Self::new(key, SortOrder::Ascending)
    }

    pub fn desc(key: impl Into<String>) -> Self {
        Self::new(key, SortOrder::Descending)
    }

    pub fn nulls_first(mut self) -> Self {
        self.nulls = NullsPlacement::First;
        self
    }

    /// Parse a URL-style sort expression
    ///
    /// # Format
    /// - `field` or `field:asc` (ascending)
    /// - `field:desc` (descending)
    pub fn parse(input: &str) -> Result<Self, QueryError> {
        let trimmed = input.trim();
        let (key, order) = match trimmed.split_once(':') {
            Some((key, dir)) => {
                let order = SortOrder::parse(dir).ok_or_else(|| QueryError::InvalidSort {
                    input: input.to_string(),
                    message: format!("unknown direction '{}', expected asc or desc", dir),
                })?;
                (key.trim(), order)
            }
            None => (trimmed, SortOrder::Ascending),
        };

        if key.is_empty() {
            return Err(QueryError::InvalidSort {
                input: input.to_string(),
                message: "missing sort field".to_string(),
            });
        }

        Ok(Self::new(key, order))
    }

    /// Parse a comma-separated list of sort expressions, in priority order
    pub fn parse_list(input: &str) -> Result<Vec<Self>, QueryError> {
        input
            .split(',')
            .filter(|part| !part.trim().is_empty())
            .map(Self::parse)
            .collect()
    }
}

/// Custom per-level comparator, always written as if ascending
pub type Comparator<R> = Arc<dyn Fn(&R, &R) -> Ordering + Send + Sync>;

/// One level of a multi-level sort
pub struct SortLevel<R> {
    pub spec: SortSpec,
    pub comparator: Option<Comparator<R>>,
}

impl<R> SortLevel<R> {
    pub fn with_comparator(spec: SortSpec, comparator: Comparator<R>) -> Self {
        Self {
            spec,
            comparator: Some(comparator),
        }
    }
}

impl<R> From<SortSpec> for SortLevel<R> {
    fn from(spec: SortSpec) -> Self {
        Self {
            spec,
            comparator: None,
        }
    }
}

impl<R> Clone for SortLevel<R> {
    fn clone(&self) -> Self {
        Self {
            spec: self.spec.clone(),
            comparator: self.comparator.clone(),
        }
    }
}

/// Locale-style string comparison
///
/// Letters compare case-insensitively first; strings that differ only in
/// case put the lowercase form first (`"a" < "A" < "b"`).
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    let folded = a
        .chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase));
    folded.then_with(|| b.cmp(a))
}

/// Natural comparison: digit runs compare by numeric value, text case-insensitively
///
/// `"pool2" < "pool10"`, which a plain string sort gets wrong.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut left = a.chars().peekable();
    let mut right = b.chars().peekable();

    loop {
        let (ca, cb) = (left.peek().copied(), right.peek().copied());
        match (ca, cb) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(ca), Some(cb)) if ca.is_ascii_digit() && cb.is_ascii_digit() => {
                let da = take_digits(&mut left);
                let db = take_digits(&mut right);
                let ord = cmp_digit_runs(&da, &db);
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            (Some(ca), Some(cb)) => {
                let ord = Iterator::cmp(ca.to_lowercase(), cb.to_lowercase());
                if ord != Ordering::Equal {
                    return ord;
                }
                left.next();
                right.next();
            }
        }
    }
}

fn take_digits(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> String {
    let mut run = String::new();
    while let Some(c) = chars.peek().copied() {
        if !c.is_ascii_digit() {
            break;
        }
        run.push(c);
        chars.next();
    }
    run
}

fn cmp_digit_runs(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

/// Type class of a value, in ascending sort order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum ValueClass {
    Number,
    Date,
    Boolean,
    Text,
    Object,
    Null,
}

fn classify(value: &FieldValue) -> ValueClass {
    match value {
        FieldValue::Integer(_) | FieldValue::Float(_) => ValueClass::Number,
        FieldValue::String(s) if s.trim().parse::<f64>().is_ok() => ValueClass::Number,
        FieldValue::String(_) => ValueClass::Text,
        FieldValue::DateTime(_) => ValueClass::Date,
        FieldValue::Boolean(_) => ValueClass::Boolean,
        FieldValue::Object(_) => ValueClass::Object,
        FieldValue::Null => ValueClass::Null,
    }
}

/// Compare two field values, ascending
///
/// Values are ranked by class first: numbers (numeric strings included),
/// dates, booleans, other strings, nested values, nulls. Within a class
/// numbers compare by value with `f64::total_cmp`, dates by epoch
/// milliseconds, `false < true`, strings locale-style and nested values by
/// their JSON text. The result is a total order for any mix of values.
pub fn compare_values(a: &FieldValue, b: &FieldValue) -> Ordering {
    use FieldValue as F;

    let class = classify(a);
    class.cmp(&classify(b)).then_with(|| match (a, b) {
        (F::DateTime(x), F::DateTime(y)) => x.timestamp_millis().cmp(&y.timestamp_millis()),
        (F::Boolean(x), F::Boolean(y)) => x.cmp(y),
        (F::String(x), F::String(y)) if class == ValueClass::Text => locale_cmp(x, y),
        _ if class == ValueClass::Number => {
            let (x, y) = (a.as_f64().unwrap_or(0.0), b.as_f64().unwrap_or(0.0));
            x.total_cmp(&y)
        }
        _ => locale_cmp(&a.to_display_string(), &b.to_display_string()),
    })
}

/// Compare two optional field values under a sort spec's direction and null policy
pub fn compare_fields(
    a: Option<&FieldValue>,
    b: Option<&FieldValue>,
    order: SortOrder,
    nulls: NullsPlacement,
) -> Ordering {
    let a = a.filter(|v| !v.is_null());
    let b = b.filter(|v| !v.is_null());

    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => match nulls {
            NullsPlacement::Last => Ordering::Greater,
            NullsPlacement::First => Ordering::Less,
        },
        (Some(_), None) => match nulls {
            NullsPlacement::Last => Ordering::Less,
            NullsPlacement::First => Ordering::Greater,
        },
        (Some(x), Some(y)) => order.apply(compare_values(x, y)),
    }
}

/// Compare two records under one sort spec
pub fn compare_records<R: Record + ?Sized>(a: &R, b: &R, spec: &SortSpec) -> Ordering {
    compare_fields(
        a.field(&spec.key).as_ref(),
        b.field(&spec.key).as_ref(),
        spec.order,
        spec.nulls,
    )
}

/// Compare two records level by level; the first non-equal level wins
pub fn compare_levels<R: Record>(a: &R, b: &R, levels: &[SortLevel<R>]) -> Ordering {
    for level in levels {
        let ordering = match &level.comparator {
            Some(comparator) => level.spec.order.apply(comparator(a, b)),
            None => compare_records(a, b, &level.spec),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

/// Sort records by one spec, returning a new vector
///
/// The sort is stable: records with equal keys keep their input order.
/// Sort keys are read once per record rather than once per comparison.
pub fn sort_records<R: Record + Clone>(records: &[R], spec: &SortSpec) -> Vec<R> {
    let mut keyed: Vec<(Option<FieldValue>, &R)> =
        records.iter().map(|r| (r.field(&spec.key), r)).collect();

    keyed.sort_by(|(a, _), (b, _)| compare_fields(a.as_ref(), b.as_ref(), spec.order, spec.nulls));

    keyed.into_iter().map(|(_, r)| r.clone()).collect()
}

/// Multi-level sort, returning a new vector
///
/// An empty level list returns the records in their input order.
pub fn multi_sort<R: Record + Clone>(records: &[R], levels: &[SortLevel<R>]) -> Vec<R> {
    let mut sorted = records.to_vec();
    if levels.is_empty() {
        return sorted;
    }
    sorted.sort_by(|a, b| compare_levels(a, b, levels));
    sorted
}

/// Sort by a field using natural (alphanumeric-aware) ordering
///
/// Missing values compare as the empty string.
pub fn natural_sort<R: Record + Clone>(records: &[R], key: &str, order: SortOrder) -> Vec<R> {
    let mut keyed: Vec<(String, &R)> = records
        .iter()
        .map(|r| (r.field_or_null(key).to_display_string(), r))
        .collect();
    keyed.sort_by(|(a, _), (b, _)| order.apply(natural_cmp(a, b)));
    keyed.into_iter().map(|(_, r)| r.clone()).collect()
}

/// Sort by a field's lowercased display string
pub fn case_insensitive_sort<R: Record + Clone>(
    records: &[R],
    key: &str,
    order: SortOrder,
) -> Vec<R> {
    let mut keyed: Vec<(String, &R)> = records
        .iter()
        .map(|r| (r.field_or_null(key).to_display_string().to_lowercase(), r))
        .collect();
    keyed.sort_by(|(a, _), (b, _)| order.apply(a.cmp(b)));
    keyed.into_iter().map(|(_, r)| r.clone()).collect()
}

/// Builders for common custom comparators
pub mod comparators {
    use super::{Comparator, locale_cmp};
    use crate::core::field::FieldValue;
    use crate::core::record::Record;
    use std::cmp::Ordering;
    use std::sync::Arc;

    /// Numeric comparison; values that are not numbers sort after every number
    pub fn numeric<R: Record + 'static>(key: &str) -> Comparator<R> {
        let key = key.to_string();
        Arc::new(move |a: &R, b: &R| {
            let x = a.field_or_null(&key).as_f64();
            let y = b.field_or_null(&key).as_f64();
            match (x, y) {
                (Some(x), Some(y)) => x.total_cmp(&y),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            }
        })
    }

    /// String comparison of the fields' display strings
    pub fn string<R: Record + 'static>(key: &str) -> Comparator<R> {
        let key = key.to_string();
        Arc::new(move |a: &R, b: &R| {
            locale_cmp(
                &a.field_or_null(&key).to_display_string(),
                &b.field_or_null(&key).to_display_string(),
            )
        })
    }

    /// Date comparison; unparseable dates sort before every real date
    pub fn date<R: Record + 'static>(key: &str) -> Comparator<R> {
        let key = key.to_string();
        Arc::new(move |a: &R, b: &R| {
            let x = a.field_or_null(&key).as_datetime();
            let y = b.field_or_null(&key).as_datetime();
            x.cmp(&y)
        })
    }

    /// Boolean comparison with `true` first
    pub fn boolean<R: Record + 'static>(key: &str) -> Comparator<R> {
        let key = key.to_string();
        Arc::new(move |a: &R, b: &R| {
            let x = matches!(a.field_or_null(&key), FieldValue::Boolean(true));
            let y = matches!(b.field_or_null(&key), FieldValue::Boolean(true));
            y.cmp(&x)
        })
    }
}

/// Sort key and direction for one table header row
///
/// Clicking the active column flips its direction; clicking another column
/// makes it active with the caller's default direction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortState {
    key: Option<String>,
    order: SortOrder,
}

impl SortState {
    pub fn new(key: Option<String>, order: SortOrder) -> Self {
        Self { key, order }
    }

    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    pub fn order(&self) -> SortOrder {
        self.order
    }

    pub fn toggle(&mut self, key: &str, default_order: SortOrder) {
        if self.key.as_deref() == Some(key) {
            self.order = self.order.toggle();
        } else {
            self.key = Some(key.to_string());
            self.order = default_order;
        }
    }

    pub fn set(&mut self, key: &str, order: SortOrder) {
        self.key = Some(key.to_string());
        self.order = order;
    }

    /// Forget the sort key; the direction goes back to ascending
    pub fn clear(&mut self) {
        self.key = None;
        self.order = SortOrder::Ascending;
    }

    /// The active spec, if a key is set
    pub fn spec(&self) -> Option<SortSpec> {
        self.key
            .as_ref()
            .map(|key| SortSpec::new(key.clone(), self.order))
    }

    /// Sort records by the active spec, or return them unchanged
    pub fn apply<R: Record + Clone>(&self, records: &[R]) -> Vec<R> {
        match self.spec() {
            Some(spec) => sort_records(records, &spec),
            None => records.to_vec(),
        }
    }

    /// Direction arrow to show on a column header, if it is the active column
    pub fn indicator(&self, column: &str) -> Option<SortOrder> {
        (self.key.as_deref() == Some(column)).then_some(self.order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn names(records: &[Value]) -> Vec<Option<String>> {
        records
            .iter()
            .map(|r| r["name"].as_str().map(String::from))
            .collect()
    }

    #[test]
    fn test_sort_numbers_ascending_and_descending() {
        let records = vec![json!({"v": 2}), json!({"v": 1.5}), json!({"v": 3})];

        let asc = sort_records(&records, &SortSpec::asc("v"));
        assert_eq!(asc, vec![json!({"v": 1.5}), json!({"v": 2}), json!({"v": 3})]);

        let desc = sort_records(&records, &SortSpec::desc("v"));
        assert_eq!(desc, vec![json!({"v": 3}), json!({"v": 2}), json!({"v": 1.5})]);
    }

    #[test]
    fn test_nulls_last_in_both_directions() {
        let records = vec![
            json!({"name": "B"}),
            json!({"name": null}),
            json!({"name": "A"}),
            json!({}),
        ];

        let asc = sort_records(&records, &SortSpec::asc("name"));
        assert_eq!(
            names(&asc),
            vec![Some("A".into()), Some("B".into()), None, None]
        );

        let desc = sort_records(&records, &SortSpec::desc("name"));
        assert_eq!(
            names(&desc),
            vec![Some("B".into()), Some("A".into()), None, None]
        );
    }

    #[test]
    fn test_nulls_first_policy() {
        let records = vec![json!({"name": "B"}), json!({"name": null}), json!({"name": "A"})];
        let sorted = sort_records(&records, &SortSpec::desc("name").nulls_first());
        assert_eq!(names(&sorted), vec![None, Some("B".into()), Some("A".into())]);
    }

    #[test]
    fn test_sort_is_stable() {
        let records = vec![
            json!({"k": 1, "id": "a"}),
            json!({"k": 0, "id": "b"}),
            json!({"k": 1, "id": "c"}),
            json!({"k": 0, "id": "d"}),
        ];
        let sorted = sort_records(&records, &SortSpec::asc("k"));
        let ids: Vec<&str> = sorted.iter().filter_map(|r| r["id"].as_str()).collect();
        assert_eq!(ids, vec!["b", "d", "a", "c"]);
    }

    #[test]
    fn test_dates_sort_by_epoch() {
        use chrono::{TimeZone, Utc};
        let early = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();
        let late = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(
            compare_values(&FieldValue::DateTime(late), &FieldValue::DateTime(early)),
            Ordering::Greater
        );
    }

    #[test]
    fn test_numeric_strings_compare_as_numbers() {
        assert_eq!(
            compare_values(&FieldValue::Integer(10), &FieldValue::from("9")),
            Ordering::Greater
        );
        assert_eq!(
            compare_values(&FieldValue::from("5"), &FieldValue::Float(9.5)),
            Ordering::Less
        );
        assert_eq!(
            compare_values(&FieldValue::from(" 10 "), &FieldValue::Integer(10)),
            Ordering::Equal
        );
    }

    #[test]
    fn test_mixed_classes_rank_before_comparing() {
        let text = FieldValue::from("usdc");
        let number = FieldValue::Integer(1_000_000);
        let flag = FieldValue::Boolean(true);
        assert_eq!(compare_values(&number, &text), Ordering::Less);
        assert_eq!(compare_values(&flag, &text), Ordering::Less);
        assert_eq!(compare_values(&number, &flag), Ordering::Less);
        assert_eq!(
            compare_values(&FieldValue::Float(f64::NAN), &FieldValue::Float(f64::NAN)),
            Ordering::Equal
        );
    }

    #[test]
    fn test_int_and_numeric_string_column_sorts() {
        let records: Vec<Value> = (0..300)
            .map(|i: i64| {
                let v = (i * 7919) % 1000;
                if i % 2 == 0 { json!({"v": v}) } else { json!({"v": v.to_string()}) }
            })
            .collect();
        let sorted = sort_records(&records, &SortSpec::asc("v"));
        let values: Vec<f64> = sorted
            .iter()
            .map(|r| FieldValue::from_json(&r["v"]).as_f64().unwrap())
            .collect();
        assert!(values.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_locale_cmp_case() {
        assert_eq!(locale_cmp("apple", "Banana"), Ordering::Less);
        assert_eq!(locale_cmp("a", "A"), Ordering::Less);
        assert_eq!(locale_cmp("A", "b"), Ordering::Less);
        assert_eq!(locale_cmp("same", "same"), Ordering::Equal);
    }

    #[test]
    fn test_natural_cmp() {
        assert_eq!(natural_cmp("pool2", "pool10"), Ordering::Less);
        assert_eq!(natural_cmp("Pool10", "pool10"), Ordering::Equal);
        assert_eq!(natural_cmp("v007", "v7"), Ordering::Equal);
        assert_eq!(natural_cmp("a", "ab"), Ordering::Less);
    }

    #[test]
    fn test_multi_sort_first_non_equal_level_wins() {
        let records = vec![
            json!({"chain": "aptos", "tvl": 5}),
            json!({"chain": "sui", "tvl": 9}),
            json!({"chain": "aptos", "tvl": 7}),
        ];
        let levels: Vec<SortLevel<Value>> =
            vec![SortSpec::asc("chain").into(), SortSpec::desc("tvl").into()];
        let sorted = multi_sort(&records, &levels);
        let tvls: Vec<i64> = sorted.iter().filter_map(|r| r["tvl"].as_i64()).collect();
        assert_eq!(tvls, vec![7, 5, 9]);
    }

    #[test]
    fn test_multi_sort_custom_comparator() {
        let records = vec![
            json!({"verified": false, "n": 1}),
            json!({"verified": true, "n": 2}),
        ];
        let levels = vec![SortLevel::with_comparator(
            SortSpec::asc("verified"),
            comparators::boolean::<Value>("verified"),
        )];
        let sorted = multi_sort(&records, &levels);
        assert_eq!(sorted[0]["n"], json!(2));
    }

    #[test]
    fn test_numeric_comparator_puts_non_numbers_last() {
        let records = vec![
            json!({"apy": "n/a", "n": 1}),
            json!({"apy": "4.5", "n": 2}),
            json!({"apy": 12, "n": 3}),
            json!({"apy": "-", "n": 4}),
            json!({"apy": 0.5, "n": 5}),
        ];
        let levels = vec![SortLevel::with_comparator(
            SortSpec::asc("apy"),
            comparators::numeric::<Value>("apy"),
        )];
        let sorted = multi_sort(&records, &levels);
        let ns: Vec<i64> = sorted.iter().filter_map(|r| r["n"].as_i64()).collect();
        assert_eq!(ns, vec![5, 2, 3, 1, 4]);
    }

    #[test]
    fn test_multi_sort_empty_levels_is_identity() {
        let records = vec![json!({"n": 2}), json!({"n": 1})];
        assert_eq!(multi_sort::<Value>(&records, &[]), records);
    }

    #[test]
    fn test_natural_and_case_insensitive_sort() {
        let records = vec![
            json!({"name": "pool10"}),
            json!({"name": "Pool2"}),
            json!({"name": "pool1"}),
        ];
        let natural = natural_sort(&records, "name", SortOrder::Ascending);
        assert_eq!(
            names(&natural),
            vec![Some("pool1".into()), Some("Pool2".into()), Some("pool10".into())]
        );

        let folded = case_insensitive_sort(&records, "name", SortOrder::Ascending);
        assert_eq!(
            names(&folded),
            vec![Some("pool1".into()), Some("pool10".into()), Some("Pool2".into())]
        );
    }

    #[test]
    fn test_parse_sort_spec() {
        assert_eq!(SortSpec::parse("value").unwrap(), SortSpec::asc("value"));
        assert_eq!(SortSpec::parse("value:DESC").unwrap(), SortSpec::desc("value"));
        assert!(SortSpec::parse("value:sideways").is_err());
        assert!(SortSpec::parse(":desc").is_err());

        let list = SortSpec::parse_list("chain:asc, tvl:desc").unwrap();
        assert_eq!(list, vec![SortSpec::asc("chain"), SortSpec::desc("tvl")]);
    }

    #[test]
    fn test_sort_state_toggle() {
        let mut state = SortState::default();
        state.toggle("value", SortOrder::Descending);
        assert_eq!(state.key(), Some("value"));
        assert_eq!(state.order(), SortOrder::Descending);

        state.toggle("value", SortOrder::Descending);
        assert_eq!(state.order(), SortOrder::Ascending);

        state.toggle("symbol", SortOrder::Ascending);
        assert_eq!(state.key(), Some("symbol"));
        assert_eq!(state.order(), SortOrder::Ascending);

        assert_eq!(state.indicator("symbol"), Some(SortOrder::Ascending));
        assert_eq!(state.indicator("value"), None);

        state.clear();
        assert!(state.spec().is_none());
    }

    #[test]
    fn test_sort_order_serde() {
        let order: SortOrder = serde_json::from_str("\"desc\"").unwrap();
        assert_eq!(order, SortOrder::Descending);
        assert_eq!(serde_json::to_string(&SortOrder::Ascending).unwrap(), "\"asc\"");
    }
}
