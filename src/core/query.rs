//! Query parameters bridging URL state and table state

use crate::core::error::{QueryError, TableError, TableResult};
use crate::core::record::Record;
use crate::pipeline::filter::{FilterSet, FilterValue};
use crate::pipeline::sort::SortSpec;
use crate::state::TableState;
use serde::{Deserialize, Serialize};

/// Upper bound for `limit`, whatever the caller asks for
pub const MAX_LIMIT: usize = 500;

/// Table view state as carried in a URL query string
///
/// Any HTTP framework's query extractor can produce it. All parameters are
/// optional.
///
/// # Example
/// ```rust,ignore
/// // GET /assets?page=2&limit=25
/// // GET /assets?filter={"category": ["stable"]}&sort=value_usd:desc
/// // GET /assets?q=usd%20-stable&sort=value_usd:desc,symbol
/// let query = TableQuery::from_query_string(raw)?;
/// query.apply_to(&mut table);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableQuery {
    /// Page number (starts at 1)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<usize>,

    /// Number of items per page
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,

    /// Filters as a JSON object of filter values
    ///
    /// # Format
    /// - Substring: `{"symbol": "usd"}`
    /// - Range: `{"value_usd": {"min": 100, "max": 5000}}`
    /// - Categories: `{"chain": ["aptos", "sui"]}`
    /// - Flag: `{"verified": true}`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,

    /// Sort levels in priority order
    ///
    /// # Format
    /// - `field:asc` or `field` (ascending)
    /// - `field:desc` (descending)
    /// - `value_usd:desc,symbol` (two levels)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,

    /// Free-text search query
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,
}

fn default_page() -> usize {
    1
}

fn default_limit() -> usize {
    50
}

impl TableQuery {
    /// Decode from a raw query string (without the leading `?`)
    pub fn from_query_string(query: &str) -> TableResult<Self> {
        let query = query.strip_prefix('?').unwrap_or(query);
        Ok(serde_urlencoded::from_str(query)?)
    }

    /// Encode back into a query string
    pub fn to_query_string(&self) -> TableResult<String> {
        serde_urlencoded::to_string(self).map_err(|e| TableError::Internal(e.to_string()))
    }

    /// Get page number, ensuring minimum of 1
    pub fn page(&self) -> usize {
        self.page.unwrap_or_else(default_page).max(1)
    }

    /// Get limit, ensuring it doesn't exceed the maximum
    pub fn limit(&self) -> usize {
        self.limit.unwrap_or_else(default_limit).clamp(1, MAX_LIMIT)
    }

    /// Parse the filter JSON into a filter set
    pub fn filter_set(&self) -> TableResult<FilterSet> {
        match self.filter.as_deref().map(str::trim) {
            None | Some("") => Ok(FilterSet::new()),
            Some(raw) => serde_json::from_str(raw).map_err(|e| {
                TableError::Query(QueryError::InvalidFilter {
                    input: raw.to_string(),
                    message: e.to_string(),
                })
            }),
        }
    }

    /// Parse the sort levels
    pub fn sort_specs(&self) -> TableResult<Vec<SortSpec>> {
        match self.sort.as_deref() {
            None => Ok(Vec::new()),
            Some(raw) => Ok(SortSpec::parse_list(raw)?),
        }
    }

    /// Capture a table's current state
    pub fn from_state<T: Record + Clone>(state: &TableState<T>) -> Self {
        let mut filters = state.filters().clone();
        let q = filters
            .remove(state.search_key())
            .and_then(|value| match value {
                FilterValue::Text(q) if !q.trim().is_empty() => Some(q),
                _ => None,
            });

        let filter = if filters.has_active_filters() {
            match serde_json::to_string(&filters) {
                Ok(json) => Some(json),
                Err(e) => {
                    tracing::warn!(error = %e, "filters left out of captured query");
                    None
                }
            }
        } else {
            None
        };

        Self {
            page: (state.page() > 1).then_some(state.page()),
            limit: Some(state.page_size()),
            filter,
            sort: state
                .sort_by()
                .map(|key| format!("{}:{}", key, state.sort_order())),
            q,
        }
    }

    /// Apply this query to a table
    ///
    /// Lenient: parts that do not parse are logged and skipped, the rest is
    /// still applied. Only the first sort level is used since a table sorts
    /// by one column. The page is applied last so filter changes do not reset
    /// it.
    pub fn apply_to<T: Record + Clone>(&self, state: &mut TableState<T>) {
        if let Some(limit) = self.limit {
            state.set_page_size(limit.clamp(1, MAX_LIMIT));
        }

        if self.filter.is_some() {
            match self.filter_set() {
                Ok(filters) => {
                    state.clear_filters();
                    for (key, value) in filters.iter() {
                        state.set_filter(key, value.clone());
                    }
                }
                Err(e) => tracing::warn!(error = %e, "ignoring invalid filter parameter"),
            }
        }

        if let Some(q) = &self.q {
            state.set_search(q);
        }

        match self.sort_specs() {
            Ok(specs) => {
                if specs.len() > 1 {
                    tracing::debug!(levels = specs.len(), "only the first sort level is applied");
                }
                if let Some(spec) = specs.into_iter().next() {
                    state.set_sort(&spec.key, spec.order);
                }
            }
            Err(e) => tracing::warn!(error = %e, "ignoring invalid sort parameter"),
        }

        if self.page.is_some() {
            let page = self.page();
            if !state.go_to_page(page) {
                tracing::warn!(page, total_pages = state.total_pages(), "ignoring out of range page");
            }
        }
    }
}
