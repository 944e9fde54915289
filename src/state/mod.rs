//! Stateful table coordinator
//!
//! [`TableState`] owns one view's data and parameters and keeps the pipeline
//! output current:
//!
//! ```text
//! set_data / set_filter / handle_sort / go_to_page / load_more / on_scroll
//!                              │
//!                              ▼
//!            recompute: filter ──▶ sort   (index vectors into the data)
//!                              │
//!                              ▼
//!     display(): full set on mobile, page slice, or first `displayed` rows
//! ```
//!
//! Operations never fail. Out-of-range pages are ignored, unknown filter keys
//! are ignored when the config restricts them, and loads that were superseded
//! by a data change complete as no-ops.

pub mod scroll;

use crate::config::TableConfig;
use crate::core::record::Record;
use crate::pipeline::filter::{FilterOption, FilterRules, FilterSet, FilterValue, build_filter_options};
use crate::pipeline::paginate::{LoadTicket, PageInfo, VirtualCursor, clamp_page, paginate, total_pages};
use crate::pipeline::sort::{
    Comparator, NullsPlacement, SortOrder, SortSpec, SortState, compare_fields,
};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

pub use scroll::{ScrollMetrics, ScrollWatcher, SharedTableState, load_more_delayed, shared};

/// State of one table view
pub struct TableState<T> {
    data: Arc<[T]>,
    config: TableConfig,
    rules: FilterRules<T>,
    comparators: HashMap<String, Comparator<T>>,
    sort: SortState,
    nulls: NullsPlacement,
    filters: FilterSet,
    page: usize,
    cursor: VirtualCursor,
    selected: Option<T>,
    viewport_width: Option<u32>,
    filtered_idx: Vec<usize>,
    sorted_idx: Vec<usize>,
}

impl<T> fmt::Debug for TableState<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableState")
            .field("total", &self.data.len())
            .field("filtered", &self.filtered_idx.len())
            .field("sort", &self.sort)
            .field("filters", &self.filters)
            .field("page", &self.page)
            .field("cursor", &self.cursor)
            .field("viewport_width", &self.viewport_width)
            .finish()
    }
}

impl<T: Record + Clone> TableState<T> {
    /// Create a table with the filter rules implied by the config
    pub fn new(data: impl Into<Arc<[T]>>, config: TableConfig) -> Self {
        let rules = config.filter_rules();
        Self::with_rules(data, config, rules)
    }

    /// Create a table with custom filter rules
    pub fn with_rules(data: impl Into<Arc<[T]>>, config: TableConfig, rules: FilterRules<T>) -> Self {
        let config = config.normalized();
        let (sort, nulls) = match &config.initial_sort {
            Some(spec) => (SortState::new(Some(spec.key.clone()), spec.order), spec.nulls),
            None => (SortState::default(), NullsPlacement::default()),
        };

        let mut state = Self {
            data: data.into(),
            cursor: VirtualCursor::new(config.page_size, config.load_increment()),
            filters: config.initial_filters.clone(),
            config,
            rules,
            comparators: HashMap::new(),
            sort,
            nulls,
            page: 1,
            selected: None,
            viewport_width: None,
            filtered_idx: Vec::new(),
            sorted_idx: Vec::new(),
        };
        state.recompute();
        state
    }

    /// Use a custom comparator when sorting by `key`
    ///
    /// The comparator is written as if ascending; the active direction is
    /// applied on top.
    pub fn with_comparator(mut self, key: impl Into<String>, comparator: Comparator<T>) -> Self {
        self.comparators.insert(key.into(), comparator);
        self.recompute();
        self
    }

    fn recompute(&mut self) {
        let data = &self.data;
        let rules = &self.rules;
        let filters = &self.filters;

        self.filtered_idx = if filters.has_active_filters() {
            (0..data.len())
                .filter(|&i| rules.matches(&data[i], filters))
                .collect()
        } else {
            (0..data.len()).collect()
        };

        self.sorted_idx = self.filtered_idx.clone();
        if let Some(spec) = self.sort_spec() {
            match self.comparators.get(&spec.key) {
                Some(comparator) => {
                    self.sorted_idx
                        .sort_by(|&a, &b| spec.order.apply(comparator(&data[a], &data[b])));
                }
                None => {
                    let keys: Vec<_> = self
                        .sorted_idx
                        .iter()
                        .map(|&i| data[i].field(&spec.key))
                        .collect();
                    let mut order: Vec<usize> = (0..keys.len()).collect();
                    order.sort_by(|&a, &b| {
                        compare_fields(keys[a].as_ref(), keys[b].as_ref(), spec.order, spec.nulls)
                    });
                    self.sorted_idx = order.into_iter().map(|k| self.filtered_idx[k]).collect();
                }
            }
        }

        trace!(
            total = self.data.len(),
            filtered = self.filtered_idx.len(),
            "recomputed table"
        );
    }

    fn rows(&self, indices: &[usize]) -> Vec<&T> {
        indices.iter().map(|&i| &self.data[i]).collect()
    }

    // ------------------------------------------------------------------
    // Data and selection
    // ------------------------------------------------------------------

    /// Replace the data set
    ///
    /// Resets the displayed count to its initial size, supersedes any load in
    /// flight and clears the selection. The page is kept and clamped.
    pub fn set_data(&mut self, data: impl Into<Arc<[T]>>) {
        self.data = data.into();
        self.cursor.reset();
        self.selected = None;
        self.recompute();
        debug!(
            total = self.data.len(),
            filtered = self.filtered_idx.len(),
            generation = self.cursor.generation(),
            "table data replaced"
        );
    }

    pub fn data(&self) -> &Arc<[T]> {
        &self.data
    }

    pub fn set_selected_item(&mut self, item: Option<T>) {
        self.selected = item;
    }

    pub fn selected_item(&self) -> Option<&T> {
        self.selected.as_ref()
    }

    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    // ------------------------------------------------------------------
    // Sorting
    // ------------------------------------------------------------------

    /// Header click: same column flips direction, a new column starts with
    /// its configured default direction
    pub fn handle_sort(&mut self, key: &str) {
        if !self.config.is_sortable(key) {
            debug!(key, "ignoring sort on unsortable column");
            return;
        }
        self.sort.toggle(key, self.config.first_click_order(key));
        self.recompute();
        debug!(key, order = %self.sort.order(), "sort changed");
    }

    pub fn set_sort(&mut self, key: &str, order: SortOrder) {
        self.sort.set(key, order);
        self.recompute();
        debug!(key, order = %order, "sort set");
    }

    pub fn clear_sort(&mut self) {
        self.sort.clear();
        self.recompute();
        debug!("sort cleared");
    }

    pub fn sort_by(&self) -> Option<&str> {
        self.sort.key()
    }

    pub fn sort_order(&self) -> SortOrder {
        self.sort.order()
    }

    /// The active sort spec, including the configured null placement
    pub fn sort_spec(&self) -> Option<SortSpec> {
        self.sort.spec().map(|spec| SortSpec {
            nulls: self.nulls,
            ..spec
        })
    }

    /// Direction arrow for a column header
    pub fn sort_indicator(&self, column: &str) -> Option<SortOrder> {
        self.sort.indicator(column)
    }

    // ------------------------------------------------------------------
    // Filtering
    // ------------------------------------------------------------------

    /// Set one filter, overwriting any previous value for the key
    ///
    /// Goes back to page 1.
    pub fn set_filter(&mut self, key: &str, value: impl Into<FilterValue>) {
        let value = value.into();
        debug!(key, active = value.is_active(), "filter set");
        self.filters.set(key, value);
        self.page = 1;
        self.recompute();
    }

    pub fn remove_filter(&mut self, key: &str) {
        if self.filters.remove(key).is_some() {
            debug!(key, "filter removed");
            self.page = 1;
            self.recompute();
        }
    }

    /// Drop every filter, including the search query; goes back to page 1
    pub fn clear_filters(&mut self) {
        self.filters.clear();
        self.page = 1;
        self.recompute();
        debug!("filters cleared");
    }

    /// Set the free-text search query
    pub fn set_search(&mut self, query: &str) {
        let key = self.rules.search_key().to_string();
        self.set_filter(&key, FilterValue::text(query));
    }

    /// Filter key holding the search query
    pub fn search_key(&self) -> &str {
        self.rules.search_key()
    }

    pub fn search_query(&self) -> &str {
        match self.filters.get(self.rules.search_key()) {
            Some(FilterValue::Text(q)) => q,
            _ => "",
        }
    }

    pub fn filters(&self) -> &FilterSet {
        &self.filters
    }

    pub fn has_active_filters(&self) -> bool {
        self.filters.has_active_filters()
    }

    /// Dropdown options for a field, counted over the whole data set
    pub fn filter_options(&self, field: &str) -> Vec<FilterOption> {
        build_filter_options(&self.data, field, None)
    }

    // ------------------------------------------------------------------
    // Pagination
    // ------------------------------------------------------------------

    /// Current page, clamped into `[1, total_pages]`
    pub fn page(&self) -> usize {
        clamp_page(self.page, self.filtered_count(), self.config.page_size)
    }

    pub fn page_size(&self) -> usize {
        self.config.page_size
    }

    pub fn total_pages(&self) -> usize {
        total_pages(self.filtered_count(), self.config.page_size)
    }

    pub fn has_next_page(&self) -> bool {
        self.page() < self.total_pages()
    }

    pub fn has_previous_page(&self) -> bool {
        self.page() > 1
    }

    /// Go to a page; returns false and changes nothing when out of range
    pub fn go_to_page(&mut self, page: usize) -> bool {
        if page < 1 || page > self.total_pages() {
            return false;
        }
        self.page = page;
        debug!(page, "page changed");
        true
    }

    pub fn next_page(&mut self) -> bool {
        self.go_to_page(self.page() + 1)
    }

    pub fn previous_page(&mut self) -> bool {
        match self.page() {
            1 => false,
            page => self.go_to_page(page - 1),
        }
    }

    /// Change the page size; the displayed count starts over at the new size
    pub fn set_page_size(&mut self, page_size: usize) {
        let page_size = page_size.max(1);
        if page_size == self.config.page_size {
            return;
        }
        self.config.page_size = page_size;
        self.cursor
            .reconfigure(page_size, self.config.load_increment());
        self.page = clamp_page(self.page, self.filtered_count(), page_size);
        debug!(page_size, "page size changed");
    }

    pub fn page_info(&self) -> PageInfo {
        PageInfo::new(self.page(), self.config.page_size, self.filtered_count())
    }

    // ------------------------------------------------------------------
    // Virtual scroll
    // ------------------------------------------------------------------

    /// Whether rows are revealed incrementally in the current mode
    pub fn virtual_scroll_active(&self) -> bool {
        self.config.enable_virtual_scroll && !self.config.enable_pagination && !self.is_mobile()
    }

    /// Start revealing more rows
    ///
    /// Returns `None` when everything is shown or a load is already in
    /// flight. Finish with [`complete_load`](Self::complete_load).
    pub fn load_more(&mut self) -> Option<LoadTicket> {
        let ticket = self.cursor.begin_load(self.filtered_count())?;
        debug!(
            displayed = self.cursor.displayed(),
            generation = ticket.generation(),
            "load more started"
        );
        Some(ticket)
    }

    /// Finish a load; returns false when it was superseded by a data change
    pub fn complete_load(&mut self, ticket: LoadTicket) -> bool {
        let applied = self.cursor.complete_load(ticket, self.filtered_count());
        if applied {
            debug!(displayed = self.cursor.displayed(), "load more completed");
        } else {
            debug!(
                ticket = ticket.generation(),
                current = self.cursor.generation(),
                "load more superseded"
            );
        }
        applied
    }

    /// Abandon a load without revealing rows; returns false for stale tickets
    pub fn cancel_load(&mut self, ticket: LoadTicket) -> bool {
        let cancelled = self.cursor.cancel_load(ticket);
        if cancelled {
            debug!(displayed = self.cursor.displayed(), "load more cancelled");
        }
        cancelled
    }

    /// Start and finish a load in one step
    pub fn load_more_now(&mut self) -> bool {
        match self.load_more() {
            Some(ticket) => self.complete_load(ticket),
            None => false,
        }
    }

    /// React to a scroll event of the table's container
    ///
    /// Starts a load once the viewport bottom passes the configured
    /// threshold, when virtual scroll is active and there is more to show.
    pub fn on_scroll(&mut self, metrics: ScrollMetrics) -> Option<LoadTicket> {
        if !self.virtual_scroll_active() {
            return None;
        }
        let fraction = metrics.fraction()?;
        if fraction <= self.config.scroll_threshold {
            return None;
        }
        trace!(fraction, "scroll threshold passed");
        self.load_more()
    }

    /// Rows revealed by virtual scroll, never more than the filtered count
    pub fn displayed_count(&self) -> usize {
        self.cursor.visible(self.filtered_count())
    }

    pub fn is_loading_more(&self) -> bool {
        self.cursor.is_loading()
    }

    pub fn has_more(&self) -> bool {
        self.cursor.has_more(self.filtered_count())
    }

    // ------------------------------------------------------------------
    // Viewport
    // ------------------------------------------------------------------

    pub fn set_viewport_width(&mut self, width: u32) {
        let was_mobile = self.is_mobile();
        self.viewport_width = Some(width);
        if was_mobile != self.is_mobile() {
            debug!(width, mobile = self.is_mobile(), "viewport mode changed");
        }
    }

    /// Narrow viewports show every row; unknown width counts as desktop
    pub fn is_mobile(&self) -> bool {
        self.viewport_width
            .is_some_and(|width| width < self.config.mobile_breakpoint)
    }

    // ------------------------------------------------------------------
    // Pipeline output
    // ------------------------------------------------------------------

    pub fn total_count(&self) -> usize {
        self.data.len()
    }

    pub fn filtered_count(&self) -> usize {
        self.filtered_idx.len()
    }

    /// Records passing the filters, in data order
    pub fn filtered(&self) -> Vec<&T> {
        self.rows(&self.filtered_idx)
    }

    /// Filtered records in sort order
    pub fn sorted(&self) -> Vec<&T> {
        self.rows(&self.sorted_idx)
    }

    /// The rows to render right now
    pub fn display(&self) -> Vec<&T> {
        let total = self.sorted_idx.len();
        if self.is_mobile() {
            self.rows(&self.sorted_idx)
        } else if self.config.enable_pagination {
            self.rows(paginate(&self.sorted_idx, self.page(), self.config.page_size))
        } else if self.config.enable_virtual_scroll {
            self.rows(&self.sorted_idx[..self.cursor.visible(total)])
        } else {
            self.rows(&self.sorted_idx)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ColumnConfig;
    use serde_json::{Value, json};
    use std::sync::Arc;

    fn numbered(n: usize) -> Vec<Value> {
        (0..n).map(|i| json!({"id": i})).collect()
    }

    fn ids(rows: &[&Value]) -> Vec<u64> {
        rows.iter().filter_map(|r| r["id"].as_u64()).collect()
    }

    fn paged(page_size: usize) -> TableConfig {
        TableConfig {
            page_size,
            enable_pagination: true,
            ..TableConfig::default()
        }
    }

    #[test]
    fn test_pagination_slices_and_bounds() {
        let mut table = TableState::new(numbered(120), paged(50));
        assert_eq!(table.total_pages(), 3);
        assert_eq!(ids(&table.display()), (0..50).collect::<Vec<_>>());

        assert!(table.go_to_page(3));
        assert_eq!(ids(&table.display()), (100..120).collect::<Vec<_>>());
        assert!(!table.has_next_page());

        assert!(!table.go_to_page(4));
        assert_eq!(table.page(), 3);
        assert!(!table.next_page());
        assert!(table.previous_page());
        assert_eq!(table.page(), 2);
    }

    #[test]
    fn test_filter_resets_page() {
        let mut table = TableState::new(numbered(120), paged(50));
        table.go_to_page(3);
        table.set_filter("id", FilterValue::range(Some(10.0), None));
        assert_eq!(table.page(), 1);
        assert_eq!(table.filtered_count(), 110);
    }

    #[test]
    fn test_page_clamped_after_data_shrinks() {
        let mut table = TableState::new(numbered(120), paged(50));
        table.go_to_page(3);
        table.set_data(numbered(60));
        assert_eq!(table.page(), 2);
        assert_eq!(ids(&table.display()), (50..60).collect::<Vec<_>>());
    }

    #[test]
    fn test_handle_sort_uses_column_default_then_toggles() {
        let config = TableConfig {
            columns: vec![
                ColumnConfig::new("name").default_order(SortOrder::Ascending),
                ColumnConfig::new("v"),
            ],
            ..TableConfig::default()
        };
        let data = vec![json!({"name": "b", "v": 1}), json!({"name": "a", "v": 2})];
        let mut table = TableState::new(data, config);

        table.handle_sort("name");
        assert_eq!(table.sort_order(), SortOrder::Ascending);
        table.handle_sort("name");
        assert_eq!(table.sort_order(), SortOrder::Descending);

        table.handle_sort("v");
        assert_eq!(table.sort_by(), Some("v"));
        assert_eq!(table.sort_order(), SortOrder::Descending);
        assert_eq!(table.sorted()[0]["v"], json!(2));
    }

    #[test]
    fn test_unsortable_column_ignored() {
        let config = TableConfig {
            columns: vec![ColumnConfig {
                sortable: false,
                ..ColumnConfig::new("logo")
            }],
            ..TableConfig::default()
        };
        let mut table = TableState::new(numbered(3), config);
        table.handle_sort("logo");
        assert_eq!(table.sort_by(), None);
    }

    #[test]
    fn test_virtual_scroll_loads_in_steps() {
        let config = TableConfig {
            page_size: 4,
            load_increment: Some(4),
            ..TableConfig::default()
        };
        let mut table = TableState::new(numbered(10), config);
        assert_eq!(table.display().len(), 4);

        assert!(table.load_more_now());
        assert_eq!(table.displayed_count(), 8);
        assert!(table.load_more_now());
        assert_eq!(table.displayed_count(), 10);
        assert!(!table.has_more());
        assert!(table.load_more().is_none());
    }

    #[test]
    fn test_displayed_count_capped_by_rows() {
        let mut table = TableState::new(numbered(10), TableConfig::default());
        assert_eq!(table.displayed_count(), 10);
        assert!(!table.has_more());

        table.set_filter("id", FilterValue::range(None, Some(2.0)));
        assert_eq!(table.displayed_count(), 3);
        assert_eq!(table.display().len(), 3);

        table.clear_filters();
        table.set_data(Vec::new());
        assert_eq!(table.displayed_count(), 0);
    }

    #[test]
    fn test_cancel_load_allows_next_load() {
        let config = TableConfig {
            page_size: 4,
            load_increment: Some(4),
            ..TableConfig::default()
        };
        let mut table = TableState::new(numbered(10), config);
        let ticket = table.load_more().expect("load should start");
        assert!(table.load_more().is_none());

        assert!(table.cancel_load(ticket));
        assert!(!table.is_loading_more());
        assert_eq!(table.displayed_count(), 4);
        assert!(table.load_more_now());
        assert_eq!(table.displayed_count(), 8);
    }

    #[test]
    fn test_data_change_supersedes_load() {
        let config = TableConfig {
            page_size: 4,
            ..TableConfig::default()
        };
        let mut table = TableState::new(numbered(20), config);
        table.set_selected_item(Some(json!({"id": 1})));
        let ticket = table.load_more().expect("load should start");
        assert!(table.is_loading_more());

        table.set_data(numbered(30));
        assert!(!table.is_loading_more());
        assert!(table.selected_item().is_none());
        assert!(!table.complete_load(ticket));
        assert_eq!(table.displayed_count(), 4);
    }

    #[test]
    fn test_scroll_threshold_and_mobile() {
        let config = TableConfig {
            page_size: 4,
            ..TableConfig::default()
        };
        let mut table = TableState::new(numbered(20), config);

        assert!(table.on_scroll(ScrollMetrics::new(0.0, 1000.0, 500.0)).is_none());
        assert!(table.on_scroll(ScrollMetrics::new(400.0, 1000.0, 500.0)).is_some());
        assert!(table.on_scroll(ScrollMetrics::new(450.0, 1000.0, 500.0)).is_none());

        let mut table = TableState::new(numbered(20), TableConfig::default());
        table.set_viewport_width(500);
        assert!(table.is_mobile());
        assert_eq!(table.display().len(), 20);
        assert!(table.on_scroll(ScrollMetrics::new(900.0, 1000.0, 500.0)).is_none());
    }

    #[test]
    fn test_search_query_and_clear() {
        let config = TableConfig {
            search_fields: vec!["symbol".to_string()],
            ..TableConfig::default()
        };
        let data = vec![json!({"symbol": "USDC"}), json!({"symbol": "APT"})];
        let mut table = TableState::new(data, config);
        table.set_search("usd");
        assert_eq!(table.filtered_count(), 1);
        assert_eq!(table.search_query(), "usd");

        table.clear_filters();
        assert_eq!(table.filtered_count(), 2);
        assert!(!table.has_active_filters());
    }

    #[test]
    fn test_custom_comparator() {
        let data = vec![
            json!({"name": "pool10"}),
            json!({"name": "pool2"}),
            json!({"name": "pool1"}),
        ];
        let natural: Comparator<Value> = Arc::new(|a: &Value, b: &Value| {
            crate::pipeline::sort::natural_cmp(
                a["name"].as_str().unwrap_or_default(),
                b["name"].as_str().unwrap_or_default(),
            )
        });
        let mut table = TableState::new(data, TableConfig::default()).with_comparator("name", natural);
        table.set_sort("name", SortOrder::Ascending);
        let names: Vec<&str> = table.sorted().iter().filter_map(|r| r["name"].as_str()).collect();
        assert_eq!(names, vec!["pool1", "pool2", "pool10"]);
    }

    #[test]
    fn test_set_page_size_resizes_cursor() {
        let mut table = TableState::new(numbered(200), TableConfig::default());
        table.load_more_now();
        assert_eq!(table.displayed_count(), 150);
        table.set_page_size(10);
        assert_eq!(table.displayed_count(), 10);
        assert_eq!(table.config().load_increment(), 20);
    }
}
