//! The pure stages of the table pipeline
//!
//! ```text
//! records ──▶ filter ──▶ sort ──▶ paginate / virtualize ──▶ display slice
//! ```
//!
//! Every stage is a function of (records, parameters) that leaves its input
//! untouched. The stateful coordinator in [`crate::state`] composes them.

pub mod filter;
pub mod paginate;
pub mod search;
pub mod sort;

pub use filter::{
    FilterOption, FilterRules, FilterSet, FilterValue, Matcher, apply_filters,
    build_filter_options, category_filter, date_range_filter, range_filter, search_filter,
};
pub use paginate::{LoadTicket, PageInfo, VirtualCursor, clamp_page, paginate, total_pages};
pub use search::{ParsedQuery, advanced_search, combine_search_queries};
pub use sort::{
    Comparator, NullsPlacement, SortLevel, SortOrder, SortSpec, SortState, compare_records,
    compare_values, multi_sort, sort_records,
};
