//! # Tabula
//!
//! Table state for analytics dashboards: every list or grid view (assets,
//! transactions, DeFi positions, protocol registries) runs its records
//! through the same pipeline.
//!
//! ```text
//! records ──▶ filter ──▶ sort ──▶ paginate / virtualize ──▶ display slice
//! ```
//!
//! ## Features
//!
//! - **Pure stages**: [`pipeline`] functions never mutate their input and never fail
//! - **Null-aware sorting**: missing values sort last in both directions
//! - **Search queries**: bare terms, `"exact phrases"` and `-exclusions`
//! - **Pagination or virtual scroll**: discrete pages, or rows revealed as the user scrolls
//! - **Configuration-Based**: table views defined via YAML configuration
//! - **URL state**: [`TableQuery`](core::TableQuery) reads and writes `?page=&sort=&filter=&q=`
//! - **Response caching**: TTL cache and request deduplication for data services
//!
//! ## Quick Start
//!
//! ```rust
//! use tabula::prelude::*;
//! use serde_json::json;
//!
//! let assets = vec![
//!     json!({"symbol": "APT", "value_usd": 1200.0}),
//!     json!({"symbol": "USDC", "value_usd": 500.0}),
//!     json!({"symbol": "MOJO", "value_usd": null}),
//! ];
//!
//! let config = TableConfig {
//!     search_fields: vec!["symbol".to_string()],
//!     ..TableConfig::default()
//! };
//! let mut table = TableState::new(assets, config);
//!
//! // First click on a column sorts descending
//! table.handle_sort("value_usd");
//! let symbols: Vec<_> = table.display().iter().map(|r| r["symbol"].clone()).collect();
//! assert_eq!(symbols, vec![json!("APT"), json!("USDC"), json!("MOJO")]);
//!
//! table.set_search("usd");
//! assert_eq!(table.filtered_count(), 1);
//! ```

pub mod cache;
pub mod config;
pub mod core;
pub mod pipeline;
pub mod state;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core ===
    pub use crate::core::{
        error::{ConfigError, QueryError, TableError, TableResult},
        field::FieldValue,
        query::TableQuery,
        record::Record,
    };

    // === Pipeline ===
    pub use crate::pipeline::{
        filter::{FilterOption, FilterRules, FilterSet, FilterValue, apply_filters},
        paginate::{LoadTicket, PageInfo, VirtualCursor, paginate, total_pages},
        search::{ParsedQuery, advanced_search},
        sort::{NullsPlacement, SortLevel, SortOrder, SortSpec, SortState, multi_sort, sort_records},
    };

    // === State ===
    pub use crate::state::{ScrollMetrics, ScrollWatcher, SharedTableState, TableState};

    // === Config ===
    pub use crate::config::{ColumnConfig, TableConfig, TableOverrides, TablesConfig};

    // === Cache ===
    pub use crate::cache::{DedupError, RequestDeduplicator, TtlCache};

    // === External dependencies ===
    pub use anyhow::Result;
    pub use serde::{Deserialize, Serialize};
}
