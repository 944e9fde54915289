//! Configuration loading and management
//!
//! A [`TableConfig`] describes one table view: paging mode, sizes, scroll
//! behaviour, initial sort and filters, and its columns. Several views can
//! share defaults through a [`TablesConfig`] file:
//!
//! ```yaml
//! defaults:
//!   page_size: 25
//!   enable_virtual_scroll: true
//! views:
//!   assets:
//!     search_fields: [symbol, name]
//!     initial_sort: { key: value_usd, order: desc }
//!   transactions:
//!     enable_pagination: true
//! ```

use crate::core::error::ConfigError;
use crate::core::record::Record;
use crate::pipeline::filter::{FilterRules, FilterSet};
use crate::pipeline::sort::{SortOrder, SortSpec};
use anyhow::Result;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

fn default_page_size() -> usize {
    50
}

fn default_true() -> bool {
    true
}

fn default_scroll_threshold() -> f64 {
    0.8
}

fn default_load_delay_ms() -> u64 {
    300
}

fn default_mobile_breakpoint() -> u32 {
    768
}

fn default_sort_order() -> SortOrder {
    SortOrder::Descending
}

fn default_search_key() -> String {
    "search".to_string()
}

/// Configuration for one column of a table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnConfig {
    /// Record field shown in this column
    pub key: String,

    /// Header label; the key is used when absent
    #[serde(default)]
    pub label: Option<String>,

    /// Whether clicking the header sorts by this column
    #[serde(default = "default_true")]
    pub sortable: bool,

    /// Whether filters keyed by this column are applied
    #[serde(default = "default_true")]
    pub filterable: bool,

    /// Direction used when this column is first clicked
    #[serde(default)]
    pub default_order: Option<SortOrder>,
}

impl ColumnConfig {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: None,
            sortable: true,
            filterable: true,
            default_order: None,
        }
    }

    pub fn default_order(mut self, order: SortOrder) -> Self {
        self.default_order = Some(order);
        self
    }

    pub fn label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.key)
    }
}

/// Configuration for one table view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableConfig {
    /// Rows per page, and the initial row count in virtual scroll mode
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Discrete pages instead of virtual scroll
    #[serde(default)]
    pub enable_pagination: bool,

    /// Reveal rows incrementally as the user scrolls
    #[serde(default = "default_true")]
    pub enable_virtual_scroll: bool,

    /// Scroll fraction past which more rows are loaded
    #[serde(default = "default_scroll_threshold")]
    pub scroll_threshold: f64,

    /// Rows revealed per load; two pages when absent
    #[serde(default)]
    pub load_increment: Option<usize>,

    /// Delay before revealed rows appear, for the loading indicator
    #[serde(default = "default_load_delay_ms")]
    pub load_delay_ms: u64,

    /// Viewports narrower than this many pixels show every row
    #[serde(default = "default_mobile_breakpoint")]
    pub mobile_breakpoint: u32,

    #[serde(default)]
    pub initial_sort: Option<SortSpec>,

    #[serde(default)]
    pub initial_filters: FilterSet,

    /// Direction for a newly clicked column without its own default
    #[serde(default = "default_sort_order")]
    pub default_sort_order: SortOrder,

    /// Filter key holding the free-text search query
    #[serde(default = "default_search_key")]
    pub search_key: String,

    /// Fields the search query looks in
    #[serde(default)]
    pub search_fields: Vec<String>,

    #[serde(default)]
    pub columns: Vec<ColumnConfig>,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            enable_pagination: false,
            enable_virtual_scroll: true,
            scroll_threshold: default_scroll_threshold(),
            load_increment: None,
            load_delay_ms: default_load_delay_ms(),
            mobile_breakpoint: default_mobile_breakpoint(),
            initial_sort: None,
            initial_filters: FilterSet::default(),
            default_sort_order: default_sort_order(),
            search_key: default_search_key(),
            search_fields: Vec::new(),
            columns: Vec::new(),
        }
    }
}

impl TableConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = read_config_file(path)?;
        let config: Self = serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseError {
            file: Some(path.display().to_string()),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a JSON value
    pub fn from_json_value(value: serde_json::Value) -> Result<Self> {
        let config: Self = serde_json::from_value(value)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that cannot describe a working table
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.page_size == 0 {
            return Err(invalid("page_size", "0", "must be at least 1"));
        }
        if !(self.scroll_threshold > 0.0 && self.scroll_threshold <= 1.0) {
            return Err(invalid(
                "scroll_threshold",
                &self.scroll_threshold.to_string(),
                "must be in (0, 1]",
            ));
        }
        if self.load_increment == Some(0) {
            return Err(invalid("load_increment", "0", "must be at least 1"));
        }
        Ok(())
    }

    /// Clamp every value into its working range
    ///
    /// Used for configs built in code, which skip [`validate`](Self::validate).
    pub fn normalized(mut self) -> Self {
        self.page_size = self.page_size.max(1);
        if !(self.scroll_threshold > 0.0 && self.scroll_threshold <= 1.0) {
            self.scroll_threshold = if self.scroll_threshold > 1.0 {
                1.0
            } else {
                default_scroll_threshold()
            };
        }
        self.load_increment = self.load_increment.map(|n| n.max(1));
        self
    }

    /// Rows revealed per completed load
    pub fn load_increment(&self) -> usize {
        self.load_increment
            .unwrap_or(self.page_size.saturating_mul(2))
            .max(1)
    }

    pub fn column(&self, key: &str) -> Option<&ColumnConfig> {
        self.columns.iter().find(|c| c.key == key)
    }

    /// Direction to use when `key` becomes the sort column
    pub fn first_click_order(&self, key: &str) -> SortOrder {
        self.column(key)
            .and_then(|c| c.default_order)
            .unwrap_or(self.default_sort_order)
    }

    /// Whether a column may be sorted; undeclared columns are sortable
    pub fn is_sortable(&self, key: &str) -> bool {
        self.column(key).is_none_or(|c| c.sortable)
    }

    /// Filter rules implied by this config
    ///
    /// When columns are declared, field filters only apply to filterable
    /// columns and other keys are ignored.
    pub fn filter_rules<R: Record>(&self) -> FilterRules<R> {
        let rules = FilterRules::new().search(self.search_key.clone(), self.search_fields.clone());
        if self.columns.is_empty() {
            rules
        } else {
            rules.restrict_to(
                self.columns
                    .iter()
                    .filter(|c| c.filterable)
                    .map(|c| c.key.clone()),
            )
        }
    }

    /// Apply a view's overrides on top of this config
    ///
    /// Scalars in the override win; columns are merged by key (an override
    /// column replaces the base column with the same key, new keys are
    /// appended); initial filters are merged with the override winning.
    pub fn with_overrides(mut self, overrides: TableOverrides) -> Self {
        let TableOverrides {
            page_size,
            enable_pagination,
            enable_virtual_scroll,
            scroll_threshold,
            load_increment,
            load_delay_ms,
            mobile_breakpoint,
            initial_sort,
            initial_filters,
            default_sort_order,
            search_key,
            search_fields,
            columns,
        } = overrides;

        if let Some(v) = page_size {
            self.page_size = v;
        }
        if let Some(v) = enable_pagination {
            self.enable_pagination = v;
        }
        if let Some(v) = enable_virtual_scroll {
            self.enable_virtual_scroll = v;
        }
        if let Some(v) = scroll_threshold {
            self.scroll_threshold = v;
        }
        if load_increment.is_some() {
            self.load_increment = load_increment;
        }
        if let Some(v) = load_delay_ms {
            self.load_delay_ms = v;
        }
        if let Some(v) = mobile_breakpoint {
            self.mobile_breakpoint = v;
        }
        if initial_sort.is_some() {
            self.initial_sort = initial_sort;
        }
        if let Some(filters) = initial_filters {
            self.initial_filters.extend(filters);
        }
        if let Some(v) = default_sort_order {
            self.default_sort_order = v;
        }
        if let Some(v) = search_key {
            self.search_key = v;
        }
        if let Some(v) = search_fields {
            self.search_fields = v;
        }
        for column in columns {
            match self.columns.iter_mut().find(|c| c.key == column.key) {
                Some(existing) => *existing = column,
                None => self.columns.push(column),
            }
        }
        self
    }
}

/// Per-view settings layered over shared defaults; absent fields inherit
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableOverrides {
    pub page_size: Option<usize>,
    pub enable_pagination: Option<bool>,
    pub enable_virtual_scroll: Option<bool>,
    pub scroll_threshold: Option<f64>,
    pub load_increment: Option<usize>,
    pub load_delay_ms: Option<u64>,
    pub mobile_breakpoint: Option<u32>,
    pub initial_sort: Option<SortSpec>,
    pub initial_filters: Option<FilterSet>,
    pub default_sort_order: Option<SortOrder>,
    pub search_key: Option<String>,
    pub search_fields: Option<Vec<String>>,
    pub columns: Vec<ColumnConfig>,
}

/// Table configuration for a whole dashboard: shared defaults plus named views
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TablesConfig {
    #[serde(default)]
    pub defaults: TableConfig,

    #[serde(default)]
    pub views: IndexMap<String, TableOverrides>,
}

impl TablesConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = read_config_file(path)?;
        let config: Self = serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseError {
            file: Some(path.display().to_string()),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the defaults and every resolved view
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        self.defaults.validate()?;
        for name in self.views.keys() {
            if let Some(view) = self.view(name) {
                view.validate().map_err(|e| match e {
                    ConfigError::InvalidValue {
                        field,
                        value,
                        message,
                    } => ConfigError::InvalidValue {
                        field: format!("views.{}.{}", name, field),
                        value,
                        message,
                    },
                    other => other,
                })?;
            }
        }
        Ok(())
    }

    /// Resolve a view's config: defaults with the view's overrides applied
    ///
    /// Unknown views return `None`.
    pub fn view(&self, name: &str) -> Option<TableConfig> {
        self.views
            .get(name)
            .map(|overrides| self.defaults.clone().with_overrides(overrides.clone()))
    }

    /// Merge several configuration files; later files win
    ///
    /// Defaults of later configs replace earlier defaults; views with the
    /// same name are replaced as a whole.
    pub fn merge(configs: Vec<TablesConfig>) -> Self {
        let mut merged = TablesConfig::default();
        for config in configs {
            merged.defaults = config.defaults;
            merged.views.extend(config.views);
        }
        merged
    }
}

fn read_config_file(path: &Path) -> std::result::Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => ConfigError::FileNotFound {
            path: path.display().to_string(),
        },
        _ => ConfigError::ParseError {
            file: Some(path.display().to_string()),
            message: e.to_string(),
        },
    })
}

fn invalid(field: &str, value: &str, message: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
        message: message.to_string(),
    }
}
