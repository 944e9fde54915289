//! Typed error handling for tabula
//!
//! The pipeline stages and the table coordinator never fail: unknown filter
//! keys are ignored, out-of-range pages are clamped and missing fields sort
//! last. Errors only exist at the edges where text comes in from outside,
//! such as configuration files and URL query strings.
//!
//! # Error Categories
//!
//! - [`ConfigError`]: Errors related to configuration parsing and validation
//! - [`QueryError`]: Errors related to URL query parameters (filter JSON, sort strings)
//!
//! # Example
//!
//! ```rust,ignore
//! use tabula::prelude::*;
//!
//! let query = TableQuery::from_query_string("sort=value:sideways")?;
//! match query.sort_specs() {
//!     Ok(specs) => println!("{} sort levels", specs.len()),
//!     Err(TableError::Query(QueryError::InvalidSort { input, .. })) => {
//!         println!("bad sort expression: {}", input);
//!     }
//!     Err(e) => eprintln!("Other error: {}", e),
//! }
//! ```

use serde::Serialize;
use std::fmt;

/// The main error type for tabula
#[derive(Debug)]
pub enum TableError {
    /// Configuration errors
    Config(ConfigError),

    /// Query parameter errors
    Query(QueryError),

    /// Internal errors (should not happen in normal operation)
    Internal(String),
}

impl fmt::Display for TableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableError::Config(e) => write!(f, "{}", e),
            TableError::Query(e) => write!(f, "{}", e),
            TableError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for TableError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TableError::Config(e) => Some(e),
            TableError::Query(e) => Some(e),
            TableError::Internal(_) => None,
        }
    }
}

/// Serializable error body, for hosts that forward errors to a client
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
}

impl TableError {
    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            TableError::Config(e) => e.error_code(),
            TableError::Query(e) => e.error_code(),
            TableError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Convert to an error response
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            code: self.error_code().to_string(),
            message: self.to_string(),
        }
    }
}

// =============================================================================
// Config Errors
// =============================================================================

/// Errors related to table configuration
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to parse configuration source
    ParseError {
        file: Option<String>,
        message: String,
    },

    /// Invalid value in configuration
    InvalidValue {
        field: String,
        value: String,
        message: String,
    },

    /// Configuration file not found
    FileNotFound { path: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ParseError { file, message } => match file {
                Some(file) => write!(f, "Failed to parse config '{}': {}", file, message),
                None => write!(f, "Failed to parse config: {}", message),
            },
            ConfigError::InvalidValue {
                field,
                value,
                message,
            } => {
                write!(
                    f,
                    "Invalid value '{}' for config field '{}': {}",
                    value, field, message
                )
            }
            ConfigError::FileNotFound { path } => {
                write!(f, "Config file not found: {}", path)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl ConfigError {
    pub fn error_code(&self) -> &'static str {
        match self {
            ConfigError::ParseError { .. } => "CONFIG_PARSE_ERROR",
            ConfigError::InvalidValue { .. } => "CONFIG_INVALID_VALUE",
            ConfigError::FileNotFound { .. } => "CONFIG_FILE_NOT_FOUND",
        }
    }
}

impl From<ConfigError> for TableError {
    fn from(err: ConfigError) -> Self {
        TableError::Config(err)
    }
}

// =============================================================================
// Query Errors
// =============================================================================

/// Errors raised while reading table state out of URL query parameters
#[derive(Debug)]
pub enum QueryError {
    /// The query string itself could not be decoded
    Malformed { message: String },

    /// The `filter` parameter is not a JSON object of filter values
    InvalidFilter { input: String, message: String },

    /// A `sort` level is not `field`, `field:asc` or `field:desc`
    InvalidSort { input: String, message: String },
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryError::Malformed { message } => write!(f, "Malformed query string: {}", message),
            QueryError::InvalidFilter { input, message } => {
                write!(f, "Invalid filter '{}': {}", input, message)
            }
            QueryError::InvalidSort { input, message } => {
                write!(f, "Invalid sort '{}': {}", input, message)
            }
        }
    }
}

impl std::error::Error for QueryError {}

impl QueryError {
    pub fn error_code(&self) -> &'static str {
        match self {
            QueryError::Malformed { .. } => "MALFORMED_QUERY",
            QueryError::InvalidFilter { .. } => "INVALID_FILTER",
            QueryError::InvalidSort { .. } => "INVALID_SORT",
        }
    }
}

impl From<QueryError> for TableError {
    fn from(err: QueryError) -> Self {
        TableError::Query(err)
    }
}

// =============================================================================
// Conversions from external errors
// =============================================================================

impl From<serde_yaml::Error> for TableError {
    fn from(err: serde_yaml::Error) -> Self {
        TableError::Config(ConfigError::ParseError {
            file: None,
            message: err.to_string(),
        })
    }
}

impl From<serde_urlencoded::de::Error> for TableError {
    fn from(err: serde_urlencoded::de::Error) -> Self {
        TableError::Query(QueryError::Malformed {
            message: err.to_string(),
        })
    }
}

impl From<anyhow::Error> for TableError {
    fn from(err: anyhow::Error) -> Self {
        // Recover typed errors that were boxed into anyhow along the way
        match err.downcast::<ConfigError>() {
            Ok(config) => TableError::Config(config),
            Err(err) => TableError::Internal(err.to_string()),
        }
    }
}

/// Result alias used at the parsing edges of the crate
pub type TableResult<T> = Result<T, TableError>;
