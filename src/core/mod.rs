//! Core module containing the record model, errors and the URL query bridge

pub mod error;
pub mod field;
pub mod query;
pub mod record;

pub use error::{ConfigError, ErrorResponse, QueryError, TableError, TableResult};
pub use field::FieldValue;
pub use query::TableQuery;
pub use record::Record;
