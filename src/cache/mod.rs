//! Response caching for the services that feed tables
//!
//! Both types are plain objects with a `&self` API. Construct them once and
//! pass them by reference (or in an `Arc`) to whatever fetches table data.

pub mod dedup;
pub mod ttl;

pub use dedup::{DedupError, DedupStats, RequestDeduplicator};
pub use ttl::{CacheStats, TtlCache};
