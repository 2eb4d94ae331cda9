use crate::error::StoreError;
use crate::query::Query;
use crate::row::Row;

/// The "run query, get rows" seam.
///
/// Implementations must return a fully materialized result set; the repair
/// engine assumes no partial or streaming reads within a single candidate
/// resolution. Retry/backoff on transient failures belongs behind this trait,
/// not in the engine.
pub trait QueryExecutor {
    fn execute(&self, query: &Query) -> Result<Vec<Row>, StoreError>;
}
