//! `logmend-store` — row, query, and executor types shared by the repair
//! pipeline.
//!
//! The relational store itself is an external collaborator: this crate only
//! defines the seam (`QueryExecutor`) and the shapes that cross it. No
//! connection management or SQL escaping lives here.

pub mod error;
pub mod executor;
pub mod query;
pub mod row;

pub use error::StoreError;
pub use executor::QueryExecutor;
pub use query::Query;
pub use row::{i64_field, str_field, Row};
