use std::fmt;

/// Failure modes of the query collaborator. A connection drop and a
/// malformed statement need different operator responses; neither may be
/// silently swallowed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Could not reach the store or the connection dropped mid-query.
    Connection(String),
    /// The store rejected the statement (syntax, unknown table/column).
    Syntax(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connection(msg) => write!(f, "store connection error: {msg}"),
            Self::Syntax(msg) => write!(f, "store rejected statement: {msg}"),
        }
    }
}

impl std::error::Error for StoreError {}
