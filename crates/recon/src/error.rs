use std::fmt;

use logmend_store::StoreError;

#[derive(Debug)]
pub enum ReconError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config or registry validation error (missing strategy field, bad
    /// alias source, etc.). Raised at build time, never per row.
    ConfigValidation(String),
    /// No strategy registered for the requested action.
    UnknownAction(String),
    /// A required column is absent from a fetched row.
    MissingColumn { column: String },
    /// A column is present but has the wrong shape.
    ColumnType { column: String, value: String },
    /// The query collaborator failed.
    Store(StoreError),
    /// Shadow result set shorter than the ambiguous set (or empty): the two
    /// generations are out of step. Operator investigation, not a retry.
    InconsistentShadowData { old: usize, new: usize },
    /// No element of the old result set satisfied the comparator.
    NoConsistentOldMatch,
    /// The comparator held at more than one old index, so positional
    /// alignment cannot pick a winner.
    AmbiguousOldMatch { first: usize, second: usize },
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::UnknownAction(action) => write!(f, "no strategy for action '{action}'"),
            Self::MissingColumn { column } => write!(f, "missing column '{column}'"),
            Self::ColumnType { column, value } => {
                write!(f, "column '{column}': cannot read value '{value}'")
            }
            Self::Store(err) => write!(f, "{err}"),
            Self::InconsistentShadowData { old, new } => {
                write!(
                    f,
                    "inconsistent shadow data: {old} old match(es) vs {new} new"
                )
            }
            Self::NoConsistentOldMatch => {
                write!(f, "no old match satisfies the comparator")
            }
            Self::AmbiguousOldMatch { first, second } => {
                write!(
                    f,
                    "comparator holds at old indexes {first} and {second}; cannot align"
                )
            }
        }
    }
}

impl std::error::Error for ReconError {}

impl From<StoreError> for ReconError {
    fn from(err: StoreError) -> Self {
        Self::Store(err)
    }
}
