use serde::Serialize;
use serde_json::{json, Value};

use logmend_store::{i64_field, str_field, Query, Row};

use crate::error::ReconError;

// ---------------------------------------------------------------------------
// Column readers
// ---------------------------------------------------------------------------

fn require_str(row: &Row, column: &str) -> Result<String, ReconError> {
    match row.get(column) {
        None | Some(Value::Null) => Err(ReconError::MissingColumn {
            column: column.into(),
        }),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Err(ReconError::ColumnType {
            column: column.into(),
            value: other.to_string(),
        }),
    }
}

fn require_i64(row: &Row, column: &str) -> Result<i64, ReconError> {
    match row.get(column) {
        None | Some(Value::Null) => Err(ReconError::MissingColumn {
            column: column.into(),
        }),
        Some(value) => i64_field(row, column).ok_or_else(|| ReconError::ColumnType {
            column: column.into(),
            value: value.to_string(),
        }),
    }
}

fn opt_str(row: &Row, column: &str) -> Option<String> {
    str_field(row, column).map(str::to_string)
}

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// A raw, possibly-corrupted audit record as fetched by a strategy's primary
/// query, denormalized context columns included. Never mutated; only read
/// to produce a [`CorrectedRow`].
#[derive(Debug, Clone)]
pub struct LogRow {
    pub time: i64,
    pub userid: i64,
    pub ip: String,
    pub course: i64,
    pub module: String,
    pub cmid: i64,
    pub action: String,
    pub url: String,
    pub info: String,
    // Denormalized by the primary query's joins.
    pub email: String,
    pub username: String,
    pub scorm_name: String,
    pub scorm_reference: Option<String>,
    pub sco_id: Option<i64>,
    pub sco_identifier: Option<String>,
    pub sco_title: Option<String>,
    pub course_shortname: String,
}

impl LogRow {
    /// Decode one primary-query result row. The sco columns come from a LEFT
    /// JOIN and may be NULL; everything else is required.
    pub fn from_row(row: &Row) -> Result<Self, ReconError> {
        Ok(Self {
            time: require_i64(row, "time")?,
            userid: require_i64(row, "userid")?,
            ip: require_str(row, "ip")?,
            course: require_i64(row, "course")?,
            module: require_str(row, "module")?,
            cmid: require_i64(row, "cmid")?,
            action: require_str(row, "action")?,
            url: require_str(row, "url")?,
            info: require_str(row, "info")?,
            email: require_str(row, "email")?,
            username: require_str(row, "username")?,
            scorm_name: require_str(row, "scorm_name")?,
            scorm_reference: opt_str(row, "scorm_reference"),
            sco_id: i64_field(row, "sco_id"),
            sco_identifier: opt_str(row, "sco_identifier"),
            sco_title: opt_str(row, "sco_title"),
            course_shortname: require_str(row, "course_shortname")?,
        })
    }
}

/// A possible correct target fetched from the current normalized schema.
/// The sco columns are absent when the coarse match variant ran.
#[derive(Debug, Clone)]
pub struct CandidateRow {
    pub course: i64,
    pub scorm_id: i64,
    pub cmid: i64,
    pub userid: i64,
    pub username: String,
    pub sco_id: Option<i64>,
    pub sco_title: Option<String>,
    pub sco_identifier: Option<String>,
}

impl CandidateRow {
    pub fn from_row(row: &Row) -> Result<Self, ReconError> {
        Ok(Self {
            course: require_i64(row, "course")?,
            scorm_id: require_i64(row, "scorm_id")?,
            cmid: require_i64(row, "cmid")?,
            userid: require_i64(row, "userid")?,
            username: require_str(row, "username")?,
            sco_id: i64_field(row, "sco_id"),
            sco_title: opt_str(row, "sco_title"),
            sco_identifier: opt_str(row, "sco_identifier"),
        })
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// The synthesized replacement for a broken [`LogRow`]: same logical shape,
/// foreign keys drawn from the resolved candidate, insert-ready.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrectedRow {
    pub time: i64,
    pub userid: i64,
    pub ip: String,
    pub course: i64,
    pub module: String,
    pub cmid: i64,
    pub action: String,
    pub url: String,
    pub info: String,
}

impl CorrectedRow {
    /// Parameterized insert for the persistence collaborator. The engine
    /// never executes this itself.
    pub fn insert_statement(&self) -> Query {
        Query::new(
            "INSERT INTO mdl_log (time,userid,ip,course,module,cmid,action,url,info) \
             VALUES (?,?,?,?,?,?,?,?,?)",
            vec![
                json!(self.time),
                json!(self.userid),
                json!(self.ip),
                json!(self.course),
                json!(self.module),
                json!(self.cmid),
                json!(self.action),
                json!(self.url),
                json!(self.info),
            ],
        )
    }
}

/// Result of reconciling one row. Created once per input row and handed to
/// the caller's diagnostics sink; the engine retains nothing.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    Corrected(CorrectedRow),
    NoMatch { reason: String },
    MultipleMatchesUnresolved { reason: String },
    KnownBadSkipped,
}

impl Outcome {
    /// Stable tag for aggregation counters.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Corrected(_) => "corrected",
            Self::NoMatch { .. } => "no_matches",
            Self::MultipleMatchesUnresolved { .. } => "multiple_matches",
            Self::KnownBadSkipped => "known_bad_skipped",
        }
    }
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct RepairSummary {
    pub total: usize,
    pub corrected: usize,
    pub no_matches: usize,
    pub multiple_matches: usize,
    pub known_bad_skipped: usize,
    pub outcome_counts: std::collections::HashMap<String, usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RepairMeta {
    pub config_name: String,
    pub module: String,
    pub engine_version: String,
    pub run_at: String,
}

/// Everything a run produced, for the caller's diagnostics sink. Corrected
/// rows ride inside their outcomes; persistence is the caller's business.
#[derive(Debug, Clone, Serialize)]
pub struct RepairReport {
    pub meta: RepairMeta,
    pub summary: RepairSummary,
    pub outcomes: Vec<Outcome>,
}
