//! Strategy definitions for the `scorm` module's log actions.
//!
//! The broken rows embed the sco reference in the `url` column
//! (`player.php?cm=24161&scoid=9879`); the primary query digs it back out
//! with the trailing `reverse/substr` extraction so the LEFT JOIN can attach
//! sco context when any digits survived. Candidate matching then works only
//! from stable identifying attributes (titles, identifiers, course
//! shortname, actor email), never from the embedded reference itself.

use regex::Regex;
use serde_json::json;

use logmend_store::Query;

use crate::model::{CandidateRow, CorrectedRow, LogRow};
use crate::predicates::is_placeholder_value;
use crate::strategy::{DiagnosticKind, StrategyDef, StrategyRegistry};

pub const MODULE: &str = "scorm";

const VIEW_PRIMARY_SQL: &str = "SELECT log.*, \
       u.email, u.username, \
       s.name AS scorm_name, s.reference AS scorm_reference, \
       o.id AS sco_id, \
       o.identifier AS sco_identifier, \
       o.title AS sco_title, \
       c.shortname AS course_shortname \
FROM mdl_log log \
JOIN mdl_user u ON u.id = log.userid \
JOIN mdl_scorm s ON s.id = log.cmid \
LEFT JOIN mdl_scorm_scoes o ON o.id = \
       (SELECT reverse(substr(reverse(log.url), 1, locate('=', reverse(log.url)) - 1))) \
JOIN mdl_course c ON c.id = log.course \
WHERE log.module = 'scorm' AND log.action = 'view'";

/// Two structurally different matches: a two-level one (course → scorm → sco
/// → actor) when the url yielded sco context, and a coarser one (course →
/// scorm → actor) when it did not.
fn view_candidate_query(row: &LogRow) -> Query {
    if row.sco_title.is_some() {
        Query::new(
            "SELECT c.id AS course, \
                    o.id AS sco_id, o.title AS sco_title, o.identifier AS sco_identifier, \
                    s.id AS scorm_id, \
                    cm.id AS cmid, \
                    u.id AS userid, u.username \
             FROM mdl_scorm_scoes o \
             JOIN mdl_scorm s ON s.id = o.scorm \
             JOIN mdl_course c ON c.id = s.course \
             JOIN mdl_course_modules cm ON cm.instance = s.id AND cm.course = c.id \
             JOIN mdl_user u ON BINARY u.email = ? \
             WHERE o.title = ? AND o.identifier = ? AND c.shortname = ?",
            vec![
                json!(row.email),
                json!(row.sco_title),
                json!(row.sco_identifier),
                json!(row.course_shortname),
            ],
        )
    } else {
        Query::new(
            "SELECT c.id AS course, \
                    s.id AS scorm_id, \
                    cm.id AS cmid, \
                    u.id AS userid, u.username \
             FROM mdl_course c \
             JOIN mdl_scorm s ON s.name = ? AND s.course = c.id \
             JOIN mdl_course_modules cm ON cm.instance = s.id AND cm.course = c.id \
             JOIN mdl_user u ON BINARY u.email = ? \
             WHERE c.shortname = ?",
            vec![
                json!(row.scorm_name),
                json!(row.email),
                json!(row.course_shortname),
            ],
        )
    }
}

/// Rows that can never be repaired: the PMSBConcepts course predates the
/// schema the candidate queries read, and placeholder actor emails would
/// bind the row to whichever user the anonymizer collided it with.
fn view_known_bad(row: &LogRow) -> bool {
    row.course_shortname == "PMSBConcepts" || is_placeholder_value(&row.email)
}

fn view_diagnostic(kind: DiagnosticKind, row: &LogRow) -> String {
    match kind {
        DiagnosticKind::NoMatches => format!(
            "no matches for course=\"{}\", user=\"{}\", sco=\"{}\", scorm=\"{}\"",
            row.course_shortname,
            row.username,
            row.sco_title.as_deref().unwrap_or(""),
            row.scorm_name
        ),
    }
}

/// Rewrite the url's embedded references and assemble the replacement row.
/// Each numeric parameter is substituted independently and only where digits
/// are actually present; `scoid=` with no digits stays as it was. All foreign
/// keys come from the candidate, with a missing sco defaulting to empty.
fn view_synthesize(row: &LogRow, candidate: &CandidateRow) -> CorrectedRow {
    let sco = candidate
        .sco_id
        .map(|id| id.to_string())
        .unwrap_or_default();
    let url = Regex::new(r"\?id=\d+")
        .unwrap()
        .replace(&row.url, format!("?id={}", candidate.cmid))
        .into_owned();
    let url = Regex::new(r"cm=\d+")
        .unwrap()
        .replace(&url, format!("cm={}", candidate.cmid))
        .into_owned();
    let url = Regex::new(r"scoid=\d+")
        .unwrap()
        .replace(&url, format!("scoid={sco}"))
        .into_owned();

    CorrectedRow {
        time: row.time,
        userid: candidate.userid,
        ip: row.ip.clone(),
        course: candidate.course,
        module: row.module.clone(),
        cmid: candidate.cmid,
        action: row.action.clone(),
        url,
        info: candidate.scorm_id.to_string(),
    }
}

/// The registered actions for this module. `launch` and `pre-view` behave
/// exactly like `view` apart from the action name in the primary query.
pub fn strategy_defs() -> Vec<StrategyDef> {
    vec![
        StrategyDef {
            primary_sql: Some(VIEW_PRIMARY_SQL),
            candidate_query: Some(view_candidate_query),
            known_bad: Some(view_known_bad),
            diagnostic: Some(view_diagnostic),
            synthesize: Some(view_synthesize),
            ..StrategyDef::new("view")
        },
        StrategyDef::alias("launch", "view"),
        StrategyDef::alias("pre-view", "view"),
    ]
}

/// The frozen registry for the scorm module.
pub fn registry() -> Result<StrategyRegistry, crate::error::ReconError> {
    StrategyRegistry::build(MODULE, &strategy_defs())
}
