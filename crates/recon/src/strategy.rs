use std::collections::HashMap;

use logmend_store::Query;

use crate::error::ReconError;
use crate::model::{CandidateRow, CorrectedRow, LogRow};

// ---------------------------------------------------------------------------
// Strategy operations
// ---------------------------------------------------------------------------

/// Reportable situations a strategy can put into words.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    NoMatches,
}

pub type CandidateQueryFn = fn(&LogRow) -> Query;
pub type KnownBadFn = fn(&LogRow) -> bool;
pub type DiagnosticFn = fn(DiagnosticKind, &LogRow) -> String;
pub type CompareFn = fn(&LogRow, &CandidateRow) -> bool;
pub type SynthesizeFn = fn(&LogRow, &CandidateRow) -> CorrectedRow;

// ---------------------------------------------------------------------------
// Raw definitions
// ---------------------------------------------------------------------------

/// A possibly-partial strategy declaration. Unset fields are filled from the
/// alias source (candidate query, synthesizer, comparator, primary SQL) or
/// from registry defaults (known-bad, diagnostic, comparator) when
/// [`StrategyRegistry::build`] resolves the set.
pub struct StrategyDef {
    pub action: &'static str,
    pub derive_from: Option<&'static str>,
    /// Primary query template, without the caller's restriction fragment.
    pub primary_sql: Option<&'static str>,
    pub candidate_query: Option<CandidateQueryFn>,
    pub known_bad: Option<KnownBadFn>,
    pub diagnostic: Option<DiagnosticFn>,
    pub compare: Option<CompareFn>,
    pub synthesize: Option<SynthesizeFn>,
}

impl StrategyDef {
    pub fn new(action: &'static str) -> Self {
        Self {
            action,
            derive_from: None,
            primary_sql: None,
            candidate_query: None,
            known_bad: None,
            diagnostic: None,
            compare: None,
            synthesize: None,
        }
    }

    /// A definition that is entirely derived from another action.
    pub fn alias(action: &'static str, from: &'static str) -> Self {
        Self {
            derive_from: Some(from),
            ..Self::new(action)
        }
    }
}

// ---------------------------------------------------------------------------
// Resolved strategies
// ---------------------------------------------------------------------------

/// A fully-populated, frozen strategy. Built once by the registry; every
/// field is total from here on.
#[derive(Debug)]
pub struct Strategy {
    pub action: String,
    primary_sql: String,
    pub candidate_query: CandidateQueryFn,
    pub known_bad: KnownBadFn,
    pub diagnostic: DiagnosticFn,
    pub compare: CompareFn,
    pub synthesize: SynthesizeFn,
}

impl Strategy {
    /// The primary query with the caller's opaque restriction fragment ANDed
    /// in. The fragment is pre-validated by the restriction collaborator and
    /// consumed verbatim.
    pub fn primary_query(&self, restriction: &str) -> Query {
        Query::raw(format!("{} AND {}", self.primary_sql, restriction))
    }
}

/// Default comparator: actor identity. Usernames are stable across table
/// generations even where titles are not.
pub fn compare_by_username(log_row: &LogRow, candidate: &CandidateRow) -> bool {
    log_row.username == candidate.username
}

fn never_known_bad(_: &LogRow) -> bool {
    false
}

fn default_diagnostic(kind: DiagnosticKind, row: &LogRow) -> String {
    match kind {
        DiagnosticKind::NoMatches => format!(
            "no matches for course=\"{}\", user=\"{}\"",
            row.course_shortname, row.username
        ),
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Action name → frozen strategy for one log module. Built once before any
/// row is processed and read-only thereafter.
#[derive(Debug)]
pub struct StrategyRegistry {
    module: String,
    strategies: HashMap<String, Strategy>,
}

impl StrategyRegistry {
    /// Resolve aliases and freeze. Malformed definitions (duplicate actions,
    /// an unregistered alias source, or a strategy that still lacks a
    /// primary query, candidate query, or synthesizer after resolution)
    /// fail here, never per row.
    pub fn build(module: &str, defs: &[StrategyDef]) -> Result<Self, ReconError> {
        let mut by_action: HashMap<&str, &StrategyDef> = HashMap::new();
        for def in defs {
            if by_action.insert(def.action, def).is_some() {
                return Err(ReconError::ConfigValidation(format!(
                    "action '{}' is declared twice",
                    def.action
                )));
            }
        }

        let mut strategies = HashMap::new();
        for def in defs {
            strategies.insert(def.action.to_string(), resolve(def, &by_action)?);
        }
        Ok(Self {
            module: module.to_string(),
            strategies,
        })
    }

    /// The log module these strategies repair, e.g. "scorm".
    pub fn module(&self) -> &str {
        &self.module
    }

    pub fn get(&self, action: &str) -> Option<&Strategy> {
        self.strategies.get(action)
    }

    pub fn actions(&self) -> impl Iterator<Item = &str> {
        self.strategies.keys().map(String::as_str)
    }
}

/// Resolve one definition. Alias resolution is one level only: an unset
/// field is taken from the declared source's own declaration, never chased
/// through the source's source.
fn resolve(
    def: &StrategyDef,
    by_action: &HashMap<&str, &StrategyDef>,
) -> Result<Strategy, ReconError> {
    let source = match def.derive_from {
        Some(from) => Some(*by_action.get(from).ok_or_else(|| {
            ReconError::ConfigValidation(format!(
                "action '{}': alias source '{from}' is not registered",
                def.action
            ))
        })?),
        None => None,
    };

    let candidate_query = def
        .candidate_query
        .or_else(|| source.and_then(|s| s.candidate_query))
        .ok_or_else(|| missing(def.action, "candidate query"))?;

    let synthesize = def
        .synthesize
        .or_else(|| source.and_then(|s| s.synthesize))
        .ok_or_else(|| missing(def.action, "synthesizer"))?;

    let primary_sql = match def.primary_sql {
        Some(sql) => sql.to_string(),
        None => match source {
            Some(src) => {
                let sql = src
                    .primary_sql
                    .ok_or_else(|| missing(def.action, "primary query"))?;
                // The template names its action once; a derived action reuses
                // the template with its own name substituted.
                sql.replacen(src.action, def.action, 1)
            }
            None => return Err(missing(def.action, "primary query")),
        },
    };

    Ok(Strategy {
        action: def.action.to_string(),
        primary_sql,
        candidate_query,
        known_bad: def.known_bad.unwrap_or(never_known_bad),
        diagnostic: def.diagnostic.unwrap_or(default_diagnostic),
        compare: def
            .compare
            .or_else(|| source.and_then(|s| s.compare))
            .unwrap_or(compare_by_username),
        synthesize,
    })
}

fn missing(action: &str, what: &str) -> ReconError {
    ReconError::ConfigValidation(format!("action '{action}': no {what} after alias resolution"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn cand_query(row: &LogRow) -> Query {
        Query::new(
            "SELECT 1 WHERE username = ?",
            vec![json!(row.username.clone())],
        )
    }

    fn synth(row: &LogRow, candidate: &CandidateRow) -> CorrectedRow {
        CorrectedRow {
            time: row.time,
            userid: candidate.userid,
            ip: row.ip.clone(),
            course: candidate.course,
            module: row.module.clone(),
            cmid: candidate.cmid,
            action: row.action.clone(),
            url: row.url.clone(),
            info: candidate.scorm_id.to_string(),
        }
    }

    fn full_def(action: &'static str) -> StrategyDef {
        StrategyDef {
            primary_sql: Some(
                "SELECT * FROM mdl_log WHERE module = 'scorm' AND action = 'view'",
            ),
            candidate_query: Some(cand_query),
            synthesize: Some(synth),
            ..StrategyDef::new(action)
        }
    }

    #[test]
    fn alias_copies_unset_fields_and_rewrites_action_name() {
        let defs = vec![full_def("view"), StrategyDef::alias("launch", "view")];
        let registry = StrategyRegistry::build("scorm", &defs).unwrap();
        let launch = registry.get("launch").unwrap();

        let q = launch.primary_query("id > 100");
        assert_eq!(
            q.sql,
            "SELECT * FROM mdl_log WHERE module = 'scorm' AND action = 'launch' AND id > 100"
        );
        assert_eq!(launch.candidate_query as usize, cand_query as usize);
        assert_eq!(launch.synthesize as usize, synth as usize);
        assert_eq!(launch.compare as usize, compare_by_username as usize);
    }

    #[test]
    fn alias_keeps_own_overrides() {
        fn other_query(_: &LogRow) -> Query {
            Query::raw("SELECT 2")
        }
        let mut def = StrategyDef::alias("launch", "view");
        def.candidate_query = Some(other_query);
        let defs = vec![full_def("view"), def];
        let registry = StrategyRegistry::build("scorm", &defs).unwrap();
        let launch = registry.get("launch").unwrap();
        assert_eq!(launch.candidate_query as usize, other_query as usize);
        assert_eq!(launch.synthesize as usize, synth as usize);
    }

    #[test]
    fn alias_source_must_exist() {
        let defs = vec![StrategyDef::alias("launch", "view")];
        let err = StrategyRegistry::build("scorm", &defs).unwrap_err();
        assert!(err.to_string().contains("alias source 'view'"));
    }

    #[test]
    fn aliasing_does_not_chain_transitively() {
        // "report" aliases "launch", which itself left everything to "view".
        // One-level resolution must not reach through to "view".
        let defs = vec![
            full_def("view"),
            StrategyDef::alias("launch", "view"),
            StrategyDef::alias("report", "launch"),
        ];
        let err = StrategyRegistry::build("scorm", &defs).unwrap_err();
        assert!(err.to_string().contains("'report'"));
    }

    #[test]
    fn missing_synthesizer_fails_fast() {
        let mut def = full_def("view");
        def.synthesize = None;
        let err = StrategyRegistry::build("scorm", &[def]).unwrap_err();
        assert!(err.to_string().contains("no synthesizer"));
    }

    #[test]
    fn duplicate_action_fails_fast() {
        let defs = vec![full_def("view"), full_def("view")];
        let err = StrategyRegistry::build("scorm", &defs).unwrap_err();
        assert!(err.to_string().contains("declared twice"));
    }

    #[test]
    fn primary_query_ands_in_the_restriction() {
        let registry = StrategyRegistry::build("scorm", &[full_def("view")]).unwrap();
        let q = registry.get("view").unwrap().primary_query("time >= 1420070400");
        assert!(q.sql.ends_with("AND time >= 1420070400"));
        assert!(q.params.is_empty());
    }
}
