use log::warn;

use logmend_store::{QueryExecutor, Row};

use crate::config::RepairConfig;
use crate::error::ReconError;
use crate::model::{CandidateRow, LogRow, Outcome, RepairMeta, RepairReport};
use crate::shadow::resolve_by_shadow_index;
use crate::strategy::{DiagnosticKind, Strategy, StrategyRegistry};
use crate::summary::compute_summary;

/// The per-row reconciliation pipeline. Stateless: borrows a frozen
/// registry, the run config, and two executor collaborators. `current`
/// reads today's normalized schema, `shadow` reads the pre-corruption
/// generation of the same tables.
pub struct RepairEngine<'a> {
    registry: &'a StrategyRegistry,
    config: &'a RepairConfig,
    current: &'a dyn QueryExecutor,
    shadow: &'a dyn QueryExecutor,
}

impl std::fmt::Debug for RepairEngine<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RepairEngine")
            .field("registry", &self.registry)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<'a> RepairEngine<'a> {
    /// Wire up the collaborators. The config must target the registry's
    /// module and every configured action must be registered; a miss is a
    /// configuration error, caught here rather than mid-batch.
    pub fn new(
        registry: &'a StrategyRegistry,
        config: &'a RepairConfig,
        current: &'a dyn QueryExecutor,
        shadow: &'a dyn QueryExecutor,
    ) -> Result<Self, ReconError> {
        if config.module != registry.module() {
            return Err(ReconError::ConfigValidation(format!(
                "config targets module '{}' but the registry repairs '{}'",
                config.module,
                registry.module()
            )));
        }
        for action in &config.actions {
            if registry.get(action).is_none() {
                return Err(ReconError::UnknownAction(action.clone()));
            }
        }
        Ok(Self {
            registry,
            config,
            current,
            shadow,
        })
    }

    /// Fetch the broken rows for one strategy via its primary query, with
    /// the configured restriction ANDed in.
    pub fn fetch_rows(&self, strategy: &Strategy) -> Result<Vec<LogRow>, ReconError> {
        let query = strategy.primary_query(&self.config.restrict);
        let rows = self.current.execute(&query)?;
        rows.iter().map(LogRow::from_row).collect()
    }

    /// Reconcile one row to exactly one outcome. Store failures propagate;
    /// everything else (unmatched, ambiguous, known-bad) is an ordinary
    /// outcome and never aborts the batch.
    pub fn reconcile_row(&self, strategy: &Strategy, row: &LogRow) -> Result<Outcome, ReconError> {
        // Known-bad rows are terminal before any query is spent on them.
        if (strategy.known_bad)(row) {
            return Ok(Outcome::KnownBadSkipped);
        }

        let query = (strategy.candidate_query)(row);
        let candidates = decode_candidates(&self.current.execute(&query)?)?;

        match candidates.as_slice() {
            [] => Ok(Outcome::NoMatch {
                reason: (strategy.diagnostic)(DiagnosticKind::NoMatches, row),
            }),
            [only] => Ok(Outcome::Corrected((strategy.synthesize)(row, only))),
            _ => {
                // Re-run the identical query against the shadow generation.
                // Identical WHERE/JOIN shape is the row-order-parity
                // precondition the index correlation depends on.
                let old = decode_candidates(&self.shadow.execute(&query)?)?;
                match resolve_by_shadow_index(row, &old, &candidates, strategy.compare) {
                    Ok(winner) => Ok(Outcome::Corrected((strategy.synthesize)(row, winner))),
                    Err(
                        err @ (ReconError::InconsistentShadowData { .. }
                        | ReconError::NoConsistentOldMatch
                        | ReconError::AmbiguousOldMatch { .. }),
                    ) => {
                        warn!("action '{}': {err}", strategy.action);
                        Ok(Outcome::MultipleMatchesUnresolved {
                            reason: err.to_string(),
                        })
                    }
                    Err(other) => Err(other),
                }
            }
        }
    }

    /// Fetch and reconcile every broken row of one action, in row order.
    pub fn reconcile_action(&self, action: &str) -> Result<Vec<Outcome>, ReconError> {
        let strategy = self
            .registry
            .get(action)
            .ok_or_else(|| ReconError::UnknownAction(action.into()))?;
        let rows = self.fetch_rows(strategy)?;
        let mut outcomes = Vec::with_capacity(rows.len());
        for row in &rows {
            outcomes.push(self.reconcile_row(strategy, row)?);
        }
        Ok(outcomes)
    }

    /// Run every configured action and assemble the report for the
    /// diagnostics sink.
    pub fn run(&self) -> Result<RepairReport, ReconError> {
        let mut outcomes = Vec::new();
        for action in &self.config.actions {
            outcomes.extend(self.reconcile_action(action)?);
        }
        Ok(RepairReport {
            meta: RepairMeta {
                config_name: self.config.name.clone(),
                module: self.config.module.clone(),
                engine_version: env!("CARGO_PKG_VERSION").to_string(),
                run_at: chrono::Utc::now().to_rfc3339(),
            },
            summary: compute_summary(&outcomes),
            outcomes,
        })
    }
}

fn decode_candidates(rows: &[Row]) -> Result<Vec<CandidateRow>, ReconError> {
    rows.iter().map(CandidateRow::from_row).collect()
}
