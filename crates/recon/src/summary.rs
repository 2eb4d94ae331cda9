use std::collections::HashMap;

use crate::model::{Outcome, RepairSummary};

/// Aggregate counters over a run's outcomes, the ones operators watch
/// (`count`, `multiple_matches`, `no_matches`, ...).
pub fn compute_summary(outcomes: &[Outcome]) -> RepairSummary {
    let mut outcome_counts: HashMap<String, usize> = HashMap::new();
    let mut corrected = 0;
    let mut no_matches = 0;
    let mut multiple_matches = 0;
    let mut known_bad_skipped = 0;

    for outcome in outcomes {
        *outcome_counts.entry(outcome.label().to_string()).or_insert(0) += 1;

        match outcome {
            Outcome::Corrected(_) => corrected += 1,
            Outcome::NoMatch { .. } => no_matches += 1,
            Outcome::MultipleMatchesUnresolved { .. } => multiple_matches += 1,
            Outcome::KnownBadSkipped => known_bad_skipped += 1,
        }
    }

    RepairSummary {
        total: outcomes.len(),
        corrected,
        no_matches,
        multiple_matches,
        known_bad_skipped,
        outcome_counts,
    }
}
