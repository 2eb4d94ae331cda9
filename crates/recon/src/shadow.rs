use crate::error::ReconError;
use crate::model::{CandidateRow, LogRow};

/// Pick the correct candidate out of an ambiguous multi-row match by
/// positional alignment against a shadow result set.
///
/// `old_matches` and `new_matches` must come from structurally parallel
/// queries that differ only in which table generation they read; identical
/// WHERE/JOIN shape is what guarantees identical row order, and that order
/// parity is the entire correctness bridge, since the two generations cannot
/// be joined directly.
///
/// The comparator locates `log_row` inside `old_matches`; the element at the
/// same index of `new_matches` is the resolution. The comparator must hold at
/// exactly one old index: zero hits is `NoConsistentOldMatch`, two or more is
/// `AmbiguousOldMatch`. A shadow set that is empty or shorter than the
/// ambiguous set is `InconsistentShadowData`: upstream corruption, not an
/// ordinary ambiguity.
pub fn resolve_by_shadow_index<'a>(
    log_row: &LogRow,
    old_matches: &[CandidateRow],
    new_matches: &'a [CandidateRow],
    compare: fn(&LogRow, &CandidateRow) -> bool,
) -> Result<&'a CandidateRow, ReconError> {
    if new_matches.is_empty() || old_matches.len() > new_matches.len() {
        return Err(ReconError::InconsistentShadowData {
            old: old_matches.len(),
            new: new_matches.len(),
        });
    }

    let mut pos: Option<usize> = None;
    for (i, old) in old_matches.iter().enumerate() {
        if compare(log_row, old) {
            if let Some(first) = pos {
                return Err(ReconError::AmbiguousOldMatch { first, second: i });
            }
            pos = Some(i);
        }
    }

    match pos {
        Some(i) => Ok(&new_matches[i]),
        None => Err(ReconError::NoConsistentOldMatch),
    }
}
