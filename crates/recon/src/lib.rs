//! `logmend-recon` — repair engine for corrupted audit-log rows.
//!
//! Pure engine crate: strategies, candidate matching, shadow-index
//! disambiguation, and corrected-record synthesis. The store, restriction
//! building, persistence, and any CLI around a run are collaborators behind
//! the seams in `logmend-store`.

pub mod config;
pub mod engine;
pub mod error;
pub mod model;
pub mod predicates;
pub mod scorm;
pub mod shadow;
pub mod strategy;
pub mod summary;

pub use config::RepairConfig;
pub use engine::RepairEngine;
pub use error::ReconError;
pub use model::{CandidateRow, CorrectedRow, LogRow, Outcome, RepairReport};
pub use strategy::{Strategy, StrategyDef, StrategyRegistry};
