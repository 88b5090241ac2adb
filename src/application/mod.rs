// src/application/mod.rs
pub mod deck_deduper;
pub mod ghost_finder;
pub mod submitter;

pub use deck_deduper::{DeckDeduper, DedupReport, DuplicateGroup};
pub use ghost_finder::{GhostFinder, GhostNote, GhostReport};
pub use submitter::{BatchFailure, BatchReport, CardSubmitter};

/// Whether a reconciliation pass may mutate the collection.
///
/// Dry-run is the default everywhere; deletions only happen when the caller
/// explicitly asked for live mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    DryRun,
    Live,
}

impl RunMode {
    pub fn from_live_flag(live: bool) -> Self {
        if live {
            RunMode::Live
        } else {
            RunMode::DryRun
        }
    }

    pub fn is_live(&self) -> bool {
        matches!(self, RunMode::Live)
    }
}
