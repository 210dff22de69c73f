//! Classification of how an entry's commercial state changed since the last sync.

use crate::entry::{CatalogEntry, FetchedState};

/// Kind of change between the stored entry and a fresh fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionKind {
    /// No discount before, a non-zero discount now.
    SaleStarted,
    /// No price before (unreleased or unavailable), a price now.
    ReleaseDetected,
    /// Anything else, including a sale ending.
    RoutineUpdate,
}

impl TransitionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SaleStarted => "sale_started",
            Self::ReleaseDetected => "release_detected",
            Self::RoutineUpdate => "routine_update",
        }
    }
}

/// Classify the transition from `previous` (as stored before this run's write)
/// to `fresh`.
///
/// A sale start is checked first, so at most one notable kind is produced
/// even when both conditions hold.
pub fn classify(previous: &CatalogEntry, fresh: &FetchedState) -> TransitionKind {
    if !previous.has_discount() && fresh.has_discount() {
        TransitionKind::SaleStarted
    } else if previous.price.is_none() && fresh.price.is_some() {
        TransitionKind::ReleaseDetected
    } else {
        TransitionKind::RoutineUpdate
    }
}
