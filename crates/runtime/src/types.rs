//! Core runtime types
//!
//! Run options, cancellation, and the metadata attached to every run.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Cooperative cancellation flag, checked at chunk boundaries (never
/// mid-trial). Clones share the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Trials already dispatched finish normally;
    /// the run returns the completed prefix flagged as cancelled.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// Every requested trial was attempted
    Complete,
    /// Cancelled at a chunk boundary; the ensemble holds what finished
    Cancelled,
}

/// Per-run execution options
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Override the scenario's iteration count
    pub iterations: Option<u64>,
    /// Fan chunks out across the rayon pool. Does not change results:
    /// substreams are keyed by chunk index, not worker.
    pub parallel: bool,
    /// Cancellation flag shared with the caller
    pub cancel: CancelToken,
}

/// Facts about a finished run, attached to its ensemble and carried
/// through to the analyzed report
#[derive(Debug, Clone, PartialEq)]
pub struct RunMetadata {
    pub scenario: String,
    /// Master seed actually used (drawn from entropy when the scenario
    /// did not pin one), recorded so any run can be replayed
    pub seed: u64,
    pub iterations_requested: u64,
    /// Trials actually attempted, including failed ones
    pub iterations_completed: u64,
    pub failed_trials: u64,
    pub chunk_size: u64,
    pub parallel: bool,
    /// Whether the correlation matrix was corrected to the nearest PSD
    /// matrix at build time
    pub correlation_corrected: bool,
    pub duration: Duration,
    pub status: RunStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_token_is_shared_across_clones() {
        let token = CancelToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());
        token.cancel();
        assert!(clone.is_cancelled());
    }
}
