//! Runtime errors
//!
//! Per-trial problems are data, not control flow: a failed trial is
//! recorded on the ensemble and the run continues. The errors here are
//! the run-level ones.

use thiserror::Error;

/// Runtime result type
pub type Result<T> = std::result::Result<T, ExecutionError>;

/// Run-level execution errors
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ExecutionError {
    #[error("iteration override must be >= 1")]
    InvalidIterationOverride,

    #[error(
        "failed-trial rate {rate:.4} exceeded threshold {threshold} \
         ({failed} of {attempted} trials)"
    )]
    FailureThresholdExceeded {
        rate: f64,
        threshold: f64,
        failed: u64,
        attempted: u64,
    },
}
