//! Simulation runtime
//!
//! Executes scenario trials and reduces the resulting ensemble into
//! statistical summaries. Trials are embarrassingly parallel: the only
//! shared state is the immutable scenario (samplers, correlation factor,
//! compiled expressions), each chunk of trials owns an independent RNG
//! substream, and partial ensembles are merged in trial-index order.

pub mod analyzer;
pub mod ensemble;
pub mod error;
pub mod executor;
pub mod types;

pub use analyzer::{
    analyze, OutputState, OutputStats, OutputSummary, RiskScore, SampleMoments,
    SensitivityEntry, SimulationReport, VariableSummary,
};
pub use ensemble::{Ensemble, Trial, TrialError};
pub use error::{ExecutionError, Result};
pub use executor::{run, RunResult};
pub use types::{CancelToken, RunMetadata, RunOptions, RunStatus};
