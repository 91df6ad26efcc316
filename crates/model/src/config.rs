//! Engine configuration
//!
//! Defaults are passed explicitly into every build; there is no
//! process-wide state, so concurrent runs with different settings cannot
//! observe each other.

use galton_correlation::PsdPolicy;

/// Explicit defaults and execution knobs for scenario builds.
///
/// A [`ScenarioDef`](crate::ScenarioDef) may override iterations,
/// confidence level, and PSD policy per scenario; everything else comes
/// from here.
#[derive(Debug, Clone, PartialEq)]
pub struct SimConfig {
    /// Iterations used when a definition does not specify its own
    pub default_iterations: u64,
    /// Confidence level used when a definition does not specify its own
    pub default_confidence_level: f64,
    /// Percentiles reported per output, in percent
    pub percentiles: Vec<f64>,
    /// Trials per executor chunk; chunk boundaries are also the
    /// cancellation check points and the RNG substream grain
    pub chunk_size: u64,
    /// Abort a run whose failed-trial fraction exceeds this; `None`
    /// means failures are only ever reported, never fatal
    pub max_failure_rate: Option<f64>,
    /// Policy for non-PSD correlation matrices
    pub psd_policy: PsdPolicy,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            default_iterations: 10_000,
            default_confidence_level: 0.95,
            percentiles: vec![5.0, 25.0, 50.0, 75.0, 95.0],
            chunk_size: 1024,
            max_failure_rate: None,
            psd_policy: PsdPolicy::default(),
        }
    }
}
