//! Result analyzer
//!
//! Pure reduction over a raw ensemble: no RNG, no hidden state, the same
//! ensemble always produces the same report.
//!
//! Pinned numeric contracts (stable for downstream callers):
//! - Percentiles use linear interpolation between order statistics,
//!   `h = p/100 · (n − 1)`.
//! - The confidence interval for each output mean is the normal
//!   approximation `mean ± z·s/√n` with `z = Φ⁻¹((1 + level)/2)`.
//! - The risk score is `p · (0.5 + 0.5·min(1, m/s))`, where `p` is the
//!   fraction of valid trials violating the threshold, `m` the mean
//!   violation magnitude, and `s` the output sample std (the severity
//!   term is 0 when `s = 0`).
//! - Sensitivity is Spearman rank correlation with average-rank ties.

use std::cmp::Ordering;

use indexmap::IndexMap;
use statrs::distribution::{ContinuousCDF, Normal};
use tracing::{debug, instrument};

use galton_model::{RiskDirection, RiskPolicy, Scenario};

use crate::executor::RunResult;
use crate::types::{RunMetadata, RunStatus};

/// Why an output's statistics may be missing or need care
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputState {
    Ok,
    /// No valid trials at all; `stats` is `None`
    NoData,
    /// Valid trials exist but the ensemble has zero variance; the
    /// confidence interval collapses to a point
    ZeroVariance,
}

/// Composite risk figure for one output under its policy
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskScore {
    pub threshold: f64,
    pub direction: RiskDirection,
    /// Fraction of valid trials violating the threshold
    pub probability: f64,
    /// Mean |value − threshold| over violating trials
    pub mean_magnitude: f64,
    /// `probability · (0.5 + 0.5·min(1, mean_magnitude/std))`, in [0, 1]
    pub score: f64,
}

/// Numeric summary of one output's valid trials
#[derive(Debug, Clone, PartialEq)]
pub struct OutputStats {
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
    /// `(percent, value)` pairs in the configured percentile set
    pub percentiles: Vec<(f64, f64)>,
    pub confidence_interval: (f64, f64),
    pub risk: Option<RiskScore>,
}

/// Per-output summary; consult `state` before reading `stats`
#[derive(Debug, Clone, PartialEq)]
pub struct OutputSummary {
    pub state: OutputState,
    pub valid_trials: u64,
    /// Trials whose expression hit the NaN sentinel (division by zero
    /// and kin) while the trial itself was valid
    pub degenerate_trials: u64,
    pub confidence_level: f64,
    pub stats: Option<OutputStats>,
}

/// Realized sample moments of one variable
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleMoments {
    pub mean: f64,
    pub std: f64,
}

/// Sanity summary for one input variable: what the spec promised vs what
/// sampling realized
#[derive(Debug, Clone, PartialEq)]
pub struct VariableSummary {
    pub spec_mean: f64,
    pub spec_std: f64,
    pub sample: Option<SampleMoments>,
}

/// One input's influence on one output
#[derive(Debug, Clone, PartialEq)]
pub struct SensitivityEntry {
    pub variable: String,
    pub rank_correlation: f64,
}

/// The immutable analyzed report of one run
#[derive(Debug, Clone)]
pub struct SimulationReport {
    pub scenario: String,
    pub status: RunStatus,
    pub outputs: IndexMap<String, OutputSummary>,
    pub variables: IndexMap<String, VariableSummary>,
    /// Per output: variables ranked by |rank correlation|, descending
    pub sensitivity: IndexMap<String, Vec<SensitivityEntry>>,
    pub metadata: RunMetadata,
}

impl SimulationReport {
    /// True when the run produced no analyzable data at all (every
    /// output is in the `NoData` state).
    pub fn is_degenerate(&self) -> bool {
        self.outputs
            .values()
            .all(|summary| summary.state == OutputState::NoData)
    }
}

/// Reduce a raw ensemble into its summary report.
#[instrument(skip_all, fields(scenario = %scenario.name()))]
pub fn analyze(result: &RunResult, scenario: &Scenario) -> SimulationReport {
    let ensemble = &result.ensemble;
    let level = scenario.confidence_level();
    let z = Normal::new(0.0, 1.0)
        .expect("unit normal")
        .inverse_cdf((1.0 + level) / 2.0);

    let mut outputs = IndexMap::new();
    let mut sensitivity = IndexMap::new();
    for (slot, output) in scenario.outputs().iter().enumerate() {
        let column = ensemble.output_column(slot);
        let valid: Vec<f64> = column.iter().copied().filter(|v| v.is_finite()).collect();
        let degenerate = (column.len() - valid.len()) as u64;

        let summary = summarize_output(
            &valid,
            degenerate,
            level,
            z,
            output.risk.as_ref(),
            &scenario.config().percentiles,
        );
        debug!(
            output = %output.name,
            state = ?summary.state,
            valid = summary.valid_trials,
            degenerate,
            "output analyzed"
        );
        outputs.insert(output.name.clone(), summary);

        sensitivity.insert(output.name.clone(), rank_drivers(ensemble, scenario, &column));
    }

    let mut variables = IndexMap::new();
    for (slot, variable) in scenario.variables().iter().enumerate() {
        let column = ensemble.variable_column(slot);
        let sample = if column.is_empty() {
            None
        } else {
            let (mean, std) = mean_std(&column);
            Some(SampleMoments { mean, std })
        };
        variables.insert(
            variable.name.clone(),
            VariableSummary {
                spec_mean: variable.moments.mean,
                spec_std: variable.moments.variance.sqrt(),
                sample,
            },
        );
    }

    SimulationReport {
        scenario: scenario.name().to_string(),
        status: result.metadata.status,
        outputs,
        variables,
        sensitivity,
        metadata: result.metadata.clone(),
    }
}

fn summarize_output(
    valid: &[f64],
    degenerate_trials: u64,
    confidence_level: f64,
    z: f64,
    risk_policy: Option<&RiskPolicy>,
    percentile_set: &[f64],
) -> OutputSummary {
    if valid.is_empty() {
        return OutputSummary {
            state: OutputState::NoData,
            valid_trials: 0,
            degenerate_trials,
            confidence_level,
            stats: None,
        };
    }

    let n = valid.len() as f64;
    let (mean, std) = mean_std(valid);

    let mut sorted = valid.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    let percentiles = percentile_set
        .iter()
        .map(|&p| (p, percentile(&sorted, p)))
        .collect();

    let half_width = z * std / n.sqrt();
    let confidence_interval = (mean - half_width, mean + half_width);

    let risk = risk_policy.map(|policy| risk_score(valid, std, policy));

    OutputSummary {
        state: if std == 0.0 {
            OutputState::ZeroVariance
        } else {
            OutputState::Ok
        },
        valid_trials: valid.len() as u64,
        degenerate_trials,
        confidence_level,
        stats: Some(OutputStats {
            mean,
            std,
            min: sorted[0],
            max: sorted[sorted.len() - 1],
            percentiles,
            confidence_interval,
            risk,
        }),
    }
}

fn risk_score(values: &[f64], std: f64, policy: &RiskPolicy) -> RiskScore {
    let violations: Vec<f64> = values
        .iter()
        .copied()
        .filter(|&v| match policy.direction {
            RiskDirection::Below => v < policy.threshold,
            RiskDirection::Above => v > policy.threshold,
        })
        .collect();

    let probability = violations.len() as f64 / values.len() as f64;
    let mean_magnitude = if violations.is_empty() {
        0.0
    } else {
        violations
            .iter()
            .map(|v| (v - policy.threshold).abs())
            .sum::<f64>()
            / violations.len() as f64
    };
    let severity = if std > 0.0 {
        (mean_magnitude / std).min(1.0)
    } else {
        0.0
    };

    RiskScore {
        threshold: policy.threshold,
        direction: policy.direction,
        probability,
        mean_magnitude,
        score: probability * (0.5 + 0.5 * severity),
    }
}

/// Spearman-rank each variable against one output over the trials where
/// that output is valid, sorted by descending influence.
fn rank_drivers(
    ensemble: &crate::ensemble::Ensemble,
    scenario: &Scenario,
    output_column: &[f64],
) -> Vec<SensitivityEntry> {
    let mask: Vec<bool> = output_column.iter().map(|v| v.is_finite()).collect();
    let ys: Vec<f64> = output_column
        .iter()
        .zip(&mask)
        .filter(|(_, keep)| **keep)
        .map(|(v, _)| *v)
        .collect();

    let mut entries: Vec<SensitivityEntry> = scenario
        .variables()
        .iter()
        .enumerate()
        .map(|(slot, variable)| {
            let xs: Vec<f64> = ensemble
                .variable_column(slot)
                .into_iter()
                .zip(&mask)
                .filter(|(_, keep)| **keep)
                .map(|(v, _)| v)
                .collect();
            SensitivityEntry {
                variable: variable.name.clone(),
                rank_correlation: spearman(&xs, &ys),
            }
        })
        .collect();

    entries.sort_by(|a, b| {
        b.rank_correlation
            .abs()
            .partial_cmp(&a.rank_correlation.abs())
            .unwrap_or(Ordering::Equal)
    });
    entries
}

/// Linear interpolation between order statistics: `h = p/100 · (n − 1)`.
fn percentile(sorted: &[f64], p: f64) -> f64 {
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }
    let h = (p.clamp(0.0, 100.0) / 100.0) * (n - 1) as f64;
    let lo = h.floor() as usize;
    let hi = (lo + 1).min(n - 1);
    let frac = h - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

/// Sample mean and (n−1) standard deviation; std is 0 for n = 1.
fn mean_std(values: &[f64]) -> (f64, f64) {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    if values.len() < 2 {
        return (mean, 0.0);
    }
    let var = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / (n - 1.0);
    (mean, var.sqrt())
}

/// Spearman rank correlation with average-rank ties; 0 when either side
/// has zero rank variance.
fn spearman(xs: &[f64], ys: &[f64]) -> f64 {
    if xs.len() < 2 {
        return 0.0;
    }
    pearson(&ranks(xs), &ranks(ys))
}

fn ranks(values: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].partial_cmp(&values[b]).unwrap_or(Ordering::Equal));

    let mut ranks = vec![0.0; values.len()];
    let mut i = 0;
    while i < order.len() {
        let mut j = i;
        while j + 1 < order.len() && values[order[j + 1]] == values[order[i]] {
            j += 1;
        }
        // 1-based average rank across the tie run
        let rank = (i + j) as f64 / 2.0 + 1.0;
        for &k in &order[i..=j] {
            ranks[k] = rank;
        }
        i = j + 1;
    }
    ranks
}

fn pearson(xs: &[f64], ys: &[f64]) -> f64 {
    let n = xs.len() as f64;
    let mx = xs.iter().sum::<f64>() / n;
    let my = ys.iter().sum::<f64>() / n;
    let mut cov = 0.0;
    let mut vx = 0.0;
    let mut vy = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        cov += (x - mx) * (y - my);
        vx += (x - mx) * (x - mx);
        vy += (y - my) * (y - my);
    }
    if vx == 0.0 || vy == 0.0 {
        return 0.0;
    }
    cov / (vx.sqrt() * vy.sqrt())
}
