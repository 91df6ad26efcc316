//! Trial executor
//!
//! Partitions a run into fixed-size chunks. Each chunk owns an
//! independent RNG substream keyed by chunk index (master seed +
//! `set_stream`), so a fixed seed yields bit-identical per-trial results
//! whether chunks execute sequentially or across the rayon pool, at any
//! worker count. Trial indices are assigned at dispatch and the merged
//! ensemble is reassembled in chunk order.
//!
//! The hot loop per trial: draw latent standard normals, apply the cached
//! correlation factor, push each correlated normal through its marginal
//! quantile, evaluate the compiled outputs. No I/O, no shared mutable
//! state.

use std::time::Instant;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, StandardNormal};
use rayon::prelude::*;
use tracing::{debug, info, instrument, warn};

use galton_model::Scenario;

use crate::ensemble::{Ensemble, Trial, TrialError};
use crate::error::{ExecutionError, Result};
use crate::types::{RunMetadata, RunOptions, RunStatus};

/// A finished run: the raw ensemble plus its metadata
#[derive(Debug, Clone)]
pub struct RunResult {
    pub ensemble: Ensemble,
    pub metadata: RunMetadata,
}

struct ChunkOutcome {
    trials: Vec<Trial>,
    failures: Vec<TrialError>,
}

/// Execute `scenario` for its configured (or overridden) iteration count.
///
/// A failed trial never aborts the run; it is recorded and surfaced in
/// the metadata, escalating only past the configured failure-rate
/// threshold. Cancellation is honored between chunks and returns the
/// completed prefix flagged [`RunStatus::Cancelled`].
#[instrument(skip_all, fields(scenario = %scenario.name()))]
pub fn run(scenario: &Scenario, options: &RunOptions) -> Result<RunResult> {
    let started = Instant::now();

    let iterations = options.iterations.unwrap_or_else(|| scenario.iterations());
    if iterations == 0 {
        return Err(ExecutionError::InvalidIterationOverride);
    }
    let seed = scenario.seed().unwrap_or_else(rand::random);
    let chunk_size = scenario.config().chunk_size.max(1);
    let chunk_count = iterations.div_ceil(chunk_size);

    info!(
        iterations,
        chunk_count,
        chunk_size,
        seed,
        parallel = options.parallel,
        "run started"
    );

    let bounds = |chunk: u64| {
        let start = chunk * chunk_size;
        (start, chunk_size.min(iterations - start))
    };

    let mut cancelled = false;
    let outcomes: Vec<ChunkOutcome> = if options.parallel {
        let partial: Vec<Option<ChunkOutcome>> = (0..chunk_count)
            .into_par_iter()
            .map(|chunk| {
                if options.cancel.is_cancelled() {
                    return None;
                }
                let (start, len) = bounds(chunk);
                Some(run_chunk(scenario, seed, chunk, start, len))
            })
            .collect();
        cancelled = partial.iter().any(|outcome| outcome.is_none());
        partial.into_iter().flatten().collect()
    } else {
        let mut acc = Vec::with_capacity(chunk_count as usize);
        for chunk in 0..chunk_count {
            let (start, len) = bounds(chunk);
            acc.push(run_chunk(scenario, seed, chunk, start, len));
            // Boundary check: trials never stop mid-chunk.
            if options.cancel.is_cancelled() && chunk + 1 < chunk_count {
                cancelled = true;
                break;
            }
        }
        acc
    };

    let mut ensemble = Ensemble::new(
        scenario.variables().iter().map(|v| v.name.clone()).collect(),
        scenario.outputs().iter().map(|o| o.name.clone()).collect(),
    );
    for outcome in outcomes {
        ensemble.absorb(outcome.trials, outcome.failures);
    }

    let attempted = ensemble.attempted();
    let failed = ensemble.failures().len() as u64;

    if let Some(threshold) = scenario.config().max_failure_rate {
        let rate = if attempted > 0 {
            failed as f64 / attempted as f64
        } else {
            0.0
        };
        if rate > threshold {
            return Err(ExecutionError::FailureThresholdExceeded {
                rate,
                threshold,
                failed,
                attempted,
            });
        }
    }

    let status = if cancelled {
        warn!(attempted, requested = iterations, "run cancelled");
        RunStatus::Cancelled
    } else {
        RunStatus::Complete
    };

    let metadata = RunMetadata {
        scenario: scenario.name().to_string(),
        seed,
        iterations_requested: iterations,
        iterations_completed: attempted,
        failed_trials: failed,
        chunk_size,
        parallel: options.parallel,
        correlation_corrected: scenario.transform().corrected(),
        duration: started.elapsed(),
        status,
    };

    debug!(
        attempted,
        failed,
        elapsed_ms = metadata.duration.as_millis() as u64,
        "run finished"
    );

    Ok(RunResult { ensemble, metadata })
}

/// Run one chunk of trials on its own RNG substream.
fn run_chunk(scenario: &Scenario, seed: u64, chunk: u64, start: u64, len: u64) -> ChunkOutcome {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    rng.set_stream(chunk);

    let variables = scenario.variables();
    let output_count = scenario.outputs().len();
    let mut latent = vec![0.0; variables.len()];
    let mut correlated = vec![0.0; variables.len()];

    let mut outcome = ChunkOutcome {
        trials: Vec::with_capacity(len as usize),
        failures: Vec::new(),
    };

    for offset in 0..len {
        let index = start + offset;

        for z in latent.iter_mut() {
            *z = StandardNormal.sample(&mut rng);
        }
        scenario.transform().correlate(&latent, &mut correlated);

        let mut values = Vec::with_capacity(variables.len());
        let mut bad: Option<&str> = None;
        for (slot, variable) in variables.iter().enumerate() {
            let x = variable.sampler.quantile_from_normal(correlated[slot]);
            if !x.is_finite() && bad.is_none() {
                bad = Some(&variable.name);
            }
            values.push(x);
        }
        if let Some(name) = bad {
            outcome.failures.push(TrialError {
                index,
                message: format!("variable `{name}` sampled a non-finite value"),
            });
            continue;
        }

        let mut outputs = vec![0.0; output_count];
        scenario.evaluate_outputs_into(&values, &mut outputs);
        outcome.trials.push(Trial {
            index,
            variables: values,
            outputs,
        });
    }

    outcome
}
