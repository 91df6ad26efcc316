//! Ensemble storage
//!
//! The raw result of a run: one [`Trial`] per attempted iteration that
//! sampled cleanly, plus a record per failed trial. The full per-trial
//! matrix is retained in memory: sensitivity analysis needs the joint
//! sample, and at `f64 × (variables + outputs) × N` the footprint is
//! predictable. Memory-constrained callers lower the iteration count.

/// One realized trial: a value per variable and per output, in scenario
/// declaration order
#[derive(Debug, Clone, PartialEq)]
pub struct Trial {
    pub index: u64,
    pub variables: Vec<f64>,
    pub outputs: Vec<f64>,
}

/// A trial whose variable sampling failed unexpectedly.
///
/// Distinct from the NaN output sentinel: a division by zero in an
/// output expression is a *degenerate output* on an otherwise valid
/// trial, while a non-finite sampled variable invalidates the trial.
#[derive(Debug, Clone, PartialEq)]
pub struct TrialError {
    pub index: u64,
    pub message: String,
}

/// The merged raw ensemble of a run, in trial-index order
#[derive(Debug, Clone, Default)]
pub struct Ensemble {
    variable_names: Vec<String>,
    output_names: Vec<String>,
    trials: Vec<Trial>,
    failures: Vec<TrialError>,
}

impl Ensemble {
    pub fn new(variable_names: Vec<String>, output_names: Vec<String>) -> Self {
        Self {
            variable_names,
            output_names,
            trials: Vec::new(),
            failures: Vec::new(),
        }
    }

    /// Merge one chunk's partial results. Chunks must be absorbed in
    /// chunk order so the ensemble stays sorted by trial index.
    pub fn absorb(&mut self, trials: Vec<Trial>, failures: Vec<TrialError>) {
        self.trials.extend(trials);
        self.failures.extend(failures);
    }

    pub fn variable_names(&self) -> &[String] {
        &self.variable_names
    }

    pub fn output_names(&self) -> &[String] {
        &self.output_names
    }

    /// Successfully sampled trials, ascending by trial index
    pub fn trials(&self) -> &[Trial] {
        &self.trials
    }

    pub fn failures(&self) -> &[TrialError] {
        &self.failures
    }

    /// Trials attempted: successful plus failed
    pub fn attempted(&self) -> u64 {
        (self.trials.len() + self.failures.len()) as u64
    }

    pub fn is_empty(&self) -> bool {
        self.trials.is_empty()
    }

    /// One variable's realized values across all successful trials
    pub fn variable_column(&self, slot: usize) -> Vec<f64> {
        self.trials.iter().map(|t| t.variables[slot]).collect()
    }

    /// One output's realized values across all successful trials
    pub fn output_column(&self, slot: usize) -> Vec<f64> {
        self.trials.iter().map(|t| t.outputs[slot]).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absorb_keeps_order_and_counts() {
        let mut ensemble = Ensemble::new(vec!["x".into()], vec!["y".into()]);
        ensemble.absorb(
            vec![Trial {
                index: 0,
                variables: vec![1.0],
                outputs: vec![2.0],
            }],
            vec![],
        );
        ensemble.absorb(
            vec![Trial {
                index: 2,
                variables: vec![3.0],
                outputs: vec![6.0],
            }],
            vec![TrialError {
                index: 1,
                message: "bad".into(),
            }],
        );

        assert_eq!(ensemble.attempted(), 3);
        assert_eq!(ensemble.trials().len(), 2);
        assert_eq!(ensemble.variable_column(0), vec![1.0, 3.0]);
        assert_eq!(ensemble.output_column(0), vec![2.0, 6.0]);
    }
}
