//! Validated scenarios
//!
//! [`Scenario::build`] is the single path from definition data to a
//! runnable scenario; templates and user definitions go through it
//! identically. It collects every validation failure instead of stopping
//! at the first, then constructs the immutable plan: samplers, the cached
//! correlation transform, and slot-compiled output expressions.

use indexmap::IndexMap;
use tracing::{debug, info};

use galton_correlation::{CorrelationSpec, CorrelationTransform, PsdPolicy};
use galton_distributions::{DistributionSpec, Moments, Sampler};
use galton_dsl::CompiledExpr;

use crate::config::SimConfig;
use crate::def::{RiskPolicy, ScenarioDef};
use crate::error::{ConfigError, ValidationErrors};
use crate::fingerprint;

/// A variable with its runnable sampler and closed-form moments
#[derive(Debug, Clone)]
pub struct Variable {
    pub name: String,
    pub spec: DistributionSpec,
    pub sampler: Sampler,
    pub moments: Moments,
}

/// An output with its slot-compiled expression
#[derive(Debug, Clone)]
pub struct Output {
    pub name: String,
    pub expression: String,
    pub compiled: CompiledExpr,
    pub risk: Option<RiskPolicy>,
}

/// The immutable, validated form of a scenario.
///
/// Built once, then shared read-only across every trial and worker of a
/// run. Each execution with the same seed is independent and
/// reproducible.
#[derive(Debug, Clone)]
pub struct Scenario {
    def: ScenarioDef,
    variables: Vec<Variable>,
    outputs: Vec<Output>,
    transform: CorrelationTransform,
    iterations: u64,
    confidence_level: f64,
    config: SimConfig,
}

impl Scenario {
    /// Validate `def` against every invariant and construct the runnable
    /// scenario. On failure, returns the full list of problems found,
    /// before any simulation cost is incurred.
    pub fn build(def: ScenarioDef, config: &SimConfig) -> Result<Self, ValidationErrors> {
        let mut errors = Vec::new();

        // Variables: unique names, valid distribution parameters.
        let mut slots: IndexMap<&str, usize> = IndexMap::new();
        let mut variables = Vec::with_capacity(def.variables.len());
        if def.variables.is_empty() {
            errors.push(ConfigError::NoVariables);
        }
        for var in &def.variables {
            if slots.contains_key(var.name.as_str()) {
                errors.push(ConfigError::DuplicateVariable {
                    name: var.name.clone(),
                });
                continue;
            }
            slots.insert(var.name.as_str(), slots.len());
            match (var.distribution.sampler(), var.distribution.moments()) {
                (Ok(sampler), Ok(moments)) => variables.push(Variable {
                    name: var.name.clone(),
                    spec: var.distribution.clone(),
                    sampler,
                    moments,
                }),
                (Err(source), _) | (_, Err(source)) => {
                    errors.push(ConfigError::Distribution {
                        variable: var.name.clone(),
                        source,
                    });
                }
            }
        }

        // Outputs: unique names disjoint from variables, parseable and
        // resolvable expressions.
        let mut outputs: Vec<Output> = Vec::with_capacity(def.outputs.len());
        if def.outputs.is_empty() {
            errors.push(ConfigError::NoOutputs);
        }
        for output in &def.outputs {
            if outputs.iter().any(|o| o.name == output.name) {
                errors.push(ConfigError::DuplicateOutput {
                    name: output.name.clone(),
                });
                continue;
            }
            if slots.contains_key(output.name.as_str()) {
                errors.push(ConfigError::OutputShadowsVariable {
                    name: output.name.clone(),
                });
                continue;
            }
            if let Some(risk) = &output.risk {
                if !risk.threshold.is_finite() {
                    errors.push(ConfigError::InvalidRiskThreshold {
                        output: output.name.clone(),
                    });
                }
            }
            let (parsed, parse_errors) = galton_dsl::parse(&output.expression);
            if !parse_errors.is_empty() {
                let message = parse_errors
                    .iter()
                    .map(|e| e.to_string())
                    .collect::<Vec<_>>()
                    .join("; ");
                errors.push(ConfigError::ExpressionParse {
                    output: output.name.clone(),
                    message,
                });
                continue;
            }
            let Some(expr) = parsed else {
                errors.push(ConfigError::ExpressionParse {
                    output: output.name.clone(),
                    message: "empty expression".to_string(),
                });
                continue;
            };
            match expr.compile(&|name| slots.get(name).copied()) {
                Ok(compiled) => outputs.push(Output {
                    name: output.name.clone(),
                    expression: output.expression.clone(),
                    compiled,
                    risk: output.risk,
                }),
                Err(source) => errors.push(ConfigError::ExpressionVariable {
                    output: output.name.clone(),
                    source,
                }),
            }
        }

        // Correlations: known variables, no self/duplicate pairs, entries
        // in range; then assemble the dense matrix and decompose it.
        let psd_policy = def.psd_policy.unwrap_or(config.psd_policy);
        let transform = build_transform(&def, &slots, psd_policy, &mut errors);

        // Run settings.
        let iterations = def.iterations.unwrap_or(config.default_iterations);
        if iterations == 0 {
            errors.push(ConfigError::InvalidIterations);
        }
        let confidence_level = def
            .confidence_level
            .unwrap_or(config.default_confidence_level);
        if !(confidence_level > 0.0 && confidence_level < 1.0) {
            errors.push(ConfigError::InvalidConfidenceLevel {
                value: confidence_level,
            });
        }

        if !errors.is_empty() {
            return Err(ValidationErrors {
                scenario: def.name.clone(),
                errors,
            });
        }

        info!(
            scenario = %def.name,
            variables = variables.len(),
            outputs = outputs.len(),
            corrected = transform.corrected(),
            "scenario built"
        );

        Ok(Self {
            def,
            variables,
            outputs,
            transform,
            iterations,
            confidence_level,
            config: config.clone(),
        })
    }

    pub fn name(&self) -> &str {
        &self.def.name
    }

    /// The definition this scenario was built from
    pub fn def(&self) -> &ScenarioDef {
        &self.def
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn outputs(&self) -> &[Output] {
        &self.outputs
    }

    /// The cached correlation transform, shared read-only by all workers
    pub fn transform(&self) -> &CorrelationTransform {
        &self.transform
    }

    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    pub fn seed(&self) -> Option<u64> {
        self.def.seed
    }

    pub fn confidence_level(&self) -> f64 {
        self.confidence_level
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Evaluate every output expression against one trial's variable
    /// slots, writing into `out` (length must equal `outputs().len()`).
    pub fn evaluate_outputs_into(&self, variable_values: &[f64], out: &mut [f64]) {
        debug_assert_eq!(out.len(), self.outputs.len());
        for (slot, output) in self.outputs.iter().enumerate() {
            out[slot] = output.compiled.eval(variable_values);
        }
    }

    /// Stable configuration fingerprint (canonical-JSON SHA-256), for
    /// external result caches keyed by scenario content.
    pub fn fingerprint(&self) -> String {
        fingerprint::fingerprint(&self.def)
    }
}

fn build_transform(
    def: &ScenarioDef,
    slots: &IndexMap<&str, usize>,
    psd_policy: PsdPolicy,
    errors: &mut Vec<ConfigError>,
) -> CorrelationTransform {
    let n = slots.len();
    if def.correlations.is_empty() {
        debug!(variables = n, "no correlations, independent sampling");
        return CorrelationTransform::independent(n);
    }

    let mut rows = vec![vec![0.0; n]; n];
    for (i, row) in rows.iter_mut().enumerate() {
        row[i] = 1.0;
    }
    let mut seen: Vec<(usize, usize)> = Vec::new();
    let mut entries_ok = true;
    for entry in &def.correlations {
        let a = slots.get(entry.a.as_str()).copied();
        let b = slots.get(entry.b.as_str()).copied();
        let (Some(a), Some(b)) = (a, b) else {
            let missing = if a.is_none() { &entry.a } else { &entry.b };
            errors.push(ConfigError::UnknownCorrelationVariable {
                name: missing.clone(),
            });
            entries_ok = false;
            continue;
        };
        if a == b {
            errors.push(ConfigError::SelfCorrelation {
                name: entry.a.clone(),
            });
            entries_ok = false;
            continue;
        }
        let pair = (a.min(b), a.max(b));
        if seen.contains(&pair) {
            errors.push(ConfigError::DuplicateCorrelation {
                a: entry.a.clone(),
                b: entry.b.clone(),
            });
            entries_ok = false;
            continue;
        }
        seen.push(pair);
        if !entry.rho.is_finite() || entry.rho.abs() > 1.0 {
            errors.push(ConfigError::CorrelationOutOfRange {
                a: entry.a.clone(),
                b: entry.b.clone(),
                rho: entry.rho,
            });
            entries_ok = false;
            continue;
        }
        rows[a][b] = entry.rho;
        rows[b][a] = entry.rho;
    }

    if !entries_ok {
        // Entry-level errors already recorded; skip decomposition.
        return CorrelationTransform::independent(n);
    }

    let spec = match CorrelationSpec::from_rows(rows) {
        Ok(spec) => spec.with_copula(def.copula.unwrap_or_default()),
        Err(source) => {
            errors.push(ConfigError::Correlation(source));
            return CorrelationTransform::independent(n);
        }
    };
    match CorrelationTransform::build(&spec, psd_policy) {
        Ok(transform) => transform,
        Err(source) => {
            errors.push(ConfigError::Correlation(source));
            CorrelationTransform::independent(n)
        }
    }
}
