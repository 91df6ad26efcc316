//! Scenario definitions
//!
//! The serde-facing data model. Definitions are what callers author (or
//! templates embed); nothing here is validated until
//! [`Scenario::build`](crate::Scenario::build).

use serde::{Deserialize, Serialize};

use galton_correlation::{CopulaFamily, PsdPolicy};
use galton_distributions::DistributionSpec;

/// A named random variable bound to a marginal distribution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableDef {
    pub name: String,
    pub distribution: DistributionSpec,
}

/// One pairwise correlation target. Pairs are unordered; unlisted pairs
/// are independent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationDef {
    pub a: String,
    pub b: String,
    pub rho: f64,
}

/// Which side of the threshold counts as a violation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskDirection {
    /// Outcomes below the threshold are undesirable (shortfall)
    #[default]
    Below,
    /// Outcomes above the threshold are undesirable (excess)
    Above,
}

/// Risk-scoring policy for one output
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskPolicy {
    pub threshold: f64,
    #[serde(default)]
    pub direction: RiskDirection,
}

/// A derived output: a name, an arithmetic expression over variable
/// names, and an optional risk policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputDef {
    pub name: String,
    pub expression: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk: Option<RiskPolicy>,
}

/// A complete scenario definition.
///
/// `iterations`, `confidence_level`, and `psd_policy` are optional
/// overrides of the [`SimConfig`](crate::SimConfig) defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioDef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub variables: Vec<VariableDef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub correlations: Vec<CorrelationDef>,
    pub outputs: Vec<OutputDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iterations: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence_level: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub psd_policy: Option<PsdPolicy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub copula: Option<CopulaFamily>,
}
