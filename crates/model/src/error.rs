//! Configuration errors
//!
//! Everything here is a construction-time failure: surfaced before any
//! trial runs, never silently defaulted.

use thiserror::Error;

use galton_correlation::CorrelationError;
use galton_distributions::DistributionError;
use galton_dsl::UnknownVariable;

/// A single validation failure, naming the offending piece of the
/// definition
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    #[error("variable `{variable}`: {source}")]
    Distribution {
        variable: String,
        source: DistributionError,
    },

    #[error("duplicate variable name `{name}`")]
    DuplicateVariable { name: String },

    #[error("scenario defines no variables")]
    NoVariables,

    #[error("scenario defines no outputs")]
    NoOutputs,

    #[error("duplicate output name `{name}`")]
    DuplicateOutput { name: String },

    #[error("output `{name}` shadows a variable of the same name")]
    OutputShadowsVariable { name: String },

    #[error("correlation references unknown variable `{name}`")]
    UnknownCorrelationVariable { name: String },

    #[error("variable `{name}` correlated with itself")]
    SelfCorrelation { name: String },

    #[error("correlation between `{a}` and `{b}` given more than once")]
    DuplicateCorrelation { a: String, b: String },

    #[error("correlation({a}, {b}) = {rho} is outside [-1, 1]")]
    CorrelationOutOfRange { a: String, b: String, rho: f64 },

    #[error("correlation matrix: {0}")]
    Correlation(#[from] CorrelationError),

    #[error("output `{output}`: parse error: {message}")]
    ExpressionParse { output: String, message: String },

    #[error("output `{output}`: {source}")]
    ExpressionVariable {
        output: String,
        source: UnknownVariable,
    },

    #[error("risk threshold for output `{output}` must be finite")]
    InvalidRiskThreshold { output: String },

    #[error("iteration count must be >= 1")]
    InvalidIterations,

    #[error("confidence level {value} must be strictly between 0 and 1")]
    InvalidConfidenceLevel { value: f64 },

    #[error("unknown scenario template `{name}`")]
    UnknownTemplate { name: String },

    #[error("template `{name}` is malformed: {message}")]
    MalformedTemplate { name: String, message: String },
}

/// The structured list a failed build returns: every problem found, not
/// just the first
#[derive(Debug, Clone, Error)]
#[error("scenario `{scenario}` failed validation with {} error(s)", .errors.len())]
pub struct ValidationErrors {
    pub scenario: String,
    pub errors: Vec<ConfigError>,
}
