//! Scenario model
//!
//! A scenario is a declarative bundle: random variables bound to marginal
//! distributions, a correlation structure over them, and arithmetic
//! output expressions. Definitions ([`ScenarioDef`]) are plain serde data;
//! [`Scenario::build`] validates every invariant up front and produces the
//! immutable, runnable form: fail fast, before any simulation work.
//!
//! Variables never depend on each other's realized values; dependency is
//! expressed solely through the correlation matrix.

pub mod config;
pub mod def;
pub mod error;
pub mod fingerprint;
pub mod scenario;
pub mod templates;

pub use config::SimConfig;
pub use def::{
    CorrelationDef, OutputDef, RiskDirection, RiskPolicy, ScenarioDef, VariableDef,
};
pub use error::{ConfigError, ValidationErrors};
pub use fingerprint::fingerprint;
pub use scenario::{Output, Scenario, Variable};
pub use templates::{template, template_catalog, TemplateInfo};

pub use galton_correlation::{CopulaFamily, PsdPolicy};
pub use galton_distributions::{Bounds, DistributionSpec, Marginal};
