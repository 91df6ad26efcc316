//! Parametric marginal distributions
//!
//! Every random variable in a scenario is bound to one of eight marginal
//! kinds. A [`DistributionSpec`] is an immutable value object: validated
//! once at construction, then reused across every trial of a run.
//!
//! Sampling goes through the quantile (inverse-CDF) path so that the same
//! primitive serves independent draws and copula-transformed draws.

pub mod catalog;
pub mod error;
pub mod marginal;

pub use catalog::{catalog, DistributionInfo, ParamInfo};
pub use error::{DistributionError, Result};
pub use marginal::{Bounds, DistributionSpec, Marginal, Moments, Sampler};
