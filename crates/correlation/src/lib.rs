//! Correlation engine
//!
//! Turns a target correlation matrix into a linear transform on latent
//! standard-normal draws (the Gaussian-copula approach). The transform is
//! built once per scenario, cached, and shared read-only across workers;
//! it is never mutated after construction.
//!
//! Correlation is deliberately imposed on latent normals rather than on
//! raw uniform draws: pushing each correlated normal through its own
//! marginal quantile preserves every marginal exactly while approximating
//! the target rank correlation.

pub mod error;
pub mod spec;
pub mod transform;

pub use error::{CorrelationError, Result};
pub use spec::{CopulaFamily, CorrelationSpec, PsdPolicy};
pub use transform::CorrelationTransform;
