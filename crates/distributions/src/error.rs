//! Distribution errors

use thiserror::Error;

/// Distribution result type
pub type Result<T> = std::result::Result<T, DistributionError>;

/// Errors raised while validating or building a marginal distribution
#[derive(Debug, Clone, Error, PartialEq)]
pub enum DistributionError {
    #[error("{kind}: invalid parameter `{field}`: {message}")]
    InvalidParameter {
        kind: &'static str,
        field: &'static str,
        message: String,
    },

    #[error("bounds: lower {lower} must be strictly below upper {upper}")]
    InvalidBounds { lower: f64, upper: f64 },
}

impl DistributionError {
    pub(crate) fn param(kind: &'static str, field: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            kind,
            field,
            message: message.into(),
        }
    }
}
