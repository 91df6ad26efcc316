//! Correlation errors

use thiserror::Error;

/// Correlation result type
pub type Result<T> = std::result::Result<T, CorrelationError>;

/// Errors raised while validating a correlation matrix or building its
/// transform
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CorrelationError {
    #[error("correlation matrix is not square: {rows} rows, row {row} has {cols} entries")]
    NotSquare { rows: usize, row: usize, cols: usize },

    #[error("correlation matrix diagonal must be 1.0: entry ({index}, {index}) is {value}")]
    BadDiagonal { index: usize, value: f64 },

    #[error("correlation matrix is not symmetric at ({row}, {col}): {a} vs {b}")]
    NotSymmetric { row: usize, col: usize, a: f64, b: f64 },

    #[error("correlation ({row}, {col}) = {value} is outside [-1, 1]")]
    OutOfRange { row: usize, col: usize, value: f64 },

    #[error("correlation entry ({row}, {col}) is not finite")]
    NotFinite { row: usize, col: usize },

    #[error(
        "correlation matrix is not positive semi-definite \
         (min eigenvalue {min_eigenvalue:.6e}) and strict mode is set"
    )]
    NotPositiveSemiDefinite { min_eigenvalue: f64 },
}
