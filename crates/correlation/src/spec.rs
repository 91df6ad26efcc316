//! Correlation specification and validation

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

use crate::error::{CorrelationError, Result};

/// Symmetry / range tolerance for matrix entries
const ENTRY_TOL: f64 = 1e-9;

/// Copula family governing how correlation is imposed on the marginals.
///
/// Only the Gaussian copula is implemented; the enum exists so scenario
/// definitions carry the choice explicitly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CopulaFamily {
    #[default]
    Gaussian,
}

/// Policy for correlation matrices that fail the PSD check.
///
/// `Lenient` corrects to the nearest PSD matrix (eigenvalue clipping) and
/// reports that it did so; `Strict` rejects the configuration outright.
/// Never silent either way.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PsdPolicy {
    #[default]
    Lenient,
    Strict,
}

/// A validated-on-construction target correlation matrix.
///
/// Symmetric, unit diagonal, off-diagonal entries in [-1, 1]. Positive
/// semi-definiteness is checked when the transform is built, where the
/// [`PsdPolicy`] decides between correction and rejection.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationSpec {
    matrix: DMatrix<f64>,
    copula: CopulaFamily,
}

impl CorrelationSpec {
    /// Build from dense rows, validating shape and entries.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self> {
        let n = rows.len();
        for (i, row) in rows.iter().enumerate() {
            if row.len() != n {
                return Err(CorrelationError::NotSquare {
                    rows: n,
                    row: i,
                    cols: row.len(),
                });
            }
        }
        let flat: Vec<f64> = rows.into_iter().flatten().collect();
        let spec = Self {
            matrix: DMatrix::from_row_slice(n, n, &flat),
            copula: CopulaFamily::default(),
        };
        spec.validate()?;
        Ok(spec)
    }

    /// The identity structure over `dim` variables (independence).
    pub fn identity(dim: usize) -> Self {
        Self {
            matrix: DMatrix::identity(dim, dim),
            copula: CopulaFamily::default(),
        }
    }

    pub fn with_copula(mut self, copula: CopulaFamily) -> Self {
        self.copula = copula;
        self
    }

    pub fn copula(&self) -> CopulaFamily {
        self.copula
    }

    pub fn dim(&self) -> usize {
        self.matrix.nrows()
    }

    pub(crate) fn matrix(&self) -> &DMatrix<f64> {
        &self.matrix
    }

    /// True when every off-diagonal entry is zero, i.e. the transform can
    /// skip the matrix multiply entirely.
    pub fn is_identity(&self) -> bool {
        let n = self.dim();
        for i in 0..n {
            for j in 0..n {
                if i != j && self.matrix[(i, j)] != 0.0 {
                    return false;
                }
            }
        }
        true
    }

    /// Check shape-independent invariants: unit diagonal, symmetry, range.
    pub fn validate(&self) -> Result<()> {
        let n = self.dim();
        for i in 0..n {
            for j in 0..n {
                let value = self.matrix[(i, j)];
                if !value.is_finite() {
                    return Err(CorrelationError::NotFinite { row: i, col: j });
                }
            }
        }
        for i in 0..n {
            let diag = self.matrix[(i, i)];
            if (diag - 1.0).abs() > ENTRY_TOL {
                return Err(CorrelationError::BadDiagonal {
                    index: i,
                    value: diag,
                });
            }
        }
        for i in 0..n {
            for j in (i + 1)..n {
                let a = self.matrix[(i, j)];
                let b = self.matrix[(j, i)];
                if (a - b).abs() > ENTRY_TOL {
                    return Err(CorrelationError::NotSymmetric {
                        row: i,
                        col: j,
                        a,
                        b,
                    });
                }
                if a.abs() > 1.0 + ENTRY_TOL {
                    return Err(CorrelationError::OutOfRange {
                        row: i,
                        col: j,
                        value: a,
                    });
                }
            }
        }
        Ok(())
    }
}
