//! Correlated-draw transform
//!
//! Decomposition happens once at build time; per-trial work is a single
//! lower-triangular (or dense, on the PSD boundary) matrix-vector product.

use nalgebra::{Cholesky, DMatrix, SymmetricEigen};
use tracing::{debug, warn};

use crate::error::{CorrelationError, Result};
use crate::spec::{CorrelationSpec, PsdPolicy};

/// Eigenvalues above this (negative) tolerance count as semi-definite
const PSD_TOL: f64 = 1e-9;

/// Floor applied when clipping eigenvalues during correction
const EIG_FLOOR: f64 = 1e-10;

#[derive(Debug, Clone)]
enum TransformKind {
    /// Identity structure: draws pass through untouched
    Independent { dim: usize },
    /// Factor `L` with `L·Lᵀ = R`
    Factor(DMatrix<f64>),
}

/// The cached, immutable result of decomposing a correlation spec.
///
/// Shared read-only across all workers of a run; never mutated after
/// construction.
#[derive(Debug, Clone)]
pub struct CorrelationTransform {
    kind: TransformKind,
    corrected: bool,
}

impl CorrelationTransform {
    /// Decompose `spec` under the given PSD policy.
    ///
    /// Non-PSD matrices are either rejected (`Strict`) or corrected to the
    /// nearest PSD matrix by eigenvalue clipping with the diagonal
    /// re-normalized to 1.0 (`Lenient`); a correction is recorded on the
    /// transform and logged, never applied silently.
    pub fn build(spec: &CorrelationSpec, policy: PsdPolicy) -> Result<Self> {
        spec.validate()?;

        if spec.is_identity() {
            debug!(dim = spec.dim(), "identity correlation, independent draws");
            return Ok(Self {
                kind: TransformKind::Independent { dim: spec.dim() },
                corrected: false,
            });
        }

        let eigen = SymmetricEigen::new(spec.matrix().clone());
        let min_eigenvalue = eigen
            .eigenvalues
            .iter()
            .copied()
            .fold(f64::INFINITY, f64::min);

        let (target, corrected) = if min_eigenvalue < -PSD_TOL {
            match policy {
                PsdPolicy::Strict => {
                    return Err(CorrelationError::NotPositiveSemiDefinite { min_eigenvalue });
                }
                PsdPolicy::Lenient => {
                    warn!(
                        min_eigenvalue,
                        "correlation matrix is not PSD, clipping eigenvalues"
                    );
                    (nearest_psd(&eigen), true)
                }
            }
        } else {
            (spec.matrix().clone(), false)
        };

        let factor = match Cholesky::new(target.clone()) {
            Some(chol) => chol.l(),
            // Semi-definite boundary (e.g. perfect correlation): fall back
            // to the eigen square root, which also satisfies L·Lᵀ = R.
            None => {
                let eigen = SymmetricEigen::new(target);
                let roots = eigen.eigenvalues.map(|l| l.max(0.0).sqrt());
                &eigen.eigenvectors * DMatrix::from_diagonal(&roots)
            }
        };

        Ok(Self {
            kind: TransformKind::Factor(factor),
            corrected,
        })
    }

    /// Transform for `dim` independent variables (no correlation spec).
    pub fn independent(dim: usize) -> Self {
        Self {
            kind: TransformKind::Independent { dim },
            corrected: false,
        }
    }

    pub fn dim(&self) -> usize {
        match &self.kind {
            TransformKind::Independent { dim } => *dim,
            TransformKind::Factor(l) => l.nrows(),
        }
    }

    /// Whether a nearest-PSD correction was applied at build time
    pub fn corrected(&self) -> bool {
        self.corrected
    }

    /// Map independent standard normals `z` to correlated standard
    /// normals in `out` (`out = L·z`). Slices must both have length
    /// [`dim`](Self::dim).
    pub fn correlate(&self, z: &[f64], out: &mut [f64]) {
        debug_assert_eq!(z.len(), self.dim());
        debug_assert_eq!(out.len(), self.dim());
        match &self.kind {
            TransformKind::Independent { .. } => out.copy_from_slice(z),
            TransformKind::Factor(l) => {
                let n = l.nrows();
                for i in 0..n {
                    let mut acc = 0.0;
                    for (j, zj) in z.iter().enumerate().take(n) {
                        acc += l[(i, j)] * zj;
                    }
                    out[i] = acc;
                }
            }
        }
    }
}

/// Clip eigenvalues to a small positive floor, reconstruct, and
/// re-normalize the diagonal back to 1.0.
fn nearest_psd(eigen: &SymmetricEigen<f64, nalgebra::Dyn>) -> DMatrix<f64> {
    let clipped = eigen.eigenvalues.map(|l| l.max(EIG_FLOOR));
    let raw = &eigen.eigenvectors
        * DMatrix::from_diagonal(&clipped)
        * eigen.eigenvectors.transpose();

    let n = raw.nrows();
    let scales: Vec<f64> = (0..n).map(|i| raw[(i, i)].sqrt()).collect();
    DMatrix::from_fn(n, n, |i, j| raw[(i, j)] / (scales[i] * scales[j]))
}
