//! Marginal distribution specifications
//!
//! A [`DistributionSpec`] pairs one of the eight marginal kinds with an
//! optional clamp. Specs are plain data (serde-friendly, so scenario
//! templates can carry them verbatim); the validated, runnable form is
//! [`Sampler`], built once per variable and shared across all trials.

use rand::Rng;
use serde::{Deserialize, Serialize};
use statrs::distribution::{
    Beta, ContinuousCDF, DiscreteCDF, Exp, Gamma, LogNormal, Normal, Poisson, Uniform, Weibull,
};
use statrs::function::erf::erfc;
use statrs::function::gamma::gamma;

use crate::error::{DistributionError, Result};

/// Tail guard for quantile evaluation. Uniform draws land in `[0, 1)`;
/// quantiles are only defined on the open interval, so the extreme tail
/// beyond this mass is clamped.
const TAIL_EPS: f64 = 1e-12;

/// One of the eight supported marginal kinds.
///
/// Parameter semantics follow the usual conventions: `LogNormal` is
/// parameterized by the location/scale of the underlying normal, `Gamma`
/// and `Exponential` by rate (not scale), `Weibull` by shape/scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Marginal {
    Normal { mean: f64, std: f64 },
    #[serde(rename = "lognormal")]
    LogNormal { location: f64, scale: f64 },
    Uniform { low: f64, high: f64 },
    Exponential { rate: f64 },
    Gamma { shape: f64, rate: f64 },
    Beta { alpha: f64, beta: f64 },
    Weibull { shape: f64, scale: f64 },
    Poisson { lambda: f64 },
}

impl Marginal {
    /// The `kind` tag as it appears in serialized form
    pub fn kind_name(&self) -> &'static str {
        match self {
            Marginal::Normal { .. } => "normal",
            Marginal::LogNormal { .. } => "lognormal",
            Marginal::Uniform { .. } => "uniform",
            Marginal::Exponential { .. } => "exponential",
            Marginal::Gamma { .. } => "gamma",
            Marginal::Beta { .. } => "beta",
            Marginal::Weibull { .. } => "weibull",
            Marginal::Poisson { .. } => "poisson",
        }
    }

    /// Check parameter sanity for this kind. Errors name the offending field.
    pub fn validate(&self) -> Result<()> {
        let kind = self.kind_name();
        match *self {
            Marginal::Normal { mean, std } => {
                finite(kind, "mean", mean)?;
                finite(kind, "std", std)?;
                if std < 0.0 {
                    return Err(DistributionError::param(kind, "std", "must be >= 0"));
                }
            }
            Marginal::LogNormal { location, scale } => {
                finite(kind, "location", location)?;
                positive(kind, "scale", scale)?;
            }
            Marginal::Uniform { low, high } => {
                finite(kind, "low", low)?;
                finite(kind, "high", high)?;
                if low >= high {
                    return Err(DistributionError::param(
                        kind,
                        "low",
                        format!("must be strictly below high ({low} >= {high})"),
                    ));
                }
            }
            Marginal::Exponential { rate } => positive(kind, "rate", rate)?,
            Marginal::Gamma { shape, rate } => {
                positive(kind, "shape", shape)?;
                positive(kind, "rate", rate)?;
            }
            Marginal::Beta { alpha, beta } => {
                positive(kind, "alpha", alpha)?;
                positive(kind, "beta", beta)?;
            }
            Marginal::Weibull { shape, scale } => {
                positive(kind, "shape", shape)?;
                positive(kind, "scale", scale)?;
            }
            Marginal::Poisson { lambda } => positive(kind, "lambda", lambda)?,
        }
        Ok(())
    }

    /// Closed-form mean and variance. All eight kinds have them.
    pub fn moments(&self) -> Result<Moments> {
        self.validate()?;
        let moments = match *self {
            Marginal::Normal { mean, std } => Moments {
                mean,
                variance: std * std,
            },
            Marginal::LogNormal { location, scale } => {
                let s2 = scale * scale;
                Moments {
                    mean: (location + s2 / 2.0).exp(),
                    variance: (s2.exp() - 1.0) * (2.0 * location + s2).exp(),
                }
            }
            Marginal::Uniform { low, high } => {
                let span = high - low;
                Moments {
                    mean: (low + high) / 2.0,
                    variance: span * span / 12.0,
                }
            }
            Marginal::Exponential { rate } => Moments {
                mean: 1.0 / rate,
                variance: 1.0 / (rate * rate),
            },
            Marginal::Gamma { shape, rate } => Moments {
                mean: shape / rate,
                variance: shape / (rate * rate),
            },
            Marginal::Beta { alpha, beta } => {
                let sum = alpha + beta;
                Moments {
                    mean: alpha / sum,
                    variance: alpha * beta / (sum * sum * (sum + 1.0)),
                }
            }
            Marginal::Weibull { shape, scale } => {
                let g1 = gamma(1.0 + 1.0 / shape);
                let g2 = gamma(1.0 + 2.0 / shape);
                Moments {
                    mean: scale * g1,
                    variance: scale * scale * (g2 - g1 * g1),
                }
            }
            Marginal::Poisson { lambda } => Moments {
                mean: lambda,
                variance: lambda,
            },
        };
        Ok(moments)
    }
}

/// Optional post-sampling clamp on realized values
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lower: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upper: Option<f64>,
}

impl Bounds {
    pub fn validate(&self) -> Result<()> {
        if let (Some(lower), Some(upper)) = (self.lower, self.upper) {
            if !lower.is_finite() || !upper.is_finite() || lower >= upper {
                return Err(DistributionError::InvalidBounds { lower, upper });
            }
        }
        Ok(())
    }

    fn apply(&self, mut x: f64) -> f64 {
        if let Some(lower) = self.lower {
            x = x.max(lower);
        }
        if let Some(upper) = self.upper {
            x = x.min(upper);
        }
        x
    }
}

/// Closed-form first and second central moments of a marginal
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Moments {
    pub mean: f64,
    pub variance: f64,
}

/// An immutable distribution specification: marginal kind plus clamp.
///
/// The reported [`Moments`] describe the unclamped marginal; bounds only
/// affect realized samples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionSpec {
    #[serde(flatten)]
    pub marginal: Marginal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounds: Option<Bounds>,
}

impl DistributionSpec {
    /// Construct and fail fast on invalid parameters.
    pub fn new(marginal: Marginal) -> Result<Self> {
        marginal.validate()?;
        Ok(Self {
            marginal,
            bounds: None,
        })
    }

    /// Attach a clamp, validating its ordering.
    pub fn with_bounds(mut self, bounds: Bounds) -> Result<Self> {
        bounds.validate()?;
        self.bounds = Some(bounds);
        Ok(self)
    }

    /// Validate marginal parameters and bounds (for specs built from data).
    pub fn validate(&self) -> Result<()> {
        self.marginal.validate()?;
        if let Some(bounds) = &self.bounds {
            bounds.validate()?;
        }
        Ok(())
    }

    /// Closed-form moments of the marginal.
    pub fn moments(&self) -> Result<Moments> {
        self.marginal.moments()
    }

    /// Build the runnable sampler. Validates first, so a `Sampler` is
    /// always backed by sane parameters.
    pub fn sampler(&self) -> Result<Sampler> {
        self.validate()?;
        let kind = self.marginal.kind_name();
        let bad = |field: &'static str, e: statrs::StatsError| {
            DistributionError::param(kind, field, e.to_string())
        };
        let inner = match self.marginal {
            // std == 0 is a legal degenerate spec: a point mass.
            Marginal::Normal { mean, std } if std == 0.0 => Inner::Constant(mean),
            Marginal::Normal { mean, std } => {
                Inner::Normal(Normal::new(mean, std).map_err(|e| bad("std", e))?)
            }
            Marginal::LogNormal { location, scale } => {
                Inner::LogNormal(LogNormal::new(location, scale).map_err(|e| bad("scale", e))?)
            }
            Marginal::Uniform { low, high } => {
                Inner::Uniform(Uniform::new(low, high).map_err(|e| bad("low", e))?)
            }
            Marginal::Exponential { rate } => {
                Inner::Exponential(Exp::new(rate).map_err(|e| bad("rate", e))?)
            }
            Marginal::Gamma { shape, rate } => {
                Inner::Gamma(Gamma::new(shape, rate).map_err(|e| bad("shape", e))?)
            }
            Marginal::Beta { alpha, beta } => {
                Inner::Beta(Beta::new(alpha, beta).map_err(|e| bad("alpha", e))?)
            }
            Marginal::Weibull { shape, scale } => {
                Inner::Weibull(Weibull::new(shape, scale).map_err(|e| bad("shape", e))?)
            }
            Marginal::Poisson { lambda } => {
                Inner::Poisson(Poisson::new(lambda).map_err(|e| bad("lambda", e))?)
            }
        };
        Ok(Sampler {
            inner,
            bounds: self.bounds,
        })
    }
}

#[derive(Debug, Clone)]
enum Inner {
    Constant(f64),
    Normal(Normal),
    LogNormal(LogNormal),
    Uniform(Uniform),
    Exponential(Exp),
    Gamma(Gamma),
    Beta(Beta),
    Weibull(Weibull),
    Poisson(Poisson),
}

/// The runnable form of a [`DistributionSpec`].
///
/// Referentially transparent given a fixed RNG state; holds no mutable
/// state itself, so it can be shared read-only across workers.
#[derive(Debug, Clone)]
pub struct Sampler {
    inner: Inner,
    bounds: Option<Bounds>,
}

impl Sampler {
    /// Inverse CDF at probability `u`, clamped to the open unit interval.
    ///
    /// This is the shared primitive behind both independent sampling and
    /// the Gaussian-copula marginal transform. Poisson uses the discrete
    /// inverse CDF (smallest `k` with `F(k) >= u`).
    pub fn quantile(&self, u: f64) -> f64 {
        let u = u.clamp(TAIL_EPS, 1.0 - TAIL_EPS);
        let x = match &self.inner {
            Inner::Constant(c) => *c,
            Inner::Normal(d) => d.inverse_cdf(u),
            Inner::LogNormal(d) => d.inverse_cdf(u),
            Inner::Uniform(d) => d.inverse_cdf(u),
            Inner::Exponential(d) => d.inverse_cdf(u),
            Inner::Gamma(d) => d.inverse_cdf(u),
            Inner::Beta(d) => d.inverse_cdf(u),
            Inner::Weibull(d) => d.inverse_cdf(u),
            Inner::Poisson(d) => d.inverse_cdf(u) as f64,
        };
        match self.bounds {
            Some(bounds) => bounds.apply(x),
            None => x,
        }
    }

    /// Map a standard-normal draw through this marginal: `x = Q(Φ(z))`.
    ///
    /// This is the per-variable half of the Gaussian copula: correlation is
    /// imposed on latent normals, then each correlated normal is pushed
    /// through its own marginal, which preserves the marginal exactly.
    pub fn quantile_from_normal(&self, z: f64) -> f64 {
        self.quantile(standard_normal_cdf(z))
    }

    /// Draw `count` independent samples. `count == 0` yields an empty
    /// vector, not an error. Draws are materialized per call; callers that
    /// need bounded memory sample per trial instead of per run.
    pub fn sample<R: Rng + ?Sized>(&self, count: usize, rng: &mut R) -> Vec<f64> {
        let mut draws = Vec::with_capacity(count);
        for _ in 0..count {
            let u: f64 = rng.gen();
            draws.push(self.quantile(u));
        }
        draws
    }
}

/// Standard normal CDF, `Φ(z) = erfc(-z/√2)/2`
fn standard_normal_cdf(z: f64) -> f64 {
    0.5 * erfc(-z / std::f64::consts::SQRT_2)
}

fn finite(kind: &'static str, field: &'static str, value: f64) -> Result<()> {
    if !value.is_finite() {
        return Err(DistributionError::param(kind, field, "must be finite"));
    }
    Ok(())
}

fn positive(kind: &'static str, field: &'static str, value: f64) -> Result<()> {
    finite(kind, field, value)?;
    if value <= 0.0 {
        return Err(DistributionError::param(kind, field, "must be > 0"));
    }
    Ok(())
}
