//! Numerical fallbacks used when a distribution lacks an analytical hook.
//!
//! - density: finite difference of the forward transform
//! - inverse: bracketed Newton–Raphson with bisection safeguard
//! - moments: Monte-Carlo average over generated samples
//!
//! Recurrence coefficients are discretized in [`crate::quadrature::stieltjes`].

use nalgebra::DMatrix;
use ns_core::{Distribution, Error, Result};

use crate::evaluation::{evaluate_bound, evaluate_density, evaluate_forward};
use crate::math::power_exponent;
use crate::quadrature::QuadratureKind;
use crate::sampler::{self, SampleConfig, SamplingRule};

/// Densities at or below this are not trusted as Newton derivatives.
const MIN_NEWTON_DENSITY: f64 = 1e-12;

/// Consecutive non-halving Newton steps before an element gives up on Newton.
const MAX_NEWTON_STALLS: u8 = 3;

/// Configuration for the numerical inverse transform.
#[derive(Debug, Clone)]
pub struct InverseConfig {
    /// Total iteration budget per call (Newton and bisection steps combined).
    pub max_iterations: usize,
    /// Convergence threshold on `|F(x) - q|`. Also bounds the bracket width
    /// or last step, relative to `max(1, |x|)`.
    pub tolerance: f64,
}

impl Default for InverseConfig {
    fn default() -> Self {
        Self { max_iterations: 100, tolerance: 1e-5 }
    }
}

/// Configuration for the finite-difference density.
#[derive(Debug, Clone)]
pub struct DensityConfig {
    /// Difference step.
    pub step: f64,
}

impl Default for DensityConfig {
    fn default() -> Self {
        Self { step: 1e-7 }
    }
}

/// Configuration for Monte-Carlo moments.
#[derive(Debug, Clone)]
pub struct MomentConfig {
    /// Number of samples.
    pub samples: usize,
    /// Sampling rule.
    pub rule: SamplingRule,
    /// Antithetic axes (see [`SampleConfig::antithetic`]).
    pub antithetic: Option<Vec<bool>>,
    /// Seed for the random rules. `None` draws from the OS.
    pub seed: Option<u64>,
}

impl Default for MomentConfig {
    fn default() -> Self {
        Self { samples: 10_000, rule: SamplingRule::Random, antithetic: None, seed: Some(42) }
    }
}

impl MomentConfig {
    fn sampling(&self) -> SampleConfig {
        SampleConfig { rule: self.rule, antithetic: self.antithetic.clone(), seed: self.seed }
    }
}

/// Configuration for discretized recurrence coefficients.
#[derive(Debug, Clone)]
pub struct RecurrenceConfig {
    /// Order of the auxiliary quadrature rule.
    pub accuracy: usize,
    /// Auxiliary rule. Must not itself need recurrence coefficients.
    pub rule: QuadratureKind,
}

impl Default for RecurrenceConfig {
    fn default() -> Self {
        Self { accuracy: 1000, rule: QuadratureKind::Fejer }
    }
}

/// Finite-difference density of the forward transform, one dimension at a time.
///
/// Uses a centered stencil clipped to the support, which degrades to a
/// one-sided difference at the bounds.
pub fn approximate_density<D: Distribution + ?Sized>(
    dist: &D,
    x: &DMatrix<f64>,
    config: &DensityConfig,
) -> Result<DMatrix<f64>> {
    if !config.step.is_finite() || config.step <= 0.0 {
        return Err(Error::Validation(format!("step must be finite and > 0, got {}", config.step)));
    }
    let h = config.step;
    let (lower, upper) = evaluate_bound(dist, x)?;
    let mut out = DMatrix::zeros(x.nrows(), x.ncols());

    for i in 0..x.nrows() {
        let mut hi = x.clone();
        let mut lo = x.clone();
        for j in 0..x.ncols() {
            hi[(i, j)] = (x[(i, j)] + h).min(upper[(i, j)]);
            lo[(i, j)] = (x[(i, j)] - h).max(lower[(i, j)]);
        }
        let f_hi = evaluate_forward(dist, &hi)?;
        let f_lo = evaluate_forward(dist, &lo)?;
        for j in 0..x.ncols() {
            let dx = hi[(i, j)] - lo[(i, j)];
            if dx > 0.0 {
                out[(i, j)] = ((f_hi[(i, j)] - f_lo[(i, j)]) / dx).max(0.0);
            }
        }
    }
    Ok(out)
}

/// A point inside the support, found by repeatedly moving to the middle of
/// the bounds evaluated at the current point. Shape `(dim, 1)`.
pub fn find_interior_point<D: Distribution + ?Sized>(dist: &D) -> Result<DMatrix<f64>> {
    let mut x = DMatrix::zeros(dist.dim(), 1);
    for _ in 0..10 {
        let (lower, upper) = evaluate_bound(dist, &x)?;
        let mid = (lower + upper) * 0.5;
        let shift = (&mid - &x).amax();
        x = mid;
        if shift < 1e-12 {
            break;
        }
    }
    Ok(x)
}

/// Numerical inverse transform.
///
/// Each element keeps a bracket tightened by the residual sign. Newton steps
/// use the density as derivative and are replaced by bisection when they are
/// unsafe or stall. An element is settled once its residual is below
/// `tolerance` and either its bracket or its last step is below
/// `tolerance * max(1, |x|)`; a small residual alone is not enough in flat
/// tails. Non-convergence is logged, not raised.
pub fn approximate_inverse<D: Distribution + ?Sized>(
    dist: &D,
    q: &DMatrix<f64>,
    config: &InverseConfig,
) -> Result<DMatrix<f64>> {
    if !config.tolerance.is_finite() || config.tolerance <= 0.0 {
        return Err(Error::Validation(format!(
            "tolerance must be finite and > 0, got {}",
            config.tolerance
        )));
    }
    let (dim, n) = q.shape();
    let anchor = find_interior_point(dist)?;
    let (lower, upper) = evaluate_bound(dist, &anchor)?;
    let mut lo = DMatrix::from_fn(dim, n, |i, _| lower[(i, 0)]);
    let mut up = DMatrix::from_fn(dim, n, |i, _| upper[(i, 0)]);
    let mut x = DMatrix::from_fn(dim, n, |i, j| lo[(i, j)] + q[(i, j)] * (up[(i, j)] - lo[(i, j)]));

    let len = dim * n;
    let mut done: Vec<bool> = q.iter().map(|&p| p == 0.0 || p == 1.0).collect();
    let mut prev_residual = vec![f64::INFINITY; len];
    let mut last_step = vec![f64::INFINITY; len];
    let mut stalls = vec![0u8; len];
    let mut bisect_only = vec![false; len];
    let density_config = DensityConfig::default();

    for _ in 0..config.max_iterations {
        let fx = evaluate_forward(dist, &x)?;
        let mut residual = vec![0.0; len];
        let mut active = false;
        for idx in 0..len {
            if done[idx] {
                continue;
            }
            let r = fx[idx] - q[idx];
            if r == 0.0 {
                done[idx] = true;
                continue;
            }
            if r > 0.0 {
                up[idx] = x[idx];
            } else {
                lo[idx] = x[idx];
            }
            let x_tol = config.tolerance * x[idx].abs().max(1.0);
            if r.abs() < config.tolerance && (up[idx] - lo[idx] <= x_tol || last_step[idx] <= x_tol) {
                done[idx] = true;
                continue;
            }
            active = true;
            residual[idx] = r;
        }
        if !active {
            break;
        }

        let density = evaluate_density(dist, &x, &density_config)?;
        for idx in 0..len {
            if done[idx] {
                continue;
            }
            let r = residual[idx];
            let mut next = 0.5 * (lo[idx] + up[idx]);
            if !bisect_only[idx] && density[idx] > MIN_NEWTON_DENSITY {
                let candidate = x[idx] - r / density[idx];
                if candidate.is_finite() && candidate > lo[idx] && candidate < up[idx] {
                    next = candidate;
                    if r.abs() > 0.5 * prev_residual[idx] {
                        stalls[idx] += 1;
                        if stalls[idx] >= MAX_NEWTON_STALLS {
                            bisect_only[idx] = true;
                        }
                    } else {
                        stalls[idx] = 0;
                    }
                    prev_residual[idx] = r.abs();
                }
            }
            last_step[idx] = (next - x[idx]).abs();
            x[idx] = next;
        }
    }

    let unconverged = done.iter().filter(|&&d| !d).count();
    if unconverged > 0 {
        log::warn!(
            "inverse of {} did not reach tolerance {} for {} of {} values after {} iterations",
            dist.name(),
            config.tolerance,
            unconverged,
            len,
            config.max_iterations
        );
    }
    Ok(x)
}

/// Monte-Carlo estimate of the raw moment `E[prod_i x_i^k_i]`.
pub fn approximate_moment<D: Distribution + ?Sized>(
    dist: &D,
    k: &[u32],
    config: &MomentConfig,
) -> Result<f64> {
    if config.samples == 0 {
        return Err(Error::Validation("samples must be > 0".to_string()));
    }
    let exponents = k.iter().map(|&e| power_exponent(e)).collect::<Result<Vec<i32>>>()?;
    let samples = sampler::generate(config.samples, dist, &config.sampling())?;
    let total: f64 = samples
        .column_iter()
        .map(|c| c.iter().zip(&exponents).map(|(x, &e)| x.powi(e)).product::<f64>())
        .sum();
    Ok(total / samples.ncols() as f64)
}
