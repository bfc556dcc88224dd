//! Evaluation engine.
//!
//! Wraps the raw hooks of a [`Distribution`] with shape checks, bound
//! guards and the fallback chain from analytical hooks to numerical
//! approximations. Moments and recurrence coefficients go through an
//! [`Evaluator`], which memoizes them for the lifetime of one top-level call.

use nalgebra::DMatrix;
use ns_core::{Capability, Distribution, Error, EvaluationCache, EvaluationContext, Result};

use crate::approximation::{
    DensityConfig, InverseConfig, MomentConfig, RecurrenceConfig, approximate_density,
    approximate_inverse, approximate_moment,
};
use crate::dependencies::require_independent_dims;
use crate::math::clip;
use crate::quadrature::stieltjes::discretized_recurrence;

/// Fail unless `x` has one row per dimension of `dist`.
pub(crate) fn check_batch<D: Distribution + ?Sized>(dist: &D, x: &DMatrix<f64>) -> Result<()> {
    if x.nrows() != dist.dim() {
        return Err(Error::Validation(format!(
            "batch has {} rows but {} has {} dimensions",
            x.nrows(),
            dist.name(),
            dist.dim()
        )));
    }
    Ok(())
}

fn check_hook_shape<D: Distribution + ?Sized>(
    dist: &D,
    hook: &str,
    input: &DMatrix<f64>,
    output: &DMatrix<f64>,
) -> Result<()> {
    if input.shape() != output.shape() {
        return Err(Error::Computation(format!(
            "{} `{}` hook returned shape {:?} for input shape {:?}",
            dist.name(),
            hook,
            output.shape(),
            input.shape()
        )));
    }
    Ok(())
}

/// Fail unless every element satisfies `0 <= q <= 1` (NaN fails).
pub fn validate_probabilities(q: &DMatrix<f64>) -> Result<()> {
    if let Some(bad) = q.iter().find(|p| !(0.0..=1.0).contains(*p)) {
        return Err(Error::Validation(format!("probabilities must lie in [0, 1], got {}", bad)));
    }
    Ok(())
}

/// Lower and upper bounds at `x`, each shaped like `x`.
pub fn evaluate_bound<D: Distribution + ?Sized>(
    dist: &D,
    x: &DMatrix<f64>,
) -> Result<(DMatrix<f64>, DMatrix<f64>)> {
    check_batch(dist, x)?;
    let (lower, upper) = dist.bound(x)?;
    check_hook_shape(dist, "bound", x, &lower)?;
    check_hook_shape(dist, "bound", x, &upper)?;
    Ok((lower, upper))
}

/// Forward transform: 0 below the lower bound, 1 above the upper bound, the
/// hook's value clipped to `[0, 1]` in between.
pub fn evaluate_forward<D: Distribution + ?Sized>(dist: &D, x: &DMatrix<f64>) -> Result<DMatrix<f64>> {
    let (lower, upper) = evaluate_bound(dist, x)?;
    let mut out = dist.forward(x)?;
    check_hook_shape(dist, "forward", x, &out)?;
    for (idx, v) in out.iter_mut().enumerate() {
        *v = if x[idx] < lower[idx] {
            0.0
        } else if x[idx] > upper[idx] {
            1.0
        } else {
            v.clamp(0.0, 1.0)
        };
    }
    Ok(out)
}

/// Per-dimension density, zero outside the bounds.
pub fn evaluate_density<D: Distribution + ?Sized>(
    dist: &D,
    x: &DMatrix<f64>,
    config: &DensityConfig,
) -> Result<DMatrix<f64>> {
    let (lower, upper) = evaluate_bound(dist, x)?;
    let mut out = if dist.capabilities().contains(Capability::Density) {
        let out = dist.density(x)?;
        check_hook_shape(dist, "density", x, &out)?;
        out
    } else {
        log::debug!("{}: no density hook, using finite differences", dist.name());
        approximate_density(dist, x, config)?
    };
    for (idx, v) in out.iter_mut().enumerate() {
        if x[idx] < lower[idx] || x[idx] > upper[idx] {
            *v = 0.0;
        }
    }
    Ok(out)
}

/// Inverse transform, clipped into the bounds of the result.
pub fn evaluate_inverse<D: Distribution + ?Sized>(
    dist: &D,
    q: &DMatrix<f64>,
    config: &InverseConfig,
) -> Result<DMatrix<f64>> {
    check_batch(dist, q)?;
    validate_probabilities(q)?;
    let x = if dist.capabilities().contains(Capability::Inverse) {
        let x = dist.inverse(q)?;
        check_hook_shape(dist, "inverse", q, &x)?;
        x
    } else {
        require_independent_dims(dist, "numerical inverse")?;
        log::debug!("{}: no inverse hook, using Newton-bisection", dist.name());
        approximate_inverse(dist, q, config)?
    };
    let (lower, upper) = evaluate_bound(dist, &x)?;
    Ok(clip(&x, &lower, &upper))
}

/// Moment and recurrence evaluator with a per-call cache.
///
/// Create one per top-level request; composite distributions call back into
/// it through [`EvaluationContext`] so shared sub-results are computed once.
#[derive(Debug, Default)]
pub struct Evaluator {
    cache: EvaluationCache,
    moments: MomentConfig,
    recurrences: RecurrenceConfig,
}

impl Evaluator {
    /// Evaluator with explicit fallback settings.
    pub fn new(moments: MomentConfig, recurrences: RecurrenceConfig) -> Self {
        Self { cache: EvaluationCache::new(), moments, recurrences }
    }

    /// The memo filled so far.
    pub fn cache(&self) -> &EvaluationCache {
        &self.cache
    }

    /// Raw moment with one exponent per dimension.
    pub fn moment_of<D: Distribution + ?Sized>(&mut self, dist: &D, k: &[u32]) -> Result<f64> {
        if k.len() != dist.dim() {
            return Err(Error::Validation(format!(
                "moment exponent has {} entries but {} has {} dimensions",
                k.len(),
                dist.name(),
                dist.dim()
            )));
        }
        if k.iter().all(|&e| e == 0) {
            return Ok(1.0);
        }
        if let Some(v) = self.cache.moment(dist.id(), k) {
            return Ok(v);
        }
        let value = if dist.capabilities().contains(Capability::Moment) {
            dist.moment(k, self)?
        } else {
            log::debug!("{}: no moment hook, using Monte-Carlo integration", dist.name());
            approximate_moment(dist, k, &self.moments)?
        };
        self.cache.insert_moment(dist.id(), k, value);
        Ok(value)
    }

    /// Recurrence coefficients `(alpha, beta)` with one order per dimension.
    pub fn recurrence_of<D: Distribution + ?Sized>(
        &mut self,
        dist: &D,
        k: &[u32],
    ) -> Result<(Vec<f64>, Vec<f64>)> {
        let dim = dist.dim();
        if k.len() != dim {
            return Err(Error::Validation(format!(
                "recurrence order has {} entries but {} has {} dimensions",
                k.len(),
                dist.name(),
                dim
            )));
        }
        if let Some(hit) = self.cache.recurrence(dist.id(), k) {
            return Ok(hit);
        }

        let (alpha, beta) = if dist.capabilities().contains(Capability::Recurrence) {
            let (alpha, beta) = dist.recurrence(k, self)?;
            if alpha.len() != dim || beta.len() != dim {
                return Err(Error::Computation(format!(
                    "{} `recurrence` hook returned {} / {} coefficients for {} dimensions",
                    dist.name(),
                    alpha.len(),
                    beta.len(),
                    dim
                )));
            }
            (alpha, beta)
        } else if dim == 1 {
            log::debug!("{}: no recurrence hook, discretizing with Stieltjes", dist.name());
            let coeffs = discretized_recurrence(dist, k[0] as usize, &self.recurrences)?;
            // Every lower order comes out of the same discretization.
            for order in 0..k[0] as usize {
                self.cache.insert_recurrence(
                    dist.id(),
                    &[order as u32],
                    vec![coeffs.alpha[order]],
                    vec![coeffs.beta[order]],
                );
            }
            let top = k[0] as usize;
            (vec![coeffs.alpha[top]], vec![coeffs.beta[top]])
        } else {
            let marginals = dist.marginals();
            if marginals.len() != dim {
                return Err(Error::NotImplemented(format!(
                    "recurrence of {} needs one marginal per dimension",
                    dist.name()
                )));
            }
            let mut alpha = Vec::with_capacity(dim);
            let mut beta = Vec::with_capacity(dim);
            for (marginal, &order) in marginals.iter().zip(k) {
                let (a, b) = self.recurrence_of(marginal.as_ref(), &[order])?;
                alpha.push(a[0]);
                beta.push(b[0]);
            }
            (alpha, beta)
        };
        self.cache.insert_recurrence(dist.id(), k, alpha.clone(), beta.clone());
        Ok((alpha, beta))
    }
}

impl EvaluationContext for Evaluator {
    fn moment(&mut self, dist: &dyn Distribution, k: &[u32]) -> Result<f64> {
        self.moment_of(dist, k)
    }

    fn recurrence(&mut self, dist: &dyn Distribution, k: &[u32]) -> Result<(Vec<f64>, Vec<f64>)> {
        self.recurrence_of(dist, k)
    }
}
