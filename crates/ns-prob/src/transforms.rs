//! Affine transforms of distributions: `Y = shift + scale * X`.
//!
//! The transform keeps the roots of `X`, so `X` and `shift + scale * X`
//! are recognised as stochastically dependent.

use std::collections::BTreeSet;
use std::sync::Arc;

use nalgebra::DMatrix;
use ns_core::{
    Capabilities, Capability, Distribution, DistId, Error, EvaluationContext, Params, Result,
};

use crate::approximation::{DensityConfig, InverseConfig};
use crate::evaluation::{evaluate_bound, evaluate_density, evaluate_forward, evaluate_inverse};
use crate::math::{binomial, power_exponent};

/// `shift + scale * inner`, per dimension.
///
/// A negative scale mirrors the distribution: the forward transform becomes
/// `1 - F` and the bounds swap.
#[derive(Debug, Clone)]
pub struct Affine {
    id: DistId,
    params: Params,
    inner: Arc<dyn Distribution>,
    shift: Vec<f64>,
    scale: Vec<f64>,
}

impl Affine {
    /// Same `shift` and `scale` on every dimension.
    pub fn new(inner: Arc<dyn Distribution>, shift: f64, scale: f64) -> Result<Self> {
        let dim = inner.dim();
        Self::with_vectors(inner, vec![shift; dim], vec![scale; dim])
    }

    /// Per-dimension `shift` and `scale`.
    pub fn with_vectors(inner: Arc<dyn Distribution>, shift: Vec<f64>, scale: Vec<f64>) -> Result<Self> {
        let dim = inner.dim();
        if shift.len() != dim || scale.len() != dim {
            return Err(Error::Validation(format!(
                "affine transform of a {}-dimensional distribution needs {} shifts and scales, got {} and {}",
                dim,
                dim,
                shift.len(),
                scale.len()
            )));
        }
        if let Some(s) = shift.iter().find(|s| !s.is_finite()) {
            return Err(Error::Validation(format!("shift must be finite, got {}", s)));
        }
        if let Some(c) = scale.iter().find(|c| !c.is_finite() || **c == 0.0) {
            return Err(Error::Validation(format!("scale must be finite and non-zero, got {}", c)));
        }
        Ok(Self::from_parts(inner, shift, scale))
    }

    fn from_parts(inner: Arc<dyn Distribution>, shift: Vec<f64>, scale: Vec<f64>) -> Self {
        let params = if shift.len() == 1 {
            Params::new().scalar("scale", scale[0]).scalar("shift", shift[0])
        } else {
            Params::new().array("scale", scale.clone()).array("shift", shift.clone())
        };
        Self { id: DistId::next(), params, inner, shift, scale }
    }

    /// The transformed distribution.
    pub fn inner(&self) -> &Arc<dyn Distribution> {
        &self.inner
    }

    fn to_inner(&self, y: &DMatrix<f64>) -> DMatrix<f64> {
        DMatrix::from_fn(y.nrows(), y.ncols(), |i, j| (y[(i, j)] - self.shift[i]) / self.scale[i])
    }

    fn from_inner(&self, x: &DMatrix<f64>) -> DMatrix<f64> {
        DMatrix::from_fn(x.nrows(), x.ncols(), |i, j| self.shift[i] + self.scale[i] * x[(i, j)])
    }
}

impl Distribution for Affine {
    fn name(&self) -> &str {
        "Affine"
    }

    fn id(&self) -> DistId {
        self.id
    }

    fn params(&self) -> &Params {
        &self.params
    }

    fn dim(&self) -> usize {
        self.inner.dim()
    }

    fn capabilities(&self) -> Capabilities {
        let passthrough = Capabilities::NONE.with(Capability::Density).with(Capability::Inverse);
        self.inner
            .capabilities()
            .intersection(passthrough)
            .with(Capability::Moment)
            .with(Capability::Recurrence)
    }

    fn roots(&self) -> BTreeSet<DistId> {
        self.inner.roots()
    }

    fn marginals(&self) -> Vec<Arc<dyn Distribution>> {
        if self.dim() == 1 {
            return Vec::new();
        }
        self.inner
            .marginals()
            .into_iter()
            .enumerate()
            .map(|(i, m)| {
                Arc::new(Affine::from_parts(m, vec![self.shift[i]], vec![self.scale[i]]))
                    as Arc<dyn Distribution>
            })
            .collect()
    }

    fn bound(&self, y: &DMatrix<f64>) -> Result<(DMatrix<f64>, DMatrix<f64>)> {
        let (lo, up) = evaluate_bound(self.inner.as_ref(), &self.to_inner(y))?;
        let (a, b) = (self.from_inner(&lo), self.from_inner(&up));
        let lower = DMatrix::from_fn(y.nrows(), y.ncols(), |i, j| a[(i, j)].min(b[(i, j)]));
        let upper = DMatrix::from_fn(y.nrows(), y.ncols(), |i, j| a[(i, j)].max(b[(i, j)]));
        Ok((lower, upper))
    }

    fn forward(&self, y: &DMatrix<f64>) -> Result<DMatrix<f64>> {
        let mut f = evaluate_forward(self.inner.as_ref(), &self.to_inner(y))?;
        for (i, mut row) in f.row_iter_mut().enumerate() {
            if self.scale[i] < 0.0 {
                row.apply(|v| *v = 1.0 - *v);
            }
        }
        Ok(f)
    }

    fn density(&self, y: &DMatrix<f64>) -> Result<DMatrix<f64>> {
        let mut d = evaluate_density(self.inner.as_ref(), &self.to_inner(y), &DensityConfig::default())?;
        for (i, mut row) in d.row_iter_mut().enumerate() {
            let jacobian = self.scale[i].abs();
            row.apply(|v| *v /= jacobian);
        }
        Ok(d)
    }

    fn inverse(&self, q: &DMatrix<f64>) -> Result<DMatrix<f64>> {
        let mirrored =
            DMatrix::from_fn(q.nrows(), q.ncols(), |i, j| if self.scale[i] < 0.0 { 1.0 - q[(i, j)] } else { q[(i, j)] });
        let x = evaluate_inverse(self.inner.as_ref(), &mirrored, &InverseConfig::default())?;
        Ok(self.from_inner(&x))
    }

    fn moment(&self, k: &[u32], ctx: &mut dyn EvaluationContext) -> Result<f64> {
        // E[prod (s_i + c_i X_i)^k_i] expanded over all exponent vectors j <= k.
        for &e in k {
            power_exponent(e)?;
        }
        let mut j = vec![0u32; k.len()];
        let mut total = 0.0;
        loop {
            let mut coef = 1.0;
            for i in 0..k.len() {
                coef *= binomial(k[i], j[i])
                    * self.shift[i].powi(power_exponent(k[i] - j[i])?)
                    * self.scale[i].powi(power_exponent(j[i])?);
            }
            if coef != 0.0 {
                total += coef * ctx.moment(self.inner.as_ref(), &j)?;
            }

            let mut axis = 0;
            while axis < k.len() && j[axis] == k[axis] {
                j[axis] = 0;
                axis += 1;
            }
            if axis == k.len() {
                break;
            }
            j[axis] += 1;
        }
        Ok(total)
    }

    fn recurrence(
        &self,
        k: &[u32],
        ctx: &mut dyn EvaluationContext,
    ) -> Result<(Vec<f64>, Vec<f64>)> {
        let (alpha, beta) = ctx.recurrence(self.inner.as_ref(), k)?;
        let alpha = alpha.iter().enumerate().map(|(i, a)| self.shift[i] + self.scale[i] * a).collect();
        let beta = beta
            .iter()
            .enumerate()
            .map(|(i, b)| if k[i] == 0 { *b } else { self.scale[i] * self.scale[i] * b })
            .collect();
        Ok((alpha, beta))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::Evaluator;
    use crate::normal::Normal;
    use crate::uniform::Uniform;
    use approx::assert_relative_eq;

    #[test]
    fn test_shifted_uniform() {
        let u: Arc<dyn Distribution> = Arc::new(Uniform::standard());
        let y = Affine::new(u.clone(), 2.0, 3.0).unwrap();
        let pts = DMatrix::from_row_slice(1, 2, &[2.0, 3.5]);
        let (lo, up) = y.bound(&pts).unwrap();
        assert_eq!((lo[(0, 0)], up[(0, 0)]), (2.0, 5.0));
        let f = y.forward(&pts).unwrap();
        assert_relative_eq!(f[(0, 1)], 0.5);
        let d = y.density(&pts).unwrap();
        assert_relative_eq!(d[(0, 1)], 1.0 / 3.0);
        assert_eq!(y.roots(), u.roots());
    }

    #[test]
    fn test_negative_scale_mirrors() {
        let u: Arc<dyn Distribution> = Arc::new(Uniform::standard());
        let y = Affine::new(u, 0.0, -2.0).unwrap();
        let pts = DMatrix::from_row_slice(1, 2, &[-1.5, -0.5]);
        let (lo, up) = y.bound(&pts).unwrap();
        assert_eq!((lo[(0, 0)], up[(0, 0)]), (-2.0, 0.0));
        let f = y.forward(&pts).unwrap();
        assert_relative_eq!(f[(0, 0)], 0.25);
        assert_relative_eq!(f[(0, 1)], 0.75);
        let x = y.inverse(&DMatrix::from_row_slice(1, 1, &[0.25])).unwrap();
        assert_relative_eq!(x[(0, 0)], -1.5);
    }

    #[test]
    fn test_moments_and_recurrence_through_context() {
        let n: Arc<dyn Distribution> = Arc::new(Normal::standard());
        let y = Affine::new(n, 1.0, 2.0).unwrap();
        let mut ev = Evaluator::default();
        assert_relative_eq!(ev.moment_of(&y, &[1]).unwrap(), 1.0);
        // E[(1 + 2Z)^2] = 1 + 4
        assert_relative_eq!(ev.moment_of(&y, &[2]).unwrap(), 5.0);
        let (a, b) = ev.recurrence_of(&y, &[2]).unwrap();
        assert_relative_eq!(a[0], 1.0);
        assert_relative_eq!(b[0], 8.0);
    }

    #[test]
    fn test_rejects_zero_scale() {
        let u: Arc<dyn Distribution> = Arc::new(Uniform::standard());
        assert!(matches!(Affine::new(u.clone(), 0.0, 0.0), Err(Error::Validation(_))));
        assert!(Affine::with_vectors(u, vec![0.0, 1.0], vec![1.0, 1.0]).is_err());
    }
}
