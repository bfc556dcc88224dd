//! Gamma distribution.

use nalgebra::DMatrix;
use ns_core::{Capabilities, Capability, Distribution, DistId, EvaluationContext, Params, Result};
use statrs::function::gamma::{gamma_lr, ln_gamma};

use crate::math::check_positive;

/// Log-PDF of a Gamma distribution with `shape` and `rate` at `x`.
///
/// Parameterization:
/// - `shape > 0`
/// - `rate > 0` (inverse scale)
/// Support: `x >= 0`.
pub fn logpdf_shape_rate(x: f64, shape: f64, rate: f64) -> Result<f64> {
    check_positive("shape", shape)?;
    check_positive("rate", rate)?;
    if x < 0.0 {
        return Ok(f64::NEG_INFINITY);
    }
    if x == 0.0 {
        if shape < 1.0 {
            return Ok(f64::INFINITY);
        }
        if shape > 1.0 {
            return Ok(f64::NEG_INFINITY);
        }
        // shape == 1 => exponential
        return Ok(rate.ln());
    }

    let ln_norm = shape * rate.ln() - ln_gamma(shape);
    Ok(ln_norm + (shape - 1.0) * x.ln() - rate * x)
}

/// Log-PDF of a Gamma distribution with `shape` and `scale` at `x`.
pub fn logpdf_shape_scale(x: f64, shape: f64, scale: f64) -> Result<f64> {
    check_positive("scale", scale)?;
    logpdf_shape_rate(x, shape, 1.0 / scale)
}

/// Gamma distribution with `shape` and `scale`.
///
/// No closed-form inverse: quantiles go through the numerical solver.
#[derive(Debug, Clone)]
pub struct Gamma {
    id: DistId,
    params: Params,
    shape: f64,
    scale: f64,
}

impl Gamma {
    /// Create `Gamma(shape, scale)`.
    pub fn new(shape: f64, scale: f64) -> Result<Self> {
        check_positive("shape", shape)?;
        check_positive("scale", scale)?;
        Ok(Self {
            id: DistId::next(),
            params: Params::new().scalar("scale", scale).scalar("shape", shape),
            shape,
            scale,
        })
    }
}

impl Distribution for Gamma {
    fn name(&self) -> &str {
        "Gamma"
    }

    fn id(&self) -> DistId {
        self.id
    }

    fn params(&self) -> &Params {
        &self.params
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::ALL.without(Capability::Inverse)
    }

    fn bound(&self, x: &DMatrix<f64>) -> Result<(DMatrix<f64>, DMatrix<f64>)> {
        let upper = self.scale * (40.0 + 2.0 * self.shape);
        Ok((x.map(|_| 0.0), x.map(|_| upper)))
    }

    fn forward(&self, x: &DMatrix<f64>) -> Result<DMatrix<f64>> {
        Ok(x.map(|v| if v <= 0.0 { 0.0 } else { gamma_lr(self.shape, v / self.scale) }))
    }

    fn density(&self, x: &DMatrix<f64>) -> Result<DMatrix<f64>> {
        let mut out = x.clone();
        for v in out.iter_mut() {
            *v = logpdf_shape_scale(*v, self.shape, self.scale)?.exp();
        }
        Ok(out)
    }

    fn moment(&self, k: &[u32], _ctx: &mut dyn EvaluationContext) -> Result<f64> {
        // scale^k Γ(shape + k) / Γ(shape)
        Ok((0..k[0]).fold(1.0, |acc, j| acc * self.scale * (self.shape + f64::from(j))))
    }

    fn recurrence(
        &self,
        k: &[u32],
        _ctx: &mut dyn EvaluationContext,
    ) -> Result<(Vec<f64>, Vec<f64>)> {
        // Generalized Laguerre with alpha = shape - 1, scaled by `scale`.
        let kf = f64::from(k[0]);
        let alpha = self.scale * (2.0 * kf + self.shape);
        let beta =
            if k[0] == 0 { 1.0 } else { self.scale * self.scale * kf * (kf + self.shape - 1.0) };
        Ok((vec![alpha], vec![beta]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::Evaluator;
    use approx::assert_relative_eq;

    #[test]
    fn test_shape_one_matches_exponential() {
        let x = 0.7;
        let rate = 2.3;
        let lp_g = logpdf_shape_rate(x, 1.0, rate).unwrap();
        let lp_e = crate::exponential::logpdf(x, rate).unwrap();
        assert!((lp_g - lp_e).abs() < 1e-12);
    }

    #[test]
    fn test_out_of_support() {
        let lp = logpdf_shape_rate(-0.1, 2.0, 1.0).unwrap();
        assert!(lp.is_infinite() && lp.is_sign_negative());
    }

    #[test]
    fn test_invalid_params() {
        assert!(logpdf_shape_rate(1.0, 0.0, 1.0).is_err());
        assert!(Gamma::new(1.0, 0.0).is_err());
    }

    #[test]
    fn test_moments_and_forward() {
        let g = Gamma::new(2.5, 2.0).unwrap();
        let mut ctx = Evaluator::default();
        assert_relative_eq!(g.moment(&[1], &mut ctx).unwrap(), 5.0);
        // Var = shape scale^2 = 10
        assert_relative_eq!(g.moment(&[2], &mut ctx).unwrap(), 35.0);
        let f = g.forward(&DMatrix::from_row_slice(1, 2, &[-1.0, 1e6])).unwrap();
        assert_eq!(f[(0, 0)], 0.0);
        assert_relative_eq!(f[(0, 1)], 1.0, epsilon = 1e-12);
        assert!(!g.capabilities().contains(Capability::Inverse));
    }
}
