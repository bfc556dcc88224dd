//! Exponential distribution.

use nalgebra::DMatrix;
use ns_core::{Capabilities, Distribution, DistId, EvaluationContext, Params, Result};

use crate::math::check_positive;

/// Upper truncation point, as a quantile.
pub(crate) const UPPER_QUANTILE: f64 = 1.0 - 1e-10;

/// Log-PDF of an Exponential(`rate`) distribution at `x`.
///
/// Support: `x >= 0`.
pub fn logpdf(x: f64, rate: f64) -> Result<f64> {
    check_positive("rate", rate)?;
    if x < 0.0 {
        return Ok(f64::NEG_INFINITY);
    }
    Ok(rate.ln() - rate * x)
}

/// Exponential distribution with `rate` (inverse scale).
#[derive(Debug, Clone)]
pub struct Exponential {
    id: DistId,
    params: Params,
    rate: f64,
}

impl Exponential {
    /// Create `Exp(rate)`.
    pub fn new(rate: f64) -> Result<Self> {
        check_positive("rate", rate)?;
        Ok(Self { id: DistId::next(), params: Params::new().scalar("rate", rate), rate })
    }

    fn quantile(&self, p: f64) -> f64 {
        -(-p).ln_1p() / self.rate
    }
}

impl Distribution for Exponential {
    fn name(&self) -> &str {
        "Exponential"
    }

    fn id(&self) -> DistId {
        self.id
    }

    fn params(&self) -> &Params {
        &self.params
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::ALL
    }

    fn bound(&self, x: &DMatrix<f64>) -> Result<(DMatrix<f64>, DMatrix<f64>)> {
        let upper = self.quantile(UPPER_QUANTILE);
        Ok((x.map(|_| 0.0), x.map(|_| upper)))
    }

    fn forward(&self, x: &DMatrix<f64>) -> Result<DMatrix<f64>> {
        Ok(x.map(|v| if v <= 0.0 { 0.0 } else { -(-self.rate * v).exp_m1() }))
    }

    fn density(&self, x: &DMatrix<f64>) -> Result<DMatrix<f64>> {
        let mut out = x.clone();
        for v in out.iter_mut() {
            *v = logpdf(*v, self.rate)?.exp();
        }
        Ok(out)
    }

    fn inverse(&self, q: &DMatrix<f64>) -> Result<DMatrix<f64>> {
        Ok(q.map(|p| self.quantile(p)))
    }

    fn moment(&self, k: &[u32], _ctx: &mut dyn EvaluationContext) -> Result<f64> {
        // k! / rate^k
        Ok((1..=k[0]).fold(1.0, |acc, j| acc * f64::from(j) / self.rate))
    }

    fn recurrence(
        &self,
        k: &[u32],
        _ctx: &mut dyn EvaluationContext,
    ) -> Result<(Vec<f64>, Vec<f64>)> {
        // Laguerre recurrence scaled by 1/rate.
        let kf = f64::from(k[0]);
        let alpha = (2.0 * kf + 1.0) / self.rate;
        let beta = if k[0] == 0 { 1.0 } else { kf * kf / (self.rate * self.rate) };
        Ok((vec![alpha], vec![beta]))
    }
}
