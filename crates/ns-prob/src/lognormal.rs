//! Log-normal distribution.

use nalgebra::DMatrix;
use ns_core::{Capabilities, Distribution, DistId, EvaluationContext, Params, Result};

use crate::math::{check_finite, check_positive, standard_normal_cdf, standard_normal_ppf};

/// Log-PDF of LogNormal(mu, sigma) at `x`.
///
/// Defined as: `ln X ~ Normal(mu, sigma)`.
pub fn logpdf(x: f64, mu: f64, sigma: f64) -> Result<f64> {
    check_positive("sigma", sigma)?;
    if !x.is_finite() || x <= 0.0 {
        return Ok(f64::NEG_INFINITY);
    }
    let lx = x.ln();
    let lp = crate::normal::logpdf(lx, mu, sigma)?;
    Ok(lp - lx)
}

/// Log-normal distribution, `ln X ~ N(mu, sigma)`.
#[derive(Debug, Clone)]
pub struct LogNormal {
    id: DistId,
    params: Params,
    mu: f64,
    sigma: f64,
}

impl LogNormal {
    /// Create `LogNormal(mu, sigma)`.
    pub fn new(mu: f64, sigma: f64) -> Result<Self> {
        check_finite("mu", mu)?;
        check_positive("sigma", sigma)?;
        Ok(Self { id: DistId::next(), params: Params::new().scalar("mu", mu).scalar("sigma", sigma), mu, sigma })
    }
}

impl Distribution for LogNormal {
    fn name(&self) -> &str {
        "LogNormal"
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
        let upper = (self.mu + 7.5 * self.sigma).exp();
        Ok((x.map(|_| 0.0), x.map(|_| upper)))
    }

    fn forward(&self, x: &DMatrix<f64>) -> Result<DMatrix<f64>> {
        Ok(x.map(|v| if v <= 0.0 { 0.0 } else { standard_normal_cdf((v.ln() - self.mu) / self.sigma) }))
    }

    fn density(&self, x: &DMatrix<f64>) -> Result<DMatrix<f64>> {
        let mut out = x.clone();
        for v in out.iter_mut() {
            *v = logpdf(*v, self.mu, self.sigma)?.exp();
        }
        Ok(out)
    }

    fn inverse(&self, q: &DMatrix<f64>) -> Result<DMatrix<f64>> {
        Ok(q.map(|p| (self.mu + self.sigma * standard_normal_ppf(p)).exp()))
    }

    fn moment(&self, k: &[u32], _ctx: &mut dyn EvaluationContext) -> Result<f64> {
        let k = f64::from(k[0]);
        Ok((k * self.mu + 0.5 * k * k * self.sigma * self.sigma).exp())
    }

    fn recurrence(
        &self,
        k: &[u32],
        _ctx: &mut dyn EvaluationContext,
    ) -> Result<(Vec<f64>, Vec<f64>)> {
        // Stieltjes–Wigert, scaled by exp(mu).
        let kf = f64::from(k[0]);
        let s2 = self.sigma * self.sigma;
        let grow = (kf * s2).exp();
        let alpha = (self.mu + (kf - 0.5) * s2).exp() * ((s2.exp() + 1.0) * grow - 1.0);
        let beta = if k[0] == 0 { 1.0 } else { (2.0 * self.mu + (3.0 * kf - 2.0) * s2).exp() * (grow - 1.0) };
        Ok((vec![alpha], vec![beta]))
    }
}
