//! Normal distribution.

use nalgebra::DMatrix;
use ns_core::{Capabilities, Distribution, DistId, EvaluationContext, Params, Result};

use crate::math::{check_finite, check_positive, standard_normal_cdf, standard_normal_ppf};

/// Natural log of `sqrt(2π)`.
///
/// `ln(sqrt(2π)) = 0.5*ln(2π)` (precomputed to keep this crate const-friendly).
const LN_SQRT_2PI: f64 = 0.918_938_533_204_672_7;

/// Half-width of the truncated support, in standard deviations.
const TRUNCATION_SIGMAS: f64 = 7.5;

/// Log-PDF of a Normal distribution `N(mu, sigma)` at `x`.
///
/// `log p(x) = -0.5 * ((x-mu)/sigma)^2 - ln(sigma) - ln(sqrt(2π))`
pub fn logpdf(x: f64, mu: f64, sigma: f64) -> Result<f64> {
    check_positive("sigma", sigma)?;
    let z = (x - mu) / sigma;
    Ok(-0.5 * z * z - sigma.ln() - LN_SQRT_2PI)
}

/// Normal distribution `N(mu, sigma)`.
///
/// The support is truncated to `mu ± 7.5 sigma` so that bounds are finite.
#[derive(Debug, Clone)]
pub struct Normal {
    id: DistId,
    params: Params,
    mu: f64,
    sigma: f64,
}

impl Normal {
    /// Create `N(mu, sigma)`.
    pub fn new(mu: f64, sigma: f64) -> Result<Self> {
        check_finite("mu", mu)?;
        check_positive("sigma", sigma)?;
        Ok(Self { id: DistId::next(), params: Params::new().scalar("mu", mu).scalar("sigma", sigma), mu, sigma })
    }

    /// Standard normal `N(0, 1)`.
    pub fn standard() -> Self {
        Self { id: DistId::next(), params: Params::new().scalar("mu", 0.0).scalar("sigma", 1.0), mu: 0.0, sigma: 1.0 }
    }
}

impl Distribution for Normal {
    fn name(&self) -> &str {
        "Normal"
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
        let half = TRUNCATION_SIGMAS * self.sigma;
        Ok((x.map(|_| self.mu - half), x.map(|_| self.mu + half)))
    }

    fn forward(&self, x: &DMatrix<f64>) -> Result<DMatrix<f64>> {
        Ok(x.map(|v| standard_normal_cdf((v - self.mu) / self.sigma)))
    }

    fn density(&self, x: &DMatrix<f64>) -> Result<DMatrix<f64>> {
        let mut out = x.clone();
        for v in out.iter_mut() {
            *v = logpdf(*v, self.mu, self.sigma)?.exp();
        }
        Ok(out)
    }

    fn inverse(&self, q: &DMatrix<f64>) -> Result<DMatrix<f64>> {
        Ok(q.map(|p| self.mu + self.sigma * standard_normal_ppf(p)))
    }

    fn moment(&self, k: &[u32], _ctx: &mut dyn EvaluationContext) -> Result<f64> {
        // m_j = mu m_{j-1} + (j-1) sigma^2 m_{j-2}
        let var = self.sigma * self.sigma;
        let (mut prev, mut cur) = (0.0, 1.0);
        for j in 1..=k[0] {
            let next = self.mu * cur + f64::from(j - 1) * var * prev;
            prev = cur;
            cur = next;
        }
        Ok(cur)
    }

    fn recurrence(
        &self,
        k: &[u32],
        _ctx: &mut dyn EvaluationContext,
    ) -> Result<(Vec<f64>, Vec<f64>)> {
        let beta = if k[0] == 0 { 1.0 } else { f64::from(k[0]) * self.sigma * self.sigma };
        Ok((vec![self.mu], vec![beta]))
    }
}
