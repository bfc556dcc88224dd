//! Weibull distribution.

use nalgebra::DMatrix;
use ns_core::{Capabilities, Capability, Distribution, DistId, EvaluationContext, Params, Result};
use statrs::function::gamma::gamma;

use crate::exponential::UPPER_QUANTILE;
use crate::math::check_positive;

/// Log-PDF of a Weibull distribution at `x` with shape `k` and scale `lambda`.
///
/// Support: `x >= 0`.
pub fn logpdf(x: f64, k: f64, lambda: f64) -> Result<f64> {
    check_positive("k", k)?;
    check_positive("lambda", lambda)?;
    if x < 0.0 {
        return Ok(f64::NEG_INFINITY);
    }
    if x == 0.0 {
        if k < 1.0 {
            return Ok(f64::INFINITY);
        }
        if k > 1.0 {
            return Ok(f64::NEG_INFINITY);
        }
        // k == 1 => exponential with rate 1/lambda
        return Ok(-lambda.ln());
    }

    let x_over_l = x / lambda;
    Ok(k.ln() - lambda.ln() + (k - 1.0) * x_over_l.ln() - x_over_l.powf(k))
}

/// Weibull distribution with shape `k` and scale `lambda`.
///
/// Recurrence coefficients have no closed form and are discretized.
#[derive(Debug, Clone)]
pub struct Weibull {
    id: DistId,
    params: Params,
    k: f64,
    lambda: f64,
}

impl Weibull {
    /// Create `Weibull(k, lambda)`.
    pub fn new(k: f64, lambda: f64) -> Result<Self> {
        check_positive("k", k)?;
        check_positive("lambda", lambda)?;
        Ok(Self { id: DistId::next(), params: Params::new().scalar("k", k).scalar("lambda", lambda), k, lambda })
    }

    fn quantile(&self, p: f64) -> f64 {
        self.lambda * (-(-p).ln_1p()).powf(1.0 / self.k)
    }
}

impl Distribution for Weibull {
    fn name(&self) -> &str {
        "Weibull"
    }

    fn id(&self) -> DistId {
        self.id
    }

    fn params(&self) -> &Params {
        &self.params
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::ALL.without(Capability::Recurrence)
    }

    fn bound(&self, x: &DMatrix<f64>) -> Result<(DMatrix<f64>, DMatrix<f64>)> {
        let upper = self.quantile(UPPER_QUANTILE);
        Ok((x.map(|_| 0.0), x.map(|_| upper)))
    }

    fn forward(&self, x: &DMatrix<f64>) -> Result<DMatrix<f64>> {
        Ok(x.map(|v| if v <= 0.0 { 0.0 } else { -(-(v / self.lambda).powf(self.k)).exp_m1() }))
    }

    fn density(&self, x: &DMatrix<f64>) -> Result<DMatrix<f64>> {
        let mut out = x.clone();
        for v in out.iter_mut() {
            *v = logpdf(*v, self.k, self.lambda)?.exp();
        }
        Ok(out)
    }

    fn inverse(&self, q: &DMatrix<f64>) -> Result<DMatrix<f64>> {
        Ok(q.map(|p| self.quantile(p)))
    }

    fn moment(&self, k: &[u32], _ctx: &mut dyn EvaluationContext) -> Result<f64> {
        let n = f64::from(k[0]);
        Ok(self.lambda.powf(n) * gamma(1.0 + n / self.k))
    }
}
