//! Beta distribution.

use nalgebra::DMatrix;
use ns_core::{Capabilities, Capability, Distribution, DistId, EvaluationContext, Params, Result};
use statrs::function::beta::beta_reg;
use statrs::function::gamma::ln_gamma;

use crate::math::check_positive;

#[inline]
fn ln_beta(a: f64, b: f64) -> f64 {
    ln_gamma(a) + ln_gamma(b) - ln_gamma(a + b)
}

/// Log-PDF of a Beta(`a`, `b`) distribution at `x`.
///
/// Support: `0 <= x <= 1`.
pub fn logpdf(x: f64, a: f64, b: f64) -> Result<f64> {
    check_positive("a", a)?;
    check_positive("b", b)?;
    if !(0.0..=1.0).contains(&x) {
        return Ok(f64::NEG_INFINITY);
    }

    let ln_norm = -ln_beta(a, b);
    if x == 0.0 {
        if a < 1.0 {
            return Ok(f64::INFINITY);
        }
        if a > 1.0 {
            return Ok(f64::NEG_INFINITY);
        }
        // a == 1: x term is 0.
        return Ok(ln_norm);
    }
    if x == 1.0 {
        if b < 1.0 {
            return Ok(f64::INFINITY);
        }
        if b > 1.0 {
            return Ok(f64::NEG_INFINITY);
        }
        return Ok(ln_norm);
    }

    Ok(ln_norm + (a - 1.0) * x.ln() + (b - 1.0) * (1.0 - x).ln())
}

/// Beta(`a`, `b`) distribution on `[0, 1]`.
#[derive(Debug, Clone)]
pub struct Beta {
    id: DistId,
    params: Params,
    a: f64,
    b: f64,
}

impl Beta {
    /// Create `Beta(a, b)`.
    pub fn new(a: f64, b: f64) -> Result<Self> {
        check_positive("a", a)?;
        check_positive("b", b)?;
        Ok(Self { id: DistId::next(), params: Params::new().scalar("a", a).scalar("b", b), a, b })
    }

    /// Monic Jacobi coefficients on `[-1, 1]` for weight `(1-t)^(b-1) (1+t)^(a-1)`.
    fn jacobi(&self, k: u32) -> (f64, f64) {
        let (ja, jb) = (self.b - 1.0, self.a - 1.0);
        let s = ja + jb;
        let kf = f64::from(k);
        let alpha = if k == 0 {
            (jb - ja) / (s + 2.0)
        } else {
            (jb * jb - ja * ja) / ((2.0 * kf + s) * (2.0 * kf + s + 2.0))
        };
        let beta = match k {
            0 => 1.0,
            1 => 4.0 * (1.0 + ja) * (1.0 + jb) / ((2.0 + s).powi(2) * (3.0 + s)),
            _ => {
                let t = 2.0 * kf + s;
                4.0 * kf * (kf + ja) * (kf + jb) * (kf + s) / (t * t * (t + 1.0) * (t - 1.0))
            }
        };
        (alpha, beta)
    }
}

impl Distribution for Beta {
    fn name(&self) -> &str {
        "Beta"
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
        Ok((x.map(|_| 0.0), x.map(|_| 1.0)))
    }

    fn forward(&self, x: &DMatrix<f64>) -> Result<DMatrix<f64>> {
        Ok(x.map(|v| beta_reg(self.a, self.b, v.clamp(0.0, 1.0))))
    }

    fn density(&self, x: &DMatrix<f64>) -> Result<DMatrix<f64>> {
        let mut out = x.clone();
        for v in out.iter_mut() {
            *v = logpdf(*v, self.a, self.b)?.exp();
        }
        Ok(out)
    }

    fn moment(&self, k: &[u32], _ctx: &mut dyn EvaluationContext) -> Result<f64> {
        Ok((0..k[0]).fold(1.0, |acc, j| {
            let j = f64::from(j);
            acc * (self.a + j) / (self.a + self.b + j)
        }))
    }

    fn recurrence(
        &self,
        k: &[u32],
        _ctx: &mut dyn EvaluationContext,
    ) -> Result<(Vec<f64>, Vec<f64>)> {
        // Map t = 2x - 1 back to [0, 1].
        let (alpha, beta) = self.jacobi(k[0]);
        let beta = if k[0] == 0 { 1.0 } else { beta / 4.0 };
        Ok((vec![0.5 * (alpha + 1.0)], vec![beta]))
    }
}
