//! Continuous uniform distribution on `[lower, upper]`.

use nalgebra::DMatrix;
use ns_core::{Capabilities, Distribution, DistId, Error, EvaluationContext, Params, Result};

use crate::math::{check_finite, power_exponent};

/// Uniform distribution on `[lower, upper]`.
#[derive(Debug, Clone)]
pub struct Uniform {
    id: DistId,
    params: Params,
    lower: f64,
    upper: f64,
}

impl Uniform {
    /// Create `U(lower, upper)`. Requires finite `lower < upper`.
    pub fn new(lower: f64, upper: f64) -> Result<Self> {
        check_finite("lower", lower)?;
        check_finite("upper", upper)?;
        if lower >= upper {
            return Err(Error::Validation(format!(
                "lower must be < upper, got lower={} upper={}",
                lower, upper
            )));
        }
        Ok(Self {
            id: DistId::next(),
            params: Params::new().scalar("lower", lower).scalar("upper", upper),
            lower,
            upper,
        })
    }

    /// Standard uniform `U(0, 1)`.
    pub fn standard() -> Self {
        Self {
            id: DistId::next(),
            params: Params::new().scalar("lower", 0.0).scalar("upper", 1.0),
            lower: 0.0,
            upper: 1.0,
        }
    }

    fn width(&self) -> f64 {
        self.upper - self.lower
    }
}

impl Distribution for Uniform {
    fn name(&self) -> &str {
        "Uniform"
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
        Ok((x.map(|_| self.lower), x.map(|_| self.upper)))
    }

    fn forward(&self, x: &DMatrix<f64>) -> Result<DMatrix<f64>> {
        Ok(x.map(|v| (v - self.lower) / self.width()))
    }

    fn density(&self, x: &DMatrix<f64>) -> Result<DMatrix<f64>> {
        Ok(x.map(|_| 1.0 / self.width()))
    }

    fn inverse(&self, q: &DMatrix<f64>) -> Result<DMatrix<f64>> {
        Ok(q.map(|p| self.lower + p * self.width()))
    }

    fn moment(&self, k: &[u32], _ctx: &mut dyn EvaluationContext) -> Result<f64> {
        let e = power_exponent(k[0].saturating_add(1))?;
        let (lo, up) = (self.lower, self.upper);
        Ok((up.powi(e) - lo.powi(e)) / (f64::from(e) * self.width()))
    }

    fn recurrence(
        &self,
        k: &[u32],
        _ctx: &mut dyn EvaluationContext,
    ) -> Result<(Vec<f64>, Vec<f64>)> {
        let k = f64::from(k[0]);
        let alpha = 0.5 * (self.lower + self.upper);
        let half = 0.5 * self.width();
        let beta = if k == 0.0 { 1.0 } else { k * k / (4.0 * k * k - 1.0) * half * half };
        Ok((vec![alpha], vec![beta]))
    }
}
