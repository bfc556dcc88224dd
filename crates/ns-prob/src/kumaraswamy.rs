//! Kumaraswamy distribution on `[0, 1]`.
//!
//! Only the mandatory hooks are provided; density, quantiles, moments and
//! recurrence coefficients all come from the numerical fallbacks.

use nalgebra::DMatrix;
use ns_core::{Distribution, DistId, Params, Result};

use crate::math::check_positive;

/// Kumaraswamy(`a`, `b`): `F(x) = 1 - (1 - x^a)^b`.
#[derive(Debug, Clone)]
pub struct Kumaraswamy {
    id: DistId,
    params: Params,
    a: f64,
    b: f64,
}

impl Kumaraswamy {
    /// Create `Kumaraswamy(a, b)`.
    pub fn new(a: f64, b: f64) -> Result<Self> {
        check_positive("a", a)?;
        check_positive("b", b)?;
        Ok(Self { id: DistId::next(), params: Params::new().scalar("a", a).scalar("b", b), a, b })
    }
}

impl Distribution for Kumaraswamy {
    fn name(&self) -> &str {
        "Kumaraswamy"
    }

    fn id(&self) -> DistId {
        self.id
    }

    fn params(&self) -> &Params {
        &self.params
    }

    fn bound(&self, x: &DMatrix<f64>) -> Result<(DMatrix<f64>, DMatrix<f64>)> {
        Ok((x.map(|_| 0.0), x.map(|_| 1.0)))
    }

    fn forward(&self, x: &DMatrix<f64>) -> Result<DMatrix<f64>> {
        Ok(x.map(|v| {
            let v = v.clamp(0.0, 1.0);
            1.0 - (1.0 - v.powf(self.a)).powf(self.b)
        }))
    }
}
