//! Shared-handle constructors.
//!
//! One-liner wrappers over the per-distribution modules returning
//! `Arc<dyn Distribution>`, the handle composite builders take. Reusing a
//! handle in two places reuses the same random variable.

use std::sync::Arc;

use ns_core::{Distribution, Result};

use crate::beta::Beta;
use crate::exponential::Exponential;
use crate::gamma::Gamma;
use crate::joint::Joint;
use crate::kumaraswamy::Kumaraswamy;
use crate::lognormal::LogNormal;
use crate::normal::Normal;
use crate::transforms::Affine;
use crate::uniform::Uniform;
use crate::weibull::Weibull;

/// Shared handle to any distribution.
pub type DistHandle = Arc<dyn Distribution>;

/// `Uniform(lower, upper)`.
pub fn uniform(lower: f64, upper: f64) -> Result<DistHandle> {
    Ok(Arc::new(Uniform::new(lower, upper)?))
}

/// `Normal(mu, sigma)`.
pub fn normal(mu: f64, sigma: f64) -> Result<DistHandle> {
    Ok(Arc::new(Normal::new(mu, sigma)?))
}

/// `Exponential(rate)`.
pub fn exponential(rate: f64) -> Result<DistHandle> {
    Ok(Arc::new(Exponential::new(rate)?))
}

/// `Gamma(shape, scale)`.
pub fn gamma(shape: f64, scale: f64) -> Result<DistHandle> {
    Ok(Arc::new(Gamma::new(shape, scale)?))
}

/// `Beta(a, b)` on `[0, 1]`.
pub fn beta(a: f64, b: f64) -> Result<DistHandle> {
    Ok(Arc::new(Beta::new(a, b)?))
}

/// `LogNormal(mu, sigma)`: `ln X ~ Normal(mu, sigma)`.
pub fn lognormal(mu: f64, sigma: f64) -> Result<DistHandle> {
    Ok(Arc::new(LogNormal::new(mu, sigma)?))
}

/// `Weibull(k, lambda)`.
pub fn weibull(k: f64, lambda: f64) -> Result<DistHandle> {
    Ok(Arc::new(Weibull::new(k, lambda)?))
}

/// `Kumaraswamy(a, b)`.
pub fn kumaraswamy(a: f64, b: f64) -> Result<DistHandle> {
    Ok(Arc::new(Kumaraswamy::new(a, b)?))
}

/// `shift + scale * inner`.
pub fn affine(inner: &DistHandle, shift: f64, scale: f64) -> Result<DistHandle> {
    Ok(Arc::new(Affine::new(inner.clone(), shift, scale)?))
}

/// Joint of univariate components.
pub fn joint(components: &[DistHandle]) -> Result<DistHandle> {
    Ok(Arc::new(Joint::new(components.to_vec())?))
}
