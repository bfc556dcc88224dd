//! Quadrature rules weighted by a distribution.
//!
//! [`generate_quadrature`] is the front-end: it dispatches on
//! [`QuadratureKind`], builds one rule per dimension and tensor-combines them
//! for independent multivariate distributions.

pub mod clenshaw_curtis;
pub mod combine;
pub mod fejer;
pub mod gaussian;
pub mod leja;
pub mod stieltjes;

use std::fmt;
use std::str::FromStr;

use nalgebra::DMatrix;
use ns_core::{Distribution, Error, QuadratureRule, Result};

use crate::approximation::{DensityConfig, RecurrenceConfig, find_interior_point};
use crate::dependencies::require_independent_dims;
use crate::evaluation::{evaluate_bound, evaluate_density};

pub use combine::{combine, combine_quadrature};
pub use leja::{LejaConfig, leja_quadrature};
pub use stieltjes::{Recurrence, recurrence_coefficients};

/// Family of quadrature rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuadratureKind {
    /// Fejér's second rule on the bounds, weighted by the density.
    #[default]
    Fejer,
    /// Clenshaw–Curtis on the bounds, weighted by the density.
    ClenshawCurtis,
    /// Gaussian rule from recurrence coefficients.
    Gaussian,
    /// Leja sequence with interpolatory weights.
    Leja,
}

impl QuadratureKind {
    /// Identifier accepted by [`FromStr`].
    pub fn as_str(self) -> &'static str {
        match self {
            QuadratureKind::Fejer => "fejer",
            QuadratureKind::ClenshawCurtis => "clenshaw_curtis",
            QuadratureKind::Gaussian => "gaussian",
            QuadratureKind::Leja => "leja",
        }
    }
}

impl fmt::Display for QuadratureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuadratureKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fejer" | "f" => Ok(QuadratureKind::Fejer),
            "clenshaw_curtis" | "clenshaw-curtis" | "c" => Ok(QuadratureKind::ClenshawCurtis),
            "gaussian" | "g" => Ok(QuadratureKind::Gaussian),
            "leja" | "j" => Ok(QuadratureKind::Leja),
            other => Err(Error::Validation(format!("unknown quadrature rule: {}", other))),
        }
    }
}

/// Source of recurrence coefficients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecurrenceAlgorithm {
    /// Analytical hook when declared, discretized Stieltjes otherwise.
    #[default]
    Auto,
    /// Analytical hook only.
    Analytical,
    /// Discretized Stieltjes only.
    Stieltjes,
}

impl FromStr for RecurrenceAlgorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "auto" => Ok(RecurrenceAlgorithm::Auto),
            "analytical" => Ok(RecurrenceAlgorithm::Analytical),
            "stieltjes" | "discretized_stieltjes" => Ok(RecurrenceAlgorithm::Stieltjes),
            other => Err(Error::Validation(format!("unknown recurrence algorithm: {}", other))),
        }
    }
}

/// Settings for [`generate_quadrature`].
#[derive(Debug, Clone)]
pub struct QuadratureConfig {
    /// Rule family.
    pub rule: QuadratureKind,
    /// Source of recurrence coefficients (Gaussian and Leja rules).
    pub recurrence_algorithm: RecurrenceAlgorithm,
    /// Order of the auxiliary rule used for discretized coefficients.
    pub accuracy: usize,
    /// Auxiliary rule used for discretized coefficients.
    pub auxiliary: QuadratureKind,
}

impl Default for QuadratureConfig {
    fn default() -> Self {
        Self {
            rule: QuadratureKind::Fejer,
            recurrence_algorithm: RecurrenceAlgorithm::Auto,
            accuracy: 100,
            auxiliary: QuadratureKind::Fejer,
        }
    }
}

impl QuadratureConfig {
    fn recurrences(&self) -> RecurrenceConfig {
        RecurrenceConfig { accuracy: self.accuracy, rule: self.auxiliary }
    }

    fn leja(&self) -> LejaConfig {
        LejaConfig {
            rule: self.auxiliary,
            accuracy: self.accuracy,
            recurrence_algorithm: self.recurrence_algorithm,
        }
    }
}

/// One order per dimension from either a single order or a full list.
pub fn broadcast_orders(orders: &[usize], dim: usize) -> Result<Vec<usize>> {
    match orders.len() {
        1 => Ok(vec![orders[0]; dim]),
        n if n == dim => Ok(orders.to_vec()),
        n => Err(Error::Validation(format!(
            "got {} orders for {} dimensions; pass one order or one per dimension",
            n, dim
        ))),
    }
}

/// Quadrature rule of the given order(s) for `dist`.
pub fn generate_quadrature<D: Distribution + ?Sized>(
    orders: &[usize],
    dist: &D,
    config: &QuadratureConfig,
) -> Result<QuadratureRule> {
    if config.rule == QuadratureKind::Leja {
        return leja_quadrature(orders, dist, &config.leja());
    }

    let dim = dist.dim();
    let orders = broadcast_orders(orders, dim)?;
    if dim == 1 {
        return univariate_rule(orders[0], dist, config);
    }

    require_independent_dims(dist, "quadrature")?;
    let mut abscissas = Vec::with_capacity(dim);
    let mut weights = Vec::with_capacity(dim);
    for (marginal, &order) in dist.marginals().iter().zip(&orders) {
        let rule = univariate_rule(order, marginal.as_ref(), config)?;
        abscissas.push(rule.nodes());
        weights.push(rule.weights.iter().copied().collect());
    }
    combine_quadrature(&abscissas, &weights, None)
}

fn univariate_rule<D: Distribution + ?Sized>(
    order: usize,
    dist: &D,
    config: &QuadratureConfig,
) -> Result<QuadratureRule> {
    let (nodes, raw) = match config.rule {
        QuadratureKind::Gaussian => {
            return gaussian::gaussian_quadrature(order, dist, config.recurrence_algorithm, &config.recurrences());
        }
        QuadratureKind::Leja => return leja_quadrature(&[order], dist, &config.leja()),
        QuadratureKind::Fejer | QuadratureKind::ClenshawCurtis => {
            let anchor = find_interior_point(dist)?;
            let (lower, upper) = evaluate_bound(dist, &anchor)?;
            if config.rule == QuadratureKind::Fejer {
                fejer::fejer_rule(order, lower[0], upper[0])
            } else {
                clenshaw_curtis::clenshaw_curtis_rule(order, lower[0], upper[0])
            }
        }
    };

    let x = DMatrix::from_row_slice(1, nodes.len(), &nodes);
    let pdf = evaluate_density(dist, &x, &DensityConfig::default())?;
    let mut weights: Vec<f64> = raw.iter().zip(pdf.iter()).map(|(w, f)| w * f).collect();
    let mass: f64 = weights.iter().sum();
    if !mass.is_finite() || mass <= 0.0 {
        return Err(Error::Computation(format!(
            "{}: {} rule of order {} carries mass {}",
            dist.name(),
            config.rule,
            order,
            mass
        )));
    }
    weights.iter_mut().for_each(|w| *w /= mass);
    QuadratureRule::univariate(nodes, weights)
}
