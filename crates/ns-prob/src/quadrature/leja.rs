//! Leja quadrature.
//!
//! Nodes are grown greedily: each new node maximizes
//! `sqrt(pdf(x)) * prod |x - p|` over the current interior nodes `p`, searched
//! with a bounded Brent minimization on every gap between held points.
//! Weights make the rule interpolatory with respect to the distribution's
//! orthogonal polynomials.

use argmin::core::{CostFunction, Executor, State};
use argmin::solver::brent::BrentOpt;
use nalgebra::DMatrix;
use ns_core::{Distribution, Error, QuadratureRule, Result};

use crate::approximation::{DensityConfig, RecurrenceConfig, find_interior_point};
use crate::dependencies::require_independent_dims;
use crate::evaluation::{Evaluator, evaluate_bound, evaluate_density};
use crate::quadrature::stieltjes::recurrence_coefficients;
use crate::quadrature::{QuadratureKind, RecurrenceAlgorithm, broadcast_orders, combine_quadrature};

/// Iteration cap for each sub-interval search.
const MAX_BRENT_ITERATIONS: u64 = 200;

/// Settings for [`leja_quadrature`].
#[derive(Debug, Clone)]
pub struct LejaConfig {
    /// Auxiliary rule for discretized recurrence coefficients.
    pub rule: QuadratureKind,
    /// Order of the auxiliary rule.
    pub accuracy: usize,
    /// How the weight polynomials are obtained.
    pub recurrence_algorithm: RecurrenceAlgorithm,
}

impl Default for LejaConfig {
    fn default() -> Self {
        Self { rule: QuadratureKind::Fejer, accuracy: 100, recurrence_algorithm: RecurrenceAlgorithm::Auto }
    }
}

struct LejaObjective<'a, D: ?Sized> {
    dist: &'a D,
    interior: &'a [f64],
    density: DensityConfig,
}

impl<D: Distribution + ?Sized> CostFunction for LejaObjective<'_, D> {
    type Param = f64;
    type Output = f64;

    fn cost(&self, x: &Self::Param) -> std::result::Result<Self::Output, argmin::core::Error> {
        let point = DMatrix::from_element(1, 1, *x);
        let pdf = evaluate_density(self.dist, &point, &self.density)
            .map_err(|e| argmin::core::Error::msg(e.to_string()))?;
        let spread: f64 = self.interior.iter().map(|p| (x - p).abs()).product();
        Ok(-pdf[0].max(0.0).sqrt() * spread)
    }
}

/// Best point of `[lower, upper]` and its objective value.
fn search_interval<D: Distribution + ?Sized>(
    dist: &D,
    interior: &[f64],
    lower: f64,
    upper: f64,
) -> std::result::Result<(f64, f64), argmin::core::Error> {
    let problem = LejaObjective { dist, interior, density: DensityConfig::default() };
    let res = Executor::new(problem, BrentOpt::new(lower, upper))
        .configure(|state| state.max_iters(MAX_BRENT_ITERATIONS))
        .run()?;
    let state = res.state();
    let best = state
        .get_best_param()
        .copied()
        .ok_or_else(|| argmin::core::Error::msg("no point evaluated"))?;
    Ok((best, state.get_best_cost()))
}

/// Leja nodes of a univariate distribution, sorted.
pub fn leja_nodes<D: Distribution + ?Sized>(order: usize, dist: &D) -> Result<Vec<f64>> {
    let anchor = find_interior_point(dist)?;
    let (lower, upper) = evaluate_bound(dist, &anchor)?;
    let mean = Evaluator::default().moment_of(dist, &[1])?;
    let mut points = vec![lower[0], mean, upper[0]];

    for step in 0..order {
        let interior = &points[1..points.len() - 1];
        let mut best: Option<(usize, f64, f64)> = None;
        for idx in 0..points.len() - 1 {
            let (lo, up) = (points[idx], points[idx + 1]);
            if up <= lo {
                continue;
            }
            match search_interval(dist, interior, lo, up) {
                Ok((x, value)) => {
                    if best.is_none_or(|(_, _, v)| value < v) {
                        best = Some((idx, x, value));
                    }
                }
                Err(e) => log::warn!(
                    "{}: Leja search on [{}, {}] failed at step {}: {}",
                    dist.name(),
                    lo,
                    up,
                    step,
                    e
                ),
            }
        }
        let (idx, x, _) = best.ok_or_else(|| {
            Error::Computation(format!("{}: no admissible Leja point at step {}", dist.name(), step))
        })?;
        points.insert(idx + 1, x);
    }

    points.pop();
    points.remove(0);
    Ok(points)
}

/// Interpolatory weights for `nodes` against the orthogonal polynomials of
/// `dist`.
pub fn leja_weights<D: Distribution + ?Sized>(nodes: &[f64], dist: &D, config: &LejaConfig) -> Result<Vec<f64>> {
    let degree = nodes.len().saturating_sub(1);
    let recurrences = RecurrenceConfig { accuracy: config.accuracy, rule: config.rule };
    let coeffs = recurrence_coefficients(dist, degree, config.recurrence_algorithm, &recurrences)?;
    let basis = coeffs.basis(degree, nodes)?;
    let inverse = basis.try_inverse().ok_or_else(|| {
        Error::Computation(format!("{}: Leja polynomial matrix is singular", dist.name()))
    })?;
    Ok(inverse.column(0).iter().copied().collect())
}

/// Leja quadrature rule for `dist`.
///
/// `orders` holds one order, broadcast to every dimension, or one order per
/// dimension. Multivariate distributions must have independent components;
/// their per-dimension rules are tensor-combined.
pub fn leja_quadrature<D: Distribution + ?Sized>(
    orders: &[usize],
    dist: &D,
    config: &LejaConfig,
) -> Result<QuadratureRule> {
    let dim = dist.dim();
    let orders = broadcast_orders(orders, dim)?;
    if dim == 1 {
        let nodes = leja_nodes(orders[0], dist)?;
        let weights = leja_weights(&nodes, dist, config)?;
        return QuadratureRule::univariate(nodes, weights);
    }

    require_independent_dims(dist, "Leja quadrature")?;
    let mut abscissas = Vec::with_capacity(dim);
    let mut weights = Vec::with_capacity(dim);
    for (marginal, &order) in dist.marginals().iter().zip(&orders) {
        let rule = leja_quadrature(&[order], marginal.as_ref(), config)?;
        abscissas.push(rule.nodes());
        weights.push(rule.weights.iter().copied().collect());
    }
    combine_quadrature(&abscissas, &weights, None)
}
