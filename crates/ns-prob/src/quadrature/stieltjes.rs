//! Three-term recurrence coefficients and the monic orthogonal polynomials
//! they generate.
//!
//! `P_{k+1}(x) = (x - alpha_k) P_k(x) - beta_k P_{k-1}(x)`, `P_0 = 1`,
//! `P_{-1} = 0`, with the convention `beta_0 = 1` (unit mass).

use nalgebra::DMatrix;
use ns_core::{Capability, Distribution, Error, Result};

use crate::approximation::{MomentConfig, RecurrenceConfig};
use crate::evaluation::Evaluator;
use crate::quadrature::{QuadratureConfig, QuadratureKind, RecurrenceAlgorithm, generate_quadrature};

/// Recurrence coefficients of orders `0..=order()`.
#[derive(Debug, Clone, PartialEq)]
pub struct Recurrence {
    /// `alpha_0 ..= alpha_n`
    pub alpha: Vec<f64>,
    /// `beta_0 ..= beta_n`
    pub beta: Vec<f64>,
}

impl Recurrence {
    /// Highest order held.
    pub fn order(&self) -> usize {
        self.alpha.len().saturating_sub(1)
    }

    /// Monic polynomials `P_0 ..= P_degree` at `x`; row `d` holds `P_d`.
    ///
    /// Needs coefficients up to order `degree - 1`.
    pub fn basis(&self, degree: usize, x: &[f64]) -> Result<DMatrix<f64>> {
        if degree > 0 && self.alpha.len() < degree {
            return Err(Error::Validation(format!(
                "polynomials of degree {} need recurrence order {}, have {}",
                degree,
                degree - 1,
                self.order()
            )));
        }
        let mut out = DMatrix::zeros(degree + 1, x.len());
        for (j, &xj) in x.iter().enumerate() {
            let (mut prev, mut cur) = (0.0, 1.0);
            out[(0, j)] = cur;
            for d in 0..degree {
                let next = (xj - self.alpha[d]) * cur - self.beta[d] * prev;
                prev = cur;
                cur = next;
                out[(d + 1, j)] = cur;
            }
        }
        Ok(out)
    }
}

/// Discretized Stieltjes procedure on the discrete measure `(nodes, weights)`.
///
/// Weights are normalised to unit mass. The recursion runs explicitly from
/// order 0 up to `order`; a vanishing norm fails with a computation error.
pub fn discretized_stieltjes(order: usize, nodes: &[f64], weights: &[f64]) -> Result<Recurrence> {
    if nodes.len() != weights.len() {
        return Err(Error::Validation(format!(
            "{} nodes but {} weights",
            nodes.len(),
            weights.len()
        )));
    }
    if order >= nodes.len() {
        return Err(Error::Validation(format!(
            "a discrete measure with {} nodes supports orders below {}, got {}",
            nodes.len(),
            nodes.len(),
            order
        )));
    }
    let mass: f64 = weights.iter().sum();
    if !mass.is_finite() || mass <= 0.0 {
        return Err(Error::Computation(format!("discrete measure has mass {}", mass)));
    }
    let w: Vec<f64> = weights.iter().map(|wi| wi / mass).collect();

    let mut alpha = Vec::with_capacity(order + 1);
    let mut beta = Vec::with_capacity(order + 1);
    let mut prev = vec![0.0; nodes.len()];
    let mut cur = vec![1.0; nodes.len()];
    let mut norm = 1.0;

    for k in 0..=order {
        if k > 0 {
            let next: Vec<f64> = nodes
                .iter()
                .zip(cur.iter().zip(&prev))
                .map(|(x, (p, q))| (x - alpha[k - 1]) * p - beta[k - 1] * q)
                .collect();
            prev = std::mem::replace(&mut cur, next);
        }
        let next_norm: f64 = w.iter().zip(&cur).map(|(wi, p)| wi * p * p).sum();
        if !next_norm.is_finite() || next_norm <= 0.0 {
            return Err(Error::Computation(format!(
                "Stieltjes discretization degenerated at order {} (norm {})",
                k, next_norm
            )));
        }
        let first: f64 = w.iter().zip(&cur).zip(nodes).map(|((wi, p), x)| wi * x * p * p).sum();
        alpha.push(first / next_norm);
        beta.push(if k == 0 { 1.0 } else { next_norm / norm });
        norm = next_norm;
    }
    Ok(Recurrence { alpha, beta })
}

/// Discretized coefficients of orders `0..=order` for a univariate
/// distribution, using an auxiliary rule built from its density.
pub fn discretized_recurrence<D: Distribution + ?Sized>(
    dist: &D,
    order: usize,
    config: &RecurrenceConfig,
) -> Result<Recurrence> {
    if dist.dim() != 1 {
        return Err(Error::Validation(format!(
            "discretized recurrence needs a univariate distribution, {} has {} dimensions",
            dist.name(),
            dist.dim()
        )));
    }
    if matches!(config.rule, QuadratureKind::Gaussian | QuadratureKind::Leja) {
        return Err(Error::Validation(format!(
            "auxiliary rule `{}` itself needs recurrence coefficients",
            config.rule
        )));
    }
    let accuracy = config.accuracy.max(order);
    let aux = QuadratureConfig { rule: config.rule, ..QuadratureConfig::default() };
    let rule = generate_quadrature(&[accuracy], dist, &aux)?;
    discretized_stieltjes(order, &rule.nodes(), rule.weights.as_slice())
}

/// Analytical coefficients of orders `0..=order` through the distribution's
/// recurrence hook.
pub fn analytical_stieltjes<D: Distribution + ?Sized>(
    order: usize,
    dist: &D,
    evaluator: &mut Evaluator,
) -> Result<Recurrence> {
    if !dist.capabilities().contains(Capability::Recurrence) {
        return Err(Error::NotImplemented(format!(
            "{} has no analytical recurrence coefficients",
            dist.name()
        )));
    }
    collect_orders(order, dist, evaluator)
}

fn collect_orders<D: Distribution + ?Sized>(
    order: usize,
    dist: &D,
    evaluator: &mut Evaluator,
) -> Result<Recurrence> {
    let mut alpha = Vec::with_capacity(order + 1);
    let mut beta = Vec::with_capacity(order + 1);
    // Highest order first so a discretized fallback fills the cache in one go.
    let (a, b) = evaluator.recurrence_of(dist, &[order as u32])?;
    for k in 0..order {
        let (ak, bk) = evaluator.recurrence_of(dist, &[k as u32])?;
        alpha.push(ak[0]);
        beta.push(bk[0]);
    }
    alpha.push(a[0]);
    beta.push(b[0]);
    Ok(Recurrence { alpha, beta })
}

/// Coefficients of orders `0..=order` using the selected algorithm.
pub fn recurrence_coefficients<D: Distribution + ?Sized>(
    dist: &D,
    order: usize,
    algorithm: RecurrenceAlgorithm,
    config: &RecurrenceConfig,
) -> Result<Recurrence> {
    if dist.dim() != 1 {
        return Err(Error::Validation(format!(
            "recurrence coefficients need a univariate distribution, {} has {} dimensions",
            dist.name(),
            dist.dim()
        )));
    }
    let mut evaluator = Evaluator::new(MomentConfig::default(), config.clone());
    match algorithm {
        RecurrenceAlgorithm::Analytical => analytical_stieltjes(order, dist, &mut evaluator),
        RecurrenceAlgorithm::Stieltjes => discretized_recurrence(dist, order, config),
        RecurrenceAlgorithm::Auto => collect_orders(order, dist, &mut evaluator),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::beta::Beta;
    use crate::kumaraswamy::Kumaraswamy;
    use crate::normal::Normal;
    use crate::quadrature::fejer::fejer_rule;
    use approx::assert_relative_eq;

    #[test]
    fn test_discrete_legendre() {
        let (x, w) = fejer_rule(60, 0.0, 1.0);
        let r = discretized_stieltjes(4, &x, &w).unwrap();
        for k in 0..=4 {
            assert_relative_eq!(r.alpha[k], 0.5, epsilon = 1e-12);
        }
        assert_eq!(r.beta[0], 1.0);
        for k in 1..=4usize {
            let kf = k as f64;
            assert_relative_eq!(r.beta[k], kf * kf / (4.0 * kf * kf - 1.0) / 4.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_degenerate_measure() {
        // Two nodes support orders 0 and 1 only.
        assert!(discretized_stieltjes(2, &[0.0, 1.0], &[0.5, 0.5]).is_err());
        assert!(matches!(
            discretized_stieltjes(1, &[0.5, 0.5], &[0.5, 0.5]),
            Err(Error::Computation(_))
        ));
        assert!(discretized_stieltjes(0, &[0.0], &[0.0]).is_err());
    }

    #[test]
    fn test_basis_orthogonal_under_measure() {
        let (x, w) = fejer_rule(40, 0.0, 1.0);
        let r = discretized_stieltjes(5, &x, &w).unwrap();
        let p = r.basis(5, &x).unwrap();
        for a in 0..6 {
            for b in 0..a {
                let inner: f64 = (0..x.len()).map(|j| w[j] * p[(a, j)] * p[(b, j)]).sum();
                assert!(inner.abs() < 1e-12, "<P{}, P{}> = {}", a, b, inner);
            }
        }
        assert!(r.basis(7, &x).is_err());
    }

    #[test]
    fn test_discretized_matches_analytical() {
        let b = Beta::new(2.0, 3.0).unwrap();
        let cfg = RecurrenceConfig { accuracy: 200, ..RecurrenceConfig::default() };
        let exact = recurrence_coefficients(&b, 4, RecurrenceAlgorithm::Analytical, &cfg).unwrap();
        let approx = recurrence_coefficients(&b, 4, RecurrenceAlgorithm::Stieltjes, &cfg).unwrap();
        for k in 0..=4 {
            assert_relative_eq!(exact.alpha[k], approx.alpha[k], epsilon = 1e-6);
            assert_relative_eq!(exact.beta[k], approx.beta[k], epsilon = 1e-6);
        }
    }

    #[test]
    fn test_algorithm_selection() {
        let k = Kumaraswamy::new(1.0, 1.0).unwrap();
        let cfg = RecurrenceConfig { accuracy: 100, ..RecurrenceConfig::default() };
        assert!(matches!(
            recurrence_coefficients(&k, 2, RecurrenceAlgorithm::Analytical, &cfg),
            Err(Error::NotImplemented(_))
        ));
        let auto = recurrence_coefficients(&k, 2, RecurrenceAlgorithm::Auto, &cfg).unwrap();
        assert_relative_eq!(auto.beta[1], 1.0 / 12.0, epsilon = 1e-6);

        let gaussian_aux = RecurrenceConfig { rule: QuadratureKind::Gaussian, ..cfg };
        let n = Normal::standard();
        assert!(matches!(discretized_recurrence(&n, 2, &gaussian_aux), Err(Error::Validation(_))));
    }
}
