//! Gaussian quadrature by the Golub–Welsch eigenvalue method.

use nalgebra::DMatrix;
use nalgebra::linalg::SymmetricEigen;
use ns_core::{Distribution, Error, QuadratureRule, Result};

use crate::approximation::RecurrenceConfig;
use crate::quadrature::RecurrenceAlgorithm;
use crate::quadrature::stieltjes::{Recurrence, recurrence_coefficients};

/// `order + 1` node Gaussian rule from recurrence coefficients of orders
/// `0..=order`.
///
/// The nodes are the eigenvalues of the symmetric Jacobi matrix; the weights
/// are the squared first components of its normalized eigenvectors (unit
/// mass). Nodes come out sorted.
pub fn golub_welsch(order: usize, coeffs: &Recurrence) -> Result<(Vec<f64>, Vec<f64>)> {
    let n = order + 1;
    if coeffs.alpha.len() < n || coeffs.beta.len() < n {
        return Err(Error::Validation(format!(
            "a {}-node Gaussian rule needs recurrence order {}, have {}",
            n,
            order,
            coeffs.order()
        )));
    }
    if let Some((k, b)) = coeffs.beta[1..n].iter().enumerate().find(|(_, b)| b.is_nan() || **b < 0.0) {
        return Err(Error::Computation(format!(
            "recurrence coefficient beta_{} = {} is not a valid Jacobi entry",
            k + 1,
            b
        )));
    }

    let jacobi = DMatrix::from_fn(n, n, |i, j| {
        if i == j {
            coeffs.alpha[i]
        } else if i + 1 == j {
            coeffs.beta[j].sqrt()
        } else if j + 1 == i {
            coeffs.beta[i].sqrt()
        } else {
            0.0
        }
    });
    let eigen = SymmetricEigen::new(jacobi);

    let mut pairs: Vec<(f64, f64)> = (0..n)
        .map(|i| {
            let v0 = eigen.eigenvectors[(0, i)];
            (eigen.eigenvalues[i], v0 * v0)
        })
        .collect();
    if pairs.iter().any(|(x, w)| !x.is_finite() || !w.is_finite()) {
        return Err(Error::Computation("Jacobi matrix eigen-decomposition did not converge".into()));
    }
    pairs.sort_by(|a, b| a.0.total_cmp(&b.0));
    Ok(pairs.into_iter().unzip())
}

/// Univariate Gaussian rule for `dist`.
pub fn gaussian_quadrature<D: Distribution + ?Sized>(
    order: usize,
    dist: &D,
    algorithm: RecurrenceAlgorithm,
    config: &RecurrenceConfig,
) -> Result<QuadratureRule> {
    let coeffs = recurrence_coefficients(dist, order, algorithm, config)?;
    let (nodes, weights) = golub_welsch(order, &coeffs)?;
    QuadratureRule::univariate(nodes, weights)
}
