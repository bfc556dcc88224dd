//! Clenshaw–Curtis rule (Chebyshev extrema including the endpoints).

use std::f64::consts::PI;

/// Clenshaw–Curtis rule with `order + 1` nodes on `[lower, upper]`.
///
/// Weights integrate against the Lebesgue measure. Order 0 is the midpoint
/// rule.
pub fn clenshaw_curtis_rule(order: usize, lower: f64, upper: f64) -> (Vec<f64>, Vec<f64>) {
    let half = 0.5 * (upper - lower);
    let center = 0.5 * (upper + lower);
    if order == 0 {
        return (vec![center], vec![2.0 * half]);
    }

    let n = order as f64;
    let mut nodes = Vec::with_capacity(order + 1);
    let mut weights = Vec::with_capacity(order + 1);
    for k in 0..=order {
        let theta = k as f64 * PI / n;
        let c = if k == 0 || k == order { 1.0 } else { 2.0 };
        let mut acc = 0.0;
        for j in 1..=order / 2 {
            let b = if 2 * j == order { 1.0 } else { 2.0 };
            let jf = j as f64;
            acc += b / (4.0 * jf * jf - 1.0) * (2.0 * jf * theta).cos();
        }
        nodes.push(center - half * theta.cos());
        weights.push(half * c / n * (1.0 - acc));
    }
    (nodes, weights)
}
