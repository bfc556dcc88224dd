//! Fejér's second rule (interior Chebyshev extrema).

use std::f64::consts::PI;

/// Fejér type-2 rule with `order + 1` nodes on `[lower, upper]`.
///
/// Weights integrate against the Lebesgue measure and sum to
/// `upper - lower`. Nodes are increasing and strictly inside the interval.
pub fn fejer_rule(order: usize, lower: f64, upper: f64) -> (Vec<f64>, Vec<f64>) {
    let n_nodes = order + 1;
    let n = (n_nodes + 1) as f64;
    let half = 0.5 * (upper - lower);
    let center = 0.5 * (upper + lower);

    let mut nodes = Vec::with_capacity(n_nodes);
    let mut weights = Vec::with_capacity(n_nodes);
    for k in 1..=n_nodes {
        let theta = k as f64 * PI / n;
        let mut acc = 0.0;
        for j in 1..=(n_nodes + 1) / 2 {
            let m = (2 * j - 1) as f64;
            acc += (m * theta).sin() / m;
        }
        nodes.push(center - half * theta.cos());
        weights.push(half * 4.0 * theta.sin() / n * acc);
    }
    (nodes, weights)
}
