//! Unit-hypercube sequences: random, Latin hypercube, low-discrepancy and
//! grids. Every generator returns a `(dim, count)` matrix in `[0, 1]`.

use nalgebra::DMatrix;
use ns_core::Result;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::math::{first_primes, gcd, radical_inverse};
use crate::quadrature::combine;

/// Default multiplier of the Korobov lattice.
pub const KOROBOV_BASE: u64 = 17_797;

fn rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_os_rng(),
    }
}

/// Independent uniform draws.
pub fn random(count: usize, dim: usize, seed: Option<u64>) -> DMatrix<f64> {
    let mut rng = rng(seed);
    DMatrix::from_fn(dim, count, |_, _| rng.random::<f64>())
}

/// Latin hypercube: one draw per stratum `[k/count, (k+1)/count)` in every
/// dimension, strata shuffled independently per dimension.
pub fn latin_hypercube(count: usize, dim: usize, seed: Option<u64>) -> DMatrix<f64> {
    let mut rng = rng(seed);
    let mut out = DMatrix::zeros(dim, count);
    let mut strata: Vec<usize> = (0..count).collect();
    for i in 0..dim {
        strata.shuffle(&mut rng);
        for (j, &s) in strata.iter().enumerate() {
            out[(i, j)] = (s as f64 + rng.random::<f64>()) / count as f64;
        }
    }
    out
}

/// Halton sequence over the first `dim` primes, skipping the first
/// `max(prime)` indices.
pub fn halton(count: usize, dim: usize) -> DMatrix<f64> {
    let primes = first_primes(dim);
    let burn_in = primes.last().copied().unwrap_or(0);
    DMatrix::from_fn(dim, count, |i, j| radical_inverse(j as u64 + burn_in, primes[i]))
}

/// Hammersley set: Halton in the first `dim - 1` dimensions, an even
/// interior grid in the last.
pub fn hammersley(count: usize, dim: usize) -> DMatrix<f64> {
    if dim == 0 {
        return DMatrix::zeros(0, count);
    }
    let head = halton(count, dim - 1);
    DMatrix::from_fn(dim, count, |i, j| {
        if i + 1 == dim { (j + 1) as f64 / (count + 1) as f64 } else { head[(i, j)] }
    })
}

/// Rank-1 Korobov lattice with generator powers of `base` modulo `count + 1`.
///
/// A multiplier that is 0, 1 or shares a factor with the modulus is moved up
/// to the next one coprime with it, so no dimension collapses.
pub fn korobov(count: usize, dim: usize, base: u64) -> DMatrix<f64> {
    let modulus = count as u64 + 1;
    let mut multiplier = base % modulus;
    while modulus > 2 && (multiplier < 2 || gcd(multiplier, modulus) != 1) {
        multiplier += 1;
    }
    let mut generators = vec![1u64; dim];
    for i in 1..dim {
        generators[i] = multiplier * generators[i - 1] % modulus;
    }
    DMatrix::from_fn(dim, count, |i, j| {
        ((generators[i] as f64) * (j + 1) as f64 / modulus as f64).fract()
    })
}

/// Tensor grid of Chebyshev points `0.5 - 0.5 cos(k pi / (n + 1))`.
pub fn chebyshev(count: usize, dim: usize) -> Result<DMatrix<f64>> {
    tensor_grid(count, dim, |k, n| 0.5 - 0.5 * (k as f64 * std::f64::consts::PI / (n + 1) as f64).cos())
}

/// Tensor grid of evenly spaced interior points `k / (n + 1)`.
pub fn regular_grid(count: usize, dim: usize) -> Result<DMatrix<f64>> {
    tensor_grid(count, dim, |k, n| k as f64 / (n + 1) as f64)
}

/// Smallest `n` with `n^dim >= count` points per axis, tensor-combined and
/// truncated to `count` columns.
fn tensor_grid<F: Fn(usize, usize) -> f64>(count: usize, dim: usize, point: F) -> Result<DMatrix<f64>> {
    if dim == 0 || count == 0 {
        return Ok(DMatrix::zeros(dim, count));
    }
    let mut n = (count as f64).powf(1.0 / dim as f64).round().max(1.0) as usize;
    while n.checked_pow(dim as u32).is_some_and(|total| total < count) {
        n += 1;
    }
    let axis = DMatrix::from_fn(n, 1, |k, _| point(k + 1, n));
    let axes = vec![axis; dim];
    let grid = combine(&axes)?;
    Ok(grid.rows(0, count).transpose())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_random_is_seeded() {
        let a = random(5, 2, Some(7));
        let b = random(5, 2, Some(7));
        assert_eq!(a, b);
        assert!(a.iter().all(|&v| (0.0..1.0).contains(&v)));
    }

    #[test]
    fn test_latin_hypercube_hits_every_stratum() {
        let s = latin_hypercube(10, 3, Some(1));
        for i in 0..3 {
            let mut strata: Vec<usize> = s.row(i).iter().map(|v| (v * 10.0).floor() as usize).collect();
            strata.sort();
            assert_eq!(strata, (0..10).collect::<Vec<_>>());
        }
    }

    #[test]
    fn test_halton_values() {
        let h = halton(3, 2);
        // base 2 skips 3 indices: 3, 4, 5 -> 0.75, 0.125, 0.625
        assert_relative_eq!(h[(0, 0)], 0.75);
        assert_relative_eq!(h[(0, 1)], 0.125);
        assert_relative_eq!(h[(0, 2)], 0.625);
        // base 3 at index 3 -> "10" -> 1/9
        assert_relative_eq!(h[(1, 0)], 1.0 / 9.0);
    }

    #[test]
    fn test_hammersley_last_dimension_is_grid() {
        let h = hammersley(4, 2);
        assert_relative_eq!(h[(1, 0)], 0.2);
        assert_relative_eq!(h[(1, 3)], 0.8);
    }

    #[test]
    fn test_korobov_first_dimension_is_grid() {
        let k = korobov(4, 2, KOROBOV_BASE);
        assert_relative_eq!(k[(0, 0)], 0.2);
        assert_relative_eq!(k[(0, 3)], 0.8);
        // 17797 mod 5 = 2
        assert_relative_eq!(k[(1, 0)], 0.4);
        assert_relative_eq!(k[(1, 2)], 0.2, epsilon = 1e-12);
    }

    #[test]
    fn test_korobov_skips_degenerate_multiplier() {
        // 10 mod 5 = 0 would make every later dimension constant
        let k = korobov(4, 3, 10);
        assert_relative_eq!(k[(1, 0)], 0.4);
        assert_relative_eq!(k[(2, 0)], 0.8);
        for i in 0..3 {
            let mut row: Vec<f64> = k.row(i).iter().copied().collect();
            row.sort_by(f64::total_cmp);
            for (got, want) in row.iter().zip([0.2, 0.4, 0.6, 0.8]) {
                assert_relative_eq!(*got, want, epsilon = 1e-12);
            }
        }

        // 6 shares a factor with modulus 9 and is moved to 7
        let k = korobov(8, 2, 6);
        assert_relative_eq!(k[(1, 0)], 7.0 / 9.0);
    }

    #[test]
    fn test_grids() {
        let g = regular_grid(3, 1).unwrap();
        assert_eq!(g.shape(), (1, 3));
        assert_relative_eq!(g[(0, 0)], 0.25);
        assert_relative_eq!(g[(0, 2)], 0.75);

        let c = chebyshev(4, 2).unwrap();
        assert_eq!(c.shape(), (2, 4));
        assert!(c.iter().all(|&v| v > 0.0 && v < 1.0));

        let t = regular_grid(5, 2).unwrap();
        assert_eq!(t.shape(), (2, 5));
    }
}
