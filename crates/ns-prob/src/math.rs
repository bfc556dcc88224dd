//! Small numeric helpers shared by the distributions, engines and rules.

use nalgebra::{DMatrix, DVector};
use ns_core::{Error, Result};
use statrs::function::erf::{erf_inv, erfc};

/// Reject parameters that are not finite and strictly positive.
pub(crate) fn check_positive(name: &str, value: f64) -> Result<f64> {
    if !value.is_finite() || value <= 0.0 {
        return Err(Error::Validation(format!("{} must be finite and > 0, got {}", name, value)));
    }
    Ok(value)
}

/// Reject parameters that are not finite.
pub(crate) fn check_finite(name: &str, value: f64) -> Result<f64> {
    if !value.is_finite() {
        return Err(Error::Validation(format!("{} must be finite, got {}", name, value)));
    }
    Ok(value)
}

/// Moment order as a `powi` exponent.
pub(crate) fn power_exponent(k: u32) -> Result<i32> {
    i32::try_from(k).map_err(|_| Error::Validation(format!("moment order {} exceeds {}", k, i32::MAX)))
}

/// Binomial coefficient `C(n, k)` as `f64`.
pub fn binomial(n: u32, k: u32) -> f64 {
    if k > n {
        return 0.0;
    }
    let k = k.min(n - k);
    let mut acc = 1.0f64;
    for i in 0..k {
        acc *= f64::from(n - i) / f64::from(i + 1);
    }
    acc
}

/// Standard normal CDF, `Phi(z) = erfc(-z/sqrt(2)) / 2`.
#[inline]
pub fn standard_normal_cdf(z: f64) -> f64 {
    0.5 * erfc(-z / std::f64::consts::SQRT_2)
}

/// Standard normal quantile, `Phi^-1(q) = sqrt(2) erfinv(2q - 1)`.
///
/// Returns `-inf`/`+inf` at `q = 0`/`q = 1`; callers clip into the support.
#[inline]
pub fn standard_normal_ppf(q: f64) -> f64 {
    if q <= 0.0 {
        return f64::NEG_INFINITY;
    }
    if q >= 1.0 {
        return f64::INFINITY;
    }
    std::f64::consts::SQRT_2 * erf_inv(2.0 * q - 1.0)
}

/// Product over the leading axis: `out[j] = prod_i m[(i, j)]`.
pub fn product_over_rows(m: &DMatrix<f64>) -> DVector<f64> {
    DVector::from_iterator(m.ncols(), m.column_iter().map(|c| c.iter().product::<f64>()))
}

/// Elementwise clip of `x` into `[lower, upper]` (all three share one shape).
pub fn clip(x: &DMatrix<f64>, lower: &DMatrix<f64>, upper: &DMatrix<f64>) -> DMatrix<f64> {
    let mut out = x.clone();
    for ((v, lo), up) in out.iter_mut().zip(lower.iter()).zip(upper.iter()) {
        *v = v.max(*lo).min(*up);
    }
    out
}

/// The first `n` prime numbers.
pub fn first_primes(n: usize) -> Vec<u64> {
    let mut primes: Vec<u64> = Vec::with_capacity(n);
    let mut candidate = 2u64;
    while primes.len() < n {
        if primes.iter().take_while(|&&p| p * p <= candidate).all(|&p| candidate % p != 0) {
            primes.push(candidate);
        }
        candidate += 1;
    }
    primes
}

/// Van der Corput radical inverse of `index` in `base`.
pub fn radical_inverse(mut index: u64, base: u64) -> f64 {
    let inv_base = 1.0 / base as f64;
    let mut scale = inv_base;
    let mut acc = 0.0;
    while index > 0 {
        acc += (index % base) as f64 * scale;
        index /= base;
        scale *= inv_base;
    }
    acc
}

/// Greatest common divisor.
pub fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_parameter_checks() {
        assert_eq!(check_positive("sigma", 2.0).unwrap(), 2.0);
        assert!(check_positive("sigma", 0.0).is_err());
        assert!(check_positive("sigma", f64::NAN).is_err());
        assert!(check_finite("mu", f64::INFINITY).is_err());
        assert_eq!(check_finite("mu", -3.0).unwrap(), -3.0);
    }

    #[test]
    fn test_binomial_small_table() {
        assert_eq!(binomial(0, 0), 1.0);
        assert_eq!(binomial(5, 2), 10.0);
        assert_eq!(binomial(6, 3), 20.0);
        assert_eq!(binomial(3, 4), 0.0);
        assert_relative_eq!(binomial(40, 20), 137_846_528_820.0, max_relative = 1e-12);
    }

    #[test]
    fn test_normal_cdf_ppf_are_inverse() {
        for q in [1e-6, 0.01, 0.2, 0.5, 0.77, 0.999] {
            let z = standard_normal_ppf(q);
            assert!((standard_normal_cdf(z) - q).abs() < 1e-10, "q={}", q);
        }
        assert!(standard_normal_ppf(0.0).is_infinite());
        assert_relative_eq!(standard_normal_cdf(0.0), 0.5, epsilon = 1e-15);
    }

    #[test]
    fn test_product_over_rows_and_clip() {
        let m = DMatrix::from_row_slice(2, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let p = product_over_rows(&m);
        assert_eq!(p.as_slice(), &[4.0, 10.0, 18.0]);

        let lo = DMatrix::from_element(2, 3, 2.0);
        let up = DMatrix::from_element(2, 3, 5.0);
        let c = clip(&m, &lo, &up);
        assert_eq!(c[(0, 0)], 2.0);
        assert_eq!(c[(1, 2)], 5.0);
        assert_eq!(c[(1, 0)], 4.0);
    }

    #[test]
    fn test_primes_and_radical_inverse() {
        assert_eq!(first_primes(6), vec![2, 3, 5, 7, 11, 13]);
        assert_relative_eq!(radical_inverse(1, 2), 0.5);
        assert_relative_eq!(radical_inverse(3, 2), 0.75);
        // 5 = "12" in base 3, mirrored to 0.21 (base 3)
        assert_relative_eq!(radical_inverse(5, 3), 2.0 / 3.0 + 1.0 / 9.0);
    }

    #[test]
    fn test_gcd_and_exponent() {
        assert_eq!(gcd(12, 18), 6);
        assert_eq!(gcd(7, 0), 7);
        assert_eq!(gcd(17_797, 5), 1);
        assert_eq!(power_exponent(3).unwrap(), 3);
        assert!(matches!(power_exponent(u32::MAX), Err(Error::Validation(_))));
    }
}
