//! Tensor-product combination of point sets and quadrature rules.

use nalgebra::{DMatrix, DVector};
use ns_core::{Error, QuadratureRule, Result};

/// Largest output (rows times columns) [`combine`] will build.
pub const MAX_COMBINED_CELLS: u128 = 1_000_000_000;

/// All combinations of the rows of `args`.
///
/// `args[i]` has shape `(n_i, m_i)`: `n_i` items of width `m_i`. The result
/// has shape `(prod n_i, sum m_i)`; the first argument varies slowest.
pub fn combine(args: &[DMatrix<f64>]) -> Result<DMatrix<f64>> {
    if args.is_empty() {
        return Err(Error::Validation("combine needs at least one argument".into()));
    }
    let rows = args.iter().try_fold(1u128, |acc, a| acc.checked_mul(a.nrows() as u128));
    let cols: usize = args.iter().map(|a| a.ncols()).sum();
    let cells = rows.and_then(|r| r.checked_mul(cols as u128));
    let rows = match (rows, cells) {
        (Some(r), Some(c)) if c <= MAX_COMBINED_CELLS => r as usize,
        _ => {
            let shapes: Vec<String> = args.iter().map(|a| format!("{}x{}", a.nrows(), a.ncols())).collect();
            return Err(Error::ResourceExhausted(format!(
                "too large sets: combining [{}] exceeds {} cells",
                shapes.join(", "),
                MAX_COMBINED_CELLS
            )));
        }
    };

    // stride[i] = product of the item counts after argument i
    let mut strides = vec![1usize; args.len()];
    for i in (0..args.len().saturating_sub(1)).rev() {
        strides[i] = strides[i + 1] * args[i + 1].nrows();
    }

    let mut out = DMatrix::zeros(rows, cols);
    for r in 0..rows {
        let mut col = 0;
        for (arg, &stride) in args.iter().zip(&strides) {
            let item = (r / stride) % arg.nrows();
            for c in 0..arg.ncols() {
                out[(r, col + c)] = arg[(item, c)];
            }
            col += arg.ncols();
        }
    }
    Ok(out)
}

/// Tensor product of univariate rules, one per axis.
///
/// With `domain = Some((lower, upper))` the rules are taken to live on
/// `[0, 1]` and are mapped to `[lower_i, upper_i]`, weights scaled by the
/// axis widths.
pub fn combine_quadrature(
    abscissas: &[Vec<f64>],
    weights: &[Vec<f64>],
    domain: Option<(&[f64], &[f64])>,
) -> Result<QuadratureRule> {
    let dim = abscissas.len();
    if weights.len() != dim {
        return Err(Error::Validation(format!(
            "{} abscissa sets but {} weight sets",
            dim,
            weights.len()
        )));
    }
    if let Some((i, _)) = abscissas.iter().zip(weights).enumerate().find(|(_, (a, w))| a.len() != w.len()) {
        return Err(Error::Validation(format!(
            "axis {} has {} abscissas but {} weights",
            i,
            abscissas[i].len(),
            weights[i].len()
        )));
    }
    if let Some((lower, upper)) = domain {
        if lower.len() != dim || upper.len() != dim {
            return Err(Error::Validation(format!("domain must have {} lower and upper values", dim)));
        }
    }

    let as_column = |v: &Vec<f64>| DMatrix::from_column_slice(v.len(), 1, v);
    let mut nodes = combine(&abscissas.iter().map(as_column).collect::<Vec<_>>())?;
    let mut factors = combine(&weights.iter().map(as_column).collect::<Vec<_>>())?;

    if let Some((lower, upper)) = domain {
        for i in 0..dim {
            let width = upper[i] - lower[i];
            nodes.column_mut(i).apply(|x| *x = lower[i] + width * *x);
            factors.column_mut(i).apply(|w| *w *= width);
        }
    }

    let weights = DVector::from_iterator(factors.nrows(), factors.row_iter().map(|r| r.iter().product::<f64>()));
    QuadratureRule::new(nodes.transpose(), weights)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_combine_row_order() {
        let a = DMatrix::from_row_slice(2, 1, &[1.0, 2.0]);
        let b = DMatrix::from_row_slice(2, 2, &[4.0, 4.0, 5.0, 6.0]);
        let out = combine(&[a, b]).unwrap();
        let expected =
            DMatrix::from_row_slice(4, 3, &[1.0, 4.0, 4.0, 1.0, 5.0, 6.0, 2.0, 4.0, 4.0, 2.0, 5.0, 6.0]);
        assert_eq!(out, expected);
    }

    #[test]
    fn test_combine_ceiling() {
        // Shapes are checked before anything is allocated.
        let big: DMatrix<f64> = DMatrix::zeros(1001, 1);
        let err = combine(&[big.clone(), big.clone(), big]).unwrap_err();
        assert!(matches!(err, Error::ResourceExhausted(_)));
        assert!(combine(&[]).is_err());
    }

    #[test]
    fn test_combine_quadrature_products() {
        let simpson = (vec![0.0, 0.5, 1.0], vec![1.0 / 6.0, 2.0 / 3.0, 1.0 / 6.0]);
        let mid = (vec![0.5], vec![1.0]);
        let rule = combine_quadrature(&[simpson.0.clone(), mid.0], &[simpson.1.clone(), mid.1], None).unwrap();
        assert_eq!(rule.abscissas.shape(), (2, 3));
        assert_relative_eq!(rule.total_weight(), 1.0, epsilon = 1e-15);
        assert_relative_eq!(rule.integrate(|x| x[0] * x[0] * x[1]), 1.0 / 6.0, epsilon = 1e-15);
    }

    #[test]
    fn test_combine_quadrature_domain_scaling() {
        let (lower, upper) = ([2.0, -1.0], [4.0, 1.0]);
        let rule = combine_quadrature(
            &[vec![0.5], vec![0.0, 1.0]],
            &[vec![1.0], vec![0.5, 0.5]],
            Some((&lower[..], &upper[..])),
        )
        .unwrap();
        assert_eq!(rule.abscissas[(0, 0)], 3.0);
        assert_eq!(rule.abscissas[(1, 0)], -1.0);
        assert_eq!(rule.abscissas[(1, 1)], 1.0);
        // area of [2, 4] x [-1, 1]
        assert_relative_eq!(rule.total_weight(), 4.0);
        assert!(combine_quadrature(&[vec![0.0]], &[vec![1.0, 2.0]], None).is_err());
    }
}
