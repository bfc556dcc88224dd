//! Caller-facing operations on any [`Distribution`].
//!
//! [`DistributionExt`] is implemented for every distribution, including
//! `dyn Distribution`. Each operation validates its input, runs the
//! evaluation engine and returns batch-shaped results.

use nalgebra::{DMatrix, DVector};
use ns_core::{Distribution, Error, Result};

use crate::approximation::{DensityConfig, InverseConfig, MomentConfig, RecurrenceConfig, find_interior_point};
use crate::dependencies::require_independent_dims;
use crate::evaluation::{Evaluator, evaluate_bound, evaluate_density, evaluate_forward, evaluate_inverse};
use crate::math::product_over_rows;
use crate::sampler::{SampleConfig, generate};

/// High-level operations with default settings and `_with` variants.
pub trait DistributionExt: Distribution {
    /// Lower and upper bound per dimension, taken at the median (or at an
    /// interior point when the median cannot be computed independently).
    fn range(&self) -> Result<(DVector<f64>, DVector<f64>)> {
        let median = DMatrix::from_element(self.dim(), 1, 0.5);
        let at = match evaluate_inverse(self, &median, &InverseConfig::default()) {
            Ok(x) => x,
            Err(Error::Dependency(_) | Error::NotImplemented(_)) => find_interior_point(self)?,
            Err(e) => return Err(e),
        };
        let (lower, upper) = evaluate_bound(self, &at)?;
        Ok((lower.column(0).into_owned(), upper.column(0).into_owned()))
    }

    /// Bounds evaluated at `x`, each shaped like `x`.
    fn range_at(&self, x: &DMatrix<f64>) -> Result<(DMatrix<f64>, DMatrix<f64>)> {
        evaluate_bound(self, x)
    }

    /// Forward (Rosenblatt) transform.
    fn fwd(&self, x: &DMatrix<f64>) -> Result<DMatrix<f64>> {
        evaluate_forward(self, x)
    }

    /// Cumulative distribution function, one value per column.
    ///
    /// Fails with [`Error::Dependency`] for a multivariate distribution whose
    /// components share randomness.
    fn cdf(&self, x: &DMatrix<f64>) -> Result<DVector<f64>> {
        require_independent_dims(self, "cdf")?;
        Ok(product_over_rows(&evaluate_forward(self, x)?))
    }

    /// Inverse transform with default solver settings.
    fn inv(&self, q: &DMatrix<f64>) -> Result<DMatrix<f64>> {
        self.inv_with(q, &InverseConfig::default())
    }

    /// Inverse transform.
    fn inv_with(&self, q: &DMatrix<f64>, config: &InverseConfig) -> Result<DMatrix<f64>> {
        evaluate_inverse(self, q, config)
    }

    /// Joint density with the default difference step.
    fn pdf(&self, x: &DMatrix<f64>) -> Result<DVector<f64>> {
        self.pdf_with(x, &DensityConfig::default())
    }

    /// Joint density, one value per column.
    fn pdf_with(&self, x: &DMatrix<f64>, config: &DensityConfig) -> Result<DVector<f64>> {
        require_independent_dims(self, "density")?;
        Ok(product_over_rows(&evaluate_density(self, x, config)?))
    }

    /// `count` pseudo-random samples, shape `(dim, count)`.
    fn sample(&self, count: usize) -> Result<DMatrix<f64>> {
        self.sample_with(count, &SampleConfig::default())
    }

    /// `count` samples using `config`.
    fn sample_with(&self, count: usize, config: &SampleConfig) -> Result<DMatrix<f64>> {
        generate(count, self, config)
    }

    /// Raw moments, one exponent column per output entry.
    fn mom(&self, k: &DMatrix<u32>) -> Result<DVector<f64>> {
        self.mom_with(k, &MomentConfig::default())
    }

    /// Raw moments sharing one evaluation cache across all columns.
    fn mom_with(&self, k: &DMatrix<u32>, config: &MomentConfig) -> Result<DVector<f64>> {
        check_orders(self, k, "moment")?;
        let mut evaluator = Evaluator::new(config.clone(), RecurrenceConfig::default());
        let values = k
            .column_iter()
            .map(|col| evaluator.moment_of(self, &col.iter().copied().collect::<Vec<_>>()))
            .collect::<Result<Vec<_>>>()?;
        Ok(DVector::from_vec(values))
    }

    /// Recurrence coefficients `(alpha, beta)`, each shaped like `k`.
    fn ttr(&self, k: &DMatrix<u32>) -> Result<(DMatrix<f64>, DMatrix<f64>)> {
        self.ttr_with(k, &RecurrenceConfig::default())
    }

    /// Recurrence coefficients sharing one evaluation cache across all
    /// columns.
    fn ttr_with(&self, k: &DMatrix<u32>, config: &RecurrenceConfig) -> Result<(DMatrix<f64>, DMatrix<f64>)> {
        check_orders(self, k, "recurrence")?;
        let mut evaluator = Evaluator::new(MomentConfig::default(), config.clone());
        let mut alpha = DMatrix::zeros(k.nrows(), k.ncols());
        let mut beta = DMatrix::zeros(k.nrows(), k.ncols());
        for (j, col) in k.column_iter().enumerate() {
            let orders: Vec<u32> = col.iter().copied().collect();
            let (a, b) = evaluator.recurrence_of(self, &orders)?;
            alpha.column_mut(j).copy_from_slice(&a);
            beta.column_mut(j).copy_from_slice(&b);
        }
        Ok((alpha, beta))
    }
}

impl<D: Distribution + ?Sized> DistributionExt for D {}

fn check_orders<D: Distribution + ?Sized>(dist: &D, k: &DMatrix<u32>, what: &str) -> Result<()> {
    if k.nrows() != dist.dim() {
        return Err(Error::Validation(format!(
            "{} orders have {} rows but {} has {} dimensions",
            what,
            k.nrows(),
            dist.name(),
            dist.dim()
        )));
    }
    Ok(())
}
