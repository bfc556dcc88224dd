//! Joint distributions stacking univariate components, one per dimension.

use std::collections::BTreeSet;
use std::sync::Arc;

use nalgebra::DMatrix;
use ns_core::{
    Capabilities, Capability, Distribution, DistId, Error, EvaluationContext, Params, Result,
};

use crate::approximation::{DensityConfig, InverseConfig};
use crate::dependencies::require_independent;
use crate::evaluation::{evaluate_bound, evaluate_density, evaluate_forward, evaluate_inverse};

/// Joint distribution of univariate components.
///
/// Components built from a shared root (e.g. `U` and `U + 1`) are allowed;
/// operations that need independence check for it and fail with
/// [`Error::Dependency`].
#[derive(Debug, Clone)]
pub struct Joint {
    id: DistId,
    params: Params,
    components: Vec<Arc<dyn Distribution>>,
}

impl Joint {
    /// Stack `components` in order.
    pub fn new(components: Vec<Arc<dyn Distribution>>) -> Result<Self> {
        if components.is_empty() {
            return Err(Error::Validation("joint distribution needs at least one component".into()));
        }
        if let Some(c) = components.iter().find(|c| c.dim() != 1) {
            return Err(Error::Validation(format!(
                "joint components must be univariate, {} has {} dimensions",
                c.name(),
                c.dim()
            )));
        }
        Ok(Self { id: DistId::next(), params: Params::new(), components })
    }

    /// `n` independent copies, each built by a fresh call to `make`.
    pub fn iid<F>(n: usize, mut make: F) -> Result<Self>
    where
        F: FnMut() -> Result<Arc<dyn Distribution>>,
    {
        let components = (0..n).map(|_| make()).collect::<Result<Vec<_>>>()?;
        Self::new(components)
    }

    /// The components, one per dimension.
    pub fn components(&self) -> &[Arc<dyn Distribution>] {
        &self.components
    }

    fn per_row<F>(&self, x: &DMatrix<f64>, mut f: F) -> Result<DMatrix<f64>>
    where
        F: FnMut(&dyn Distribution, &DMatrix<f64>) -> Result<DMatrix<f64>>,
    {
        let mut out = DMatrix::zeros(x.nrows(), x.ncols());
        for (i, component) in self.components.iter().enumerate() {
            let row = f(component.as_ref(), &x.rows(i, 1).into_owned())?;
            out.row_mut(i).copy_from(&row);
        }
        Ok(out)
    }
}

impl Distribution for Joint {
    fn name(&self) -> &str {
        "Joint"
    }

    fn id(&self) -> DistId {
        self.id
    }

    fn params(&self) -> &Params {
        &self.params
    }

    fn dim(&self) -> usize {
        self.components.len()
    }

    fn capabilities(&self) -> Capabilities {
        let passthrough = Capabilities::NONE.with(Capability::Density).with(Capability::Inverse);
        self.components
            .iter()
            .fold(passthrough, |caps, c| caps.intersection(c.capabilities()))
            .with(Capability::Moment)
            .with(Capability::Recurrence)
    }

    fn roots(&self) -> BTreeSet<DistId> {
        self.components.iter().flat_map(|c| c.roots()).collect()
    }

    fn marginals(&self) -> Vec<Arc<dyn Distribution>> {
        self.components.clone()
    }

    fn bound(&self, x: &DMatrix<f64>) -> Result<(DMatrix<f64>, DMatrix<f64>)> {
        let mut lower = DMatrix::zeros(x.nrows(), x.ncols());
        let mut upper = DMatrix::zeros(x.nrows(), x.ncols());
        for (i, component) in self.components.iter().enumerate() {
            let (lo, up) = evaluate_bound(component.as_ref(), &x.rows(i, 1).into_owned())?;
            lower.row_mut(i).copy_from(&lo);
            upper.row_mut(i).copy_from(&up);
        }
        Ok((lower, upper))
    }

    fn forward(&self, x: &DMatrix<f64>) -> Result<DMatrix<f64>> {
        self.per_row(x, |c, row| evaluate_forward(c, row))
    }

    fn density(&self, x: &DMatrix<f64>) -> Result<DMatrix<f64>> {
        require_independent(&self.components, "joint density")?;
        let config = DensityConfig::default();
        self.per_row(x, |c, row| evaluate_density(c, row, &config))
    }

    fn inverse(&self, q: &DMatrix<f64>) -> Result<DMatrix<f64>> {
        require_independent(&self.components, "joint inverse")?;
        let config = InverseConfig::default();
        self.per_row(q, |c, row| evaluate_inverse(c, row, &config))
    }

    fn moment(&self, k: &[u32], ctx: &mut dyn EvaluationContext) -> Result<f64> {
        let active: Vec<Arc<dyn Distribution>> = self
            .components
            .iter()
            .zip(k)
            .filter(|&(_, &e)| e > 0)
            .map(|(c, _)| c.clone())
            .collect();
        require_independent(&active, "mixed moment")?;
        let mut product = 1.0;
        for (component, &e) in self.components.iter().zip(k) {
            if e > 0 {
                product *= ctx.moment(component.as_ref(), &[e])?;
            }
        }
        Ok(product)
    }

    fn recurrence(
        &self,
        k: &[u32],
        ctx: &mut dyn EvaluationContext,
    ) -> Result<(Vec<f64>, Vec<f64>)> {
        let mut alpha = Vec::with_capacity(k.len());
        let mut beta = Vec::with_capacity(k.len());
        for (component, &order) in self.components.iter().zip(k) {
            let (a, b) = ctx.recurrence(component.as_ref(), &[order])?;
            alpha.push(a[0]);
            beta.push(b[0]);
        }
        Ok((alpha, beta))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::Evaluator;
    use crate::gamma::Gamma;
    use crate::normal::Normal;
    use crate::transforms::Affine;
    use crate::uniform::Uniform;
    use approx::assert_relative_eq;

    fn unit() -> Result<Arc<dyn Distribution>> {
        Ok(Arc::new(Uniform::standard()))
    }

    #[test]
    fn test_bounds_and_forward_stack_rows() {
        let j = Joint::new(vec![unit().unwrap(), Arc::new(Uniform::new(-1.0, 1.0).unwrap())]).unwrap();
        assert_eq!(j.dim(), 2);
        let x = DMatrix::from_row_slice(2, 2, &[0.25, 0.5, 0.0, 0.5]);
        let (lo, up) = j.bound(&x).unwrap();
        assert_eq!((lo[(1, 0)], up[(1, 1)]), (-1.0, 1.0));
        let f = j.forward(&x).unwrap();
        assert_eq!(f.as_slice(), &[0.25, 0.5, 0.5, 0.75]);
    }

    #[test]
    fn test_capabilities_follow_components() {
        let all = Joint::iid(3, unit).unwrap();
        assert!(all.capabilities().contains(Capability::Inverse));
        let mixed = Joint::new(vec![unit().unwrap(), Arc::new(Gamma::new(2.0, 1.0).unwrap())]).unwrap();
        assert!(!mixed.capabilities().contains(Capability::Inverse));
        assert!(mixed.capabilities().contains(Capability::Density));
        assert!(mixed.capabilities().contains(Capability::Moment));
    }

    #[test]
    fn test_iid_components_are_distinct_variables() {
        let j = Joint::iid(2, unit).unwrap();
        assert_eq!(j.roots().len(), 2);
        assert!(j.density(&DMatrix::from_element(2, 1, 0.5)).is_ok());
    }

    #[test]
    fn test_mixed_moment_of_independent_components() {
        let j = Joint::new(vec![unit().unwrap(), Arc::new(Normal::new(2.0, 1.0).unwrap())]).unwrap();
        let mut ev = Evaluator::default();
        // E[U] E[N^2] = 0.5 * 5
        assert_relative_eq!(ev.moment_of(&j, &[1, 2]).unwrap(), 2.5);
        let (a, b) = ev.recurrence_of(&j, &[1, 1]).unwrap();
        assert_eq!(a, vec![0.5, 2.0]);
        assert_relative_eq!(b[0], 1.0 / 12.0, epsilon = 1e-15);
    }

    #[test]
    fn test_dependent_components() {
        let u = unit().unwrap();
        let v: Arc<dyn Distribution> = Arc::new(Affine::new(u.clone(), 1.0, 1.0).unwrap());
        let j = Joint::new(vec![u, v]).unwrap();
        assert!(matches!(j.density(&DMatrix::from_element(2, 1, 0.5)), Err(Error::Dependency(_))));
        let mut ev = Evaluator::default();
        assert!(matches!(ev.moment_of(&j, &[1, 1]), Err(Error::Dependency(_))));
        // Only one component involved: no mixing, no dependency.
        assert_relative_eq!(ev.moment_of(&j, &[0, 1]).unwrap(), 1.5);
    }

    #[test]
    fn test_rejects_empty_and_multivariate_components() {
        assert!(Joint::new(Vec::new()).is_err());
        let inner: Arc<dyn Distribution> = Arc::new(Joint::iid(2, unit).unwrap());
        assert!(matches!(Joint::new(vec![inner]), Err(Error::Validation(_))));
    }
}
