//! Stochastic dependency tracking between components of a multivariate
//! distribution.
//!
//! Two components are dependent when they are built from a common elementary
//! random variable, i.e. when their root sets intersect.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use ns_core::{Distribution, DistId, Error, Result};

/// Identities of elementary variables shared by more than one component.
pub fn get_dependencies(components: &[Arc<dyn Distribution>]) -> BTreeSet<DistId> {
    let mut counts: BTreeMap<DistId, usize> = BTreeMap::new();
    for component in components {
        for root in component.roots() {
            *counts.entry(root).or_default() += 1;
        }
    }
    counts.into_iter().filter(|&(_, n)| n > 1).map(|(id, _)| id).collect()
}

/// `true` if no elementary variable is shared between components.
pub fn is_independent(components: &[Arc<dyn Distribution>]) -> bool {
    get_dependencies(components).is_empty()
}

/// Fail with [`Error::Dependency`] if the components share randomness.
pub fn require_independent(components: &[Arc<dyn Distribution>], operation: &str) -> Result<()> {
    let shared = get_dependencies(components);
    if shared.is_empty() {
        return Ok(());
    }
    let ids: Vec<String> = shared.iter().map(|id| id.to_string()).collect();
    Err(Error::Dependency(format!(
        "{} requires independent components, but variables {} are shared",
        operation,
        ids.join(", ")
    )))
}

/// Check that a distribution of dimension > 1 splits into independent
/// marginals. Univariate distributions always pass.
pub fn require_independent_dims<D: Distribution + ?Sized>(dist: &D, operation: &str) -> Result<()> {
    if dist.dim() <= 1 {
        return Ok(());
    }
    let marginals = dist.marginals();
    if marginals.len() != dist.dim() {
        return Err(Error::NotImplemented(format!(
            "{} of {} needs one marginal per dimension",
            operation,
            dist.name()
        )));
    }
    require_independent(&marginals, operation)
}
