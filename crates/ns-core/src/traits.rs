//! Core traits: the distribution hook set and the recursive evaluation seam
//!
//! A distribution only supplies analytical hooks. Everything else (clipping
//! to bounds, shape checks, numerical fallbacks, memoization) lives in the
//! evaluation engine, which depends on these traits and not on concrete
//! distribution types.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use nalgebra::DMatrix;

use crate::types::{DistId, Params};
use crate::{Error, Result};

/// Optional hook a distribution may implement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Analytical probability density
    Density,
    /// Analytical inverse (quantile) transform
    Inverse,
    /// Analytical raw moments
    Moment,
    /// Analytical three-term recurrence coefficients
    Recurrence,
}

impl Capability {
    const fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

/// Set of optional hooks declared by a distribution.
///
/// `bound` and `forward` are not part of the set: they are required trait
/// methods and always present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities(u8);

impl Capabilities {
    /// Only the mandatory hooks.
    pub const NONE: Self = Self(0);

    /// Every optional hook.
    pub const ALL: Self = Self(0b1111);

    /// Add a capability.
    pub const fn with(self, cap: Capability) -> Self {
        Self(self.0 | cap.bit())
    }

    /// Remove a capability.
    pub const fn without(self, cap: Capability) -> Self {
        Self(self.0 & !cap.bit())
    }

    /// `true` if `cap` is declared.
    pub const fn contains(self, cap: Capability) -> bool {
        self.0 & cap.bit() != 0
    }

    /// Capabilities declared by both sets.
    pub const fn intersection(self, other: Self) -> Self {
        Self(self.0 & other.0)
    }
}

/// Evaluation hooks of a probability distribution.
///
/// Batches are `(dim, n)` matrices: row `i` holds the coordinates of
/// dimension `i`, one column per sample. Every hook returns per-dimension
/// values with the same shape as its input.
pub trait Distribution: fmt::Debug + Send + Sync {
    /// Distribution family name (e.g. `"Normal"`).
    fn name(&self) -> &str;

    /// Identity of this instance.
    fn id(&self) -> DistId;

    /// Declared parameters.
    fn params(&self) -> &Params;

    /// Number of dimensions. Fixed at construction.
    fn dim(&self) -> usize {
        1
    }

    /// Optional hooks implemented analytically.
    fn capabilities(&self) -> Capabilities {
        Capabilities::NONE
    }

    /// Identities of the elementary random variables this distribution is
    /// built from. Elementary distributions return their own id.
    fn roots(&self) -> BTreeSet<DistId> {
        BTreeSet::from([self.id()])
    }

    /// One distribution per dimension, for composite multivariate
    /// distributions. Empty for univariate and non-separable ones.
    fn marginals(&self) -> Vec<Arc<dyn Distribution>> {
        Vec::new()
    }

    /// Lower and upper support bounds at `x`.
    fn bound(&self, x: &DMatrix<f64>) -> Result<(DMatrix<f64>, DMatrix<f64>)>;

    /// Forward (Rosenblatt) transform at `x`.
    fn forward(&self, x: &DMatrix<f64>) -> Result<DMatrix<f64>>;

    /// Per-dimension density at `x`.
    fn density(&self, _x: &DMatrix<f64>) -> Result<DMatrix<f64>> {
        Err(missing_hook(self.name(), "density"))
    }

    /// Inverse transform at `q`.
    fn inverse(&self, _q: &DMatrix<f64>) -> Result<DMatrix<f64>> {
        Err(missing_hook(self.name(), "inverse"))
    }

    /// Raw moment with exponents `k` (one per dimension).
    ///
    /// Composite distributions request sub-moments through `ctx` so they are
    /// memoized for the duration of the top-level call.
    fn moment(&self, _k: &[u32], _ctx: &mut dyn EvaluationContext) -> Result<f64> {
        Err(missing_hook(self.name(), "moment"))
    }

    /// Recurrence coefficients `(alpha, beta)` of order `k` (one order and one
    /// coefficient pair per dimension).
    fn recurrence(
        &self,
        _k: &[u32],
        _ctx: &mut dyn EvaluationContext,
    ) -> Result<(Vec<f64>, Vec<f64>)> {
        Err(missing_hook(self.name(), "recurrence"))
    }
}

/// Callback used by composite distributions to evaluate their parts.
///
/// Implemented by the evaluation engine, which owns the per-call cache and the
/// numerical fallback settings.
pub trait EvaluationContext {
    /// Raw moment of `dist` (analytical or approximated).
    fn moment(&mut self, dist: &dyn Distribution, k: &[u32]) -> Result<f64>;

    /// Recurrence coefficients of `dist` (analytical or discretized).
    fn recurrence(&mut self, dist: &dyn Distribution, k: &[u32]) -> Result<(Vec<f64>, Vec<f64>)>;
}

/// Error for a hook a distribution does not provide.
pub fn missing_hook(name: &str, hook: &str) -> Error {
    Error::NotImplemented(format!("{name} does not provide the `{hook}` hook"))
}

impl<'a> fmt::Display for dyn Distribution + 'a {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name())?;
        for (i, (k, v)) in self.params().iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{k}={v}")?;
        }
        write!(f, ")")
    }
}
