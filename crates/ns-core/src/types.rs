//! Common data types shared by distributions, engines and quadrature rules

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use nalgebra::{DMatrix, DVector};

use crate::{Error, Result};

/// Identity of a distribution instance.
///
/// Elementary distributions use their own id as the identity of the random
/// variable they represent; composite distributions report the ids of the
/// elementary variables they were built from (see `Distribution::roots`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DistId(u64);

impl DistId {
    /// Allocate a fresh, process-unique identity.
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw numeric value (stable for the lifetime of the process).
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for DistId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Value of a named distribution parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    /// Scalar parameter
    Scalar(f64),
    /// Array parameter (e.g. per-axis values)
    Array(Vec<f64>),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Scalar(v) => write!(f, "{v}"),
            ParamValue::Array(vs) => {
                write!(f, "[")?;
                for (i, v) in vs.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{v}")?;
                }
                write!(f, "]")
            }
        }
    }
}

/// Immutable mapping of parameter name to value, sorted by name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params(BTreeMap<String, ParamValue>);

impl Params {
    /// Empty parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insertion of a scalar parameter.
    pub fn scalar(mut self, name: impl Into<String>, value: f64) -> Self {
        self.0.insert(name.into(), ParamValue::Scalar(value));
        self
    }

    /// Builder-style insertion of an array parameter.
    pub fn array(mut self, name: impl Into<String>, values: Vec<f64>) -> Self {
        self.0.insert(name.into(), ParamValue::Array(values));
        self
    }

    /// Look up a parameter.
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.0.get(name)
    }

    /// Look up a scalar parameter.
    pub fn get_scalar(&self, name: &str) -> Option<f64> {
        match self.0.get(name) {
            Some(ParamValue::Scalar(v)) => Some(*v),
            _ => None,
        }
    }

    /// Iterate `(name, value)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of parameters.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// `true` if no parameters are set.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Kind of memoized request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    /// Raw moment `E[prod x_i^k_i]`
    Moment,
    /// Three-term recurrence coefficients of order `k`
    Recurrence,
}

#[derive(Debug, Clone, PartialEq)]
enum CachedValue {
    Moment(f64),
    Recurrence(Vec<f64>, Vec<f64>),
}

/// Per-call memo of moments and recurrence coefficients.
///
/// Keyed by `(distribution identity, request kind, index tuple)`. One cache is
/// created per top-level `mom`/`ttr` call and dropped when the call returns.
#[derive(Debug, Default)]
pub struct EvaluationCache {
    entries: HashMap<(DistId, RequestKind, Vec<u32>), CachedValue>,
    hits: usize,
}

impl EvaluationCache {
    /// Empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached raw moment, if present.
    pub fn moment(&mut self, id: DistId, k: &[u32]) -> Option<f64> {
        match self.entries.get(&(id, RequestKind::Moment, k.to_vec())) {
            Some(CachedValue::Moment(v)) => {
                self.hits += 1;
                Some(*v)
            }
            _ => None,
        }
    }

    /// Store a raw moment.
    pub fn insert_moment(&mut self, id: DistId, k: &[u32], value: f64) {
        self.entries.insert((id, RequestKind::Moment, k.to_vec()), CachedValue::Moment(value));
    }

    /// Cached recurrence coefficients `(alpha, beta)`, if present.
    pub fn recurrence(&mut self, id: DistId, k: &[u32]) -> Option<(Vec<f64>, Vec<f64>)> {
        match self.entries.get(&(id, RequestKind::Recurrence, k.to_vec())) {
            Some(CachedValue::Recurrence(a, b)) => {
                self.hits += 1;
                Some((a.clone(), b.clone()))
            }
            _ => None,
        }
    }

    /// Store recurrence coefficients.
    pub fn insert_recurrence(&mut self, id: DistId, k: &[u32], alpha: Vec<f64>, beta: Vec<f64>) {
        self.entries
            .insert((id, RequestKind::Recurrence, k.to_vec()), CachedValue::Recurrence(alpha, beta));
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` if nothing has been stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of lookups answered from the cache.
    pub fn hits(&self) -> usize {
        self.hits
    }
}

/// Quadrature rule: `abscissas` shaped `(dim, N)` and `weights` shaped `(N,)`.
///
/// Weights sum to (approximately) one for probability measures and may be
/// negative for high-order interpolatory rules.
#[derive(Debug, Clone, PartialEq)]
pub struct QuadratureRule {
    /// Nodes, one column per node
    pub abscissas: DMatrix<f64>,
    /// Weights, one per node
    pub weights: DVector<f64>,
}

impl QuadratureRule {
    /// Create a rule, checking `abscissas.ncols() == weights.len()`.
    pub fn new(abscissas: DMatrix<f64>, weights: DVector<f64>) -> Result<Self> {
        if abscissas.ncols() != weights.len() {
            return Err(Error::Validation(format!(
                "quadrature shape mismatch: {} abscissas vs {} weights",
                abscissas.ncols(),
                weights.len()
            )));
        }
        Ok(Self { abscissas, weights })
    }

    /// Univariate rule from node and weight vectors.
    pub fn univariate(nodes: Vec<f64>, weights: Vec<f64>) -> Result<Self> {
        let n = nodes.len();
        Self::new(DMatrix::from_row_slice(1, n, &nodes), DVector::from_vec(weights))
    }

    /// Number of dimensions.
    pub fn dim(&self) -> usize {
        self.abscissas.nrows()
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    /// `true` if the rule has no nodes.
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Nodes of a univariate rule (first row).
    pub fn nodes(&self) -> Vec<f64> {
        if self.abscissas.nrows() == 0 {
            return Vec::new();
        }
        self.abscissas.row(0).iter().copied().collect()
    }

    /// Sum of the weights.
    pub fn total_weight(&self) -> f64 {
        self.weights.sum()
    }

    /// Apply the rule to `f`, called once per node with that node's coordinates.
    pub fn integrate<F: Fn(&[f64]) -> f64>(&self, f: F) -> f64 {
        let mut point = vec![0.0; self.dim()];
        let mut acc = 0.0;
        for (j, w) in self.weights.iter().enumerate() {
            for (i, p) in point.iter_mut().enumerate() {
                *p = self.abscissas[(i, j)];
            }
            acc += w * f(&point);
        }
        acc
    }
}
