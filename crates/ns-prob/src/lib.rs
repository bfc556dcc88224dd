//! # ns-prob
//!
//! Probability distributions behind one evaluation protocol, plus the
//! numerical machinery that consumes it:
//! - base distributions declaring which hooks they implement analytically
//! - composite builders ([`Affine`], [`Joint`]) with dependency tracking
//! - an evaluation engine with numerical fallbacks for every optional hook
//! - unit-hypercube sampling rules and quadrature, including Leja sequences
//!
//! Most callers go through [`DistributionExt`]:
//!
//! ```
//! use nalgebra::DMatrix;
//! use ns_prob::{DistributionExt, Normal};
//!
//! let n = Normal::new(0.0, 1.0).unwrap();
//! let q = n.fwd(&DMatrix::from_element(1, 1, 0.0)).unwrap();
//! assert!((q[0] - 0.5).abs() < 1e-12);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod approximation;
pub mod beta;
pub mod dependencies;
pub mod distributions;
pub mod evaluation;
pub mod exponential;
pub mod ext;
pub mod gamma;
pub mod joint;
pub mod kumaraswamy;
pub mod lognormal;
pub mod math;
pub mod normal;
pub mod quadrature;
pub mod sampler;
pub mod transforms;
pub mod uniform;
pub mod weibull;

pub use approximation::{DensityConfig, InverseConfig, MomentConfig, RecurrenceConfig};
pub use beta::Beta;
pub use dependencies::{get_dependencies, is_independent};
pub use evaluation::Evaluator;
pub use exponential::Exponential;
pub use ext::DistributionExt;
pub use gamma::Gamma;
pub use joint::Joint;
pub use kumaraswamy::Kumaraswamy;
pub use lognormal::LogNormal;
pub use normal::Normal;
pub use quadrature::{
    LejaConfig, QuadratureConfig, QuadratureKind, RecurrenceAlgorithm, combine, combine_quadrature,
    generate_quadrature, leja_quadrature,
};
pub use sampler::{SampleConfig, SamplingRule};
pub use transforms::Affine;
pub use uniform::Uniform;
pub use weibull::Weibull;
