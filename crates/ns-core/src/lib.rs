//! # ns-core
//!
//! Shared types for the distribution evaluation crates: the error type, the
//! distribution hook trait and its capability set, identities, parameters,
//! the per-call evaluation cache and the quadrature rule container.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod traits;
pub mod types;

pub use error::{Error, Result};
pub use traits::{Capabilities, Capability, Distribution, EvaluationContext, missing_hook};
pub use types::{DistId, EvaluationCache, ParamValue, Params, QuadratureRule, RequestKind};
