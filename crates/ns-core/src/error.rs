//! Error types for the distribution and quadrature crates

use thiserror::Error;

/// Error type shared by every evaluation and quadrature routine.
#[derive(Error, Debug)]
pub enum Error {
    /// Precondition violation (bad input values, shapes or parameters)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Operation is illegal because components share a source of randomness
    #[error("Stochastically dependent: {0}")]
    Dependency(String),

    /// Computation error (degenerate numerics, singular systems)
    #[error("Computation error: {0}")]
    Computation(String),

    /// Not implemented for this distribution (missing capability, no fallback)
    #[error("Not implemented: {0}")]
    NotImplemented(String),

    /// Request would exceed a hard resource ceiling
    #[error("Resource exhausted: {0}")]
    ResourceExhausted(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_carries_kind_and_message() {
        let e = Error::Dependency("cdf on J(U, U+1)".into());
        assert_eq!(e.to_string(), "Stochastically dependent: cdf on J(U, U+1)");
        let e = Error::ResourceExhausted("too large sets".into());
        assert!(e.to_string().starts_with("Resource exhausted"));
    }
}
