//! Error kinds surfaced by the prover core.
//!
//! Configuration problems are detected at construction, before any clause
//! flows. Input problems (bad symbol declarations) surface as `User` errors.
//! `Internal` marks an invariant violation; debug builds assert instead.
//! Resource exhaustion is not an error: it is reported through
//! [`TerminationReason`](crate::statistics::TerminationReason).

use thiserror::Error;

/// Fatal errors raised by the prover core.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid option value or option combination.
    #[error("configuration error: {0}")]
    Config(String),

    /// Bad input, e.g. a symbol redeclared with a different arity.
    #[error("input error: {0}")]
    User(String),

    /// Core invariant violation (store mismatch, index/container disagreement).
    #[error("internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;
