//! Unified error types for lockstore.
//!
//! A single crate-wide error enum covers input validation, lookup failures,
//! authorization failures, and the one internal failure mode (entropy).
//! Errors are always returned to the immediate caller: nothing in this crate
//! retries internally or downgrades an error to a sentinel success.

use thiserror::Error;

/// All lockstore errors.
///
/// Validation errors ([`KeyMissing`](Error::KeyMissing),
/// [`KeyInvalid`](Error::KeyInvalid), [`MalformedRequest`](Error::MalformedRequest))
/// are detected before any lock interaction. [`Unauthorized`](Error::Unauthorized)
/// is a terminal rejection, not a retryable or blocking condition.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// No key was supplied.
    #[error("key is missing")]
    KeyMissing,

    /// The key contains the reserved separator character.
    #[error("key must not contain '/'")]
    KeyInvalid,

    /// The key has never been written.
    #[error("not found: {0}")]
    NotFound(String),

    /// The presented token does not match the entry's current lock token.
    #[error("unauthorized: lock token mismatch")]
    Unauthorized,

    /// The request is structurally invalid (missing token, missing or
    /// non-boolean release flag). Rejected before any state is touched.
    #[error("malformed request: {0}")]
    MalformedRequest(String),

    /// The secure random source failed. The acquisition attempt is aborted;
    /// no token is issued in a degraded form.
    #[error("entropy source failure: {0}")]
    Entropy(String),
}

/// Result type for lockstore operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Check if this is a not-found error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }

    /// Check if this is an authorization failure.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Error::Unauthorized)
    }

    /// Check if this is a malformed request.
    pub fn is_malformed(&self) -> bool {
        matches!(self, Error::MalformedRequest(_))
    }

    /// Check if this is an input-validation error, detected before any
    /// directory or lock interaction.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::KeyMissing | Error::KeyInvalid | Error::MalformedRequest(_)
        )
    }
}
