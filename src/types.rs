//! Request-facing types: validated keys and the release flag.
//!
//! Both types exist so that malformed input is rejected before any directory
//! or lock interaction. A [`Key`] can only be obtained through [`Key::parse`],
//! and a [`ReleaseFlag`] only through [`ReleaseFlag::parse`], so every store
//! operation starts from already-validated input.

use crate::error::{Error, Result};
use std::fmt;

/// A validated store key.
///
/// Keys are non-empty strings free of the reserved `'/'` separator.
/// Validation is a pure function of the candidate string: it has no side
/// effects and is independent of directory state.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Key(String);

impl Key {
    /// Validate a candidate key.
    ///
    /// # Errors
    ///
    /// - [`Error::KeyMissing`] if the candidate is empty
    /// - [`Error::KeyInvalid`] if the candidate contains `'/'`
    pub fn parse(candidate: &str) -> Result<Self> {
        if candidate.is_empty() {
            return Err(Error::KeyMissing);
        }
        if candidate.contains('/') {
            return Err(Error::KeyInvalid);
        }
        Ok(Key(candidate.to_string()))
    }

    /// The key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Whether an authorized update releases the lock after writing.
///
/// The flag is tri-state on the wire (`"true"`, `"false"`, absent) but only
/// the two boolean literals are accepted; anything else fails parsing before
/// the store is touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseFlag {
    /// Write the value, then release the lock and wake one waiter.
    Release,
    /// Write the value and keep holding the lock.
    Keep,
}

impl ReleaseFlag {
    /// Parse the raw release parameter.
    ///
    /// Only the literal strings `"true"` and `"false"` are accepted. An
    /// absent parameter or any other value is a malformed request.
    pub fn parse(raw: Option<&str>) -> Result<Self> {
        match raw {
            Some("true") => Ok(ReleaseFlag::Release),
            Some("false") => Ok(ReleaseFlag::Keep),
            Some(other) => Err(Error::MalformedRequest(format!(
                "release must be 'true' or 'false', got {other:?}"
            ))),
            None => Err(Error::MalformedRequest(
                "missing release parameter".to_string(),
            )),
        }
    }
}
