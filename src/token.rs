//! Lock tokens and their generator.
//!
//! A token proves current ownership of an entry's lock. Tokens are drawn
//! from the OS entropy source, never a counter or hash, so they cannot be
//! guessed by a party that has not acquired the lock.

use crate::error::{Error, Result};
use rand::rngs::OsRng;
use rand::RngCore;
use std::fmt;

/// Entropy bytes per token. Hex rendering doubles this to 32 characters.
pub const TOKEN_LEN: usize = 16;

/// Opaque proof of lock ownership.
///
/// Compared by equality only; a fresh token is generated on every
/// acquisition and a released token never authorizes anything again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockToken(String);

impl LockToken {
    /// Generate a fresh token from the OS entropy source.
    ///
    /// Entropy failure aborts the acquisition with [`Error::Entropy`]; a
    /// weak or empty token is never issued in its place.
    pub(crate) fn generate() -> Result<Self> {
        let mut buf = [0u8; TOKEN_LEN];
        OsRng
            .try_fill_bytes(&mut buf)
            .map_err(|e| Error::Entropy(e.to_string()))?;
        Ok(LockToken(hex::encode(buf)))
    }

    /// Take a token presented by a caller.
    ///
    /// An authorized call without a token is a malformed request, detected
    /// before any state is touched. The token text itself is opaque: a
    /// non-matching value is an authorization failure later, not a parse
    /// failure here.
    pub fn from_presented(raw: Option<&str>) -> Result<Self> {
        match raw {
            Some(raw) => Ok(LockToken(raw.to_string())),
            None => Err(Error::MalformedRequest("missing lock token".to_string())),
        }
    }

    /// The token as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LockToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
