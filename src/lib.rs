//! # lockstore
//!
//! In-process key/value store in which every key carries an exclusive,
//! revocable lock. A holder must present a matching [`LockToken`] to mutate
//! or release a value, and a second party may block until the current holder
//! releases it.
//!
//! ## Quick Start
//!
//! ```
//! use lockstore::{Key, ReleaseFlag, Store};
//!
//! let store = Store::new();
//! let key = Key::parse("session")?;
//!
//! // Write-and-acquire: creates the key and locks it.
//! let token = store.put(&key, "alice")?;
//!
//! // Authorized write, then release the lock.
//! store.update(&key, &token, "alice:active", ReleaseFlag::Release)?;
//!
//! // Acquire-and-read: blocks until the lock is free, returns a fresh token.
//! let reservation = store.reserve(&key)?;
//! assert_eq!(reservation.value, b"alice:active");
//! assert_ne!(reservation.token, token);
//! # Ok::<(), lockstore::Error>(())
//! ```
//!
//! ## Guarantees
//!
//! - **Mutual exclusion**: at most one caller holds a key's lock at a time.
//! - **Token freshness**: every acquisition issues a new unguessable token;
//!   a released token never authorizes anything again.
//! - **Independence**: a busy key never blocks operations on other keys.
//!
//! Acquisition waits forever by default; a holder that never releases
//! permanently starves that key. See [`Store`] for details.

#![warn(missing_docs)]

mod error;
mod store;
mod token;
mod types;

pub mod prelude;

// Re-export main entry points
pub use store::{Reservation, Store};

// Error handling
pub use error::{Error, Result};

// Re-export types
pub use token::{LockToken, TOKEN_LEN};
pub use types::{Key, ReleaseFlag};
