//! Convenient imports for lockstore.
//!
//! Re-exports the most commonly used types so you can get started with a
//! single import:
//!
//! ```
//! use lockstore::prelude::*;
//!
//! let store = Store::new();
//! let key = Key::parse("job")?;
//! let token = store.put(&key, "queued")?;
//! store.update(&key, &token, "running", ReleaseFlag::Release)?;
//! # Ok::<(), Error>(())
//! ```

// Main entry point
pub use crate::store::{Reservation, Store};

// Error handling
pub use crate::error::{Error, Result};

// Request-facing types
pub use crate::token::LockToken;
pub use crate::types::{Key, ReleaseFlag};
