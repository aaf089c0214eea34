//! The directory and per-entry lock lifecycle.
//!
//! ## Design
//!
//! Two collaborating pieces:
//!
//! - **Directory**: `RwLock<HashMap<String, Arc<Entry>>>`. All structural
//!   access (lookup, lazy creation) goes through the write guard. The shared
//!   form is deliberately unused for now; it is left for future read-only
//!   traffic.
//! - **Entry**: per-key slot (value + current token) behind its own mutex,
//!   paired with a condvar that wakes exactly one blocked acquirer per
//!   release. Token presence *is* the lock state: `token.is_some()` iff the
//!   entry is locked.
//!
//! ## Guard discipline
//!
//! The directory guard is never held across a blocking entry wait. Every
//! operation clones the `Arc<Entry>` out under the directory guard, drops
//! the guard, and only then blocks on the entry itself. A busy key therefore
//! never stalls unrelated keys, and the holder of *this* key can complete
//! its release without touching the directory at all.
//!
//! ## Accepted limitation
//!
//! Acquisition waits forever. A holder that never releases (for example a
//! caller that crashed after acquiring) permanently starves that key; there
//! is no lease, timeout, or force-release in the protocol.

use crate::error::{Error, Result};
use crate::token::LockToken;
use crate::types::{Key, ReleaseFlag};
use parking_lot::{Condvar, Mutex, MutexGuard, RwLock};
use std::collections::HashMap;
use std::sync::Arc;

/// Value and lock state for one key. Guarded by the owning entry's mutex.
struct Slot {
    /// Latest written bytes; latest write wins.
    value: Vec<u8>,
    /// Present iff the entry is currently locked.
    token: Option<LockToken>,
}

/// Per-key record: the slot plus the wait side of the exclusivity primitive.
struct Entry {
    slot: Mutex<Slot>,
    /// Signalled once per release, waking exactly one blocked acquirer.
    freed: Condvar,
}

impl Entry {
    fn new() -> Self {
        Entry {
            slot: Mutex::new(Slot {
                value: Vec::new(),
                token: None,
            }),
            freed: Condvar::new(),
        }
    }

    /// Block until the entry is unlocked, then lock it with a fresh token.
    ///
    /// Returns the token together with the slot guard so the caller can read
    /// or overwrite the value atomically with the acquisition. The directory
    /// guard must not be held when this is called.
    fn acquire(&self) -> Result<(LockToken, MutexGuard<'_, Slot>)> {
        let mut slot = self.slot.lock();
        while slot.token.is_some() {
            self.freed.wait(&mut slot);
        }
        let token = match LockToken::generate() {
            Ok(token) => token,
            Err(e) => {
                // Hand the wakeup to the next waiter instead of stranding it.
                self.freed.notify_one();
                return Err(e);
            }
        };
        slot.token = Some(token.clone());
        Ok((token, slot))
    }
}

/// What a successful reservation returns: proof of ownership plus the value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reservation {
    /// Fresh token proving ownership of the key's lock.
    pub token: LockToken,
    /// The value at the moment of acquisition.
    pub value: Vec<u8>,
}

/// In-process key/value store with exclusive, revocable per-key locks.
///
/// Every key carries a lock: [`put`](Store::put) and
/// [`reserve`](Store::reserve) block until they own it and return a fresh
/// [`LockToken`]; [`update`](Store::update) requires presenting the current
/// token and optionally releases the lock, waking one blocked acquirer.
///
/// Operations on distinct keys never block each other. Operations on the
/// same key are totally ordered by successful acquisition.
///
/// # Example
///
/// ```
/// use lockstore::{Key, ReleaseFlag, Store};
///
/// let store = Store::new();
/// let key = Key::parse("job:42")?;
///
/// let token = store.put(&key, "pending")?;
/// store.update(&key, &token, "done", ReleaseFlag::Release)?;
///
/// let reservation = store.reserve(&key)?;
/// assert_eq!(reservation.value, b"done");
/// # Ok::<(), lockstore::Error>(())
/// ```
pub struct Store {
    /// The key → entry mapping behind the directory-wide guard.
    directory: RwLock<HashMap<String, Arc<Entry>>>,
}

impl Store {
    /// Create an empty store.
    pub fn new() -> Self {
        Store {
            directory: RwLock::new(HashMap::new()),
        }
    }

    /// Create an empty store with pre-allocated capacity for `capacity` keys.
    pub fn with_capacity(capacity: usize) -> Self {
        Store {
            directory: RwLock::new(HashMap::with_capacity(capacity)),
        }
    }

    /// Run `f` with exclusive access to the directory mapping.
    ///
    /// The guard is released on every exit path, including unwinding, and is
    /// dropped before the caller does anything that can block on an entry.
    fn with_directory<R>(&self, f: impl FnOnce(&mut HashMap<String, Arc<Entry>>) -> R) -> R {
        let mut directory = self.directory.write();
        f(&mut directory)
    }

    /// Number of keys ever written. Entries are never deleted.
    pub fn len(&self) -> usize {
        self.with_directory(|directory| directory.len())
    }

    /// Whether no key has ever been written.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Write-and-acquire: locate or create the key's entry, acquire its
    /// lock, overwrite the value, and return the new token.
    ///
    /// Creation and first acquisition are atomic with respect to racing
    /// creators: the directory guard serializes insertion, so both racers
    /// observe the same entry and its lock picks a single winner.
    ///
    /// Blocks indefinitely while another caller holds the key's lock.
    pub fn put(&self, key: &Key, value: impl Into<Vec<u8>>) -> Result<LockToken> {
        let entry = self.with_directory(|directory| {
            let entry = directory
                .entry(key.as_str().to_string())
                .or_insert_with(|| {
                    tracing::debug!(key = %key, "creating entry");
                    Arc::new(Entry::new())
                });
            Arc::clone(entry)
        });
        // Directory guard released; only the entry itself may block now.
        let (token, mut slot) = entry.acquire()?;
        slot.value = value.into();
        tracing::debug!(key = %key, "acquired lock via put");
        Ok(token)
    }

    /// Acquire-and-read: block until the key's lock is owned, then return
    /// the token together with the current value.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] if the key has never been written. No entry is
    /// created as a side effect of a failed reservation.
    pub fn reserve(&self, key: &Key) -> Result<Reservation> {
        let entry = self
            .with_directory(|directory| directory.get(key.as_str()).cloned())
            .ok_or_else(|| Error::NotFound(key.to_string()))?;
        let (token, slot) = entry.acquire()?;
        tracing::debug!(key = %key, "acquired lock via reserve");
        Ok(Reservation {
            token,
            value: slot.value.clone(),
        })
    }

    /// Authorized write-or-release: overwrite the value of a held lock and,
    /// when `release` is [`ReleaseFlag::Release`], clear the token and wake
    /// one blocked acquirer.
    ///
    /// The value is written before any release, so a releasing update is
    /// still a write.
    ///
    /// # Errors
    ///
    /// - [`Error::NotFound`] if the key has never been written
    /// - [`Error::Unauthorized`] if the entry is unlocked or the presented
    ///   token does not match; the value and token are left unchanged
    pub fn update(
        &self,
        key: &Key,
        token: &LockToken,
        value: impl Into<Vec<u8>>,
        release: ReleaseFlag,
    ) -> Result<()> {
        let entry = self
            .with_directory(|directory| directory.get(key.as_str()).cloned())
            .ok_or_else(|| Error::NotFound(key.to_string()))?;
        let mut slot = entry.slot.lock();
        if slot.token.as_ref() != Some(token) {
            tracing::debug!(key = %key, "rejected update: token mismatch");
            return Err(Error::Unauthorized);
        }
        slot.value = value.into();
        if release == ReleaseFlag::Release {
            slot.token = None;
            entry.freed.notify_one();
            tracing::debug!(key = %key, "released lock");
        }
        Ok(())
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}
