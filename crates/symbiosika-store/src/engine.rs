//! TTL store engine: a concurrent map with idle-time expiry.
//!
//! Every entry remembers when it was last read or written. Expiry is lazy:
//! nothing runs in the background. A `get` judges freshness against the TTL
//! its caller passes *now*, and `sweep` removes everything idle longer than
//! the age its caller passes. The TTL is never stored with the entry.
//!
//! Per-key operations are atomic (they hold the shard lock of the key);
//! nothing is atomic across keys.

use chrono::{DateTime, TimeDelta, Utc};
use dashmap::mapref::entry::Entry as Slot;
use dashmap::DashMap;
use tracing::debug;

use crate::error::StoreError;

// ─────────────────────────────────────────────
// Entry
// ─────────────────────────────────────────────

/// A stored value with its timestamps.
#[derive(Clone, Debug, PartialEq)]
pub struct Entry<V> {
    pub key: String,
    pub value: V,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Last successful read or write. Never moves backwards.
    pub last_accessed_at: DateTime<Utc>,
}

impl<V> Entry<V> {
    fn new(key: &str, value: V, now: DateTime<Utc>) -> Self {
        Self {
            key: key.to_string(),
            value,
            created_at: now,
            updated_at: now,
            last_accessed_at: now,
        }
    }

    /// Idle for strictly less than `ttl` at `now`.
    pub fn is_fresh(&self, ttl: TimeDelta, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(self.last_accessed_at) < ttl
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        if now > self.last_accessed_at {
            self.last_accessed_at = now;
        }
    }
}

/// Outcome of [`TtlStore::get`].
#[derive(Clone, Debug, PartialEq)]
pub enum Lookup<V> {
    /// Fresh entry; its access time has been refreshed.
    Found(Entry<V>),
    /// The entry was past its TTL and has been removed.
    Expired,
    NotFound,
}

impl<V> Lookup<V> {
    pub fn is_found(&self) -> bool {
        matches!(self, Lookup::Found(_))
    }

    /// The value if found, discarding timestamps.
    pub fn into_value(self) -> Option<V> {
        match self {
            Lookup::Found(entry) => Some(entry.value),
            _ => None,
        }
    }
}

// ─────────────────────────────────────────────
// TtlStore
// ─────────────────────────────────────────────

/// Concurrent key → [`Entry`] map with lazy, caller-driven expiry.
///
/// Unbounded: entries only leave through `delete`, an expired `get`, or `sweep`.
pub struct TtlStore<V> {
    entries: DashMap<String, Entry<V>>,
}

impl<V: Clone> TtlStore<V> {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Insert or overwrite `key`.
    ///
    /// On overwrite `created_at` is kept, `updated_at` becomes `now`, and the
    /// access time moves to `now` unless it is already later.
    pub fn put(&self, key: &str, value: V, now: DateTime<Utc>) -> Result<Entry<V>, StoreError> {
        if key.is_empty() {
            return Err(StoreError::InvalidKey);
        }

        let entry = match self.entries.entry(key.to_string()) {
            Slot::Occupied(mut slot) => {
                let entry = slot.get_mut();
                entry.value = value;
                entry.updated_at = now;
                entry.touch(now);
                entry.clone()
            }
            Slot::Vacant(slot) => slot.insert(Entry::new(key, value, now)).value().clone(),
        };

        debug!(key = %key, "stored entry");
        Ok(entry)
    }

    /// Read `key` if it has been idle for less than `ttl`.
    ///
    /// A fresh read refreshes the access time. A stale entry is removed and
    /// reported as [`Lookup::Expired`].
    pub fn get(&self, key: &str, ttl: TimeDelta, now: DateTime<Utc>) -> Lookup<V> {
        loop {
            let Some(mut slot) = self.entries.get_mut(key) else {
                return Lookup::NotFound;
            };

            if slot.is_fresh(ttl, now) {
                slot.touch(now);
                return Lookup::Found(slot.value().clone());
            }
            drop(slot);

            // Re-check under the lock: a concurrent put may have refreshed
            // or replaced it, in which case look again.
            if self
                .entries
                .remove_if(key, |_, entry| !entry.is_fresh(ttl, now))
                .is_some()
            {
                debug!(key = %key, "entry expired on read");
                return Lookup::Expired;
            }
        }
    }

    /// Remove `key`. Returns whether it was present.
    pub fn delete(&self, key: &str) -> bool {
        let existed = self.entries.remove(key).is_some();
        if existed {
            debug!(key = %key, "deleted entry");
        }
        existed
    }

    /// Remove every entry last accessed before `now - max_age`.
    ///
    /// Returns the number of entries removed.
    pub fn sweep(&self, max_age: TimeDelta, now: DateTime<Utc>) -> usize {
        let Some(cutoff) = now.checked_sub_signed(max_age) else {
            return 0;
        };

        let mut removed = 0;
        self.entries.retain(|_, entry| {
            let keep = entry.last_accessed_at >= cutoff;
            if !keep {
                removed += 1;
            }
            keep
        });

        if removed > 0 {
            debug!(removed, remaining = self.entries.len(), "swept idle entries");
        }
        removed
    }

    /// Snapshot of `key` without refreshing or expiring it.
    pub fn peek(&self, key: &str) -> Option<Entry<V>> {
        self.entries.get(key).map(|slot| slot.value().clone())
    }

    /// Whether `key` is present, regardless of age.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// All keys, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.entries.iter().map(|slot| slot.key().clone()).collect();
        keys.sort();
        keys
    }

    /// Number of entries, including ones nobody has noticed are stale yet.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V: Clone> Default for TtlStore<V> {
    fn default() -> Self {
        Self::new()
    }
}
