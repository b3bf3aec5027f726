//! Generic key-value facade: typed values that expire after idling.
//!
//! Raw text goes through [`coerce`] first. A value that coerces to nothing
//! deletes the key instead of being stored.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::config::schema::ValuesConfig;
use crate::engine::{Lookup, TtlStore};
use crate::error::StoreError;
use crate::types::{Deletion, Operation, ValueLookup, ValueStored};
use crate::utils::{self, DEFAULT_LIFETIME_MINUTES};
use crate::value::{coerce, StoredValue, ValueType};

/// Key → [`StoredValue`] store with idle expiry. Clones share the same engine.
#[derive(Clone)]
pub struct ValueStore {
    engine: Arc<TtlStore<StoredValue>>,
    default_lifetime_minutes: f64,
}

impl ValueStore {
    pub fn new() -> Self {
        Self::with_engine(Arc::new(TtlStore::new()))
    }

    pub fn with_engine(engine: Arc<TtlStore<StoredValue>>) -> Self {
        Self {
            engine,
            default_lifetime_minutes: DEFAULT_LIFETIME_MINUTES,
        }
    }

    /// Build from the `values` section of the config.
    pub fn from_config(config: &ValuesConfig) -> Self {
        Self::new().with_default_lifetime(config.default_lifetime_minutes)
    }

    /// Lifetime used when a caller passes zero or negative minutes.
    pub fn with_default_lifetime(mut self, minutes: f64) -> Self {
        self.default_lifetime_minutes = minutes;
        self
    }

    pub fn default_lifetime_minutes(&self) -> f64 {
        self.default_lifetime_minutes
    }

    pub fn engine(&self) -> &TtlStore<StoredValue> {
        &self.engine
    }

    /// Coerce `raw` to `declared` and store it under `key`.
    ///
    /// Entries idle longer than `lifetime_minutes` are swept first. If the
    /// value coerces to nothing, `key` is deleted and the result is
    /// [`Operation::Dropped`].
    pub fn store_value(
        &self,
        key: &str,
        raw: Option<&str>,
        declared: ValueType,
        lifetime_minutes: f64,
        now: DateTime<Utc>,
    ) -> Result<ValueStored, StoreError> {
        utils::require_identifier(key, "key")?;
        let ttl = utils::lifetime(lifetime_minutes, self.default_lifetime_minutes)?;

        self.engine.sweep(ttl, now);

        match coerce(raw, declared) {
            Some(value) => {
                self.engine.put(key, value.clone(), now)?;
                debug!(key = %key, kind = value.kind().as_str(), "stored value");
                Ok(ValueStored {
                    operation: Operation::Stored,
                    value: Some(value),
                })
            }
            None => {
                let existed = self.engine.delete(key);
                debug!(key = %key, declared = declared.as_str(), existed, "dropped value");
                Ok(ValueStored {
                    operation: Operation::Dropped,
                    value: None,
                })
            }
        }
    }

    /// Read `key` if it has been used within `lifetime_minutes`.
    pub fn get_value(
        &self,
        key: &str,
        lifetime_minutes: f64,
        now: DateTime<Utc>,
    ) -> Result<ValueLookup, StoreError> {
        utils::require_identifier(key, "key")?;
        let ttl = utils::lifetime(lifetime_minutes, self.default_lifetime_minutes)?;

        self.engine.sweep(ttl, now);

        let lookup = match self.engine.get(key, ttl, now) {
            Lookup::Found(entry) => ValueLookup {
                operation: Operation::Retrieved,
                value: Some(entry.value),
                exists: true,
            },
            Lookup::Expired => ValueLookup {
                operation: Operation::Expired,
                value: None,
                exists: false,
            },
            Lookup::NotFound => ValueLookup {
                operation: Operation::NotFound,
                value: None,
                exists: false,
            },
        };
        Ok(lookup)
    }

    /// Remove `key`, after sweeping entries idle past the default lifetime.
    pub fn delete_value(&self, key: &str, now: DateTime<Utc>) -> Result<Deletion, StoreError> {
        utils::require_identifier(key, "key")?;
        let ttl = utils::lifetime(self.default_lifetime_minutes, DEFAULT_LIFETIME_MINUTES)?;

        self.engine.sweep(ttl, now);

        Ok(Deletion::new(self.engine.delete(key)))
    }
}

impl Default for ValueStore {
    fn default() -> Self {
        Self::new()
    }
}
