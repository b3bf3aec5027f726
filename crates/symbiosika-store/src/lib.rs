//! Symbiosika Store: ephemeral in-process key-value storage with idle expiry.
//!
//! This crate contains:
//! - **value**: coercion of raw text + declared type into a typed [`StoredValue`]
//! - **engine**: the concurrent [`TtlStore`] with lazy expiry and sweeping
//! - **session** / **kv**: the chat-session and generic key-value facades
//! - **config**: lifetime defaults loaded from `~/.symbiosika/config.json`
//!
//! # Usage
//! ```
//! use chrono::Utc;
//! use symbiosika_store::{ValueStore, ValueType};
//!
//! let store = ValueStore::new();
//! let now = Utc::now();
//! let stored = store.store_value("answer", Some("42"), ValueType::Auto, 60.0, now).unwrap();
//! assert_eq!(stored.operation.as_str(), "stored");
//!
//! let lookup = store.get_value("answer", 60.0, now).unwrap();
//! assert!(lookup.exists);
//! ```

pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod kv;
pub mod session;
pub mod types;
pub mod utils;
pub mod value;

pub use clock::{Clock, ManualClock, SystemClock};
pub use engine::{Entry, Lookup, TtlStore};
pub use error::StoreError;
pub use kv::ValueStore;
pub use session::{ChatSession, SessionStore};
pub use types::{Deletion, Operation, SessionLookup, SessionStored, ValueLookup, ValueStored};
pub use value::{coerce, StoredValue, ValueType};
