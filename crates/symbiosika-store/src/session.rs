//! Chat-session facade: session ID → chat ID, forgotten after idling.
//!
//! A session is stored as an engine entry whose value is [`ChatSession`];
//! the session's `lastUsed` is the entry's access time.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::schema::SessionsConfig;
use crate::engine::{Lookup, TtlStore};
use crate::error::StoreError;
use crate::types::{Deletion, Operation, SessionLookup, SessionStored};
use crate::utils::{self, DEFAULT_LIFETIME_MINUTES};

/// The value half of a session entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSession {
    pub chat_id: String,
}

/// Remembers which remote chat belongs to which workflow session.
///
/// Clones share the same engine.
#[derive(Clone)]
pub struct SessionStore {
    engine: Arc<TtlStore<ChatSession>>,
    default_duration_minutes: f64,
}

impl SessionStore {
    /// A store with its own, empty engine.
    pub fn new() -> Self {
        Self::with_engine(Arc::new(TtlStore::new()))
    }

    /// Wrap an existing engine.
    pub fn with_engine(engine: Arc<TtlStore<ChatSession>>) -> Self {
        Self {
            engine,
            default_duration_minutes: DEFAULT_LIFETIME_MINUTES,
        }
    }

    /// Build from the `sessions` section of the config.
    pub fn from_config(config: &SessionsConfig) -> Self {
        Self::new().with_default_duration(config.default_duration_minutes)
    }

    /// Duration for callers that have none of their own.
    pub fn with_default_duration(mut self, minutes: f64) -> Self {
        self.default_duration_minutes = minutes;
        self
    }

    pub fn default_duration_minutes(&self) -> f64 {
        self.default_duration_minutes
    }

    /// The underlying engine.
    pub fn engine(&self) -> &TtlStore<ChatSession> {
        &self.engine
    }

    /// Bind `chat_id` to `session_id`, replacing any previous binding.
    pub fn store_session(
        &self,
        session_id: &str,
        chat_id: &str,
        now: DateTime<Utc>,
    ) -> Result<SessionStored, StoreError> {
        utils::require_identifier(session_id, "session ID")?;
        if chat_id.is_empty() {
            return Err(StoreError::MissingChatId);
        }

        let session = ChatSession {
            chat_id: chat_id.to_string(),
        };
        self.engine.put(session_id, session, now)?;
        debug!(session = %session_id, chat = %chat_id, "stored chat session");

        Ok(SessionStored {
            operation: Operation::Stored,
            chat_id: chat_id.to_string(),
        })
    }

    /// Look up the chat bound to `session_id`.
    ///
    /// A hit refreshes the session's `lastUsed`. A session idle for
    /// `duration_minutes` or longer is removed and reported as expired; a
    /// zero or negative duration expires any stored session.
    pub fn get_session(
        &self,
        session_id: &str,
        duration_minutes: f64,
        now: DateTime<Utc>,
    ) -> Result<SessionLookup, StoreError> {
        utils::require_identifier(session_id, "session ID")?;
        let ttl = utils::duration(duration_minutes)?;

        let lookup = match self.engine.get(session_id, ttl, now) {
            Lookup::Found(entry) => SessionLookup {
                operation: Operation::Retrieved,
                chat_id: Some(entry.value.chat_id),
                last_used: Some(entry.last_accessed_at),
                valid: true,
            },
            Lookup::Expired => SessionLookup::miss(Operation::Expired),
            Lookup::NotFound => SessionLookup::miss(Operation::NotFound),
        };
        debug!(session = %session_id, operation = lookup.operation.as_str(), "looked up chat session");
        Ok(lookup)
    }

    /// Forget `session_id`.
    pub fn delete_session(&self, session_id: &str) -> Result<Deletion, StoreError> {
        utils::require_identifier(session_id, "session ID")?;
        Ok(Deletion::new(self.engine.delete(session_id)))
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    fn t0() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-03-10T08:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn test_store_and_get() {
        let store = SessionStore::new();
        let stored = store.store_session("s-1", "chat-9", t0()).unwrap();
        assert_eq!(stored.operation, Operation::Stored);
        assert_eq!(stored.chat_id, "chat-9");

        let later = t0() + TimeDelta::minutes(1);
        let lookup = store.get_session("s-1", 60.0, later).unwrap();
        assert_eq!(lookup.operation, Operation::Retrieved);
        assert_eq!(lookup.chat_id.as_deref(), Some("chat-9"));
        assert_eq!(lookup.last_used, Some(later));
        assert!(lookup.valid);
    }

    #[test]
    fn test_unknown_session_not_found() {
        let store = SessionStore::new();
        let lookup = store.get_session("ghost", 60.0, t0()).unwrap();
        assert_eq!(lookup.operation, Operation::NotFound);
        assert!(!lookup.valid);
        assert!(lookup.chat_id.is_none());
    }

    #[test]
    fn test_expired_session() {
        let store = SessionStore::new();
        store.store_session("s-1", "chat-9", t0()).unwrap();

        let lookup = store
            .get_session("s-1", 5.0, t0() + TimeDelta::seconds(301))
            .unwrap();
        assert_eq!(lookup.operation, Operation::Expired);
        assert!(!lookup.valid);
        assert!(lookup.chat_id.is_none());
        assert!(store.engine().is_empty());

        let again = store
            .get_session("s-1", 5.0, t0() + TimeDelta::seconds(302))
            .unwrap();
        assert_eq!(again.operation, Operation::NotFound);
    }

    #[test]
    fn test_just_inside_duration_is_retrieved() {
        let store = SessionStore::new();
        store.store_session("s-1", "chat-9", t0()).unwrap();

        let lookup = store
            .get_session("s-1", 5.0, t0() + TimeDelta::seconds(299))
            .unwrap();
        assert_eq!(lookup.operation, Operation::Retrieved);
    }

    #[test]
    fn test_lookup_leaves_other_sessions_alone() {
        let store = SessionStore::new();
        store.store_session("s-1", "chat-9", t0()).unwrap();
        store.store_session("s-2", "chat-8", t0()).unwrap();

        let lookup = store
            .get_session("s-1", 5.0, t0() + TimeDelta::minutes(6))
            .unwrap();
        assert_eq!(lookup.operation, Operation::Expired);
        assert!(store.engine().contains_key("s-2"));
    }

    #[test]
    fn test_overwrite_rebinds_chat() {
        let store = SessionStore::new();
        store.store_session("s-1", "chat-a", t0()).unwrap();
        store.store_session("s-1", "chat-b", t0()).unwrap();

        let lookup = store.get_session("s-1", 60.0, t0()).unwrap();
        assert_eq!(lookup.chat_id.as_deref(), Some("chat-b"));
    }

    #[test]
    fn test_zero_duration_expires_session() {
        let store = SessionStore::new();
        store.store_session("s-1", "chat-9", t0()).unwrap();

        let lookup = store
            .get_session("s-1", 0.0, t0() + TimeDelta::minutes(1))
            .unwrap();
        assert_eq!(lookup.operation, Operation::Expired);
        assert!(!lookup.valid);
    }

    #[test]
    fn test_negative_duration_expires_session() {
        let store = SessionStore::new();
        store.store_session("s-1", "chat-9", t0()).unwrap();

        let lookup = store.get_session("s-1", -5.0, t0()).unwrap();
        assert_eq!(lookup.operation, Operation::Expired);
    }

    #[test]
    fn test_delete_session() {
        let store = SessionStore::new();
        store.store_session("s-1", "chat-9", t0()).unwrap();

        assert!(store.delete_session("s-1").unwrap().existed);
        assert!(!store.delete_session("s-1").unwrap().existed);
    }

    #[test]
    fn test_missing_identifiers() {
        let store = SessionStore::new();
        assert_eq!(
            store.store_session("", "chat", t0()),
            Err(StoreError::MissingIdentifier { field: "session ID" })
        );
        assert_eq!(store.store_session("s", "", t0()), Err(StoreError::MissingChatId));
        assert!(store.get_session("", 60.0, t0()).is_err());
        assert!(store.delete_session("").is_err());
    }

    #[test]
    fn test_nan_duration_rejected() {
        let store = SessionStore::new();
        assert!(matches!(
            store.get_session("s", f64::NAN, t0()),
            Err(StoreError::InvalidDuration(_))
        ));
    }

    #[test]
    fn test_clones_share_engine() {
        let a = SessionStore::new();
        let b = a.clone();
        a.store_session("s-1", "chat-9", t0()).unwrap();
        assert!(b.get_session("s-1", 60.0, t0()).unwrap().valid);
    }
}
