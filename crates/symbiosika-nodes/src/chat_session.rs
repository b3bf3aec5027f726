//! Chat-session store node.
//!
//! Operations: `storeSession`, `getSession`, `deleteSession`.
//! Output items are the input data with `sessionId` and the result merged in.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use symbiosika_store::{Clock, SessionStore};

use crate::base::{self, Node, NodeItem};

pub struct ChatSessionStoreNode {
    sessions: SessionStore,
    clock: Arc<dyn Clock>,
}

impl ChatSessionStoreNode {
    pub fn new(sessions: SessionStore, clock: Arc<dyn Clock>) -> Self {
        Self { sessions, clock }
    }

    /// Chat ID from the parameter, else from the incoming data.
    ///
    /// Numeric IDs are rendered as text; empty, zero, `false` and `null`
    /// count as missing.
    fn chat_id(item: &NodeItem) -> String {
        base::truthy_text(&item.params, "chatId")
            .or_else(|| base::truthy_text(&item.json, "chatId"))
            .unwrap_or_default()
    }
}

#[async_trait]
impl Node for ChatSessionStoreNode {
    fn name(&self) -> &str {
        "symbiosikaChatSessionStore"
    }

    fn description(&self) -> &str {
        "Store and manage Symbiosika chat sessions"
    }

    fn operations(&self) -> &[&'static str] {
        &["storeSession", "getSession", "deleteSession"]
    }

    async fn execute_item(&self, operation: &str, item: &NodeItem) -> anyhow::Result<Value> {
        let session_id = base::string_or_empty(&item.params, "sessionId");
        let now = self.clock.now();

        let mut out = item.json.clone();
        out.insert("sessionId".into(), Value::String(session_id.clone()));

        match operation {
            "storeSession" => {
                let chat_id = Self::chat_id(item);
                let record = self.sessions.store_session(&session_id, &chat_id, now)?;
                base::merge_record(&mut out, &record)?;
            }
            "getSession" => {
                let duration = base::f64_or(
                    &item.params,
                    "sessionDuration",
                    self.sessions.default_duration_minutes(),
                );
                let record = self.sessions.get_session(&session_id, duration, now)?;
                base::merge_record(&mut out, &record)?;
            }
            "deleteSession" => {
                let record = self.sessions.delete_session(&session_id)?;
                base::merge_record(&mut out, &record)?;
            }
            other => anyhow::bail!("Unknown operation: {other}"),
        }

        debug!(session = %session_id, operation, "chat session node item done");
        Ok(Value::Object(out))
    }
}
