//! Node registry: dispatches node executions by node type name.
//!
//! The composition root builds one registry around one set of stores, so
//! every execution routed through it shares the same process-wide state.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tracing::{info, warn};

use symbiosika_store::{Clock, SessionStore, ValueStore};

use crate::base::{Node, NodeRequest};
use crate::chat_session::ChatSessionStoreNode;
use crate::key_value::KeyValueStoreNode;

/// Stores nodes keyed by name and dispatches executions.
pub struct NodeRegistry {
    nodes: HashMap<String, Arc<dyn Node>>,
}

impl NodeRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
        }
    }

    /// A registry with both store nodes wired to the given stores.
    pub fn with_store_nodes(
        sessions: SessionStore,
        values: ValueStore,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(ChatSessionStoreNode::new(sessions, clock.clone())));
        registry.register(Arc::new(KeyValueStoreNode::new(values, clock)));
        registry
    }

    /// Register a node. Overwrites any previous node with the same name.
    pub fn register(&mut self, node: Arc<dyn Node>) {
        info!(node = node.name(), "registered node");
        self.nodes.insert(node.name().to_string(), node);
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Node>> {
        self.nodes.get(name)
    }

    pub fn has(&self, name: &str) -> bool {
        self.nodes.contains_key(name)
    }

    /// Names of all registered nodes, sorted for determinism.
    pub fn node_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.nodes.keys().cloned().collect();
        names.sort();
        names
    }

    /// Execute a node by name.
    pub async fn execute(&self, name: &str, request: NodeRequest) -> anyhow::Result<Vec<Value>> {
        let Some(node) = self.nodes.get(name) else {
            warn!(node = name, "node not found");
            anyhow::bail!("Node '{name}' not found");
        };
        node.execute(request).await
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl Default for NodeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use symbiosika_store::SystemClock;

    use crate::base::NodeItem;

    fn registry() -> NodeRegistry {
        NodeRegistry::with_store_nodes(SessionStore::new(), ValueStore::new(), Arc::new(SystemClock))
    }

    #[test]
    fn test_store_nodes_registered() {
        let reg = registry();
        assert_eq!(reg.len(), 2);
        assert_eq!(
            reg.node_names(),
            vec!["symbiosikaChatSessionStore", "symbiosikaKeyValueStore"]
        );
        assert!(reg.has("symbiosikaKeyValueStore"));
        assert!(reg.get("nope").is_none());
    }

    #[tokio::test]
    async fn test_execute_unknown_node() {
        let reg = registry();
        let req = NodeRequest {
            operation: "getValue".into(),
            items: vec![],
            continue_on_fail: false,
        };
        let err = reg.execute("missing", req).await.unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[tokio::test]
    async fn test_executions_share_state() {
        let reg = registry();
        let item = |params: serde_json::Value| {
            NodeItem::with_params(params.as_object().cloned().unwrap())
        };

        reg.execute(
            "symbiosikaKeyValueStore",
            NodeRequest {
                operation: "storeValue".into(),
                items: vec![item(json!({"key": "k", "value": "hello"}))],
                continue_on_fail: false,
            },
        )
        .await
        .unwrap();

        let out = reg
            .execute(
                "symbiosikaKeyValueStore",
                NodeRequest {
                    operation: "getValue".into(),
                    items: vec![item(json!({"key": "k"}))],
                    continue_on_fail: false,
                },
            )
            .await
            .unwrap();
        assert_eq!(out[0]["value"], "hello");
    }

    #[test]
    fn test_default() {
        assert!(NodeRegistry::default().is_empty());
    }
}
