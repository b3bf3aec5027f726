//! Node trait: the interface every workflow store node implements.
//!
//! A node receives one `operation` and a batch of items. Each item carries
//! the incoming JSON data and that item's node parameters; each produces one
//! output JSON object.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

// ─────────────────────────────────────────────
// Request types
// ─────────────────────────────────────────────

/// One input item: the data flowing in plus the parameters resolved for it.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeItem {
    #[serde(default)]
    pub json: Map<String, Value>,
    #[serde(default)]
    pub params: Map<String, Value>,
}

impl NodeItem {
    /// An item with parameters and no input data.
    pub fn with_params(params: Map<String, Value>) -> Self {
        Self {
            json: Map::new(),
            params,
        }
    }
}

/// A single node execution.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeRequest {
    pub operation: String,
    #[serde(default)]
    pub items: Vec<NodeItem>,
    /// Turn per-item failures into `{error}` items instead of failing the run.
    #[serde(default)]
    pub continue_on_fail: bool,
}

// ─────────────────────────────────────────────
// Node trait
// ─────────────────────────────────────────────

#[async_trait]
pub trait Node: Send + Sync {
    /// Unique node type name (e.g. `"symbiosikaKeyValueStore"`).
    fn name(&self) -> &str;

    /// Human-readable description.
    fn description(&self) -> &str;

    /// Operation names this node accepts.
    fn operations(&self) -> &[&'static str];

    /// Run `operation` for one item.
    async fn execute_item(&self, operation: &str, item: &NodeItem) -> anyhow::Result<Value>;

    /// Run the request over every item, in order.
    ///
    /// An unknown operation fails the whole run. A failing item either fails
    /// the run or, with `continue_on_fail`, becomes the item's input data plus
    /// an `error` field.
    async fn execute(&self, request: NodeRequest) -> anyhow::Result<Vec<Value>> {
        if !self.operations().contains(&request.operation.as_str()) {
            anyhow::bail!(
                "The operation \"{}\" is not supported by {}",
                request.operation,
                self.name()
            );
        }

        let mut output = Vec::with_capacity(request.items.len());
        for (index, item) in request.items.iter().enumerate() {
            match self.execute_item(&request.operation, item).await {
                Ok(value) => output.push(value),
                Err(e) if request.continue_on_fail => {
                    warn!(node = self.name(), item = index, error = %e, "item failed, continuing");
                    output.push(error_item(item, &e));
                }
                Err(e) => return Err(e.context(format!("{} failed on item {index}", self.name()))),
            }
        }
        Ok(output)
    }
}

// ─────────────────────────────────────────────
// Param helpers
// ─────────────────────────────────────────────

/// Extract an optional `String` param.
pub fn optional_string(params: &Map<String, Value>, key: &str) -> Option<String> {
    params.get(key).and_then(|v| v.as_str()).map(|s| s.to_string())
}

/// Extract a string param, or `""` if absent or not a string.
pub fn string_or_empty(params: &Map<String, Value>, key: &str) -> String {
    optional_string(params, key).unwrap_or_default()
}

/// Extract a number param, accepting numeric strings, with a default.
pub fn f64_or(params: &Map<String, Value>, key: &str, default: f64) -> f64 {
    match params.get(key) {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(default),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(default),
        _ => default,
    }
}

/// Render a param as text. Non-string JSON values become their JSON text;
/// `null` and missing become `None`.
pub fn param_text(params: &Map<String, Value>, key: &str) -> Option<String> {
    match params.get(key)? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Render a param as text only if it is truthy: a non-empty string, a
/// non-zero number, `true`, or any array or object.
pub fn truthy_text(params: &Map<String, Value>, key: &str) -> Option<String> {
    match params.get(key)? {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Flatten a serializable result record into `target`.
pub fn merge_record<T: Serialize>(target: &mut Map<String, Value>, record: &T) -> anyhow::Result<()> {
    match serde_json::to_value(record)? {
        Value::Object(fields) => {
            target.extend(fields);
            Ok(())
        }
        other => anyhow::bail!("expected a JSON object, got {other}"),
    }
}

/// The output item for a failed input item.
pub fn error_item(item: &NodeItem, error: &anyhow::Error) -> Value {
    let mut out = item.json.clone();
    out.insert("error".into(), Value::String(error.to_string()));
    Value::Object(out)
}
