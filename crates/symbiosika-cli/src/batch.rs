//! Batch runner: executes JSON-lines node invocations against one registry.
//!
//! Each non-empty line is an object such as:
//! `{"node": "kv", "operation": "storeValue", "params": {"key": "a", "value": "1"}}`
//! or with an explicit `"items": [{"json": {...}, "params": {...}}]` list.
//! Lines starting with `#` are comments.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::{debug, warn};

use symbiosika_nodes::{NodeItem, NodeRegistry, NodeRequest};

use crate::helpers;

/// One line of a batch file.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BatchLine {
    node: String,
    operation: String,
    #[serde(default)]
    items: Vec<NodeItem>,
    /// Shorthand for a single item with these params.
    #[serde(default)]
    params: Option<Map<String, Value>>,
    #[serde(default)]
    continue_on_fail: Option<bool>,
}

impl BatchLine {
    fn into_request(self, continue_on_fail: bool) -> (String, NodeRequest) {
        let mut items = self.items;
        if let Some(params) = self.params {
            items.push(NodeItem::with_params(params));
        }
        let request = NodeRequest {
            operation: self.operation,
            items,
            continue_on_fail: self.continue_on_fail.unwrap_or(continue_on_fail),
        };
        (helpers::resolve_node_name(&self.node), request)
    }
}

/// Counts reported after a batch run.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub lines: usize,
    pub failed: usize,
}

/// Run every line of `path`, writing output items as JSON lines to `out`.
///
/// A line that fails is reported as `{"line": n, "error": "..."}` and the run
/// continues, so later lines still see the state earlier lines left behind.
pub async fn run(
    registry: &NodeRegistry,
    path: &Path,
    continue_on_fail: bool,
    out: &mut impl Write,
) -> Result<BatchSummary> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read batch file: {}", path.display()))?;

    let mut summary = BatchSummary::default();
    for (index, line) in content.lines().enumerate() {
        let line_no = index + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        summary.lines += 1;

        match run_line(registry, trimmed, continue_on_fail).await {
            Ok(outputs) => {
                debug!(line = line_no, items = outputs.len(), "batch line done");
                for value in outputs {
                    writeln!(out, "{value}")?;
                }
            }
            Err(e) => {
                warn!(line = line_no, error = %e, "batch line failed");
                summary.failed += 1;
                writeln!(out, "{}", json!({"line": line_no, "error": format!("{e:#}")}))?;
            }
        }
    }
    Ok(summary)
}

async fn run_line(registry: &NodeRegistry, line: &str, continue_on_fail: bool) -> Result<Vec<Value>> {
    let parsed: BatchLine = serde_json::from_str(line).context("invalid batch line")?;
    let (node, request) = parsed.into_request(continue_on_fail);
    registry.execute(&node, request).await
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
