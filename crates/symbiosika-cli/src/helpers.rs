//! Shared CLI helpers for node aliases and terminal output.

use std::path::{Path, PathBuf};

use anyhow::Result;
use colored::Colorize;
use serde_json::Value;

/// Short names accepted wherever a node name is expected.
const NODE_ALIASES: &[(&str, &str)] = &[
    ("session", "symbiosikaChatSessionStore"),
    ("sessions", "symbiosikaChatSessionStore"),
    ("kv", "symbiosikaKeyValueStore"),
    ("value", "symbiosikaKeyValueStore"),
    ("values", "symbiosikaKeyValueStore"),
];

/// Expand `~` at the start of a path to the user's home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs_next::home_dir() {
            return home.join(rest);
        }
    }
    if path == "~" {
        if let Some(home) = dirs_next::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}

/// Map an alias to its node type name; unknown names pass through.
pub fn resolve_node_name(name: &str) -> String {
    let lower = name.to_lowercase();
    NODE_ALIASES
        .iter()
        .find(|(alias, _)| *alias == lower)
        .map(|(_, full)| full.to_string())
        .unwrap_or_else(|| name.to_string())
}

/// Print node output items, one pretty JSON object each.
pub fn print_outputs(outputs: &[Value]) {
    println!();
    for out in outputs {
        let text = serde_json::to_string_pretty(out).unwrap_or_else(|_| out.to_string());
        if out.get("error").is_some() {
            println!("{}", text.red());
        } else {
            println!("{}", text.green());
        }
    }
    println!();
}

/// Print the banner shown at REPL start.
pub fn print_banner() {
    let version = env!("CARGO_PKG_VERSION");
    println!();
    println!("{}  v{}", "Symbiosika store".cyan().bold(), version.dimmed());
    println!(
        "{}",
        "Usage: <node> <operation> name=value ...  (\"help\" for examples, \"exit\" to quit)"
            .dimmed()
    );
    println!();
}

/// Print usage examples for the REPL.
pub fn print_help() {
    println!();
    println!("{}", "Nodes: session (symbiosikaChatSessionStore), kv (symbiosikaKeyValueStore)".bold());
    println!("  session storeSession sessionId=s1 chatId=c1");
    println!("  session getSession sessionId=s1 sessionDuration=30");
    println!("  session deleteSession sessionId=s1");
    println!("  kv storeValue key=count value=42 valueType=auto valueLifetime=60");
    println!("  kv getValue key=count");
    println!("  kv deleteValue key=count");
    println!();
}

/// Print the config file location and the effective configuration.
pub fn print_config(path: &Path, config: &symbiosika_store::config::Config) -> Result<()> {
    let state = if path.exists() { "found" } else { "not found, defaults" };
    println!("{} {} ({})", "Config:".bold(), path.display(), state.dimmed());
    println!("{}", serde_json::to_string_pretty(config)?);
    Ok(())
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expand_tilde_home() {
        let result = expand_tilde("~/jobs.jsonl");
        assert!(result.ends_with("jobs.jsonl"));
        assert!(!result.starts_with("~"));
    }

    #[test]
    fn expand_tilde_no_tilde() {
        assert_eq!(expand_tilde("/absolute/path"), PathBuf::from("/absolute/path"));
        assert_eq!(expand_tilde("relative/path"), PathBuf::from("relative/path"));
    }

    #[test]
    fn aliases_resolve() {
        assert_eq!(resolve_node_name("kv"), "symbiosikaKeyValueStore");
        assert_eq!(resolve_node_name("Session"), "symbiosikaChatSessionStore");
        assert_eq!(resolve_node_name("somethingElse"), "somethingElse");
    }
}
