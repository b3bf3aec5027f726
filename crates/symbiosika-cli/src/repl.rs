//! Interactive REPL for driving the store nodes by hand.
//!
//! Uses `rustyline` for readline-style editing with persistent history.
//! Each line is `<node> <operation> name=value ...`; values may be quoted
//! with double quotes to include spaces.

use anyhow::Result;
use rustyline::config::Configurer;
use rustyline::history::DefaultHistory;
use rustyline::{DefaultEditor, Editor};
use serde_json::{Map, Value};
use tracing::debug;

use symbiosika_nodes::{NodeItem, NodeRegistry, NodeRequest};

use crate::helpers;

/// Exit commands (case-insensitive match).
const EXIT_COMMANDS: &[&str] = &["exit", "quit", "/exit", "/quit", ":q"];

/// A parsed REPL line.
#[derive(Debug, PartialEq)]
struct Command {
    node: String,
    operation: String,
    params: Map<String, Value>,
}

/// Run the interactive REPL loop.
pub async fn run(registry: NodeRegistry) -> Result<()> {
    helpers::print_banner();

    let mut editor = create_editor()?;

    loop {
        let input = match editor.readline("> ") {
            Ok(line) => line,
            Err(rustyline::error::ReadlineError::Interrupted) => break,
            Err(rustyline::error::ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("Input error: {e}");
                break;
            }
        };

        let trimmed = input.trim();
        if trimmed.is_empty() {
            continue;
        }

        if is_exit_command(trimmed) {
            println!("\nGoodbye!");
            break;
        }

        let _ = editor.add_history_entry(&input);

        match trimmed.to_lowercase().as_str() {
            "help" | "?" => {
                helpers::print_help();
                continue;
            }
            "nodes" => {
                for name in registry.node_names() {
                    println!("  {name}");
                }
                continue;
            }
            _ => {}
        }

        let command = match parse_command(trimmed) {
            Ok(command) => command,
            Err(e) => {
                eprintln!("\n❌ {e}\n");
                continue;
            }
        };

        debug!(node = %command.node, operation = %command.operation, "running node");
        let request = NodeRequest {
            operation: command.operation,
            items: vec![NodeItem::with_params(command.params)],
            continue_on_fail: false,
        };

        match registry.execute(&command.node, request).await {
            Ok(outputs) => helpers::print_outputs(&outputs),
            Err(e) => eprintln!("\n❌ Error: {e:#}\n"),
        }
    }

    save_history(&mut editor);

    Ok(())
}

/// Parse `<node> <operation> name=value ...` into a command.
fn parse_command(line: &str) -> Result<Command> {
    let mut tokens = tokenize(line)?.into_iter();
    let (Some(node), Some(operation)) = (tokens.next(), tokens.next()) else {
        anyhow::bail!("expected: <node> <operation> name=value ...");
    };

    let mut params = Map::new();
    for token in tokens {
        let Some((name, value)) = token.split_once('=') else {
            anyhow::bail!("parameter '{token}' is not of the form name=value");
        };
        if name.is_empty() {
            anyhow::bail!("parameter '{token}' has an empty name");
        }
        params.insert(name.to_string(), Value::String(value.to_string()));
    }

    Ok(Command {
        node: helpers::resolve_node_name(&node),
        operation,
        params,
    })
}

/// Split on whitespace, keeping double-quoted runs together.
fn tokenize(line: &str) -> Result<Vec<String>> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut has_token = false;

    for c in line.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                has_token = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if has_token {
                    tokens.push(std::mem::take(&mut current));
                    has_token = false;
                }
            }
            c => {
                current.push(c);
                has_token = true;
            }
        }
    }

    if in_quotes {
        anyhow::bail!("unterminated quote");
    }
    if has_token {
        tokens.push(current);
    }
    Ok(tokens)
}

/// Create a rustyline editor with history.
fn create_editor() -> Result<Editor<(), DefaultHistory>> {
    let mut editor = DefaultEditor::new()?;
    editor.set_max_history_size(1000)?;

    let history_path = history_path();
    if history_path.exists() {
        let _ = editor.load_history(&history_path);
        debug!("loaded REPL history from {}", history_path.display());
    }

    Ok(editor)
}

/// Save history to disk.
fn save_history(editor: &mut Editor<(), DefaultHistory>) {
    let path = history_path();
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    if let Err(e) = editor.save_history(&path) {
        debug!("failed to save history: {e}");
    }
}

/// Path to the history file.
fn history_path() -> std::path::PathBuf {
    symbiosika_store::utils::get_data_path()
        .join("history")
        .join("cli_history")
}

/// Check if input is an exit command.
fn is_exit_command(input: &str) -> bool {
    let lower = input.to_lowercase();
    EXIT_COMMANDS.contains(&lower.as_str())
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
