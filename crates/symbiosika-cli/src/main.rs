//! Symbiosika CLI: entry point.
//!
//! Owns the one session store and one key-value store of the process and
//! drives the store nodes against them.
//!
//! # Commands
//!
//! - `symbiosika repl`: type node invocations interactively
//! - `symbiosika batch FILE`: run JSON-lines node invocations from a file
//! - `symbiosika config`: show the effective configuration

mod batch;
mod helpers;
mod repl;

use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;

use symbiosika_nodes::NodeRegistry;
use symbiosika_store::config::{get_config_path, load_config, Config};
use symbiosika_store::{SessionStore, SystemClock, ValueStore};

// ─────────────────────────────────────────────
// CLI definition
// ─────────────────────────────────────────────

/// Symbiosika: ephemeral chat-session and key-value stores
#[derive(Parser)]
#[command(name = "symbiosika", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run node operations interactively
    Repl {
        /// Enable debug logging
        #[arg(long, default_value_t = false)]
        logs: bool,
    },

    /// Run node operations from a JSON-lines file
    Batch {
        /// Path to the file (one JSON invocation per line)
        file: String,

        /// Report failing items as `{error}` outputs instead of aborting the line
        #[arg(long, default_value_t = false)]
        continue_on_fail: bool,

        /// Enable debug logging
        #[arg(long, default_value_t = false)]
        logs: bool,
    },

    /// Show the effective configuration
    Config,
}

// ─────────────────────────────────────────────
// Entrypoint
// ─────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Repl { logs } => {
            init_logging(logs);
            let registry = build_registry(&load_config(None));
            repl::run(registry).await
        }
        Commands::Batch {
            file,
            continue_on_fail,
            logs,
        } => {
            init_logging(logs);
            let registry = build_registry(&load_config(None));
            let path = helpers::expand_tilde(&file);
            let mut stdout = std::io::stdout().lock();
            let summary = batch::run(&registry, &path, continue_on_fail, &mut stdout).await?;
            info!(lines = summary.lines, failed = summary.failed, "batch finished");
            if summary.failed > 0 {
                anyhow::bail!("{} of {} lines failed", summary.failed, summary.lines);
            }
            Ok(())
        }
        Commands::Config => {
            init_logging(false);
            helpers::print_config(&get_config_path(), &load_config(None))
        }
    }
}

/// Build the node registry around fresh stores configured from `config`.
pub fn build_registry(config: &Config) -> NodeRegistry {
    let sessions = SessionStore::from_config(&config.sessions);
    let values = ValueStore::from_config(&config.values);
    NodeRegistry::with_store_nodes(sessions, values, Arc::new(SystemClock))
}

/// Initialize tracing/logging.
fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("symbiosika=debug,info")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}
