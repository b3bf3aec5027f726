//! Configuration system: schema, loading, and env var overrides.
//!
//! # Usage
//! ```no_run
//! use symbiosika_store::config;
//!
//! let cfg = config::load_config(None);
//! println!("Session duration: {} min", cfg.sessions.default_duration_minutes);
//! ```

pub mod loader;
pub mod schema;

// Re-export key types
pub use loader::{get_config_path, load_config, save_config};
pub use schema::Config;
