//! Configuration schema.
//!
//! Hierarchy: `Config` → `SessionsConfig`, `ValuesConfig`.
//!
//! JSON on disk uses **camelCase** keys; Rust uses snake_case.

use serde::{Deserialize, Serialize};

use crate::utils::DEFAULT_LIFETIME_MINUTES;

// ─────────────────────────────────────────────
// Root Config
// ─────────────────────────────────────────────

/// Root configuration: loaded from `~/.symbiosika/config.json` + env vars.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub sessions: SessionsConfig,
    pub values: ValuesConfig,
}

// ─────────────────────────────────────────────
// Stores
// ─────────────────────────────────────────────

/// Chat-session store settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionsConfig {
    /// Session duration for callers that do not pass one.
    pub default_duration_minutes: f64,
}

impl Default for SessionsConfig {
    fn default() -> Self {
        Self {
            default_duration_minutes: DEFAULT_LIFETIME_MINUTES,
        }
    }
}

/// Key-value store settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ValuesConfig {
    /// Value lifetime applied when a caller passes zero or less.
    pub default_lifetime_minutes: f64,
}

impl Default for ValuesConfig {
    fn default() -> Self {
        Self {
            default_lifetime_minutes: DEFAULT_LIFETIME_MINUTES,
        }
    }
}
