//! Config loader: reads `~/.symbiosika/config.json`, merges env vars, and
//! applies legacy migrations.
//!
//! # Loading precedence
//! 1. Defaults (from `Config::default()`)
//! 2. JSON file at `~/.symbiosika/config.json`
//! 3. Environment variables `SYMBIOSIKA_<SECTION>__<FIELD>` (override JSON)
//!
//! Lifetimes that end up non-finite or non-positive are reset to their default.

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::schema::{Config, SessionsConfig, ValuesConfig};

/// Default config file path.
pub fn get_config_path() -> PathBuf {
    crate::utils::get_data_path().join("config.json")
}

/// Load configuration from the default path + env vars.
///
/// Falls back to `Config::default()` if the file doesn't exist or can't be parsed.
pub fn load_config(path: Option<&Path>) -> Config {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);

    load_config_from_path(&config_path)
}

/// Load config from a specific file path.
fn load_config_from_path(path: &Path) -> Config {
    if !path.exists() {
        info!("No config file found at {}, using defaults", path.display());
        return finish(Config::default());
    }

    debug!("Loading config from {}", path.display());

    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to read config file {}: {}", path.display(), e);
            return finish(Config::default());
        }
    };

    // Parse JSON → Value first for migration
    let mut raw: serde_json::Value = match serde_json::from_str(&content) {
        Ok(v) => v,
        Err(e) => {
            warn!("Failed to parse config JSON: {}", e);
            return finish(Config::default());
        }
    };

    migrate_config(&mut raw);

    let config: Config = match serde_json::from_value(raw) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to deserialize config: {}", e);
            return finish(Config::default());
        }
    };

    finish(config)
}

fn finish(config: Config) -> Config {
    validate(apply_env_overrides(config))
}

/// Save configuration to disk (pretty-printed JSON with camelCase keys).
pub fn save_config(config: &Config, path: Option<&Path>) -> std::io::Result<()> {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(config).map_err(std::io::Error::other)?;

    std::fs::write(&config_path, json)?;
    debug!("Config saved to {}", config_path.display());
    Ok(())
}

/// Apply legacy config migrations.
///
/// Early configs were flat and used the node parameter names:
/// `sessionDuration` → `sessions.defaultDurationMinutes`,
/// `valueLifetime` → `values.defaultLifetimeMinutes`.
fn migrate_config(raw: &mut serde_json::Value) {
    let Some(root) = raw.as_object_mut() else {
        return;
    };

    for (legacy, section, field) in [
        ("sessionDuration", "sessions", "defaultDurationMinutes"),
        ("valueLifetime", "values", "defaultLifetimeMinutes"),
    ] {
        let Some(val) = root.remove(legacy) else {
            continue;
        };
        let target = root
            .entry(section)
            .or_insert_with(|| serde_json::json!({}));
        if let Some(obj) = target.as_object_mut() {
            if !obj.contains_key(field) {
                obj.insert(field.to_string(), val);
                debug!("Migrated {} → {}.{}", legacy, section, field);
            }
        }
    }
}

/// Apply environment variable overrides on top of a loaded config.
///
/// Supported overrides:
/// - `SYMBIOSIKA_SESSIONS__DEFAULT_DURATION_MINUTES` → `sessions.default_duration_minutes`
/// - `SYMBIOSIKA_VALUES__DEFAULT_LIFETIME_MINUTES` → `values.default_lifetime_minutes`
fn apply_env_overrides(config: Config) -> Config {
    apply_overrides(config, |name| std::env::var(name).ok())
}

fn apply_overrides(mut config: Config, var: impl Fn(&str) -> Option<String>) -> Config {
    if let Some(val) = var("SYMBIOSIKA_SESSIONS__DEFAULT_DURATION_MINUTES") {
        if let Ok(m) = val.parse::<f64>() {
            config.sessions.default_duration_minutes = m;
        }
    }
    if let Some(val) = var("SYMBIOSIKA_VALUES__DEFAULT_LIFETIME_MINUTES") {
        if let Ok(m) = val.parse::<f64>() {
            config.values.default_lifetime_minutes = m;
        }
    }
    config
}

/// Reset unusable lifetimes to their defaults.
fn validate(mut config: Config) -> Config {
    let minutes = config.sessions.default_duration_minutes;
    if !(minutes.is_finite() && minutes > 0.0) {
        warn!(minutes, "invalid sessions.defaultDurationMinutes, using default");
        config.sessions = SessionsConfig::default();
    }
    let minutes = config.values.default_lifetime_minutes;
    if !(minutes.is_finite() && minutes > 0.0) {
        warn!(minutes, "invalid values.defaultLifetimeMinutes, using default");
        config.values = ValuesConfig::default();
    }
    config
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_temp_json(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_missing_file() {
        let config = load_config_from_path(Path::new("/nonexistent/path/config.json"));
        assert_eq!(config.values.default_lifetime_minutes, 60.0);
    }

    #[test]
    fn test_load_valid_json() {
        let file = write_temp_json(
            r#"{
            "sessions": { "defaultDurationMinutes": 30 },
            "values": { "defaultLifetimeMinutes": 5.5 }
        }"#,
        );

        let config = load_config_from_path(file.path());
        assert_eq!(config.sessions.default_duration_minutes, 30.0);
        assert_eq!(config.values.default_lifetime_minutes, 5.5);
    }

    #[test]
    fn test_load_invalid_json_returns_defaults() {
        let file = write_temp_json("not valid json {{{");
        let config = load_config_from_path(file.path());
        assert_eq!(config.sessions.default_duration_minutes, 60.0);
    }

    #[test]
    fn test_negative_lifetime_reset() {
        let file = write_temp_json(r#"{ "values": { "defaultLifetimeMinutes": -4 } }"#);
        let config = load_config_from_path(file.path());
        assert_eq!(config.values.default_lifetime_minutes, 60.0);
    }

    #[test]
    fn test_migrate_flat_keys() {
        let file = write_temp_json(r#"{ "sessionDuration": 15, "valueLifetime": 90 }"#);
        let config = load_config_from_path(file.path());
        assert_eq!(config.sessions.default_duration_minutes, 15.0);
        assert_eq!(config.values.default_lifetime_minutes, 90.0);
    }

    #[test]
    fn test_migrate_no_overwrite() {
        let file = write_temp_json(
            r#"{
            "sessionDuration": 15,
            "sessions": { "defaultDurationMinutes": 45 }
        }"#,
        );
        let config = load_config_from_path(file.path());
        assert_eq!(config.sessions.default_duration_minutes, 45.0);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = Config::default();
        config.sessions.default_duration_minutes = 120.0;
        save_config(&config, Some(&path)).unwrap();

        let reloaded = load_config_from_path(&path);
        assert_eq!(reloaded.sessions.default_duration_minutes, 120.0);
    }

    #[test]
    fn test_saved_json_uses_camel_case() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        save_config(&Config::default(), Some(&path)).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let raw: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert!(raw["values"].get("defaultLifetimeMinutes").is_some());
        assert!(raw["values"].get("default_lifetime_minutes").is_none());
    }

    fn fake_env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_env_override_session_duration() {
        let env = fake_env(&[("SYMBIOSIKA_SESSIONS__DEFAULT_DURATION_MINUTES", "12")]);
        let config = apply_overrides(Config::default(), env);
        assert_eq!(config.sessions.default_duration_minutes, 12.0);
        assert_eq!(config.values.default_lifetime_minutes, 60.0);
    }

    #[test]
    fn test_env_override_ignores_garbage() {
        let env = fake_env(&[("SYMBIOSIKA_VALUES__DEFAULT_LIFETIME_MINUTES", "soon")]);
        let config = apply_overrides(Config::default(), env);
        assert_eq!(config.values.default_lifetime_minutes, 60.0);
    }
}
