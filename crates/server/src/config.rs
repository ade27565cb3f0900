use std::{collections::HashMap, path::Path};

use anyhow::Context;
use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;

const SETTINGS_FILE: &str = "server.toml";

/// Plain environment variables honoured next to the `APP__` prefixed ones.
const LEGACY_ENV_KEYS: [&str; 2] = ["DATABASE_URL", "SERVER_BIND"];

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Settings {
    pub server_bind: String,
    pub database_url: String,
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_bind: "127.0.0.1:8000".into(),
            database_url: "sqlite://./data/festivals.db".into(),
            log_level: "info".into(),
        }
    }
}

pub fn load_settings() -> anyhow::Result<Settings> {
    load_settings_from(Path::new(SETTINGS_FILE), std::env::vars().collect())
}

/// Layers, lowest precedence first: built-in defaults, the optional settings
/// file, `DATABASE_URL`/`SERVER_BIND`, then `APP__*` variables.
pub fn load_settings_from(
    file: &Path,
    env: HashMap<String, String>,
) -> anyhow::Result<Settings> {
    let defaults = Settings::default();
    let legacy: HashMap<String, String> = env
        .iter()
        .filter(|(key, _)| LEGACY_ENV_KEYS.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    let config = Config::builder()
        .set_default("server_bind", defaults.server_bind)?
        .set_default("database_url", defaults.database_url)?
        .set_default("log_level", defaults.log_level)?
        .add_source(
            File::from(file)
                .format(FileFormat::Toml)
                .required(false),
        )
        .add_source(Environment::default().source(Some(legacy)))
        .add_source(
            Environment::with_prefix("APP")
                .prefix_separator("__")
                .source(Some(env)),
        )
        .build()
        .with_context(|| format!("failed to load settings from '{}'", file.display()))?;

    config
        .try_deserialize()
        .context("invalid server settings")
}

/// Turns a bare file path or `sqlite:` path into a `sqlite://` URL. The
/// store creates the file and its directory on first open.
pub fn normalize_database_url(raw_database_url: &str) -> String {
    let raw_database_url = raw_database_url.trim();
    if raw_database_url.is_empty() {
        return Settings::default().database_url;
    }
    if raw_database_url.starts_with("sqlite::memory:") || raw_database_url.contains("://") {
        return raw_database_url.to_string();
    }
    let path = raw_database_url
        .strip_prefix("sqlite:")
        .unwrap_or(raw_database_url);
    format!("sqlite://{}", path.replace('\\', "/"))
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
