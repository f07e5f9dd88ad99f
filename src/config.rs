//! Configuration loading from TOML with environment variable resolution.
//!
//! Reads `config.toml` and deserializes into strongly-typed structs.
//! Secrets (the mail API key) are referenced by env-var name in the config
//! and resolved at runtime via `std::env::var`.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub betting: BettingConfig,
    pub mail: MailConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
    /// Upper bound on cart/game lookups plus the commit, per submission.
    pub request_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// SQLite connection string, e.g. `sqlite://tgl.db`.
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BettingConfig {
    /// Cart used when a submission doesn't name one.
    #[serde(default = "default_cart_id")]
    pub default_cart_id: i64,
    /// Minimum cart value seeded when the carts table is empty.
    #[serde(default = "default_min_cart_value")]
    pub seed_min_cart_value: f64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MailConfig {
    pub enabled: bool,
    pub from_address: String,
    /// Contact address included in reminder emails.
    pub company_email: String,
    /// HTTP mail API endpoint. Required when `enabled` is true.
    #[serde(default)]
    pub api_url: Option<String>,
    /// Env-var name holding the mail API key.
    #[serde(default)]
    pub api_key_env: Option<String>,
    /// A user is "stale" when their latest bet is older than this.
    #[serde(default = "default_reminder_days")]
    pub reminder_after_days: i64,
    /// How often the reminder task scans for stale bettors.
    #[serde(default = "default_reminder_interval")]
    pub reminder_interval_secs: u64,
}

fn default_cart_id() -> i64 {
    1
}

fn default_min_cart_value() -> f64 {
    30.0
}

fn default_reminder_days() -> i64 {
    7
}

fn default_reminder_interval() -> u64 {
    9 * 3600
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        let config: AppConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {path}"))?;
        Ok(config)
    }

    /// Resolve an environment variable name to its value.
    /// Useful for loading secrets referenced in the config.
    pub fn resolve_env(env_name: &str) -> Result<String> {
        std::env::var(env_name)
            .with_context(|| format!("Environment variable not set: {env_name}"))
    }
}
