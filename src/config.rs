//! Runtime configuration.
//!
//! Values are layered with figment: built-in defaults, then an optional
//! `stack-probe.toml` in the working directory, then environment variables.
//! Environment keys keep the names the deployment already exports
//! (`PG_DB_*`, `REDIS_*`) and are mapped onto the nested sections below.

use crate::error::ProbeError;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

pub const CONFIG_FILE: &str = "stack-probe.toml";

/// Keys read verbatim from the environment. figment would otherwise parse
/// `PG_DB_PASSWORD=123456` or `PG_DB_NAME=2024` into numbers.
const PG_TEXT_KEYS: &[&str] = &["host", "username", "password", "name"];
const REDIS_TEXT_KEYS: &[&str] = &["host", "username", "password"];
const PROBE_TEXT_KEYS: &[&str] = &["admin_database", "migrations_dir", "loglevel"];

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub postgres: PostgresConfig,
    pub redis: RedisConfig,
    #[serde(default)]
    pub probe: ProbeSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PostgresConfig {
    pub host: String,
    #[serde(default = "default_pg_port")]
    pub port: u16,
    pub username: String,
    #[serde(default)]
    pub password: Option<String>,
    /// Database created, migrated and dropped by the check.
    pub name: String,
    #[serde(skip)]
    pub admin_database: String,
    #[serde(skip)]
    pub migrations_dir: PathBuf,
    #[serde(skip)]
    pub timeout: Duration,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    pub host: String,
    #[serde(default = "default_redis_port")]
    pub port: u16,
    /// ACL user, needs Redis >= 6.
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(skip)]
    pub timeout: Duration,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeSettings {
    pub admin_database: String,
    pub migrations_dir: PathBuf,
    pub timeout_secs: u64,
    pub loglevel: String,
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            admin_database: "postgres".to_string(),
            migrations_dir: PathBuf::from("migrations"),
            timeout_secs: 30,
            loglevel: "info".to_string(),
        }
    }
}

fn default_pg_port() -> u16 {
    5432
}

fn default_redis_port() -> u16 {
    6379
}

impl Config {
    /// Provider stack used by [`Config::load`].
    pub fn figment() -> Figment {
        Figment::new()
            .merge(Serialized::default("probe", ProbeSettings::default()))
            .merge(Toml::file(CONFIG_FILE))
            .merge(
                Env::prefixed("PG_DB_")
                    .ignore(PG_TEXT_KEYS)
                    .map(|key| format!("postgres.{key}").into()),
            )
            .merge(env_text("PG_DB_", "postgres", PG_TEXT_KEYS))
            .merge(
                Env::prefixed("REDIS_")
                    .ignore(REDIS_TEXT_KEYS)
                    .map(|key| format!("redis.{key}").into()),
            )
            .merge(env_text("REDIS_", "redis", REDIS_TEXT_KEYS))
            .merge(
                Env::prefixed("PROBE_")
                    .ignore(PROBE_TEXT_KEYS)
                    .map(|key| format!("probe.{key}").into()),
            )
            .merge(env_text("PROBE_", "probe", PROBE_TEXT_KEYS))
    }

    pub fn load() -> Result<Self, ProbeError> {
        Self::from_figment(&Self::figment())
    }

    /// Extract and push the shared probe settings down into each check's section.
    pub fn from_figment(figment: &Figment) -> Result<Self, ProbeError> {
        let mut cfg: Config = figment.extract()?;
        let timeout = cfg.probe.timeout();

        cfg.postgres.admin_database = cfg.probe.admin_database.clone();
        cfg.postgres.migrations_dir = cfg.probe.migrations_dir.clone();
        cfg.postgres.timeout = timeout;
        cfg.redis.timeout = timeout;
        Ok(cfg)
    }
}

fn env_text(
    prefix: &str,
    section: &str,
    keys: &[&str],
) -> Serialized<BTreeMap<String, String>> {
    let values = Env::prefixed(prefix)
        .only(keys)
        .iter()
        .map(|(key, value)| (key.as_str().to_ascii_lowercase(), value))
        .collect();
    Serialized::default(section, values)
}

impl ProbeSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

pub(crate) fn redact(password: Option<&str>) -> &'static str {
    match password {
        Some(p) if !p.is_empty() => "<redacted>",
        _ => "<none>",
    }
}
