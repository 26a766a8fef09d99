//! Configuration file parsing and structures.
//!
//! paneld reads an optional TOML file for logging and unlock
//! credentials. Every field has a default, so the daemon runs without
//! any config file; the built-in credentials are the simulated panel's
//! documented ones.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::bail;
use anyhow::Context;
use serde::Deserialize;
use tracing_subscriber::filter::LevelFilter;

use crate::catalog::RoomId;
use crate::engine::Credentials;

/// Top-level configuration structure
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub credentials: CredentialsConfig,
}

#[derive(Debug, Default, Deserialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => LevelFilter::TRACE,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Error => LevelFilter::ERROR,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default)]
    pub level: LogLevel,
}

/// Unlock credential overrides.
///
/// Plaintext by design: the panel is a simulation and its credentials
/// are documented constants, not a security boundary. Room keys are
/// plain strings here and validated against the catalog when converted,
/// so a typo in a room name is reported instead of silently ignored.
#[derive(Debug, Default, Deserialize)]
pub struct CredentialsConfig {
    /// Master credential that unlocks every room at once.
    #[serde(default)]
    pub master: Option<String>,

    /// Per-room credential overrides, keyed by room name.
    #[serde(default)]
    pub rooms: BTreeMap<String, String>,
}

impl CredentialsConfig {
    /// Overlay the configured credentials on the built-in defaults.
    pub fn into_credentials(self) -> anyhow::Result<Credentials> {
        let mut credentials = Credentials::default();

        if let Some(master) = self.master {
            credentials.master = master;
        }
        for (name, password) in self.rooms {
            let Ok(room) = name.parse::<RoomId>() else {
                bail!("unknown room '{}' in [credentials.rooms]", name);
            };
            credentials.rooms.insert(room, password);
        }

        Ok(credentials)
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("failed to parse {}", path.display()))
    }
}
