//! Application settings, loaded from `untangle.toml` and `UNTANGLE__*`
//! environment variables.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub app: App,
    pub server: Option<Server>,
}

#[derive(Debug, Deserialize)]
pub struct App {
    /// Log level for the application crates (`trace`..`error`).
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

#[derive(Debug, Deserialize)]
pub struct Server {
    /// Address to bind; defaults to 127.0.0.1.
    pub bind: Option<String>,
    pub port: u16,
    pub database: Database,
    /// Refuse session starts on a zero or negative balance.
    pub require_positive_balance: Option<bool>,
    /// Refuse session starts when the member's latest plan has expired.
    pub block_expired_plan: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name("untangle").required(false))
            .add_source(Environment::with_prefix("UNTANGLE").separator("__"))
            .build()?
            .try_deserialize()
    }
}
