//! Handles settings for the application. Configuration is written in
//! `settings.toml`.

use config::{Config, ConfigError, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct App {
    /// Log level filter applied to every workspace crate.
    pub level: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub bind: Option<String>,
    pub port: u16,
    pub database: Database,
}

/// A member created at startup if missing, standing in for the external
/// identity provider's first-login profile creation.
#[derive(Debug, Deserialize)]
pub struct BootstrapMember {
    pub id: String,
    pub password: String,
    pub display_name: String,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub app: App,
    pub server: Server,
    #[serde(default)]
    pub members: Vec<BootstrapMember>,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("settings"))
            .build()?;

        settings.try_deserialize()
    }
}
