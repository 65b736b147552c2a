//! Handles settings for the application. Configuration is read from an
//! optional `settings.toml` and from `MOSTRADOR__*` environment variables
//! (`MOSTRADOR__SERVER__PORT=8080` overrides `server.port`).
//!
//! See `settings.toml` for an example.
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
}

#[derive(Debug, Deserialize)]
pub struct App {
    pub level: String,
    /// IANA name of the register timezone.
    pub timezone: String,
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub bind: Option<String>,
    pub port: u16,
    pub database: Database,
    /// Where the product mirror lives. Defaults to `database`.
    pub mirror_database: Option<Database>,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub app: App,
    pub server: Option<Server>,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .set_default("app.level", "info")?
            .set_default("app.timezone", "America/Argentina/Buenos_Aires")?
            .add_source(File::with_name("settings").required(false))
            .add_source(Environment::with_prefix("MOSTRADOR").separator("__"))
            .build()?;

        settings.try_deserialize()
    }
}
