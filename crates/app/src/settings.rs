//! Application settings.
//!
//! Read from an optional `settings.toml` in the working directory, then
//! overridden by `POCKETBOOK__<SECTION>__<KEY>` environment variables, e.g.
//! `POCKETBOOK__AUTH__SECRET`.
//!
//! ```toml
//! [app]
//! level = "info"
//!
//! [server]
//! database = { sqlite = "pocketbook.db" }
//! bind = "127.0.0.1"
//! port = 8000
//!
//! [auth]
//! secret = "<at least 32 bytes, raw or base64>"
//! access_ttl_secs = 300
//! refresh_ttl_secs = 86400
//! ```
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

#[derive(Debug, Deserialize)]
pub struct Server {
    pub database: Database,
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Deserialize)]
pub struct Auth {
    pub secret: String,
    #[serde(default = "default_access_ttl")]
    pub access_ttl_secs: u64,
    #[serde(default = "default_refresh_ttl")]
    pub refresh_ttl_secs: u64,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub app: App,
    pub server: Server,
    pub auth: Auth,
}

fn default_level() -> String {
    "info".to_string()
}

fn default_bind() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_access_ttl() -> u64 {
    300
}

fn default_refresh_ttl() -> u64 {
    86_400
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("settings").required(false))
            .add_source(Environment::with_prefix("POCKETBOOK").separator("__"))
            .build()?;

        settings.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    fn parse(toml: &str) -> Result<Settings, ConfigError> {
        Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?
            .try_deserialize()
    }

    #[test]
    fn defaults_fill_optional_keys() {
        let settings = parse(
            r#"
            [server]
            database = "memory"

            [auth]
            secret = "0123456789abcdef0123456789abcdef"
            "#,
        )
        .unwrap();
        assert_eq!(settings.app.level, "info");
        assert!(matches!(settings.server.database, Database::Memory));
        assert_eq!(settings.server.bind, "127.0.0.1");
        assert_eq!(settings.server.port, 8000);
        assert_eq!(settings.auth.access_ttl_secs, 300);
        assert_eq!(settings.auth.refresh_ttl_secs, 86_400);
    }

    #[test]
    fn sqlite_database_takes_a_path() {
        let settings = parse(
            r#"
            [app]
            level = "debug"

            [server]
            database = { sqlite = "data/pocketbook.db" }
            port = 9000

            [auth]
            secret = "0123456789abcdef0123456789abcdef"
            "#,
        )
        .unwrap();
        assert_eq!(settings.app.level, "debug");
        assert_eq!(settings.server.port, 9000);
        match settings.server.database {
            Database::Sqlite(path) => assert_eq!(path, "data/pocketbook.db"),
            Database::Memory => panic!("expected sqlite"),
        }
    }

    #[test]
    fn missing_secret_is_an_error() {
        assert!(parse("[server]\ndatabase = \"memory\"\n").is_err());
    }
}
