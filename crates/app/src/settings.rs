//! Handles settings for the application.
//!
//! Sources, lowest precedence first:
//! 1. built-in defaults;
//! 2. a TOML file (`config/bank.toml` unless `--config` points elsewhere);
//! 3. environment variables prefixed with `BANK_`, nested keys separated by
//!    `__` (e.g. `BANK_LEDGER__TRANSFER_TIMEOUT_MS=2000`);
//! 4. command-line flags, applied by the caller.
use std::time::Duration;

use config::{Config, ConfigBuilder, ConfigError, Environment, File, builder::DefaultState};
use serde::Deserialize;

pub const DEFAULT_CONFIG_PATH: &str = "config/bank";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Database {
    Memory,
    Sqlite(String),
    Url(String),
}

impl Database {
    pub fn url(&self) -> String {
        match self {
            Database::Memory => String::from("sqlite::memory:"),
            Database::Sqlite(path) => format!("sqlite:{path}?mode=rwc"),
            Database::Url(url) => url.clone(),
        }
    }
}

impl Default for Database {
    fn default() -> Self {
        Database::Sqlite("./bank.db".to_string())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct App {
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Ledger {
    /// Deadline applied to every transfer, in milliseconds.
    pub transfer_timeout_ms: Option<u64>,
    /// Lock each account row before changing its balance.
    pub explicit_row_locks: bool,
}

impl Ledger {
    pub fn transfer_timeout(&self) -> Option<Duration> {
        self.transfer_timeout_ms.map(Duration::from_millis)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub app: App,
    pub database: Database,
    pub database_max_connections: Option<u32>,
    pub ledger: Ledger,
}

impl Settings {
    /// Load settings from `path` (if given the file must exist) and the
    /// environment.
    pub fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        let file = match path {
            Some(path) => File::with_name(path).required(true),
            None => File::with_name(DEFAULT_CONFIG_PATH).required(false),
        };
        Self::from_builder(
            Config::builder()
                .add_source(file)
                .add_source(
                    Environment::with_prefix("BANK")
                        .prefix_separator("_")
                        .separator("__"),
                ),
        )
    }

    fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        builder.build()?.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use config::FileFormat;

    use super::*;

    fn parse(toml: &str) -> Settings {
        Settings::from_builder(Config::builder().add_source(File::from_str(toml, FileFormat::Toml)))
            .unwrap()
    }

    #[test]
    fn empty_file_gives_defaults() {
        let settings = parse("");
        assert_eq!(settings.app.level, "info");
        assert_eq!(settings.database, Database::Sqlite("./bank.db".to_string()));
        assert_eq!(settings.database_max_connections, None);
        assert_eq!(settings.ledger.transfer_timeout(), None);
        assert!(!settings.ledger.explicit_row_locks);
    }

    #[test]
    fn reads_every_section() {
        let settings = parse(
            r#"
            database_max_connections = 4

            [app]
            level = "debug"

            [database]
            url = "postgres://bank@localhost/bank"

            [ledger]
            transfer_timeout_ms = 1500
            explicit_row_locks = true
            "#,
        );
        assert_eq!(settings.app.level, "debug");
        assert_eq!(
            settings.database,
            Database::Url("postgres://bank@localhost/bank".to_string())
        );
        assert_eq!(settings.database_max_connections, Some(4));
        assert_eq!(
            settings.ledger.transfer_timeout(),
            Some(Duration::from_millis(1500))
        );
        assert!(settings.ledger.explicit_row_locks);
    }

    #[test]
    fn memory_database_is_a_plain_string() {
        let settings = parse(r#"database = "memory""#);
        assert_eq!(settings.database, Database::Memory);
        assert_eq!(settings.database.url(), "sqlite::memory:");
    }

    #[test]
    fn sqlite_path_becomes_a_url() {
        let settings = parse(
            r#"
            [database]
            sqlite = "/var/lib/bank/bank.db"
            "#,
        );
        assert_eq!(
            settings.database.url(),
            "sqlite:/var/lib/bank/bank.db?mode=rwc"
        );
    }
}
