//! Handles settings for the application.
//!
//! Values come from, in increasing priority: built-in defaults, the TOML file
//! (`config/budget_tracker.toml` unless `--config` says otherwise), the
//! `BUDGET_TRACKER__*` environment and the command line flags.
use serde::Deserialize;

use crate::{cli::Cli, error::Result};

const DEFAULT_CONFIG_PATH: &str = "config/budget_tracker";
const MEMORY_PATH: &str = ":memory:";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct App {
    pub level: String,
    /// IANA name used to decide what "today" is. Local time when unset.
    pub timezone: Option<String>,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            timezone: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Database {
    /// SQLite file, created on first run. `:memory:` keeps everything in RAM.
    pub path: String,
    /// Log every SQL statement sent by sea-orm.
    pub log_sql: bool,
}

impl Default for Database {
    fn default() -> Self {
        Self {
            path: "./app-budget-tracker.db".to_string(),
            log_sql: false,
        }
    }
}

impl Database {
    pub fn url(&self) -> String {
        if self.path == MEMORY_PATH {
            String::from("sqlite::memory:")
        } else {
            format!("sqlite:{}?mode=rwc", self.path)
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub app: App,
    pub database: Database,
}

impl Settings {
    pub fn load(cli: &Cli) -> Result<Self> {
        let config_path = cli.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
        let mut settings: Settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(cli.config.is_some()))
            .add_source(config::Environment::with_prefix("BUDGET_TRACKER").separator("__"))
            .build()?
            .try_deserialize()?;

        if let Some(path) = &cli.database {
            settings.database.path.clone_from(path);
        }
        if cli.log_sql {
            settings.database.log_sql = true;
        }
        if let Some(level) = &cli.log_level {
            settings.app.level.clone_from(level);
        }
        if let Some(timezone) = &cli.timezone {
            settings.app.timezone = Some(timezone.clone());
        }

        Ok(settings)
    }
}
