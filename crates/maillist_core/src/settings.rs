//! Runtime settings for hosting the subscriber store.
//!
//! Values come from built-in defaults overlaid by `MAILLIST_*` environment
//! variables (`MAILLIST_DB_PATH`, `MAILLIST_LOG_LEVEL`, `MAILLIST_LOG_DIR`).

use crate::logging::default_log_level;
use config::{Config, ConfigError, Environment};
use serde::Deserialize;
use std::path::PathBuf;

pub const ENV_PREFIX: &str = "MAILLIST";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StoreSettings {
    /// SQLite file; `None` opens an in-memory database.
    #[serde(default)]
    pub db_path: Option<PathBuf>,
    pub log_level: String,
    /// File logging stays off when unset.
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
}

impl StoreSettings {
    /// Loads settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_environment(Environment::with_prefix(ENV_PREFIX))
    }

    fn from_environment(environment: Environment) -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("log_level", default_log_level())?
            .add_source(environment)
            .build()?
            .try_deserialize()
    }
}
