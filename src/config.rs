//! Server configuration with environment overrides.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::warn;

/// Default HTTP port.
pub const DEFAULT_PORT: u16 = 8000;

/// Server configuration.
///
/// Built from defaults, then environment variables, then CLI flags (the
/// caller applies those last). The database handle itself is constructed
/// once at process start and passed into the service layer explicitly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Port for the HTTP server (default: 8000).
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            port: default_port(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("tasks.db")
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

impl Config {
    /// Build a config from defaults plus environment overrides.
    ///
    /// `QUICKTASK_DB_PATH` sets the database location; `QUICKTASK_PORT`
    /// the listen port. Unset or unparsable values fall back to defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(path) = std::env::var("QUICKTASK_DB_PATH")
            && !path.is_empty()
        {
            config.db_path = PathBuf::from(path);
        }
        if let Ok(raw) = std::env::var("QUICKTASK_PORT") {
            match raw.parse() {
                Ok(port) => config.port = port,
                Err(_) => warn!("Ignoring unparsable QUICKTASK_PORT value: {}", raw),
            }
        }
        config
    }

    /// Ensure the parent directory of the database file exists.
    pub fn ensure_db_dir(&self) -> anyhow::Result<()> {
        if let Some(parent) = self.db_path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}
