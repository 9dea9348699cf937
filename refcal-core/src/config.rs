//! refcal configuration.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::error::{RefCalError, RefCalResult};

static DEFAULT_DATA_DIR: &str = "~/.local/share/refcal";
static DEFAULT_BIND: &str = "127.0.0.1:4096";

fn default_data_dir() -> PathBuf {
    PathBuf::from(DEFAULT_DATA_DIR)
}

fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}

/// Configuration at ~/.config/refcal/config.toml, overridable with
/// `REFCAL_*` environment variables (e.g. `REFCAL_BIND=0.0.0.0:8080`).
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct RefCalConfig {
    /// Where availability.json and users.json live
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Address the HTTP server listens on
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for RefCalConfig {
    fn default() -> Self {
        RefCalConfig {
            data_dir: default_data_dir(),
            bind: default_bind(),
        }
    }
}

impl RefCalConfig {
    pub fn config_path() -> RefCalResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| RefCalError::Config("Could not determine config directory".into()))?
            .join("refcal");

        Ok(config_dir.join("config.toml"))
    }

    /// Load from the default location, writing a commented template first if
    /// no config file exists.
    pub fn load() -> RefCalResult<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
        }

        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> RefCalResult<Self> {
        Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(Environment::with_prefix("REFCAL"))
            .build()
            .map_err(|e| RefCalError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| RefCalError::Config(e.to_string()))
    }

    /// `data_dir` with `~` expanded.
    pub fn data_path(&self) -> PathBuf {
        let full_path_str = shellexpand::tilde(&self.data_dir.to_string_lossy()).into_owned();

        PathBuf::from(full_path_str)
    }

    pub fn bind_addr(&self) -> RefCalResult<SocketAddr> {
        self.bind
            .parse()
            .map_err(|e| RefCalError::Config(format!("Invalid bind address '{}': {e}", self.bind)))
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> RefCalResult<()> {
        let contents = format!(
            "\
# refcal configuration

# Where availability and user data live:
# data_dir = \"{}\"

# Address the server listens on:
# bind = \"{}\"
",
            DEFAULT_DATA_DIR, DEFAULT_BIND
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                RefCalError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| RefCalError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}
