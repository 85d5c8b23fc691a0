//! Server settings read from a JSON file or the environment.

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

/// The settings file the server looks for in the working directory.
pub const DEFAULT_SETTINGS_FILE: &str = "settings.json";

/// The environment variable holding the SQLite database path.
pub const DATABASE_PATH_VAR: &str = "DATABASE_PATH";
/// The environment variable holding the token signing secret.
pub const SIGNING_SECRET_VAR: &str = "SIGNING_SECRET";
/// The environment variable holding the port to listen on.
pub const PORT_VAR: &str = "PORT";

/// The errors that can occur while loading [Settings].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read settings file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("could not parse settings file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("{name} must be a port number, got \"{value}\"")]
    InvalidPort { name: &'static str, value: String },
}

/// Deployment settings. Every field is optional so that command line
/// arguments can fill in the gaps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub database_path: Option<String>,
    #[serde(default)]
    pub signing_secret: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
}

impl Settings {
    /// Load the settings.
    ///
    /// If `path` is given that file is read. Otherwise [DEFAULT_SETTINGS_FILE] is
    /// read when it exists, and the process environment is used when it does not.
    ///
    /// # Errors
    /// Returns a [ConfigError] if the settings file cannot be read or parsed, or
    /// if the port in the environment is not a number.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None if Path::new(DEFAULT_SETTINGS_FILE).exists() => {
                Self::from_file(Path::new(DEFAULT_SETTINGS_FILE))
            }
            None => Self::from_lookup(|name| std::env::var(name).ok()),
        }
    }

    /// Read the settings from a JSON file.
    ///
    /// # Errors
    /// Returns a [ConfigError] if the file cannot be read or is not valid JSON.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;

        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_owned(),
            source,
        })
    }

    /// Read the settings from variables provided by `lookup`, e.g. the process environment.
    ///
    /// Empty values are treated as unset.
    ///
    /// # Errors
    /// Returns [ConfigError::InvalidPort] if the port is set but is not a number.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).filter(|value| !value.is_empty());

        let port = match get(PORT_VAR) {
            Some(value) => Some(value.parse().map_err(|_| ConfigError::InvalidPort {
                name: PORT_VAR,
                value,
            })?),
            None => None,
        };

        Ok(Self {
            database_path: get(DATABASE_PATH_VAR),
            signing_secret: get(SIGNING_SECRET_VAR),
            port,
        })
    }
}
