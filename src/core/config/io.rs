use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use thiserror::Error;

use crate::core::config::data::{path_display, Config, ConfigOverrides};

/// Errors that can occur while assembling the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("Failed to read config at {}: {source}", path_display(.path))]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse the configuration file as valid TOML.
    #[error("Failed to parse config at {}: {source}", path_display(.path))]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid value for {var}: {value:?}")]
    InvalidEnv { var: &'static str, value: String },
}

impl Config {
    /// Build the effective configuration: defaults, then the config file,
    /// then environment variables, then command-line overrides.
    ///
    /// An explicit `path` must exist. Without one, the platform config file
    /// is read only when present.
    pub fn load(path: Option<&Path>, overrides: &ConfigOverrides) -> Result<Config, ConfigError> {
        let mut config = match path {
            Some(path) => Config::read_from_path(path)?,
            None => match Config::get_config_path() {
                Some(path) => Config::load_from_path(&path)?,
                None => Config::default(),
            },
        };
        config.apply_env(|var| std::env::var(var).ok())?;
        config.apply_overrides(overrides);
        Ok(config)
    }

    /// Read `config_path`, falling back to defaults when it does not exist.
    pub fn load_from_path(config_path: &Path) -> Result<Config, ConfigError> {
        if config_path.exists() {
            Config::read_from_path(config_path)
        } else {
            Ok(Config::default())
        }
    }

    fn read_from_path(config_path: &Path) -> Result<Config, ConfigError> {
        let contents = fs::read_to_string(config_path).map_err(|source| ConfigError::Read {
            path: config_path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: config_path.to_path_buf(),
            source,
        })
    }

    /// Overlay `HOST`, `PORT` and `DEBUG` as returned by `lookup`.
    ///
    /// Empty `HOST`/`PORT` values are ignored. `DEBUG` is on only for `1` or
    /// `true`; any other value turns it off.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("HOST").filter(|value| !value.is_empty()) {
            self.host = host;
        }
        if let Some(port) = lookup("PORT").filter(|value| !value.is_empty()) {
            self.port = port
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidEnv { var: "PORT", value: port })?;
        }
        if let Some(value) = lookup("DEBUG") {
            self.debug = matches!(value.as_str(), "1" | "true");
        }
        Ok(())
    }

    pub fn get_config_path() -> Option<PathBuf> {
        ProjectDirs::from("org", "chatloop", "chatloop")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }
}
