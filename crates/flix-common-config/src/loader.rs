//! Configuration file loading and validation.

use crate::credentials::Credentials;
use crate::env::EnvError;
use crate::types::{ClientConfig, ClientOptions};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Config file location relative to the project directory.
pub const CONFIG_FILE: &str = ".flix/config.yaml";

/// Config loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {source}")]
    ReadError {
        #[from]
        source: std::io::Error,
    },

    #[error("invalid YAML at line {}: {message}", line.map(|l| l.to_string()).unwrap_or_else(|| "unknown".to_string()))]
    ParseError { line: Option<usize>, message: String },

    #[error("validation error: {message}")]
    ValidationError { message: String },

    #[error("environment variable not found: {var}")]
    EnvVarNotFound { var: String },

    #[error("failed to load environment: {0}")]
    Env(#[from] EnvError),
}

/// Configuration loader.
pub struct ConfigLoader {
    config_path: PathBuf,
}

impl ConfigLoader {
    /// Create a loader for `.flix/config.yaml` under the given directory.
    pub fn new(project_dir: impl AsRef<Path>) -> Self {
        Self {
            config_path: project_dir.as_ref().join(CONFIG_FILE),
        }
    }

    /// Create a loader for an explicit file path.
    pub fn from_file(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
        }
    }

    /// The file this loader reads.
    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Load client options from the config file.
    ///
    /// A missing file yields empty options, so every field falls back to
    /// its default.
    pub fn load(&self) -> Result<ClientOptions, ConfigError> {
        if !self.config_path.exists() {
            return Ok(ClientOptions::default());
        }

        let contents = std::fs::read_to_string(&self.config_path)?;
        let expanded = expand_env_vars(&contents)?;

        // An empty document is valid and means "nothing configured"
        if expanded.trim().is_empty() {
            return Ok(ClientOptions::default());
        }

        serde_yaml::from_str(&expanded).map_err(|e| ConfigError::ParseError {
            line: e.location().map(|l| l.line()),
            message: e.to_string(),
        })
    }

    /// Save client options to the config file.
    ///
    /// Credentials are left out; reference them with `${VAR}` by hand or
    /// supply them through the environment.
    pub fn save(&self, options: &ClientOptions) -> Result<(), ConfigError> {
        if let Some(dir) = self.config_path.parent() {
            std::fs::create_dir_all(dir)?;
        }

        let options = ClientOptions {
            credentials: Credentials::default(),
            ..options.clone()
        };
        let yaml = serde_yaml::to_string(&options).map_err(|e| ConfigError::ParseError {
            line: None,
            message: e.to_string(),
        })?;

        std::fs::write(&self.config_path, yaml)?;
        Ok(())
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new(std::env::current_dir().unwrap_or_default())
    }
}

/// Expand environment variables in the form `${VAR}` or `${VAR:-default}`.
pub fn expand_env_vars(content: &str) -> Result<String, ConfigError> {
    let re = regex::Regex::new(r"\$\{([^}:]+)(?::-([^}]*))?\}").expect("static pattern");
    let mut result = content.to_string();

    for cap in re.captures_iter(content) {
        let full_match = &cap[0];
        let var_name = &cap[1];
        let default = cap.get(2).map(|m| m.as_str());

        let value = match std::env::var(var_name) {
            Ok(v) => v,
            Err(_) => match default {
                Some(d) => d.to_string(),
                None => {
                    return Err(ConfigError::EnvVarNotFound {
                        var: var_name.to_string(),
                    })
                }
            },
        };

        result = result.replace(full_match, &value);
    }

    Ok(result)
}

/// Validate a resolved configuration.
pub fn validate(config: &ClientConfig) -> Result<(), ConfigError> {
    if !matches!(config.endpoint.scheme(), "http" | "https") {
        return Err(ConfigError::ValidationError {
            message: format!("endpoint must use http or https, got {}", config.endpoint.scheme()),
        });
    }

    if config.endpoint.host_str().is_none() {
        return Err(ConfigError::ValidationError {
            message: "endpoint must include a host".to_string(),
        });
    }

    if config.connection.connect_timeout_secs == 0 {
        return Err(ConfigError::ValidationError {
            message: "connection.connect_timeout_secs must be greater than 0".to_string(),
        });
    }

    if config.connection.request_timeout_secs == 0 {
        return Err(ConfigError::ValidationError {
            message: "connection.request_timeout_secs must be greater than 0".to_string(),
        });
    }

    Ok(())
}
