use crate::error::{ConfigError, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_directory")]
    pub directory: String,
    #[serde(default = "default_log_filename")]
    pub filename: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,

    #[serde(default = "default_sort")]
    pub default_sort: String,

    #[serde(default = "default_since")]
    pub default_since: String,

    #[serde(default)]
    pub logging: LogConfig,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            directory: default_log_directory(),
            filename: default_log_filename(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            user_agent: default_user_agent(),
            request_timeout: default_request_timeout(),
            default_sort: default_sort(),
            default_since: default_since(),
            logging: LogConfig::default(),
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::FileRead)?;

        let config: Config = toml::from_str(&content).map_err(ConfigError::Parse)?;

        config.validate()?;
        info!("Configuration loaded successfully");
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.base_url.is_empty() {
            return Err(ConfigError::MissingField("base_url".to_string()).into());
        }
        if !self.base_url.starts_with("http") {
            return Err(ConfigError::InvalidValue(format!(
                "base_url must start with http(s): {}",
                self.base_url
            ))
            .into());
        }

        if self.request_timeout == 0 {
            return Err(ConfigError::InvalidValue(
                "request_timeout must be greater than 0".to_string(),
            )
            .into());
        }

        if self.default_sort.is_empty() {
            return Err(ConfigError::InvalidValue("default_sort cannot be empty".to_string()).into());
        }

        if self.default_since.is_empty() {
            return Err(
                ConfigError::InvalidValue("default_since cannot be empty".to_string()).into(),
            );
        }

        Ok(())
    }
}

fn default_base_url() -> String {
    "https://github.com".to_string()
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/132.0.0.0 Safari/537.36".to_string()
}

fn default_request_timeout() -> u64 {
    15
}

fn default_sort() -> String {
    "stars".to_string()
}

fn default_since() -> String {
    "daily".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_directory() -> String {
    "logs".to_string()
}

fn default_log_filename() -> String {
    "gh_explore.log".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.base_url, "https://github.com");
        assert_eq!(config.default_sort, "stars");
        assert_eq!(config.default_since, "daily");
    }

    #[test]
    fn rejects_non_http_base_url() {
        let config = Config {
            base_url: "ftp://github.com".to_string(),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config: Config = toml::from_str("base_url = \"https://example.test\"").unwrap();
        assert_eq!(config.base_url, "https://example.test");
        assert_eq!(config.default_since, "daily");
        assert_eq!(config.logging.level, "info");
    }
}
