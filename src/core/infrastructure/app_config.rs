use crate::model::config::{Config, ConfigTable};
use crate::model::error::Error;
use crate::model::error::config::ConfigError;
use std::fs;
use std::ops::Deref;
use std::path::Path;

pub const MAX_POLL_INTERVAL: u64 = 3600;

#[derive(Debug, Clone)]
pub struct AppConfig {
    config: Config,
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self, Error> {
        let config = Self::load_config_file(path)?;
        Self::from_config(config)
    }

    pub fn from_config(config: Config) -> Result<Self, Error> {
        Self::validate(&config)?;
        Ok(Self { config })
    }

    fn load_config_file(path: &Path) -> Result<Config, Error> {
        let toml_string = fs::read_to_string(path)
            .map_err(|err| ConfigError::config_not_found(path, err))?;
        Self::parse(&toml_string)
    }

    fn parse(toml_string: &str) -> Result<Config, Error> {
        let config = toml::from_str::<ConfigTable>(toml_string)
            .map_err(ConfigError::invalid_config)?
            .config;
        Ok(config)
    }

    fn validate(config: &Config) -> Result<(), ConfigError> {
        if config.database_url.trim().is_empty() {
            return Err(ConfigError::invalid_config_value(
                "database_url",
                "must not be empty",
            ));
        }
        if config.store_path.as_os_str().is_empty() {
            return Err(ConfigError::invalid_config_value(
                "store_path",
                "must not be empty",
            ));
        }
        if !(1..=MAX_POLL_INTERVAL).contains(&config.poll_interval) {
            return Err(ConfigError::invalid_config_value(
                "poll_interval",
                format!("must be between 1 and {MAX_POLL_INTERVAL} seconds"),
            ));
        }
        if config.max_concurrency == 0 {
            return Err(ConfigError::invalid_config_value(
                "max_concurrency",
                "must be at least 1",
            ));
        }
        if config.dump_tool.trim().is_empty() {
            return Err(ConfigError::invalid_config_value(
                "dump_tool",
                "must not be empty",
            ));
        }
        Ok(())
    }
}

impl Deref for AppConfig {
    type Target = Config;

    fn deref(&self) -> &Self::Target {
        &self.config
    }
}
