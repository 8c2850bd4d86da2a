use crate::api::auth::SharedSecret;
use crate::whitelist::ReadPolicy;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_CONFIG_FILE: &str = "config.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("File read error")]
    FileError,

    #[error("Deserialization error:{0}")]
    DeserializationError(String),

    #[error("SECRET_KEY must be set to a non-empty value")]
    MissingSecret,

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Config {
    pub port: u16,
    pub whitelist_file: PathBuf,
    pub static_dir: PathBuf,
    pub log_level: String,
    pub read_policy: ReadPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3000,
            whitelist_file: PathBuf::from("whitelist.json"),
            static_dir: PathBuf::from("public"),
            log_level: "info".to_string(),
            read_policy: ReadPolicy::FailOpen,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Context {
    pub config: Config,
    pub secret: SharedSecret,
}

impl Context {
    // Reads the optional config file named by CONFIG_FILE, then the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        let config_file =
            std::env::var("CONFIG_FILE").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        Self::new(&config_file, |key| std::env::var(key).ok())
    }

    pub fn new<F>(config_file: &str, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::new(config_file)?;
        config.apply_overrides(&env)?;

        let secret = env("SECRET_KEY")
            .filter(|secret| !secret.is_empty())
            .map(SharedSecret::new)
            .ok_or(ConfigError::MissingSecret)?;

        Ok(Self { config, secret })
    }
}

impl Config {
    // A missing file means defaults; an unreadable or malformed one is an error
    pub fn new(config_file: &str) -> Result<Self, ConfigError> {
        if !Path::new(config_file).exists() {
            return Ok(Config::default());
        }
        let config_str = fs::read_to_string(config_file).map_err(|_| ConfigError::FileError)?;
        let config: Config = serde_json::from_str(&config_str)
            .map_err(|e| ConfigError::DeserializationError(e.to_string()))?;
        Ok(config)
    }

    fn apply_overrides<F>(&mut self, env: &F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = env("PORT") {
            self.port = port.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: "PORT".to_string(),
                value: port.clone(),
            })?;
        }
        if let Some(path) = env("WHITELIST_FILE") {
            self.whitelist_file = PathBuf::from(path);
        }
        if let Some(path) = env("STATIC_DIR") {
            self.static_dir = PathBuf::from(path);
        }
        if let Some(level) = env("LOG_LEVEL") {
            self.log_level = level;
        }
        if let Some(policy) = env("WHITELIST_READ_POLICY") {
            self.read_policy = policy
                .parse()
                .map_err(|_| ConfigError::InvalidValue {
                    key: "WHITELIST_READ_POLICY".to_string(),
                    value: policy.clone(),
                })?;
        }
        Ok(())
    }
}
