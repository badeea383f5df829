use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Largest number of decimal places a `Decimal` can hold.
const MAX_PRECISION: u32 = 28;

pub const KEYS: [&str; 6] = [
    "max_history_size",
    "auto_save",
    "precision",
    "max_input_value",
    "history_file",
    "log_file",
];

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub max_history_size: usize,
    pub auto_save: bool,
    pub precision: u32,
    pub max_input_value: Decimal,
    pub history_file: PathBuf,
    pub log_file: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self::with_base_dir(&default_base_dir())
    }
}

impl Config {
    pub fn with_base_dir(base_dir: &Path) -> Self {
        Self {
            max_history_size: 1000,
            auto_save: true,
            precision: 10,
            max_input_value: Decimal::from_i128_with_scale(100_000_000_000_000_000_000, 0),
            history_file: history_file_in(base_dir),
            log_file: log_file_in(base_dir),
        }
    }

    /// Defaults, then the config file if there is one, then the environment.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = get_config_file_path().ok();
        Self::load_from(config_path.as_deref(), |key| env::var(key).ok())
    }

    pub fn load_from(
        config_path: Option<&Path>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut config = match config_path {
            Some(path) if path.exists() => {
                let content = fs::read_to_string(path)
                    .map_err(|e| ConfigError::ReadError(e.to_string()))?;
                Self::from_toml_str(&content)?
            }
            _ => Self::default(),
        };

        config.apply_env(lookup)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        if let Some(base_dir) = lookup("CALCULATOR_BASE_DIR") {
            let base_dir = PathBuf::from(base_dir);
            self.history_file = history_file_in(&base_dir);
            self.log_file = log_file_in(&base_dir);
        }

        for key in KEYS {
            let var = format!("CALCULATOR_{}", key.to_ascii_uppercase());
            if let Some(value) = lookup(&var) {
                self.set(key, &value)?;
            }
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_history_size < 1 {
            return Err(ConfigError::Invalid(
                "max_history_size must be at least 1".to_string(),
            ));
        }
        if self.max_input_value <= Decimal::ZERO {
            return Err(ConfigError::Invalid(
                "max_input_value must be positive".to_string(),
            ));
        }
        if self.precision > MAX_PRECISION {
            return Err(ConfigError::Invalid(format!(
                "precision must be at most {}",
                MAX_PRECISION
            )));
        }
        Ok(())
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        let config_path = get_config_file_path()?;
        self.save_to(&config_path)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::WriteError(e.to_string()))?;
        }

        let content =
            toml::to_string(self).map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        fs::write(config_path, content).map_err(|e| ConfigError::WriteError(e.to_string()))?;

        Ok(())
    }

    pub fn get(&self, key: &str) -> Result<String, ConfigError> {
        let value = match key {
            "max_history_size" => self.max_history_size.to_string(),
            "auto_save" => self.auto_save.to_string(),
            "precision" => self.precision.to_string(),
            "max_input_value" => self.max_input_value.to_string(),
            "history_file" => self.history_file.display().to_string(),
            "log_file" => self.log_file.display().to_string(),
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        };
        Ok(value)
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = || ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        };
        let value = value.trim();

        match key {
            "max_history_size" => self.max_history_size = value.parse().map_err(|_| invalid())?,
            "auto_save" => self.auto_save = parse_bool(value).ok_or_else(invalid)?,
            "precision" => self.precision = value.parse().map_err(|_| invalid())?,
            "max_input_value" => {
                self.max_input_value = parse_decimal(value).ok_or_else(invalid)?
            }
            "history_file" => self.history_file = PathBuf::from(value),
            "log_file" => self.log_file = PathBuf::from(value),
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        }
        Ok(())
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn parse_decimal(value: &str) -> Option<Decimal> {
    value
        .parse::<Decimal>()
        .ok()
        .or_else(|| Decimal::from_scientific(value).ok())
}

fn default_base_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("calculator")
}

fn history_file_in(base_dir: &Path) -> PathBuf {
    base_dir.join("history").join("calculator_history.csv")
}

fn log_file_in(base_dir: &Path) -> PathBuf {
    base_dir.join("logs").join("calculator.log")
}

pub fn get_config_file_path() -> Result<PathBuf, ConfigError> {
    let config_dir = dirs::config_dir().ok_or(ConfigError::ConfigDirNotFound)?;

    Ok(config_dir.join("calculator").join("config.toml"))
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not find config directory")]
    ConfigDirNotFound,

    #[error("Failed to read config file: {0}")]
    ReadError(String),

    #[error("Failed to write config file: {0}")]
    WriteError(String),

    #[error("Failed to parse config file: {0}")]
    ParseError(String),

    #[error("Failed to serialize config: {0}")]
    SerializeError(String),

    #[error("Unknown configuration key '{0}'. Supported keys: {keys}", keys = KEYS.join(", "))]
    UnknownKey(String),

    #[error("Invalid value '{value}' for configuration key '{key}'")]
    InvalidValue { key: String, value: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
