//! CLI configuration.
//!
//! Configuration is loaded in the following order (later overrides earlier):
//! 1. Default values
//! 2. YAML config file (if specified via TABLEFSM_CONFIG or --config)
//! 3. Environment variables
//! 4. Command-line flags

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tablefsm_core::EngineOwner;
use thiserror::Error;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// How the engine is built.
    pub engine: EngineConfig,
    /// Output formatting.
    pub output: OutputConfig,
    /// Interactive shell settings.
    pub repl: ReplConfig,
}

impl Config {
    /// Loads configuration from `path` (if any), then applies environment
    /// variable overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Loads configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(path.to_path_buf(), e))?;
        let config: Config = serde_yaml::from_str(&content)
            .map_err(|e| ConfigError::ParseError(path.to_path_buf(), e.to_string()))?;
        Ok(config)
    }

    /// Applies environment variable overrides to the configuration.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies overrides from `lookup`, keyed by environment variable name.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        self.engine.apply_overrides(&lookup);
        self.output.apply_overrides(&lookup);
        self.repl.apply_overrides(&lookup);
    }

    /// Checks settings that only make sense together.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.engine.validate()
    }
}

/// Engine construction settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Transition table file (JSON, or YAML by extension). The default
    /// lifecycle is used when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<PathBuf>,
    /// Current state after loading the table.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_state: Option<String>,
    /// Previous state after loading the table.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_state: Option<String>,
    /// Tenant of the tracked entity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
    /// User owning the tracked entity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl EngineConfig {
    fn apply_overrides<F>(&mut self, lookup: &F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup("TABLEFSM_TABLE") {
            self.table = Some(PathBuf::from(path));
        }
        if let Some(state) = lookup("TABLEFSM_CURRENT_STATE") {
            self.current_state = Some(state);
        }
        if let Some(state) = lookup("TABLEFSM_PREVIOUS_STATE") {
            self.previous_state = Some(state);
        }
        if let Some(tenant) = lookup("TABLEFSM_TENANT_ID") {
            self.tenant_id = Some(tenant);
        }
        if let Some(user) = lookup("TABLEFSM_USER_ID") {
            self.user_id = Some(user);
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.table.is_none() && (self.current_state.is_some() || self.previous_state.is_some())
        {
            return Err(ConfigError::ValidationError(
                "current_state/previous_state require a table".to_string(),
            ));
        }
        if self.tenant_id.is_some() != self.user_id.is_some() {
            return Err(ConfigError::ValidationError(
                "tenant_id and user_id must be set together".to_string(),
            ));
        }
        Ok(())
    }

    /// Returns the configured owner, if both ids are set.
    pub fn owner(&self) -> Option<EngineOwner> {
        match (&self.tenant_id, &self.user_id) {
            (Some(tenant), Some(user)) => Some(EngineOwner::new(tenant, user)),
            _ => None,
        }
    }
}

/// Output formatting settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Colorize terminal output.
    pub color: bool,
    /// Pretty-print JSON output.
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            color: true,
            pretty: false,
        }
    }
}

impl OutputConfig {
    fn apply_overrides<F>(&mut self, lookup: &F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(color) = lookup("TABLEFSM_COLOR") {
            self.color = parse_bool(&color);
        }
        if let Some(pretty) = lookup("TABLEFSM_PRETTY") {
            self.pretty = parse_bool(&pretty);
        }
    }
}

/// Interactive shell settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplConfig {
    /// File the REPL history is kept in.
    pub history_file: PathBuf,
}

impl Default for ReplConfig {
    fn default() -> Self {
        let history_file = home::home_dir()
            .map(|h| h.join(".tablefsm_history"))
            .unwrap_or_else(|| PathBuf::from(".tablefsm_history"));
        Self { history_file }
    }
}

impl ReplConfig {
    fn apply_overrides<F>(&mut self, lookup: &F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup("TABLEFSM_HISTORY_FILE") {
            self.history_file = PathBuf::from(path);
        }
    }
}

fn parse_bool(value: &str) -> bool {
    value == "1" || value.eq_ignore_ascii_case("true")
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{}': {1}", .0.display())]
    IoError(PathBuf, #[source] std::io::Error),

    #[error("failed to parse config file '{}': {1}", .0.display())]
    ParseError(PathBuf, String),

    #[error("configuration validation failed: {0}")]
    ValidationError(String),
}
