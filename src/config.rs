//! Validation configuration, flattenable into a service's CLI config.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{ArgAction, Args};
use tracing::info;

use crate::validator::TypeRuleSet;

/// Request validation configuration.
///
/// All values can be set via environment variables or CLI arguments. Embed
/// in a service config with `#[command(flatten)]`.
#[derive(Debug, Clone, Args)]
pub struct ValidationConfig {
    /// Rules file overriding declared field rules (.yaml, .yml or .json)
    #[arg(long = "validation-rules-file", env = "VALIDATION_RULES_FILE")]
    pub rules_file: Option<PathBuf>,

    /// Log rejected requests at debug level
    #[arg(
        long = "validation-log-violations",
        env = "VALIDATION_LOG_VIOLATIONS",
        default_value = "true",
        action = ArgAction::Set
    )]
    pub log_violations: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            rules_file: None,
            log_violations: true,
        }
    }
}

/// Configuration and rules-file errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Validation rules file not found: {0}")]
    RulesFileNotFound(PathBuf),
    #[error("Unsupported validation rules format: {0} (expected .yaml, .yml or .json)")]
    UnsupportedRulesFormat(PathBuf),
    #[error("Failed to read validation rules: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid YAML validation rules: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
    #[error("Invalid JSON validation rules: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RulesFormat {
    Yaml,
    Json,
}

impl RulesFormat {
    fn of(path: &Path) -> Result<Self, ConfigError> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
                Ok(Self::Yaml)
            }
            Some(ext) if ext.eq_ignore_ascii_case("json") => Ok(Self::Json),
            _ => Err(ConfigError::UnsupportedRulesFormat(path.to_path_buf())),
        }
    }
}

impl ValidationConfig {
    /// Validate configuration values.
    ///
    /// # Errors
    /// Returns [`ConfigError`] if the rules file is missing or has an
    /// unsupported extension.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(path) = &self.rules_file {
            RulesFormat::of(path)?;
            if !path.is_file() {
                return Err(ConfigError::RulesFileNotFound(path.clone()));
            }
        }
        Ok(())
    }

    /// Load the configured rules file, if any.
    ///
    /// # Errors
    /// Returns [`ConfigError`] if the file is invalid or cannot be parsed.
    pub fn load_rules(&self) -> Result<Option<TypeRuleSet>, ConfigError> {
        let Some(path) = &self.rules_file else {
            return Ok(None);
        };
        self.validate()?;

        let contents = fs::read_to_string(path)?;
        let rules: TypeRuleSet = match RulesFormat::of(path)? {
            RulesFormat::Yaml => serde_yaml_ng::from_str(&contents)?,
            RulesFormat::Json => serde_json::from_str(&contents)?,
        };

        info!(path = %path.display(), types = rules.len(), "Loaded validation rules");
        Ok(Some(rules))
    }
}
