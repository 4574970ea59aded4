//! Engine configuration
//!
//! Loaded from YAML or environment variables, or built in code. The
//! parameter marker convention is an explicit per-dialect setting: the
//! descriptor table carries a default, and `parameter_styles` overrides it.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::env;
use std::path::Path;
use thiserror::Error;

use crate::dialect::{ParameterStyle, SqlDialect};

/// Default bound on resolution passes
pub const DEFAULT_MAX_ITERATIONS: usize = 8;

/// Upper limit accepted for `max_iterations`
const MAX_ITERATIONS_LIMIT: usize = 64;

/// Configuration error type
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for field '{field}': '{value}'. Expected: {expected}")]
    InvalidValue {
        field: String,
        value: String,
        expected: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl ConfigError {
    /// Create an invalid value error
    pub fn invalid_value(
        field: impl Into<String>,
        value: impl Into<String>,
        expected: impl Into<String>,
    ) -> Self {
        Self::InvalidValue {
            field: field.into(),
            value: value.into(),
            expected: expected.into(),
        }
    }
}

/// Template engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Bound on nested-placeholder resolution passes
    pub max_iterations: usize,
    /// Per-dialect parameter marker overrides
    pub parameter_styles: BTreeMap<SqlDialect, ParameterStyle>,
    /// Batch size used by `batch_insert` when the template gives none
    pub default_batch_size: Option<usize>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            parameter_styles: BTreeMap::new(),
            default_batch_size: None,
        }
    }
}

impl EngineConfig {
    /// Parse and validate configuration from YAML
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate configuration from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Load configuration from environment variables.
    ///
    /// - `ELIF_SQLTEMPLATE_MAX_ITERATIONS`: pass bound
    /// - `ELIF_SQLTEMPLATE_PARAMETER_STYLES`: e.g. `postgresql=numbered,db2=positional`
    /// - `ELIF_SQLTEMPLATE_BATCH_SIZE`: default batch size
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(value) = env::var("ELIF_SQLTEMPLATE_MAX_ITERATIONS") {
            config.max_iterations = value.parse().map_err(|_| {
                ConfigError::invalid_value("max_iterations", &value, "positive integer")
            })?;
        }

        if let Ok(value) = env::var("ELIF_SQLTEMPLATE_PARAMETER_STYLES") {
            config.parameter_styles = parse_parameter_styles(&value)?;
        }

        if let Ok(value) = env::var("ELIF_SQLTEMPLATE_BATCH_SIZE") {
            let size = value.parse().map_err(|_| {
                ConfigError::invalid_value("default_batch_size", &value, "positive integer")
            })?;
            config.default_batch_size = Some(size);
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_iterations == 0 || self.max_iterations > MAX_ITERATIONS_LIMIT {
            return Err(ConfigError::invalid_value(
                "max_iterations",
                self.max_iterations.to_string(),
                format!("1..={}", MAX_ITERATIONS_LIMIT),
            ));
        }

        if self.default_batch_size == Some(0) {
            return Err(ConfigError::invalid_value(
                "default_batch_size",
                "0",
                "positive integer",
            ));
        }

        Ok(())
    }

    /// Set the pass bound
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Override the parameter style for one dialect
    pub fn with_parameter_style(mut self, dialect: SqlDialect, style: ParameterStyle) -> Self {
        self.parameter_styles.insert(dialect, style);
        self
    }

    /// Set the default batch size
    pub fn with_default_batch_size(mut self, size: usize) -> Self {
        self.default_batch_size = Some(size);
        self
    }

    /// Effective parameter style for `dialect`
    pub fn parameter_style(&self, dialect: SqlDialect) -> ParameterStyle {
        self.parameter_styles
            .get(&dialect)
            .copied()
            .unwrap_or(dialect.descriptor().parameter_style)
    }
}

fn parse_parameter_styles(value: &str) -> Result<BTreeMap<SqlDialect, ParameterStyle>, ConfigError> {
    let mut styles = BTreeMap::new();

    for entry in value.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let (dialect, style) = entry.split_once('=').ok_or_else(|| {
            ConfigError::invalid_value("parameter_styles", entry, "dialect=style")
        })?;

        let dialect: SqlDialect = dialect.trim().parse().map_err(|_| {
            ConfigError::invalid_value("parameter_styles", dialect, "a supported dialect")
        })?;
        let style = match style.trim().to_lowercase().as_str() {
            "named" => ParameterStyle::Named,
            "positional" => ParameterStyle::Positional,
            "numbered" => ParameterStyle::Numbered,
            other => {
                return Err(ConfigError::invalid_value(
                    "parameter_styles",
                    other,
                    "named, positional or numbered",
                ))
            }
        };

        styles.insert(dialect, style);
    }

    Ok(styles)
}
