//! Configuration loading for analysis runs.

use anyhow::Context;
use serde::Deserialize;
use std::fmt;
use std::path::Path;

use crate::analyzer::{AnalysisRequest, DEFAULT_MAX_OBJECTS, FilterPolicy, LineLayout, MetricKind};
use crate::common::export::ExportFormat;

/// Largest object-count bound accepted from a config file.
const MAX_OBJECT_BOUND: usize = 4096;

/// Error type for configuration loading failures.
#[derive(Debug)]
pub enum ConfigError {
    FileRead(String),
    Parse(String),
    Validation(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::FileRead(msg) => write!(f, "Failed to read config file: {}", msg),
            ConfigError::Parse(msg) => write!(f, "Failed to parse config file: {}", msg),
            ConfigError::Validation(msg) => write!(f, "Invalid configuration: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

/// A preset name (`"v2"`) or a table of signed token offsets.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum LayoutChoice {
    Named(String),
    Custom(LineLayout),
}

impl Default for LayoutChoice {
    fn default() -> Self {
        LayoutChoice::Named("v2".to_string())
    }
}

impl LayoutChoice {
    pub fn resolve(&self) -> Result<LineLayout, ConfigError> {
        match self {
            LayoutChoice::Named(name) => LineLayout::by_name(name)
                .ok_or_else(|| ConfigError::Validation(format!("Unknown layout {:?}, expected \"v1\" or \"v2\"", name))),
            LayoutChoice::Custom(layout) => Ok(*layout),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct ExportConfig {
    pub format: ExportFormat,
}

/// Settings for one analysis run.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct AnalyzerConfig {
    /// Object ids must be below this bound (the simulation's object count).
    pub max_objects: usize,
    pub layout: LayoutChoice,
    pub filter: FilterPolicy,
    pub export: ExportConfig,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            max_objects: DEFAULT_MAX_OBJECTS,
            layout: LayoutChoice::default(),
            filter: FilterPolicy::default(),
            export: ExportConfig::default(),
        }
    }
}

impl AnalyzerConfig {
    /// Load and validate configuration from a TOML file.
    ///
    /// # Arguments
    /// * `config_path` - Path to the config.toml file
    ///
    /// # Returns
    /// * `Ok(AnalyzerConfig)` if the file was successfully loaded, parsed and validated
    /// * `Err(ConfigError)` describing the failing stage otherwise
    pub fn load(config_path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(config_path)
            .with_context(|| config_path.display().to_string())
            .map_err(|e| ConfigError::FileRead(format!("{:#}", e)))?;

        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: AnalyzerConfig = toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_objects == 0 || self.max_objects > MAX_OBJECT_BOUND {
            return Err(ConfigError::Validation(format!(
                "max-objects {} outside 1-{}",
                self.max_objects, MAX_OBJECT_BOUND
            )));
        }
        self.layout.resolve()?;
        Ok(())
    }

    pub fn filter_policy(&self) -> FilterPolicy {
        self.filter
    }

    /// Build the request for the given metric kinds.
    pub fn analysis_request(&self, kinds: Vec<MetricKind>) -> Result<AnalysisRequest, ConfigError> {
        self.validate()?;
        Ok(AnalysisRequest {
            layout: self.layout.resolve()?,
            max_objects: self.max_objects,
            filter: self.filter_policy(),
            kinds,
        })
    }
}
