//! Run configuration
//!
//! Plain structs with defaults, optionally loaded from a YAML file. Nothing here reads
//! process-wide state; the CLI resolves flags and environment before building a
//! [`PipelineConfig`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Report shaping options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Property holding a node's display name
    pub name_property: String,
    /// Property holding an ARN-like identifier
    pub arn_property: String,
    /// Separator used to join a node's labels
    pub label_separator: String,
    /// Maximum length of a sanitized table name
    pub max_table_name_len: usize,
    /// Table name used when sanitization leaves nothing
    pub unknown_table_name: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            name_property: "name".to_string(),
            arn_property: "arn".to_string(),
            label_separator: "|".to_string(),
            max_table_name_len: 31,
            unknown_table_name: "Unknown_Label".to_string(),
        }
    }
}

impl ReportConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        if self.name_property.trim().is_empty() {
            return Err(ConfigError::Invalid("name_property must not be empty".into()));
        }
        if self.arn_property.trim().is_empty() {
            return Err(ConfigError::Invalid("arn_property must not be empty".into()));
        }
        if self.label_separator.is_empty() {
            return Err(ConfigError::Invalid("label_separator must not be empty".into()));
        }
        // Room for the widest de-duplication suffix we emit
        if self.max_table_name_len < 4 {
            return Err(ConfigError::Invalid(format!(
                "max_table_name_len must be at least 4, got {}",
                self.max_table_name_len
            )));
        }
        if self.unknown_table_name.is_empty()
            || self.unknown_table_name.chars().count() > self.max_table_name_len
        {
            return Err(ConfigError::Invalid(format!(
                "unknown_table_name must be 1..={} characters",
                self.max_table_name_len
            )));
        }
        Ok(())
    }
}

/// Output encoding for written reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Csv,
    Json,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Csv => write!(f, "csv"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Full configuration of one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Node records file
    pub nodes_path: Option<PathBuf>,
    /// Edge records file
    pub edges_path: Option<PathBuf>,
    /// Directory reports are written to
    pub output_dir: PathBuf,
    pub output_format: OutputFormat,
    pub report: ReportConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            nodes_path: None,
            edges_path: None,
            output_dir: PathBuf::from("./tmp/output"),
            output_format: OutputFormat::Csv,
            report: ReportConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Load from a YAML file; missing keys take their defaults
    pub fn from_yaml_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    pub fn from_yaml_str(text: &str) -> ConfigResult<Self> {
        let config: PipelineConfig = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.output_dir.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("output_dir must not be empty".into()));
        }
        self.report.validate()
    }
}
