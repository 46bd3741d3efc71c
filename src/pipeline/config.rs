use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ExtractionError;

/// Configuration for one extraction run
#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    pub patterns: Vec<String>,
    pub correlation_field: Option<String>,
}

impl PipelineConfig {
    pub fn new(patterns: Vec<String>) -> Self {
        PipelineConfig {
            patterns,
            correlation_field: None,
        }
    }

    pub fn with_correlation(mut self, field: impl Into<String>) -> Self {
        self.correlation_field = Some(field.into());
        self
    }

    /// Syntactic checks only; patterns are compiled by the parser
    pub fn validate(&self) -> Result<(), ExtractionError> {
        if self.patterns.is_empty() {
            return Err(ExtractionError::EmptyPatternList);
        }
        if let Some(index) = self.patterns.iter().position(|p| p.trim().is_empty()) {
            return Err(ExtractionError::EmptyPattern { index });
        }
        if let Some(field) = &self.correlation_field {
            if field.trim().is_empty() {
                return Err(ExtractionError::EmptyCorrelationField);
            }
        }
        Ok(())
    }
}

/// Settings loaded from a YAML file with `--config`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub patterns: Vec<String>,
    pub correlate: Option<String>,
    pub limit: Option<usize>,
    pub stats_columns: Option<usize>,
    pub output: Option<PathBuf>,
    pub csv_groups: Option<bool>,
}

impl FileConfig {
    pub fn from_yaml(content: &str) -> Result<Self, ExtractionError> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn load(path: &Path) -> Result<Self, ExtractionError> {
        let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ExtractionError::FileNotFound(path.to_path_buf()),
            _ => ExtractionError::IoError(e),
        })?;
        Self::from_yaml(&content)
    }
}
