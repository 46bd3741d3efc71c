use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    #[error("At least one pattern is required")]
    EmptyPatternList,

    #[error("Pattern at index {index} is empty")]
    EmptyPattern { index: usize },

    #[error("Invalid pattern at index {index}: {source}")]
    InvalidPattern {
        index: usize,
        #[source]
        source: regex::Error,
    },

    #[error("Correlation field name cannot be empty")]
    EmptyCorrelationField,

    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Processing cancelled")]
    Cancelled,

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Export failed: {0}")]
    ExportError(String),
}

impl From<serde_json::Error> for ExtractionError {
    fn from(err: serde_json::Error) -> Self {
        ExtractionError::ExportError(format!("JSON encoding error: {}", err))
    }
}

impl From<csv::Error> for ExtractionError {
    fn from(err: csv::Error) -> Self {
        ExtractionError::ExportError(format!("CSV encoding error: {}", err))
    }
}

impl From<serde_yaml::Error> for ExtractionError {
    fn from(err: serde_yaml::Error) -> Self {
        ExtractionError::ConfigError(err.to_string())
    }
}
