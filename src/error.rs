use std::path::PathBuf;
use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum AppError {
    /// The whole fetch failed; nothing usable came back from upstream.
    #[error("Market data source unavailable: {0}")]
    SourceUnavailable(String),

    /// Persisted state exists but cannot be parsed. Never reset silently.
    #[error("Store corrupt at {}: {reason}", path.display())]
    StoreCorrupt { path: PathBuf, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Render error: {0}")]
    Render(String),
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Parse(format!("JSON error: {}", err))
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Network(err.to_string())
    }
}

impl From<handlebars::RenderError> for AppError {
    fn from(err: handlebars::RenderError) -> Self {
        AppError::Render(err.to_string())
    }
}

impl From<handlebars::TemplateError> for AppError {
    fn from(err: handlebars::TemplateError) -> Self {
        AppError::Render(format!("Template error: {}", err))
    }
}

impl AppError {
    /// Fatal errors abort the run before any output is touched.
    pub fn is_fatal(&self) -> bool {
        matches!(self, AppError::SourceUnavailable(_) | AppError::StoreCorrupt { .. })
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
