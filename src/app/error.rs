use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CorpusError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Unsupported URL scheme: {0}")]
    UnsupportedScheme(String),

    #[error("Browser error: {0}")]
    Browser(String),

    #[error("Malformed manifest line {line}: {content}")]
    Manifest { line: usize, content: String },

    #[error("Missing column {column} in {path}")]
    MissingColumn { column: &'static str, path: PathBuf },

    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, CorpusError>;
