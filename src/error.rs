use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why the vision collaborator could not produce results for a request.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionError {
    #[error("image cannot be analyzed: unsupported format ({0})")]
    UnsupportedFormat(String),

    #[error("image cannot be analyzed: zero-size image")]
    ZeroSizeImage,

    #[error("vision service error: {0}")]
    Internal(String),
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Failed to install logger: {0}")]
    Logger(#[from] log::SetLoggerError),

    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("Display task has stopped")]
    DisplayClosed,

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

pub type Result<T> = std::result::Result<T, Error>;
