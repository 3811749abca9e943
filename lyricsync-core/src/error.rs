use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    // Configuration errors
    #[error("Config file not found at {path}. A template has been created - edit it if needed and run again.")]
    ConfigNotFound { path: PathBuf },

    #[error("Invalid config: {message}")]
    ConfigInvalid { message: String },

    #[error("Failed to parse config file: {0}")]
    ConfigParseError(#[from] toml::de::Error),

    // Sync session errors
    #[error("Lyrics are empty - enter at least one non-empty line before syncing")]
    EmptyLyrics,

    #[error("A sync session is already recording")]
    SessionActive,

    #[error("No sync session is recording")]
    NoActiveSession,

    // Track format errors
    #[error("Unsupported track format: {extension}")]
    UnsupportedFormat { extension: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // IO errors
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CoreError>;
