//! Error types shared across Paircast crates.

use std::path::PathBuf;

/// Top-level error type for Paircast operations.
#[derive(Debug, thiserror::Error)]
pub enum PaircastError {
    #[error("Unsupported media: {message}")]
    UnsupportedMedia { message: String },

    #[error("Not ready: {message}")]
    NotReady { message: String },

    #[error("Capture initialization error: {message}")]
    CaptureInit { message: String },

    #[error("Compositing error: {message}")]
    Compositing { message: String },

    #[error("Encoding error: {message}")]
    Encoding { message: String },

    #[error("Session error: {message}")]
    Session { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid source slot: {slot}")]
    InvalidSlot { slot: usize },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using PaircastError.
pub type PaircastResult<T> = Result<T, PaircastError>;

impl PaircastError {
    pub fn unsupported_media(msg: impl Into<String>) -> Self {
        Self::UnsupportedMedia {
            message: msg.into(),
        }
    }

    pub fn not_ready(msg: impl Into<String>) -> Self {
        Self::NotReady {
            message: msg.into(),
        }
    }

    pub fn capture_init(msg: impl Into<String>) -> Self {
        Self::CaptureInit {
            message: msg.into(),
        }
    }

    pub fn compositing(msg: impl Into<String>) -> Self {
        Self::Compositing {
            message: msg.into(),
        }
    }

    pub fn encoding(msg: impl Into<String>) -> Self {
        Self::Encoding {
            message: msg.into(),
        }
    }

    pub fn session(msg: impl Into<String>) -> Self {
        Self::Session {
            message: msg.into(),
        }
    }
}
