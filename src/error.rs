//! Error types shared by the bridge client, the store and the state container.

use serde::Serialize;
use thiserror::Error;

/// Errors that can occur while talking to the host shell or local storage.
///
/// Serializes as `{ "kind": ..., "message": ... }` so a front end can show
/// the message and branch on the kind.
#[derive(Debug, Error, Serialize)]
#[serde(tag = "kind", content = "message")]
pub enum AppError {
    /// A bridge command failed or the bridge could not be reached.
    #[error("Bridge error: {0}")]
    Bridge(String),
    /// Reading or writing the persisted store failed.
    #[error("Store error: {0}")]
    Store(String),
    /// The caller passed arguments the operation cannot accept.
    #[error("{0}")]
    InvalidArguments(String),
    /// Configuration could not be resolved or written.
    #[error("Configuration error: {0}")]
    Config(String),
    /// IO error.
    #[error("IO error: {0}")]
    Io(String),
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(String),
    /// A payload could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

pub type Result<T> = std::result::Result<T, AppError>;

impl From<zbus::Error> for AppError {
    fn from(err: zbus::Error) -> Self {
        match err {
            // Method errors carry the host's own message; keep it readable.
            zbus::Error::MethodError(_, Some(msg), _) => Self::Bridge(msg),
            other => Self::Bridge(other.to_string()),
        }
    }
}

impl From<zbus::fdo::Error> for AppError {
    fn from(err: zbus::fdo::Error) -> Self {
        Self::Bridge(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Http("Request timed out - check your internet connection".to_string())
        } else if err.is_decode() {
            Self::Serialization(err.to_string())
        } else {
            Self::Http(err.to_string())
        }
    }
}
