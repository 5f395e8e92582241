use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "status", rename_all = "snake_case")]
pub enum ErrorKind {
    /// Catalog host unreachable, connection reset or request timed out.
    NetworkFailure,
    /// Response body did not match the expected shape.
    DecodingFailure,
    /// Non-2xx response.
    HttpStatusFailure(u16),
    Unknown,
}

impl ErrorKind {
    pub fn status_code(self) -> Option<u16> {
        match self {
            Self::HttpStatusFailure(code) => Some(code),
            _ => None,
        }
    }
}

/// A failed catalog fetch. Controllers store these in their state instead of
/// returning them, so the type is `Clone`.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{kind:?}: {message}")]
pub struct CatalogError {
    pub kind: ErrorKind,
    pub message: String,
}

impl CatalogError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NetworkFailure, message)
    }

    pub fn decoding(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::DecodingFailure, message)
    }

    pub fn http_status(code: u16) -> Self {
        Self::new(
            ErrorKind::HttpStatusFailure(code),
            format!("catalog responded with status {code}"),
        )
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unknown, message)
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(value: serde_json::Error) -> Self {
        Self::decoding(value.to_string())
    }
}
