//! Error types for the Pinechat client.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for every Pinechat crate.
///
/// Transport failures, non-success statuses and empty payloads are kept
/// apart here so callers can log the real cause, even though the chat
/// surface collapses all of them into one user-facing message.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PinechatError {
    /// The request never produced a response (connect, timeout, body read)
    #[error("Network error: {0}")]
    Network(String),

    /// The backend answered with a non-success status
    #[error("Backend returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// The backend answered successfully but without a body
    #[error("Empty payload from {endpoint}")]
    EmptyPayload { endpoint: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON"
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// The owning session was shut down before the operation finished
    #[error("Operation cancelled")]
    Cancelled,
}

impl PinechatError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a Network error
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    /// Creates a Status error
    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self::Status {
            status,
            body: body.into(),
        }
    }

    /// Creates an EmptyPayload error
    pub fn empty_payload(endpoint: impl Into<String>) -> Self {
        Self::EmptyPayload {
            endpoint: endpoint.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a transport failure
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network(_))
    }

    /// Check if the backend rejected the request
    pub fn is_status(&self) -> bool {
        matches!(self, Self::Status { .. })
    }

    /// Check if the backend sent nothing back
    pub fn is_empty_payload(&self) -> bool {
        matches!(self, Self::EmptyPayload { .. })
    }

    /// Check if this is a config error
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// Check if the operation was cancelled by shutdown
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for PinechatError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for PinechatError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for PinechatError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, PinechatError>`.
pub type Result<T> = std::result::Result<T, PinechatError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_display_includes_code_and_body() {
        let err = PinechatError::status(502, "bad gateway");
        assert_eq!(err.to_string(), "Backend returned status 502: bad gateway");
        assert!(err.is_status());
        assert!(!err.is_network());
    }

    #[test]
    fn test_json_error_converts_to_serialization() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: PinechatError = json_err.into();
        match err {
            PinechatError::Serialization { format, .. } => assert_eq!(format, "JSON"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
