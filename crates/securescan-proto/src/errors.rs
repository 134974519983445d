//! Error types for the SecureScan protocol data model.
//!
//! All errors are structured, testable, and provide actionable information.

use thiserror::Error;

/// Errors that can occur while building or interpreting protocol data.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Failed to encode a payload as JSON
    #[error("failed to encode payload: {0}")]
    JsonEncode(String),

    /// Failed to decode a payload from JSON
    #[error("failed to decode payload: {0}")]
    JsonDecode(String),

    /// Frame contents have the wrong shape for the requested operation
    #[error("contents mismatch: expected {expected}")]
    ContentsMismatch {
        /// The contents variant the operation required
        expected: &'static str,
    },

    /// Address string is not broadcast or 12 lowercase hex characters
    #[error("invalid address: {0:?}")]
    InvalidAddress(String),

    /// SSID string is not 8 lowercase ASCII letters
    #[error("invalid ssid: {0:?}")]
    InvalidSsid(String),
}

/// Convenient Result type alias for protocol operations
pub type Result<T> = std::result::Result<T, ProtocolError>;
