//! Error taxonomy for handshake operations.
//!
//! Errors are scoped to a single exchange: none of them implies corrupted
//! actor state beyond the one pending entry being resolved. The driver
//! decides whether to retry or record a failure and continue.

use std::{fmt, time::Duration};

use securescan_proto::{Addr, ProtocolError};

/// Errors raised by the AP and STA state machines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandshakeError {
    /// A beacon from the same source arrived again before the minimum
    /// inter-beacon interval elapsed. Recoverable: treat as "no response".
    /// This guard stops an adversary from forcing repeated address
    /// rotation through beacon flooding.
    ReplayGuard {
        /// Time since the pending exchange was issued
        elapsed: Duration,
    },

    /// No pending exchange exists for the frame's source address: either
    /// a caller error, a replayed response, or a second verification of an
    /// already-consumed exchange.
    PendingNotFound {
        /// Source address that had no pending entry
        source: Addr,
    },

    /// The response arrived after the configured window. Recoverable; the
    /// pending entry is consumed regardless, so a retry needs a fresh
    /// exchange.
    Timeout {
        /// Time since the probe request was issued
        elapsed: Duration,
    },

    /// Decryption or payload parsing failed: corrupted or adversarially
    /// crafted ciphertext. Fatal for this exchange.
    Malformed(String),

    /// The signature did not verify even though the claimed identity was
    /// trusted: a forged or tampered response. Fatal for this exchange.
    SignatureInvalid,
}

impl fmt::Display for HandshakeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReplayGuard { elapsed } => {
                write!(f, "beacon repeated {elapsed:?} after pending exchange began")
            },
            Self::PendingNotFound { source } => {
                write!(f, "no pending exchange for source {source}")
            },
            Self::Timeout { elapsed } => {
                write!(f, "probe response timed out after {elapsed:?}")
            },
            Self::Malformed(msg) => write!(f, "malformed payload: {msg}"),
            Self::SignatureInvalid => f.write_str("signature verification failed"),
        }
    }
}

impl std::error::Error for HandshakeError {}

impl HandshakeError {
    /// Returns true if the error is an expected protocol outcome the
    /// caller may retry after, rather than evidence of corruption or
    /// forgery.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::ReplayGuard { .. } | Self::Timeout { .. })
    }
}

impl From<ProtocolError> for HandshakeError {
    fn from(err: ProtocolError) -> Self {
        HandshakeError::Malformed(err.to_string())
    }
}
