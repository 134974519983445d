//! JSON payload schemas carried inside encrypted handshake frames.
//!
//! The frame history is consumed in-process by the analysis layer, so there
//! is no binary wire format: payloads are JSON objects with binary fields
//! hex-encoded, which keeps verbose dumps readable.
//!
//! Each payload is encrypted fragment-by-fragment under the receiver's
//! public key before it is placed in a frame, so the schema itself carries
//! no confidentiality mechanism.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::addr::{Addr, Ssid};
use crate::errors::{ProtocolError, Result};

/// Contents of a SecureScan probe request.
///
/// The station introduces its ephemeral public key (so the access point
/// can encrypt the response and sign a challenge bound to this exchange)
/// and pre-announces the rotating address it will use after a successful
/// handshake.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeRequestPayload {
    /// Station ephemeral public key, SubjectPublicKeyInfo DER
    #[serde(with = "crate::hex::serde")]
    pub station_public_key: Vec<u8>,
    /// Address the station will adopt after verification succeeds
    pub next_rotating_address: Addr,
}

impl fmt::Debug for ProbeRequestPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProbeRequestPayload")
            .field("station_public_key", &format!("<{} bytes>", self.station_public_key.len()))
            .field("next_rotating_address", &self.next_rotating_address)
            .finish()
    }
}

/// Contents of a SecureScan probe response.
///
/// The access point discloses its SSID and proves possession of its
/// signing key with a signature over the digest of the station's ephemeral
/// public key.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeResponsePayload {
    /// The access point's claimed identity
    pub ssid: Ssid,
    /// PKCS#1 v1.5 signature over the station-key digest
    #[serde(with = "crate::hex::serde")]
    pub signature: Vec<u8>,
}

impl fmt::Debug for ProbeResponsePayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProbeResponsePayload")
            .field("ssid", &self.ssid)
            .field("signature", &format!("<{} bytes>", self.signature.len()))
            .finish()
    }
}

impl ProbeRequestPayload {
    /// Encode to JSON bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::JsonEncode`] if serialization fails.
    pub fn encode(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| ProtocolError::JsonEncode(e.to_string()))
    }

    /// Decode from JSON bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::JsonDecode`] if the bytes are not a valid
    /// probe request payload.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes).map_err(|e| ProtocolError::JsonDecode(e.to_string()))
    }
}

impl ProbeResponsePayload {
    /// Encode to JSON bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::JsonEncode`] if serialization fails.
    pub fn encode(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| ProtocolError::JsonEncode(e.to_string()))
    }

    /// Decode from JSON bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::JsonDecode`] if the bytes are not a valid
    /// probe response payload.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes).map_err(|e| ProtocolError::JsonDecode(e.to_string()))
    }
}
