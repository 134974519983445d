//! Link-layer address and SSID newtypes.
//!
//! Addresses are 12-character lowercase hex strings (six random bytes, the
//! shape of a MAC address without separators), plus the special broadcast
//! form `*`. SSIDs are 8 lowercase ASCII letters.
//!
//! Random generation of both lives in `securescan-core::crypto`, since it
//! needs an entropy source; this module only defines the types and their
//! invariants.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::ProtocolError;

/// A link-layer address.
///
/// # Invariants
///
/// - Either the broadcast address `*`, or exactly [`Addr::LEN`] lowercase
///   hex characters.
/// - Immutable once constructed; rotation replaces the whole value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Addr(String);

impl Addr {
    /// Length of a unicast address in hex characters.
    pub const LEN: usize = 12;

    /// The broadcast address, matching any receiver.
    pub fn broadcast() -> Self {
        Addr("*".to_string())
    }

    /// Returns true if this is the broadcast address.
    #[must_use]
    pub fn is_broadcast(&self) -> bool {
        self.0 == "*"
    }

    /// Build an address from six raw bytes by hex-encoding them.
    #[must_use]
    pub fn from_bytes(bytes: [u8; 6]) -> Self {
        Addr(crate::hex::encode(&bytes))
    }

    /// Parse and validate an address string.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::InvalidAddress`] if the string is neither
    /// broadcast nor 12 lowercase hex characters.
    pub fn parse(s: &str) -> Result<Self, ProtocolError> {
        if s == "*" {
            return Ok(Addr::broadcast());
        }
        let valid = s.len() == Self::LEN
            && s.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
        if valid {
            Ok(Addr(s.to_string()))
        } else {
            Err(ProtocolError::InvalidAddress(s.to_string()))
        }
    }

    /// The address as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Addr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Addr {
    type Error = ProtocolError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Addr::parse(&s)
    }
}

impl From<Addr> for String {
    fn from(addr: Addr) -> Self {
        addr.0
    }
}

/// A human-readable access point identifier.
///
/// # Invariants
///
/// - Exactly [`Ssid::LEN`] lowercase ASCII letters.
/// - Not unique across access points; collisions are tolerated. The trust
///   decision always pairs the SSID with a public key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Ssid(String);

impl Ssid {
    /// Length of an SSID in characters.
    pub const LEN: usize = 8;

    /// Parse and validate an SSID string.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::InvalidSsid`] if the string is not 8
    /// lowercase ASCII letters.
    pub fn parse(s: &str) -> Result<Self, ProtocolError> {
        if s.len() == Self::LEN && s.bytes().all(|b| b.is_ascii_lowercase()) {
            Ok(Ssid(s.to_string()))
        } else {
            Err(ProtocolError::InvalidSsid(s.to_string()))
        }
    }

    /// The SSID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Ssid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Ssid {
    type Error = ProtocolError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Ssid::parse(&s)
    }
}

impl From<Ssid> for String {
    fn from(ssid: Ssid) -> Self {
        ssid.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn addr_round_trips_through_bytes() {
        let addr = Addr::from_bytes([0xde, 0xad, 0xbe, 0xef, 0x00, 0x42]);
        assert_eq!(addr.as_str(), "deadbeef0042");
        assert_eq!(Addr::parse(addr.as_str()).unwrap(), addr);
        assert!(!addr.is_broadcast());
    }

    #[test]
    fn broadcast_is_special() {
        let b = Addr::broadcast();
        assert!(b.is_broadcast());
        assert_eq!(Addr::parse("*").unwrap(), b);
    }

    #[test]
    fn addr_rejects_bad_strings() {
        assert!(Addr::parse("too-short").is_err());
        assert!(Addr::parse("DEADBEEF0042").is_err()); // uppercase
        assert!(Addr::parse("deadbeef00422").is_err()); // 13 chars
        assert!(Addr::parse("deadbeef004g").is_err()); // non-hex
    }

    #[test]
    fn ssid_validation() {
        assert!(Ssid::parse("abcdefgh").is_ok());
        assert!(Ssid::parse("abc").is_err());
        assert!(Ssid::parse("ABCDEFGH").is_err());
        assert!(Ssid::parse("abcdefg1").is_err());
    }

    #[test]
    fn addr_serde_validates() {
        let ok: Result<Addr, _> = serde_json::from_str("\"deadbeef0042\"");
        assert!(ok.is_ok());
        let bad: Result<Addr, _> = serde_json::from_str("\"nonsense\"");
        assert!(bad.is_err());
    }
}
