//! SecureScan protocol core logic.
//!
//! This crate contains the pure state machines for the discovery handshake:
//! the access point (responder) and station (initiator), plus the
//! cryptographic utilities they share. It is completely decoupled from
//! I/O: time, sleeping, and randomness all flow through the
//! [`env::Environment`] trait, enabling deterministic testing.
//!
//! # Architecture
//!
//! ```text
//!      ┌───────────────────────────────┐
//!      │ securescan-core               │
//!      │ - AP/STA state machines       │
//!      │ - Keys, addresses, fragments  │
//!      └───────────────────────────────┘
//!         ↓                       ↓
//! ┌────────────────┐   ┌────────────────┐
//! │ SimEnv         │   │ SystemEnv      │
//! │ (harness)      │   │ (CLI binary)   │
//! │ - Virtual time │   │ - Real clock   │
//! │ - Seeded RNG   │   │ - OS entropy   │
//! └────────────────┘   └────────────────┘
//! ```
//!
//! # Key principles
//!
//! - No I/O in core: never call `Instant::now()`, `thread::sleep()`, or
//!   `rand::thread_rng()` directly
//! - Single logical owner: each actor's pending store, trust list, and key
//!   material are mutated only by that actor's own methods
//! - Per-exchange failure isolation: an error resolves at most the one
//!   pending entry it pertains to
//!
//! # Modules
//!
//! - [`access_point`]: responder state machine (beacon, probe response)
//! - [`station`]: initiator state machine (probe request, verification)
//! - [`crypto`]: keypairs, address/SSID generation, fragment encryption
//! - [`env`]: environment abstraction (time, sleep, RNG)
//! - [`error`]: handshake error taxonomy

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod access_point;
pub mod crypto;
pub mod env;
pub mod error;
pub mod station;

#[cfg(test)]
pub(crate) mod testing;

use std::fmt;
use std::str::FromStr;

pub use access_point::AccessPoint;
pub use env::Environment;
pub use error::HandshakeError;
pub use station::{Station, StationConfig, Verification};

/// Which discovery handshake an actor speaks.
///
/// Both variants share one capability surface (`send_beacon`,
/// `send_probe_request`, `send_probe_response`, `verify_probe_response`);
/// the variant is fixed per actor at construction, selected by the
/// simulation configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    /// Conventional discovery: plaintext SSIDs, stable addresses
    Standard,
    /// Privacy-preserving discovery: encrypted payloads, rotating addresses
    SecureScan,
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Protocol::Standard => f.write_str("standard"),
            Protocol::SecureScan => f.write_str("secure_scan"),
        }
    }
}

impl FromStr for Protocol {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "standard" => Ok(Protocol::Standard),
            "secure_scan" | "securescan" => Ok(Protocol::SecureScan),
            other => Err(format!("unknown protocol {other:?} (expected standard or secure_scan)")),
        }
    }
}
