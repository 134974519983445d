//! SecureScan protocol data model.
//!
//! This crate contains the pure data types exchanged during a discovery
//! handshake. It is completely decoupled from cryptography, time, and
//! randomness, which live in `securescan-core`.
//!
//! # Modules
//!
//! - [`frame`]: protocol frame envelope (type, addresses, contents)
//! - [`addr`]: link-layer address and SSID newtypes
//! - [`fragment`]: payload fragmentation for block-limited ciphers
//! - [`payloads`]: JSON payload schemas carried inside encrypted frames
//! - [`errors`]: structured protocol errors

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod addr;
pub mod errors;
pub mod fragment;
pub mod frame;
pub mod hex;
pub mod payloads;

pub use addr::{Addr, Ssid};
pub use errors::{ProtocolError, Result};
pub use fragment::fragment;
pub use frame::{ActorId, Frame, FrameContents, FrameType};
pub use payloads::{ProbeRequestPayload, ProbeResponsePayload};
