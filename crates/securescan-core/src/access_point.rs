//! Access point (responder) state machine.
//!
//! An access point advertises its identity with beacons and answers probe
//! requests. Its SSID and link-layer address are fixed for its lifetime,
//! and its keypair is long-lived; only the `pending` store of announced
//! station addresses changes as requests are answered.
//!
//! # State machine
//!
//! ```text
//! ┌──────┐ send_beacon ┌─────────────┐ probe request ┌────────────┐
//! │ idle │────────────>│ advertising │──────────────>│ responding │
//! └──────┘             └─────────────┘               └────────────┘
//!     ^                                                     │
//!     └─────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;
use std::fmt;
use std::time::{Duration, Instant};

use bytes::Bytes;
use securescan_proto::{
    ActorId, Addr, Frame, FrameContents, FrameType, ProbeRequestPayload, ProbeResponsePayload,
    Ssid,
};

use crate::crypto::{self, KeyPair};
use crate::env::Environment;
use crate::error::HandshakeError;
use crate::Protocol;

/// An access point in the simulated network.
pub struct AccessPoint {
    id: ActorId,
    ssid: Ssid,
    addr: Addr,
    keypair: KeyPair,
    protocol: Protocol,
    /// Announced next rotating address of each station that completed a
    /// probe exchange, and when it was recorded.
    pending: HashMap<Addr, Instant>,
}

impl AccessPoint {
    /// Create an access point with a random SSID.
    #[must_use]
    pub fn new<E: Environment>(id: ActorId, protocol: Protocol, env: &E) -> Self {
        let ssid = crypto::generate_ssid(env);
        Self::with_ssid(id, ssid, protocol, env)
    }

    /// Create an access point with a fixed SSID.
    #[must_use]
    pub fn with_ssid<E: Environment>(
        id: ActorId,
        ssid: Ssid,
        protocol: Protocol,
        env: &E,
    ) -> Self {
        Self {
            id,
            ssid,
            addr: crypto::generate_address(env),
            keypair: KeyPair::generate(env),
            protocol,
            pending: HashMap::new(),
        }
    }

    /// The access point's identifier.
    #[must_use]
    pub fn id(&self) -> ActorId {
        self.id
    }

    /// The access point's SSID.
    #[must_use]
    pub fn ssid(&self) -> &Ssid {
        &self.ssid
    }

    /// The access point's stable link-layer address.
    #[must_use]
    pub fn addr(&self) -> &Addr {
        &self.addr
    }

    /// The long-lived public key, SubjectPublicKeyInfo DER.
    #[must_use]
    pub fn public_key_der(&self) -> &[u8] {
        self.keypair.public_key_der()
    }

    /// Number of recorded station addresses.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Whether `addr` was announced by a station in an earlier exchange.
    #[must_use]
    pub fn recognizes(&self, addr: &Addr) -> bool {
        self.pending.contains_key(addr)
    }

    /// Drop recorded station addresses older than `ttl`, returning how
    /// many were removed.
    pub fn expire_pending(&mut self, now: Instant, ttl: Duration) -> usize {
        let before = self.pending.len();
        self.pending.retain(|_, seen_at| now.duration_since(*seen_at) <= ttl);
        before - self.pending.len()
    }

    /// Send a beacon. Always succeeds.
    ///
    /// Secure variant advertises the public key; standard variant
    /// advertises the SSID. Source is the stable address, destination is
    /// broadcast.
    #[must_use]
    pub fn send_beacon<E: Environment>(&self, env: &E) -> Frame {
        let contents = match self.protocol {
            Protocol::SecureScan => {
                FrameContents::Plain(Bytes::copy_from_slice(self.keypair.public_key_der()))
            },
            Protocol::Standard => {
                FrameContents::Plain(Bytes::copy_from_slice(self.ssid.as_str().as_bytes()))
            },
        };
        Frame::new(
            FrameType::Beacon,
            env.now(),
            self.addr.clone(),
            Addr::broadcast(),
            self.id,
            contents,
        )
    }

    /// Answer a probe request.
    ///
    /// Standard variant: responds with the SSID if the request names this
    /// SSID or is a wildcard scan, otherwise yields no response
    /// (selective disclosure).
    ///
    /// Secure variant: decrypts the request, records the station's
    /// announced next rotating address, and returns a signed, encrypted
    /// response. Always responds when the request is well-formed.
    ///
    /// # Errors
    ///
    /// Returns [`HandshakeError::Malformed`] if the request cannot be
    /// decrypted or parsed. This is a hard error for the exchange; the
    /// driver catches it and moves on.
    pub fn send_probe_response<E: Environment>(
        &mut self,
        request: &Frame,
        env: &E,
    ) -> Result<Option<Frame>, HandshakeError> {
        match self.protocol {
            Protocol::Standard => self.respond_standard(request, env),
            Protocol::SecureScan => self.respond_secure(request, env).map(Some),
        }
    }

    fn respond_standard<E: Environment>(
        &self,
        request: &Frame,
        env: &E,
    ) -> Result<Option<Frame>, HandshakeError> {
        let target = request.contents.as_plain()?;
        let target = std::str::from_utf8(target)
            .map_err(|e| HandshakeError::Malformed(format!("probe target: {e}")))?;

        if target != "*" && target != self.ssid.as_str() {
            return Ok(None);
        }

        Ok(Some(Frame::new(
            FrameType::ProbeResponse,
            env.now(),
            self.addr.clone(),
            request.source.clone(),
            self.id,
            FrameContents::Plain(Bytes::copy_from_slice(self.ssid.as_str().as_bytes())),
        )))
    }

    fn respond_secure<E: Environment>(
        &mut self,
        request: &Frame,
        env: &E,
    ) -> Result<Frame, HandshakeError> {
        let fragments = request.contents.as_fragments()?;
        let plaintext = crypto::decrypt_fragments(&self.keypair, fragments)?;
        let payload = ProbeRequestPayload::decode(&plaintext)?;
        let station_key = crypto::parse_public_key(&payload.station_public_key)?;

        self.pending.insert(payload.next_rotating_address, env.now());

        let signature = self.keypair.sign_key_digest(&payload.station_public_key)?;
        let response = ProbeResponsePayload { ssid: self.ssid.clone(), signature };
        let ciphertext = crypto::encrypt_fragments(env, &station_key, &response.encode()?)?;

        Ok(Frame::new(
            FrameType::ProbeResponse,
            env.now(),
            self.addr.clone(),
            Addr::broadcast(),
            self.id,
            FrameContents::Fragments(ciphertext),
        ))
    }
}

impl fmt::Display for AccessPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Access Point: \t{}", self.ssid)?;
        writeln!(f, "Address: \t{}", self.addr)?;
        writeln!(f, "Public key:\n{}", self.keypair.public_key_pem())?;
        // Private key intentionally not printed.
        write!(f, "Private key: \t<redacted>")
    }
}
