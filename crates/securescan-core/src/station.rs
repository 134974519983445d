//! Station (initiator) state machine.
//!
//! A station discovers access points by listening for beacons and sending
//! probe requests. Under the secure variant it rotates its link-layer
//! address and ephemeral keypair on every probe, announces the *next*
//! rotating address inside the encrypted request, and verifies the access
//! point's identity against a local trust list before connecting.
//!
//! # State machine
//!
//! ```text
//! ┌──────┐ beacon ┌─────────┐ send_probe_request ┌─────────┐
//! │ idle │───────>│ scanning│───────────────────>│ pending │
//! └──────┘        └─────────┘                    └────┬────┘
//!     ^                                               │ verify_probe_response
//!     │              ┌───────────┐                    │
//!     └──────────────│ connected │<───────────────────┘
//!       (untrusted,  └───────────┘   (trusted)
//!        timeout, error)
//! ```
//!
//! A pending exchange is consumed by its first resolution, whatever the
//! outcome. Failed exchanges leave all other state untouched.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::time::{Duration, Instant};

use bytes::Bytes;
use rsa::RsaPublicKey;
use securescan_proto::{
    ActorId, Addr, Frame, FrameContents, FrameType, ProbeRequestPayload, ProbeResponsePayload,
    Ssid,
};

use crate::access_point::AccessPoint;
use crate::crypto::{self, KeyPair};
use crate::env::Environment;
use crate::error::HandshakeError;
use crate::Protocol;

/// Tunable station timings.
#[derive(Debug, Clone, Copy)]
pub struct StationConfig {
    /// Minimum interval between accepted beacons from the same access
    /// point. A repeat inside this window trips the replay guard instead
    /// of forcing another address rotation.
    pub min_beacon_interval: Duration,
    /// How long a probe response stays acceptable after the request.
    pub response_timeout: Duration,
    /// Upper bound on the random delay inserted before each probe
    /// request, defeating response-time correlation. Zero disables the
    /// delay (rotation still happens).
    pub max_jitter: Duration,
}

impl Default for StationConfig {
    fn default() -> Self {
        Self {
            min_beacon_interval: Duration::from_secs(1),
            response_timeout: Duration::from_secs(1),
            max_jitter: Duration::from_millis(100),
        }
    }
}

/// Outcome of verifying a probe response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verification {
    /// Whether the responder matched an entry in the trust list.
    pub trusted: bool,
    /// The SSID the responder claimed.
    pub ssid: Ssid,
    /// The responder's public key DER. Empty under the standard protocol,
    /// which carries no key material.
    pub ap_public_key: Vec<u8>,
}

/// One in-flight probe exchange, keyed by the access point's address.
struct PendingExchange {
    ap_public_key: RsaPublicKey,
    ap_public_key_der: Vec<u8>,
    /// Ephemeral keypair this exchange's request was issued under.
    keypair: KeyPair,
    issued_at: Instant,
    /// Address announced to the access point, adopted on success.
    next_rotating_address: Addr,
}

/// A station in the simulated network.
pub struct Station {
    id: ActorId,
    /// Stable address, used as the probe source under the standard
    /// protocol. The privacy leak being measured.
    addr: Addr,
    /// Current rotating address, replaced on every secure probe.
    rotating_addr: Addr,
    keypair: KeyPair,
    protocol: Protocol,
    config: StationConfig,
    pending: HashMap<Addr, PendingExchange>,
    /// Known access point identities as (SSID, public key DER) pairs.
    trust_list: HashSet<(Ssid, Vec<u8>)>,
    connected: bool,
}

impl Station {
    /// Create a station with fresh addresses and key material.
    #[must_use]
    pub fn new<E: Environment>(
        id: ActorId,
        protocol: Protocol,
        config: StationConfig,
        env: &E,
    ) -> Self {
        Self {
            id,
            addr: crypto::generate_address(env),
            rotating_addr: crypto::generate_address(env),
            keypair: KeyPair::generate(env),
            protocol,
            config,
            pending: HashMap::new(),
            trust_list: HashSet::new(),
            connected: false,
        }
    }

    /// The station's identifier.
    #[must_use]
    pub fn id(&self) -> ActorId {
        self.id
    }

    /// The station's stable link-layer address.
    #[must_use]
    pub fn addr(&self) -> &Addr {
        &self.addr
    }

    /// The station's current rotating address.
    #[must_use]
    pub fn rotating_addr(&self) -> &Addr {
        &self.rotating_addr
    }

    /// Whether the last verified exchange ended in a trusted connection.
    #[must_use]
    pub fn connected(&self) -> bool {
        self.connected
    }

    /// Number of in-flight exchanges.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Record an access point identity in the trust list.
    pub fn save_identity(&mut self, ssid: Ssid, public_key_der: Vec<u8>) {
        self.trust_list.insert((ssid, public_key_der));
    }

    /// Record an access point's advertised identity in the trust list.
    pub fn save_ap(&mut self, ap: &AccessPoint) {
        self.save_identity(ap.ssid().clone(), ap.public_key_der().to_vec());
    }

    /// Whether `(ssid, public_key_der)` is a trusted identity.
    #[must_use]
    pub fn trusts(&self, ssid: &Ssid, public_key_der: &[u8]) -> bool {
        self.trust_list.contains(&(ssid.clone(), public_key_der.to_vec()))
    }

    /// Whether any trusted identity carries this SSID, regardless of key.
    ///
    /// The plaintext protocol's trust decision: it never sees key
    /// material, so two access points sharing an SSID are
    /// indistinguishable to it. The secure variant always checks the full
    /// (SSID, key) pair.
    #[must_use]
    pub fn trusts_ssid(&self, ssid: &Ssid) -> bool {
        self.trust_list.iter().any(|(s, _)| s == ssid)
    }

    /// Drop all in-flight exchanges.
    pub fn clear_pending(&mut self) {
        self.pending.clear();
    }

    /// Forget every trusted identity.
    pub fn clear_trusted(&mut self) {
        self.trust_list.clear();
        self.connected = false;
    }

    /// React to a beacon by sending a probe request.
    ///
    /// Secure variant: rotates address and ephemeral keypair, announces a
    /// freshly drawn next address inside the encrypted payload, and
    /// records the exchange as pending. Always probes (`Some`).
    ///
    /// Standard variant: probes in plaintext from the stable address, and
    /// only for SSIDs already in the trust list; unknown SSIDs yield
    /// `Ok(None)`.
    ///
    /// A random jitter delay up to `max_jitter` is inserted before the
    /// request so response timing cannot be correlated across exchanges.
    ///
    /// # Errors
    ///
    /// - [`HandshakeError::ReplayGuard`] if a pending exchange for this
    ///   access point is younger than `min_beacon_interval`. A stale entry
    ///   is evicted instead and the probe proceeds.
    /// - [`HandshakeError::Malformed`] if the beacon contents cannot be
    ///   parsed.
    pub fn send_probe_request<E: Environment>(
        &mut self,
        beacon: &Frame,
        env: &E,
    ) -> Result<Option<Frame>, HandshakeError> {
        if let Some(entry) = self.pending.get(&beacon.source) {
            let elapsed = env.now().duration_since(entry.issued_at);
            if elapsed < self.config.min_beacon_interval {
                return Err(HandshakeError::ReplayGuard { elapsed });
            }
            // The earlier exchange timed out without a response; forget it
            // and start over.
            self.pending.remove(&beacon.source);
        }

        self.jitter(env);

        match self.protocol {
            Protocol::SecureScan => self.probe_secure(beacon, env).map(Some),
            Protocol::Standard => Ok(self.probe_standard(beacon)?.map(|contents| {
                Frame::new(
                    FrameType::ProbeRequest,
                    env.now(),
                    self.addr.clone(),
                    Addr::broadcast(),
                    self.id,
                    contents,
                )
            })),
        }
    }

    fn jitter<E: Environment>(&self, env: &E) {
        let bound = self.config.max_jitter.as_millis() as u64;
        if bound > 0 {
            env.sleep(Duration::from_millis(1 + env.random_u64() % bound));
        }
    }

    fn probe_standard(&self, beacon: &Frame) -> Result<Option<FrameContents>, HandshakeError> {
        let advertised = std::str::from_utf8(beacon.contents.as_plain()?)
            .map_err(|e| HandshakeError::Malformed(format!("beacon ssid: {e}")))?;
        let ssid = Ssid::parse(advertised)?;

        if !self.trusts_ssid(&ssid) {
            return Ok(None);
        }
        Ok(Some(FrameContents::Plain(Bytes::copy_from_slice(advertised.as_bytes()))))
    }

    fn probe_secure<E: Environment>(
        &mut self,
        beacon: &Frame,
        env: &E,
    ) -> Result<Frame, HandshakeError> {
        let ap_public_key_der = beacon.contents.as_plain()?.to_vec();
        let ap_public_key = crypto::parse_public_key(&ap_public_key_der)?;

        // Rotate: fresh address and keypair for this exchange, plus the
        // address announced for the next one.
        self.rotating_addr = crypto::generate_address(env);
        self.keypair = KeyPair::generate(env);
        let next_rotating_address = crypto::generate_address(env);

        let payload = ProbeRequestPayload {
            station_public_key: self.keypair.public_key_der().to_vec(),
            next_rotating_address: next_rotating_address.clone(),
        };
        let ciphertext = crypto::encrypt_fragments(env, &ap_public_key, &payload.encode()?)?;

        self.pending.insert(
            beacon.source.clone(),
            PendingExchange {
                ap_public_key,
                ap_public_key_der,
                keypair: self.keypair.clone(),
                issued_at: env.now(),
                next_rotating_address,
            },
        );

        Ok(Frame::new(
            FrameType::ProbeRequest,
            env.now(),
            self.rotating_addr.clone(),
            beacon.source.clone(),
            self.id,
            FrameContents::Fragments(ciphertext),
        ))
    }

    /// Resolve a probe response against its pending exchange.
    ///
    /// The pending entry is consumed by the first resolution no matter the
    /// outcome, so a replayed or duplicated response finds nothing.
    ///
    /// An untrusted but well-formed responder yields `Ok` with
    /// `trusted: false` and the claimed identity, which the caller may
    /// choose to save. Only a trusted, signature-valid response adopts the
    /// announced rotating address and marks the station connected.
    ///
    /// # Errors
    ///
    /// - [`HandshakeError::PendingNotFound`] if no exchange is pending for
    ///   the response's source.
    /// - [`HandshakeError::Timeout`] if the response arrived after
    ///   `response_timeout`.
    /// - [`HandshakeError::Malformed`] if decryption or parsing fails.
    /// - [`HandshakeError::SignatureInvalid`] if a trusted identity's
    ///   signature does not cover this exchange's ephemeral key.
    pub fn verify_probe_response<E: Environment>(
        &mut self,
        response: &Frame,
        env: &E,
    ) -> Result<Verification, HandshakeError> {
        match self.protocol {
            Protocol::Standard => self.verify_standard(response),
            Protocol::SecureScan => self.verify_secure(response, env),
        }
    }

    fn verify_standard(&mut self, response: &Frame) -> Result<Verification, HandshakeError> {
        let advertised = std::str::from_utf8(response.contents.as_plain()?)
            .map_err(|e| HandshakeError::Malformed(format!("response ssid: {e}")))?;
        let ssid = Ssid::parse(advertised)?;

        let trusted = self.trusts_ssid(&ssid);
        self.connected = trusted;
        Ok(Verification { trusted, ssid, ap_public_key: Vec::new() })
    }

    fn verify_secure<E: Environment>(
        &mut self,
        response: &Frame,
        env: &E,
    ) -> Result<Verification, HandshakeError> {
        // Consumed before any check; a failed exchange must not be
        // resolvable twice.
        let entry = self
            .pending
            .remove(&response.source)
            .ok_or_else(|| HandshakeError::PendingNotFound { source: response.source.clone() })?;

        let elapsed = env.now().duration_since(entry.issued_at);
        if elapsed > self.config.response_timeout {
            return Err(HandshakeError::Timeout { elapsed });
        }

        let plaintext = crypto::decrypt_fragments(&entry.keypair, response.contents.as_fragments()?)?;
        let payload = ProbeResponsePayload::decode(&plaintext)?;

        if !self.trusts(&payload.ssid, &entry.ap_public_key_der) {
            return Ok(Verification {
                trusted: false,
                ssid: payload.ssid,
                ap_public_key: entry.ap_public_key_der,
            });
        }

        crypto::verify_key_signature(
            &entry.ap_public_key,
            entry.keypair.public_key_der(),
            &payload.signature,
        )?;

        // Identity proven: adopt the address announced in the request and
        // connect.
        self.rotating_addr = entry.next_rotating_address;
        self.connected = true;
        Ok(Verification {
            trusted: true,
            ssid: payload.ssid,
            ap_public_key: entry.ap_public_key_der,
        })
    }
}

impl fmt::Display for Station {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Station: \t{}", self.id.0)?;
        writeln!(f, "Address: \t{}", self.addr)?;
        writeln!(f, "Rotating: \t{}", self.rotating_addr)?;
        writeln!(f, "Trusted networks: {}", self.trust_list.len())?;
        write!(f, "Key material: \t<redacted>")
    }
}
