//! Cryptographic utilities shared by both actor state machines.
//!
//! Key generation, random address and SSID generation, the fragment-wise
//! RSA-OAEP encryption used to carry payloads larger than one encryption
//! block, and the PKCS#1 v1.5 signature over the station-key digest.
//!
//! # Signature domain
//!
//! The access point signs exactly the SHA-256 digest of the station's
//! ephemeral public key (SubjectPublicKeyInfo DER). Nothing else enters
//! the signed transcript; the ephemeral key itself is fresh per exchange,
//! which prevents signature replay across sessions.

use bytes::Bytes;
use rsa::pkcs8::{DecodePublicKey, EncodePublicKey, LineEnding};
use rsa::{Oaep, Pkcs1v15Sign, RsaPrivateKey, RsaPublicKey};
use securescan_proto::{fragment, Addr, Ssid};
use sha2::{Digest, Sha256};

use crate::env::{EnvRng, Environment};
use crate::error::HandshakeError;

/// RSA modulus size in bits.
pub const RSA_KEY_BITS: usize = 1024;

/// Plaintext bytes per encrypted fragment.
///
/// Must stay under the OAEP capacity for [`RSA_KEY_BITS`] with SHA-256:
/// 128 - 2*32 - 2 = 62 bytes.
pub const FRAGMENT_SIZE: usize = 56;

/// An actor's asymmetric keypair.
///
/// Ownership is exclusive: a keypair is never shared between actors. A
/// station regenerates its keypair every exchange; an access point keeps
/// one for the simulation's duration.
#[derive(Clone)]
pub struct KeyPair {
    private: RsaPrivateKey,
    public: RsaPublicKey,
    public_der: Vec<u8>,
}

impl KeyPair {
    /// Generate a fresh keypair from the environment's RNG.
    ///
    /// # Panics
    ///
    /// Panics if the underlying primitive ever yields a key that fails
    /// validation or cannot export its public half. A keypair that cannot
    /// decrypt, sign, and export is unusable for the handshake, so this
    /// fails fast rather than limping on.
    #[must_use]
    pub fn generate<E: Environment>(env: &E) -> Self {
        let mut rng = EnvRng::new(env);
        let private =
            RsaPrivateKey::new(&mut rng, RSA_KEY_BITS).expect("RSA key generation failed");
        private.validate().expect("generated RSA key failed validation");
        let public = RsaPublicKey::from(&private);
        let public_der = public
            .to_public_key_der()
            .expect("generated RSA public key failed DER export")
            .as_bytes()
            .to_vec();
        Self { private, public, public_der }
    }

    /// The public half.
    #[must_use]
    pub fn public_key(&self) -> &RsaPublicKey {
        &self.public
    }

    /// The public half as SubjectPublicKeyInfo DER.
    #[must_use]
    pub fn public_key_der(&self) -> &[u8] {
        &self.public_der
    }

    /// The public half as PEM, for human-readable actor dumps.
    #[must_use]
    pub fn public_key_pem(&self) -> String {
        self.public
            .to_public_key_pem(LineEnding::LF)
            .expect("DER-exportable key has a PEM form")
    }

    /// Decrypt one OAEP ciphertext block.
    ///
    /// # Errors
    ///
    /// Returns [`HandshakeError::Malformed`] if the ciphertext does not
    /// decrypt under this key.
    pub fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>, HandshakeError> {
        self.private
            .decrypt(Oaep::new::<Sha256>(), ciphertext)
            .map_err(|e| HandshakeError::Malformed(format!("decrypt: {e}")))
    }

    /// Sign the digest of a peer's public key.
    ///
    /// # Errors
    ///
    /// Returns [`HandshakeError::Malformed`] if signing fails.
    pub fn sign_key_digest(&self, peer_public_key_der: &[u8]) -> Result<Vec<u8>, HandshakeError> {
        let digest = key_digest(peer_public_key_der);
        self.private
            .sign(Pkcs1v15Sign::new::<Sha256>(), &digest)
            .map_err(|e| HandshakeError::Malformed(format!("sign: {e}")))
    }
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never dump private key material.
        f.debug_struct("KeyPair")
            .field("public_der", &format!("<{} bytes>", self.public_der.len()))
            .finish()
    }
}

/// SHA-256 digest of a public key's DER encoding.
#[must_use]
pub fn key_digest(public_key_der: &[u8]) -> [u8; 32] {
    Sha256::digest(public_key_der).into()
}

/// Verify a signature over the digest of `signed_public_key_der`.
///
/// # Errors
///
/// Returns [`HandshakeError::SignatureInvalid`] on any mismatch.
pub fn verify_key_signature(
    signer: &RsaPublicKey,
    signed_public_key_der: &[u8],
    signature: &[u8],
) -> Result<(), HandshakeError> {
    let digest = key_digest(signed_public_key_der);
    signer
        .verify(Pkcs1v15Sign::new::<Sha256>(), &digest, signature)
        .map_err(|_| HandshakeError::SignatureInvalid)
}

/// Parse a public key from SubjectPublicKeyInfo DER.
///
/// # Errors
///
/// Returns [`HandshakeError::Malformed`] if the bytes are not a valid
/// public key.
pub fn parse_public_key(der: &[u8]) -> Result<RsaPublicKey, HandshakeError> {
    RsaPublicKey::from_public_key_der(der)
        .map_err(|e| HandshakeError::Malformed(format!("public key: {e}")))
}

/// Generate a random link-layer address: six uniform random bytes,
/// hex-encoded. Collisions are negligible at simulation scale.
#[must_use]
pub fn generate_address<E: Environment>(env: &E) -> Addr {
    let mut bytes = [0u8; 6];
    env.random_bytes(&mut bytes);
    Addr::from_bytes(bytes)
}

/// Generate a random SSID: eight lowercase letters, uniform over `a-z`.
///
/// Uniformity uses rejection sampling (a plain `byte % 26` would bias
/// toward the first 22 letters). SSIDs are not required to be unique.
#[must_use]
pub fn generate_ssid<E: Environment>(env: &E) -> Ssid {
    // Largest multiple of 26 that fits in a byte.
    const LIMIT: u8 = 26 * 9;

    let mut chars = String::with_capacity(Ssid::LEN);
    let mut buf = [0u8; 16];
    while chars.len() < Ssid::LEN {
        env.random_bytes(&mut buf);
        for &b in buf.iter() {
            if b < LIMIT && chars.len() < Ssid::LEN {
                chars.push((b'a' + b % 26) as char);
            }
        }
    }
    Ssid::parse(&chars).expect("generated SSID is eight lowercase letters")
}

/// Fragment `plaintext` and encrypt each chunk under `public_key`.
///
/// # Errors
///
/// Returns [`HandshakeError::Malformed`] if an encryption operation fails.
pub fn encrypt_fragments<E: Environment>(
    env: &E,
    public_key: &RsaPublicKey,
    plaintext: &[u8],
) -> Result<Vec<Bytes>, HandshakeError> {
    let mut rng = EnvRng::new(env);
    fragment(plaintext, FRAGMENT_SIZE)
        .iter()
        .map(|chunk| {
            public_key
                .encrypt(&mut rng, Oaep::new::<Sha256>(), chunk)
                .map(Bytes::from)
                .map_err(|e| HandshakeError::Malformed(format!("encrypt: {e}")))
        })
        .collect()
}

/// Decrypt each fragment with `keypair` and concatenate in order.
///
/// # Errors
///
/// Returns [`HandshakeError::Malformed`] if any fragment fails to decrypt.
pub fn decrypt_fragments(keypair: &KeyPair, fragments: &[Bytes]) -> Result<Vec<u8>, HandshakeError> {
    let mut plaintext = Vec::new();
    for ciphertext in fragments {
        plaintext.extend_from_slice(&keypair.decrypt(ciphertext)?);
    }
    Ok(plaintext)
}
