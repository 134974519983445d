//! Payload fragmentation for block-limited asymmetric encryption.
//!
//! RSA-OAEP can only encrypt a plaintext smaller than the modulus (minus
//! padding overhead), so handshake payloads are split into chunks that each
//! fit one encryption operation. Fragmentation is deterministic and
//! order-preserving; reassembly after decryption is plain concatenation.

use bytes::Bytes;

/// Split `payload` into ordered chunks of at most `chunk_size` bytes.
///
/// The last chunk may be shorter; empty input yields no chunks.
///
/// # Panics
///
/// Panics if `chunk_size` is zero (caller bug).
#[must_use]
pub fn fragment(payload: &[u8], chunk_size: usize) -> Vec<Bytes> {
    assert!(chunk_size > 0, "fragment chunk_size must be non-zero");
    payload.chunks(chunk_size).map(Bytes::copy_from_slice).collect()
}
