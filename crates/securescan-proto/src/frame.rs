//! Protocol frame envelope.
//!
//! A [`Frame`] is the unit appended to the simulation's frame history: a
//! typed, timestamped message between two addresses. It is a pure data
//! holder; all protocol decisions live in the actor state machines.

use std::fmt;
use std::time::Instant;

use bytes::Bytes;

use crate::addr::Addr;
use crate::errors::ProtocolError;

/// The enumerable kinds of discovery frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameType {
    /// Unsolicited advertisement from an access point
    Beacon,
    /// Solicited query from a station
    ProbeRequest,
    /// Access point answer completing the handshake
    ProbeResponse,
}

impl fmt::Display for FrameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FrameType::Beacon => "Beacon",
            FrameType::ProbeRequest => "ProbeRequest",
            FrameType::ProbeResponse => "ProbeResponse",
        };
        f.write_str(name)
    }
}

/// Identifier of the simulated device that sent a frame.
///
/// Carried on every frame so the external classifier has ground-truth
/// labels when it tries to link probe messages back to devices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActorId(pub u32);

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Frame contents: plaintext or a sequence of ciphertext fragments.
///
/// # Invariants
///
/// - `Fragments` are ordered; reassembly after decryption is plain
///   concatenation.
/// - Each fragment is one RSA-OAEP ciphertext block, so all fragments of a
///   frame have the same fixed size (the cipher's modulus length).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FrameContents {
    /// Plaintext payload (standard protocol, or a beacon's advertised
    /// identity/key material)
    Plain(Bytes),
    /// Ordered asymmetric-ciphertext fragments (secure protocol)
    Fragments(Vec<Bytes>),
}

impl FrameContents {
    /// Borrow the plaintext payload.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::ContentsMismatch`] if the contents are
    /// fragmented ciphertext.
    pub fn as_plain(&self) -> Result<&Bytes, ProtocolError> {
        match self {
            FrameContents::Plain(bytes) => Ok(bytes),
            FrameContents::Fragments(_) => {
                Err(ProtocolError::ContentsMismatch { expected: "plaintext contents" })
            },
        }
    }

    /// Borrow the ciphertext fragments.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::ContentsMismatch`] if the contents are
    /// plaintext.
    pub fn as_fragments(&self) -> Result<&[Bytes], ProtocolError> {
        match self {
            FrameContents::Fragments(fragments) => Ok(fragments),
            FrameContents::Plain(_) => {
                Err(ProtocolError::ContentsMismatch { expected: "ciphertext fragments" })
            },
        }
    }
}

impl fmt::Display for FrameContents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameContents::Plain(bytes) => {
                write!(f, "{}", String::from_utf8_lossy(bytes))
            },
            FrameContents::Fragments(fragments) => {
                let total: usize = fragments.iter().map(Bytes::len).sum();
                write!(f, "<{} ciphertext fragments, {} bytes>", fragments.len(), total)
            },
        }
    }
}

/// A discovery protocol frame.
///
/// Immutable once constructed: the struct is built whole by [`Frame::new`]
/// and appended to the history as-is. The `sent_at` timestamp comes from
/// the caller's environment, never from the system clock directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Kind of frame
    pub frame_type: FrameType,
    /// When the frame was sent (environment time)
    pub sent_at: Instant,
    /// Sender address (stable or rotating, depending on actor and protocol)
    pub source: Addr,
    /// Receiver address; discovery traffic is broadcast
    pub destination: Addr,
    /// Ground-truth label of the sending device
    pub actor: ActorId,
    /// Payload
    pub contents: FrameContents,
}

impl Frame {
    /// Construct a frame.
    #[must_use]
    pub fn new(
        frame_type: FrameType,
        sent_at: Instant,
        source: Addr,
        destination: Addr,
        actor: ActorId,
        contents: FrameContents,
    ) -> Self {
        Self { frame_type, sent_at, source, destination, actor, contents }
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Frame: \t\t{}", self.frame_type)?;
        writeln!(f, "Source: \t{}", self.source)?;
        writeln!(f, "Destination: \t{}", self.destination)?;
        writeln!(f, "Actor: \t\t{}", self.actor)?;
        write!(f, "Contents: \t{}", self.contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_frame(contents: FrameContents) -> Frame {
        Frame::new(
            FrameType::Beacon,
            Instant::now(),
            Addr::from_bytes([1, 2, 3, 4, 5, 6]),
            Addr::broadcast(),
            ActorId(7),
            contents,
        )
    }

    #[test]
    fn plain_contents_accessors() {
        let contents = FrameContents::Plain(Bytes::from_static(b"ssidname"));
        assert!(contents.as_plain().is_ok());
        assert!(matches!(
            contents.as_fragments(),
            Err(ProtocolError::ContentsMismatch { .. })
        ));
    }

    #[test]
    fn fragment_contents_accessors() {
        let contents =
            FrameContents::Fragments(vec![Bytes::from_static(b"ab"), Bytes::from_static(b"cd")]);
        assert!(contents.as_fragments().is_ok());
        assert!(contents.as_plain().is_err());
    }

    #[test]
    fn display_mentions_frame_type_and_source() {
        let frame = sample_frame(FrameContents::Plain(Bytes::from_static(b"hello")));
        let dump = frame.to_string();
        assert!(dump.contains("Beacon"));
        assert!(dump.contains("010203040506"));
        assert!(dump.contains("hello"));
    }

    #[test]
    fn fragments_hash_by_content() {
        use std::collections::HashSet;

        let a = FrameContents::Fragments(vec![Bytes::from_static(b"xy")]);
        let b = FrameContents::Fragments(vec![Bytes::from_static(b"xy")]);
        let c = FrameContents::Fragments(vec![Bytes::from_static(b"zz")]);

        let set: HashSet<_> = [a, b, c].into_iter().collect();
        assert_eq!(set.len(), 2);
    }
}
