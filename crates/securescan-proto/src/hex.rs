//! Lowercase hex encoding for binary payload fields.
//!
//! Payloads travel as JSON; key material and signatures are hex strings so
//! verbose frame dumps stay readable. The `serde` submodule plugs into
//! `#[serde(with = "hex::serde")]`.

/// Encode bytes as a lowercase hex string.
#[must_use]
pub fn encode(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        use std::fmt::Write;
        // Infallible for String targets.
        let _ = write!(out, "{b:02x}");
    }
    out
}

/// Decode a hex string into bytes.
///
/// Accepts lowercase and uppercase digits. Returns `None` on odd length or
/// non-hex characters.
#[must_use]
pub fn decode(s: &str) -> Option<Vec<u8>> {
    if s.len() % 2 != 0 {
        return None;
    }
    let digits = s.as_bytes();
    let mut out = Vec::with_capacity(digits.len() / 2);
    for pair in digits.chunks_exact(2) {
        let hi = (pair[0] as char).to_digit(16)?;
        let lo = (pair[1] as char).to_digit(16)?;
        out.push((hi * 16 + lo) as u8);
    }
    Some(out)
}

/// Serde adapter: `#[serde(with = "crate::hex::serde")]` on `Vec<u8>`.
pub mod serde {
    use serde::{Deserialize, Deserializer, Serializer};

    /// Serialize bytes as a lowercase hex string.
    pub fn serialize<S: Serializer>(bytes: &[u8], ser: S) -> Result<S::Ok, S::Error> {
        ser.serialize_str(&super::encode(bytes))
    }

    /// Deserialize bytes from a hex string.
    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(de)?;
        super::decode(&s).ok_or_else(|| serde::de::Error::custom("invalid hex string"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_decode_round_trip() {
        let data = vec![0x00, 0x7f, 0xff, 0x42];
        let s = encode(&data);
        assert_eq!(s, "007fff42");
        assert_eq!(decode(&s).unwrap(), data);
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(decode("abc").is_none()); // odd length
        assert!(decode("zz").is_none()); // non-hex
        assert_eq!(decode("").unwrap(), Vec::<u8>::new());
    }
}
