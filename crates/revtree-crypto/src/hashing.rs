//! Hashing utilities for record fingerprinting
//!
//! This module provides the hash function the Merkle tree is built on:
//! - Leaf digests for `(id, text)` records
//! - Pairwise combination of child digests
//! - Hex encoding for persisted roots and display
//!
//! Internal nodes hash the concatenated *hex strings* of their children,
//! not the raw digest bytes. Roots are therefore comparable with root files
//! written by earlier tooling that worked on hex strings throughout.

use crate::{CryptoError, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Size of a digest in bytes (256 bits)
pub const DIGEST_BYTE_SIZE: usize = 32;

/// Length of a digest rendered as lowercase hex
pub const DIGEST_HEX_LEN: usize = DIGEST_BYTE_SIZE * 2;

/// A 256-bit digest produced by a [`Hasher`]
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Digest([u8; DIGEST_BYTE_SIZE]);

impl Digest {
    /// Create a digest from raw bytes
    pub fn new(bytes: [u8; DIGEST_BYTE_SIZE]) -> Self {
        Self(bytes)
    }

    /// Parse a digest from a hex string
    pub fn from_hex(s: &str) -> Result<Self> {
        let bytes = hex::decode(s)?;
        if bytes.len() != DIGEST_BYTE_SIZE {
            return Err(CryptoError::InvalidDigest {
                expected: DIGEST_BYTE_SIZE,
                actual: bytes.len(),
            });
        }
        let mut arr = [0u8; DIGEST_BYTE_SIZE];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }

    /// Get the digest as bytes
    pub fn as_bytes(&self) -> &[u8; DIGEST_BYTE_SIZE] {
        &self.0
    }

    /// Convert to a lowercase hex string
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// The first `n` hex characters, for compact labels
    pub fn short(&self, n: usize) -> String {
        let mut s = self.to_hex();
        s.truncate(n.min(DIGEST_HEX_LEN));
        s
    }

    /// Lowercase hex as ASCII bytes, without allocating
    pub fn hex_bytes(&self) -> [u8; DIGEST_HEX_LEN] {
        const CHARS: &[u8; 16] = b"0123456789abcdef";
        let mut out = [0u8; DIGEST_HEX_LEN];
        for (i, byte) in self.0.iter().enumerate() {
            out[2 * i] = CHARS[(byte >> 4) as usize];
            out[2 * i + 1] = CHARS[(byte & 0x0f) as usize];
        }
        out
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({})", self.to_hex())
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl FromStr for Digest {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_hex(s)
    }
}

impl AsRef<[u8]> for Digest {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; DIGEST_BYTE_SIZE]> for Digest {
    fn from(bytes: [u8; DIGEST_BYTE_SIZE]) -> Self {
        Self(bytes)
    }
}

impl From<blake3::Hash> for Digest {
    fn from(hash: blake3::Hash) -> Self {
        Self(*hash.as_bytes())
    }
}

impl Serialize for Digest {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Digest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Digest::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// The hash function a tree is built with
///
/// Implementations must be pure: the same input always yields the same digest.
pub trait Hasher {
    /// Hash arbitrary bytes
    fn hash(&self, data: &[u8]) -> Digest;

    /// Digest of one record: `H(id ++ text)` with no separator
    fn leaf(&self, id: &str, text: &str) -> Digest {
        let mut buf = Vec::with_capacity(id.len() + text.len());
        buf.extend_from_slice(id.as_bytes());
        buf.extend_from_slice(text.as_bytes());
        self.hash(&buf)
    }

    /// Digest of an internal node with two children: `H(hex(left) ++ hex(right))`
    fn combine(&self, left: &Digest, right: &Digest) -> Digest {
        let mut buf = [0u8; DIGEST_HEX_LEN * 2];
        buf[..DIGEST_HEX_LEN].copy_from_slice(&left.hex_bytes());
        buf[DIGEST_HEX_LEN..].copy_from_slice(&right.hex_bytes());
        self.hash(&buf)
    }
}

impl<H: Hasher + ?Sized> Hasher for &H {
    fn hash(&self, data: &[u8]) -> Digest {
        (**self).hash(data)
    }
}

/// SHA-256 hasher (the default)
#[derive(Clone, Copy, Debug, Default)]
pub struct Sha256Hasher;

impl Hasher for Sha256Hasher {
    fn hash(&self, data: &[u8]) -> Digest {
        use sha2::Digest as _;
        let out = sha2::Sha256::digest(data);
        let mut arr = [0u8; DIGEST_BYTE_SIZE];
        arr.copy_from_slice(&out);
        Digest(arr)
    }
}

/// BLAKE3 hasher
#[derive(Clone, Copy, Debug, Default)]
pub struct Blake3Hasher;

impl Hasher for Blake3Hasher {
    fn hash(&self, data: &[u8]) -> Digest {
        blake3::hash(data).into()
    }
}

/// Runtime selection of the hash function
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    /// SHA-256
    #[default]
    Sha256,
    /// BLAKE3
    Blake3,
}

impl HashAlgorithm {
    /// Canonical lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sha256 => "sha256",
            Self::Blake3 => "blake3",
        }
    }
}

impl Hasher for HashAlgorithm {
    fn hash(&self, data: &[u8]) -> Digest {
        match self {
            Self::Sha256 => Sha256Hasher.hash(data),
            Self::Blake3 => Blake3Hasher.hash(data),
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HashAlgorithm {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "sha256" | "sha-256" => Ok(Self::Sha256),
            "blake3" => Ok(Self::Blake3),
            other => Err(CryptoError::UnknownAlgorithm(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    // sha256("abc")
    const ABC_SHA256: &str = "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad";

    #[test]
    fn test_sha256_known_vector() {
        let digest = Sha256Hasher.hash(b"abc");
        assert_eq!(digest.to_hex(), ABC_SHA256);
    }

    #[test]
    fn test_hash_consistency() {
        let a = Sha256Hasher.hash(b"test data");
        let b = Sha256Hasher.hash(b"test data");
        assert_eq!(a, b);
        assert_ne!(a, Blake3Hasher.hash(b"test data"));
    }

    #[test]
    fn test_leaf_concatenates_id_and_text() {
        let hasher = Sha256Hasher;
        assert_eq!(hasher.leaf("ab", "c"), hasher.hash(b"abc"));
        assert_eq!(hasher.leaf("a", "bc"), hasher.hash(b"abc"));
    }

    #[test]
    fn test_combine_hashes_hex_strings() {
        let hasher = Sha256Hasher;
        let l = hasher.hash(b"left");
        let r = hasher.hash(b"right");
        let expected = hasher.hash(format!("{}{}", l.to_hex(), r.to_hex()).as_bytes());
        assert_eq!(hasher.combine(&l, &r), expected);
        assert_ne!(hasher.combine(&l, &r), hasher.combine(&r, &l));
    }

    #[test]
    fn test_hex_bytes_match_to_hex() {
        let digest = Sha256Hasher.hash(b"abc");
        assert_eq!(&digest.hex_bytes()[..], ABC_SHA256.as_bytes());
        let zero = Digest::new([0u8; DIGEST_BYTE_SIZE]);
        assert_eq!(&zero.hex_bytes()[..], zero.to_hex().as_bytes());
        let ff = Digest::new([0xffu8; DIGEST_BYTE_SIZE]);
        assert_eq!(&ff.hex_bytes()[..], "f".repeat(DIGEST_HEX_LEN).as_bytes());
    }

    #[test]
    fn test_hex_roundtrip() {
        let digest = Sha256Hasher.hash(b"abc");
        assert_eq!(Digest::from_hex(ABC_SHA256).unwrap(), digest);
        assert_eq!(digest.short(16), &ABC_SHA256[..16]);
        assert_eq!(digest.short(1000), ABC_SHA256);
    }

    #[rstest]
    #[case("")]
    #[case("abcd")]
    #[case("zz")]
    #[case(&"00".repeat(33))]
    fn test_from_hex_rejects_bad_input(#[case] input: &str) {
        assert!(Digest::from_hex(input).is_err());
    }

    #[test]
    fn test_digest_serde_as_hex() {
        let digest = Sha256Hasher.hash(b"abc");
        let json = serde_json::to_string(&digest).unwrap();
        assert_eq!(json, format!("\"{}\"", ABC_SHA256));
        let back: Digest = serde_json::from_str(&json).unwrap();
        assert_eq!(back, digest);
    }

    #[rstest]
    #[case("sha256", HashAlgorithm::Sha256)]
    #[case("SHA-256", HashAlgorithm::Sha256)]
    #[case("blake3", HashAlgorithm::Blake3)]
    fn test_algorithm_parse(#[case] name: &str, #[case] expected: HashAlgorithm) {
        assert_eq!(name.parse::<HashAlgorithm>().unwrap(), expected);
    }

    #[test]
    fn test_algorithm_dispatch() {
        assert_eq!(HashAlgorithm::Sha256.hash(b"x"), Sha256Hasher.hash(b"x"));
        assert_eq!(HashAlgorithm::Blake3.hash(b"x"), Blake3Hasher.hash(b"x"));
        assert!("md5".parse::<HashAlgorithm>().is_err());
    }
}
