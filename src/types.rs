//! Core types for Nano-style proof-of-work
//!
//! Fundamental types used throughout the work client with proper validation,
//! binary encoding, and text encoding at the process boundary.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Work root (32 bytes): the previous block hash, or the account public key
/// for open blocks.
///
/// Parsed once at startup from a 64-character hex string and shared read-only
/// by all search workers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Root([u8; 32]);

impl Root {
    /// Expected hex string length (32 bytes * 2)
    pub const HEX_LEN: usize = 64;

    /// Create a root from raw bytes
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the root bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert to hexadecimal string
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl FromStr for Root {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.len() != Self::HEX_LEN {
            return Err(Error::parse(format!(
                "invalid root length: expected {} hex chars, got {}",
                Self::HEX_LEN,
                s.len()
            )));
        }

        let bytes = hex::decode(s)
            .map_err(|e| Error::parse(format!("invalid hex in root: {}", e)))?;

        let mut array = [0u8; 32];
        array.copy_from_slice(&bytes);
        Ok(Self(array))
    }
}

impl fmt::Display for Root {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl Serialize for Root {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Root {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Root::from_str(&s).map_err(serde::de::Error::custom)
    }
}

/// Proof-of-work nonce (8 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Nonce(pub u64);

impl Nonce {
    /// Create a new nonce
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// Get the nonce value
    pub fn value(&self) -> u64 {
        self.0
    }

    /// Convert to bytes (little-endian, the order hashed by the PoW digest)
    pub fn to_bytes(&self) -> [u8; 8] {
        self.0.to_le_bytes()
    }

    /// Create from bytes (little-endian)
    pub fn from_bytes(bytes: [u8; 8]) -> Self {
        Self(u64::from_le_bytes(bytes))
    }

    /// Increment nonce, wrapping at the 64-bit boundary.
    ///
    /// Wraparound is deliberate: the search space is cyclic, so a worker
    /// seeded near `u64::MAX` continues from zero rather than stopping.
    pub fn increment(&mut self) {
        self.0 = self.0.wrapping_add(1);
    }

    /// Add to nonce, wrapping
    pub fn add(&mut self, value: u64) {
        self.0 = self.0.wrapping_add(value);
    }
}

impl fmt::Display for Nonce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", WorkString::from(*self))
    }
}

/// Server work string: 16-character hex encoding of a nonce.
///
/// Encodes the nonce's little-endian byte order, matching the server
/// work-string convention (no byte swap is applied on either side).
/// `WorkString::from` and `FromStr` are exact inverses for every nonce.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WorkString(String);

impl WorkString {
    /// Expected work string length (8 bytes * 2)
    pub const HEX_LEN: usize = 16;

    /// Get the work string text
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Decode back into the nonce this string encodes
    pub fn to_nonce(&self) -> Result<Nonce> {
        decode_work(&self.0)
    }
}

impl From<Nonce> for WorkString {
    fn from(nonce: Nonce) -> Self {
        Self(hex::encode(nonce.to_bytes()))
    }
}

impl FromStr for WorkString {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        decode_work(s).map(WorkString::from)
    }
}

impl fmt::Display for WorkString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for WorkString {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for WorkString {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Shared decode path for `WorkString::FromStr` and `WorkString::to_nonce`.
fn decode_work(s: &str) -> Result<Nonce> {
    if s.len() != WorkString::HEX_LEN {
        return Err(Error::decode(format!(
            "invalid work string length: expected {} hex chars, got {}",
            WorkString::HEX_LEN,
            s.len()
        )));
    }

    let bytes = hex::decode(s)
        .map_err(|e| Error::decode(format!("invalid hex in work string: {}", e)))?;

    let mut array = [0u8; 8];
    array.copy_from_slice(&bytes);
    Ok(Nonce::from_bytes(array))
}

/// Difficulty threshold: the minimum digest value (as an unsigned 64-bit
/// integer) a nonce must reach to be accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Difficulty(pub u64);

impl Difficulty {
    /// Standard network publish threshold.
    ///
    /// Must stay bit-exact for wire compatibility with external verifiers.
    pub const FULL: Difficulty = Difficulty(0xffff_ffc0_0000_0000);

    /// Relaxed test-network publish threshold.
    ///
    /// Exposed as selectable configuration only; never applied implicitly.
    pub const TEST: Difficulty = Difficulty(0xff00_0000_0000_0000);

    /// Create a custom difficulty threshold
    pub fn new(threshold: u64) -> Self {
        Self(threshold)
    }

    /// Get the raw threshold value
    pub fn value(&self) -> u64 {
        self.0
    }

    /// Check whether a digest value meets this threshold
    pub fn is_met_by(&self, digest: u64) -> bool {
        digest >= self.0
    }

    /// Expected number of attempts to find a valid nonce at this threshold
    pub fn expected_attempts(&self) -> f64 {
        let gap = (u64::MAX - self.0) as f64 + 1.0;
        2f64.powi(64) / gap
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}
