//! Ethereum addresses
//!
//! Addresses are compared by their 20 raw bytes, so `0xabc...` and `0xABC...`
//! name the same account. They are always rendered in EIP-55 checksum form,
//! which is also the form the merkle tree generator writes.

use crate::error::{CoreError, Result};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha3::{Digest, Keccak256};
use std::fmt;
use std::str::FromStr;

/// A 20 byte EVM account or contract address
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address([u8; 20]);

impl Address {
    /// The zero address
    pub const ZERO: Address = Address([0u8; 20]);

    /// Wrap raw bytes
    pub const fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Raw bytes
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }

    /// Parse a `0x`-prefixed hex address. Mixed case input is accepted
    /// without enforcing the checksum.
    pub fn parse(input: &str) -> Result<Self> {
        let hex_str = input
            .strip_prefix("0x")
            .or_else(|| input.strip_prefix("0X"))
            .ok_or_else(|| CoreError::InvalidAddress(input.to_string()))?;

        if hex_str.len() != 40 {
            return Err(CoreError::InvalidAddress(input.to_string()));
        }

        let bytes =
            hex::decode(hex_str).map_err(|_| CoreError::InvalidAddress(input.to_string()))?;

        let mut out = [0u8; 20];
        out.copy_from_slice(&bytes);
        Ok(Self(out))
    }

    /// EIP-55 mixed case checksum encoding
    pub fn to_checksum(&self) -> String {
        let lower = hex::encode(self.0);
        let hash = Keccak256::digest(lower.as_bytes());

        let mut out = String::with_capacity(42);
        out.push_str("0x");
        for (i, c) in lower.chars().enumerate() {
            let nibble = if i % 2 == 0 {
                hash[i / 2] >> 4
            } else {
                hash[i / 2] & 0x0f
            };
            if c.is_ascii_alphabetic() && nibble >= 8 {
                out.push(c.to_ascii_uppercase());
            } else {
                out.push(c);
            }
        }
        out
    }

    /// ABI encoding: left padded to a 32 byte word
    pub fn to_word(&self) -> [u8; 32] {
        let mut word = [0u8; 32];
        word[12..].copy_from_slice(&self.0);
        word
    }
}

impl FromStr for Address {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_checksum())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_checksum())
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_checksum())
    }
}

struct AddressVisitor;

impl<'de> Visitor<'de> for AddressVisitor {
    type Value = Address;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a 0x-prefixed 20 byte hex address")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<Address, E> {
        Address::parse(v).map_err(E::custom)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_str(AddressVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHECKSUMMED: &str = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";

    #[test]
    fn test_checksum_encoding() {
        let addr = Address::parse(&CHECKSUMMED.to_lowercase()).unwrap();
        assert_eq!(addr.to_checksum(), CHECKSUMMED);

        let other = Address::parse("0xfb6916095ca1df60bb79ce92ce3ea74c37c5d359").unwrap();
        assert_eq!(
            other.to_string(),
            "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359"
        );
    }

    #[test]
    fn test_case_insensitive_equality() {
        let a = Address::parse(CHECKSUMMED).unwrap();
        let b = Address::parse(&CHECKSUMMED.to_uppercase().replacen("0X", "0x", 1)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_rejects_malformed() {
        assert!(Address::parse("5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed").is_err());
        assert!(Address::parse("0x1234").is_err());
        assert!(Address::parse("0xzzAeb6053F3E94C9b9A09f33669435E7Ef1BeAed").is_err());
    }

    #[test]
    fn test_serde_as_map_key() {
        let mut map = indexmap::IndexMap::new();
        map.insert(Address::parse(CHECKSUMMED).unwrap(), 1u32);

        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, format!("{{\"{}\":1}}", CHECKSUMMED));

        let back: indexmap::IndexMap<Address, u32> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, map);
    }

    #[test]
    fn test_word_padding() {
        let addr = Address::from_bytes([0x11; 20]);
        let word = addr.to_word();
        assert_eq!(&word[..12], &[0u8; 12]);
        assert_eq!(&word[12..], &[0x11; 20]);
    }
}
