//! 20-byte account addresses
//!
//! Addresses identify owners, heirs, safes, and modules. They display as
//! `0x`-prefixed lowercase hex and parse case-insensitively, so two
//! differently-cased renderings of the same account always compare equal
//! once parsed.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Length of an address in bytes.
pub const ADDRESS_LEN: usize = 20;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum AddressError {
    #[error("Invalid address length: expected {ADDRESS_LEN} bytes, got {0}")]
    InvalidLength(usize),

    #[error("Invalid hex encoding: {0}")]
    InvalidHex(String),
}

/// A 20-byte account address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address([u8; ADDRESS_LEN]);

impl Address {
    /// The zero address. Represents "no account" — a will record with a
    /// zero heir does not exist.
    pub const ZERO: Address = Address([0u8; ADDRESS_LEN]);

    pub const fn new(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, AddressError> {
        if bytes.len() != ADDRESS_LEN {
            return Err(AddressError::InvalidLength(bytes.len()));
        }
        let mut buf = [0u8; ADDRESS_LEN];
        buf.copy_from_slice(bytes);
        Ok(Self(buf))
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let stripped = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).unwrap_or(s);
        let bytes = hex::decode(stripped).map_err(|e| AddressError::InvalidHex(e.to_string()))?;
        Self::from_slice(&bytes)
    }
}

impl Serialize for Address {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Address::from_str(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display_roundtrip() {
        let s = "0x00000000000000000000000000000000000000ab";
        let addr = Address::from_str(s).unwrap();
        assert_eq!(addr.to_string(), s);
    }

    #[test]
    fn test_parse_case_insensitive() {
        let lower = Address::from_str("0xdeadbeefdeadbeefdeadbeefdeadbeefdeadbeef").unwrap();
        let upper = Address::from_str("0xDEADBEEFDEADBEEFDEADBEEFDEADBEEFDEADBEEF").unwrap();
        assert_eq!(lower, upper);
    }

    #[test]
    fn test_parse_without_prefix() {
        let with = Address::from_str("0xdeadbeefdeadbeefdeadbeefdeadbeefdeadbeef").unwrap();
        let without = Address::from_str("deadbeefdeadbeefdeadbeefdeadbeefdeadbeef").unwrap();
        assert_eq!(with, without);
    }

    #[test]
    fn test_rejects_bad_length() {
        assert_eq!(
            Address::from_str("0xdeadbeef"),
            Err(AddressError::InvalidLength(4))
        );
    }

    #[test]
    fn test_rejects_bad_hex() {
        assert!(matches!(
            Address::from_str("0xzzzzbeefdeadbeefdeadbeefdeadbeefdeadbeef"),
            Err(AddressError::InvalidHex(_))
        ));
    }

    #[test]
    fn test_zero_address() {
        assert!(Address::ZERO.is_zero());
        let addr = Address::from_str("0x0000000000000000000000000000000000000001").unwrap();
        assert!(!addr.is_zero());
    }

    #[test]
    fn test_serde_roundtrip() {
        let addr = Address::from_str("0xdeadbeefdeadbeefdeadbeefdeadbeefdeadbeef").unwrap();
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, "\"0xdeadbeefdeadbeefdeadbeefdeadbeefdeadbeef\"");
        let restored: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(addr, restored);
    }
}
