//! Recoverable authorization signatures
//!
//! A will authorization is a 65-byte compact ECDSA signature
//! (`r || s || recovery_id`) over a [`will_digest`](crate::domain::will_digest).
//! Verification is recovery-based: the signer's address is derived from the
//! recovered public key and must match the claimed owner exactly.
//!
//! The final byte accepts both the raw recovery id (0/1) and the 27/28
//! convention used by most wallet tooling.

use crate::address::Address;
use crate::domain::{will_digest, SigningDomain};
use secp256k1::ecdsa::{RecoverableSignature, RecoveryId};
use secp256k1::{Message, PublicKey, Secp256k1, SecretKey};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Length of a compact recoverable signature in bytes.
pub const SIGNATURE_LEN: usize = 65;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SignatureError {
    #[error("Invalid signature length: expected {SIGNATURE_LEN} bytes, got {0}")]
    InvalidLength(usize),

    #[error("Invalid hex encoding: {0}")]
    InvalidHex(String),

    #[error("Invalid recovery id byte: {0}")]
    InvalidRecoveryId(u8),

    #[error("Signature recovery failed: {0}")]
    Recovery(String),
}

/// A compact recoverable signature: `r (32) || s (32) || recovery_id (1)`.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Signature([u8; SIGNATURE_LEN]);

impl Signature {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SignatureError> {
        if bytes.len() != SIGNATURE_LEN {
            return Err(SignatureError::InvalidLength(bytes.len()));
        }
        let mut buf = [0u8; SIGNATURE_LEN];
        buf.copy_from_slice(bytes);
        Ok(Self(buf))
    }

    pub fn to_bytes(&self) -> [u8; SIGNATURE_LEN] {
        self.0
    }

    /// The raw recovery id, normalizing the 27/28 convention to 0/1.
    fn recovery_id(&self) -> Result<RecoveryId, SignatureError> {
        let v = self.0[64];
        let raw = match v {
            0 | 1 => v,
            27 | 28 => v - 27,
            other => return Err(SignatureError::InvalidRecoveryId(other)),
        };
        RecoveryId::from_i32(raw as i32).map_err(|_| SignatureError::InvalidRecoveryId(v))
    }

    fn to_recoverable(&self) -> Result<RecoverableSignature, SignatureError> {
        let recid = self.recovery_id()?;
        RecoverableSignature::from_compact(&self.0[..64], recid)
            .map_err(|e| SignatureError::Recovery(e.to_string()))
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature(0x{})", hex::encode(self.0))
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for Signature {
    type Err = SignatureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let stripped = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).unwrap_or(s);
        let bytes = hex::decode(stripped).map_err(|e| SignatureError::InvalidHex(e.to_string()))?;
        Self::from_bytes(&bytes)
    }
}

impl Serialize for Signature {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Signature {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Signature::from_str(&s).map_err(serde::de::Error::custom)
    }
}

/// Derive an address from a public key: last 20 bytes of the SHA-256 of the
/// uncompressed key body (the 0x04 prefix byte is excluded).
pub fn address_of(public_key: &PublicKey) -> Address {
    let uncompressed = public_key.serialize_uncompressed();
    let hash = Sha256::digest(&uncompressed[1..]);
    Address::from_slice(&hash[12..]).expect("SHA-256 output always yields 20 bytes")
}

/// Sign a will authorization for `Will { heir, safe, nonce }` under `domain`.
///
/// This is the owner-side half of the protocol: the result is sealed and
/// handed to the decryption network, to be released only once the liveness
/// predicate holds.
pub fn sign_will(
    secret_key: &SecretKey,
    domain: &SigningDomain,
    heir: &Address,
    safe: &Address,
    nonce: u64,
) -> Signature {
    let secp = Secp256k1::new();
    let digest = will_digest(domain, heir, safe, nonce);
    let message = Message::from_digest(digest);
    let (recid, compact) = secp
        .sign_ecdsa_recoverable(&message, secret_key)
        .serialize_compact();

    let mut bytes = [0u8; SIGNATURE_LEN];
    bytes[..64].copy_from_slice(&compact);
    bytes[64] = recid.to_i32() as u8;
    Signature(bytes)
}

/// Recover the signer's address from a signature over `digest`.
pub fn recover_signer(signature: &Signature, digest: [u8; 32]) -> Result<Address, SignatureError> {
    let secp = Secp256k1::new();
    let message = Message::from_digest(digest);
    let recoverable = signature.to_recoverable()?;
    let public_key = secp
        .recover_ecdsa(&message, &recoverable)
        .map_err(|e| SignatureError::Recovery(e.to_string()))?;
    Ok(address_of(&public_key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{test_address, test_keypair};

    fn test_domain() -> SigningDomain {
        SigningDomain::styx(1, test_address(0x70))
    }

    #[test]
    fn test_sign_and_recover() {
        let (sk, pk) = test_keypair(1);
        let domain = test_domain();
        let heir = test_address(2);
        let safe = test_address(3);

        let sig = sign_will(&sk, &domain, &heir, &safe, 0);
        let digest = will_digest(&domain, &heir, &safe, 0);

        assert_eq!(recover_signer(&sig, digest).unwrap(), address_of(&pk));
    }

    #[test]
    fn test_recovery_mismatch_on_different_nonce() {
        let (sk, pk) = test_keypair(1);
        let domain = test_domain();
        let heir = test_address(2);
        let safe = test_address(3);

        let sig = sign_will(&sk, &domain, &heir, &safe, 0);
        let digest = will_digest(&domain, &heir, &safe, 1);

        // Recovery over a different digest yields some key, but not ours.
        let recovered = recover_signer(&sig, digest);
        if let Ok(addr) = recovered {
            assert_ne!(addr, address_of(&pk));
        }
    }

    #[test]
    fn test_offset_recovery_id_accepted() {
        let (sk, pk) = test_keypair(1);
        let domain = test_domain();
        let heir = test_address(2);
        let safe = test_address(3);

        let sig = sign_will(&sk, &domain, &heir, &safe, 5);
        let mut bytes = sig.to_bytes();
        bytes[64] += 27;
        let offset_sig = Signature::from_bytes(&bytes).unwrap();

        let digest = will_digest(&domain, &heir, &safe, 5);
        assert_eq!(recover_signer(&offset_sig, digest).unwrap(), address_of(&pk));
    }

    #[test]
    fn test_bad_recovery_id_rejected() {
        let (sk, _) = test_keypair(1);
        let domain = test_domain();
        let sig = sign_will(&sk, &domain, &test_address(2), &test_address(3), 0);

        let mut bytes = sig.to_bytes();
        bytes[64] = 9;
        let bad = Signature::from_bytes(&bytes).unwrap();

        let digest = will_digest(&domain, &test_address(2), &test_address(3), 0);
        assert_eq!(
            recover_signer(&bad, digest),
            Err(SignatureError::InvalidRecoveryId(9))
        );
    }

    #[test]
    fn test_malformed_encoding_rejected() {
        assert_eq!(
            Signature::from_bytes(&[0u8; 64]),
            Err(SignatureError::InvalidLength(64))
        );
        assert!(matches!(
            Signature::from_str("0xnot-hex"),
            Err(SignatureError::InvalidHex(_))
        ));
    }

    #[test]
    fn test_hex_roundtrip() {
        let (sk, _) = test_keypair(7);
        let domain = test_domain();
        let sig = sign_will(&sk, &domain, &test_address(2), &test_address(3), 42);

        let restored = Signature::from_str(&sig.to_string()).unwrap();
        assert_eq!(sig, restored);
    }

    #[test]
    fn test_distinct_keys_yield_distinct_addresses() {
        let (_, pk1) = test_keypair(1);
        let (_, pk2) = test_keypair(2);
        assert_ne!(address_of(&pk1), address_of(&pk2));
    }
}
