//! Sealing of the pre-signature payload
//!
//! The owner's authorization signature must not be public before the owner
//! is presumed gone, so it is sealed with AES-256-GCM under a fresh random
//! key before leaving the owner's machine. The key — not the payload — is
//! what the decryption network custodies, bound to the liveness predicate.
//!
//! # Format
//!
//! Sealed bytes are `[nonce (12)][ciphertext + tag]`. The payload also
//! carries the SHA-256 of those bytes, which the registry stores and emits
//! so observers can match a later-decrypted payload to the will it was
//! sealed for.
//!
//! # Security Notes
//!
//! - Each sealing uses a random nonce
//! - The key is zeroized on drop and never serialized
//! - Opening verifies the stored hash before attempting decryption

use aes_gcm::aead::{Aead, KeyInit, OsRng};
use aes_gcm::{AeadCore, Aes256Gcm, Key, Nonce};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Nonce length for AES-256-GCM.
const NONCE_LEN: usize = 12;

/// Minimum sealed length: nonce + GCM tag.
const MIN_SEALED_LEN: usize = NONCE_LEN + 16;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SealError {
    #[error("Sealing failed: {0}")]
    SealFailed(String),

    #[error("Opening failed: {0}")]
    OpenFailed(String),

    #[error("Sealed payload too short: {0} bytes")]
    TooShort(usize),

    #[error("Payload hash does not match sealed bytes")]
    HashMismatch,
}

/// A 256-bit symmetric sealing key. Zeroized on drop; intentionally not
/// serializable — it is handed to the decryption network out of band.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SealKey([u8; 32]);

impl SealKey {
    /// Generate a fresh random key.
    pub fn generate() -> Self {
        use rand::RngCore;
        let mut bytes = [0u8; 32];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

/// A sealed payload plus its integrity hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SealedPayload {
    /// `[nonce][ciphertext + tag]`, hex-encoded in serialized form.
    #[serde(with = "hex_bytes")]
    pub ciphertext: Vec<u8>,
    /// SHA-256 of `ciphertext`.
    #[serde(with = "hex_array")]
    pub hash: [u8; 32],
}

impl SealedPayload {
    /// Seal `plaintext` under `key` with a random nonce.
    pub fn seal(key: &SealKey, plaintext: &[u8]) -> Result<Self, SealError> {
        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key.0));
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let encrypted = cipher
            .encrypt(&nonce, plaintext)
            .map_err(|e| SealError::SealFailed(e.to_string()))?;

        let mut ciphertext = Vec::with_capacity(NONCE_LEN + encrypted.len());
        ciphertext.extend_from_slice(&nonce);
        ciphertext.extend_from_slice(&encrypted);

        let hash = Sha256::digest(&ciphertext).into();
        Ok(Self { ciphertext, hash })
    }

    /// Open the payload, verifying the integrity hash first.
    pub fn open(&self, key: &SealKey) -> Result<Vec<u8>, SealError> {
        if self.ciphertext.len() < MIN_SEALED_LEN {
            return Err(SealError::TooShort(self.ciphertext.len()));
        }
        let expected: [u8; 32] = Sha256::digest(&self.ciphertext).into();
        if expected != self.hash {
            return Err(SealError::HashMismatch);
        }

        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key.0));
        let nonce = Nonce::from_slice(&self.ciphertext[..NONCE_LEN]);
        cipher
            .decrypt(nonce, &self.ciphertext[NONCE_LEN..])
            .map_err(|e| SealError::OpenFailed(e.to_string()))
    }
}

/// Serde helper for `Vec<u8>` as a hex string.
mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        hex::decode(&s).map_err(serde::de::Error::custom)
    }
}

/// Serde helper for `[u8; 32]` as a hex string.
mod hex_array {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(bytes: &[u8; 32], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<[u8; 32], D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let bytes = hex::decode(&s).map_err(serde::de::Error::custom)?;
        bytes
            .try_into()
            .map_err(|_| serde::de::Error::custom("expected 32 bytes"))
    }
}
