//! Shared test utilities for Styx crates.
//!
//! Deterministic keypairs and addresses so tests narrate fixed scenarios
//! instead of depending on randomness.

use crate::address::Address;
use crate::signature::address_of;
use secp256k1::{PublicKey, Secp256k1, SecretKey};

/// Generate a deterministic keypair from a seed byte.
///
/// The secret key is `[0x01, 0x00, ..., 0x00, seed]` (32 bytes).
/// Different seed bytes produce different keys.
pub fn test_keypair(seed_byte: u8) -> (SecretKey, PublicKey) {
    let secp = Secp256k1::new();
    let mut secret_bytes = [0u8; 32];
    secret_bytes[31] = seed_byte;
    secret_bytes[0] = 0x01;
    let sk = SecretKey::from_slice(&secret_bytes).unwrap();
    let pk = sk.public_key(&secp);
    (sk, pk)
}

/// The address belonging to `test_keypair(seed_byte)`.
pub fn test_signer_address(seed_byte: u8) -> Address {
    let (_, pk) = test_keypair(seed_byte);
    address_of(&pk)
}

/// A fixed address filled with `byte`. Not derived from any key — use for
/// safes, modules, and parties that never sign.
pub fn test_address(byte: u8) -> Address {
    Address::from_slice(&[byte; 20]).unwrap()
}
