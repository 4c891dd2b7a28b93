//! Domain-separated digest for will authorizations
//!
//! An authorization signature covers `Will { heir, safe, nonce }` bound to a
//! [`SigningDomain`] — protocol name, protocol version, chain identity, and
//! the verifying module's address. A signature produced for one domain can
//! never authorize anything in another: cross-protocol, cross-chain, and
//! cross-deployment replay all change the digest.
//!
//! # Digest layout
//!
//! ```text
//! domain_separator = SHA256(DOMAIN_TYPE_TAG || SHA256(name) || SHA256(version)
//!                           || chain_id_be || verifying_contract)
//! struct_hash      = SHA256(WILL_TYPE_TAG || heir || safe || nonce_be)
//! digest           = SHA256(0x19 || 0x01 || domain_separator || struct_hash)
//! ```
//!
//! All fields are fixed-width, so no length prefixes are needed.
//!
//! The domain is injected configuration, not a hard-coded constant — tests
//! run against simulated chain identities without touching the scheme.

use crate::address::Address;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Canonical protocol name used by the reference deployment.
pub const PROTOCOL_NAME: &str = "Styx";

/// Canonical protocol version used by the reference deployment.
pub const PROTOCOL_VERSION: &str = "0.1.0";

/// Type tag for the domain separator hash.
const DOMAIN_TYPE_TAG: &[u8] =
    b"SigningDomain(string name,string version,uint64 chainId,address verifyingContract)";

/// Type tag for the will struct hash.
const WILL_TYPE_TAG: &[u8] = b"Will(address heir,address safe,uint64 nonce)";

/// The signing context a will authorization is bound to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SigningDomain {
    /// Protocol name, e.g. "Styx".
    pub name: String,
    /// Protocol version string.
    pub version: String,
    /// Chain identifier of the ledger the module is deployed on.
    pub chain_id: u64,
    /// Address of the deployed will module that verifies signatures.
    pub verifying_contract: Address,
}

impl SigningDomain {
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        chain_id: u64,
        verifying_contract: Address,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            chain_id,
            verifying_contract,
        }
    }

    /// Domain with the canonical protocol name and version.
    pub fn styx(chain_id: u64, verifying_contract: Address) -> Self {
        Self::new(PROTOCOL_NAME, PROTOCOL_VERSION, chain_id, verifying_contract)
    }

    /// The domain separator hash.
    pub fn separator(&self) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(DOMAIN_TYPE_TAG);
        hasher.update(Sha256::digest(self.name.as_bytes()));
        hasher.update(Sha256::digest(self.version.as_bytes()));
        hasher.update(self.chain_id.to_be_bytes());
        hasher.update(self.verifying_contract.as_bytes());
        hasher.finalize().into()
    }
}

/// Compute the 32-byte digest the owner signs for `Will { heir, safe, nonce }`.
pub fn will_digest(domain: &SigningDomain, heir: &Address, safe: &Address, nonce: u64) -> [u8; 32] {
    let mut struct_hasher = Sha256::new();
    struct_hasher.update(WILL_TYPE_TAG);
    struct_hasher.update(heir.as_bytes());
    struct_hasher.update(safe.as_bytes());
    struct_hasher.update(nonce.to_be_bytes());
    let struct_hash: [u8; 32] = struct_hasher.finalize().into();

    let mut hasher = Sha256::new();
    hasher.update([0x19, 0x01]);
    hasher.update(domain.separator());
    hasher.update(struct_hash);
    hasher.finalize().into()
}
