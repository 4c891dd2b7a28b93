//! Styx core types
//!
//! Addresses, the domain-separated signing scheme for will authorizations,
//! and sealing of the pre-signature payload handed to the decryption
//! network.
//!
//! # Concepts
//!
//! - **Authorization**: the owner signs `Will { heir, safe, nonce }` under a
//!   [`SigningDomain`] once, ahead of time. The signature is the only thing
//!   an executor ever needs to present.
//! - **Sealing**: the signature is encrypted before it leaves the owner's
//!   machine; the symmetric key is custodied by the decryption network and
//!   released only when the liveness predicate holds.

pub mod address;
pub mod domain;
pub mod seal;
pub mod signature;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use address::{Address, AddressError};
pub use domain::{will_digest, SigningDomain};
pub use seal::{SealError, SealKey, SealedPayload};
pub use signature::{recover_signer, sign_will, Signature, SignatureError};
