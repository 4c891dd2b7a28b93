//! Authorization signature verification
//!
//! Validates a pre-signature against the live record: the signature must
//! recover to exactly the claimed owner over the domain-separated digest of
//! `Will { heir, safe, nonce }`. The domain is injected configuration, so
//! the same verifier code runs against simulated chain identities in tests.

use styx_core::{recover_signer, will_digest, Address, Signature, SignatureError, SigningDomain};
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum VerifyError {
    #[error("Malformed signature: {0}")]
    Malformed(#[from] SignatureError),

    #[error("Signature recovers to {recovered}, expected owner {expected}")]
    SignerMismatch {
        expected: Address,
        recovered: Address,
    },
}

/// Verifies will authorizations for one deployed module identity.
#[derive(Debug, Clone)]
pub struct SignatureVerifier {
    domain: SigningDomain,
}

impl SignatureVerifier {
    pub fn new(domain: SigningDomain) -> Self {
        Self { domain }
    }

    pub fn domain(&self) -> &SigningDomain {
        &self.domain
    }

    /// Check that `signature` authorizes `Will { heir, safe, nonce }` and
    /// was produced by `owner`.
    ///
    /// The caller supplies the nonce from the live record — a signature
    /// bound to any superseded nonce recovers to a different digest and
    /// therefore a different (or no) signer.
    pub fn verify(
        &self,
        signature: &Signature,
        owner: &Address,
        heir: &Address,
        safe: &Address,
        nonce: u64,
    ) -> Result<(), VerifyError> {
        let digest = will_digest(&self.domain, heir, safe, nonce);
        let recovered = recover_signer(signature, digest)?;
        if recovered != *owner {
            return Err(VerifyError::SignerMismatch {
                expected: *owner,
                recovered,
            });
        }
        Ok(())
    }
}
