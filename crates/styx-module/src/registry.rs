//! Will record storage
//!
//! Pure state: one optional [`WillRecord`] per `(owner, safe)` pair, plus
//! the pair's nonce counter. The counter lives outside the record so that
//! clearing a will never resets it — a signature issued against a prior
//! record stays dead forever.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use styx_core::{Address, SealedPayload};
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Heir must be a non-zero address")]
    ZeroHeir,

    #[error("Timeframe must be greater than zero")]
    ZeroTimeframe,

    #[error("No will exists for owner {owner} on safe {safe}")]
    NoWill { owner: Address, safe: Address },
}

/// A pending inheritance claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WillRecord {
    /// Designated recipient of the safe.
    pub heir: Address,
    /// Amount escrowed at creation, paid to whoever executes the will.
    pub tip: u128,
    /// Required inactivity duration in seconds before claimability.
    pub timeframe: u64,
    /// Nonce in effect when this record was created. The owner's
    /// pre-signature must be bound to exactly this value.
    pub nonce: u64,
    /// Unix timestamp of record creation; timelock baseline.
    pub started_at: u64,
    /// Sealed pre-signature and its hash, stored for observability and for
    /// binding the decryption-network condition.
    pub payload: SealedPayload,
}

impl WillRecord {
    /// Earliest instant at which the will becomes claimable.
    pub fn claimable_at(&self) -> u64 {
        self.started_at.saturating_add(self.timeframe)
    }
}

/// Per-`(owner, safe)` will records and nonce counters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WillRegistry {
    wills: BTreeMap<(Address, Address), WillRecord>,
    nonces: BTreeMap<(Address, Address), u64>,
}

impl WillRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create or overwrite the record for `(owner, safe)`.
    ///
    /// Bumps the pair's nonce and stamps the new record with it. Returns
    /// the stored record and the tip of any record it replaced (the caller
    /// is responsible for refunding it).
    pub fn set_record(
        &mut self,
        owner: Address,
        safe: Address,
        heir: Address,
        tip: u128,
        timeframe: u64,
        now: u64,
        payload: SealedPayload,
    ) -> Result<(WillRecord, Option<u128>), RegistryError> {
        if heir.is_zero() {
            return Err(RegistryError::ZeroHeir);
        }
        if timeframe == 0 {
            return Err(RegistryError::ZeroTimeframe);
        }

        let replaced_tip = self.wills.get(&(owner, safe)).map(|r| r.tip);
        let nonce = self.bump_nonce(owner, safe);
        let record = WillRecord {
            heir,
            tip,
            timeframe,
            nonce,
            started_at: now,
            payload,
        };
        self.wills.insert((owner, safe), record.clone());
        Ok((record, replaced_tip))
    }

    /// Remove the record for `(owner, safe)`, bumping the nonce so any
    /// outstanding pre-signature is invalidated. Returns the removed record.
    pub fn clear_record(
        &mut self,
        owner: Address,
        safe: Address,
    ) -> Result<WillRecord, RegistryError> {
        let record = self
            .wills
            .remove(&(owner, safe))
            .ok_or(RegistryError::NoWill { owner, safe })?;
        self.bump_nonce(owner, safe);
        Ok(record)
    }

    /// Current nonce for the pair. Zero means no state-changing action has
    /// ever touched it.
    pub fn nonce_of(&self, owner: &Address, safe: &Address) -> u64 {
        self.nonces.get(&(*owner, *safe)).copied().unwrap_or(0)
    }

    pub fn will_exists(&self, owner: &Address, safe: &Address) -> bool {
        self.wills.contains_key(&(*owner, *safe))
    }

    pub fn get_will(&self, owner: &Address, safe: &Address) -> Option<&WillRecord> {
        self.wills.get(&(*owner, *safe))
    }

    /// Enumerate all active records. Observability only — not part of the
    /// security-critical path.
    pub fn all_wills(&self) -> impl Iterator<Item = (&Address, &Address, &WillRecord)> {
        self.wills
            .iter()
            .map(|((owner, safe), record)| (owner, safe, record))
    }

    fn bump_nonce(&mut self, owner: Address, safe: Address) -> u64 {
        let counter = self.nonces.entry((owner, safe)).or_insert(0);
        *counter += 1;
        *counter
    }
}
