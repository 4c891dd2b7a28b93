//! Execution engine
//!
//! Orchestrates the three state-changing operations — create, abort,
//! execute — over the registry, the signature verifier, and the safe's
//! capability interface. Holds the escrowed tips and the ledger balances
//! they are paid out to.
//!
//! Failure is all-or-nothing: every precondition is checked before the
//! first mutation, so a failed operation leaves registry, escrow, and safe
//! untouched. The safe's owner swap is the only externally-visible mutation
//! and runs first; everything after it is infallible local bookkeeping.

use crate::events::Fact;
use crate::registry::{RegistryError, WillRecord, WillRegistry};
use crate::safe::{SafeCapability, SafeError, SENTINEL_OWNER};
use crate::verify::{SignatureVerifier, VerifyError};
use std::collections::BTreeMap;
use styx_core::{Address, SealedPayload, Signature, SigningDomain};
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum EngineError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("A tip must be attached when setting a will")]
    MissingValue,

    #[error("Module {0} is not enabled on the safe")]
    ModuleDisabled(Address),

    #[error("Will is not yet claimable: now {now}, claimable at {claimable_at}")]
    NotYetExpired { now: u64, claimable_at: u64 },

    #[error("Invalid signature: {0}")]
    InvalidSignature(#[from] VerifyError),

    #[error("{0} is not currently an owner of the safe")]
    OwnerNotOnSafe(Address),

    #[error(transparent)]
    Safe(#[from] SafeError),
}

/// The transaction context an operation runs under: who called, how much
/// value they attached, and the ledger's current timestamp.
///
/// Time enters the engine only through here — there are no ambient clock
/// reads, so every transition is deterministically replayable.
#[derive(Debug, Clone, Copy)]
pub struct TxContext {
    pub caller: Address,
    pub value: u128,
    pub now: u64,
}

impl TxContext {
    pub fn new(caller: Address, value: u128, now: u64) -> Self {
        Self { caller, value, now }
    }
}

/// Whether a will record is claimable at `now`. Pure.
pub fn is_claimable(record: &WillRecord, now: u64) -> bool {
    now >= record.claimable_at()
}

/// The deployed will module: registry state, escrow, and fact log.
#[derive(Debug)]
pub struct ExecutionEngine {
    module: Address,
    verifier: SignatureVerifier,
    registry: WillRegistry,
    /// Tips currently held by the module.
    escrow: u128,
    /// Ledger balances credited by refunds and tip payouts.
    balances: BTreeMap<Address, u128>,
    facts: Vec<Fact>,
}

impl ExecutionEngine {
    /// Create an engine for the deployment described by `domain`. The
    /// module's own address is the domain's verifying contract, so
    /// signatures are bound to exactly this deployment.
    pub fn new(domain: SigningDomain) -> Self {
        Self {
            module: domain.verifying_contract,
            verifier: SignatureVerifier::new(domain),
            registry: WillRegistry::new(),
            escrow: 0,
            balances: BTreeMap::new(),
            facts: Vec::new(),
        }
    }

    pub fn module(&self) -> &Address {
        &self.module
    }

    pub fn verifier(&self) -> &SignatureVerifier {
        &self.verifier
    }

    /// Create or overwrite the caller's will for `safe_addr`. The attached
    /// value is escrowed as the tip; an overwritten record's tip is
    /// refunded to the caller.
    pub fn set_will(
        &mut self,
        ctx: &TxContext,
        safe_addr: Address,
        safe: &impl SafeCapability,
        heir: Address,
        timeframe: u64,
        payload: SealedPayload,
    ) -> Result<(), EngineError> {
        if ctx.value == 0 {
            return Err(EngineError::MissingValue);
        }
        if !safe.is_module_enabled(&self.module) {
            return Err(EngineError::ModuleDisabled(self.module));
        }

        let (record, replaced_tip) = self.registry.set_record(
            ctx.caller,
            safe_addr,
            heir,
            ctx.value,
            timeframe,
            ctx.now,
            payload,
        )?;

        self.escrow += ctx.value;
        if let Some(tip) = replaced_tip {
            self.refund(ctx.caller, tip);
        }

        log::info!(
            "Will set: owner {} safe {} heir {} timeframe {}s nonce {}",
            ctx.caller,
            safe_addr,
            record.heir,
            record.timeframe,
            record.nonce
        );
        self.facts.push(Fact::WillSet {
            safe: safe_addr,
            owner: ctx.caller,
            heir: record.heir,
            tip: record.tip,
            timeframe: record.timeframe,
            nonce: record.nonce,
            started_at: record.started_at,
            payload: record.payload,
        });
        Ok(())
    }

    /// Invalidate the caller's will for `safe_addr` without executing it.
    /// Bumps the nonce (killing any outstanding pre-signature) and refunds
    /// the escrowed tip.
    pub fn abort_will(&mut self, ctx: &TxContext, safe_addr: Address) -> Result<(), EngineError> {
        let record = self.registry.clear_record(ctx.caller, safe_addr)?;
        self.refund(ctx.caller, record.tip);

        log::info!(
            "Will aborted: owner {} safe {} (nonce {} superseded)",
            ctx.caller,
            safe_addr,
            record.nonce
        );
        self.facts.push(Fact::AbortWill {
            safe: safe_addr,
            owner: ctx.caller,
            heir: record.heir,
            tip: record.tip,
            timeframe: record.timeframe,
            nonce: record.nonce,
        });
        Ok(())
    }

    /// Execute `owner`'s will on `safe_addr`: swap safe ownership to the
    /// heir and pay the escrowed tip to the caller, atomically.
    ///
    /// Callable by anyone holding the decrypted pre-signature — typically
    /// the heir or an automated executor.
    pub fn execute_will(
        &mut self,
        ctx: &TxContext,
        signature: &Signature,
        owner: &Address,
        safe_addr: Address,
        safe: &mut impl SafeCapability,
    ) -> Result<(), EngineError> {
        let record = self
            .registry
            .get_will(owner, &safe_addr)
            .cloned()
            .ok_or(RegistryError::NoWill {
                owner: *owner,
                safe: safe_addr,
            })?;

        if !safe.is_module_enabled(&self.module) {
            return Err(EngineError::ModuleDisabled(self.module));
        }
        if !is_claimable(&record, ctx.now) {
            return Err(EngineError::NotYetExpired {
                now: ctx.now,
                claimable_at: record.claimable_at(),
            });
        }
        self.verifier
            .verify(signature, owner, &record.heir, &safe_addr, record.nonce)?;

        let prev = predecessor_of(safe, owner).ok_or(EngineError::OwnerNotOnSafe(*owner))?;
        safe.swap_owner(&self.module, &prev, owner, &record.heir)?;

        self.escrow -= record.tip;
        self.credit(ctx.caller, record.tip);
        self.registry
            .clear_record(*owner, safe_addr)
            .expect("record was loaded above and operations are serialized");

        log::info!(
            "Will executed: owner {} -> heir {} on safe {}, tip {} paid to {}",
            owner,
            record.heir,
            safe_addr,
            record.tip,
            ctx.caller
        );
        self.facts.push(Fact::WillExecuted {
            safe: safe_addr,
            owner: *owner,
            heir: record.heir,
            executor: ctx.caller,
            tip: record.tip,
            nonce: record.nonce,
        });
        Ok(())
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    pub fn get_nonce(&self, owner: &Address, safe: &Address) -> u64 {
        self.registry.nonce_of(owner, safe)
    }

    pub fn will_exists(&self, owner: &Address, safe: &Address) -> bool {
        self.registry.will_exists(owner, safe)
    }

    pub fn get_will(&self, owner: &Address, safe: &Address) -> Option<&WillRecord> {
        self.registry.get_will(owner, safe)
    }

    pub fn all_wills(&self) -> impl Iterator<Item = (&Address, &Address, &WillRecord)> {
        self.registry.all_wills()
    }

    /// Ledger balance credited to `addr` by refunds and payouts.
    pub fn balance_of(&self, addr: &Address) -> u128 {
        self.balances.get(addr).copied().unwrap_or(0)
    }

    /// Total tips currently escrowed by the module.
    pub fn escrowed(&self) -> u128 {
        self.escrow
    }

    /// Facts emitted so far.
    pub fn facts(&self) -> &[Fact] {
        &self.facts
    }

    /// Take the accumulated facts, leaving the log empty.
    pub fn drain_facts(&mut self) -> Vec<Fact> {
        std::mem::take(&mut self.facts)
    }

    fn refund(&mut self, to: Address, amount: u128) {
        self.escrow -= amount;
        self.credit(to, amount);
    }

    fn credit(&mut self, to: Address, amount: u128) {
        *self.balances.entry(to).or_insert(0) += amount;
    }
}

/// Predecessor of `owner` in the safe's owner list, or `None` if `owner`
/// is not on the safe.
fn predecessor_of(safe: &impl SafeCapability, owner: &Address) -> Option<Address> {
    let owners = safe.owners();
    let position = owners.iter().position(|o| o == owner)?;
    Some(if position == 0 {
        SENTINEL_OWNER
    } else {
        owners[position - 1]
    })
}
