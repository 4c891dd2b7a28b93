//! Facts emitted by the will module
//!
//! Every state-changing operation emits one fact carrying the full record
//! it acted on, so observers (indexers, UIs, the executor daemon) can follow
//! the lifecycle without reading module state.

use serde::{Deserialize, Serialize};
use styx_core::{Address, SealedPayload};

/// Facts emitted by the execution engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Fact {
    /// A will was created or overwritten.
    WillSet {
        safe: Address,
        owner: Address,
        heir: Address,
        tip: u128,
        timeframe: u64,
        nonce: u64,
        started_at: u64,
        /// Sealed pre-signature (`payload.hash` is the ciphertext hash).
        payload: SealedPayload,
    },

    /// The owner invalidated a will without executing it.
    AbortWill {
        safe: Address,
        owner: Address,
        heir: Address,
        tip: u128,
        timeframe: u64,
        /// Nonce the aborted record was bound to (now superseded).
        nonce: u64,
    },

    /// A will was executed: the heir took ownership, the executor was paid.
    WillExecuted {
        safe: Address,
        owner: Address,
        heir: Address,
        executor: Address,
        tip: u128,
        /// Nonce the executed signature was bound to (now superseded).
        nonce: u64,
    },
}

impl Fact {
    pub fn owner(&self) -> &Address {
        match self {
            Fact::WillSet { owner, .. }
            | Fact::AbortWill { owner, .. }
            | Fact::WillExecuted { owner, .. } => owner,
        }
    }

    pub fn safe(&self) -> &Address {
        match self {
            Fact::WillSet { safe, .. }
            | Fact::AbortWill { safe, .. }
            | Fact::WillExecuted { safe, .. } => safe,
        }
    }
}
