//! Styx Will Module
//!
//! The will lifecycle state machine for a multi-party safe, and the engine
//! that executes it.
//!
//! # Lifecycle
//!
//! ```text
//! NoWill --set_will--> WillSet --(timeframe elapses)--> still WillSet, claimable
//!                        |  \
//!            abort_will  |   \  execute_will (valid signature + enabled module)
//!                        v    v
//!                     NoWill  Executed (heir owns the safe, caller paid the tip)
//! ```
//!
//! Every state-changing action bumps the per-`(owner, safe)` nonce, which is
//! the sole replay-protection primitive: a pre-signature is only ever valid
//! against the nonce in effect when it was produced.
//!
//! Operations run as serialized transactions over `&mut` state. All
//! preconditions are checked before any mutation, so a failed operation
//! leaves no partial state behind.

pub mod engine;
pub mod events;
pub mod registry;
pub mod safe;
pub mod verify;

pub use engine::{is_claimable, EngineError, ExecutionEngine, TxContext};
pub use events::Fact;
pub use registry::{RegistryError, WillRecord, WillRegistry};
pub use safe::{LocalSafe, SafeCapability, SafeError, SENTINEL_OWNER};
pub use verify::{SignatureVerifier, VerifyError};
