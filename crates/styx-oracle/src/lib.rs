//! Styx Liveness Oracle
//!
//! Off-chain predicate answering one question: has this owner shown no
//! activity on this safe for longer than the will's timeframe?
//!
//! The answer gates release of the owner's sealed pre-signature by the
//! decryption network. The posture is strictly fail-closed: missing
//! evidence, transport failures, malformed responses, and timeouts all
//! resolve to `false` ("not eligible") — never to an error the gate could
//! misread as permission.
//!
//! # Example
//!
//! ```ignore
//! use styx_oracle::{LivenessOracle, TransactionServiceClient};
//!
//! let client = TransactionServiceClient::new("https://safe-transaction.example.org")?;
//! let oracle = LivenessOracle::new(client);
//! let eligible = oracle.owner_inactive(&safe, &owner, timeframe_secs).await;
//! ```

pub mod gate;
pub mod history;
pub mod liveness;

pub use gate::{AccessCondition, ReturnValueTest};
pub use history::{
    Confirmation, HistoryError, HistoryTransaction, TransactionHistory, TransactionPage,
    TransactionServiceClient,
};
pub use liveness::LivenessOracle;
