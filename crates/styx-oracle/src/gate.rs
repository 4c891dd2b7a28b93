//! Access-gate condition binding
//!
//! The decryption network is external; the core's only contract with it is
//! to express, at sealing time, the standing predicate "release this
//! payload iff the liveness oracle answers `true` for (safe, owner,
//! threshold)". [`AccessCondition`] is that predicate in serialized form,
//! re-evaluated by the network at each decryption request.

use serde::{Deserialize, Serialize};
use styx_core::Address;

/// Method name the network invokes: the liveness predicate.
pub const LIVENESS_METHOD: &str = "ownerInactive";

/// A standing decryption condition bound to a sealed payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessCondition {
    /// Predicate method the gate evaluates.
    pub method: String,
    /// Arguments: safe address, owner address, threshold seconds.
    pub parameters: Vec<String>,
    /// Expected result for release to proceed.
    pub return_value_test: ReturnValueTest,
}

/// Comparison applied to the predicate's result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnValueTest {
    pub comparator: String,
    pub value: String,
}

impl AccessCondition {
    /// Bind the liveness predicate for `(safe, owner, threshold_secs)`.
    pub fn liveness(safe: &Address, owner: &Address, threshold_secs: u64) -> Self {
        Self {
            method: LIVENESS_METHOD.to_string(),
            parameters: vec![
                safe.to_string(),
                owner.to_string(),
                threshold_secs.to_string(),
            ],
            return_value_test: ReturnValueTest {
                comparator: "=".to_string(),
                value: "true".to_string(),
            },
        }
    }
}
