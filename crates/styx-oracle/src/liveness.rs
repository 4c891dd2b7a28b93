//! Liveness predicate
//!
//! Decides whether an owner has been inactive on a safe for longer than a
//! threshold, by scanning the safe's transaction history for the owner's
//! confirmations.
//!
//! The first confirmation matching the owner decides the answer and stops
//! the scan — no further confirmations or pages are examined. Whether that
//! confirmation is the owner's *most recent* activity therefore depends on
//! the service returning newest-first traversal order; the behavior is
//! deliberately kept as-is, because changing it would change which parties
//! can successfully claim inheritance.
//!
//! Everything else resolves to `false`: no matching confirmation in any
//! page, a non-success response, a transport or decode failure, a timeout.
//! A transient network failure is indistinguishable from "not yet
//! eligible" — that is the fail-closed posture, and no retries are layered
//! on top of it.

use crate::history::TransactionHistory;
use chrono::{DateTime, Utc};
use std::time::Duration;
use styx_core::Address;

/// Default wall-clock budget for a full predicate evaluation.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// The liveness oracle over some history source.
///
/// Holds no mutable state — independent `(safe, owner)` queries may run
/// concurrently on the same oracle.
#[derive(Debug, Clone)]
pub struct LivenessOracle<H> {
    history: H,
    timeout: Duration,
}

impl<H: TransactionHistory> LivenessOracle<H> {
    pub fn new(history: H) -> Self {
        Self {
            history,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(history: H, timeout: Duration) -> Self {
        Self { history, timeout }
    }

    /// The predicate: has `owner` been inactive on `safe` for more than
    /// `threshold_secs`? Evaluated against the current wall clock, bounded
    /// by the oracle's timeout. Never errors; never blocks indefinitely.
    pub async fn owner_inactive(&self, safe: &Address, owner: &Address, threshold_secs: u64) -> bool {
        match tokio::time::timeout(
            self.timeout,
            self.owner_inactive_at(safe, owner, threshold_secs, Utc::now()),
        )
        .await
        {
            Ok(answer) => answer,
            Err(_) => {
                log::warn!(
                    "Liveness check for owner {} on safe {} timed out after {:?}; failing closed",
                    owner,
                    safe,
                    self.timeout
                );
                false
            }
        }
    }

    /// Same scan with an explicit `now`, deterministic for identical
    /// service responses. No timeout is applied here.
    pub async fn owner_inactive_at(
        &self,
        safe: &Address,
        owner: &Address,
        threshold_secs: u64,
        now: DateTime<Utc>,
    ) -> bool {
        let owner_str = owner.to_string();
        let mut cursor: Option<String> = None;

        loop {
            let page = match self.history.fetch_page(safe, cursor.as_deref()).await {
                Ok(page) => page,
                Err(e) => {
                    log::warn!(
                        "History fetch for safe {} failed ({}); failing closed",
                        safe,
                        e
                    );
                    return false;
                }
            };

            for transaction in &page.results {
                let Some(confirmations) = &transaction.confirmations else {
                    continue;
                };
                for confirmation in confirmations {
                    if confirmation.owner.eq_ignore_ascii_case(&owner_str) {
                        // First match decides; stop scanning.
                        let elapsed = now.signed_duration_since(confirmation.submission_date);
                        return match i64::try_from(threshold_secs) {
                            Ok(threshold) => elapsed.num_seconds() > threshold,
                            Err(_) => false,
                        };
                    }
                }
            }

            match page.next {
                Some(next) => cursor = Some(next),
                None => {
                    log::debug!(
                        "No confirmation from owner {} found on safe {}; failing closed",
                        owner,
                        safe
                    );
                    return false;
                }
            }
        }
    }
}
