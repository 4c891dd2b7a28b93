//! Transaction-history service client
//!
//! Thin typed wrapper over the safe transaction service's paginated
//! `all-transactions` endpoint. The service returns pages of transactions,
//! each carrying the confirmations safe owners have submitted; the `next`
//! field is an opaque cursor URL for the following page.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use styx_core::Address;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HistoryError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Non-success response: HTTP {0}")]
    Status(u16),

    #[error("Malformed response body: {0}")]
    Decode(String),
}

/// One owner's confirmation on a safe transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Confirmation {
    /// Confirming owner address, as rendered by the service (any casing).
    pub owner: String,
    /// When the confirmation was submitted.
    pub submission_date: DateTime<Utc>,
}

/// A transaction entry. Only confirmations matter to the oracle; all other
/// fields are ignored on decode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryTransaction {
    #[serde(default)]
    pub confirmations: Option<Vec<Confirmation>>,
}

/// One page of the paginated history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionPage {
    #[serde(default)]
    pub results: Vec<HistoryTransaction>,
    /// Cursor URL of the next page; `None` when pages are exhausted.
    #[serde(default)]
    pub next: Option<String>,
}

/// A source of paginated transaction history for a safe.
///
/// `cursor` is `None` for the first page, otherwise the `next` value of the
/// previous page. Implementations must serve pages strictly in cursor
/// order; the oracle never skips or reorders them.
#[async_trait]
pub trait TransactionHistory {
    async fn fetch_page(
        &self,
        safe: &Address,
        cursor: Option<&str>,
    ) -> Result<TransactionPage, HistoryError>;
}

/// HTTP client for the safe transaction service.
#[derive(Debug, Clone)]
pub struct TransactionServiceClient {
    http: reqwest::Client,
    base_url: String,
}

impl TransactionServiceClient {
    /// Create a client for the service at `base_url` (no trailing slash).
    pub fn new(base_url: impl Into<String>) -> Result<Self, HistoryError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| HistoryError::Transport(e.to_string()))?;
        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }

    /// URL of the first page for `safe`.
    pub fn first_page_url(&self, safe: &Address) -> String {
        format!(
            "{}/api/v1/safes/{}/all-transactions/",
            self.base_url.trim_end_matches('/'),
            safe
        )
    }
}

#[async_trait]
impl TransactionHistory for TransactionServiceClient {
    async fn fetch_page(
        &self,
        safe: &Address,
        cursor: Option<&str>,
    ) -> Result<TransactionPage, HistoryError> {
        let url = match cursor {
            Some(next) => next.to_string(),
            None => self.first_page_url(safe),
        };

        log::debug!("Fetching history page: {}", url);
        let response = self
            .http
            .get(&url)
            .header("accept", "application/json")
            .send()
            .await
            .map_err(|e| HistoryError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(HistoryError::Status(response.status().as_u16()));
        }

        response
            .json::<TransactionPage>()
            .await
            .map_err(|e| HistoryError::Decode(e.to_string()))
    }
}
