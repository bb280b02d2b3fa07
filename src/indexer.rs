//! Indexer gateway: the DAO-membership source.
//!
//! A third-party indexing service answers "which DAOs is this account a
//! member of"; that list feeds the eligibility resolver as its candidate
//! set. The service's own query semantics are not this crate's concern —
//! only a list of DAO ids is consumed.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::timeout;

use crate::chain::retry::retry_transient;
use crate::chain::AccountId;

/// Result type for indexer operations.
pub type IndexerResult<T> = Result<T, IndexerError>;

/// Indexer errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum IndexerError {
    #[error("network error: {0}")]
    Network(String),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("protocol error: {0}")]
    Protocol(String),
}

impl IndexerError {
    pub fn is_transient(&self) -> bool {
        matches!(self, IndexerError::Network(_) | IndexerError::Timeout(_))
    }
}

/// Membership lookup against an indexing service.
#[async_trait]
pub trait IndexerGateway: Send + Sync {
    /// DAOs `account` is a member of, as reported by the indexer.
    async fn dao_memberships(&self, account: &AccountId) -> IndexerResult<Vec<AccountId>>;
}

/// HTTP implementation against a REST-style indexer.
#[derive(Clone)]
pub struct HttpIndexerGateway {
    http: reqwest::Client,
    base_url: String,
    request_timeout: Duration,
}

impl HttpIndexerGateway {
    pub fn new(base_url: impl Into<String>, request_timeout: Duration) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            request_timeout,
        }
    }

    async fn get_json(&self, path: &str) -> IndexerResult<Value> {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        tracing::debug!(%url, "indexer query");

        let response = timeout(self.request_timeout, self.http.get(&url).send())
            .await
            .map_err(|_| IndexerError::Timeout(self.request_timeout))?
            .map_err(|e| IndexerError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(IndexerError::Protocol(format!(
                "indexer returned {}",
                response.status()
            )));
        }

        timeout(self.request_timeout, response.json())
            .await
            .map_err(|_| IndexerError::Timeout(self.request_timeout))?
            .map_err(|e| IndexerError::Protocol(format!("undecodable indexer response: {e}")))
    }
}

#[async_trait]
impl IndexerGateway for HttpIndexerGateway {
    async fn dao_memberships(&self, account: &AccountId) -> IndexerResult<Vec<AccountId>> {
        let path = format!("account/{account}/daos");
        let body = retry_transient(|| self.get_json(&path), IndexerError::is_transient).await?;

        // Accept either a bare array of ids or {"daos": [...]}.
        let list = body
            .as_array()
            .or_else(|| body.get("daos").and_then(Value::as_array))
            .ok_or_else(|| IndexerError::Protocol("membership response is not a list".into()))?;

        list.iter()
            .map(|v| {
                v.as_str()
                    .map(AccountId::from)
                    .ok_or_else(|| IndexerError::Protocol("non-string dao id".into()))
            })
            .collect()
    }
}

/// Mock indexer for tests.
#[derive(Clone, Default)]
pub struct MockIndexerGateway {
    memberships: Arc<Mutex<HashMap<AccountId, Vec<AccountId>>>>,
}

impl MockIndexerGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_memberships(&self, account: &AccountId, daos: Vec<AccountId>) {
        self.memberships.lock().unwrap().insert(account.clone(), daos);
    }
}

#[async_trait]
impl IndexerGateway for MockIndexerGateway {
    async fn dao_memberships(&self, account: &AccountId) -> IndexerResult<Vec<AccountId>> {
        Ok(self
            .memberships
            .lock()
            .unwrap()
            .get(account)
            .cloned()
            .unwrap_or_default())
    }
}
