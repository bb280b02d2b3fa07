//! Chain RPC trait abstractions.
//!
//! These traits enable full test coverage via MockChainGateway: every
//! component that touches the chain does so through `ChainStateGateway`,
//! so tests never need a live RPC endpoint.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// On-chain account identifier.
///
/// Opaque and case-sensitive; the core performs no validation beyond
/// passing it through. The empty string is reserved for the native
/// token in transfer proposals.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(pub String);

impl AccountId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The empty token id, denoting the chain's native asset.
    pub fn native_token() -> Self {
        Self(String::new())
    }

    pub fn is_native_token(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AccountId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Public key of a signing access key, passed through unmodified.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PublicKey(pub String);

impl PublicKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A block hash, held as raw bytes.
///
/// The RPC endpoint reports hashes base58-encoded; a downstream
/// signer/broadcaster depends on the exact encoding, so the wire form
/// is reproduced verbatim on serialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockHash(pub Vec<u8>);

impl BlockHash {
    /// Decode from the base58 string form reported by `status`.
    pub fn from_base58(s: &str) -> Result<Self, ChainError> {
        let bytes = bs58::decode(s)
            .into_vec()
            .map_err(|e| ChainError::Protocol(format!("invalid base58 block hash: {e}")))?;
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for BlockHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&bs58::encode(&self.0).into_string())
    }
}

impl Serialize for BlockHash {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&bs58::encode(&self.0).into_string())
    }
}

impl<'de> Deserialize<'de> for BlockHash {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_base58(&s).map_err(serde::de::Error::custom)
    }
}

/// Result type for chain operations.
pub type ChainResult<T> = Result<T, ChainError>;

/// Chain RPC errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ChainError {
    /// Transport-level failure (connection refused, DNS, TLS).
    #[error("network error: {0}")]
    Network(String),

    /// The call did not complete within the configured deadline.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// The endpoint answered, but not with the shape we expect.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// JSON-RPC error object returned by the endpoint.
    #[error("rpc error {code}: {message}")]
    Rpc { code: i64, message: String },
}

impl ChainError {
    /// Transient errors are worth one retry; protocol-level errors are not.
    pub fn is_transient(&self) -> bool {
        matches!(self, ChainError::Network(_) | ChainError::Timeout(_))
    }
}

/// Read-only view of chain state needed to compose a transaction.
///
/// Implementations must be reentrant: concurrent composers share one
/// gateway and never coordinate.
#[async_trait]
pub trait ChainStateGateway: Send + Sync {
    /// Hash of the latest block, for replay protection.
    async fn latest_block_hash(&self) -> ChainResult<BlockHash>;

    /// Current nonce of the `(account, public_key)` access key.
    async fn access_key_nonce(&self, account: &AccountId, public_key: &PublicKey)
        -> ChainResult<u64>;

    /// Call a view method on a contract. Returns the raw result bytes
    /// (UTF-8 JSON for every method this crate consumes).
    async fn view_contract(
        &self,
        contract: &AccountId,
        method: &str,
        args: &serde_json::Value,
    ) -> ChainResult<Vec<u8>>;
}
