//! Core error types.
//!
//! Each variant names the dependency that failed, so a caller can tell
//! "bad input" (`InvalidAmount`, `UnknownToken`) from "upstream
//! unavailable" (`ChainQueryFailed`, `PolicyUnavailable`). Input errors
//! surface immediately; upstream errors have already been through the
//! gateway's single transient retry by the time they reach a caller.

use crate::chain::{AccountId, ChainError};

/// Result type for composition and resolution operations.
pub type TxResult<T> = Result<T, TxError>;

#[derive(Debug, Clone, thiserror::Error)]
pub enum TxError {
    /// The quantity string is not a non-negative decimal, or overflows
    /// u128 once scaled to minor units.
    #[error("invalid amount {quantity:?}: {reason}")]
    InvalidAmount { quantity: String, reason: String },

    /// The DAO's `get_policy` view call failed or did not parse as an
    /// access policy.
    #[error("policy unavailable for {dao}: {reason}")]
    PolicyUnavailable { dao: AccountId, reason: String },

    /// Nonce, block-hash, or metadata fetch failed (including timeout).
    #[error("chain query failed: {0}")]
    ChainQueryFailed(#[from] ChainError),

    /// Metadata fetch for a non-native token failed at the transport
    /// level, so no decimals could be determined.
    #[error("unknown token {token}: decimals could not be determined ({reason})")]
    UnknownToken { token: AccountId, reason: ChainError },
}

impl TxError {
    pub fn invalid_amount(quantity: &str, reason: impl Into<String>) -> Self {
        Self::InvalidAmount {
            quantity: quantity.to_string(),
            reason: reason.into(),
        }
    }

    pub fn policy_unavailable(dao: &AccountId, reason: impl Into<String>) -> Self {
        Self::PolicyUnavailable {
            dao: dao.clone(),
            reason: reason.into(),
        }
    }
}
