//! Mock chain gateway for testing.
//!
//! Scripted responses plus a call log, so tests can assert exactly
//! which chain state was fetched while composing.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::traits::{AccountId, BlockHash, ChainError, ChainResult, ChainStateGateway, PublicKey};

/// Mock gateway with scripted chain state.
#[derive(Clone)]
pub struct MockChainGateway {
    state: Arc<Mutex<MockState>>,
}

#[derive(Default)]
struct MockState {
    block_hash: Option<BlockHash>,
    nonces: HashMap<(AccountId, PublicKey), u64>,
    /// Whether a nonce fetch bumps the stored value, imitating a chain
    /// where each composed transaction lands before the next compose.
    bump_nonce_on_fetch: bool,
    view_results: HashMap<(AccountId, String), Result<Vec<u8>, ChainError>>,
    calls: Vec<RecordedCall>,
    fail_block_hash: Option<ChainError>,
}

/// One gateway invocation, recorded for assertions.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCall {
    LatestBlockHash,
    AccessKeyNonce {
        account: AccountId,
        public_key: PublicKey,
    },
    ViewContract {
        contract: AccountId,
        method: String,
        args: Value,
    },
}

impl MockChainGateway {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState::default())),
        }
    }

    pub fn set_block_hash(&self, base58: &str) {
        let hash = BlockHash::from_base58(base58).expect("test block hash must be base58");
        self.state.lock().unwrap().block_hash = Some(hash);
    }

    pub fn fail_block_hash(&self, error: ChainError) {
        self.state.lock().unwrap().fail_block_hash = Some(error);
    }

    pub fn set_nonce(&self, account: &AccountId, public_key: &PublicKey, nonce: u64) {
        self.state
            .lock()
            .unwrap()
            .nonces
            .insert((account.clone(), public_key.clone()), nonce);
    }

    /// Make each nonce fetch return a strictly larger value, as a live
    /// chain would once prior transactions are broadcast.
    pub fn bump_nonce_on_fetch(&self) {
        self.state.lock().unwrap().bump_nonce_on_fetch = true;
    }

    /// Script a view call to return `value` serialized as JSON bytes.
    pub fn set_view_result(&self, contract: &AccountId, method: &str, value: Value) {
        let bytes = serde_json::to_vec(&value).expect("test view result must serialize");
        self.state
            .lock()
            .unwrap()
            .view_results
            .insert((contract.clone(), method.to_string()), Ok(bytes));
    }

    /// Script a view call to return raw bytes (e.g. non-JSON garbage).
    pub fn set_view_bytes(&self, contract: &AccountId, method: &str, bytes: Vec<u8>) {
        self.state
            .lock()
            .unwrap()
            .view_results
            .insert((contract.clone(), method.to_string()), Ok(bytes));
    }

    /// Script a view call to fail.
    pub fn fail_view(&self, contract: &AccountId, method: &str, error: ChainError) {
        self.state
            .lock()
            .unwrap()
            .view_results
            .insert((contract.clone(), method.to_string()), Err(error));
    }

    /// Calls recorded so far, in order.
    pub fn recorded_calls(&self) -> Vec<RecordedCall> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Number of recorded view calls for `method` on `contract`.
    pub fn view_call_count(&self, contract: &AccountId, method: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|c| {
                matches!(c, RecordedCall::ViewContract { contract: c2, method: m, .. }
                    if c2 == contract && m == method)
            })
            .count()
    }
}

impl Default for MockChainGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChainStateGateway for MockChainGateway {
    async fn latest_block_hash(&self) -> ChainResult<BlockHash> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(RecordedCall::LatestBlockHash);
        if let Some(err) = &state.fail_block_hash {
            return Err(err.clone());
        }
        state
            .block_hash
            .clone()
            .ok_or_else(|| ChainError::Protocol("mock: no block hash scripted".into()))
    }

    async fn access_key_nonce(
        &self,
        account: &AccountId,
        public_key: &PublicKey,
    ) -> ChainResult<u64> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(RecordedCall::AccessKeyNonce {
            account: account.clone(),
            public_key: public_key.clone(),
        });
        let bump = state.bump_nonce_on_fetch;
        let entry = state
            .nonces
            .get_mut(&(account.clone(), public_key.clone()))
            .ok_or_else(|| ChainError::Protocol(format!("mock: no nonce for {account}")))?;
        let nonce = *entry;
        if bump {
            *entry += 1;
        }
        Ok(nonce)
    }

    async fn view_contract(
        &self,
        contract: &AccountId,
        method: &str,
        args: &Value,
    ) -> ChainResult<Vec<u8>> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(RecordedCall::ViewContract {
            contract: contract.clone(),
            method: method.to_string(),
            args: args.clone(),
        });
        match state.view_results.get(&(contract.clone(), method.to_string())) {
            Some(Ok(bytes)) => Ok(bytes.clone()),
            Some(Err(err)) => Err(err.clone()),
            None => Err(ChainError::Rpc {
                code: -32000,
                message: format!("mock: no view result scripted for {method} on {contract}"),
            }),
        }
    }
}
