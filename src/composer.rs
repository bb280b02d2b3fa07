//! Transaction composition.
//!
//! The composer is the top-level entry point: it resolves the amount
//! and deposit (transfer proposals only), fetches the chain tip state
//! (nonce + block hash, concurrently), builds the single function-call
//! action, and assembles the unsigned envelope. It never signs, never
//! broadcasts, and returns no partial transaction on failure.

use serde_json::json;

use crate::amount;
use crate::chain::{AccountId, BlockHash, ChainStateGateway, PublicKey};
use crate::config::ComposerConfig;
use crate::error::{TxError, TxResult};
use crate::policy::PolicyResolver;
use crate::tx::{FunctionCallAction, ProposalAction, TokenAmount, Transaction, VoteAction};

/// Chain tip state a transaction envelope depends on.
struct ChainTip {
    nonce: u64,
    block_hash: BlockHash,
}

/// Composes unsigned DAO transactions against a chain gateway.
pub struct Composer<'a> {
    gateway: &'a dyn ChainStateGateway,
    config: ComposerConfig,
}

impl<'a> Composer<'a> {
    pub fn new(gateway: &'a dyn ChainStateGateway, config: ComposerConfig) -> Self {
        Self { gateway, config }
    }

    /// Compose an `add_proposal` transaction proposing a transfer of
    /// `quantity` (display units) of `token_id` to `receiver`.
    ///
    /// The deposit is the DAO's current proposal bond, resolved live.
    /// Amount/deposit resolution and the tip-state fetch have no mutual
    /// ordering dependency and run in parallel.
    pub async fn compose_transfer_proposal(
        &self,
        signer: &AccountId,
        public_key: &PublicKey,
        dao: &AccountId,
        receiver: &AccountId,
        quantity: &str,
        token_id: &AccountId,
    ) -> TxResult<Transaction> {
        let dependencies = async {
            let policy = PolicyResolver::new(self.gateway);
            let (decimals, deposit) = tokio::try_join!(
                self.resolve_token_decimals(token_id),
                policy.resolve_proposal_bond(dao, &self.config),
            )?;
            let amount = amount::normalize(quantity, decimals)?;
            Ok::<_, TxError>((amount, deposit))
        };

        let ((amount, deposit), tip) = tokio::try_join!(dependencies, self.fetch_tip(signer, public_key))?;

        let action = ProposalAction::Transfer {
            token_id: token_id.clone(),
            receiver_id: receiver.clone(),
            amount,
        };

        tracing::debug!(
            signer = %signer, dao = %dao, receiver = %receiver,
            deposit = %deposit, "composing transfer proposal"
        );

        Ok(self.assemble(signer, public_key, dao, tip, self.build_action(&action, deposit)))
    }

    /// Compose an `act_proposal` transaction voting on `proposal_id`.
    ///
    /// No normalization or policy fetch is needed; the deposit is zero.
    pub async fn compose_vote(
        &self,
        signer: &AccountId,
        public_key: &PublicKey,
        dao: &AccountId,
        proposal_id: u64,
        vote: VoteAction,
    ) -> TxResult<Transaction> {
        let tip = self.fetch_tip(signer, public_key).await?;

        let action = ProposalAction::Vote {
            proposal_id,
            action: vote,
        };

        tracing::debug!(signer = %signer, dao = %dao, proposal_id, "composing vote");

        Ok(self.assemble(signer, public_key, dao, tip, self.build_action(&action, TokenAmount::zero())))
    }

    /// Decimals to scale a transfer quantity by.
    ///
    /// Native transfers use the fixed protocol constant unconditionally
    /// and never issue a metadata call. Non-native tokens are asked for
    /// `ft_metadata`; a response without a usable `decimals` field
    /// falls back to the native constant, while a transport-level
    /// failure surfaces as `UnknownToken` — guessing decimals for a
    /// token we could not reach risks a mis-scaled transfer.
    async fn resolve_token_decimals(&self, token_id: &AccountId) -> TxResult<u8> {
        if token_id.is_native_token() {
            return Ok(self.config.native_decimals);
        }

        match self
            .gateway
            .view_contract(token_id, "ft_metadata", &json!({}))
            .await
        {
            Ok(bytes) => {
                let decimals = serde_json::from_slice::<serde_json::Value>(&bytes)
                    .ok()
                    .and_then(|v| v.get("decimals")?.as_u64())
                    .and_then(|d| u8::try_from(d).ok());
                match decimals {
                    Some(d) => Ok(d),
                    None => {
                        tracing::warn!(
                            token = %token_id,
                            "ft_metadata carried no usable decimals, assuming native scale"
                        );
                        Ok(self.config.native_decimals)
                    }
                }
            }
            Err(e) if e.is_transient() => Err(TxError::UnknownToken {
                token: token_id.clone(),
                reason: e,
            }),
            Err(e) => {
                // Contract-level failure (no ft_metadata method, rpc
                // error object): inherited fallback behavior.
                tracing::warn!(token = %token_id, error = %e, "ft_metadata call failed, assuming native scale");
                Ok(self.config.native_decimals)
            }
        }
    }

    /// Fetch block hash and access-key nonce, concurrently. The nonce
    /// is always live for this `(signer, public_key)` pair; nothing is
    /// cached across calls.
    async fn fetch_tip(&self, signer: &AccountId, public_key: &PublicKey) -> TxResult<ChainTip> {
        let (block_hash, nonce) = tokio::try_join!(
            self.gateway.latest_block_hash(),
            self.gateway.access_key_nonce(signer, public_key),
        )?;
        Ok(ChainTip { nonce, block_hash })
    }

    /// Map a proposal action onto the DAO contract's call surface.
    fn build_action(&self, action: &ProposalAction, deposit: TokenAmount) -> FunctionCallAction {
        match action {
            ProposalAction::Transfer {
                token_id,
                receiver_id,
                amount,
            } => {
                let args = json!({
                    "proposal": {
                        "description": format!("Transfer to {receiver_id}."),
                        "kind": {
                            "Transfer": {
                                "token_id": token_id,
                                "receiver_id": receiver_id,
                                "amount": amount,
                            }
                        }
                    }
                });
                FunctionCallAction {
                    method_name: "add_proposal".to_string(),
                    args: serde_json::to_vec(&args).expect("static json shape"),
                    gas: self.config.gas_add_proposal,
                    deposit,
                }
            }
            ProposalAction::Vote {
                proposal_id,
                action,
            } => {
                let args = json!({ "id": proposal_id, "action": action });
                FunctionCallAction {
                    method_name: "act_proposal".to_string(),
                    args: serde_json::to_vec(&args).expect("static json shape"),
                    gas: self.config.gas_act_proposal,
                    deposit,
                }
            }
        }
    }

    fn assemble(
        &self,
        signer: &AccountId,
        public_key: &PublicKey,
        dao: &AccountId,
        tip: ChainTip,
        action: FunctionCallAction,
    ) -> Transaction {
        Transaction {
            signer_id: signer.clone(),
            public_key: public_key.clone(),
            receiver_id: dao.clone(),
            nonce: tip.nonce,
            actions: vec![action],
            block_hash: tip.block_hash,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::{ChainError, MockChainGateway};
    use serde_json::json;
    use std::time::Duration;

    const BLOCK_HASH: &str = "EkRm2UwZ6LSGyGrpcQ8jTLnFaBJsQ8qcUJbWUM5dE5NS";

    fn fixture() -> (MockChainGateway, AccountId, PublicKey, AccountId) {
        let mock = MockChainGateway::new();
        let signer = AccountId::from("alice.test");
        let key = PublicKey::new("ed25519:6E8sCci9badyRkXb3JoRpBj5p8C6Tw41ELDZoiihKEtp");
        let dao = AccountId::from("dao1.test");
        mock.set_block_hash(BLOCK_HASH);
        mock.set_nonce(&signer, &key, 41);
        (mock, signer, key, dao)
    }

    #[tokio::test]
    async fn native_transfer_uses_bond_and_fixed_gas() {
        let (mock, signer, key, dao) = fixture();
        mock.set_view_result(
            &dao,
            "get_policy",
            json!({"proposal_bond": "300000000000000000000000", "roles": []}),
        );

        let composer = Composer::new(&mock, ComposerConfig::default());
        let tx = composer
            .compose_transfer_proposal(
                &signer,
                &key,
                &dao,
                &AccountId::from("bob.test"),
                "1",
                &AccountId::native_token(),
            )
            .await
            .unwrap();

        assert_eq!(tx.signer_id, signer);
        assert_eq!(tx.receiver_id, dao);
        assert_eq!(tx.nonce, 41);
        assert_eq!(tx.block_hash.to_string(), BLOCK_HASH);
        assert_eq!(tx.actions.len(), 1);

        let action = &tx.actions[0];
        assert_eq!(action.method_name, "add_proposal");
        assert_eq!(action.gas, 200_000_000_000_000);
        assert_eq!(action.deposit.as_str(), "300000000000000000000000");

        let args = action.args_json().unwrap();
        assert_eq!(
            args.pointer("/proposal/kind/Transfer/amount").unwrap(),
            "1000000000000000000000000"
        );
        assert_eq!(args.pointer("/proposal/kind/Transfer/receiver_id").unwrap(), "bob.test");
        assert_eq!(args.pointer("/proposal/kind/Transfer/token_id").unwrap(), "");
    }

    #[tokio::test]
    async fn native_transfer_never_queries_metadata() {
        let (mock, signer, key, dao) = fixture();
        mock.set_view_result(&dao, "get_policy", json!({"roles": []}));

        let composer = Composer::new(&mock, ComposerConfig::default());
        composer
            .compose_transfer_proposal(
                &signer,
                &key,
                &dao,
                &AccountId::from("bob.test"),
                "2.5",
                &AccountId::native_token(),
            )
            .await
            .unwrap();

        for call in mock.recorded_calls() {
            if let crate::chain::mock::RecordedCall::ViewContract { method, .. } = call {
                assert_eq!(method, "get_policy");
            }
        }
    }

    #[tokio::test]
    async fn missing_bond_field_uses_documented_default() {
        let (mock, signer, key, dao) = fixture();
        mock.set_view_result(&dao, "get_policy", json!({"roles": []}));

        let composer = Composer::new(&mock, ComposerConfig::default());
        let tx = composer
            .compose_transfer_proposal(
                &signer,
                &key,
                &dao,
                &AccountId::from("bob.test"),
                "1",
                &AccountId::native_token(),
            )
            .await
            .unwrap();

        assert_eq!(tx.actions[0].deposit.as_str(), "100000000000000000000000");
    }

    #[tokio::test]
    async fn token_transfer_uses_metadata_decimals() {
        let (mock, signer, key, dao) = fixture();
        let token = AccountId::from("usdc.test");
        mock.set_view_result(&dao, "get_policy", json!({"roles": []}));
        mock.set_view_result(
            &token,
            "ft_metadata",
            json!({"spec": "ft-1.0.0", "symbol": "USDC", "decimals": 6}),
        );

        let composer = Composer::new(&mock, ComposerConfig::default());
        let tx = composer
            .compose_transfer_proposal(&signer, &key, &dao, &AccountId::from("bob.test"), "12.5", &token)
            .await
            .unwrap();

        let args = tx.actions[0].args_json().unwrap();
        assert_eq!(args.pointer("/proposal/kind/Transfer/amount").unwrap(), "12500000");
        assert_eq!(args.pointer("/proposal/kind/Transfer/token_id").unwrap(), "usdc.test");
    }

    #[tokio::test]
    async fn metadata_without_decimals_falls_back_to_native_scale() {
        let (mock, signer, key, dao) = fixture();
        let token = AccountId::from("odd.test");
        mock.set_view_result(&dao, "get_policy", json!({"roles": []}));
        mock.set_view_result(&token, "ft_metadata", json!({"symbol": "ODD"}));

        let composer = Composer::new(&mock, ComposerConfig::default());
        let tx = composer
            .compose_transfer_proposal(&signer, &key, &dao, &AccountId::from("bob.test"), "1", &token)
            .await
            .unwrap();

        let args = tx.actions[0].args_json().unwrap();
        assert_eq!(
            args.pointer("/proposal/kind/Transfer/amount").unwrap(),
            "1000000000000000000000000"
        );
    }

    #[tokio::test]
    async fn unreachable_token_metadata_is_unknown_token() {
        let (mock, signer, key, dao) = fixture();
        let token = AccountId::from("gone.test");
        mock.set_view_result(&dao, "get_policy", json!({"roles": []}));
        mock.fail_view(&token, "ft_metadata", ChainError::Timeout(Duration::from_secs(10)));

        let composer = Composer::new(&mock, ComposerConfig::default());
        let err = composer
            .compose_transfer_proposal(&signer, &key, &dao, &AccountId::from("bob.test"), "1", &token)
            .await
            .unwrap_err();

        assert!(matches!(err, TxError::UnknownToken { .. }));
    }

    #[tokio::test]
    async fn invalid_quantity_is_surfaced_as_invalid_amount() {
        let (mock, signer, key, dao) = fixture();
        mock.set_view_result(&dao, "get_policy", json!({"roles": []}));

        let composer = Composer::new(&mock, ComposerConfig::default());
        let err = composer
            .compose_transfer_proposal(
                &signer,
                &key,
                &dao,
                &AccountId::from("bob.test"),
                "-1",
                &AccountId::native_token(),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, TxError::InvalidAmount { .. }));
    }

    #[tokio::test]
    async fn vote_compose_matches_contract_surface() {
        let (mock, signer, key, dao) = fixture();

        let composer = Composer::new(&mock, ComposerConfig::default());
        let tx = composer
            .compose_vote(&signer, &key, &dao, 42, VoteAction::VoteApprove)
            .await
            .unwrap();

        let action = &tx.actions[0];
        assert_eq!(action.method_name, "act_proposal");
        assert_eq!(action.gas, 300_000_000_000_000);
        assert_eq!(action.deposit.as_str(), "0");
        assert_eq!(
            action.args_json().unwrap(),
            json!({"id": 42, "action": "VoteApprove"})
        );
        // Votes need no policy or metadata view calls.
        assert_eq!(mock.view_call_count(&dao, "get_policy"), 0);
    }

    #[tokio::test]
    async fn compose_is_stable_except_for_nonce() {
        let (mock, signer, key, dao) = fixture();
        mock.bump_nonce_on_fetch();

        let composer = Composer::new(&mock, ComposerConfig::default());
        let first = composer
            .compose_vote(&signer, &key, &dao, 7, VoteAction::VoteReject)
            .await
            .unwrap();
        let second = composer
            .compose_vote(&signer, &key, &dao, 7, VoteAction::VoteReject)
            .await
            .unwrap();

        assert!(second.nonce > first.nonce);
        assert_eq!(first.actions, second.actions);
        assert_eq!(first.block_hash, second.block_hash);
        assert_eq!(first.signer_id, second.signer_id);
    }

    #[tokio::test]
    async fn tip_failure_yields_no_partial_transaction() {
        let (mock, signer, key, dao) = fixture();
        mock.fail_block_hash(ChainError::Network("rpc down".into()));

        let composer = Composer::new(&mock, ComposerConfig::default());
        let err = composer
            .compose_vote(&signer, &key, &dao, 1, VoteAction::VoteApprove)
            .await
            .unwrap_err();

        assert!(matches!(err, TxError::ChainQueryFailed(_)));
    }

    #[tokio::test]
    async fn nonce_is_fetched_for_the_exact_key_pair() {
        let (mock, signer, key, dao) = fixture();

        let composer = Composer::new(&mock, ComposerConfig::default());
        composer
            .compose_vote(&signer, &key, &dao, 3, VoteAction::VoteRemove)
            .await
            .unwrap();

        let fetched = mock.recorded_calls().into_iter().any(|c| {
            matches!(c, crate::chain::mock::RecordedCall::AccessKeyNonce { account, public_key }
                if account == signer && public_key == key)
        });
        assert!(fetched);
    }
}
