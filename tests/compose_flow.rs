//! Integration test for end-to-end transaction composition.
//!
//! Drives the public API against the mock chain gateway:
//! 1. Script policy, metadata, nonce, and block hash
//! 2. Compose a transfer proposal and a vote
//! 3. Assert the serialized envelope matches the contract wire surface

use serde_json::json;

use daotx::chain::MockChainGateway;
use daotx::{AccountId, Composer, ComposerConfig, PublicKey, TxError, VoteAction};

const BLOCK_HASH: &str = "EkRm2UwZ6LSGyGrpcQ8jTLnFaBJsQ8qcUJbWUM5dE5NS";

fn scripted_gateway() -> (MockChainGateway, AccountId, PublicKey) {
    let mock = MockChainGateway::new();
    let signer = AccountId::from("alice.test");
    let key = PublicKey::new("ed25519:6E8sCci9badyRkXb3JoRpBj5p8C6Tw41ELDZoiihKEtp");
    mock.set_block_hash(BLOCK_HASH);
    mock.set_nonce(&signer, &key, 100);
    (mock, signer, key)
}

#[tokio::test]
async fn transfer_proposal_end_to_end() {
    let (mock, signer, key) = scripted_gateway();
    let dao = AccountId::from("dao1.test");
    mock.set_view_result(
        &dao,
        "get_policy",
        json!({
            "proposal_bond": "100000000000000000000000",
            "roles": [
                {"name": "council", "kind": {"Group": ["alice.test"]}, "permissions": ["*:VoteApprove"]}
            ]
        }),
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
        .expect("compose should succeed");

    // Envelope
    assert_eq!(tx.signer_id.as_str(), "alice.test");
    assert_eq!(tx.receiver_id.as_str(), "dao1.test");
    assert_eq!(tx.nonce, 100);
    assert_eq!(tx.actions.len(), 1);

    // Wire form: args base64, block hash base58
    let wire = serde_json::to_value(&tx).unwrap();
    assert_eq!(wire["block_hash"], BLOCK_HASH);
    assert!(wire["actions"][0]["args"].is_string());

    // Action surface
    let action = &tx.actions[0];
    assert_eq!(action.method_name, "add_proposal");
    assert_eq!(action.gas, 200_000_000_000_000);
    assert_eq!(action.deposit.as_str(), "100000000000000000000000");

    let args = action.args_json().unwrap();
    assert_eq!(
        args["proposal"]["kind"]["Transfer"],
        json!({
            "token_id": "",
            "receiver_id": "bob.test",
            "amount": "1000000000000000000000000",
        })
    );
    assert!(args["proposal"]["description"].as_str().unwrap().contains("bob.test"));

    // Exactly one nonce fetch, one block-hash fetch, one policy fetch.
    let calls = mock.recorded_calls();
    assert_eq!(
        calls
            .iter()
            .filter(|c| matches!(c, daotx::chain::mock::RecordedCall::LatestBlockHash))
            .count(),
        1
    );
    assert_eq!(
        calls
            .iter()
            .filter(|c| matches!(c, daotx::chain::mock::RecordedCall::AccessKeyNonce { .. }))
            .count(),
        1
    );
    assert_eq!(mock.view_call_count(&dao, "get_policy"), 1);
}

#[tokio::test]
async fn vote_end_to_end() {
    let (mock, signer, key) = scripted_gateway();
    let dao = AccountId::from("dao1.test");

    let composer = Composer::new(&mock, ComposerConfig::default());
    let tx = composer
        .compose_vote(&signer, &key, &dao, 42, VoteAction::VoteApprove)
        .await
        .expect("compose should succeed");

    let action = &tx.actions[0];
    assert_eq!(action.method_name, "act_proposal");
    assert_eq!(action.gas, 300_000_000_000_000);
    assert_eq!(action.deposit.as_str(), "0");
    assert_eq!(action.args_json().unwrap(), json!({"id": 42, "action": "VoteApprove"}));
}

#[tokio::test]
async fn policy_failure_aborts_transfer_composition() {
    let (mock, signer, key) = scripted_gateway();
    let dao = AccountId::from("dao1.test");
    // get_policy left unscripted: the mock answers with an rpc error.

    let composer = Composer::new(&mock, ComposerConfig::default());
    let err = composer
        .compose_transfer_proposal(
            &signer,
            &key,
            &dao,
            &AccountId::from("bob.test"),
            "1",
            &AccountId::native_token(),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, TxError::PolicyUnavailable { .. }));
}

#[tokio::test]
async fn repeated_compose_differs_only_in_nonce() {
    let (mock, signer, key) = scripted_gateway();
    let dao = AccountId::from("dao1.test");
    mock.set_view_result(&dao, "get_policy", json!({"roles": []}));
    mock.bump_nonce_on_fetch();

    let composer = Composer::new(&mock, ComposerConfig::default());
    let recipient = AccountId::from("bob.test");
    let token = AccountId::native_token();
    let compose = || {
        composer.compose_transfer_proposal(&signer, &key, &dao, &recipient, "2.5", &token)
    };

    let first = compose().await.unwrap();
    let second = compose().await.unwrap();

    assert!(second.nonce > first.nonce, "nonce must strictly increase");
    assert_eq!(first.actions, second.actions);
    assert_eq!(first.block_hash, second.block_hash);
    assert_eq!(first.signer_id, second.signer_id);
    assert_eq!(first.receiver_id, second.receiver_id);
}
