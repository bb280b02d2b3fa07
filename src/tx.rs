//! Transaction envelope types.
//!
//! Wire encodings matter here: a downstream signer/broadcaster consumes
//! the serialized form, so `args` stay base64 and `block_hash` stays
//! base58, byte-for-byte what the chain expects.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::chain::{AccountId, BlockHash, PublicKey};

/// One Tgas, in gas units.
pub const TGAS: u64 = 1_000_000_000_000;

/// A non-negative integer amount in a token's minor unit, kept as a
/// decimal string because 24-decimal quantities overflow u64.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenAmount(String);

impl TokenAmount {
    pub fn zero() -> Self {
        Self("0".to_string())
    }

    pub fn from_minor(units: u128) -> Self {
        Self(units.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How a vote acts on a proposal. Serialized variant names are the
/// exact strings the DAO contract expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VoteAction {
    VoteApprove,
    VoteReject,
    VoteRemove,
}

impl std::str::FromStr for VoteAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "VoteApprove" | "approve" => Ok(Self::VoteApprove),
            "VoteReject" | "reject" => Ok(Self::VoteReject),
            "VoteRemove" | "remove" => Ok(Self::VoteRemove),
            other => Err(format!("unknown vote action: {other}")),
        }
    }
}

/// What the composed transaction asks the DAO to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProposalAction {
    /// Propose transferring `amount` (minor units) of `token_id`
    /// (empty = native asset) to `receiver_id`.
    Transfer {
        token_id: AccountId,
        receiver_id: AccountId,
        amount: TokenAmount,
    },
    /// Cast a vote on an existing proposal.
    Vote {
        proposal_id: u64,
        action: VoteAction,
    },
}

/// A single contract function call inside a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionCallAction {
    pub method_name: String,
    /// JSON-encoded call arguments; base64 on the wire.
    #[serde(with = "base64_bytes")]
    pub args: Vec<u8>,
    pub gas: u64,
    pub deposit: TokenAmount,
}

impl FunctionCallAction {
    /// Decode `args` back into JSON, for assertions and display.
    pub fn args_json(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::from_slice(&self.args)
    }
}

/// An unsigned, replay-protected transaction envelope.
///
/// Exactly one action in this crate; the field stays a sequence because
/// that is the chain's envelope shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub signer_id: AccountId,
    pub public_key: PublicKey,
    pub receiver_id: AccountId,
    pub nonce: u64,
    pub actions: Vec<FunctionCallAction>,
    pub block_hash: BlockHash,
}

mod base64_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        STANDARD.decode(s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn vote_action_serializes_to_contract_strings() {
        assert_eq!(serde_json::to_string(&VoteAction::VoteApprove).unwrap(), "\"VoteApprove\"");
        assert_eq!(serde_json::to_string(&VoteAction::VoteReject).unwrap(), "\"VoteReject\"");
        assert_eq!(serde_json::to_string(&VoteAction::VoteRemove).unwrap(), "\"VoteRemove\"");
    }

    #[test]
    fn vote_action_parses_long_and_short_forms() {
        assert_eq!("VoteApprove".parse::<VoteAction>().unwrap(), VoteAction::VoteApprove);
        assert_eq!("approve".parse::<VoteAction>().unwrap(), VoteAction::VoteApprove);
        assert!("VoteYes".parse::<VoteAction>().is_err());
    }

    #[test]
    fn function_call_args_round_trip_base64() {
        let args = json!({"id": 42, "action": "VoteApprove"});
        let action = FunctionCallAction {
            method_name: "act_proposal".to_string(),
            args: serde_json::to_vec(&args).unwrap(),
            gas: 300 * TGAS,
            deposit: TokenAmount::zero(),
        };

        let wire = serde_json::to_value(&action).unwrap();
        // args must be a base64 string on the wire
        let encoded = wire.get("args").and_then(|v| v.as_str()).unwrap();
        assert!(!encoded.contains('{'));

        let back: FunctionCallAction = serde_json::from_value(wire).unwrap();
        assert_eq!(back.args_json().unwrap(), args);
    }

    #[test]
    fn transaction_serializes_block_hash_as_base58() {
        let tx = Transaction {
            signer_id: AccountId::from("alice.test"),
            public_key: PublicKey::new("ed25519:abc"),
            receiver_id: AccountId::from("dao1.test"),
            nonce: 7,
            actions: vec![],
            block_hash: BlockHash::from_base58("EkRm2UwZ6LSGyGrpcQ8jTLnFaBJsQ8qcUJbWUM5dE5NS")
                .unwrap(),
        };
        let wire = serde_json::to_value(&tx).unwrap();
        assert_eq!(
            wire.get("block_hash").and_then(|v| v.as_str()).unwrap(),
            "EkRm2UwZ6LSGyGrpcQ8jTLnFaBJsQ8qcUJbWUM5dE5NS"
        );
    }
}
