//! DAO access-policy fetching and decoding.
//!
//! The policy arrives as JSON from a `get_policy` view call. Role kinds
//! are decoded into an explicit tagged enum — unrecognized shapes are
//! rejected as `PolicyUnavailable` rather than silently skipped, so a
//! contract upgrade that changes the wire shape fails loudly instead of
//! producing wrong eligibility or deposits.

use serde::{Deserialize, Deserializer};
use serde_json::{json, Value};
use std::collections::BTreeSet;

use crate::chain::{AccountId, ChainStateGateway};
use crate::config::ComposerConfig;
use crate::error::{TxError, TxResult};
use crate::tx::TokenAmount;

/// A DAO's on-chain access policy, reduced to the fields this crate
/// consumes: the proposal bond and the role list.
#[derive(Debug, Clone, Deserialize)]
pub struct AccessPolicy {
    /// Deposit required to submit a proposal. Absent on some DAOs; the
    /// documented default applies then (`proposal_bond_or`).
    #[serde(default)]
    pub proposal_bond: Option<TokenAmount>,

    /// Roles in policy order.
    #[serde(default)]
    pub roles: Vec<Role>,
}

impl AccessPolicy {
    /// The bond to attach to `add_proposal`: the policy's own bond, or
    /// `default` when the field is absent. Only this field has a
    /// documented default; a missing policy is never fabricated.
    pub fn proposal_bond_or(&self, default: &TokenAmount) -> TokenAmount {
        self.proposal_bond.clone().unwrap_or_else(|| default.clone())
    }
}

/// One role in a DAO policy.
#[derive(Debug, Clone, Deserialize)]
pub struct Role {
    #[serde(default)]
    pub name: String,
    pub kind: RoleKind,
    #[serde(default)]
    pub permissions: BTreeSet<String>,
}

/// Who a role applies to.
///
/// Only `Group` feeds eligibility; `Everyone` and `Member` are decoded
/// so their presence never breaks resolution, but they grant nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleKind {
    Everyone,
    Group(BTreeSet<AccountId>),
    /// Token-weighted membership; the weight payload is not consumed.
    Member,
}

impl<'de> Deserialize<'de> for RoleKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // Wire shape: "Everyone" as a bare string, Group/Member as a
        // single-key object: {"Group": ["a", "b"]}, {"Member": "1"}.
        let value = Value::deserialize(deserializer)?;
        match &value {
            Value::String(s) if s == "Everyone" => Ok(RoleKind::Everyone),
            Value::Object(map) if map.len() == 1 => {
                let (tag, payload) = match map.iter().next() {
                    Some(entry) => entry,
                    None => return Err(serde::de::Error::custom("empty role kind object")),
                };
                match tag.as_str() {
                    "Group" => {
                        let members: BTreeSet<AccountId> =
                            serde_json::from_value(payload.clone()).map_err(|e| {
                                serde::de::Error::custom(format!("bad Group payload: {e}"))
                            })?;
                        Ok(RoleKind::Group(members))
                    }
                    "Member" => Ok(RoleKind::Member),
                    other => Err(serde::de::Error::custom(format!(
                        "unrecognized role kind: {other}"
                    ))),
                }
            }
            _ => Err(serde::de::Error::custom("unrecognized role kind shape")),
        }
    }
}

/// Fetches and decodes DAO policies through a chain gateway.
///
/// No caching: the bond can change between calls, and a stale bond
/// would misstate the deposit a user must attach.
pub struct PolicyResolver<'a> {
    gateway: &'a dyn ChainStateGateway,
}

impl<'a> PolicyResolver<'a> {
    pub fn new(gateway: &'a dyn ChainStateGateway) -> Self {
        Self { gateway }
    }

    /// One `get_policy` view call, decoded into `AccessPolicy`.
    pub async fn resolve(&self, dao: &AccountId) -> TxResult<AccessPolicy> {
        let bytes = self
            .gateway
            .view_contract(dao, "get_policy", &json!({}))
            .await
            .map_err(|e| TxError::policy_unavailable(dao, e.to_string()))?;

        let policy: AccessPolicy = serde_json::from_slice(&bytes)
            .map_err(|e| TxError::policy_unavailable(dao, format!("unparsable policy: {e}")))?;

        tracing::debug!(
            dao = %dao,
            roles = policy.roles.len(),
            has_bond = policy.proposal_bond.is_some(),
            "resolved policy"
        );

        Ok(policy)
    }

    /// The deposit to attach to a proposal on `dao`, per its current
    /// policy (with the documented default when the bond is absent).
    pub async fn resolve_proposal_bond(
        &self,
        dao: &AccountId,
        config: &ComposerConfig,
    ) -> TxResult<TokenAmount> {
        let policy = self.resolve(dao).await?;
        Ok(policy.proposal_bond_or(&config.default_proposal_bond))
    }
}
