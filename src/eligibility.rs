//! Voting-eligibility resolution.
//!
//! For each candidate DAO, fetch its policy and check whether the
//! account sits in a group role that carries a vote permission. Policy
//! fetches fan out with bounded concurrency; one DAO's failure excludes
//! that DAO and is recorded in the report, never raised, so a single
//! flaky contract cannot blank out a user's whole eligibility view.

use futures::stream::{self, StreamExt};
use std::collections::BTreeSet;

use crate::chain::{AccountId, ChainStateGateway};
use crate::config::ComposerConfig;
use crate::error::TxError;
use crate::policy::{AccessPolicy, PolicyResolver, Role, RoleKind};

/// Vote markers recognized in permission strings.
const VOTE_ACTIONS: [&str; 3] = ["VoteApprove", "VoteReject", "VoteRemove"];

/// Outcome of an eligibility resolution.
#[derive(Debug, Clone)]
pub struct EligibilityReport {
    /// DAOs where the account holds a voting permission.
    pub eligible: BTreeSet<AccountId>,
    /// DAOs whose policy could not be resolved, with the reason. These
    /// are excluded from `eligible`, not merged into it.
    pub failures: Vec<DaoFailure>,
}

/// A per-DAO resolution failure, downgraded from an error to a record.
#[derive(Debug, Clone)]
pub struct DaoFailure {
    pub dao: AccountId,
    pub error: TxError,
}

/// Computes the DAOs an account can vote in.
pub struct EligibilityResolver<'a> {
    gateway: &'a dyn ChainStateGateway,
    config: ComposerConfig,
}

impl<'a> EligibilityResolver<'a> {
    pub fn new(gateway: &'a dyn ChainStateGateway, config: ComposerConfig) -> Self {
        Self { gateway, config }
    }

    /// Resolve eligibility for `account` across `candidates`.
    ///
    /// Policy fetches run concurrently, capped at
    /// `config.policy_fetch_concurrency` outstanding calls.
    pub async fn resolve(
        &self,
        account: &AccountId,
        candidates: &[AccountId],
    ) -> EligibilityReport {
        let resolver = PolicyResolver::new(self.gateway);

        let results: Vec<(AccountId, Result<AccessPolicy, TxError>)> =
            stream::iter(candidates.iter().cloned())
                .map(|dao| {
                    let resolver = &resolver;
                    async move {
                        let outcome = resolver.resolve(&dao).await;
                        (dao, outcome)
                    }
                })
                .buffer_unordered(self.config.policy_fetch_concurrency.max(1))
                .collect()
                .await;

        let mut eligible = BTreeSet::new();
        let mut failures = Vec::new();

        for (dao, outcome) in results {
            match outcome {
                Ok(policy) => {
                    if account_can_vote(account, &policy) {
                        eligible.insert(dao);
                    }
                }
                Err(error) => {
                    tracing::warn!(dao = %dao, error = %error, "excluding dao from eligibility");
                    failures.push(DaoFailure { dao, error });
                }
            }
        }

        EligibilityReport { eligible, failures }
    }
}

/// Whether any role in `policy` grants `account` a vote.
pub fn account_can_vote(account: &AccountId, policy: &AccessPolicy) -> bool {
    policy.roles.iter().any(|role| role_grants_vote(account, role))
}

fn role_grants_vote(account: &AccountId, role: &Role) -> bool {
    has_voting_permission(role) && is_group_member(account, role)
}

/// A permission grants voting when it equals a vote action outright or
/// contains `:<action>` anywhere in the string. The containment match
/// is deliberately loose (`"foo:VoteApproveX"` counts): it reproduces
/// the behavior live DAOs were evaluated under.
fn has_voting_permission(role: &Role) -> bool {
    role.permissions.iter().any(|permission| {
        VOTE_ACTIONS.iter().any(|action| {
            permission.as_str() == *action || permission.contains(&format!(":{action}"))
        })
    })
}

/// Only explicit group rosters count as membership; `Everyone` and
/// `Member` kinds never match.
fn is_group_member(account: &AccountId, role: &Role) -> bool {
    match &role.kind {
        RoleKind::Group(members) => members.contains(account),
        RoleKind::Everyone | RoleKind::Member => false,
    }
}
