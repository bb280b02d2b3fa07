//! Composer configuration.
//!
//! Gas amounts, the default proposal bond, native decimals, timeouts
//! and fan-out limits live here as one immutable structure handed to
//! the composer at construction, so per-network deployments swap values
//! without touching code.

use std::time::Duration;

use crate::tx::{TokenAmount, TGAS};

/// Decimals of the chain's native asset. Fixed by protocol; native
/// transfers never consult token metadata.
pub const NATIVE_DECIMALS: u8 = 24;

/// Proposal bond assumed when a DAO's policy carries no bond field:
/// 0.1 in native 24-decimal units.
pub const DEFAULT_PROPOSAL_BOND: &str = "100000000000000000000000";

/// Gas attached to `add_proposal` (200 Tgas).
pub const GAS_ADD_PROPOSAL: u64 = 200 * TGAS;

/// Gas attached to `act_proposal` (300 Tgas).
pub const GAS_ACT_PROPOSAL: u64 = 300 * TGAS;

/// Immutable settings for transaction composition and eligibility
/// resolution.
#[derive(Debug, Clone)]
pub struct ComposerConfig {
    /// Gas for proposal-creating calls. Not user-configurable per call.
    pub gas_add_proposal: u64,

    /// Gas for vote calls. Not user-configurable per call.
    pub gas_act_proposal: u64,

    /// Bond attached when the DAO policy has no `proposal_bond`.
    pub default_proposal_bond: TokenAmount,

    /// Scaling exponent of the native asset.
    pub native_decimals: u8,

    /// Deadline for each individual network call.
    pub request_timeout: Duration,

    /// Cap on simultaneous policy fetches during eligibility fan-out.
    pub policy_fetch_concurrency: usize,
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self {
            gas_add_proposal: GAS_ADD_PROPOSAL,
            gas_act_proposal: GAS_ACT_PROPOSAL,
            default_proposal_bond: TokenAmount::from_minor(100_000_000_000_000_000_000_000),
            native_decimals: NATIVE_DECIMALS,
            request_timeout: Duration::from_secs(10),
            policy_fetch_concurrency: 8,
        }
    }
}
