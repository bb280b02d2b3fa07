//! daotx - unsigned transaction composer for Sputnik-style DAO contracts.
//!
//! Builds protocol-valid, replay-protected transactions that propose
//! asset transfers and cast votes, and resolves which DAOs an account
//! may vote in.
//!
//! Key principles:
//! - Nothing is signed or broadcast; the output is an envelope for a
//!   downstream signer.
//! - No state persists across calls: nonce, block hash, and policies
//!   are fetched live every time.
//! - All network access goes through gateway traits, so everything is
//!   testable against mocks.

pub mod amount;
pub mod chain;
pub mod composer;
pub mod config;
pub mod eligibility;
pub mod error;
pub mod indexer;
pub mod policy;
pub mod tx;

pub use chain::{AccountId, BlockHash, ChainError, ChainStateGateway, JsonRpcGateway, PublicKey};
pub use composer::Composer;
pub use config::ComposerConfig;
pub use eligibility::{EligibilityReport, EligibilityResolver};
pub use error::{TxError, TxResult};
pub use policy::{AccessPolicy, PolicyResolver, Role, RoleKind};
pub use tx::{FunctionCallAction, ProposalAction, TokenAmount, Transaction, VoteAction};
