//! Chain state access: gateway trait, JSON-RPC implementation, retry
//! policy, and a mock for tests.

pub mod mock;
pub mod retry;
pub mod rpc;
pub mod traits;

pub use mock::MockChainGateway;
pub use rpc::JsonRpcGateway;
pub use traits::{
    AccountId, BlockHash, ChainError, ChainResult, ChainStateGateway, PublicKey,
};
