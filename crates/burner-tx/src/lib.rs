//! Network side of the wallet: bundler gateway and relayer clients.
//!
//! - JSON-RPC transport for node, bundler and paymaster
//! - ERC-4337 v0.6 user operations, submitted through `BundlerGateway`
//! - Peanut claim submission through `RelayerClient`

pub mod bundler;
pub mod relayer_client;
pub mod rpc;
pub mod user_operation;

pub use bundler::{BundlerConfig, BundlerGateway, ENTRY_POINT_V06, SIMPLE_ACCOUNT_FACTORY_V06};
pub use relayer_client::{ClaimRequest, RelayerClient};
pub use rpc::JsonRpcClient;
pub use user_operation::UserOperation;
