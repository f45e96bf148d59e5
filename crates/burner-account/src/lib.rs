//! Capabilities the wallet core consumes from the outside world.
//!
//! Defines the `Signer` and `SmartAccountGateway` traits. Key storage and the
//! account-abstraction network live behind them. Provides a `MemoryGateway`
//! and `StaticSigner` for testing.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use burner_config::NetworkHandle;
use burner_types::{Address, Bytes, Call, CallBundle, Receipt, Result, SubmissionHandle, U256};

pub mod memory;

/// Opaque key holder.
#[async_trait]
pub trait Signer: Send + Sync {
    /// Address of the key this signer controls.
    async fn address(&self) -> Result<Address>;

    /// EIP-191 personal-message signature over `message`.
    async fn sign_message(&self, message: &[u8]) -> Result<Bytes>;
}

/// A smart-contract account controlled by a signer on one chain.
///
/// The account may not exist on chain yet; in that case `init_code` is non-empty
/// and the first operation deploys it.
#[derive(Clone)]
pub struct SmartAccount {
    pub address: Address,
    pub owner: Address,
    pub chain_id: u64,
    pub nonce: U256,
    pub init_code: Bytes,
    pub signer: Arc<dyn Signer>,
}

impl SmartAccount {
    pub fn is_deployed(&self) -> bool {
        self.init_code.is_empty()
    }
}

impl fmt::Debug for SmartAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmartAccount")
            .field("address", &self.address)
            .field("owner", &self.owner)
            .field("chain_id", &self.chain_id)
            .field("nonce", &self.nonce)
            .field("deployed", &self.is_deployed())
            .finish()
    }
}

/// Submits calls on behalf of a smart account.
///
/// Calls inside one `execute_batch` run on chain in bundle order, atomically.
/// `execute` and `execute_batch` both build and send the user operation; the
/// returned handle is resolved with `wait`.
#[async_trait]
#[cfg_attr(feature = "testing", mockall::automock)]
pub trait SmartAccountGateway: Send + Sync {
    /// Resolve the counterfactual account of `signer` on `network`.
    async fn get_account(
        &self,
        signer: Arc<dyn Signer>,
        network: &NetworkHandle,
    ) -> Result<SmartAccount>;

    /// Submit a single call.
    async fn execute(&self, account: &SmartAccount, call: Call) -> Result<SubmissionHandle>;

    /// Submit several calls as one atomic operation.
    async fn execute_batch(
        &self,
        account: &SmartAccount,
        bundle: CallBundle,
    ) -> Result<SubmissionHandle>;

    /// Suspend until the operation is included, or fail on rejection or timeout.
    async fn wait(&self, handle: SubmissionHandle) -> Result<Receipt>;
}

pub use memory::{MemoryGateway, StaticSigner, Submission};
