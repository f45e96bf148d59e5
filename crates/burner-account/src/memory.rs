//! In-memory gateway and signer (for testing and dry runs).

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use alloy_primitives::keccak256;
use burner_types::{B256, WalletError};

use crate::*;

/// A signer with a fixed address and deterministic signatures.
#[derive(Debug, Clone)]
pub struct StaticSigner {
    address: Address,
}

impl StaticSigner {
    pub fn new(address: Address) -> Self {
        Self { address }
    }
}

#[async_trait]
impl Signer for StaticSigner {
    async fn address(&self) -> Result<Address> {
        Ok(self.address)
    }

    async fn sign_message(&self, message: &[u8]) -> Result<Bytes> {
        let mut preimage = self.address.to_vec();
        preimage.extend_from_slice(message);
        let digest = keccak256(&preimage);

        let mut sig = Vec::with_capacity(65);
        sig.extend_from_slice(digest.as_slice());
        sig.extend_from_slice(keccak256(digest).as_slice());
        sig.push(27);
        Ok(sig.into())
    }
}

/// What the gateway was asked to submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    Single { account: Address, call: Call },
    Batch { account: Address, bundle: CallBundle },
}

#[derive(Default)]
struct State {
    submissions: Vec<Submission>,
    pending: HashSet<B256>,
    max_in_flight: usize,
    reject_next: Option<String>,
}

/// Records submissions and resolves them immediately.
pub struct MemoryGateway {
    account: Address,
    state: Mutex<State>,
}

impl MemoryGateway {
    pub fn new(account: Address) -> Self {
        Self {
            account,
            state: Mutex::new(State::default()),
        }
    }

    /// Make the next `wait` fail as if the relay rejected the operation.
    pub fn reject_next(&self, reason: &str) {
        self.state.lock().unwrap().reject_next = Some(reason.to_string());
    }

    pub fn submissions(&self) -> Vec<Submission> {
        self.state.lock().unwrap().submissions.clone()
    }

    /// Highest number of unresolved handles seen at once.
    pub fn max_in_flight(&self) -> usize {
        self.state.lock().unwrap().max_in_flight
    }

    fn record(&self, chain_id: u64, submission: Submission) -> SubmissionHandle {
        let mut state = self.state.lock().unwrap();
        state.submissions.push(submission);
        let user_op_hash = keccak256((state.submissions.len() as u64).to_be_bytes());
        state.pending.insert(user_op_hash);
        state.max_in_flight = state.max_in_flight.max(state.pending.len());
        SubmissionHandle {
            user_op_hash,
            chain_id,
            sender: self.account,
        }
    }
}

#[async_trait]
impl SmartAccountGateway for MemoryGateway {
    async fn get_account(
        &self,
        signer: Arc<dyn Signer>,
        network: &NetworkHandle,
    ) -> Result<SmartAccount> {
        let owner = signer.address().await?;
        Ok(SmartAccount {
            address: self.account,
            owner,
            chain_id: network.chain_id,
            nonce: U256::ZERO,
            init_code: Bytes::new(),
            signer,
        })
    }

    async fn execute(&self, account: &SmartAccount, call: Call) -> Result<SubmissionHandle> {
        Ok(self.record(
            account.chain_id,
            Submission::Single {
                account: account.address,
                call,
            },
        ))
    }

    async fn execute_batch(
        &self,
        account: &SmartAccount,
        bundle: CallBundle,
    ) -> Result<SubmissionHandle> {
        Ok(self.record(
            account.chain_id,
            Submission::Batch {
                account: account.address,
                bundle,
            },
        ))
    }

    async fn wait(&self, handle: SubmissionHandle) -> Result<Receipt> {
        let mut state = self.state.lock().unwrap();
        if !state.pending.remove(&handle.user_op_hash) {
            return Err(WalletError::Other(format!(
                "unknown user operation {}",
                handle.user_op_hash
            )));
        }
        if let Some(reason) = state.reject_next.take() {
            return Err(WalletError::Relayer(reason));
        }
        Ok(Receipt {
            user_op_hash: handle.user_op_hash,
            transaction_hash: keccak256(handle.user_op_hash),
        })
    }
}
