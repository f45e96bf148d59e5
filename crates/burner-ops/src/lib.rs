//! End-to-end wallet operations: token transfers and claim redemption.
//!
//! Coordinates the registries, the planner and the smart-account gateway.
//! At most one submission per request is in flight: every transfer awaits its
//! own handle before returning. Callers that fire concurrent transfers for the
//! same account race at the relay and must serialize them themselves.

use std::sync::Arc;

use burner_account::{Signer, SmartAccountGateway};
use burner_config::{Deployment, NetworkResolver, TokenRegistry};
use burner_planner::{plan_transfer, TransferPlan};
use burner_types::{
    Address, Network, Receipt, Result, TokenId, TransferRequest, TxHash, WalletError, U256,
};

pub mod claim;

pub use claim::ClaimRedeemer;

/// Sends ERC-20 transfers through the user's smart account, bundling the flat
/// fee as a second call when it is non-zero.
pub struct TransferOrchestrator {
    tokens: TokenRegistry,
    networks: NetworkResolver,
    gateway: Arc<dyn SmartAccountGateway>,
    signer: Arc<dyn Signer>,
    fee_recipient: Address,
}

impl TransferOrchestrator {
    pub fn new(
        tokens: TokenRegistry,
        networks: NetworkResolver,
        gateway: Arc<dyn SmartAccountGateway>,
        signer: Arc<dyn Signer>,
        fee_recipient: Address,
    ) -> Self {
        Self {
            tokens,
            networks,
            gateway,
            signer,
            fee_recipient,
        }
    }

    pub fn from_deployment(
        deployment: &Deployment,
        gateway: Arc<dyn SmartAccountGateway>,
        signer: Arc<dyn Signer>,
    ) -> Self {
        Self::new(
            deployment.tokens.clone(),
            deployment.networks.clone(),
            gateway,
            signer,
            deployment.fee_recipient(),
        )
    }

    pub fn fee_recipient(&self) -> Address {
        self.fee_recipient
    }

    /// Build the calls for `request` without submitting anything.
    pub fn prepare(&self, request: &TransferRequest) -> Result<TransferPlan> {
        let token = self.tokens.lookup(request.token, request.network)?;
        plan_transfer(token, request, self.fee_recipient)
    }

    /// Send `amount` of `token` to `to` on `network`, plus `fee` to the fee
    /// recipient, and return the mined transaction hash.
    pub async fn transfer(
        &self,
        token: TokenId,
        network: Network,
        to: Address,
        amount: U256,
        fee: U256,
    ) -> Result<TxHash> {
        let receipt = self
            .execute(TransferRequest {
                token,
                network,
                to,
                amount,
                fee,
            })
            .await?;
        Ok(receipt.transaction_hash)
    }

    /// Run one transfer request to completion.
    pub async fn execute(&self, request: TransferRequest) -> Result<Receipt> {
        let network = self.networks.resolve(request.network)?;
        let plan = self.prepare(&request)?;

        let account = self
            .gateway
            .get_account(self.signer.clone(), network)
            .await?;

        tracing::info!(
            token = %request.token,
            chain = network.chain_id,
            account = %account.address,
            to = %request.to,
            amount = %request.amount,
            fee = %request.fee,
            "submitting transfer"
        );

        let handle = if plan.is_batch() {
            self.gateway.execute_batch(&account, plan.bundle).await?
        } else {
            let call = plan
                .bundle
                .into_calls()
                .into_iter()
                .next()
                .ok_or_else(|| WalletError::Other("empty transfer plan".into()))?;
            self.gateway.execute(&account, call).await?
        };

        match self.gateway.wait(handle).await {
            Ok(receipt) => {
                tracing::info!(
                    token = %request.token,
                    tx = %receipt.transaction_hash,
                    "transfer confirmed"
                );
                Ok(receipt)
            }
            Err(e) => {
                tracing::warn!(token = %request.token, error = %e, "transfer failed");
                Err(e)
            }
        }
    }
}
