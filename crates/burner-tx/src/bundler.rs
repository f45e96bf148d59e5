//! Smart-account gateway backed by an ERC-4337 bundler.
//!
//! - Account resolution through the SimpleAccount factory and the EntryPoint
//! - `execute` / `executeBatch` calldata for SimpleAccount
//! - Gas from the bundler, or from the paymaster when sponsorship is enabled
//! - Receipt polling

use std::sync::Arc;
use std::time::Duration;

use alloy_primitives::aliases::U192;
use alloy_sol_types::{sol, SolCall, SolValue};
use async_trait::async_trait;
use burner_account::{Signer, SmartAccount, SmartAccountGateway};
use burner_config::{Deployment, NetworkHandle, ENV_BUNDLER_URL};
use burner_types::{
    address, Address, Bytes, Call, CallBundle, ConfigError, Receipt, Result, SubmissionHandle,
    WalletError, B256, U256,
};
use serde_json::json;
use url::Url;

use crate::rpc::{JsonRpcClient, NO_PARAMS};
use crate::user_operation::{GasEstimate, Sponsorship, UserOperation, UserOperationReceipt};

/// EntryPoint v0.6.
pub const ENTRY_POINT_V06: Address = address!("5FF137D4b0FDCD49DcA30c7CF57E578a026d2789");

/// SimpleAccountFactory deployed alongside EntryPoint v0.6.
pub const SIMPLE_ACCOUNT_FACTORY_V06: Address =
    address!("9406Cc6185a346906296840746125a0E44976454");

sol! {
    interface ISimpleAccount {
        function execute(address dest, uint256 value, bytes func) external;
        function executeBatch(address[] dest, bytes[] func) external;
    }

    interface ISimpleAccountFactory {
        function createAccount(address owner, uint256 salt) external returns (address);
        function getAddress(address owner, uint256 salt) external view returns (address);
    }

    interface IEntryPoint {
        function getNonce(address sender, uint192 key) external view returns (uint256);
    }
}

/// Bundler connection settings.
#[derive(Debug, Clone)]
pub struct BundlerConfig {
    pub chain_id: u64,
    pub bundler_url: Url,
    /// Sponsor gas through this paymaster when set.
    pub paymaster_url: Option<Url>,
    pub entry_point: Address,
    pub factory: Address,
    pub salt: U256,
    pub request_timeout_ms: u64,
    pub poll_interval_ms: u64,
    pub max_poll_attempts: u32,
}

impl BundlerConfig {
    pub fn new(chain_id: u64, bundler_url: Url) -> Self {
        Self {
            chain_id,
            bundler_url,
            paymaster_url: None,
            entry_point: ENTRY_POINT_V06,
            factory: SIMPLE_ACCOUNT_FACTORY_V06,
            salt: U256::ZERO,
            request_timeout_ms: 30_000,
            poll_interval_ms: 2_000,
            max_poll_attempts: 60,
        }
    }

    /// Settings for the deployment's active network.
    pub fn from_deployment(deployment: &Deployment) -> Result<Self> {
        let bundler_url = deployment
            .bundler_url
            .clone()
            .ok_or(ConfigError::MissingSetting(ENV_BUNDLER_URL))?;
        let config = &deployment.config;

        Ok(Self {
            paymaster_url: config
                .use_paymaster
                .then(|| deployment.peanut.endpoints.paymaster_url.clone()),
            request_timeout_ms: config.request_timeout_ms,
            poll_interval_ms: config.poll_interval_ms,
            max_poll_attempts: config.max_poll_attempts,
            ..Self::new(deployment.network.chain_id, bundler_url)
        })
    }
}

/// `factory ‖ createAccount(owner, salt)`.
pub fn init_code(factory: Address, owner: Address, salt: U256) -> Bytes {
    let mut code = factory.to_vec();
    code.extend(ISimpleAccountFactory::createAccountCall { owner, salt }.abi_encode());
    code.into()
}

/// SimpleAccount calldata for a single call.
pub fn encode_execute(call: &Call) -> Bytes {
    ISimpleAccount::executeCall {
        dest: call.target,
        value: call.value,
        func: call.data.clone(),
    }
    .abi_encode()
    .into()
}

/// SimpleAccount calldata for a batch. The v0.6 batch entry point carries no
/// native value, so every call must have zero value.
pub fn encode_execute_batch(bundle: &CallBundle) -> Result<Bytes> {
    if let Some(call) = bundle.calls().iter().find(|c| !c.value.is_zero()) {
        return Err(WalletError::Other(format!(
            "executeBatch cannot forward native value (call to {})",
            call.target
        )));
    }
    Ok(ISimpleAccount::executeBatchCall {
        dest: bundle.targets(),
        func: bundle.calldatas(),
    }
    .abi_encode()
    .into())
}

/// ERC-4337 gateway.
pub struct BundlerGateway {
    config: BundlerConfig,
    bundler: JsonRpcClient,
    paymaster: Option<JsonRpcClient>,
}

impl BundlerGateway {
    pub fn new(config: BundlerConfig) -> Self {
        let timeout = Some(config.request_timeout_ms);
        let bundler = JsonRpcClient::new(config.bundler_url.clone(), timeout);
        let paymaster = config
            .paymaster_url
            .clone()
            .map(|url| JsonRpcClient::new(url, timeout));
        Self {
            config,
            bundler,
            paymaster,
        }
    }

    pub fn config(&self) -> &BundlerConfig {
        &self.config
    }

    async fn eth_call<C: SolCall>(
        &self,
        node: &JsonRpcClient,
        to: Address,
        call: C,
    ) -> Result<Bytes> {
        let data = Bytes::from(call.abi_encode());
        node.request("eth_call", (json!({ "to": to, "data": data }), "latest"))
            .await
    }

    async fn gas(&self, op: &UserOperation) -> Result<(GasEstimate, Bytes)> {
        let entry_point = self.config.entry_point;
        match &self.paymaster {
            Some(paymaster) => {
                let sponsorship: Sponsorship = paymaster
                    .request(
                        "pm_sponsorUserOperation",
                        (op, entry_point, json!({ "type": "payg" })),
                    )
                    .await?;
                Ok((sponsorship.gas, sponsorship.paymaster_and_data))
            }
            None => {
                let estimate: GasEstimate = self
                    .bundler
                    .request("eth_estimateUserOperationGas", (op, entry_point))
                    .await?;
                Ok((estimate, Bytes::new()))
            }
        }
    }

    /// Populate, sign and send one user operation.
    async fn submit(&self, account: &SmartAccount, call_data: Bytes) -> Result<SubmissionHandle> {
        if account.chain_id != self.config.chain_id {
            return Err(ConfigError::UnsupportedChain(account.chain_id).into());
        }

        let mut op = UserOperation::new(account, call_data);
        let gas_price = self.bundler.request_quantity("eth_gasPrice", NO_PARAMS).await?;
        op.max_fee_per_gas = gas_price;
        op.max_priority_fee_per_gas = gas_price;

        let (gas, paymaster_and_data) = self.gas(&op).await?;
        op.apply_gas(&gas);
        op.paymaster_and_data = paymaster_and_data;

        let hash = op.hash(self.config.entry_point, self.config.chain_id);
        op.signature = account.signer.sign_message(hash.as_slice()).await?;

        let user_op_hash: B256 = self
            .bundler
            .request("eth_sendUserOperation", (&op, self.config.entry_point))
            .await?;

        tracing::info!(
            chain = self.config.chain_id,
            sender = %account.address,
            user_op = %user_op_hash,
            sponsored = !op.paymaster_and_data.is_empty(),
            "user operation sent"
        );

        Ok(SubmissionHandle {
            user_op_hash,
            chain_id: self.config.chain_id,
            sender: account.address,
        })
    }
}

#[async_trait]
impl SmartAccountGateway for BundlerGateway {
    async fn get_account(
        &self,
        signer: Arc<dyn Signer>,
        network: &NetworkHandle,
    ) -> Result<SmartAccount> {
        if network.chain_id != self.config.chain_id {
            return Err(ConfigError::UnsupportedChain(network.chain_id).into());
        }

        let owner = signer.address().await?;
        let node = JsonRpcClient::new(
            network.rpc_url.clone(),
            Some(self.config.request_timeout_ms),
        );
        let salt = self.config.salt;

        let raw = self
            .eth_call(
                &node,
                self.config.factory,
                ISimpleAccountFactory::getAddressCall { owner, salt },
            )
            .await?;
        let address = Address::abi_decode(&raw)
            .map_err(|e| WalletError::InvalidResponse(format!("getAddress: {e}")))?;

        let code: Bytes = node.request("eth_getCode", (address, "latest")).await?;

        let raw = self
            .eth_call(
                &node,
                self.config.entry_point,
                IEntryPoint::getNonceCall {
                    sender: address,
                    key: U192::ZERO,
                },
            )
            .await?;
        let nonce = U256::abi_decode(&raw)
            .map_err(|e| WalletError::InvalidResponse(format!("getNonce: {e}")))?;

        let init_code = if code.is_empty() {
            init_code(self.config.factory, owner, salt)
        } else {
            Bytes::new()
        };

        tracing::debug!(
            chain = network.chain_id,
            %owner,
            account = %address,
            %nonce,
            deployed = init_code.is_empty(),
            "resolved smart account"
        );

        Ok(SmartAccount {
            address,
            owner,
            chain_id: network.chain_id,
            nonce,
            init_code,
            signer,
        })
    }

    async fn execute(&self, account: &SmartAccount, call: Call) -> Result<SubmissionHandle> {
        self.submit(account, encode_execute(&call)).await
    }

    async fn execute_batch(
        &self,
        account: &SmartAccount,
        bundle: CallBundle,
    ) -> Result<SubmissionHandle> {
        let call_data = encode_execute_batch(&bundle)?;
        self.submit(account, call_data).await
    }

    async fn wait(&self, handle: SubmissionHandle) -> Result<Receipt> {
        let attempts = self.config.max_poll_attempts;
        for attempt in 0..attempts {
            let receipt: Option<UserOperationReceipt> = self
                .bundler
                .request("eth_getUserOperationReceipt", [handle.user_op_hash])
                .await?;

            if let Some(receipt) = receipt {
                let transaction_hash = receipt.receipt.transaction_hash;
                if !receipt.success {
                    tracing::warn!(
                        user_op = %handle.user_op_hash,
                        tx = %transaction_hash,
                        reason = receipt.reason.as_deref().unwrap_or("unknown"),
                        "user operation reverted"
                    );
                    return Err(WalletError::Reverted {
                        user_op_hash: handle.user_op_hash,
                        transaction_hash: Some(transaction_hash),
                    });
                }
                tracing::info!(
                    user_op = %handle.user_op_hash,
                    tx = %transaction_hash,
                    attempt,
                    "user operation included"
                );
                return Ok(Receipt {
                    user_op_hash: receipt.user_op_hash,
                    transaction_hash,
                });
            }

            if attempt + 1 < attempts {
                tracing::debug!(
                    user_op = %handle.user_op_hash,
                    attempt,
                    "receipt not yet available"
                );
                tokio::time::sleep(Duration::from_millis(self.config.poll_interval_ms)).await;
            }
        }

        Err(WalletError::Timeout {
            user_op_hash: handle.user_op_hash,
            attempts,
        })
    }
}
