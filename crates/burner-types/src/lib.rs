use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use alloy_primitives::{address, Address, Bytes, B256, U256};

pub mod units;

/// Hash of a mined transaction.
pub type TxHash = B256;

/// Deployment defects. Never retried, never shown as a per-action failure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("token {token} is not configured on network {network}")]
    UnknownToken { token: TokenId, network: Network },

    #[error("unknown network: {0}")]
    UnknownNetwork(String),

    #[error("unknown token: {0}")]
    UnknownTokenSymbol(String),

    #[error("peanut protocol not available on chain {0}")]
    UnsupportedChain(u64),

    #[error("invalid relayer url: {0}")]
    InvalidRelayerUrl(String),

    #[error("invalid address for {field}: {value}")]
    InvalidAddress { field: &'static str, value: String },

    #[error("missing setting: {0}")]
    MissingSetting(&'static str),

    #[error("invalid setting {key}: {reason}")]
    InvalidSetting { key: &'static str, reason: String },
}

/// Wallet core error types.
#[derive(Debug, Error)]
pub enum WalletError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("rpc error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("invalid rpc response: {0}")]
    InvalidResponse(String),

    #[error("relayer error: {0}")]
    Relayer(String),

    #[error("user operation {user_op_hash} reverted")]
    Reverted {
        user_op_hash: B256,
        transaction_hash: Option<TxHash>,
    },

    #[error("user operation {user_op_hash} not included after {attempts} attempts")]
    Timeout { user_op_hash: B256, attempts: u32 },

    #[error("signer error: {0}")]
    Signer(String),

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("invalid claim: {0}")]
    InvalidClaim(String),

    #[error("invalid link: {0}")]
    InvalidLink(String),

    #[error("{0}")]
    Other(String),
}

impl WalletError {
    /// Configuration errors abort startup; everything else is reported per action.
    pub fn is_fatal(&self) -> bool {
        matches!(self, WalletError::Config(_))
    }
}

pub type Result<T> = std::result::Result<T, WalletError>;

/// Networks the wallet knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Network {
    Ethereum,
    #[default]
    Optimism,
    OptimismGoerli,
    BaseGoerli,
}

impl Network {
    pub const ALL: [Network; 4] = [
        Network::Ethereum,
        Network::Optimism,
        Network::OptimismGoerli,
        Network::BaseGoerli,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Ethereum => "ethereum",
            Network::Optimism => "optimism",
            Network::OptimismGoerli => "optimism-goerli",
            Network::BaseGoerli => "base-goerli",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Network {
    type Err = ConfigError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Network::ALL
            .into_iter()
            .find(|n| n.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ConfigError::UnknownNetwork(s.to_string()))
    }
}

/// ERC-20 tokens the wallet can send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TokenId {
    Usdc,
    Dai,
}

impl TokenId {
    pub fn symbol(&self) -> &'static str {
        match self {
            TokenId::Usdc => "USDC",
            TokenId::Dai => "DAI",
        }
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for TokenId {
    type Err = ConfigError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "USDC" => Ok(TokenId::Usdc),
            "DAI" => Ok(TokenId::Dai),
            _ => Err(ConfigError::UnknownTokenSymbol(s.to_string())),
        }
    }
}

/// A single contract call executed by the smart account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Call {
    pub target: Address,
    pub value: U256,
    pub data: Bytes,
}

impl Call {
    /// A call that moves no native currency.
    pub fn new(target: Address, data: impl Into<Bytes>) -> Self {
        Self {
            target,
            value: U256::ZERO,
            data: data.into(),
        }
    }
}

/// Ordered calls submitted as one user operation. Order is execution order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallBundle(Vec<Call>);

impl CallBundle {
    pub fn new(calls: Vec<Call>) -> Self {
        Self(calls)
    }

    pub fn single(call: Call) -> Self {
        Self(vec![call])
    }

    pub fn push(&mut self, call: Call) {
        self.0.push(call);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// More than one call, so it must go through `executeBatch`.
    pub fn is_batch(&self) -> bool {
        self.0.len() > 1
    }

    pub fn calls(&self) -> &[Call] {
        &self.0
    }

    pub fn into_calls(self) -> Vec<Call> {
        self.0
    }

    pub fn targets(&self) -> Vec<Address> {
        self.0.iter().map(|c| c.target).collect()
    }

    pub fn values(&self) -> Vec<U256> {
        self.0.iter().map(|c| c.value).collect()
    }

    pub fn calldatas(&self) -> Vec<Bytes> {
        self.0.iter().map(|c| c.data.clone()).collect()
    }
}

impl IntoIterator for CallBundle {
    type Item = Call;
    type IntoIter = std::vec::IntoIter<Call>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// A user's request to send `amount` of `token` to `to`, skimming `fee`.
///
/// Both amounts are in the token's smallest unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferRequest {
    pub token: TokenId,
    pub network: Network,
    pub to: Address,
    pub amount: U256,
    pub fee: U256,
}

impl TransferRequest {
    pub fn has_fee(&self) -> bool {
        !self.fee.is_zero()
    }
}

/// An in-flight user operation. Consumed by waiting on it.
#[derive(Debug, PartialEq, Eq)]
pub struct SubmissionHandle {
    pub user_op_hash: B256,
    pub chain_id: u64,
    pub sender: Address,
}

/// Outcome of an included user operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub user_op_hash: B256,
    pub transaction_hash: TxHash,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_parse_and_display() {
        for network in Network::ALL {
            let parsed: Network = network.to_string().parse().unwrap();
            assert_eq!(parsed, network);
        }
        assert_eq!("Optimism".parse::<Network>().unwrap(), Network::Optimism);
        assert_eq!(Network::default(), Network::Optimism);
        assert!(matches!(
            "polygon".parse::<Network>(),
            Err(ConfigError::UnknownNetwork(_))
        ));
    }

    #[test]
    fn test_network_serde_is_kebab_case() {
        let json = serde_json::to_string(&Network::OptimismGoerli).unwrap();
        assert_eq!(json, "\"optimism-goerli\"");
    }

    #[test]
    fn test_token_parse() {
        assert_eq!("usdc".parse::<TokenId>().unwrap(), TokenId::Usdc);
        assert_eq!(" DAI ".parse::<TokenId>().unwrap(), TokenId::Dai);
        assert!("WETH".parse::<TokenId>().is_err());
    }

    #[test]
    fn test_bundle_parallel_arrays_keep_order() {
        let a = address!("0000000000000000000000000000000000000001");
        let b = address!("0000000000000000000000000000000000000002");
        let mut bundle = CallBundle::single(Call::new(a, vec![1u8]));
        assert!(!bundle.is_batch());
        bundle.push(Call::new(b, vec![2u8]));

        assert!(bundle.is_batch());
        assert_eq!(bundle.targets(), vec![a, b]);
        assert_eq!(bundle.values(), vec![U256::ZERO, U256::ZERO]);
        assert_eq!(
            bundle.calldatas(),
            vec![Bytes::from(vec![1u8]), Bytes::from(vec![2u8])]
        );
    }

    #[test]
    fn test_only_config_errors_are_fatal() {
        let fatal = WalletError::from(ConfigError::UnsupportedChain(5));
        assert!(fatal.is_fatal());
        assert!(!WalletError::Relayer("busy".into()).is_fatal());
        assert!(!WalletError::Timeout {
            user_op_hash: B256::ZERO,
            attempts: 3
        }
        .is_fatal());
    }
}
