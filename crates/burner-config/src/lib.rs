//! Static wallet configuration and the startup initialization step.
//!
//! - Token registry and network resolver
//! - Peanut claim-contract addresses and relayer endpoints
//! - `WalletConfig` loading and `Deployment::initialize`

use std::str::FromStr;

use burner_types::{address, Address, ConfigError, Network, Result, TokenId};
use url::Url;

pub mod networks;
pub mod peanut;
pub mod tokens;

pub use networks::{NetworkHandle, NetworkResolver};
pub use peanut::{peanut_address, PeanutDeployment, RelayerEndpoints};
pub use tokens::{TokenDescriptor, TokenRegistry};

/// Receives the second leg of every non-zero-fee transfer.
pub const FLAT_FEE_RECIPIENT: Address = address!("9c5a1b4e7f3d2c8a6b0e1f4d3c2b5a6978e0d1c2");

pub const ENV_NETWORK: &str = "BURNER_NETWORK";
pub const ENV_TOKENS: &str = "BURNER_TOKENS";
pub const ENV_RPC_URL: &str = "RPC_URL";
pub const ENV_RELAYER_URL: &str = "RELAYER_URL";
pub const ENV_FEE_RECIPIENT: &str = "FLAT_FEE_RECIPIENT";
pub const ENV_BUNDLER_URL: &str = "BUNDLER_URL";
pub const ENV_USE_PAYMASTER: &str = "USE_PAYMASTER";
pub const ENV_REQUEST_TIMEOUT_MS: &str = "REQUEST_TIMEOUT_MS";
pub const ENV_POLL_INTERVAL_MS: &str = "POLL_INTERVAL_MS";
pub const ENV_MAX_POLL_ATTEMPTS: &str = "MAX_POLL_ATTEMPTS";

/// Raw wallet settings, before validation.
#[derive(Debug, Clone)]
pub struct WalletConfig {
    pub network: Network,
    /// Tokens offered on `network`. Each must be deployed there.
    pub tokens: Vec<TokenId>,
    /// Overrides the built-in RPC endpoint of `network`.
    pub rpc_url: Option<String>,
    pub relayer_url: String,
    pub fee_recipient: Address,
    pub bundler_url: Option<String>,
    pub use_paymaster: bool,
    pub request_timeout_ms: u64,
    pub poll_interval_ms: u64,
    pub max_poll_attempts: u32,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            network: Network::default(),
            tokens: vec![TokenId::Usdc],
            rpc_url: None,
            relayer_url: String::new(),
            fee_recipient: FLAT_FEE_RECIPIENT,
            bundler_url: None,
            use_paymaster: true,
            request_timeout_ms: 30_000,
            poll_interval_ms: 2_000,
            max_poll_attempts: 60,
        }
    }
}

impl WalletConfig {
    /// Load settings from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load settings through an arbitrary key lookup. Unset keys keep their defaults,
    /// except the relayer URL which is required.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(network) = get(ENV_NETWORK) {
            config.network = network.parse()?;
        }
        if let Some(tokens) = get(ENV_TOKENS) {
            config.tokens = tokens
                .split(',')
                .filter(|t| !t.trim().is_empty())
                .map(TokenId::from_str)
                .collect::<std::result::Result<_, _>>()?;
        }
        config.rpc_url = get(ENV_RPC_URL);
        config.relayer_url =
            get(ENV_RELAYER_URL).ok_or(ConfigError::MissingSetting(ENV_RELAYER_URL))?;
        if let Some(recipient) = get(ENV_FEE_RECIPIENT) {
            config.fee_recipient = parse_address(ENV_FEE_RECIPIENT, &recipient)?;
        }
        config.bundler_url = get(ENV_BUNDLER_URL);
        if let Some(flag) = get(ENV_USE_PAYMASTER) {
            config.use_paymaster = parse_setting(ENV_USE_PAYMASTER, &flag)?;
        }
        if let Some(ms) = get(ENV_REQUEST_TIMEOUT_MS) {
            config.request_timeout_ms = parse_setting(ENV_REQUEST_TIMEOUT_MS, &ms)?;
        }
        if let Some(ms) = get(ENV_POLL_INTERVAL_MS) {
            config.poll_interval_ms = parse_setting(ENV_POLL_INTERVAL_MS, &ms)?;
        }
        if let Some(n) = get(ENV_MAX_POLL_ATTEMPTS) {
            config.max_poll_attempts = parse_setting(ENV_MAX_POLL_ATTEMPTS, &n)?;
        }

        Ok(config)
    }
}

fn parse_address(field: &'static str, value: &str) -> Result<Address> {
    Address::from_str(value.trim()).map_err(|_| {
        ConfigError::InvalidAddress {
            field,
            value: value.to_string(),
        }
        .into()
    })
}

fn parse_url(key: &'static str, value: &str) -> Result<Url> {
    Url::parse(value.trim()).map_err(|e| {
        ConfigError::InvalidSetting {
            key,
            reason: e.to_string(),
        }
        .into()
    })
}

fn parse_setting<T>(key: &'static str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| {
        ConfigError::InvalidSetting {
            key,
            reason: e.to_string(),
        }
        .into()
    })
}

/// Validated, immutable wallet deployment. Building one is the only place
/// configuration errors can surface.
#[derive(Debug, Clone)]
pub struct Deployment {
    pub config: WalletConfig,
    pub tokens: TokenRegistry,
    pub networks: NetworkResolver,
    pub network: NetworkHandle,
    pub peanut: PeanutDeployment,
    pub bundler_url: Option<Url>,
}

impl Deployment {
    pub fn initialize(config: WalletConfig) -> Result<Self> {
        let mut networks = NetworkResolver::builtin()?;
        if let Some(raw) = config.rpc_url.as_deref() {
            networks = networks.with_rpc_url(config.network, parse_url(ENV_RPC_URL, raw)?);
        }
        let network = networks.resolve(config.network)?.clone();

        let tokens = TokenRegistry::builtin();
        let offered: Vec<_> = config.tokens.iter().map(|&t| (t, config.network)).collect();
        tokens.require_all(&offered)?;

        let peanut = PeanutDeployment::resolve(network.chain_id, &config.relayer_url)?;

        if config.fee_recipient == Address::ZERO {
            return Err(ConfigError::InvalidAddress {
                field: ENV_FEE_RECIPIENT,
                value: config.fee_recipient.to_string(),
            }
            .into());
        }
        if config.poll_interval_ms == 0 {
            return Err(ConfigError::InvalidSetting {
                key: ENV_POLL_INTERVAL_MS,
                reason: "must be non-zero".into(),
            }
            .into());
        }
        if config.max_poll_attempts == 0 {
            return Err(ConfigError::InvalidSetting {
                key: ENV_MAX_POLL_ATTEMPTS,
                reason: "must allow at least one attempt".into(),
            }
            .into());
        }

        let bundler_url = config
            .bundler_url
            .as_deref()
            .map(|raw| parse_url(ENV_BUNDLER_URL, raw))
            .transpose()?;

        tracing::info!(
            network = %network.network,
            chain = network.chain_id,
            rpc = %network.rpc_url,
            tokens = ?config.tokens,
            peanut = %peanut.contract_address,
            claim_url = %peanut.endpoints.claim_url,
            "wallet deployment initialized"
        );

        Ok(Self {
            config,
            tokens,
            networks,
            network,
            peanut,
            bundler_url,
        })
    }

    pub fn fee_recipient(&self) -> Address {
        self.config.fee_recipient
    }
}
