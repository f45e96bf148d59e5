//! Peanut claim-contract deployments and relayer endpoints.

use burner_types::{address, Address, ConfigError, Result};
use url::Url;

pub const PEANUT_CLAIM_PATH: &str = "/peanut/claim";
pub const PAYMASTER_PATH: &str = "/paymaster";

/// Address of the peanut v3 claim contract on `chain_id`.
pub fn peanut_address(chain_id: u64) -> Result<Address> {
    match chain_id {
        1 => Ok(address!("dB60C736A30C41D9df0081057Eae73C3eb119895")),
        10 => Ok(address!("1aBe03DC4706aE47c4F2ae04EEBe5c8607c74e17")),
        420 => Ok(address!("DC608f2Bc4f0AFf02D12d51Ca8b543B343525c8a")),
        // shares the optimism-goerli deployment
        84531 => Ok(address!("DC608f2Bc4f0AFf02D12d51Ca8b543B343525c8a")),
        other => Err(ConfigError::UnsupportedChain(other).into()),
    }
}

/// Endpoints derived from the relayer base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayerEndpoints {
    pub claim_url: Url,
    pub paymaster_url: Url,
}

impl RelayerEndpoints {
    /// Join the fixed paths onto `base`. The paths are absolute, so any path on
    /// `base` is replaced.
    pub fn from_base(base: &str) -> Result<Self> {
        let invalid = |reason: String| ConfigError::InvalidRelayerUrl(format!("{base}: {reason}"));

        let base = Url::parse(base.trim()).map_err(|e| invalid(e.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(invalid("not a hierarchical url".into()).into());
        }
        let claim_url = base
            .join(PEANUT_CLAIM_PATH)
            .map_err(|e| invalid(e.to_string()))?;
        let paymaster_url = base
            .join(PAYMASTER_PATH)
            .map_err(|e| invalid(e.to_string()))?;

        Ok(Self {
            claim_url,
            paymaster_url,
        })
    }
}

/// The claim contract and relayer endpoints for the active chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeanutDeployment {
    pub chain_id: u64,
    pub contract_address: Address,
    pub endpoints: RelayerEndpoints,
}

impl PeanutDeployment {
    pub fn resolve(chain_id: u64, relayer_base: &str) -> Result<Self> {
        Ok(Self {
            chain_id,
            contract_address: peanut_address(chain_id)?,
            endpoints: RelayerEndpoints::from_base(relayer_base)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burner_types::WalletError;

    #[test]
    fn test_mainnet_address() {
        assert_eq!(
            peanut_address(1).unwrap(),
            address!("dB60C736A30C41D9df0081057Eae73C3eb119895")
        );
    }

    #[test]
    fn test_goerli_chains_share_deployment() {
        assert_eq!(peanut_address(420).unwrap(), peanut_address(84531).unwrap());
        assert_ne!(peanut_address(1).unwrap(), peanut_address(10).unwrap());
    }

    #[test]
    fn test_unsupported_chain() {
        let err = peanut_address(137).unwrap_err();
        assert!(matches!(
            err,
            WalletError::Config(ConfigError::UnsupportedChain(137))
        ));
    }

    #[test]
    fn test_endpoints_replace_base_path() {
        let endpoints = RelayerEndpoints::from_base("https://relay.example.org/v1/").unwrap();
        assert_eq!(
            endpoints.claim_url.as_str(),
            "https://relay.example.org/peanut/claim"
        );
        assert_eq!(
            endpoints.paymaster_url.as_str(),
            "https://relay.example.org/paymaster"
        );
    }

    #[test]
    fn test_endpoints_reject_relative_or_opaque_base() {
        for bad in ["relay.example.org", "/relay", "", "mailto:ops@example.org"] {
            let err = RelayerEndpoints::from_base(bad).unwrap_err();
            assert!(
                matches!(err, WalletError::Config(ConfigError::InvalidRelayerUrl(_))),
                "expected invalid relayer url for {bad:?}"
            );
        }
    }

    #[test]
    fn test_deployment_resolution_fails_for_unsupported_chain() {
        assert!(PeanutDeployment::resolve(10, "https://relay.example.org").is_ok());
        assert!(PeanutDeployment::resolve(5, "https://relay.example.org").is_err());
        assert!(PeanutDeployment::resolve(10, "not a url").is_err());
    }
}
