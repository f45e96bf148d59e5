//! Static token registry: (token, network) -> contract address and decimals.

use std::collections::HashMap;

use burner_types::{address, Address, ConfigError, Network, Result, TokenId};
use serde::{Deserialize, Serialize};

/// An ERC-20 deployment on a specific network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenDescriptor {
    pub token: TokenId,
    pub network: Network,
    pub address: Address,
    pub decimals: u8,
}

impl TokenDescriptor {
    pub fn symbol(&self) -> &'static str {
        self.token.symbol()
    }
}

/// Immutable lookup table built once at startup.
#[derive(Debug, Clone, Default)]
pub struct TokenRegistry {
    entries: HashMap<(TokenId, Network), TokenDescriptor>,
}

impl TokenRegistry {
    pub fn new(descriptors: impl IntoIterator<Item = TokenDescriptor>) -> Self {
        let entries = descriptors
            .into_iter()
            .map(|d| ((d.token, d.network), d))
            .collect();
        Self { entries }
    }

    /// The deployments this wallet ships with.
    pub fn builtin() -> Self {
        use Network::*;
        use TokenId::*;

        let table = [
            (Usdc, Ethereum, address!("A0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48"), 6),
            (Dai, Ethereum, address!("6B175474E89094C44Da98b954EedeAC495271d0F"), 18),
            (Usdc, Optimism, address!("7F5c764cBc14f9669B88837ca1490cCa17c31607"), 6),
            (Dai, Optimism, address!("DA10009cBd5D07dd0CeCc66161FC93D7c9000da1"), 18),
            (Usdc, OptimismGoerli, address!("7E07E15D2a87A24492740D16f5bdF58c16db0c4E"), 6),
            (Usdc, BaseGoerli, address!("F175520C52418dfE19C8098071a252da48Cd1C19"), 6),
        ];

        Self::new(
            table
                .into_iter()
                .map(|(token, network, address, decimals)| TokenDescriptor {
                    token,
                    network,
                    address,
                    decimals,
                }),
        )
    }

    /// Look up a token deployment. A miss is a configuration error.
    pub fn lookup(&self, token: TokenId, network: Network) -> Result<&TokenDescriptor> {
        self.entries
            .get(&(token, network))
            .ok_or_else(|| ConfigError::UnknownToken { token, network }.into())
    }

    /// Tokens available on a network, sorted by symbol.
    pub fn tokens_on(&self, network: Network) -> Vec<&TokenDescriptor> {
        let mut tokens: Vec<_> = self
            .entries
            .values()
            .filter(|d| d.network == network)
            .collect();
        tokens.sort_by_key(|d| d.symbol());
        tokens
    }

    /// Fail fast if any of `pairs` is missing.
    pub fn require_all(&self, pairs: &[(TokenId, Network)]) -> Result<()> {
        for &(token, network) in pairs {
            self.lookup(token, network)?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
