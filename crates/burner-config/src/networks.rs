//! Static network table: network identifier -> chain id and RPC endpoint.

use std::collections::HashMap;

use burner_types::{ConfigError, Network, Result};
use serde::{Deserialize, Serialize};
use url::Url;

/// Everything the gateway needs to reach a chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkHandle {
    pub network: Network,
    pub chain_id: u64,
    pub rpc_url: Url,
}

#[derive(Debug, Clone, Default)]
pub struct NetworkResolver {
    handles: HashMap<Network, NetworkHandle>,
}

impl NetworkResolver {
    pub fn new(handles: impl IntoIterator<Item = NetworkHandle>) -> Self {
        Self {
            handles: handles.into_iter().map(|h| (h.network, h)).collect(),
        }
    }

    pub fn builtin() -> Result<Self> {
        let table = [
            (Network::Ethereum, 1, "https://cloudflare-eth.com"),
            (Network::Optimism, 10, "https://mainnet.optimism.io"),
            (Network::OptimismGoerli, 420, "https://goerli.optimism.io"),
            (Network::BaseGoerli, 84531, "https://goerli.base.org"),
        ];

        let mut handles = Vec::with_capacity(table.len());
        for (network, chain_id, rpc) in table {
            let rpc_url = Url::parse(rpc).map_err(|e| ConfigError::InvalidSetting {
                key: "rpc_url",
                reason: format!("{network}: {e}"),
            })?;
            handles.push(NetworkHandle {
                network,
                chain_id,
                rpc_url,
            });
        }
        Ok(Self::new(handles))
    }

    /// Resolve a network. A miss is a configuration error.
    pub fn resolve(&self, network: Network) -> Result<&NetworkHandle> {
        self.handles
            .get(&network)
            .ok_or_else(|| ConfigError::UnknownNetwork(network.to_string()).into())
    }

    /// Replace the RPC endpoint of a configured network.
    pub fn with_rpc_url(mut self, network: Network, rpc_url: Url) -> Self {
        if let Some(handle) = self.handles.get_mut(&network) {
            handle.rpc_url = rpc_url;
        }
        self
    }
}
