//! Claim-link redemption through the peanut relayer.

use burner_claim::{ClaimDescriptor, ClaimLinkCodec};
use burner_config::Deployment;
use burner_tx::RelayerClient;
use burner_types::{Address, Result, TxHash, WalletError};
use url::Url;

/// Decodes claim links and redeems them on the deployment's chain.
pub struct ClaimRedeemer {
    codec: ClaimLinkCodec,
    relayer: RelayerClient,
    chain_id: u64,
}

impl ClaimRedeemer {
    pub fn new(codec: ClaimLinkCodec, relayer: RelayerClient, chain_id: u64) -> Self {
        Self {
            codec,
            relayer,
            chain_id,
        }
    }

    /// `claim_page` is both the base for new links and the location decoded
    /// when `redeem` gets no explicit link.
    pub fn from_deployment(deployment: &Deployment, claim_page: Url) -> Self {
        Self::new(
            ClaimLinkCodec::new(claim_page),
            RelayerClient::new(
                &deployment.peanut.endpoints,
                Some(deployment.config.request_timeout_ms),
            ),
            deployment.network.chain_id,
        )
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Shareable link for a deposit.
    pub fn create_link(&self, descriptor: &ClaimDescriptor) -> Url {
        self.codec.encode(descriptor)
    }

    /// Decode `link` and check it targets this deployment's chain.
    pub fn inspect(&self, link: Option<&str>) -> Result<ClaimDescriptor> {
        let descriptor = self.codec.decode(link)?;
        if !descriptor.has_chain() {
            return Err(WalletError::InvalidClaim("link does not name a chain".into()));
        }
        if descriptor.chain_id != self.chain_id {
            return Err(WalletError::InvalidClaim(format!(
                "link is for chain {}, wallet is on chain {}",
                descriptor.chain_id, self.chain_id
            )));
        }
        Ok(descriptor)
    }

    /// Claim the deposit behind `link` to `recipient` and return the relayer's
    /// transaction hash.
    pub async fn redeem(&self, link: Option<&str>, recipient: Address) -> Result<TxHash> {
        let descriptor = self.inspect(link)?;
        let tx = self.relayer.claim(&descriptor, recipient).await?;
        tracing::info!(chain = self.chain_id, %recipient, %tx, "claim submitted");
        Ok(tx)
    }
}
