//! HTTP client for the peanut claim relayer.
//!
//! Endpoints:
//! - POST /peanut/claim

use std::time::Duration;

use burner_claim::ClaimDescriptor;
use burner_config::RelayerEndpoints;
use burner_types::{Address, Result, TxHash, WalletError};
use serde::{Deserialize, Serialize};
use url::Url;

/// Relayer API response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayerResponse<T> {
    pub code: Option<i32>,
    pub message: Option<String>,
    pub user_message: Option<String>,
    pub data: Option<T>,
}

/// Body of a claim request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimRequest {
    pub chain_id: u64,
    pub contract_version: String,
    pub deposit_index: u64,
    pub password: String,
    pub recipient_address: Address,
}

impl ClaimRequest {
    /// Reject descriptors that cannot name a deposit.
    pub fn from_descriptor(descriptor: &ClaimDescriptor, recipient: Address) -> Result<Self> {
        if !descriptor.has_chain() {
            return Err(WalletError::InvalidClaim("link does not name a chain".into()));
        }
        let contract_version = descriptor
            .contract_version
            .clone()
            .filter(|v| !v.is_empty())
            .ok_or_else(|| WalletError::InvalidClaim("link has no contract version".into()))?;
        let deposit_index = descriptor
            .deposit_index
            .ok_or_else(|| WalletError::InvalidClaim("link has no deposit index".into()))?;
        let password = descriptor
            .password
            .clone()
            .filter(|p| !p.is_empty())
            .ok_or_else(|| WalletError::InvalidClaim("link has no password".into()))?;

        Ok(Self {
            chain_id: descriptor.chain_id,
            contract_version,
            deposit_index,
            password,
            recipient_address: recipient,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClaimData {
    tx_hash: TxHash,
}

/// Relayer client for gasless claims.
pub struct RelayerClient {
    claim_url: Url,
    client: reqwest::Client,
    timeout: Duration,
}

impl RelayerClient {
    pub fn new(endpoints: &RelayerEndpoints, timeout_ms: Option<u64>) -> Self {
        let timeout = Duration::from_millis(timeout_ms.unwrap_or(30_000));
        Self {
            claim_url: endpoints.claim_url.clone(),
            client: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
            timeout,
        }
    }

    pub fn claim_url(&self) -> &Url {
        &self.claim_url
    }

    /// Ask the relayer to claim the deposit to `recipient`.
    ///
    /// POST /peanut/claim
    pub async fn claim(&self, descriptor: &ClaimDescriptor, recipient: Address) -> Result<TxHash> {
        let request = ClaimRequest::from_descriptor(descriptor, recipient)?;

        tracing::info!(
            chain = request.chain_id,
            version = %request.contract_version,
            deposit = request.deposit_index,
            %recipient,
            "submitting claim"
        );

        let resp = self
            .client
            .post(self.claim_url.clone())
            .json(&request)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| WalletError::Relayer(format!("claim request failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(WalletError::Relayer(format!(
                "relayer returned status {status}: {body}"
            )));
        }

        let body: RelayerResponse<ClaimData> = resp
            .json()
            .await
            .map_err(|e| WalletError::Relayer(format!("failed to parse relayer response: {e}")))?;

        match body.data {
            Some(data) => Ok(data.tx_hash),
            None => Err(WalletError::Relayer(
                body.user_message
                    .or(body.message)
                    .unwrap_or_else(|| "relayer returned no transaction".into()),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burner_types::{address, B256};
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const RECIPIENT: Address = address!("00000000000000000000000000000000000000aa");

    fn descriptor() -> ClaimDescriptor {
        ClaimDescriptor {
            chain_id: 10,
            contract_version: Some("v3".into()),
            deposit_index: Some(4),
            password: Some("hunter2".into()),
        }
    }

    fn client_for(server: &MockServer) -> RelayerClient {
        let endpoints = RelayerEndpoints::from_base(&server.uri()).unwrap();
        RelayerClient::new(&endpoints, Some(5_000))
    }

    #[test]
    fn test_claim_request_validation() {
        assert!(ClaimRequest::from_descriptor(&descriptor(), RECIPIENT).is_ok());

        let cases: [fn(&mut ClaimDescriptor); 4] = [
            |d| d.chain_id = 0,
            |d| d.contract_version = None,
            |d| d.deposit_index = None,
            |d| d.password = Some(String::new()),
        ];
        for mutate in cases {
            let mut d = descriptor();
            mutate(&mut d);
            assert!(matches!(
                ClaimRequest::from_descriptor(&d, RECIPIENT),
                Err(WalletError::InvalidClaim(_))
            ));
        }
    }

    #[tokio::test]
    async fn test_claim_posts_request() {
        let server = MockServer::start().await;
        let tx = B256::repeat_byte(0x42);
        Mock::given(method("POST"))
            .and(path("/peanut/claim"))
            .and(body_json(json!({
                "chainId": 10,
                "contractVersion": "v3",
                "depositIndex": 4,
                "password": "hunter2",
                "recipientAddress": RECIPIENT
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "code": 0,
                "data": { "txHash": tx }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let hash = client_for(&server).claim(&descriptor(), RECIPIENT).await.unwrap();
        assert_eq!(hash, tx);
    }

    #[tokio::test]
    async fn test_claim_without_data_reports_user_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/peanut/claim"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "code": 4001,
                "message": "deposit already claimed",
                "userMessage": "This link has already been used"
            })))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .claim(&descriptor(), RECIPIENT)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            WalletError::Relayer(ref m) if m == "This link has already been used"
        ));
    }

    #[tokio::test]
    async fn test_invalid_claim_never_reaches_relayer() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let mut d = descriptor();
        d.chain_id = 0;
        let err = client_for(&server).claim(&d, RECIPIENT).await.unwrap_err();
        assert!(matches!(err, WalletError::InvalidClaim(_)));
    }
}
