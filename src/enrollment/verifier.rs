use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use crate::config::PaymentConfig;
use crate::enrollment::{EnrollmentError, PaymentProof};

/// Outcome of asking the chain whether a matching transfer is finalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Confirmed,
    NotConfirmed { reason: String },
}

/// Boundary to the chain verifier node.
///
/// `Err(VerifierUnavailable)` means the call itself failed (unreachable,
/// timed out) and the client may retry with the same proof. `NotConfirmed`
/// is a hard rejection requiring new proof. Retry/backoff inside the
/// adapter, if any, is its own business.
#[async_trait]
pub trait ChainVerifier: Send + Sync {
    async fn verify(
        &self,
        proof: &PaymentProof,
        expected_recipient: &str,
        expected_amount_minor: u64,
    ) -> Result<Verdict, EnrollmentError>;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VerifyRequest<'a> {
    transaction_hash: Option<&'a str>,
    block_hash: Option<&'a str>,
    recipient: &'a str,
    amount: u64,
}

#[derive(Debug, Deserialize)]
struct VerifyResponse {
    #[serde(default)]
    verified: bool,
    #[serde(default)]
    error: Option<String>,
}

/// Adapter for the verifier node's HTTP `/verify` endpoint.
///
/// The node resolves a transaction hash to its finalized block, scans the
/// block's transfer events, and answers whether one pays at least the
/// expected amount to the expected recipient.
pub struct HttpChainVerifier {
    client: reqwest::Client,
    verify_url: Url,
}

impl HttpChainVerifier {
    pub fn new(config: &PaymentConfig) -> Result<Self, EnrollmentError> {
        let base = Url::parse(&config.verifier_url)
            .map_err(|e| EnrollmentError::VerifierUnavailable(format!("bad verifier URL: {}", e)))?;
        let verify_url = base
            .join("verify")
            .map_err(|e| EnrollmentError::VerifierUnavailable(format!("bad verifier URL: {}", e)))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.verify_timeout_secs))
            .build()
            .map_err(|e| EnrollmentError::VerifierUnavailable(e.to_string()))?;

        Ok(Self { client, verify_url })
    }
}

#[async_trait]
impl ChainVerifier for HttpChainVerifier {
    async fn verify(
        &self,
        proof: &PaymentProof,
        expected_recipient: &str,
        expected_amount_minor: u64,
    ) -> Result<Verdict, EnrollmentError> {
        let body = VerifyRequest {
            transaction_hash: proof.transaction_hash.as_deref(),
            block_hash: proof.block_hash.as_deref(),
            recipient: expected_recipient,
            amount: expected_amount_minor,
        };

        debug!(recipient = expected_recipient, amount = expected_amount_minor, "verifying payment on-chain");

        let response = self
            .client
            .post(self.verify_url.clone())
            .json(&body)
            .send()
            .await
            .map_err(|e| EnrollmentError::VerifierUnavailable(e.to_string()))?;

        let status = response.status();

        if status.is_server_error() {
            warn!(%status, "verifier node returned server error");
            return Err(EnrollmentError::VerifierUnavailable(format!(
                "verifier returned {}",
                status
            )));
        }

        // 404 means the transaction was not found in recent finalized blocks;
        // other 4xx mean the proof itself was unusable. Both need new proof.
        let parsed: VerifyResponse = response
            .json()
            .await
            .map_err(|e| EnrollmentError::VerifierUnavailable(format!("bad verifier response: {}", e)))?;

        if parsed.verified {
            Ok(Verdict::Confirmed)
        } else {
            Ok(Verdict::NotConfirmed {
                reason: parsed
                    .error
                    .unwrap_or_else(|| "no matching transfer found".to_string()),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_request_serializes_camel_case() {
        let body = VerifyRequest {
            transaction_hash: Some("0xabc"),
            block_hash: None,
            recipient: "addrX",
            amount: 100,
        };
        let v = serde_json::to_value(&body).unwrap();
        assert_eq!(v["transactionHash"], "0xabc");
        assert_eq!(v["recipient"], "addrX");
        assert_eq!(v["amount"], 100);
    }

    #[test]
    fn verify_response_tolerates_missing_fields() {
        let parsed: VerifyResponse = serde_json::from_str("{}").unwrap();
        assert!(!parsed.verified);
        assert!(parsed.error.is_none());
    }
}
