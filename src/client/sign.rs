use crate::error::{Error, Result};
use crate::types::{PkpSignNodeResponse, PkpSignRequest, PkpSignResult, SessionSignatures};
use tokio::time::timeout;
use tracing::{info, warn};

impl super::LitNodeClient {
    /// Sign `to_sign` with the PKP. Every connected node is asked for an
    /// ECDSA share, authorized by its session sig; shares are combined and
    /// verified client-side.
    pub async fn pkp_sign(
        &self,
        pkp_public_key: &str,
        to_sign: &[u8],
        session_sigs: &SessionSignatures,
    ) -> Result<PkpSignResult> {
        if !self.ready {
            return Err(Error::Other("Client not connected".to_string()));
        }
        if session_sigs.is_empty() {
            return Err(Error::Other("You must pass in sessionSigs".to_string()));
        }

        let request_id = self.generate_request_id();
        info!("PKP signing with request ID: {}", request_id);

        let mut shares = Vec::new();
        for node_url in self.connected_nodes() {
            let session_sig = match session_sigs.get(&node_url) {
                Some(sig) => sig.clone(),
                None => {
                    warn!("No session sig for node {}", node_url);
                    continue;
                }
            };

            let endpoint = format!("{}/web/pkp/sign/v1", node_url);
            let request = PkpSignRequest {
                to_sign: to_sign.to_vec(),
                pubkey: pkp_public_key.to_string(),
                auth_sig: session_sig,
                epoch: None,
            };

            let response = timeout(
                self.config.connect_timeout,
                self.http_client
                    .post(&endpoint)
                    .header("X-Request-Id", request_id.clone())
                    .json(&request)
                    .send(),
            )
            .await
            .map_err(|_| Error::ConnectionTimeout)?
            .map_err(Error::Network)?;

            if !response.status().is_success() {
                let status = response.status();
                let body = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unable to read body".to_string());
                warn!("PKP sign failed with status {}: {}", status, body);
                continue;
            }

            let response_body = response.text().await.map_err(Error::Network)?;
            info!("PKP sign response from {}: {}", node_url, response_body);

            match serde_json::from_str::<PkpSignNodeResponse>(&response_body) {
                Ok(node_response) if node_response.success => {
                    shares.push(node_response.signature_share);
                }
                Ok(_) => warn!("Node {} reported sign failure", node_url),
                Err(e) => warn!("Failed to parse PKP sign response: {}", e),
            }
        }

        let threshold = self.connected_nodes().len() * 2 / 3;
        if shares.len() < threshold.max(1) {
            return Err(Error::Other(format!(
                "Not enough successful sign responses. Got {}, need {}",
                shares.len(),
                threshold.max(1)
            )));
        }

        crate::ecdsa::combine_and_verify(&shares, threshold)
    }
}
