use crate::error::{Error, Result};
use crate::types::{ExecuteJsParams, ExecuteJsResponse, NodeShare, SessionSignature, SessionSignatures};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use reqwest::Client;
use std::collections::HashMap;
use tracing::{debug, info, warn};

impl super::LitNodeClient {
    pub async fn execute_js(&self, params: ExecuteJsParams) -> Result<ExecuteJsResponse> {
        if !self.ready {
            return Err(Error::Other("Client not connected".to_string()));
        }
        if params.code.is_none() && params.ipfs_id.is_none() {
            return Err(Error::Other(
                "Either code or ipfsId must be provided".to_string(),
            ));
        }

        let request_id = self.generate_request_id();
        info!("Executing Lit Action with request ID: {}", request_id);

        let node_urls = self.connected_nodes();
        let min_responses = node_urls.len() * 2 / 3;
        let http_client = &self.http_client;

        let futures: Vec<_> = node_urls
            .iter()
            .map(|node_url| {
                let node_url = node_url.clone();
                let params = params.clone();
                let request_id = request_id.clone();
                async move {
                    let result =
                        Self::execute_js_node_request(http_client, &node_url, &params, &request_id)
                            .await;
                    (node_url, result)
                }
            })
            .collect();

        let results = futures::future::join_all(futures).await;

        let mut node_responses = Vec::new();
        for (node_url, result) in results {
            match result {
                Ok(response) => {
                    info!("Got response from node: {}", node_url);
                    node_responses.push(response);
                }
                Err(e) => {
                    warn!("Failed to get response from node {}: {}", node_url, e);
                }
            }
        }

        if node_responses.len() < min_responses {
            return Err(Error::Other(format!(
                "Not enough successful responses. Got {}, need {}",
                node_responses.len(),
                min_responses
            )));
        }

        let most_common_response = self.find_most_common_response(&node_responses)?;
        let has_signed_data = !most_common_response.signed_data.is_empty();
        let has_claim_data = !most_common_response.claim_data.is_empty();

        if !has_signed_data && !has_claim_data {
            return Ok(ExecuteJsResponse {
                claims: HashMap::new(),
                signatures: None,
                decryptions: vec![],
                response: most_common_response.response,
                logs: most_common_response.logs,
            });
        }

        let threshold = self.connected_nodes().len() * 2 / 3;
        let combined_signatures = crate::ecdsa::combine_execute_signatures(&node_responses, threshold)?;

        Ok(ExecuteJsResponse {
            claims: most_common_response.claim_data,
            signatures: combined_signatures,
            decryptions: vec![],
            response: most_common_response.response,
            logs: most_common_response.logs,
        })
    }

    async fn execute_js_node_request(
        http_client: &Client,
        node_url: &str,
        params: &ExecuteJsParams,
        request_id: &str,
    ) -> Result<NodeShare> {
        let endpoint = format!("{}/web/execute", node_url);
        let session_sig = Self::get_session_sig_by_url(&params.session_sigs, node_url)?;

        let mut request_body = serde_json::json!({ "authSig": session_sig });
        if let Some(code) = &params.code {
            let encoded_code = BASE64.encode(code.as_bytes());
            request_body["code"] = serde_json::Value::String(encoded_code);
        }
        if let Some(ipfs_id) = &params.ipfs_id {
            request_body["ipfsId"] = serde_json::Value::String(ipfs_id.clone());
        }
        if let Some(auth_methods) = &params.auth_methods {
            request_body["authMethods"] =
                serde_json::to_value(auth_methods).map_err(Error::Serialization)?;
        }
        if let Some(js_params) = &params.js_params {
            request_body["jsParams"] = js_params.clone();
        }
        debug!("Sending execute request to {}: {}", endpoint, request_body);

        let response = http_client
            .post(&endpoint)
            .header("X-Request-Id", request_id)
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .json(&request_body)
            .send()
            .await
            .map_err(Error::Network)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read body".to_string());
            warn!("Execute JS failed with status {}: {}", status, body);
            return Err(Error::Other(format!("HTTP {} - {}", status, body)));
        }

        let response_body = response.text().await.map_err(Error::Network)?;
        info!("Execute JS response from {}: {}", node_url, response_body);

        let node_response: NodeShare = serde_json::from_str(&response_body).map_err(|e| {
            warn!("Failed to parse execute JS response: {}", e);
            Error::Serialization(e)
        })?;
        Ok(node_response)
    }

    fn find_most_common_response(&self, responses: &[NodeShare]) -> Result<NodeShare> {
        if responses.is_empty() {
            return Err(Error::Other(
                "No responses to find consensus from".to_string(),
            ));
        }
        // First successful response stands in for true content-hash consensus
        for response in responses {
            if response.success {
                return Ok(response.clone());
            }
        }
        Ok(responses[0].clone())
    }

    fn get_session_sig_by_url(
        session_sigs: &SessionSignatures,
        url: &str,
    ) -> Result<SessionSignature> {
        if session_sigs.is_empty() {
            return Err(Error::Other("You must pass in sessionSigs".to_string()));
        }
        let session_sig = session_sigs.get(url).ok_or_else(|| {
            Error::Other(format!(
                "You passed sessionSigs but we could not find session sig for node {}",
                url
            ))
        })?;
        Ok(session_sig.clone())
    }
}
