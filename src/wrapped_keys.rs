//! Import of an externally generated private key into the network's custodial
//! ("wrapped key") storage, gated by a PKP-address access control condition.

use crate::client::LitNodeClient;
use crate::error::{Error, Result};
use crate::types::{
    AccessControlCondition, EncryptRequest, ReturnValueTest, SessionSignatures,
};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Salt prefix applied before encryption so decrypting actions can recognize
/// a well-formed plaintext.
pub const LIT_PREFIX: &str = "lit_";

#[derive(Debug, Clone)]
pub struct ImportPrivateKeyParams {
    pub private_key: String,
    pub public_key: String,
    pub key_type: String,
    pub memo: Option<String>,
}

/// The stored record of an imported key: enough to run the decrypt action
/// against the same ciphertext later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WrappedKey {
    #[serde(rename = "pkpAddress")]
    pub pkp_address: String,
    #[serde(rename = "publicKey")]
    pub public_key: String,
    pub ciphertext: String,
    #[serde(rename = "dataToEncryptHash")]
    pub data_to_encrypt_hash: String,
}

#[derive(Debug, Clone, Serialize)]
struct StorePrivateKeyRequest {
    ciphertext: String,
    #[serde(rename = "dataToEncryptHash")]
    data_to_encrypt_hash: String,
    #[serde(rename = "publicKey")]
    public_key: String,
    #[serde(rename = "keyType")]
    key_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    memo: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct StorePrivateKeyResponse {
    #[serde(rename = "pkpAddress")]
    pkp_address: String,
}

/// The access control condition that restricts wrapped-key decryption to the
/// owning PKP's address.
pub fn pkp_access_control_condition(pkp_eth_address: &str) -> AccessControlCondition {
    AccessControlCondition {
        contract_address: String::new(),
        standard_contract_type: String::new(),
        chain: "ethereum".to_string(),
        method: String::new(),
        parameters: vec![":userAddress".to_string()],
        return_value_test: ReturnValueTest {
            comparator: "=".to_string(),
            value: pkp_eth_address.to_string(),
        },
    }
}

/// The Lit Action that uses an imported key: decrypts it on a single node
/// (gated by the PKP-address condition), strips the salt prefix, and reports
/// whether a usable key came back.
pub fn decrypt_wrapped_key_action() -> &'static str {
    r#"(async () => {
    const LIT_PREFIX = 'lit_';

    let decryptedPrivateKey;
    try {
        decryptedPrivateKey = await Lit.Actions.decryptToSingleNode({
            accessControlConditions,
            ciphertext,
            dataToEncryptHash,
            chain: 'ethereum',
            authSig: null,
        });
    } catch (error) {
        Lit.Actions.setResponse({
            response: JSON.stringify({ error: error.message }),
        });
        return;
    }

    if (!decryptedPrivateKey) {
        Lit.Actions.setResponse({
            response: JSON.stringify({ error: "Failed to decrypt private key" }),
        });
        return;
    }

    const privateKey = decryptedPrivateKey.startsWith(LIT_PREFIX)
        ? decryptedPrivateKey.slice(LIT_PREFIX.length)
        : decryptedPrivateKey;

    Lit.Actions.setResponse({
        response: JSON.stringify({ decrypted: privateKey.length > 0 }),
    });
})();"#
}

/// jsParams for [`decrypt_wrapped_key_action`]: the same access control
/// condition the key was encrypted under, plus the stored ciphertext.
pub fn decrypt_wrapped_key_js_params(wrapped_key: &WrappedKey) -> serde_json::Value {
    serde_json::json!({
        "accessControlConditions": [pkp_access_control_condition(&wrapped_key.pkp_address)],
        "ciphertext": wrapped_key.ciphertext,
        "dataToEncryptHash": wrapped_key.data_to_encrypt_hash,
    })
}

impl LitNodeClient {
    /// Encrypt a raw private key under the network key, bound to the PKP's
    /// address, and submit it to the wrapped-keys service. Returns the stored
    /// record, including the PKP address the key is now custodied under.
    pub async fn import_wrapped_key(
        &self,
        session_sigs: &SessionSignatures,
        pkp_eth_address: &str,
        params: ImportPrivateKeyParams,
    ) -> Result<WrappedKey> {
        let service_url = self
            .config
            .lit_network
            .wrapped_keys_service_url()
            .ok_or_else(|| {
                Error::InvalidNetwork("No wrapped keys service for network".to_string())
            })?;

        // Any one session sig authorizes the request; pick deterministically.
        let session_sig = session_sigs
            .iter()
            .min_by(|a, b| a.0.cmp(b.0))
            .map(|(_, sig)| sig)
            .ok_or_else(|| Error::Other("You must pass in sessionSigs".to_string()))?;

        let salted_key = format!("{LIT_PREFIX}{}", params.private_key);
        let encrypted = self.encrypt(&EncryptRequest {
            access_control_conditions: vec![pkp_access_control_condition(pkp_eth_address)],
            data_to_encrypt: salted_key.into_bytes(),
        })?;

        let request = StorePrivateKeyRequest {
            ciphertext: encrypted.ciphertext.clone(),
            data_to_encrypt_hash: encrypted.data_to_encrypt_hash.clone(),
            public_key: params.public_key.clone(),
            key_type: params.key_type,
            memo: params.memo,
        };

        let endpoint = format!("{}/encrypted/private_key", service_url);
        info!("Storing wrapped key via {}", endpoint);

        let response = self
            .http_client
            .post(&endpoint)
            .header("pkp-session-sig", serde_json::to_string(session_sig)?)
            .header("lit-network", self.config.lit_network.name())
            .header("x-correlation-id", self.generate_request_id())
            .json(&request)
            .send()
            .await
            .map_err(Error::Network)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read body".to_string());
            return Err(Error::Other(format!(
                "Wrapped keys service returned HTTP {} - {}",
                status, body
            )));
        }

        let parsed: StorePrivateKeyResponse = response.json().await.map_err(Error::Network)?;
        info!("Wrapped key stored for PKP address {}", parsed.pkp_address);
        Ok(WrappedKey {
            pkp_address: parsed.pkp_address,
            public_key: params.public_key,
            ciphertext: encrypted.ciphertext,
            data_to_encrypt_hash: encrypted.data_to_encrypt_hash,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decrypt_action_reads_js_params_globals() {
        let source = decrypt_wrapped_key_action();
        assert!(source.contains("decryptToSingleNode"));
        assert!(source.contains("accessControlConditions"));
        assert!(source.contains("dataToEncryptHash"));
        assert!(source.contains("LIT_PREFIX"));
    }

    #[test]
    fn decrypt_js_params_carry_condition_and_ciphertext() {
        let wrapped_key = WrappedKey {
            pkp_address: "0x5187C6a2C1ad443Ab958531d39dd5af7EB3823f1".to_string(),
            public_key: "0x04aa".to_string(),
            ciphertext: "bG9ja2Vk".to_string(),
            data_to_encrypt_hash: "beef".to_string(),
        };
        let params = decrypt_wrapped_key_js_params(&wrapped_key);
        assert_eq!(params["ciphertext"], "bG9ja2Vk");
        assert_eq!(params["dataToEncryptHash"], "beef");
        assert_eq!(
            params["accessControlConditions"][0]["returnValueTest"]["value"],
            "0x5187C6a2C1ad443Ab958531d39dd5af7EB3823f1"
        );
    }

    #[test]
    fn pkp_condition_matches_node_hashing_shape() {
        let acc = pkp_access_control_condition("0x5187C6a2C1ad443Ab958531d39dd5af7EB3823f1");
        let json = serde_json::to_string(&vec![acc]).unwrap();
        assert_eq!(
            json,
            r#"[{"contractAddress":"","standardContractType":"","chain":"ethereum","method":"","parameters":[":userAddress"],"returnValueTest":{"comparator":"=","value":"0x5187C6a2C1ad443Ab958531d39dd5af7EB3823f1"}}]"#
        );
    }
}
