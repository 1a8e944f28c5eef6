use crate::error::{Error, Result};
use crate::types::{EncryptRequest, EncryptResponse};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use sha2::{Digest, Sha256};
use tracing::debug;

impl super::LitNodeClient {
    /// Encrypt data under the subnet BLS key, bound to the given access
    /// control conditions. Decryption later requires the nodes to agree the
    /// conditions hold.
    pub fn encrypt(&self, params: &EncryptRequest) -> Result<EncryptResponse> {
        if !self.ready {
            return Err(Error::Other(
                "Client not connected. Call connect() first.".to_string(),
            ));
        }

        let subnet_pub_key = self
            .subnet_pub_key
            .as_ref()
            .ok_or_else(|| Error::Other("subnet_pub_key cannot be null".to_string()))?;

        if params.access_control_conditions.is_empty() {
            return Err(Error::Other(
                "You must provide accessControlConditions".to_string(),
            ));
        }

        // The nodes hash the conditions' exact JSON serialization
        let conditions_json = serde_json::to_string(&params.access_control_conditions)
            .map_err(Error::Serialization)?;
        let mut hasher = Sha256::new();
        hasher.update(conditions_json.as_bytes());
        let hash_of_conditions_str = hex::encode(hasher.finalize());
        debug!("hashOfConditionsStr: {}", hash_of_conditions_str);

        let mut hasher = Sha256::new();
        hasher.update(&params.data_to_encrypt);
        let hash_of_private_data_str = hex::encode(hasher.finalize());
        debug!("hashOfPrivateDataStr: {}", hash_of_private_data_str);

        let identity_param = format!(
            "lit-accesscontrolcondition://{}/{}",
            hash_of_conditions_str, hash_of_private_data_str
        );
        debug!("identityParam: {}", identity_param);

        let clean_pub_key = subnet_pub_key.strip_prefix("0x").unwrap_or(subnet_pub_key);
        let ciphertext_bytes = crate::bls::encrypt(
            &hex::decode(clean_pub_key)
                .map_err(|e| Error::Other(format!("Invalid subnet pub key: {e}")))?,
            &params.data_to_encrypt,
            identity_param.as_bytes(),
        )?;

        Ok(EncryptResponse {
            ciphertext: BASE64.encode(&ciphertext_bytes),
            data_to_encrypt_hash: hash_of_private_data_str,
        })
    }
}
