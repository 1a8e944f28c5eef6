use blsful::{Bls12381G2Impl, SignatureShare};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandshakeRequest {
    #[serde(rename = "clientPublicKey")]
    pub client_public_key: String,
    pub challenge: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandshakeResponse {
    #[serde(rename = "serverPublicKey")]
    pub server_pub_key: String,
    #[serde(rename = "subnetPublicKey")]
    pub subnet_pub_key: String,
    #[serde(rename = "networkPublicKey")]
    pub network_pub_key: String,
    #[serde(rename = "networkPublicKeySet")]
    pub network_pub_key_set: String,
    #[serde(rename = "hdRootPubkeys")]
    pub hd_root_pubkeys: Vec<String>,
    #[serde(rename = "latestBlockhash")]
    pub latest_blockhash: String,
    #[serde(rename = "clientSdkVersion", skip_serializing_if = "Option::is_none")]
    pub client_sdk_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attestation: Option<serde_json::Value>,
}

#[derive(Debug, Clone)]
pub struct NodeConnectionInfo {
    pub url: String,
    pub handshake_response: HandshakeResponse,
}

#[derive(Debug, Clone)]
pub struct ConnectionState {
    pub connected_nodes: Vec<String>,
    pub server_keys: HashMap<String, HandshakeResponse>,
    pub subnet_pub_key: Option<String>,
    pub network_pub_key: Option<String>,
    pub network_pub_key_set: Option<String>,
    pub hd_root_pubkeys: Option<Vec<String>>,
    pub latest_blockhash: Option<String>,
}

/// A minted programmable key-pair, keyed by its NFT token id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pkp {
    #[serde(rename = "tokenId")]
    pub token_id: String,
    #[serde(rename = "publicKey")]
    pub public_key: String,
    #[serde(rename = "ethAddress")]
    pub eth_address: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthMethod {
    #[serde(rename = "authMethodType")]
    pub auth_method_type: u32,
    #[serde(rename = "accessToken")]
    pub access_token: String,
}

/// A custom auth method descriptor: an application-chosen type number and an
/// opaque id. The on-chain registration stores the raw id bytes; the Lit
/// Action receives both rendered as 0x-prefixed hex.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomAuthMethod {
    #[serde(rename = "authMethodType")]
    pub auth_method_type: u64,
    #[serde(rename = "authMethodId")]
    pub auth_method_id: String,
}

impl CustomAuthMethod {
    pub fn hex_type(&self) -> String {
        format!("0x{:x}", self.auth_method_type)
    }

    pub fn hex_id(&self) -> String {
        format!("0x{}", hex::encode(self.auth_method_id.as_bytes()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSig {
    pub sig: String,
    #[serde(rename = "derivedVia")]
    pub derived_via: String,
    #[serde(rename = "signedMessage")]
    pub signed_message: String,
    pub address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub algo: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSignature {
    pub sig: String,
    #[serde(rename = "derivedVia")]
    pub derived_via: String,
    #[serde(rename = "signedMessage")]
    pub signed_message: String,
    pub address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub algo: Option<String>,
}

/// Session sigs keyed by the node URL they were issued for.
pub type SessionSignatures = HashMap<String, SessionSignature>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LitAbility {
    PKPSigning,
    LitActionExecution,
}

impl std::fmt::Display for LitAbility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LitAbility::PKPSigning => write!(f, "pkp-signing"),
            LitAbility::LitActionExecution => write!(f, "lit-action-execution"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LitResourceAbilityRequestResource {
    pub resource: String,
    #[serde(rename = "resourcePrefix")]
    pub resource_prefix: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LitResourceAbilityRequest {
    pub resource: LitResourceAbilityRequestResource,
    pub ability: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionKeySignedMessage {
    #[serde(rename = "sessionKey")]
    pub session_key: String,
    #[serde(rename = "resourceAbilityRequests")]
    pub resource_ability_requests: Vec<LitResourceAbilityRequest>,
    pub capabilities: Vec<AuthSig>,
    #[serde(rename = "issuedAt")]
    pub issued_at: String,
    pub expiration: String,
    #[serde(rename = "nodeAddress")]
    pub node_address: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignSessionKeyRequest {
    #[serde(rename = "sessionKey")]
    pub session_key: String,
    #[serde(rename = "authMethods")]
    pub auth_methods: Vec<AuthMethod>,
    #[serde(rename = "pkpPublicKey")]
    pub pkp_public_key: String,
    #[serde(rename = "siweMessage")]
    pub siwe_message: String,
    #[serde(rename = "curveType")]
    pub curve_type: String,
    #[serde(rename = "code", skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(rename = "litActionIpfsId", skip_serializing_if = "Option::is_none")]
    pub lit_action_ipfs_id: Option<String>,
    #[serde(rename = "jsParams", skip_serializing_if = "Option::is_none")]
    pub js_params: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub epoch: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonSignSessionKeyResponseV1 {
    #[serde(rename = "signatureShare")]
    pub signature_share: SignatureShare<Bls12381G2Impl>,
    #[serde(rename = "shareIndex", default)]
    pub share_index: Option<u64>,
    #[serde(rename = "curveType", default)]
    pub curve_type: Option<String>,
    #[serde(rename = "siweMessage")]
    pub siwe_message: String,
    #[serde(rename = "dataSigned")]
    pub data_signed: String,
    #[serde(rename = "blsRootPubkey")]
    pub bls_root_pubkey: String,
}

/// One node's contribution to a threshold ECDSA signature.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignedData {
    #[serde(rename = "sigName", default)]
    pub sig_name: String,
    #[serde(rename = "sigType", default)]
    pub sig_type: String,
    #[serde(rename = "signatureShare")]
    pub signature_share: String,
    #[serde(rename = "bigR", alias = "bigr")]
    pub big_r: String,
    #[serde(rename = "publicKey")]
    pub public_key: String,
    #[serde(rename = "dataSigned")]
    pub data_signed: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeShare {
    pub success: bool,
    #[serde(rename = "signedData", default)]
    pub signed_data: HashMap<String, SignedData>,
    #[serde(rename = "claimData", default)]
    pub claim_data: HashMap<String, serde_json::Value>,
    #[serde(default)]
    pub response: serde_json::Value,
    #[serde(default)]
    pub logs: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PkpSignRequest {
    #[serde(rename = "toSign")]
    pub to_sign: Vec<u8>,
    pub pubkey: String,
    #[serde(rename = "authSig")]
    pub auth_sig: SessionSignature,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub epoch: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PkpSignNodeResponse {
    pub success: bool,
    #[serde(rename = "signatureShare")]
    pub signature_share: SignedData,
}

/// A combined, locally verified ECDSA signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PkpSignResult {
    pub r: String,
    pub s: String,
    pub recid: u8,
    pub signature: String,
    #[serde(rename = "publicKey")]
    pub public_key: String,
    #[serde(rename = "dataSigned")]
    pub data_signed: String,
}

#[derive(Debug, Clone, Default)]
pub struct ExecuteJsParams {
    pub code: Option<String>,
    pub ipfs_id: Option<String>,
    pub session_sigs: SessionSignatures,
    pub auth_methods: Option<Vec<AuthMethod>>,
    pub js_params: Option<serde_json::Value>,
}

#[derive(Debug, Clone)]
pub struct ExecuteJsResponse {
    pub claims: HashMap<String, serde_json::Value>,
    pub signatures: Option<serde_json::Value>,
    pub decryptions: Vec<serde_json::Value>,
    pub response: serde_json::Value,
    pub logs: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnValueTest {
    pub comparator: String,
    pub value: String,
}

/// EVM-basic access control condition, serialized in the exact field order
/// the nodes hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessControlCondition {
    #[serde(rename = "contractAddress")]
    pub contract_address: String,
    #[serde(rename = "standardContractType")]
    pub standard_contract_type: String,
    pub chain: String,
    pub method: String,
    pub parameters: Vec<String>,
    #[serde(rename = "returnValueTest")]
    pub return_value_test: ReturnValueTest,
}

#[derive(Debug, Clone)]
pub struct EncryptRequest {
    pub access_control_conditions: Vec<AccessControlCondition>,
    pub data_to_encrypt: Vec<u8>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncryptResponse {
    pub ciphertext: String,
    #[serde(rename = "dataToEncryptHash")]
    pub data_to_encrypt_hash: String,
}
