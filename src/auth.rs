use crate::{
    error::{Error, Result},
    types::AuthMethod,
    LitNodeClient,
};
use ethers::signers::{LocalWallet, Signer};
use ethers::utils::to_checksum;
use serde_json::json;
use siwe::Message;
use tracing::info;

pub struct EthWalletProvider;

impl EthWalletProvider {
    /// Authenticate an EOA wallet via SIWE, producing an eth-wallet auth
    /// method usable in node requests.
    pub async fn authenticate(
        wallet: &LocalWallet,
        _lit_node_client: &LitNodeClient,
    ) -> Result<AuthMethod> {
        let address = to_checksum(&wallet.address(), None);

        let nonce = format!("0x{}", hex::encode(rand::random::<[u8; 32]>()));
        let issued_at = chrono::Utc::now().to_rfc3339();
        let expiration = (chrono::Utc::now() + chrono::Duration::hours(24)).to_rfc3339();

        let siwe_message = format!(
            "localhost wants you to sign in with your Ethereum account:\n{}\n\n\nURI: http://localhost\nVersion: 1\nChain ID: 1\nNonce: {}\nIssued At: {}\nExpiration Time: {}",
            address, nonce, issued_at, expiration
        );

        // ensure the message will be parsed correctly
        let parsed_message: Message = siwe_message
            .parse()
            .map_err(|e| Error::Other(format!("Invalid SIWE message: {e}")))?;
        info!("Parsed message: {:?}", parsed_message);

        let signature = wallet
            .sign_message(siwe_message.as_bytes())
            .await
            .map_err(|e| Error::Other(format!("Failed to sign SIWE message: {e}")))?;
        let sig_hex = format!("0x{}", hex::encode(signature.to_vec()));

        let auth_sig = json!({
            "sig": sig_hex,
            "derivedVia": "web3.eth.personal.sign",
            "signedMessage": siwe_message,
            "address": address,
        });

        Ok(AuthMethod {
            auth_method_type: 1, // EthWallet
            access_token: auth_sig.to_string(),
        })
    }
}

pub fn load_wallet_from_env() -> Result<LocalWallet> {
    dotenvy::dotenv().ok();

    let private_key = std::env::var("ETHEREUM_PRIVATE_KEY")
        .map_err(|_| Error::Other("ETHEREUM_PRIVATE_KEY environment variable not set".to_string()))?;

    private_key
        .parse()
        .map_err(|e| Error::Other(format!("Invalid private key: {e}")))
}
