use ethers::signers::{LocalWallet, Signer};
use ethers::utils::to_checksum;
use lit_pkp_harness::auth::{load_wallet_from_env, EthWalletProvider};
use lit_pkp_harness::{LitNodeClient, LitNodeClientConfig};
use siwe::Message;

#[tokio::test]
async fn test_eth_wallet_auth_method_shape() {
    let wallet = LocalWallet::new(&mut rand::thread_rng());
    let client =
        LitNodeClient::new(LitNodeClientConfig::default()).expect("Failed to create client");

    let auth_method = EthWalletProvider::authenticate(&wallet, &client)
        .await
        .expect("Failed to authenticate wallet");

    assert_eq!(auth_method.auth_method_type, 1);

    let auth_sig: serde_json::Value =
        serde_json::from_str(&auth_method.access_token).expect("Access token must be JSON");
    assert_eq!(auth_sig["derivedVia"], "web3.eth.personal.sign");
    assert!(auth_sig["sig"].as_str().unwrap_or("").starts_with("0x"));

    // The signed message must be a valid SIWE message
    let signed_message = auth_sig["signedMessage"]
        .as_str()
        .expect("signedMessage must be a string");
    let parsed: Message = signed_message.parse().expect("SIWE message must parse");
    assert_eq!(parsed.chain_id, 1);
}

#[test]
fn test_load_wallet_from_env() {
    // Well-known test vector key, never funded
    std::env::set_var(
        "ETHEREUM_PRIVATE_KEY",
        "0x4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318",
    );
    let wallet = load_wallet_from_env().expect("Failed to load wallet from env");
    assert_eq!(
        to_checksum(&wallet.address(), None),
        "0x2c7536E3605D9C16a7a3D7b1898e529396a65c23"
    );
}
