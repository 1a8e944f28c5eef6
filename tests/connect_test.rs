use lit_pkp_harness::{LitNetwork, LitNodeClient, LitNodeClientConfig};
use std::time::Duration;

// Live network test: opt in with LIT_LIVE_TEST=1.
#[tokio::test]
async fn test_connect_to_datil_dev() {
    if std::env::var("LIT_LIVE_TEST").is_err() {
        println!("Skipping live connect test (set LIT_LIVE_TEST=1 to run)");
        return;
    }

    let config = LitNodeClientConfig {
        lit_network: LitNetwork::DatilDev,
        connect_timeout: Duration::from_secs(30),
        ..Default::default()
    };

    let mut client = LitNodeClient::new(config).expect("Failed to create client");
    client.connect().await.expect("Failed to connect");

    assert!(client.is_ready());
    let connected_nodes = client.connected_nodes();
    println!("Connected to {} nodes:", connected_nodes.len());
    for node in &connected_nodes {
        println!("  - {}", node);
    }
    assert!(connected_nodes.len() >= 2);

    let state = client.get_connection_state();
    assert!(state.subnet_pub_key.is_some());
    assert!(state.network_pub_key.is_some());
    assert!(state.network_pub_key_set.is_some());
    assert!(state.latest_blockhash.is_some());
}
