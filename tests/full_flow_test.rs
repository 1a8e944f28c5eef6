use lit_pkp_harness::auth::load_wallet_from_env;
use lit_pkp_harness::config::LitNodeClientConfig;
use lit_pkp_harness::runner::{RunnerConfig, StepRunner};
use lit_pkp_harness::state::StateStore;

// Full end-to-end run against datil-dev. Needs a funded EOA; opt in with
// LIT_LIVE_TEST=1 and ETHEREUM_PRIVATE_KEY set.
#[tokio::test]
async fn test_full_step_sequence() {
    dotenvy::dotenv().ok();
    if std::env::var("LIT_LIVE_TEST").is_err() {
        println!("Skipping live full-flow test (set LIT_LIVE_TEST=1 to run)");
        return;
    }
    let wallet = match load_wallet_from_env() {
        Ok(wallet) => wallet,
        Err(_) => {
            println!("Skipping live full-flow test (ETHEREUM_PRIVATE_KEY not set)");
            return;
        }
    };

    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let store = StateStore::new(dir.path());
    let config = RunnerConfig {
        node: LitNodeClientConfig::default(),
        wallet: Some(wallet.clone()),
    };

    let mut runner = StepRunner::new(config, store);
    runner.run_all().await.expect("Run failed");

    let state = &runner.state;
    assert!(state.pkp.is_some(), "PKP should be minted");
    assert!(state.custom_auth_method.is_some());
    assert!(state.lit_action_code.is_some());
    assert!(
        state.ipfs_hash.as_deref().unwrap_or("").starts_with("Qm"),
        "Action CID should be a CIDv0"
    );
    assert!(state.permitted_auth_method_added);
    assert!(state.lit_action_permitted);
    assert!(state.session.is_some(), "Session sigs should be derived");

    let sign_result = state.pkp_sign_result.as_ref().expect("PKP sign should succeed");
    println!("Combined signature: {}", sign_result.signature);
    assert!(!sign_result.r.is_empty());
    assert!(!sign_result.s.is_empty());

    let wrapped_key = state.wrapped_key.as_ref().expect("Wrapped key should be imported");
    assert!(!wrapped_key.ciphertext.is_empty());
    let action_response = state
        .wrapped_key_action_response
        .as_ref()
        .expect("Wrapped key action should run after import");
    println!("Wrapped key action response: {}", action_response);

    // Second run over the same state: everything idempotent should skip
    let store = StateStore::new(dir.path());
    let config = RunnerConfig {
        node: LitNodeClientConfig::default(),
        wallet: Some(wallet),
    };
    let mut rerun = StepRunner::new(config, store);
    rerun.run_all().await.expect("Rerun failed");
    assert_eq!(rerun.state.pkp, runner.state.pkp, "Rerun must not re-mint");
}
