use lit_pkp_harness::state::{HarnessState, StateStore, StoredSession, STATE_NAMESPACE};
use lit_pkp_harness::types::{CustomAuthMethod, Pkp, SessionSignature};
use lit_pkp_harness::wrapped_keys::WrappedKey;
use std::collections::HashMap;

fn sample_state() -> HarnessState {
    let mut session_sigs = HashMap::new();
    session_sigs.insert(
        "https://15.235.83.220:7470".to_string(),
        SessionSignature {
            sig: "deadbeef".to_string(),
            derived_via: "litSessionSignViaNacl".to_string(),
            signed_message: "{}".to_string(),
            address: "aabbcc".to_string(),
            algo: Some("ed25519".to_string()),
        },
    );

    HarnessState {
        pkp: Some(Pkp {
            token_id: "0xbbe1cec8".to_string(),
            public_key: "0x043a10aa".to_string(),
            eth_address: "0x5187C6a2C1ad443Ab958531d39dd5af7EB3823f1".to_string(),
        }),
        custom_auth_method: Some(CustomAuthMethod {
            auth_method_type: 89989,
            auth_method_id: "app-id-xxx:user-id-yyy".to_string(),
        }),
        lit_action_code: Some("(async () => {})();".to_string()),
        ipfs_hash: Some("QmYwAPJzv5CZsnA625s3Xf2nemtYgPpHdWEz79ojWnPbdG".to_string()),
        permitted_auth_method_added: true,
        lit_action_permitted: true,
        session: Some(StoredSession {
            session_sigs,
            expiration: "2099-01-01T00:00:00.000Z".to_string(),
        }),
        pkp_sign_result: None,
        wrapped_key: Some(WrappedKey {
            pkp_address: "0x5187C6a2C1ad443Ab958531d39dd5af7EB3823f1".to_string(),
            public_key: "0x04bb".to_string(),
            ciphertext: "bG9ja2Vk".to_string(),
            data_to_encrypt_hash: "beef".to_string(),
        }),
        wrapped_key_action_response: None,
    }
}

#[test]
fn test_state_round_trips_through_disk() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let store = StateStore::new(dir.path());

    let state = sample_state();
    store.save(&state).expect("Failed to save state");

    assert!(store.path().ends_with(format!("{STATE_NAMESPACE}.json")));

    let reloaded = store.load();
    assert_eq!(reloaded.pkp, state.pkp);
    assert_eq!(reloaded.custom_auth_method, state.custom_auth_method);
    assert_eq!(reloaded.ipfs_hash, state.ipfs_hash);
    assert!(reloaded.permitted_auth_method_added);
    assert!(reloaded.lit_action_permitted);
    let session = reloaded.session.expect("Session must survive reload");
    assert_eq!(session.expiration, "2099-01-01T00:00:00.000Z");
    assert_eq!(session.session_sigs.len(), 1);
    assert_eq!(reloaded.wrapped_key, state.wrapped_key);
}

#[test]
fn test_saved_state_uses_camel_case_keys() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let store = StateStore::new(dir.path());
    store.save(&sample_state()).expect("Failed to save state");

    let raw = std::fs::read_to_string(store.path()).expect("Failed to read state file");
    assert!(raw.contains("\"customAuthMethod\""));
    assert!(raw.contains("\"ipfsHash\""));
    assert!(raw.contains("\"permittedAuthMethodAdded\""));
    assert!(raw.contains("\"tokenId\""));
    assert!(!raw.contains("\"auth_method_type\""));
}

#[test]
fn test_clear_removes_state_file() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let store = StateStore::new(dir.path());
    store.save(&sample_state()).expect("Failed to save state");
    assert!(store.path().exists());

    store.clear().expect("Failed to clear state");
    assert!(!store.path().exists());
    assert!(store.load().pkp.is_none());
}
