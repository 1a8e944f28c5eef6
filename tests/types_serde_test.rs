use lit_pkp_harness::types::{
    CustomAuthMethod, Pkp, SessionSignature, SignSessionKeyRequest,
};

#[test]
fn test_pkp_parses_node_json() {
    // The exact shape produced by a mint and stored between runs
    let json = r#"{
        "tokenId": "0xbbe1cec8b28ae50a8f9df13674f4b4b7270d4e62381ffcea9b623a9a4de3b36f",
        "publicKey": "0x043a10aaaa34c60dfd70c1f1c0d1f8c645dca60e3f9f4cf2c683e3e3e3f0f6cba8",
        "ethAddress": "0x5187C6a2C1ad443Ab958531d39dd5af7EB3823f1"
    }"#;

    let pkp: Pkp = serde_json::from_str(json).expect("Failed to parse PKP");
    assert!(pkp.token_id.starts_with("0x"));
    assert!(pkp.public_key.starts_with("0x04"));
    assert_eq!(pkp.eth_address, "0x5187C6a2C1ad443Ab958531d39dd5af7EB3823f1");

    let rendered = serde_json::to_value(&pkp).expect("Failed to render PKP");
    assert!(rendered.get("tokenId").is_some());
    assert!(rendered.get("ethAddress").is_some());
    assert!(rendered.get("token_id").is_none());
}

#[test]
fn test_custom_auth_method_hex_rendering() {
    let method = CustomAuthMethod {
        auth_method_type: 89989,
        auth_method_id: "app-id-xxx:user-id-yyy".to_string(),
    };
    assert_eq!(method.hex_type(), "0x15f85");
    assert_eq!(
        method.hex_id(),
        "0x6170702d69642d7878783a757365722d69642d797979"
    );

    let json = serde_json::to_value(&method).expect("Failed to render auth method");
    assert_eq!(json["authMethodType"], 89989);
    assert_eq!(json["authMethodId"], "app-id-xxx:user-id-yyy");
}

#[test]
fn test_sign_session_key_request_omits_absent_fields() {
    let request = SignSessionKeyRequest {
        session_key: "lit:session:aabb".to_string(),
        auth_methods: vec![],
        pkp_public_key: "0x04aa".to_string(),
        siwe_message: "localhost wants you to sign in...".to_string(),
        curve_type: "BLS".to_string(),
        code: None,
        lit_action_ipfs_id: None,
        js_params: None,
        epoch: None,
    };

    let json = serde_json::to_value(&request).expect("Failed to render request");
    assert!(json.get("code").is_none());
    assert!(json.get("litActionIpfsId").is_none());
    assert!(json.get("jsParams").is_none());
    assert!(json.get("epoch").is_none());
    assert_eq!(json["curveType"], "BLS");

    let with_code = SignSessionKeyRequest {
        code: Some("KGFzeW5jICgpID0+IHt9KSgpOw==".to_string()),
        js_params: Some(serde_json::json!({"sigName": "custom-auth-sig"})),
        ..request
    };
    let json = serde_json::to_value(&with_code).expect("Failed to render request");
    assert_eq!(json["code"], "KGFzeW5jICgpID0+IHt9KSgpOw==");
    assert_eq!(json["jsParams"]["sigName"], "custom-auth-sig");
}

#[test]
fn test_session_signature_wire_shape() {
    let json = r#"{
        "sig": "3046aabb",
        "derivedVia": "litSessionSignViaNacl",
        "signedMessage": "{\"sessionKey\":\"aabb\"}",
        "address": "ccdd",
        "algo": "ed25519"
    }"#;

    let sig: SessionSignature = serde_json::from_str(json).expect("Failed to parse session sig");
    assert_eq!(sig.derived_via, "litSessionSignViaNacl");
    assert_eq!(sig.algo.as_deref(), Some("ed25519"));

    let rendered = serde_json::to_value(&sig).expect("Failed to render session sig");
    assert!(rendered.get("derivedVia").is_some());
    assert!(rendered.get("signedMessage").is_some());
}
