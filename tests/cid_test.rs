use cid::Cid;
use lit_pkp_harness::ipfs::string_to_cid_v0;

#[test]
fn test_cid_v0_shape_and_determinism() {
    let code = "const go = async () => { Lit.Actions.setResponse({ response: \"true\" }); }; go();";

    let first = string_to_cid_v0(code).expect("Failed to derive CID");
    let second = string_to_cid_v0(code).expect("Failed to derive CID");

    assert!(first.starts_with("Qm"), "CIDv0 must be base58btc Qm...: {first}");
    assert_eq!(first.len(), 46);
    assert_eq!(first, second, "CID derivation must be deterministic");

    let other = string_to_cid_v0("something else entirely").expect("Failed to derive CID");
    assert_ne!(first, other);
}

#[test]
fn test_cid_v0_matches_ipfs_add() {
    // Reference CIDs produced by `ipfs add --only-hash`
    assert_eq!(
        string_to_cid_v0("hello world").expect("Failed to derive CID"),
        "Qmf412jQZiuVUtdgnB36FXFX7xg5V6KEbSJ4dpQuhkLyfD"
    );
    assert_eq!(
        string_to_cid_v0("").expect("Failed to derive CID"),
        "QmbFMke1KXqnYyBBWxB74N4c5SBnJMVAiMNRcGu6x1AwQH"
    );
}

#[test]
fn test_cid_v0_is_sha2_256_multihash() {
    let cid_str = string_to_cid_v0("hello world").expect("Failed to derive CID");
    let cid = Cid::try_from(cid_str.as_str()).expect("Derived CID must parse");

    assert_eq!(cid.version(), cid::Version::V0);
    // sha2-256 multihash: code 0x12, 32-byte digest
    assert_eq!(cid.hash().code(), 0x12);
    assert_eq!(cid.hash().size(), 32);
}

#[test]
fn test_cid_v0_rejects_oversized_content() {
    let oversized = "a".repeat(300_000);
    assert!(string_to_cid_v0(&oversized).is_err());
}
