//! Client-side combination of threshold ECDSA (K256) signature shares
//! returned by the nodes.

use crate::error::{Error, Result};
use crate::types::{NodeShare, PkpSignResult, SignedData};
use elliptic_curve::{ops::Reduce, scalar::IsHigh, subtle::ConditionallySelectable, PrimeField};
use k256::{elliptic_curve::point::AffineCoordinates, AffinePoint, ProjectivePoint, Scalar};
use std::collections::HashMap;
use tracing::{info, warn};

/// Combine one named group of shares into a full signature and verify it
/// locally against the share's public key.
pub fn combine_and_verify(shares: &[SignedData], threshold: usize) -> Result<PkpSignResult> {
    let valid_shares: Vec<_> = shares
        .iter()
        .filter(|share| share.data_signed != "fail" && !share.signature_share.is_empty())
        .cloned()
        .collect();

    if valid_shares.len() < threshold.max(1) {
        return Err(Error::Other(format!(
            "Not enough valid signature shares. Got {} valid shares (total {}), need {}",
            valid_shares.len(),
            shares.len(),
            threshold.max(1)
        )));
    }

    let first_share = &valid_shares[0];
    if first_share.sig_type != "K256" && !first_share.sig_type.is_empty() {
        return Err(Error::Other(format!(
            "Unsupported signature type: {}",
            first_share.sig_type
        )));
    }

    let mut parsed_shares = Vec::new();
    let mut public_key = None;
    let mut presignature_big_r = None;
    let mut msg_hash = None;
    for share in &valid_shares {
        match serde_json::from_str::<Scalar>(&share.signature_share) {
            Ok(sig_share) => {
                parsed_shares.push(sig_share);
                if public_key.is_none() {
                    public_key = serde_json::from_str::<AffinePoint>(&share.public_key).ok();
                    presignature_big_r = serde_json::from_str::<AffinePoint>(&share.big_r).ok();
                    msg_hash = serde_json::from_str::<Scalar>(&share.data_signed).ok();
                }
            }
            Err(e) => warn!("Failed to parse signature share: {}", e),
        }
    }

    if parsed_shares.len() < threshold.max(1) {
        return Err(Error::Other(format!(
            "Not enough parseable signature shares. Got {}, need {}",
            parsed_shares.len(),
            threshold.max(1)
        )));
    }

    let (pub_key, big_r, hash) = match (public_key, presignature_big_r, msg_hash) {
        (Some(p), Some(r), Some(h)) => (p, r, h),
        _ => {
            return Err(Error::Other(
                "Missing required data to combine signature shares".to_string(),
            ))
        }
    };

    let (s, was_flipped) = combine_signature_shares_k256(parsed_shares)?;
    if !verify_signature(&pub_key, &hash, &big_r, &s) {
        return Err(Error::Other(
            "Combined signature verification failed".to_string(),
        ));
    }

    convert_signature_to_result(&big_r, &s, was_flipped, first_share)
}

/// Combine signature groups from a set of execute-js node responses, keyed by
/// signature name.
pub fn combine_execute_signatures(
    node_responses: &[NodeShare],
    threshold: usize,
) -> Result<Option<serde_json::Value>> {
    let mut signatures_by_name: HashMap<String, Vec<SignedData>> = HashMap::new();
    for response in node_responses {
        if !response.success {
            continue;
        }
        for signed_data in response.signed_data.values() {
            signatures_by_name
                .entry(signed_data.sig_name.clone())
                .or_default()
                .push(signed_data.clone());
        }
    }
    if signatures_by_name.is_empty() {
        return Ok(None);
    }

    let mut combined_signatures = HashMap::new();
    for (sig_name, sig_shares) in signatures_by_name {
        match combine_and_verify(&sig_shares, threshold) {
            Ok(result) => {
                info!("Successfully combined and verified signature for {}", sig_name);
                combined_signatures.insert(sig_name, serde_json::to_value(result)?);
            }
            Err(e) => {
                warn!("Failed to combine signature shares for {}: {}", sig_name, e);
            }
        }
    }

    if combined_signatures.is_empty() {
        Ok(None)
    } else {
        Ok(Some(serde_json::to_value(combined_signatures)?))
    }
}

fn combine_signature_shares_k256(signature_shares: Vec<Scalar>) -> Result<(Scalar, bool)> {
    if signature_shares.is_empty() {
        return Err(Error::Other("No signature shares provided".to_string()));
    }
    let mut s: Scalar = signature_shares.into_iter().sum();
    let was_flipped = s.is_high().into();
    s.conditional_assign(&(-s), s.is_high());
    Ok((s, was_flipped))
}

fn verify_signature(
    public_key: &AffinePoint,
    msg_hash: &Scalar,
    big_r: &AffinePoint,
    s: &Scalar,
) -> bool {
    let r = <Scalar as Reduce<k256::U256>>::reduce_bytes(&big_r.x());
    if r.is_zero().into() || s.is_zero().into() {
        return false;
    }
    let s_inv = match Option::<Scalar>::from(s.invert()) {
        Some(inv) => inv,
        None => return false,
    };
    if msg_hash.is_zero().into() {
        return false;
    }
    let public_key_proj = ProjectivePoint::from(*public_key);
    let generator = ProjectivePoint::GENERATOR;
    let reproduced = (generator * (*msg_hash * s_inv)) + (public_key_proj * (r * s_inv));
    let reproduced_affine = reproduced.to_affine();
    let reproduced_r = <Scalar as Reduce<k256::U256>>::reduce_bytes(&reproduced_affine.x());
    reproduced_r == r
}

fn convert_signature_to_result(
    big_r: &AffinePoint,
    s: &Scalar,
    was_flipped: bool,
    first_share: &SignedData,
) -> Result<PkpSignResult> {
    let r = <Scalar as Reduce<k256::U256>>::reduce_bytes(&big_r.x());
    let r_hex = hex::encode(r.to_repr());
    let s_hex = hex::encode(s.to_repr());
    let mut recid = if big_r.y_is_odd().into() { 1u8 } else { 0u8 };
    if was_flipped {
        recid = 1 - recid;
    }
    let signature_hex = format!("0x{}{}", r_hex, s_hex);

    // Node fields arrive JSON-quoted; unwrap where possible.
    let public_key_clean = match serde_json::from_str::<String>(&first_share.public_key) {
        Ok(pk) => pk.strip_prefix("0x").unwrap_or(&pk).to_string(),
        Err(_) => first_share
            .public_key
            .strip_prefix("0x")
            .unwrap_or(&first_share.public_key)
            .to_string(),
    };
    let data_signed_clean = match serde_json::from_str::<String>(&first_share.data_signed) {
        Ok(ds) => ds,
        Err(_) => first_share.data_signed.clone(),
    };

    info!(
        "Converted signature for {}: r={}, s={}, recid={}",
        first_share.sig_name,
        &r_hex[..16],
        &s_hex[..16],
        recid
    );

    Ok(PkpSignResult {
        r: r_hex,
        s: s_hex,
        recid,
        signature: signature_hex,
        public_key: public_key_clean,
        data_signed: data_signed_clean,
    })
}
