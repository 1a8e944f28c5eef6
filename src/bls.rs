use crate::error::Result;
use crate::types::JsonSignSessionKeyResponseV1;
use blsful::{Bls12381G2Impl, PublicKey, Signature, SignatureSchemes};

pub fn combine(
    signature_shares: &[JsonSignSessionKeyResponseV1],
) -> Result<Signature<Bls12381G2Impl>> {
    let shares = signature_shares
        .iter()
        .map(|s| s.signature_share.clone())
        .collect::<Vec<_>>();
    let sig = Signature::from_shares(&shares)?;
    Ok(sig)
}

pub fn verify(
    public_key: &[u8],
    message: &[u8],
    signature: &Signature<Bls12381G2Impl>,
) -> Result<()> {
    let pk = PublicKey::try_from(public_key)?;
    signature.verify(&pk, message)?;
    Ok(())
}

pub fn encrypt(encryption_key: &[u8], message: &[u8], identity: &[u8]) -> Result<Vec<u8>> {
    let ek = PublicKey::<Bls12381G2Impl>::try_from(encryption_key)?;
    let ciphertext =
        ek.encrypt_time_lock(SignatureSchemes::ProofOfPossession, message, identity)?;
    let ciphertext = serde_bare::to_vec(&ciphertext)?;
    Ok(ciphertext)
}
