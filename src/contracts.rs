//! Contract client for the Lit chain: PKP NFT minting and PKPPermissions
//! registration of auth methods and Lit Actions.

use crate::config::LitNodeClientConfig;
use crate::error::{Error, Result};
use crate::types::{CustomAuthMethod, Pkp};
use cid::Cid;
use ethers::contract::abigen;
use ethers::middleware::SignerMiddleware;
use ethers::prelude::*;
use ethers::signers::{LocalWallet, Signer};
use ethers::utils::to_checksum;
use std::sync::Arc;
use tracing::info;

/// Auth method / action scope: allowed to sign anything.
pub const SCOPE_SIGN_ANYTHING: u64 = 1;

abigen!(
    PkpNft,
    r#"[
        function mintCost() external view returns (uint256)
        function mintNext(uint256 keyType) external payable returns (uint256)
        function getPubkey(uint256 tokenId) external view returns (bytes)
        function getEthAddress(uint256 tokenId) external view returns (address)
    ]"#
);

abigen!(
    PkpPermissions,
    r#"[
        {"type":"function","name":"addPermittedAuthMethod","stateMutability":"nonpayable","inputs":[{"name":"tokenId","type":"uint256"},{"name":"authMethod","type":"tuple","components":[{"name":"","type":"uint256"},{"name":"","type":"bytes"},{"name":"","type":"bytes"}]},{"name":"scopes","type":"uint256[]"}],"outputs":[]},
        {"type":"function","name":"addPermittedAction","stateMutability":"nonpayable","inputs":[{"name":"tokenId","type":"uint256"},{"name":"ipfsCID","type":"bytes"},{"name":"scopes","type":"uint256[]"}],"outputs":[]},
        {"type":"function","name":"isPermittedAuthMethod","stateMutability":"view","inputs":[{"name":"tokenId","type":"uint256"},{"name":"authMethodType","type":"uint256"},{"name":"id","type":"bytes"}],"outputs":[{"name":"","type":"bool"}]},
        {"type":"function","name":"isPermittedAction","stateMutability":"view","inputs":[{"name":"tokenId","type":"uint256"},{"name":"ipfsCID","type":"bytes"}],"outputs":[{"name":"","type":"bool"}]}
    ]"#
);

type SignerClient = SignerMiddleware<Provider<Http>, LocalWallet>;

pub struct LitContracts {
    pkp_nft: PkpNft<SignerClient>,
    pkp_permissions: PkpPermissions<SignerClient>,
}

impl LitContracts {
    /// Build a contract client over the network RPC with the given EOA as
    /// transaction signer.
    pub async fn connect(config: &LitNodeClientConfig, wallet: LocalWallet) -> Result<Self> {
        let rpc_url = config
            .rpc_url()
            .ok_or_else(|| Error::InvalidNetwork("No RPC URL configured".to_string()))?;

        let provider = Provider::<Http>::try_from(rpc_url.as_str())
            .map_err(|e| Error::Contract(format!("Failed to create provider: {e}")))?;
        let chain_id = provider
            .get_chainid()
            .await
            .map_err(|e| Error::Contract(format!("Failed to get chain id: {e}")))?
            .as_u64();
        let wallet = wallet.with_chain_id(chain_id);
        let signer_address = wallet.address();
        let client = Arc::new(SignerMiddleware::new(provider, wallet));

        let pkp_nft_address: Address = config
            .lit_network
            .pkp_nft_contract_address()
            .ok_or_else(|| Error::InvalidNetwork("No PKP NFT address for network".to_string()))?
            .parse()
            .map_err(|e| Error::Contract(format!("Invalid PKP NFT address: {e}")))?;
        let pkp_permissions_address: Address = config
            .lit_network
            .pkp_permissions_contract_address()
            .ok_or_else(|| {
                Error::InvalidNetwork("No PKPPermissions address for network".to_string())
            })?
            .parse()
            .map_err(|e| Error::Contract(format!("Invalid PKPPermissions address: {e}")))?;

        info!(
            "Connected contract client: signer {}, chain id {}",
            to_checksum(&signer_address, None),
            chain_id
        );

        Ok(Self {
            pkp_nft: PkpNft::new(pkp_nft_address, client.clone()),
            pkp_permissions: PkpPermissions::new(pkp_permissions_address, client),
        })
    }

    /// Mint the next PKP (ECDSA key type 2) and read its public key and eth
    /// address back from the NFT contract.
    pub async fn mint_pkp(&self) -> Result<Pkp> {
        let mint_cost = self
            .pkp_nft
            .mint_cost()
            .call()
            .await
            .map_err(|e| Error::Contract(format!("Failed to read mint cost: {e}")))?;
        info!("PKP mint cost: {} wei", mint_cost);

        let key_type = U256::from(2); // ECDSA
        let call = self.pkp_nft.mint_next(key_type).value(mint_cost);
        let pending = call
            .send()
            .await
            .map_err(|e| Error::Contract(format!("mintNext failed: {e}")))?;
        let receipt = pending
            .await
            .map_err(|e| Error::Contract(format!("mintNext tx dropped: {e}")))?
            .ok_or_else(|| Error::Contract("mintNext produced no receipt".to_string()))?;
        info!("mintNext mined in tx {:?}", receipt.transaction_hash);

        let token_id = token_id_from_receipt(&receipt)?;

        let pubkey = self
            .pkp_nft
            .get_pubkey(token_id)
            .call()
            .await
            .map_err(|e| Error::Contract(format!("getPubkey failed: {e}")))?;
        let eth_address = self
            .pkp_nft
            .get_eth_address(token_id)
            .call()
            .await
            .map_err(|e| Error::Contract(format!("getEthAddress failed: {e}")))?;

        let pkp = Pkp {
            token_id: format!("{token_id:#x}"),
            public_key: format!("0x{}", hex::encode(&pubkey)),
            eth_address: to_checksum(&eth_address, None),
        };
        info!(
            "Minted PKP token {} with address {}",
            pkp.token_id, pkp.eth_address
        );
        Ok(pkp)
    }

    /// Register a custom auth method against the PKP.
    pub async fn add_permitted_auth_method(
        &self,
        pkp_token_id: &str,
        auth_method: &CustomAuthMethod,
        scopes: &[u64],
    ) -> Result<()> {
        let token_id = parse_token_id(pkp_token_id)?;
        let method = (
            U256::from(auth_method.auth_method_type),
            Bytes::from(auth_method.auth_method_id.as_bytes().to_vec()),
            Bytes::default(), // userPubkey, unused for custom methods
        );
        let scopes: Vec<U256> = scopes.iter().copied().map(U256::from).collect();

        let call = self
            .pkp_permissions
            .add_permitted_auth_method(token_id, method, scopes);
        let pending = call
            .send()
            .await
            .map_err(|e| Error::Contract(format!("addPermittedAuthMethod failed: {e}")))?;
        let receipt = pending
            .await
            .map_err(|e| Error::Contract(format!("addPermittedAuthMethod tx dropped: {e}")))?;
        info!(
            "Registered auth method type {} in tx {:?}",
            auth_method.auth_method_type,
            receipt.map(|r| r.transaction_hash)
        );
        Ok(())
    }

    /// Permit a Lit Action, identified by its IPFS CIDv0, to use the PKP.
    pub async fn add_permitted_action(
        &self,
        pkp_token_id: &str,
        ipfs_cid: &str,
        scopes: &[u64],
    ) -> Result<()> {
        let token_id = parse_token_id(pkp_token_id)?;
        let cid = Cid::try_from(ipfs_cid)?;
        // On-chain the action id is the raw multihash bytes behind the CID
        let cid_bytes = Bytes::from(cid.hash().to_bytes());
        let scopes: Vec<U256> = scopes.iter().copied().map(U256::from).collect();

        let call = self
            .pkp_permissions
            .add_permitted_action(token_id, cid_bytes, scopes);
        let pending = call
            .send()
            .await
            .map_err(|e| Error::Contract(format!("addPermittedAction failed: {e}")))?;
        let receipt = pending
            .await
            .map_err(|e| Error::Contract(format!("addPermittedAction tx dropped: {e}")))?;
        info!(
            "Permitted action {} in tx {:?}",
            ipfs_cid,
            receipt.map(|r| r.transaction_hash)
        );
        Ok(())
    }
}

fn parse_token_id(token_id: &str) -> Result<U256> {
    let stripped = token_id.strip_prefix("0x").unwrap_or(token_id);
    U256::from_str_radix(stripped, 16)
        .map_err(|e| Error::Contract(format!("Invalid PKP token id {token_id}: {e}")))
}

fn token_id_from_receipt(receipt: &TransactionReceipt) -> Result<U256> {
    // ERC-721 Transfer(address,address,uint256) with all topics indexed
    let transfer_topic = H256::from(ethers::utils::keccak256(
        "Transfer(address,address,uint256)",
    ));
    receipt
        .logs
        .iter()
        .find(|log| log.topics.len() == 4 && log.topics[0] == transfer_topic)
        .map(|log| U256::from_big_endian(log.topics[3].as_bytes()))
        .ok_or_else(|| Error::Contract("No Transfer event in mint receipt".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_id_round_trips_through_hex() {
        let id = U256::from_dec_str(
            "84947829773024663978155406879717332670591977043709494719039775618253921961159",
        )
        .unwrap();
        let rendered = format!("{id:#x}");
        assert!(rendered.starts_with("0x"));
        assert_eq!(parse_token_id(&rendered).unwrap(), id);
    }

    #[test]
    fn parse_token_id_rejects_garbage() {
        assert!(parse_token_id("not-a-token").is_err());
    }
}
