use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LitNetwork {
    DatilDev,
    DatilTest,
    Datil,
    Custom,
}

impl LitNetwork {
    pub fn name(&self) -> &'static str {
        match self {
            LitNetwork::DatilDev => "datil-dev",
            LitNetwork::DatilTest => "datil-test",
            LitNetwork::Datil => "datil",
            LitNetwork::Custom => "custom",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "datil-dev" => Some(LitNetwork::DatilDev),
            "datil-test" => Some(LitNetwork::DatilTest),
            "datil" => Some(LitNetwork::Datil),
            "custom" => Some(LitNetwork::Custom),
            _ => None,
        }
    }

    pub fn rpc_url(&self) -> Option<&'static str> {
        match self {
            LitNetwork::DatilDev => Some("https://yellowstone-rpc.litprotocol.com/"),
            LitNetwork::DatilTest => Some("https://yellowstone-rpc.litprotocol.com/"),
            LitNetwork::Datil => Some("https://yellowstone-rpc.litprotocol.com/"),
            LitNetwork::Custom => None,
        }
    }

    pub fn bootstrap_urls(&self) -> Option<Vec<String>> {
        match self {
            LitNetwork::DatilDev => Some(vec![
                "https://15.235.83.220:7470".to_string(),
                "https://15.235.83.220:7471".to_string(),
                "https://15.235.83.220:7472".to_string(),
            ]),
            _ => None,
        }
    }

    pub fn pkp_nft_contract_address(&self) -> Option<&'static str> {
        match self {
            LitNetwork::DatilDev => Some("0x02C4242F72d62c8fEF2b2DB088A35a9F4ec741C7"),
            LitNetwork::DatilTest => Some("0x6a0f439f064B7167A8Ea6B22AcC07ae5360ee0d1"),
            LitNetwork::Datil => Some("0x487A9D096BB4B7Ac1520Cb12370e31e677B175EA"),
            LitNetwork::Custom => None,
        }
    }

    pub fn pkp_permissions_contract_address(&self) -> Option<&'static str> {
        match self {
            LitNetwork::DatilDev => Some("0xf64638F1eb3b064f5443F7c9e2Dc050ed535D891"),
            LitNetwork::DatilTest => Some("0x60C1ddC8b9e38F730F0e7B70A2F84C1A98A69167"),
            LitNetwork::Datil => Some("0x213Db6E1446928E19588269bEF7dFc9187c4829A"),
            LitNetwork::Custom => None,
        }
    }

    pub fn wrapped_keys_service_url(&self) -> Option<&'static str> {
        match self {
            LitNetwork::Custom => None,
            _ => Some("https://wrapped.litprotocol.com"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LitNodeClientConfig {
    pub lit_network: LitNetwork,
    pub alert_when_unauthorized: bool,
    pub min_node_count: Option<usize>,
    pub debug: bool,
    pub connect_timeout: Duration,
    pub check_node_attestation: bool,
    pub rpc_url: Option<String>,
    pub bootstrap_urls: Option<Vec<String>>,
}

impl Default for LitNodeClientConfig {
    fn default() -> Self {
        Self {
            lit_network: LitNetwork::DatilDev,
            alert_when_unauthorized: true,
            min_node_count: None,
            debug: false,
            connect_timeout: Duration::from_millis(20000),
            check_node_attestation: false,
            rpc_url: None,
            bootstrap_urls: None,
        }
    }
}

impl LitNodeClientConfig {
    pub fn rpc_url(&self) -> Option<String> {
        self.rpc_url
            .clone()
            .or_else(|| self.lit_network.rpc_url().map(str::to_string))
    }
}
