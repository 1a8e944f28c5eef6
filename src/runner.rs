//! The step runner: a fixed ordered sequence of calls against the node
//! network, the contracts and the wrapped-keys service, with persisted state
//! guarding the steps that must run at most once. Step failures are logged
//! and swallowed so later independent steps still get their chance.

use crate::action;
use crate::client::LitNodeClient;
use crate::config::LitNodeClientConfig;
use crate::contracts::{LitContracts, SCOPE_SIGN_ANYTHING};
use crate::error::{Error, Result};
use crate::ipfs;
use crate::state::{HarnessState, StateStore, StoredSession};
use crate::types::{
    CustomAuthMethod, ExecuteJsParams, LitAbility, LitResourceAbilityRequest,
    LitResourceAbilityRequestResource,
};
use crate::wrapped_keys::{self, ImportPrivateKeyParams};
use ethers::signers::LocalWallet;
use ethers::utils::keccak256;
use tracing::{info, warn};

pub const CUSTOM_AUTH_METHOD_TYPE: u64 = 89989;
pub const CUSTOM_AUTH_METHOD_ID: &str = "app-id-xxx:user-id-yyy";
pub const CUSTOM_AUTH_SIG_NAME: &str = "custom-auth-sig";

/// Session sigs are requested with a short fixed lifetime, per demo policy.
const SESSION_LIFETIME_SECS: i64 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    ConnectNodeClient,
    ConnectContracts,
    MintPkp,
    CreateCustomAuthMethod,
    AddPermittedAuthMethod,
    CreateLitActionCode,
    ComputeActionCid,
    PermitLitAction,
    GetSessionSigs,
    PkpSign,
    ImportWrappedKey,
    UseWrappedKey,
}

impl Step {
    pub const ALL: [Step; 12] = [
        Step::ConnectNodeClient,
        Step::ConnectContracts,
        Step::MintPkp,
        Step::CreateCustomAuthMethod,
        Step::AddPermittedAuthMethod,
        Step::CreateLitActionCode,
        Step::ComputeActionCid,
        Step::PermitLitAction,
        Step::GetSessionSigs,
        Step::PkpSign,
        Step::ImportWrappedKey,
        Step::UseWrappedKey,
    ];

    pub fn description(&self) -> &'static str {
        match self {
            Step::ConnectNodeClient => "Connect LitNodeClient",
            Step::ConnectContracts => "Connect LitContracts",
            Step::MintPkp => "Mint a PKP",
            Step::CreateCustomAuthMethod => "Create a custom auth method",
            Step::AddPermittedAuthMethod => "Add permitted auth method",
            Step::CreateLitActionCode => "Create Lit Action code",
            Step::ComputeActionCid => "Convert Lit Action to IPFS CID",
            Step::PermitLitAction => "Permit Lit Action",
            Step::GetSessionSigs => "Get session sigs",
            Step::PkpSign => "PKP sign",
            Step::ImportWrappedKey => "Import wrapped key",
            Step::UseWrappedKey => "Execute Lit Action with wrapped key",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Completed,
    Skipped,
}

#[derive(Clone)]
pub struct RunnerConfig {
    pub node: LitNodeClientConfig,
    pub wallet: Option<LocalWallet>,
}

pub struct StepRunner {
    config: RunnerConfig,
    store: StateStore,
    pub state: HarnessState,
    node_client: Option<LitNodeClient>,
    contracts: Option<LitContracts>,
}

impl StepRunner {
    pub fn new(config: RunnerConfig, store: StateStore) -> Self {
        let state = store.load();
        Self {
            config,
            store,
            state,
            node_client: None,
            contracts: None,
        }
    }

    /// Run every step in order. Per-step failures are logged and swallowed;
    /// the sequence always runs to the end.
    pub async fn run_all(&mut self) -> Result<()> {
        for (index, step) in Step::ALL.iter().enumerate() {
            info!("Executing step {}: {}", index + 1, step.description());
            match self.execute(*step).await {
                Ok(StepOutcome::Completed) => {}
                Ok(StepOutcome::Skipped) => {
                    info!("{} already done, skipping step.", step.description());
                }
                Err(e) => {
                    warn!("Error in step \"{}\": {}", step.description(), e);
                }
            }
        }
        Ok(())
    }

    pub async fn execute(&mut self, step: Step) -> Result<StepOutcome> {
        match step {
            Step::ConnectNodeClient => self.connect_node_client().await,
            Step::ConnectContracts => self.connect_contracts().await,
            Step::MintPkp => self.mint_pkp().await,
            Step::CreateCustomAuthMethod => self.create_custom_auth_method(),
            Step::AddPermittedAuthMethod => self.add_permitted_auth_method().await,
            Step::CreateLitActionCode => self.create_lit_action_code(),
            Step::ComputeActionCid => self.compute_action_cid(),
            Step::PermitLitAction => self.permit_lit_action().await,
            Step::GetSessionSigs => self.get_session_sigs().await,
            Step::PkpSign => self.pkp_sign().await,
            Step::ImportWrappedKey => self.import_wrapped_key().await,
            Step::UseWrappedKey => self.use_wrapped_key().await,
        }
    }

    async fn connect_node_client(&mut self) -> Result<StepOutcome> {
        if self.node_client.is_some() {
            return Ok(StepOutcome::Skipped);
        }
        let mut client = LitNodeClient::new(self.config.node.clone())?;
        client.connect().await?;
        self.node_client = Some(client);
        Ok(StepOutcome::Completed)
    }

    async fn connect_contracts(&mut self) -> Result<StepOutcome> {
        if self.contracts.is_some() {
            return Ok(StepOutcome::Skipped);
        }
        let wallet = self
            .config
            .wallet
            .clone()
            .ok_or_else(|| Error::Other("No EOA wallet configured".to_string()))?;
        let contracts = LitContracts::connect(&self.config.node, wallet).await?;
        self.contracts = Some(contracts);
        Ok(StepOutcome::Completed)
    }

    async fn mint_pkp(&mut self) -> Result<StepOutcome> {
        if self.state.pkp.is_some() {
            return Ok(StepOutcome::Skipped);
        }
        let contracts = self.contracts()?;
        let pkp = contracts.mint_pkp().await?;
        self.state.pkp = Some(pkp);
        self.store.save(&self.state)?;
        Ok(StepOutcome::Completed)
    }

    fn create_custom_auth_method(&mut self) -> Result<StepOutcome> {
        if self.state.custom_auth_method.is_some() {
            return Ok(StepOutcome::Skipped);
        }
        self.state.custom_auth_method = Some(CustomAuthMethod {
            auth_method_type: CUSTOM_AUTH_METHOD_TYPE,
            auth_method_id: CUSTOM_AUTH_METHOD_ID.to_string(),
        });
        self.store.save(&self.state)?;
        Ok(StepOutcome::Completed)
    }

    async fn add_permitted_auth_method(&mut self) -> Result<StepOutcome> {
        if self.state.permitted_auth_method_added {
            return Ok(StepOutcome::Skipped);
        }
        let pkp_token_id = self.require_pkp()?.token_id.clone();
        let auth_method = self
            .state
            .custom_auth_method
            .clone()
            .ok_or_else(|| Error::Other("No custom auth method created yet".to_string()))?;
        let contracts = self.contracts()?;
        contracts
            .add_permitted_auth_method(&pkp_token_id, &auth_method, &[SCOPE_SIGN_ANYTHING])
            .await?;
        self.state.permitted_auth_method_added = true;
        self.store.save(&self.state)?;
        Ok(StepOutcome::Completed)
    }

    fn create_lit_action_code(&mut self) -> Result<StepOutcome> {
        if self.state.lit_action_code.is_some() {
            return Ok(StepOutcome::Skipped);
        }
        let auth_method = self
            .state
            .custom_auth_method
            .as_ref()
            .ok_or_else(|| Error::Other("No custom auth method created yet".to_string()))?;
        self.state.lit_action_code = Some(action::custom_auth_action(auth_method));
        self.store.save(&self.state)?;
        Ok(StepOutcome::Completed)
    }

    fn compute_action_cid(&mut self) -> Result<StepOutcome> {
        if self.state.ipfs_hash.is_some() {
            return Ok(StepOutcome::Skipped);
        }
        let code = self
            .state
            .lit_action_code
            .as_ref()
            .ok_or_else(|| Error::Other("No Lit Action code created yet".to_string()))?;
        self.state.ipfs_hash = Some(ipfs::string_to_cid_v0(code)?);
        self.store.save(&self.state)?;
        Ok(StepOutcome::Completed)
    }

    async fn permit_lit_action(&mut self) -> Result<StepOutcome> {
        if self.state.lit_action_permitted {
            return Ok(StepOutcome::Skipped);
        }
        let pkp_token_id = self.require_pkp()?.token_id.clone();
        let ipfs_hash = self
            .state
            .ipfs_hash
            .clone()
            .ok_or_else(|| Error::Other("No Lit Action CID computed yet".to_string()))?;
        let contracts = self.contracts()?;
        contracts
            .add_permitted_action(&pkp_token_id, &ipfs_hash, &[SCOPE_SIGN_ANYTHING])
            .await?;
        self.state.lit_action_permitted = true;
        self.store.save(&self.state)?;
        Ok(StepOutcome::Completed)
    }

    async fn get_session_sigs(&mut self) -> Result<StepOutcome> {
        if let Some(session) = &self.state.session {
            if !session.is_expired(chrono::Utc::now()) {
                return Ok(StepOutcome::Skipped);
            }
        }
        let pkp = self.require_pkp()?.clone();
        let auth_method = self
            .state
            .custom_auth_method
            .clone()
            .ok_or_else(|| Error::Other("No custom auth method created yet".to_string()))?;
        let code = self
            .state
            .lit_action_code
            .clone()
            .ok_or_else(|| Error::Other("No Lit Action code created yet".to_string()))?;
        let client = self.node_client()?;

        let resource_ability_requests = vec![
            LitResourceAbilityRequest {
                resource: LitResourceAbilityRequestResource {
                    resource: "*".to_string(),
                    resource_prefix: "lit-pkp".to_string(),
                },
                ability: LitAbility::PKPSigning.to_string(),
            },
            LitResourceAbilityRequest {
                resource: LitResourceAbilityRequestResource {
                    resource: "*".to_string(),
                    resource_prefix: "lit-litaction".to_string(),
                },
                ability: LitAbility::LitActionExecution.to_string(),
            },
        ];

        let expiration = (chrono::Utc::now() + chrono::Duration::seconds(SESSION_LIFETIME_SECS))
            .to_rfc3339_opts(chrono::SecondsFormat::Millis, true);
        let js_params =
            action::custom_auth_js_params(&pkp.public_key, &auth_method, CUSTOM_AUTH_SIG_NAME);

        let session_sigs = client
            .get_lit_action_session_sigs(
                &pkp,
                &code,
                js_params,
                resource_ability_requests,
                &expiration,
            )
            .await?;

        self.state.session = Some(StoredSession {
            session_sigs,
            expiration,
        });
        self.store.save(&self.state)?;
        Ok(StepOutcome::Completed)
    }

    async fn pkp_sign(&mut self) -> Result<StepOutcome> {
        let pkp = self.require_pkp()?.clone();
        let session = self
            .state
            .session
            .clone()
            .ok_or_else(|| Error::Other("No session sigs available".to_string()))?;
        let client = self.node_client()?;

        let to_sign = keccak256([1u8, 2, 3, 4, 5]);
        let result = client
            .pkp_sign(&pkp.public_key, &to_sign, &session.session_sigs)
            .await?;

        self.state.pkp_sign_result = Some(result);
        self.store.save(&self.state)?;
        Ok(StepOutcome::Completed)
    }

    async fn import_wrapped_key(&mut self) -> Result<StepOutcome> {
        let pkp = self.require_pkp()?.clone();
        let session = self
            .state
            .session
            .clone()
            .ok_or_else(|| Error::Other("No session sigs available".to_string()))?;
        let client = self.node_client()?;

        // Fresh throwaway key to place under custody
        let wallet = LocalWallet::new(&mut rand::thread_rng());
        let private_key = format!("0x{}", hex::encode(wallet.signer().to_bytes()));
        let public_key = format!(
            "0x{}",
            hex::encode(wallet.signer().verifying_key().to_encoded_point(false).as_bytes())
        );

        let wrapped_key = client
            .import_wrapped_key(
                &session.session_sigs,
                &pkp.eth_address,
                ImportPrivateKeyParams {
                    private_key,
                    public_key,
                    key_type: "K256".to_string(),
                    memo: None,
                },
            )
            .await?;

        self.state.wrapped_key = Some(wrapped_key);
        self.store.save(&self.state)?;
        Ok(StepOutcome::Completed)
    }

    async fn use_wrapped_key(&mut self) -> Result<StepOutcome> {
        let wrapped_key = self
            .state
            .wrapped_key
            .clone()
            .ok_or_else(|| Error::Other("No wrapped key imported yet".to_string()))?;
        let session = self
            .state
            .session
            .clone()
            .ok_or_else(|| Error::Other("No session sigs available".to_string()))?;
        let client = self.node_client()?;

        let response = client
            .execute_js(ExecuteJsParams {
                code: Some(wrapped_keys::decrypt_wrapped_key_action().to_string()),
                session_sigs: session.session_sigs,
                js_params: Some(wrapped_keys::decrypt_wrapped_key_js_params(&wrapped_key)),
                ..Default::default()
            })
            .await?;
        info!("Wrapped key action response: {}", response.response);

        self.state.wrapped_key_action_response = Some(response.response);
        self.store.save(&self.state)?;
        Ok(StepOutcome::Completed)
    }

    pub fn reset(&mut self) -> Result<()> {
        self.store.clear()?;
        self.state = HarnessState::default();
        self.node_client = None;
        self.contracts = None;
        Ok(())
    }

    fn node_client(&self) -> Result<&LitNodeClient> {
        self.node_client
            .as_ref()
            .ok_or_else(|| Error::Other("Node client not connected".to_string()))
    }

    fn contracts(&self) -> Result<&LitContracts> {
        self.contracts
            .as_ref()
            .ok_or_else(|| Error::Other("Contract client not connected".to_string()))
    }

    fn require_pkp(&self) -> Result<&crate::types::Pkp> {
        self.state
            .pkp
            .as_ref()
            .ok_or_else(|| Error::Other("No PKP minted yet".to_string()))
    }
}
