pub mod action;
pub mod auth;
pub mod bls;
pub mod client;
pub mod config;
pub mod contracts;
pub mod ecdsa;
pub mod error;
pub mod ipfs;
pub mod runner;
pub mod state;
pub mod types;
pub mod wrapped_keys;

pub use client::LitNodeClient;
pub use config::{LitNetwork, LitNodeClientConfig};
pub use contracts::LitContracts;
pub use error::{Error, Result};
pub use runner::{RunnerConfig, Step, StepOutcome, StepRunner};
pub use state::{HarnessState, StateStore, StoredSession};
pub use types::{
    AuthMethod, AuthSig, CustomAuthMethod, Pkp, PkpSignResult, SessionSignature,
    SessionSignatures,
};
