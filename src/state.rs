//! The single persisted aggregate for a harness run, serialized verbatim to a
//! namespaced JSON file after every mutating step and reloaded on restart.

use crate::error::Result;
use crate::types::{CustomAuthMethod, Pkp, PkpSignResult, SessionSignatures};
use crate::wrapped_keys::WrappedKey;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

pub const STATE_NAMESPACE: &str = "litProtocolData";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredSession {
    #[serde(rename = "sessionSigs")]
    pub session_sigs: SessionSignatures,
    pub expiration: String,
}

impl StoredSession {
    /// Expired (or unparseable) sessions must be re-derived.
    pub fn is_expired(&self, now: chrono::DateTime<chrono::Utc>) -> bool {
        match chrono::DateTime::parse_from_rfc3339(&self.expiration) {
            Ok(expiration) => expiration <= now,
            Err(_) => true,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HarnessState {
    pub pkp: Option<Pkp>,
    pub custom_auth_method: Option<CustomAuthMethod>,
    pub lit_action_code: Option<String>,
    pub ipfs_hash: Option<String>,
    pub permitted_auth_method_added: bool,
    pub lit_action_permitted: bool,
    pub session: Option<StoredSession>,
    pub pkp_sign_result: Option<PkpSignResult>,
    pub wrapped_key: Option<WrappedKey>,
    pub wrapped_key_action_response: Option<serde_json::Value>,
}

pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(dir: &Path) -> Self {
        Self {
            path: dir.join(format!("{STATE_NAMESPACE}.json")),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the stored record, falling back to an empty one when the file is
    /// missing or unreadable.
    pub fn load(&self) -> HarnessState {
        let data = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(_) => return HarnessState::default(),
        };
        match serde_json::from_str(&data) {
            Ok(state) => state,
            Err(e) => {
                warn!("Error parsing saved state, starting fresh: {}", e);
                HarnessState::default()
            }
        }
    }

    pub fn save(&self, state: &HarnessState) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(state)?;
        fs::write(&self.path, data)?;
        Ok(())
    }

    pub fn clear(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_loads_default() {
        let dir = tempfile::tempdir().unwrap();
        let store = StateStore::new(dir.path());
        let state = store.load();
        assert!(state.pkp.is_none());
        assert!(!state.permitted_auth_method_added);
    }

    #[test]
    fn corrupt_file_loads_default() {
        let dir = tempfile::tempdir().unwrap();
        let store = StateStore::new(dir.path());
        fs::write(store.path(), "{not json").unwrap();
        let state = store.load();
        assert!(state.pkp.is_none());
    }

    #[test]
    fn session_expiry() {
        let now = chrono::Utc::now();
        let expired = StoredSession {
            session_sigs: Default::default(),
            expiration: (now - chrono::Duration::minutes(1)).to_rfc3339(),
        };
        assert!(expired.is_expired(now));

        let valid = StoredSession {
            session_sigs: Default::default(),
            expiration: (now + chrono::Duration::minutes(10)).to_rfc3339(),
        };
        assert!(!valid.is_expired(now));

        let garbage = StoredSession {
            session_sigs: Default::default(),
            expiration: "not-a-date".to_string(),
        };
        assert!(garbage.is_expired(now));
    }
}
