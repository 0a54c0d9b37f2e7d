// Session persistence for the wizard

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::types::WizardSelection;
use crate::catalog::PersistenceError;
use crate::storage::KeyValueStore;

/// Serialized selection plus navigation history.
///
/// The selection fields sit at the top level next to `history`, which is
/// also read from the legacy `nav` key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    #[serde(flatten)]
    pub selection: WizardSelection,
    #[serde(default, alias = "nav")]
    pub history: Vec<String>,
}

/// Reads and writes the session snapshot under one key
pub struct SessionStore {
    store: Arc<dyn KeyValueStore>,
    key: String,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore").field("key", &self.key).finish_non_exhaustive()
    }
}

impl SessionStore {
    pub fn new(store: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    /// Stored snapshot, if any. Unreadable or malformed blobs count as absent.
    pub fn load(&self) -> Option<SessionSnapshot> {
        let raw = match self.store.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!(key = %self.key, error = %e, "Failed to read session, starting fresh");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                warn!(key = %self.key, error = %e, "Malformed session blob ignored");
                None
            }
        }
    }

    pub fn save(&self, snapshot: &SessionSnapshot) -> Result<(), PersistenceError> {
        let blob = serde_json::to_string(snapshot)?;
        self.store.set(&self.key, &blob)?;
        debug!(key = %self.key, bytes = blob.len(), "Session saved");
        Ok(())
    }

    pub fn clear(&self) -> Result<(), PersistenceError> {
        self.store.remove(&self.key)?;
        Ok(())
    }
}
