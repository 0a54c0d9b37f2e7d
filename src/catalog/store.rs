use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, warn};

use super::defaults::default_catalog;
use super::merge::{merge_by_key, Overlay};
use super::types::{Catalog, CatalogPatch};
use crate::storage::KeyValueStore;

/// Errors raised while writing the catalog aggregate
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Storage error: {0}")]
    Storage(#[from] anyhow::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors raised by catalog import; the in-memory catalog is untouched
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("読み込みに失敗しました。JSON形式を確認してください。")]
    Unparseable(#[source] serde_json::Error),

    #[error("読み込みに失敗しました。JSONのオブジェクトではありません。")]
    NotAnObject,

    #[error("読み込みに失敗しました。データの形式が正しくありません。")]
    Malformed(#[source] serde_json::Error),

    #[error("読み込んだデータを保存できませんでした: {0}")]
    Persistence(#[from] PersistenceError),
}

/// Overlay a persisted blob onto the built-in defaults.
///
/// Scalars and the contacts block are replaced when present. The four
/// collections are merged by id so defaults shipped after the blob was
/// written still appear.
pub fn reconcile(defaults: &Catalog, persisted: CatalogPatch) -> Catalog {
    let mut merged = defaults.clone();

    if let Some(version) = persisted.version {
        merged.version = version;
    }
    if let Some(admin) = persisted.admin {
        merged.admin = admin;
    }
    if let Some(global_contacts) = persisted.global_contacts {
        merged.global_contacts = global_contacts;
    }

    merged.organizations = merge_by_key(
        &defaults.organizations,
        persisted.organizations.unwrap_or_default(),
    );
    merged.staff = merge_by_key(&defaults.staff, persisted.staff.unwrap_or_default());
    merged.situations = merge_by_key(&defaults.situations, persisted.situations.unwrap_or_default());
    merged.body_locations = merge_by_key(
        &defaults.body_locations,
        persisted.body_locations.unwrap_or_default(),
    );

    merged
}

/// Shallow top-level overlay used by import: a present collection replaces
/// the base collection wholesale, an absent one leaves it as it was.
pub fn overlay_top_level(base: &Catalog, incoming: CatalogPatch) -> Catalog {
    fn records<T: Overlay>(patches: Vec<T::Patch>) -> Vec<T> {
        patches.into_iter().map(T::from_patch).collect()
    }

    let mut result = base.clone();
    if let Some(version) = incoming.version {
        result.version = version;
    }
    if let Some(admin) = incoming.admin {
        result.admin = admin;
    }
    if let Some(global_contacts) = incoming.global_contacts {
        result.global_contacts = global_contacts;
    }
    if let Some(organizations) = incoming.organizations {
        result.organizations = records(organizations);
    }
    if let Some(staff) = incoming.staff {
        result.staff = records(staff);
    }
    if let Some(situations) = incoming.situations {
        result.situations = records(situations);
    }
    if let Some(body_locations) = incoming.body_locations {
        result.body_locations = records(body_locations);
    }
    result
}

/// Loads, saves, imports and exports the catalog aggregate under one key
pub struct CatalogStore {
    store: Arc<dyn KeyValueStore>,
    key: String,
    defaults: Catalog,
}

impl std::fmt::Debug for CatalogStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogStore")
            .field("key", &self.key)
            .field("defaults_version", &self.defaults.version)
            .finish()
    }
}

impl CatalogStore {
    pub fn new(store: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self::with_defaults(store, key, default_catalog())
    }

    pub fn with_defaults(store: Arc<dyn KeyValueStore>, key: impl Into<String>, defaults: Catalog) -> Self {
        Self {
            store,
            key: key.into(),
            defaults,
        }
    }

    pub fn defaults(&self) -> &Catalog {
        &self.defaults
    }

    /// Built-in defaults reconciled with whatever was persisted.
    ///
    /// Never fails: an unreadable or malformed blob is logged and the
    /// defaults are returned unchanged.
    pub fn load(&self) -> Catalog {
        let raw = match self.store.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!(key = %self.key, "No persisted catalog; using defaults");
                return self.defaults.clone();
            }
            Err(e) => {
                warn!(key = %self.key, error = %e, "Failed to read catalog; using defaults");
                return self.defaults.clone();
            }
        };

        match serde_json::from_str::<CatalogPatch>(&raw) {
            Ok(patch) => reconcile(&self.defaults, patch),
            Err(e) => {
                warn!(key = %self.key, error = %e, "Failed to parse catalog; using defaults");
                self.defaults.clone()
            }
        }
    }

    /// Persist the whole aggregate in a single write
    pub fn save(&self, catalog: &Catalog) -> Result<(), PersistenceError> {
        let blob = serde_json::to_string(catalog)?;
        self.store.set(&self.key, &blob)?;
        debug!(
            key = %self.key,
            organizations = catalog.organizations.len(),
            staff = catalog.staff.len(),
            situations = catalog.situations.len(),
            "Catalog persisted"
        );
        Ok(())
    }

    /// Replace `current` with an externally supplied blob and persist the
    /// result. On any error nothing is written and `current` stays valid.
    pub fn import(&self, current: &Catalog, blob: &str) -> Result<Catalog, ImportError> {
        let value: serde_json::Value = serde_json::from_str(blob).map_err(ImportError::Unparseable)?;
        if !value.is_object() {
            warn!("Rejected catalog import: top-level value is not an object");
            return Err(ImportError::NotAnObject);
        }

        let patch: CatalogPatch = serde_json::from_value(value).map_err(ImportError::Malformed)?;
        let imported = overlay_top_level(current, patch);
        self.save(&imported)?;

        info!(
            organizations = imported.organizations.len(),
            staff = imported.staff.len(),
            situations = imported.situations.len(),
            "Catalog imported"
        );
        Ok(imported)
    }

    /// Pretty-printed JSON of the full aggregate
    pub fn export(catalog: &Catalog) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(catalog)
    }
}
