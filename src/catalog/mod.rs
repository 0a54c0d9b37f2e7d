// Catalog Module - versioned reference data
//
// Built-in defaults, the persisted customization layered over them, and the
// admin mutations that edit the result.

pub mod admin;
pub mod defaults;
pub mod merge;
pub mod store;
pub mod types;

pub use admin::{parse_list, AdminError, SituationUpdate};
pub use defaults::{default_catalog, situations_for_mode, EMERGENCY_MODE_IDS, UNSURE_MODE_IDS};
pub use merge::{merge_by_key, Keyed, Overlay};
pub use store::{overlay_top_level, reconcile, CatalogStore, ImportError, PersistenceError};
pub use types::{
    Action, AdminCredential, BodyLocation, Catalog, CatalogPatch, GlobalContacts, Organization,
    RecipientGroup, SeverityMode, Situation, Staff,
};
