// Inochi Triage Library - offline incident-triage wizard
// Reference data, the step-by-step triage flow and notification composition

pub mod catalog;
pub mod config;
pub mod coordinator;
pub mod credential;
pub mod directory;
pub mod notification;
pub mod storage;
pub mod telemetry;
pub mod wizard;

// Re-export key types for easy access
pub use catalog::{
    default_catalog, reconcile, Action, AdminError, Catalog, CatalogStore, ImportError,
    PersistenceError, SeverityMode,
};
pub use config::TriageConfig;
pub use coordinator::TriageCoordinator;
pub use credential::{CredentialOutcome, CredentialRequest, PasswordHasher, Sha256Hasher};
pub use directory::{group_key_for, Bucket};
pub use notification::{Clock, Composer, Dispatcher, FixedClock, Notification, SystemClock};
pub use storage::{DirectoryStore, KeyValueStore, MemoryStore};
pub use telemetry::init_telemetry;
pub use wizard::{Step, WizardError, WizardEvent, WizardMachine, WizardSelection};
