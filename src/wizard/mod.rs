// Wizard Module - triage flow state machine and resumable sessions

pub mod machine;
pub mod session;
pub mod types;

pub use machine::WizardMachine;
pub use session::{SessionSnapshot, SessionStore};
pub use types::{Step, WizardError, WizardEvent, WizardSelection};
