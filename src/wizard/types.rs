// Wizard steps, events and the accumulated selection

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::{Action, SeverityMode};
use crate::notification::Notification;

/// Screens of the triage flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Step {
    Home,
    StatusPicker,
    BodyLocationPicker,
    OrganizationPicker,
    PersonPicker,
    Result,
    EmergencyDispatched,
}

impl Step {
    pub const ALL: [Step; 7] = [
        Step::Home,
        Step::StatusPicker,
        Step::BodyLocationPicker,
        Step::OrganizationPicker,
        Step::PersonPicker,
        Step::Result,
        Step::EmergencyDispatched,
    ];

    /// Identifier written into session history
    pub fn id(&self) -> &'static str {
        match self {
            Step::Home => "home",
            Step::StatusPicker => "statusPicker",
            Step::BodyLocationPicker => "bodyLocationPicker",
            Step::OrganizationPicker => "organizationPicker",
            Step::PersonPicker => "personPicker",
            Step::Result => "result",
            Step::EmergencyDispatched => "emergencyDispatched",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|step| step.id() == id)
    }
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

/// User-initiated inputs to the wizard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WizardEvent {
    /// Home screen mode buttons
    Start { mode: SeverityMode },
    SelectSituation { id: String },
    /// Tap on the body diagram; stays on the picker
    SelectBodyLocation { id: String },
    /// The picker's "next" button
    ConfirmBodyLocation,
    SelectOrganization { id: String },
    SelectPerson { id: String },
    /// Result screen action buttons
    ChooseAction { action: Action },
    SetDetailNote { text: String },
    Back,
    Restart,
}

impl WizardEvent {
    pub fn name(&self) -> &'static str {
        match self {
            WizardEvent::Start { .. } => "start",
            WizardEvent::SelectSituation { .. } => "select_situation",
            WizardEvent::SelectBodyLocation { .. } => "select_body_location",
            WizardEvent::ConfirmBodyLocation => "confirm_body_location",
            WizardEvent::SelectOrganization { .. } => "select_organization",
            WizardEvent::SelectPerson { .. } => "select_person",
            WizardEvent::ChooseAction { .. } => "choose_action",
            WizardEvent::SetDetailNote { .. } => "set_detail_note",
            WizardEvent::Back => "back",
            WizardEvent::Restart => "restart",
        }
    }
}

/// Everything chosen so far in the current incident.
///
/// Field names accept the legacy session keys so older snapshots restore.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WizardSelection {
    pub mode: SeverityMode,
    pub situation_id: Option<String>,
    #[serde(alias = "companyId")]
    pub organization_id: Option<String>,
    pub person_id: Option<String>,
    #[serde(alias = "bodyPartId")]
    pub body_location_id: Option<String>,
    pub detail_note: String,
    pub action: Option<Action>,
    /// Last composed message
    pub preview: Notification,
}

impl WizardSelection {
    /// Clear every field, including the severity mode
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WizardError {
    #[error("Invalid transition: {event} not allowed on step {step}")]
    InvalidTransition { event: &'static str, step: Step },

    #[error("状況が見つかりません: {id}")]
    UnknownSituation { id: String },

    #[error("所属が見つかりません: {id}")]
    UnknownOrganization { id: String },

    #[error("職員が見つかりません: {id}")]
    UnknownPerson { id: String },

    #[error("部位が見つかりません: {id}")]
    UnknownBodyLocation { id: String },

    #[error("Step {step} is missing a required selection")]
    StepIncomplete { step: Step },

    #[error("処理中です。しばらくお待ちください")]
    CredentialCheckPending,
}
