// Message composition from the current selection

use std::fmt::Write as _;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::clock::{Clock, SystemClock};
use super::recipients::resolve_recipients;
use super::template::{render_template, TemplateVars};
use crate::catalog::{Action, Catalog};
use crate::config::NotificationConfig;
use crate::wizard::WizardSelection;

const DEFAULT_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Situation whose summary line reads "<part>に痛み"
const PAIN_SITUATION_ID: &str = "pain";

/// Composed message, ready for dispatch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Notification {
    #[serde(alias = "to")]
    pub recipients: Vec<String>,
    pub subject: String,
    pub body: String,
}

impl Notification {
    pub fn is_empty(&self) -> bool {
        self.recipients.is_empty() && self.subject.is_empty() && self.body.is_empty()
    }
}

/// Plain values for the result screen summary; `None` renders as a dash
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResultSummary {
    pub situation: Option<String>,
    pub organization: Option<String>,
    pub person: Option<String>,
    pub detail: Option<String>,
}

/// Explicit action, else the situation's default, else observe
pub fn resolve_action(catalog: &Catalog, selection: &WizardSelection, explicit: Option<Action>) -> Action {
    explicit
        .or_else(|| {
            selection
                .situation_id
                .as_deref()
                .and_then(|id| catalog.situation(id))
                .map(|s| s.default_action)
        })
        .unwrap_or_default()
}

/// Guidance shown above the action buttons; empty when the situation is unknown
pub fn guidance_text(catalog: &Catalog, selection: &WizardSelection, action: Action) -> String {
    selection
        .situation_id
        .as_deref()
        .and_then(|id| catalog.situation(id))
        .map(|s| s.guidance_text(action).to_string())
        .unwrap_or_default()
}

pub fn summarize(catalog: &Catalog, selection: &WizardSelection) -> ResultSummary {
    let situation = selection.situation_id.as_deref().and_then(|id| catalog.situation(id));

    let detail = selection
        .body_location_id
        .as_deref()
        .and_then(|id| catalog.body_location(id))
        .map(|location| match situation {
            Some(s) if s.id == PAIN_SITUATION_ID => format!("{}に痛み", location.label),
            _ => location.label.clone(),
        })
        .filter(|detail| !detail.is_empty());

    ResultSummary {
        situation: situation.map(|s| s.label.clone()),
        organization: selection
            .organization_id
            .as_deref()
            .and_then(|id| catalog.organization(id))
            .map(|o| o.name.clone()),
        person: selection
            .person_id
            .as_deref()
            .and_then(|id| catalog.person(id))
            .map(|p| p.name.clone()),
        detail,
    }
}

/// Renders notifications for the current selection.
///
/// Lookups that miss degrade to empty values; composing never fails.
pub struct Composer {
    settings: NotificationConfig,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for Composer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Composer")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl Composer {
    pub fn new(settings: NotificationConfig, clock: Arc<dyn Clock>) -> Self {
        Self { settings, clock }
    }

    pub fn with_system_clock(settings: NotificationConfig) -> Self {
        Self::new(settings, Arc::new(SystemClock))
    }

    pub fn settings(&self) -> &NotificationConfig {
        &self.settings
    }

    fn timestamp(&self) -> String {
        let now = self.clock.now();
        let mut rendered = String::new();
        if write!(rendered, "{}", now.format(&self.settings.time_format)).is_err() {
            warn!(
                time_format = %self.settings.time_format,
                "Invalid time format, using default"
            );
            rendered = now.format(DEFAULT_TIME_FORMAT).to_string();
        }
        rendered
    }

    /// Template variables for the selection at the current time
    pub fn variables(&self, catalog: &Catalog, selection: &WizardSelection) -> TemplateVars {
        let detail = if selection.detail_note.is_empty() {
            self.settings.no_detail_placeholder.clone()
        } else {
            selection.detail_note.clone()
        };

        TemplateVars {
            company: selection
                .organization_id
                .as_deref()
                .and_then(|id| catalog.organization(id))
                .map(|o| o.name.clone())
                .unwrap_or_default(),
            person: selection
                .person_id
                .as_deref()
                .and_then(|id| catalog.person(id))
                .map(|p| p.name.clone())
                .unwrap_or_default(),
            time: self.timestamp(),
            part: selection
                .body_location_id
                .as_deref()
                .and_then(|id| catalog.body_location(id))
                .map(|b| b.label.clone())
                .unwrap_or_default(),
            detail,
        }
    }

    /// Recipients, subject and body for `action` (or the resolved default)
    pub fn compose(&self, catalog: &Catalog, selection: &WizardSelection, action: Option<Action>) -> Notification {
        let action = resolve_action(catalog, selection, action);
        let situation = selection.situation_id.as_deref().and_then(|id| catalog.situation(id));
        let organization = selection
            .organization_id
            .as_deref()
            .and_then(|id| catalog.organization(id));
        let vars = self.variables(catalog, selection);

        let subject_template = situation
            .map(|s| s.subject_template.as_str())
            .filter(|t| !t.is_empty())
            .unwrap_or(self.settings.fallback_subject.as_str());
        let body_template = situation
            .map(|s| s.body_template(action))
            .filter(|t| !t.is_empty())
            .unwrap_or(self.settings.fallback_body.as_str());

        let notification = Notification {
            recipients: resolve_recipients(catalog, situation, organization, action),
            subject: render_template(subject_template, &vars),
            body: render_template(body_template, &vars),
        };

        debug!(
            situation = ?selection.situation_id,
            action = action.as_str(),
            recipients = notification.recipients.len(),
            "Composed notification"
        );

        notification
    }
}
