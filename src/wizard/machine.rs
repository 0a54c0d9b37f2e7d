use tracing::{debug, error, info};

use super::session::SessionSnapshot;
use super::types::{Step, WizardError, WizardEvent, WizardSelection};
use crate::catalog::{Action, Catalog, SeverityMode};
use crate::notification::{resolve_action, Composer};

/// Triage flow state machine.
///
/// Unsure mode:    Home → StatusPicker → [BodyLocationPicker] → OrganizationPicker
///                 → PersonPicker → [BodyLocationPicker] → Result
/// Emergency mode: Home → StatusPicker → [BodyLocationPicker] → EmergencyDispatched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WizardMachine {
    current: Step,
    history: Vec<Step>,
    selection: WizardSelection,
}

impl Default for WizardMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl WizardMachine {
    pub fn new() -> Self {
        Self {
            current: Step::Home,
            history: vec![Step::Home],
            selection: WizardSelection::default(),
        }
    }

    /// Resume from a stored snapshot. The selection is kept, unknown history
    /// entries are dropped, and the wizard always reopens on Home.
    pub fn resume(snapshot: SessionSnapshot) -> Self {
        let mut history: Vec<Step> = snapshot
            .history
            .iter()
            .filter_map(|id| Step::from_id(id))
            .collect();
        if history.is_empty() {
            history.push(Step::Home);
        }

        debug!(
            restored_history = history.len(),
            dropped = snapshot.history.len().saturating_sub(history.len()),
            "Session restored"
        );

        Self {
            current: Step::Home,
            history,
            selection: snapshot.selection,
        }
    }

    /// Reopen on Home with a fresh history, keeping the selection
    pub fn reset_navigation(&mut self) {
        self.current = Step::Home;
        self.history = vec![Step::Home];
    }

    pub fn current_step(&self) -> Step {
        self.current
    }

    pub fn history(&self) -> &[Step] {
        &self.history
    }

    pub fn selection(&self) -> &WizardSelection {
        &self.selection
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            selection: self.selection.clone(),
            history: self.history.iter().map(|step| step.id().to_string()).collect(),
        }
    }

    /// Whether the current step's gating field is populated
    pub fn next_enabled(&self) -> bool {
        let s = &self.selection;
        match self.current {
            Step::Home => true,
            Step::StatusPicker => s.situation_id.is_some(),
            Step::BodyLocationPicker => s.body_location_id.is_some(),
            Step::OrganizationPicker => s.organization_id.is_some(),
            Step::PersonPicker => s.person_id.is_some(),
            Step::Result | Step::EmergencyDispatched => false,
        }
    }

    fn go(&mut self, destination: Step) {
        if self.history.last() != Some(&destination) {
            self.history.push(destination);
        }
        self.current = destination;
    }

    fn back(&mut self) {
        if self.history.len() <= 1 {
            self.history = vec![Step::Home];
            self.current = Step::Home;
            return;
        }
        self.history.pop();
        self.current = self.history.last().copied().unwrap_or(Step::Home);
    }

    fn requires_body_location(&self, catalog: &Catalog) -> bool {
        self.selection
            .situation_id
            .as_deref()
            .and_then(|id| catalog.situation(id))
            .is_some_and(|s| s.requires_body_location)
    }

    fn dispatch_emergency(&mut self, catalog: &Catalog, composer: &Composer) {
        self.selection.action = Some(Action::Emergency);
        self.selection.preview = composer.compose(catalog, &self.selection, Some(Action::Emergency));
        self.go(Step::EmergencyDispatched);
    }

    fn show_result(&mut self, catalog: &Catalog, composer: &Composer) {
        self.refresh_preview(catalog, composer);
        self.go(Step::Result);
    }

    fn refresh_preview(&mut self, catalog: &Catalog, composer: &Composer) {
        let action = resolve_action(catalog, &self.selection, self.selection.action);
        self.selection.action = Some(action);
        self.selection.preview = composer.compose(catalog, &self.selection, Some(action));
    }

    /// Where to go once the body-location gate is satisfied
    fn after_body_location(&mut self, catalog: &Catalog, composer: &Composer) {
        if self.selection.mode == SeverityMode::Emergency {
            self.dispatch_emergency(catalog, composer);
        } else if self.selection.organization_id.is_some() && self.selection.person_id.is_some() {
            self.show_result(catalog, composer);
        } else {
            self.go(Step::OrganizationPicker);
        }
    }

    fn record_transition(&self, from: Step, event: &WizardEvent) {
        info!(
            from_step = %from,
            to_step = %self.current,
            event = event.name(),
            history_depth = self.history.len(),
            "Wizard transition"
        );
    }

    /// Apply one user event. Returns the step shown afterwards.
    ///
    /// Rejected events leave the machine unchanged.
    pub fn handle(&mut self, event: WizardEvent, catalog: &Catalog, composer: &Composer) -> Result<Step, WizardError> {
        let from = self.current;

        match (self.current, &event) {
            (_, WizardEvent::Back) => self.back(),

            (_, WizardEvent::Restart) => {
                self.selection.clear();
                self.history = vec![Step::Home];
                self.current = Step::Home;
            }

            (_, WizardEvent::SetDetailNote { text }) => {
                self.selection.detail_note = text.clone();
                match self.current {
                    Step::Result => self.refresh_preview(catalog, composer),
                    Step::EmergencyDispatched => {
                        self.selection.preview =
                            composer.compose(catalog, &self.selection, Some(Action::Emergency));
                    }
                    _ => {}
                }
            }

            (Step::Home, WizardEvent::Start { mode }) => {
                self.selection.mode = *mode;
                self.go(Step::StatusPicker);
            }

            (Step::StatusPicker, WizardEvent::SelectSituation { id }) => {
                let situation = catalog
                    .situation(id)
                    .ok_or_else(|| WizardError::UnknownSituation { id: id.clone() })?;
                let requires_body_location = situation.requires_body_location;

                let s = &mut self.selection;
                s.situation_id = Some(id.clone());
                s.organization_id = None;
                s.person_id = None;
                s.body_location_id = None;
                s.action = None;

                if requires_body_location {
                    self.go(Step::BodyLocationPicker);
                } else if self.selection.mode == SeverityMode::Emergency {
                    self.dispatch_emergency(catalog, composer);
                } else {
                    self.go(Step::OrganizationPicker);
                }
            }

            (Step::BodyLocationPicker, WizardEvent::SelectBodyLocation { id }) => {
                if catalog.body_location(id).is_none() {
                    return Err(WizardError::UnknownBodyLocation { id: id.clone() });
                }
                self.selection.body_location_id = Some(id.clone());
            }

            (Step::BodyLocationPicker, WizardEvent::ConfirmBodyLocation) => {
                if self.selection.body_location_id.is_none() {
                    return Err(WizardError::StepIncomplete {
                        step: Step::BodyLocationPicker,
                    });
                }
                self.after_body_location(catalog, composer);
            }

            (Step::OrganizationPicker, WizardEvent::SelectOrganization { id }) => {
                if catalog.organization(id).is_none() {
                    return Err(WizardError::UnknownOrganization { id: id.clone() });
                }
                self.selection.organization_id = Some(id.clone());
                self.selection.person_id = None;
                self.go(Step::PersonPicker);
            }

            (Step::PersonPicker, WizardEvent::SelectPerson { id }) => {
                if catalog.person(id).is_none() {
                    return Err(WizardError::UnknownPerson { id: id.clone() });
                }
                if self.selection.organization_id.is_none() {
                    return Err(WizardError::StepIncomplete {
                        step: Step::OrganizationPicker,
                    });
                }
                self.selection.person_id = Some(id.clone());

                if self.requires_body_location(catalog) && self.selection.body_location_id.is_none() {
                    self.go(Step::BodyLocationPicker);
                } else if self.selection.mode == SeverityMode::Emergency {
                    self.dispatch_emergency(catalog, composer);
                } else {
                    self.show_result(catalog, composer);
                }
            }

            (Step::Result, WizardEvent::ChooseAction { action }) => {
                self.selection.action = Some(*action);
                self.refresh_preview(catalog, composer);
            }

            (step, event) => {
                error!(
                    step = %step,
                    event = event.name(),
                    "Invalid wizard transition"
                );
                return Err(WizardError::InvalidTransition {
                    event: event.name(),
                    step,
                });
            }
        }

        self.record_transition(from, &event);
        Ok(self.current)
    }
}
