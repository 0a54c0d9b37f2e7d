// Admin mutation API
//
// Every operation validates its input first and leaves the catalog untouched
// when validation fails. Persisting the result is the caller's job.

use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use super::store::{ImportError, PersistenceError};
use super::types::{Action, Catalog, GlobalContacts, Organization, Staff};

/// User-facing admin failures. Display text is the message shown to the
/// operator.
#[derive(Debug, Error)]
pub enum AdminError {
    #[error("会社名を入力してください")]
    MissingOrganizationName,

    #[error("会社を選択してください")]
    MissingOrganization,

    #[error("氏名を入力してください")]
    MissingStaffName,

    #[error("よみ（かな）を入力してください")]
    MissingReading,

    #[error("表示名を入力してください")]
    MissingLabel,

    #[error("会社が見つかりません: {id}")]
    UnknownOrganization { id: String },

    #[error("職員が見つかりません: {id}")]
    UnknownStaff { id: String },

    #[error("状況が見つかりません: {id}")]
    UnknownSituation { id: String },

    #[error("部位が見つかりません: {id}")]
    UnknownBodyLocation { id: String },

    #[error("パスワードを入力してください")]
    MissingPassword,

    #[error("すべて入力してください")]
    MissingPasswordFields,

    #[error("{min}文字以上で設定してください")]
    PasswordTooShort { min: usize },

    #[error("確認が一致しません")]
    PasswordMismatch,

    #[error("パスワードが違います。")]
    WrongPassword,

    #[error("現在のパスワードが違います")]
    WrongCurrentPassword,

    #[error("パスワードが未設定です")]
    PasswordNotSet,

    #[error("パスワードは設定済みです")]
    PasswordAlreadySet,

    #[error("管理画面にログインしてください")]
    NotAuthenticated,

    #[error("パスワードを確認中です")]
    CredentialCheckInProgress,

    #[error("パスワードの確認が開始されていません")]
    CredentialCheckNotIssued,

    #[error("パスワードの確認に失敗しました: {0}")]
    Digest(#[source] anyhow::Error),

    #[error("保存に失敗しました: {0}")]
    Persistence(#[from] PersistenceError),

    #[error(transparent)]
    Import(#[from] ImportError),
}

/// Split a comma-separated form value into trimmed, non-empty entries
pub fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}

fn fresh_id(taken: impl Fn(&str) -> bool) -> String {
    loop {
        let candidate = Uuid::new_v4().simple().to_string()[..8].to_string();
        if !taken(&candidate) {
            return candidate;
        }
    }
}

/// Situation edit form. Recipient groups are the raw comma-separated
/// token lists; unknown tokens are kept and ignored at composition time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SituationUpdate {
    pub default_action: Action,
    pub requires_body_location: bool,
    pub emergency_recipient_groups: String,
    pub observe_recipient_groups: String,
    pub emergency_guidance_text: String,
    pub observe_guidance_text: String,
    pub subject_template: String,
    pub emergency_body_template: String,
    pub observe_body_template: String,
}

impl Catalog {
    /// Add an organization and return its generated id
    pub fn add_organization(&mut self, name: &str, emails: &str) -> Result<String, AdminError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AdminError::MissingOrganizationName);
        }

        let id = fresh_id(|candidate| self.organization(candidate).is_some());
        self.organizations.push(Organization {
            id: id.clone(),
            name: name.to_string(),
            emails: parse_list(emails),
        });

        info!(organization_id = %id, "Organization added");
        Ok(id)
    }

    pub fn update_organization(&mut self, id: &str, name: &str, emails: &str) -> Result<(), AdminError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AdminError::MissingOrganizationName);
        }

        let organization = self
            .organizations
            .iter_mut()
            .find(|o| o.id == id)
            .ok_or_else(|| AdminError::UnknownOrganization { id: id.to_string() })?;
        organization.name = name.to_string();
        organization.emails = parse_list(emails);

        info!(organization_id = %id, "Organization updated");
        Ok(())
    }

    /// Remove an organization. Staff that referenced it are kept with an
    /// empty organization id; returns how many were detached.
    pub fn delete_organization(&mut self, id: &str) -> Result<usize, AdminError> {
        let before = self.organizations.len();
        self.organizations.retain(|o| o.id != id);
        if self.organizations.len() == before {
            return Err(AdminError::UnknownOrganization { id: id.to_string() });
        }

        let mut detached = 0;
        for member in self.staff.iter_mut().filter(|s| s.organization_id == id) {
            member.organization_id.clear();
            detached += 1;
        }

        info!(organization_id = %id, detached_staff = detached, "Organization deleted");
        Ok(detached)
    }

    /// Add a staff member and return the generated id
    pub fn add_staff(&mut self, organization_id: &str, name: &str, reading: &str) -> Result<String, AdminError> {
        let (name, reading) = validate_staff(organization_id, name, reading)?;

        let id = fresh_id(|candidate| self.person(candidate).is_some());
        self.staff.push(Staff {
            id: id.clone(),
            organization_id: organization_id.to_string(),
            name,
            reading,
        });

        info!(staff_id = %id, organization_id = %organization_id, "Staff added");
        Ok(id)
    }

    pub fn update_staff(
        &mut self,
        id: &str,
        organization_id: &str,
        name: &str,
        reading: &str,
    ) -> Result<(), AdminError> {
        let (name, reading) = validate_staff(organization_id, name, reading)?;

        let member = self
            .staff
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| AdminError::UnknownStaff { id: id.to_string() })?;
        member.organization_id = organization_id.to_string();
        member.name = name;
        member.reading = reading;

        info!(staff_id = %id, "Staff updated");
        Ok(())
    }

    pub fn delete_staff(&mut self, id: &str) -> Result<(), AdminError> {
        let before = self.staff.len();
        self.staff.retain(|s| s.id != id);
        if self.staff.len() == before {
            return Err(AdminError::UnknownStaff { id: id.to_string() });
        }

        info!(staff_id = %id, "Staff deleted");
        Ok(())
    }

    pub fn update_situation(&mut self, id: &str, update: SituationUpdate) -> Result<(), AdminError> {
        let situation = self
            .situations
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| AdminError::UnknownSituation { id: id.to_string() })?;

        situation.default_action = update.default_action;
        situation.requires_body_location = update.requires_body_location;
        situation.emergency_recipient_groups = parse_list(&update.emergency_recipient_groups);
        situation.observe_recipient_groups = parse_list(&update.observe_recipient_groups);
        situation.emergency_guidance_text = update.emergency_guidance_text.trim().to_string();
        situation.observe_guidance_text = update.observe_guidance_text.trim().to_string();
        situation.subject_template = update.subject_template.trim().to_string();
        situation.emergency_body_template = update.emergency_body_template.replace("\r\n", "\n");
        situation.observe_body_template = update.observe_body_template.replace("\r\n", "\n");

        info!(situation_id = %id, "Situation updated");
        Ok(())
    }

    pub fn update_global_contacts(&mut self, contacts: GlobalContacts) {
        self.global_contacts = GlobalContacts {
            safety_hq: contacts.safety_hq.trim().to_string(),
            rescue_team: contacts.rescue_team.trim().to_string(),
            ambulance_center: contacts.ambulance_center.trim().to_string(),
        };
        info!("Global contacts updated");
    }

    pub fn update_body_location_label(&mut self, id: &str, label: &str) -> Result<(), AdminError> {
        let label = label.trim();
        if label.is_empty() {
            return Err(AdminError::MissingLabel);
        }

        let location = self
            .body_locations
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or_else(|| AdminError::UnknownBodyLocation { id: id.to_string() })?;
        location.label = label.to_string();

        info!(body_location_id = %id, "Body location relabelled");
        Ok(())
    }
}

fn validate_staff(organization_id: &str, name: &str, reading: &str) -> Result<(String, String), AdminError> {
    if organization_id.is_empty() {
        return Err(AdminError::MissingOrganization);
    }
    let name = name.trim();
    if name.is_empty() {
        return Err(AdminError::MissingStaffName);
    }
    let reading = reading.trim();
    if reading.is_empty() {
        return Err(AdminError::MissingReading);
    }
    Ok((name.to_string(), reading.to_string()))
}
