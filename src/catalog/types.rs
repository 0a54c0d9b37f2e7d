// Core reference-data types for the triage catalog

use serde::{Deserialize, Serialize};

use super::merge::overlay_patch;

/// Response chosen for an incident
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// Call for help now
    Emergency,
    /// Keep watching and share the situation
    #[default]
    Observe,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Emergency => "emergency",
            Action::Observe => "observe",
        }
    }
}

/// Severity picked on the home screen
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeverityMode {
    Emergency,
    #[default]
    Unsure,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    pub id: String,
    pub name: String,
    pub emails: Vec<String>,
}

/// Staff member. `reading` is the phonetic spelling of the name and is only
/// used for bucketing and sorting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Staff {
    pub id: String,
    /// Empty when the organization was deleted
    pub organization_id: String,
    pub name: String,
    pub reading: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Situation {
    pub id: String,
    pub label: String,
    pub icon: String,
    pub hint: String,
    pub requires_body_location: bool,
    pub default_action: Action,
    /// Global contact keys notified for an emergency
    pub emergency_recipient_groups: Vec<String>,
    /// Global contact keys notified when observing
    pub observe_recipient_groups: Vec<String>,
    pub emergency_guidance_text: String,
    pub observe_guidance_text: String,
    pub subject_template: String,
    pub emergency_body_template: String,
    pub observe_body_template: String,
}

impl Situation {
    pub fn recipient_groups(&self, action: Action) -> &[String] {
        match action {
            Action::Emergency => &self.emergency_recipient_groups,
            Action::Observe => &self.observe_recipient_groups,
        }
    }

    pub fn body_template(&self, action: Action) -> &str {
        match action {
            Action::Emergency => &self.emergency_body_template,
            Action::Observe => &self.observe_body_template,
        }
    }

    pub fn guidance_text(&self, action: Action) -> &str {
        match action {
            Action::Emergency => &self.emergency_guidance_text,
            Action::Observe => &self.observe_guidance_text,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BodyLocation {
    pub id: String,
    pub label: String,
}

overlay_patch!(Organization => OrganizationPatch {
    name: String,
    emails: Vec<String>,
});

overlay_patch!(Staff => StaffPatch {
    #[serde(alias = "companyId")]
    organization_id: String,
    name: String,
    #[serde(alias = "kana")]
    reading: String,
});

overlay_patch!(Situation => SituationPatch {
    label: String,
    icon: String,
    hint: String,
    #[serde(alias = "requiresBody")]
    requires_body_location: bool,
    default_action: Action,
    #[serde(alias = "includeEmergency")]
    emergency_recipient_groups: Vec<String>,
    #[serde(alias = "includeObserve")]
    observe_recipient_groups: Vec<String>,
    #[serde(alias = "recommendTextEmergency")]
    emergency_guidance_text: String,
    #[serde(alias = "recommendTextObserve")]
    observe_guidance_text: String,
    #[serde(alias = "subjectTpl")]
    subject_template: String,
    #[serde(alias = "bodyTplEmergency")]
    emergency_body_template: String,
    #[serde(alias = "bodyTplObserve")]
    observe_body_template: String,
});

overlay_patch!(BodyLocation => BodyLocationPatch {
    label: String,
});

/// Fixed recipient-group aliases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecipientGroup {
    SafetyHq,
    RescueTeam,
    AmbulanceCenter,
}

impl RecipientGroup {
    pub const ALL: [RecipientGroup; 3] = [
        RecipientGroup::SafetyHq,
        RecipientGroup::RescueTeam,
        RecipientGroup::AmbulanceCenter,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            RecipientGroup::SafetyHq => "safetyHQ",
            RecipientGroup::RescueTeam => "rescueTeam",
            RecipientGroup::AmbulanceCenter => "ambulanceCenter",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|group| group.key() == key)
    }
}

/// Addresses behind the recipient-group aliases; empty means unconfigured
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalContacts {
    #[serde(rename = "safetyHQ", default)]
    pub safety_hq: String,
    #[serde(rename = "rescueTeam", default)]
    pub rescue_team: String,
    #[serde(rename = "ambulanceCenter", default)]
    pub ambulance_center: String,
}

impl GlobalContacts {
    pub fn address(&self, group: RecipientGroup) -> &str {
        match group {
            RecipientGroup::SafetyHq => &self.safety_hq,
            RecipientGroup::RescueTeam => &self.rescue_team,
            RecipientGroup::AmbulanceCenter => &self.ambulance_center,
        }
    }

    /// Configured address for a group key. Unknown keys and empty
    /// addresses both yield `None`.
    pub fn resolve(&self, key: &str) -> Option<&str> {
        RecipientGroup::from_key(key)
            .map(|group| self.address(group))
            .filter(|address| !address.is_empty())
    }
}

/// Admin password digest; an empty hash means no password was set yet
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminCredential {
    #[serde(default)]
    pub password_hash: String,
}

impl AdminCredential {
    pub fn is_set(&self) -> bool {
        !self.password_hash.is_empty()
    }
}

/// The reference-data aggregate
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
    pub version: u32,
    pub admin: AdminCredential,
    pub global_contacts: GlobalContacts,
    pub organizations: Vec<Organization>,
    pub staff: Vec<Staff>,
    pub situations: Vec<Situation>,
    pub body_locations: Vec<BodyLocation>,
}

impl Catalog {
    pub fn situation(&self, id: &str) -> Option<&Situation> {
        self.situations.iter().find(|s| s.id == id)
    }

    pub fn organization(&self, id: &str) -> Option<&Organization> {
        self.organizations.iter().find(|o| o.id == id)
    }

    pub fn person(&self, id: &str) -> Option<&Staff> {
        self.staff.iter().find(|p| p.id == id)
    }

    pub fn body_location(&self, id: &str) -> Option<&BodyLocation> {
        self.body_locations.iter().find(|b| b.id == id)
    }
}

/// Top-level shape of a persisted or imported blob. Every key is optional;
/// present keys replace the base value, absent keys leave it alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin: Option<AdminCredential>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global_contacts: Option<GlobalContacts>,
    #[serde(default, alias = "companies", skip_serializing_if = "Option::is_none")]
    pub organizations: Option<Vec<OrganizationPatch>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub staff: Option<Vec<StaffPatch>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub situations: Option<Vec<SituationPatch>>,
    #[serde(default, alias = "bodyParts", skip_serializing_if = "Option::is_none")]
    pub body_locations: Option<Vec<BodyLocationPatch>>,
}

impl From<Catalog> for CatalogPatch {
    fn from(catalog: Catalog) -> Self {
        Self {
            version: Some(catalog.version),
            admin: Some(catalog.admin),
            global_contacts: Some(catalog.global_contacts),
            organizations: Some(catalog.organizations.into_iter().map(Into::into).collect()),
            staff: Some(catalog.staff.into_iter().map(Into::into).collect()),
            situations: Some(catalog.situations.into_iter().map(Into::into).collect()),
            body_locations: Some(catalog.body_locations.into_iter().map(Into::into).collect()),
        }
    }
}
