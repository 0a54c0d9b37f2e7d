use std::collections::HashSet;

use crate::catalog::{Action, Catalog, Organization, Situation};

/// Ordered, duplicate-free recipient list for an action.
///
/// Global contact groups of the situation come first, then the
/// organization's own addresses. Unknown group keys, unconfigured contacts
/// and missing lookups contribute nothing; an empty list is a valid result.
pub fn resolve_recipients(
    catalog: &Catalog,
    situation: Option<&Situation>,
    organization: Option<&Organization>,
    action: Action,
) -> Vec<String> {
    let group_addresses = situation
        .map(|s| s.recipient_groups(action))
        .unwrap_or_default()
        .iter()
        .filter_map(|group| catalog.global_contacts.resolve(group));

    let organization_addresses = organization
        .map(|o| o.emails.as_slice())
        .unwrap_or_default()
        .iter()
        .map(String::as_str);

    dedup_preserving_order(group_addresses.chain(organization_addresses))
}

fn dedup_preserving_order<'a>(addresses: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    addresses
        .map(str::trim)
        .filter(|address| !address.is_empty())
        .filter(|address| seen.insert(*address))
        .map(str::to_string)
        .collect()
}
