// Triage Coordinator - single owner of catalog, wizard and admin gate
//
// All mutation flows through here: wizard events persist the session, admin
// mutations persist the catalog, and credential checks raise a busy flag
// that blocks both until the digest work is complete or abandoned.

use std::sync::Arc;

use anyhow::Result;
use tracing::{info, instrument, warn};

use crate::catalog::{
    situations_for_mode, AdminError, Catalog, CatalogStore, GlobalContacts, PersistenceError,
    SeverityMode, Situation, SituationUpdate, Staff,
};
use crate::config::TriageConfig;
use crate::credential::{
    BusyFlag, BusyGuard, CredentialOutcome, CredentialPolicy, CredentialRequest, PasswordHasher,
    PendingCredential, Sha256Hasher,
};
use crate::directory::{list_by_organization_and_bucket, list_staff, Bucket};
use crate::notification::{
    clipboard_text, guidance_text, mailto_link, resolve_action, summarize, Clock, Composer,
    Dispatcher, Notification, ResultSummary, SystemClock,
};
use crate::storage::{DirectoryStore, KeyValueStore};
use crate::telemetry::create_wizard_span;
use crate::wizard::{SessionStore, Step, WizardError, WizardEvent, WizardMachine, WizardSelection};

/// Top-level controller for one device's triage session
pub struct TriageCoordinator {
    config: TriageConfig,
    catalog_store: CatalogStore,
    sessions: SessionStore,
    catalog: Catalog,
    wizard: WizardMachine,
    composer: Composer,
    hasher: Arc<dyn PasswordHasher>,
    policy: CredentialPolicy,
    authenticated: bool,
    credential_pending: BusyFlag,
}

impl std::fmt::Debug for TriageCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TriageCoordinator")
            .field("step", &self.wizard.current_step())
            .field("catalog_version", &self.catalog.version)
            .field("authenticated", &self.authenticated)
            .field("credential_pending", &self.is_busy())
            .finish_non_exhaustive()
    }
}

impl TriageCoordinator {
    /// Load the catalog, restore the previous selection and reopen on Home
    pub fn boot(config: TriageConfig, store: Arc<dyn KeyValueStore>) -> Self {
        let catalog_store = CatalogStore::new(Arc::clone(&store), config.storage.catalog_key.clone());
        Self::boot_with_catalog_store(config, store, catalog_store)
    }

    /// [`TriageCoordinator::boot`] over the configured data directory
    pub fn open(config: TriageConfig) -> Self {
        let store: Arc<dyn KeyValueStore> = Arc::new(DirectoryStore::new(config.storage.data_dir.clone()));
        Self::boot(config, store)
    }

    /// Boot against a catalog store with its own built-in defaults
    pub fn boot_with_catalog_store(
        config: TriageConfig,
        store: Arc<dyn KeyValueStore>,
        catalog_store: CatalogStore,
    ) -> Self {
        let sessions = SessionStore::new(store, config.storage.session_key.clone());
        let catalog = catalog_store.load();

        let mut wizard = sessions.load().map(WizardMachine::resume).unwrap_or_default();
        wizard.reset_navigation();

        let composer = Composer::new(config.notification.clone(), Arc::new(SystemClock));
        let policy = CredentialPolicy::new(config.admin.min_password_length);

        let coordinator = Self {
            config,
            catalog_store,
            sessions,
            catalog,
            wizard,
            composer,
            hasher: Arc::new(Sha256Hasher),
            policy,
            authenticated: false,
            credential_pending: BusyFlag::default(),
        };

        info!(
            catalog_version = coordinator.catalog.version,
            situations = coordinator.catalog.situations.len(),
            staff = coordinator.catalog.staff.len(),
            password_set = coordinator.catalog.admin.is_set(),
            "Triage coordinator booted"
        );
        coordinator.persist_session();
        coordinator
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.composer = Composer::new(self.config.notification.clone(), clock);
        self
    }

    pub fn with_hasher(mut self, hasher: Arc<dyn PasswordHasher>) -> Self {
        self.hasher = hasher;
        self
    }

    pub fn config(&self) -> &TriageConfig {
        &self.config
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn wizard(&self) -> &WizardMachine {
        &self.wizard
    }

    pub fn current_step(&self) -> Step {
        self.wizard.current_step()
    }

    pub fn selection(&self) -> &WizardSelection {
        self.wizard.selection()
    }

    pub fn preview(&self) -> &Notification {
        &self.wizard.selection().preview
    }

    pub fn next_enabled(&self) -> bool {
        !self.is_busy() && self.wizard.next_enabled()
    }

    pub fn is_busy(&self) -> bool {
        self.credential_pending.load(std::sync::atomic::Ordering::Acquire)
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    pub fn is_password_set(&self) -> bool {
        self.catalog.admin.is_set()
    }

    fn persist_session(&self) {
        if let Err(e) = self.sessions.save(&self.wizard.snapshot()) {
            warn!(error = %e, "Failed to persist session");
        }
    }

    // --- wizard -----------------------------------------------------------

    /// Apply a wizard event and persist the resulting session
    pub fn handle(&mut self, event: WizardEvent) -> Result<Step, WizardError> {
        let span = create_wizard_span(event.name(), self.wizard.current_step().id());
        let _guard = span.enter();

        if self.is_busy() {
            warn!(event = event.name(), "Wizard event rejected while a credential check is pending");
            return Err(WizardError::CredentialCheckPending);
        }

        let step = self.wizard.handle(event, &self.catalog, &self.composer)?;
        self.persist_session();
        Ok(step)
    }

    /// Situations offered on the status picker for the current mode
    pub fn status_options(&self) -> Vec<&Situation> {
        situations_for_mode(&self.catalog, self.wizard.selection().mode)
    }

    pub fn situations_for_mode(&self, mode: SeverityMode) -> Vec<&Situation> {
        situations_for_mode(&self.catalog, mode)
    }

    /// Person picker contents for the selected organization
    pub fn staff_in_bucket(&self, bucket: Bucket) -> Vec<&Staff> {
        match self.wizard.selection().organization_id.as_deref() {
            Some(organization_id) => list_by_organization_and_bucket(&self.catalog, organization_id, bucket),
            None => Vec::new(),
        }
    }

    pub fn result_summary(&self) -> ResultSummary {
        summarize(&self.catalog, self.wizard.selection())
    }

    /// Guidance for the action currently shown on the result screen
    pub fn guidance_text(&self) -> String {
        let selection = self.wizard.selection();
        let action = resolve_action(&self.catalog, selection, selection.action);
        guidance_text(&self.catalog, selection, action)
    }

    // --- dispatch ---------------------------------------------------------

    /// Hand the current preview to the mail client; returns the link used
    pub fn dispatch_mail(&self, dispatcher: &dyn Dispatcher) -> Result<String> {
        let link = mailto_link(self.preview());
        dispatcher.open_mail(&link)?;
        info!(recipients = self.preview().recipients.len(), "Mail client opened");
        Ok(link)
    }

    /// Copy the current preview; returns the copied text
    pub fn copy_preview(&self, dispatcher: &dyn Dispatcher) -> Result<String> {
        let text = clipboard_text(self.preview());
        dispatcher.copy_to_clipboard(&text)?;
        info!("Preview copied to clipboard");
        Ok(text)
    }

    // --- admin gate -------------------------------------------------------

    fn require_admin(&self) -> Result<(), AdminError> {
        if self.is_busy() {
            return Err(AdminError::CredentialCheckInProgress);
        }
        if !self.authenticated {
            return Err(AdminError::NotAuthenticated);
        }
        Ok(())
    }

    /// Validate a credential request and start digesting it.
    ///
    /// Raises the busy flag for as long as the returned ticket exists.
    /// Completing, abandoning or dropping the ticket lowers it.
    pub fn begin_credential_check(&mut self, request: CredentialRequest) -> Result<PendingCredential, AdminError> {
        if self.is_busy() {
            return Err(AdminError::CredentialCheckInProgress);
        }
        if matches!(request, CredentialRequest::ChangePassword { .. }) && !self.authenticated {
            return Err(AdminError::NotAuthenticated);
        }
        self.policy.precheck(&self.catalog.admin, &request)?;

        let guard = BusyGuard::acquire(&self.credential_pending).ok_or(AdminError::CredentialCheckInProgress)?;
        info!(request = request.kind(), "Credential check started");
        Ok(PendingCredential::start(Arc::clone(&self.hasher), request, guard))
    }

    /// Await the digests of a pending check and apply the outcome
    #[instrument(skip_all, fields(request = pending.request().kind()))]
    pub async fn complete_credential_check(
        &mut self,
        pending: PendingCredential,
    ) -> Result<CredentialOutcome, AdminError> {
        if !pending.issued_under(&self.credential_pending) {
            warn!("Rejected credential ticket issued by another coordinator");
            return Err(AdminError::CredentialCheckNotIssued);
        }

        let (request, digests) = pending.finish().await;
        let digests = digests.map_err(AdminError::Digest)?;
        // the catalog may have changed while digesting
        self.policy.precheck(&self.catalog.admin, &request)?;

        match request {
            CredentialRequest::Login { .. } => {
                if digests.primary != self.catalog.admin.password_hash {
                    self.authenticated = false;
                    warn!("Admin login failed");
                    return Err(AdminError::WrongPassword);
                }
                self.authenticated = true;
                info!("Admin logged in");
                Ok(CredentialOutcome::LoggedIn)
            }
            CredentialRequest::SetPassword { .. } => {
                if self.catalog.admin.is_set() {
                    return Err(AdminError::PasswordAlreadySet);
                }
                self.store_password_hash(digests.primary)?;
                info!("Admin password set");
                Ok(CredentialOutcome::PasswordSet)
            }
            CredentialRequest::ChangePassword { new_password, .. } => {
                if digests.primary != self.catalog.admin.password_hash {
                    return Err(AdminError::WrongCurrentPassword);
                }
                if !self.policy.is_long_enough(&new_password) {
                    return Err(AdminError::PasswordTooShort {
                        min: self.policy.min_length,
                    });
                }
                let replacement = digests.replacement.unwrap_or_default();
                self.store_password_hash(replacement)?;
                info!("Admin password changed");
                Ok(CredentialOutcome::PasswordChanged)
            }
        }
    }

    /// Drop a pending check without applying it
    pub fn abandon_credential_check(&mut self, pending: PendingCredential) {
        info!(request = pending.request().kind(), "Credential check abandoned");
        drop(pending);
    }

    fn store_password_hash(&mut self, hash: String) -> Result<(), AdminError> {
        let mut updated = self.catalog.clone();
        updated.admin.password_hash = hash;
        self.catalog_store.save(&updated)?;
        self.catalog = updated;
        Ok(())
    }

    pub async fn login(&mut self, password: &str) -> Result<(), AdminError> {
        let pending = self.begin_credential_check(CredentialRequest::Login {
            password: password.to_string(),
        })?;
        self.complete_credential_check(pending).await.map(|_| ())
    }

    pub fn logout(&mut self) {
        self.authenticated = false;
        info!("Admin logged out");
    }

    /// First-run password
    pub async fn set_admin_password(&mut self, new_password: &str, confirmation: &str) -> Result<(), AdminError> {
        let pending = self.begin_credential_check(CredentialRequest::SetPassword {
            new_password: new_password.to_string(),
            confirmation: confirmation.to_string(),
        })?;
        self.complete_credential_check(pending).await.map(|_| ())
    }

    pub async fn change_admin_password(
        &mut self,
        current: &str,
        new_password: &str,
        confirmation: &str,
    ) -> Result<(), AdminError> {
        let pending = self.begin_credential_check(CredentialRequest::ChangePassword {
            current: current.to_string(),
            new_password: new_password.to_string(),
            confirmation: confirmation.to_string(),
        })?;
        self.complete_credential_check(pending).await.map(|_| ())
    }

    // --- admin mutations --------------------------------------------------

    /// Apply `change` to a copy of the catalog and swap it in once persisted
    fn mutate<T>(&mut self, change: impl FnOnce(&mut Catalog) -> Result<T, AdminError>) -> Result<T, AdminError> {
        self.require_admin()?;

        let mut updated = self.catalog.clone();
        let result = change(&mut updated)?;
        self.catalog_store.save(&updated)?;
        self.catalog = updated;
        Ok(result)
    }

    pub fn add_organization(&mut self, name: &str, emails: &str) -> Result<String, AdminError> {
        self.mutate(|catalog| catalog.add_organization(name, emails))
    }

    pub fn update_organization(&mut self, id: &str, name: &str, emails: &str) -> Result<(), AdminError> {
        self.mutate(|catalog| catalog.update_organization(id, name, emails))
    }

    /// Returns how many staff members were detached
    pub fn delete_organization(&mut self, id: &str) -> Result<usize, AdminError> {
        self.mutate(|catalog| catalog.delete_organization(id))
    }

    pub fn add_staff(&mut self, organization_id: &str, name: &str, reading: &str) -> Result<String, AdminError> {
        self.mutate(|catalog| catalog.add_staff(organization_id, name, reading))
    }

    pub fn update_staff(
        &mut self,
        id: &str,
        organization_id: &str,
        name: &str,
        reading: &str,
    ) -> Result<(), AdminError> {
        self.mutate(|catalog| catalog.update_staff(id, organization_id, name, reading))
    }

    pub fn delete_staff(&mut self, id: &str) -> Result<(), AdminError> {
        self.mutate(|catalog| catalog.delete_staff(id))
    }

    pub fn update_situation(&mut self, id: &str, update: SituationUpdate) -> Result<(), AdminError> {
        self.mutate(|catalog| catalog.update_situation(id, update))
    }

    pub fn update_global_contacts(&mut self, contacts: GlobalContacts) -> Result<(), AdminError> {
        self.mutate(|catalog| {
            catalog.update_global_contacts(contacts);
            Ok(())
        })
    }

    pub fn update_body_location_label(&mut self, id: &str, label: &str) -> Result<(), AdminError> {
        self.mutate(|catalog| catalog.update_body_location_label(id, label))
    }

    /// Admin staff list, optionally narrowed to one organization
    pub fn list_staff(&self, organization_id: Option<&str>) -> Vec<&Staff> {
        list_staff(&self.catalog, organization_id)
    }

    /// Replace the catalog from an exported blob. A rejected blob leaves
    /// the current catalog in place.
    pub fn import_catalog(&mut self, blob: &str) -> Result<(), AdminError> {
        self.require_admin()?;
        let imported = self.catalog_store.import(&self.catalog, blob).map_err(|e| {
            warn!(error = %e, "Catalog import rejected");
            e
        })?;
        self.catalog = imported;
        Ok(())
    }

    pub fn export_catalog(&self) -> Result<String, AdminError> {
        self.require_admin()?;
        CatalogStore::export(&self.catalog)
            .map_err(|e| AdminError::Persistence(PersistenceError::Serialization(e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::default_catalog;
    use crate::credential::{sha256_hex, MockPasswordHasher};
    use crate::notification::{FixedClock, MockDispatcher};
    use crate::storage::{MemoryStore, MockKeyValueStore};
    use chrono::NaiveDate;
    use mockall::predicate::{always, eq};

    fn fixed_clock() -> Arc<FixedClock> {
        let now = NaiveDate::from_ymd_opt(2026, 10, 18)
            .and_then(|d| d.and_hms_opt(8, 0, 0))
            .unwrap();
        Arc::new(FixedClock(now))
    }

    fn boot(store: Arc<MemoryStore>) -> TriageCoordinator {
        TriageCoordinator::boot(TriageConfig::default(), store).with_clock(fixed_clock())
    }

    async fn admin(store: Arc<MemoryStore>) -> TriageCoordinator {
        let mut coordinator = boot(store);
        coordinator.set_admin_password("abcd", "abcd").await.unwrap();
        coordinator.login("abcd").await.unwrap();
        coordinator
    }

    #[test]
    fn test_boot_persists_home_session() {
        let store = Arc::new(MemoryStore::new());
        let coordinator = boot(store.clone());

        assert_eq!(coordinator.current_step(), Step::Home);
        let blob = store.get("inochi_session_v1").unwrap().unwrap();
        assert!(blob.contains(r#""history":["home"]"#));
    }

    #[test]
    fn test_session_save_failure_does_not_block_wizard() {
        let mut store = MockKeyValueStore::new();
        store.expect_get().returning(|_| Ok(None));
        store
            .expect_set()
            .with(eq("inochi_session_v1"), always())
            .returning(|_, _| Err(anyhow::anyhow!("quota exceeded")));

        let mut coordinator = TriageCoordinator::boot(TriageConfig::default(), Arc::new(store));
        let step = coordinator
            .handle(WizardEvent::Start {
                mode: SeverityMode::Emergency,
            })
            .unwrap();
        assert_eq!(step, Step::StatusPicker);
    }

    #[tokio::test]
    async fn test_admin_mutations_require_login() {
        let store = Arc::new(MemoryStore::new());
        let mut coordinator = boot(store);

        assert!(matches!(
            coordinator.add_organization("C建設", "c@example.com"),
            Err(AdminError::NotAuthenticated)
        ));
        assert!(matches!(coordinator.export_catalog(), Err(AdminError::NotAuthenticated)));

        coordinator.set_admin_password("abcd", "abcd").await.unwrap();
        coordinator.login("abcd").await.unwrap();
        let id = coordinator.add_organization("C建設", "c@example.com").unwrap();
        assert_eq!(coordinator.catalog().organization(&id).unwrap().name, "C建設");

        coordinator.logout();
        assert!(matches!(
            coordinator.delete_organization(&id),
            Err(AdminError::NotAuthenticated)
        ));
    }

    #[tokio::test]
    async fn test_failed_save_leaves_catalog_unchanged() {
        let mut store = MockKeyValueStore::new();
        store.expect_get().returning(|_| Ok(None));
        store
            .expect_set()
            .with(eq("inochi_session_v1"), always())
            .returning(|_, _| Ok(()));
        store
            .expect_set()
            .with(eq("inochi_master_v1"), always())
            .times(1)
            .returning(|_, _| Err(anyhow::anyhow!("read-only filesystem")));

        let mut coordinator = TriageCoordinator::boot(TriageConfig::default(), Arc::new(store));
        let result = coordinator.set_admin_password("abcd", "abcd").await;

        assert!(matches!(result, Err(AdminError::Persistence(_))));
        assert!(!coordinator.is_password_set());
        assert!(!coordinator.is_busy());
    }

    #[tokio::test]
    async fn test_login_with_wrong_password() {
        let store = Arc::new(MemoryStore::new());
        let mut coordinator = boot(store);
        coordinator.set_admin_password("abcd", "abcd").await.unwrap();

        assert!(matches!(coordinator.login("abce").await, Err(AdminError::WrongPassword)));
        assert!(!coordinator.is_authenticated());
        assert_eq!(coordinator.catalog().admin.password_hash, sha256_hex("abcd"));
    }

    #[tokio::test]
    async fn test_change_password_check_order() {
        let store = Arc::new(MemoryStore::new());
        let mut coordinator = admin(store).await;

        assert!(matches!(
            coordinator.change_admin_password("wrong", "xy", "xy").await,
            Err(AdminError::WrongCurrentPassword)
        ));
        assert!(matches!(
            coordinator.change_admin_password("abcd", "xy", "xy").await,
            Err(AdminError::PasswordTooShort { min: 4 })
        ));
        coordinator.change_admin_password("abcd", "efgh", "efgh").await.unwrap();
        assert_eq!(coordinator.catalog().admin.password_hash, sha256_hex("efgh"));
    }

    #[tokio::test]
    async fn test_pending_credential_blocks_everything_else() {
        let store = Arc::new(MemoryStore::new());
        let mut coordinator = admin(store).await;

        let pending = coordinator
            .begin_credential_check(CredentialRequest::Login {
                password: "abcd".to_string(),
            })
            .unwrap();
        assert!(coordinator.is_busy());
        assert!(!coordinator.next_enabled());

        assert_eq!(
            coordinator.handle(WizardEvent::Start {
                mode: SeverityMode::Unsure
            }),
            Err(WizardError::CredentialCheckPending)
        );
        assert!(matches!(
            coordinator.add_staff("own", "中村", "なかむら"),
            Err(AdminError::CredentialCheckInProgress)
        ));
        assert!(matches!(
            coordinator.begin_credential_check(CredentialRequest::Login {
                password: "abcd".to_string()
            }),
            Err(AdminError::CredentialCheckInProgress)
        ));

        coordinator.abandon_credential_check(pending);
        assert!(!coordinator.is_busy());
        assert!(coordinator
            .handle(WizardEvent::Start {
                mode: SeverityMode::Unsure
            })
            .is_ok());
    }

    #[tokio::test]
    async fn test_digest_failure_clears_busy_flag() {
        let mut hasher = MockPasswordHasher::new();
        hasher
            .expect_digest()
            .returning(|_| Err(anyhow::anyhow!("crypto unavailable")));

        let store = Arc::new(MemoryStore::new());
        let mut coordinator = boot(store).with_hasher(Arc::new(hasher));

        assert!(matches!(
            coordinator.set_admin_password("abcd", "abcd").await,
            Err(AdminError::Digest(_))
        ));
        assert!(!coordinator.is_busy());
        assert!(!coordinator.is_password_set());
    }

    struct SlowHasher;

    #[async_trait::async_trait]
    impl PasswordHasher for SlowHasher {
        async fn digest(&self, candidate: String) -> Result<String> {
            tokio::time::sleep(std::time::Duration::from_secs(5)).await;
            Ok(sha256_hex(&candidate))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_login_releases_busy_flag() {
        let store = Arc::new(MemoryStore::new());
        let mut coordinator = boot(store);
        coordinator.store_password_hash(sha256_hex("abcd")).unwrap();
        let mut coordinator = coordinator.with_hasher(Arc::new(SlowHasher));

        let outcome = tokio::time::timeout(std::time::Duration::from_millis(20), coordinator.login("abcd")).await;

        assert!(outcome.is_err());
        assert!(!coordinator.is_busy());
        assert!(!coordinator.is_authenticated());
        assert_eq!(
            coordinator.handle(WizardEvent::Start {
                mode: SeverityMode::Emergency
            }),
            Ok(Step::StatusPicker)
        );
    }

    #[test]
    fn test_dropped_ticket_releases_busy_flag() {
        let store = Arc::new(MemoryStore::new());
        let mut coordinator = boot(store);

        let pending = coordinator
            .begin_credential_check(CredentialRequest::SetPassword {
                new_password: "abcd".to_string(),
                confirmation: "abcd".to_string(),
            })
            .unwrap();
        assert!(coordinator.is_busy());

        drop(pending);
        assert!(!coordinator.is_busy());
        assert!(coordinator
            .begin_credential_check(CredentialRequest::Login {
                password: "abcd".to_string()
            })
            .is_err_and(|e| matches!(e, AdminError::PasswordNotSet)));
    }

    #[tokio::test]
    async fn test_ticket_from_another_coordinator_is_rejected() {
        let mut issuer = boot(Arc::new(MemoryStore::new()));
        let store = Arc::new(MemoryStore::new());
        let mut target = boot(store.clone());

        let foreign = issuer
            .begin_credential_check(CredentialRequest::SetPassword {
                new_password: "abcd".to_string(),
                confirmation: "abcd".to_string(),
            })
            .unwrap();

        assert!(matches!(
            target.complete_credential_check(foreign).await,
            Err(AdminError::CredentialCheckNotIssued)
        ));
        assert!(!target.is_password_set());
        assert_eq!(store.get("inochi_master_v1").unwrap(), None);
        assert!(!issuer.is_busy());
        assert!(!issuer.is_password_set());
    }

    #[tokio::test]
    async fn test_too_short_password_never_reaches_the_hasher() {
        let mut hasher = MockPasswordHasher::new();
        hasher.expect_digest().times(0);
        let store = Arc::new(MemoryStore::new());
        let mut coordinator = boot(store).with_hasher(Arc::new(hasher));

        assert!(matches!(
            coordinator.begin_credential_check(CredentialRequest::SetPassword {
                new_password: "a".to_string(),
                confirmation: "zzz".to_string(),
            }),
            Err(AdminError::PasswordTooShort { min: 4 })
        ));
        assert!(!coordinator.is_busy());
        assert!(!coordinator.is_password_set());
    }

    #[tokio::test]
    async fn test_dispatch_hands_off_rendered_preview() {
        let store = Arc::new(MemoryStore::new());
        let mut coordinator = boot(store);
        coordinator
            .handle(WizardEvent::Start {
                mode: SeverityMode::Emergency,
            })
            .unwrap();
        coordinator
            .handle(WizardEvent::SelectSituation {
                id: "fall".to_string(),
            })
            .unwrap();

        let mut dispatcher = MockDispatcher::new();
        dispatcher
            .expect_open_mail()
            .withf(|link: &str| link.starts_with("mailto:safety@example.com,rescue@example.com,dispatch@example.com?subject="))
            .times(1)
            .returning(|_| Ok(()));
        dispatcher
            .expect_copy_to_clipboard()
            .withf(|text: &str| text.starts_with("宛先: safety@example.com, rescue@example.com, dispatch@example.com\n件名: "))
            .times(1)
            .returning(|_| Ok(()));

        coordinator.dispatch_mail(&dispatcher).unwrap();
        let copied = coordinator.copy_preview(&dispatcher).unwrap();
        assert!(copied.contains("「転落」、緊急救護必要"));
    }

    #[tokio::test]
    async fn test_import_and_export_round_trip() {
        let store = Arc::new(MemoryStore::new());
        let mut coordinator = admin(store.clone()).await;

        coordinator.add_staff("b", "中村 四郎", "なかむらしろう").unwrap();
        let exported = coordinator.export_catalog().unwrap();

        let mut fresh = admin(Arc::new(MemoryStore::new())).await;
        fresh.import_catalog(&exported).unwrap();
        assert_eq!(fresh.catalog(), coordinator.catalog());

        assert!(matches!(fresh.import_catalog("[1, 2]"), Err(AdminError::Import(_))));
        assert_eq!(fresh.catalog(), coordinator.catalog());
        assert_ne!(fresh.catalog(), &default_catalog());
    }
}
