//! Shared helpers for the triage integration tests
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use anyhow::Result;
use chrono::{NaiveDate, NaiveDateTime};

use inochi_triage::{
    Dispatcher, FixedClock, KeyValueStore, MemoryStore, TriageConfig, TriageCoordinator,
};

pub const CATALOG_KEY: &str = "inochi_master_v1";
pub const SESSION_KEY: &str = "inochi_session_v1";
pub const ADMIN_PASSWORD: &str = "anzen-dai-ichi";

/// 2026-10-18 09:05, the time every composed message is stamped with
pub fn incident_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 10, 18)
        .and_then(|d| d.and_hms_opt(9, 5, 0))
        .expect("valid fixture timestamp")
}

pub fn memory_store() -> Arc<MemoryStore> {
    Arc::new(MemoryStore::new())
}

/// Coordinator over `store` with a frozen clock
pub fn boot(store: &Arc<MemoryStore>) -> TriageCoordinator {
    let store: Arc<dyn KeyValueStore> = store.clone();
    TriageCoordinator::boot(TriageConfig::default(), store).with_clock(Arc::new(FixedClock(incident_time())))
}

/// Booted coordinator with the admin password set and logged in
pub async fn boot_as_admin(store: &Arc<MemoryStore>) -> TriageCoordinator {
    let mut coordinator = boot(store);
    if !coordinator.is_password_set() {
        coordinator
            .set_admin_password(ADMIN_PASSWORD, ADMIN_PASSWORD)
            .await
            .expect("first-run password");
    }
    coordinator.login(ADMIN_PASSWORD).await.expect("admin login");
    coordinator
}

/// Dispatcher that records what it was handed
#[derive(Debug, Default)]
pub struct RecordingDispatcher {
    pub opened: Mutex<Vec<String>>,
    pub copied: Mutex<Vec<String>>,
}

impl Dispatcher for RecordingDispatcher {
    fn open_mail(&self, link: &str) -> Result<()> {
        self.opened
            .lock()
            .map_err(|_| anyhow::anyhow!("poisoned"))?
            .push(link.to_string());
        Ok(())
    }

    fn copy_to_clipboard(&self, text: &str) -> Result<()> {
        self.copied
            .lock()
            .map_err(|_| anyhow::anyhow!("poisoned"))?
            .push(text.to_string());
        Ok(())
    }
}
