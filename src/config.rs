use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure for the triage wizard
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct TriageConfig {
    /// Where the catalog and session blobs live
    pub storage: StorageConfig,
    /// Admin gate policy
    pub admin: AdminConfig,
    /// Message composition constants
    pub notification: NotificationConfig,
    /// Logging settings
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct StorageConfig {
    /// Directory holding one JSON file per storage key
    pub data_dir: PathBuf,
    /// Key of the catalog aggregate
    pub catalog_key: String,
    /// Key of the wizard session snapshot
    pub session_key: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct AdminConfig {
    /// Minimum accepted admin password length, in characters
    pub min_password_length: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct NotificationConfig {
    /// chrono format string for the `{time}` placeholder
    pub time_format: String,
    /// Rendered for `{detail}` when no note was entered
    pub no_detail_placeholder: String,
    /// Used when the situation has no subject template
    pub fallback_subject: String,
    /// Used when the situation has no body template for the action
    pub fallback_body: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ObservabilityConfig {
    /// Default filter directive when RUST_LOG is unset
    pub log_level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(".inochi-triage"),
            catalog_key: "inochi_master_v1".to_string(),
            session_key: "inochi_session_v1".to_string(),
        }
    }
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            min_password_length: 4,
        }
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            time_format: "%Y-%m-%d %H:%M".to_string(),
            no_detail_placeholder: "（追記なし）".to_string(),
            fallback_subject: "[命をツナグ] 連絡".to_string(),
            fallback_body: "{person} {company} {time}".to_string(),
        }
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json: true,
        }
    }
}

impl Default for TriageConfig {
    fn default() -> Self {
        Self {
            storage: StorageConfig::default(),
            admin: AdminConfig::default(),
            notification: NotificationConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl TriageConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Default values
    /// 2. Configuration file (inochi-triage.toml)
    /// 3. Environment variables (INOCHI_TRIAGE_<SECTION>__<KEY>)
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new("inochi-triage.toml"))
    }

    /// Same as [`TriageConfig::load`] with an explicit file location.
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);

        if path.exists() {
            builder = builder.add_source(File::from(path));
        }

        builder = builder.add_source(
            Environment::with_prefix("INOCHI_TRIAGE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        let triage_config: TriageConfig = config.try_deserialize()?;

        Ok(triage_config)
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let toml_content = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_content)?;
        Ok(())
    }

    /// Load .env file if it exists
    pub fn load_env_file() -> Result<()> {
        if Path::new(".env").exists() {
            dotenvy::dotenv()?;
            tracing::info!("Loaded environment variables from .env file");
        }
        Ok(())
    }
}
