// Configuration Storage Service
// Handles config file read/write, validation and version backup

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::models::OptimizationLevel;
use crate::services::engine::service_client::DEFAULT_ENGINE_URL;
use crate::services::errors::EngineError;

pub const ENGINE_URL_ENV: &str = "SEMOPT_ENGINE_URL";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
    #[serde(default)]
    pub optimization: OptimizationConfig,
    /// JSON file overriding the built-in sentiment/emotion/discourse lists
    #[serde(default)]
    pub lexicon_path: Option<PathBuf>,
    /// JSON synonym database; the built-in table is used when absent
    #[serde(default)]
    pub thesaurus_path: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            engine: EngineConfig::default(),
            limits: LimitsConfig::default(),
            optimization: OptimizationConfig::default(),
            lexicon_path: None,
            thesaurus_path: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineConfig {
    #[serde(default = "default_service_url")]
    pub service_url: String,
    #[serde(default = "default_model_name")]
    pub model_name: String,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_true")]
    pub fallback_to_heuristic: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            service_url: default_service_url(),
            model_name: default_model_name(),
            timeout_secs: default_timeout(),
            fallback_to_heuristic: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LimitsConfig {
    #[serde(default = "default_min_length")]
    pub min_text_length: usize,
    #[serde(default = "default_max_length")]
    pub max_text_length: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            min_text_length: default_min_length(),
            max_text_length: default_max_length(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationConfig {
    #[serde(default)]
    pub default_level: OptimizationLevel,
    /// Carried for callers; no cache is kept.
    #[serde(default = "default_cache_size")]
    pub cache_size: usize,
}

impl Default for OptimizationConfig {
    fn default() -> Self {
        Self {
            default_level: OptimizationLevel::Medium,
            cache_size: default_cache_size(),
        }
    }
}

fn default_version() -> String { env!("CARGO_PKG_VERSION").to_string() }
fn default_service_url() -> String { DEFAULT_ENGINE_URL.to_string() }
fn default_model_name() -> String { "en_core_web_sm".to_string() }
fn default_timeout() -> u64 { 30 }
fn default_true() -> bool { true }
fn default_min_length() -> usize { 1 }
fn default_max_length() -> usize { 10000 }
fn default_cache_size() -> usize { 1000 }

impl AppConfig {
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.limits.max_text_length == 0 {
            return Err(EngineError::InvalidConfiguration(
                "maxTextLength must be greater than 0".to_string(),
            ));
        }
        if self.limits.min_text_length > self.limits.max_text_length {
            return Err(EngineError::InvalidConfiguration(format!(
                "minTextLength ({}) exceeds maxTextLength ({})",
                self.limits.min_text_length, self.limits.max_text_length
            )));
        }
        if self.engine.service_url.trim().is_empty() {
            return Err(EngineError::InvalidConfiguration("engine serviceUrl is empty".to_string()));
        }
        Ok(())
    }

    /// Apply environment overrides (currently only the engine URL)
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var(ENGINE_URL_ENV) {
            if !url.trim().is_empty() {
                info!(url = %url, "[config] engine url overridden from environment");
                self.engine.service_url = url.trim().to_string();
            }
        }
        self
    }
}

pub struct ConfigStore {
    config_dir: PathBuf,
    config_file: PathBuf,
}

impl ConfigStore {
    pub fn new(config_dir: PathBuf) -> Self {
        let config_file = config_dir.join("config.json");
        Self { config_dir, config_file }
    }

    /// Get default config directory
    pub fn default_config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("semanticOptimizer"))
    }

    pub fn config_file(&self) -> &Path {
        &self.config_file
    }

    /// Ensure config directory exists
    pub fn ensure_dir(&self) -> Result<(), String> {
        fs::create_dir_all(&self.config_dir)
            .map_err(|e| format!("Failed to create config dir: {}", e))
    }

    /// Load configuration from file; a missing file yields defaults
    pub fn load(&self) -> Result<AppConfig, String> {
        if !self.config_file.exists() {
            return Ok(AppConfig::default());
        }

        let content = fs::read_to_string(&self.config_file)
            .map_err(|e| format!("Failed to read config: {}", e))?;

        let config: AppConfig = serde_json::from_str(&content)
            .map_err(|e| format!("Failed to parse config: {}", e))?;
        config.validate().map_err(|e| e.to_string())?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, config: &AppConfig) -> Result<(), String> {
        config.validate().map_err(|e| e.to_string())?;
        self.ensure_dir()?;

        if self.config_file.exists() {
            self.create_backup()?;
        }

        let content = serde_json::to_string_pretty(config)
            .map_err(|e| format!("Failed to serialize config: {}", e))?;

        fs::write(&self.config_file, content)
            .map_err(|e| format!("Failed to write config: {}", e))
    }

    fn create_backup(&self) -> Result<(), String> {
        let backup_dir = self.config_dir.join("backups");
        fs::create_dir_all(&backup_dir)
            .map_err(|e| format!("Failed to create backup dir: {}", e))?;

        let timestamp = chrono::Utc::now().format("%Y%m%d_%H%M%S_%3f");
        let backup_file = backup_dir.join(format!("config_{}.json", timestamp));

        fs::copy(&self.config_file, &backup_file)
            .map_err(|e| format!("Failed to create backup: {}", e))?;

        self.cleanup_old_backups(&backup_dir, 10)
    }

    /// Remove old backups, keeping only the most recent N
    fn cleanup_old_backups(&self, backup_dir: &Path, keep: usize) -> Result<(), String> {
        let mut entries: Vec<_> = fs::read_dir(backup_dir)
            .map_err(|e| format!("Failed to read backup dir: {}", e))?
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().is_some_and(|ext| ext == "json"))
            .collect();

        if entries.len() <= keep {
            return Ok(());
        }

        // Oldest first; the timestamped name breaks mtime ties
        entries.sort_by_key(|e| {
            (
                e.metadata()
                    .and_then(|m| m.modified())
                    .unwrap_or(std::time::SystemTime::UNIX_EPOCH),
                e.file_name(),
            )
        });

        for entry in entries.iter().take(entries.len() - keep) {
            let _ = fs::remove_file(entry.path());
        }

        Ok(())
    }
}
