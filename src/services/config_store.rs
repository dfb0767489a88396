// Configuration Storage Service
// Handles config file read/write and version backup

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::models::CheckerConfig;
use crate::services::analysis::CHECKER_VERSION;
use crate::services::search::SearchConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub checker: CheckerConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            search: SearchConfig::default(),
            checker: CheckerConfig::default(),
        }
    }
}

fn default_version() -> String { CHECKER_VERSION.to_string() }

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
        dirs::config_dir().map(|p| p.join("copycheck"))
    }

    /// Ensure config directory exists
    pub fn ensure_dir(&self) -> Result<(), String> {
        fs::create_dir_all(&self.config_dir)
            .map_err(|e| format!("Failed to create config dir: {}", e))
    }

    /// Load configuration from file, falling back to defaults
    pub fn load(&self) -> Result<AppConfig, String> {
        if !self.config_file.exists() {
            return Ok(AppConfig::default());
        }

        let content = fs::read_to_string(&self.config_file)
            .map_err(|e| format!("Failed to read config: {}", e))?;

        serde_json::from_str(&content)
            .map_err(|e| format!("Failed to parse config: {}", e))
    }

    /// Save configuration to file
    pub fn save(&self, config: &AppConfig) -> Result<(), String> {
        self.ensure_dir()?;

        // Create backup if file exists
        if self.config_file.exists() {
            self.create_backup()?;
        }

        let content = serde_json::to_string_pretty(config)
            .map_err(|e| format!("Failed to serialize config: {}", e))?;

        fs::write(&self.config_file, content)
            .map_err(|e| format!("Failed to write config: {}", e))
    }

    /// Store Google API credentials in the config file
    pub fn set_credentials(&self, api_key: &str, search_engine_id: &str) -> Result<(), String> {
        let mut config = self.load()?;
        config.search.api_key = api_key.to_string();
        config.search.search_engine_id = search_engine_id.to_string();
        self.save(&config)
    }

    /// Remove stored credentials
    pub fn clear_credentials(&self) -> Result<(), String> {
        let mut config = self.load()?;
        config.search.api_key = String::new();
        config.search.search_engine_id = String::new();
        self.save(&config)
    }

    /// Create a backup of current config
    fn create_backup(&self) -> Result<(), String> {
        let backup_dir = self.config_dir.join("backups");
        fs::create_dir_all(&backup_dir)
            .map_err(|e| format!("Failed to create backup dir: {}", e))?;

        let timestamp = chrono::Utc::now().format("%Y%m%d_%H%M%S");
        let backup_file = backup_dir.join(format!("config_{}.json", timestamp));

        fs::copy(&self.config_file, &backup_file)
            .map_err(|e| format!("Failed to create backup: {}", e))?;

        // Keep only last 10 backups
        self.cleanup_old_backups(&backup_dir, 10)?;

        Ok(())
    }

    /// Remove old backups, keeping only the most recent N
    fn cleanup_old_backups(&self, backup_dir: &PathBuf, keep: usize) -> Result<(), String> {
        let mut entries: Vec<_> = fs::read_dir(backup_dir)
            .map_err(|e| format!("Failed to read backup dir: {}", e))?
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().map_or(false, |ext| ext == "json"))
            .collect();

        if entries.len() <= keep {
            return Ok(());
        }

        // Sort by modification time (oldest first)
        entries.sort_by_key(|e| {
            e.metadata()
                .and_then(|m| m.modified())
                .unwrap_or(std::time::SystemTime::UNIX_EPOCH)
        });

        // Remove oldest entries
        for entry in entries.iter().take(entries.len() - keep) {
            let _ = fs::remove_file(entry.path());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.version, "2.0");
        assert_eq!(config.checker.similarity_threshold, 0.65);
        assert_eq!(config.search.max_results, 5);
        assert!(config.search.api_key.is_empty());
    }

    #[test]
    fn test_config_serialization() {
        let mut config = AppConfig::default();
        config.search.api_key = "test-key".to_string();
        config.checker.similarity_threshold = 0.8;

        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("similarityThreshold"));
        assert!(json.contains("searchEngineId"));

        let parsed: AppConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.version, "2.0");
        assert_eq!(parsed.search.api_key, "test-key");
        assert_eq!(parsed.checker.similarity_threshold, 0.8);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let parsed: AppConfig = serde_json::from_str(r#"{"version":"2.0"}"#).unwrap();
        assert_eq!(parsed.checker.similarity_threshold, 0.65);
        assert_eq!(parsed.search.request_delay_ms, 1200);
        assert_eq!(parsed.search.daily_budget, 100);
    }
}
