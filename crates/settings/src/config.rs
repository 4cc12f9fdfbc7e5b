//! Configuration types

use std::fmt;
use std::path::PathBuf;

use kolescrow_logging::LogLevel;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{default_settings_path, Result, SettingsError};

/// Overrides `finalization.contract_address`
pub const CONTRACT_ADDRESS_ENV: &str = "KOLESCROW_CONTRACT_ADDRESS";

/// Attester private key; only ever read from the environment
pub const SIGNER_KEY_ENV: &str = "SIGNER_PRIVATE_KEY";

/// Main settings structure
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Finalization settings
    #[serde(default)]
    pub finalization: FinalizationSettings,

    /// Leaf encoding settings
    #[serde(default)]
    pub merkle: MerkleSettings,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingSettings,

    /// Attester key from the environment (never serialized)
    #[serde(skip)]
    signer_key: Option<String>,

    /// Custom settings file path (not serialized)
    #[serde(skip)]
    config_path: Option<PathBuf>,
}

impl Settings {
    /// Load settings from the default path, or create defaults
    pub fn load_or_default() -> Result<Self> {
        Self::load_from(&default_settings_path())
    }

    /// Load settings from a specific path, or create defaults
    pub fn load_from(path: &PathBuf) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path).map_err(SettingsError::ReadError)?;
            let mut settings: Settings =
                serde_json::from_str(&content).map_err(SettingsError::ParseError)?;
            settings.config_path = Some(path.clone());
            info!("Loaded settings from {:?}", path);
            Ok(settings)
        } else {
            let mut settings = Self::default();
            settings.config_path = Some(path.clone());
            Ok(settings)
        }
    }

    /// Apply `KOLESCROW_CONTRACT_ADDRESS` and `SIGNER_PRIVATE_KEY`.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(
            std::env::var(CONTRACT_ADDRESS_ENV).ok(),
            std::env::var(SIGNER_KEY_ENV).ok(),
        )
    }

    /// Apply explicit overrides; empty values are ignored.
    pub fn with_overrides(mut self, contract_address: Option<String>, signer_key: Option<String>) -> Self {
        if let Some(address) = contract_address.filter(|a| !a.trim().is_empty()) {
            self.finalization.contract_address = address.trim().to_string();
        }
        if let Some(key) = signer_key.filter(|k| !k.trim().is_empty()) {
            self.signer_key = Some(key);
        }
        self
    }

    pub fn signer_key(&self) -> Option<&str> {
        self.signer_key.as_deref()
    }

    pub fn config_path(&self) -> Option<&PathBuf> {
        self.config_path.as_ref()
    }

    /// Save settings to the configured path
    pub fn save(&self) -> Result<()> {
        let path = self.config_path.clone().unwrap_or_else(default_settings_path);
        self.save_to(&path)
    }

    /// Save settings to a specific path
    pub fn save_to(&self, path: &PathBuf) -> Result<()> {
        // Create parent directory if needed
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(SettingsError::CreateDirError)?;
            }
        }

        let content = serde_json::to_string_pretty(self).map_err(SettingsError::ParseError)?;
        std::fs::write(path, content).map_err(SettingsError::WriteError)?;
        info!("Saved settings to {:?}", path);
        Ok(())
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("finalization", &self.finalization)
            .field("merkle", &self.merkle)
            .field("logging", &self.logging)
            .field("signer_key", &self.signer_key.as_ref().map(|_| "<redacted>"))
            .field("config_path", &self.config_path)
            .finish()
    }
}

/// Finalization settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalizationSettings {
    /// Deployed escrow contract address, embedded verbatim in domain hashes
    #[serde(default)]
    pub contract_address: String,
}

/// Leaf encoding truncation counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerkleSettings {
    #[serde(default = "default_secure_hash_fields")]
    pub secure_hash_fields: usize,

    #[serde(default = "default_leaf_hash_fields")]
    pub leaf_hash_fields: usize,
}

fn default_secure_hash_fields() -> usize {
    7
}

fn default_leaf_hash_fields() -> usize {
    2
}

impl Default for MerkleSettings {
    fn default() -> Self {
        Self {
            secure_hash_fields: default_secure_hash_fields(),
            leaf_hash_fields: default_leaf_hash_fields(),
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingSettings {
    #[serde(default)]
    pub level: LogLevel,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("kolescrow-settings-{}-{}", std::process::id(), name))
            .join("settings.json")
    }

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert!(settings.finalization.contract_address.is_empty());
        assert_eq!(settings.merkle.secure_hash_fields, 7);
        assert_eq!(settings.merkle.leaf_hash_fields, 2);
        assert_eq!(settings.logging.level, LogLevel::Info);
        assert!(settings.signer_key().is_none());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings: Settings =
            serde_json::from_str(r#"{"merkle":{"secure_hash_fields":5}}"#).unwrap();
        assert_eq!(settings.merkle.secure_hash_fields, 5);
        assert_eq!(settings.merkle.leaf_hash_fields, 2);
        assert_eq!(settings.logging.level, LogLevel::Info);
    }

    #[test]
    fn test_overrides() {
        let settings = Settings::default()
            .with_overrides(Some(" 0x05ab ".to_string()), Some("0x01".to_string()));
        assert_eq!(settings.finalization.contract_address, "0x05ab");
        assert_eq!(settings.signer_key(), Some("0x01"));

        let untouched = Settings::default().with_overrides(Some(String::new()), None);
        assert!(untouched.finalization.contract_address.is_empty());
    }

    #[test]
    fn test_signer_key_never_serialized() {
        let settings = Settings::default().with_overrides(None, Some("0xsecret".to_string()));
        let json = serde_json::to_string(&settings).unwrap();
        assert!(!json.contains("secret"));
        assert!(!format!("{:?}", settings).contains("secret"));
    }

    #[test]
    fn test_save_and_load() {
        let path = temp_path("roundtrip");
        let mut settings = Settings::load_from(&path).unwrap();
        settings.finalization.contract_address = "0x05cd".to_string();
        settings.logging.level = LogLevel::Debug;
        settings.save().unwrap();

        let loaded = Settings::load_from(&path).unwrap();
        assert_eq!(loaded.finalization.contract_address, "0x05cd");
        assert_eq!(loaded.logging.level, LogLevel::Debug);
        assert_eq!(loaded.config_path(), Some(&path));

        if let Some(dir) = path.parent() {
            let _ = std::fs::remove_dir_all(dir);
        }
    }

    #[test]
    fn test_malformed_file() {
        let path = temp_path("malformed");
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir).unwrap();
        }
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            Settings::load_from(&path),
            Err(SettingsError::ParseError(_))
        ));
        if let Some(dir) = path.parent() {
            let _ = std::fs::remove_dir_all(dir);
        }
    }
}
