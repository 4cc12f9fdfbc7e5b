//! KolEscrow Settings
//!
//! Configuration for the KolEscrow tools.
//!
//! ## Features
//!
//! - Escrow contract address used by finalization
//! - Leaf encoding truncation counts
//! - Default log level
//! - Environment overrides for the contract address and signer key
//!
//! ## Usage
//!
//! ```no_run
//! use kolescrow_settings::Settings;
//!
//! let mut settings = Settings::load_or_default()?.with_env_overrides();
//! settings.finalization.contract_address = "0x05ab".to_string();
//! settings.save()?;
//! # Ok::<(), kolescrow_settings::SettingsError>(())
//! ```

mod config;

pub use config::{
    FinalizationSettings, LoggingSettings, MerkleSettings, Settings, CONTRACT_ADDRESS_ENV,
    SIGNER_KEY_ENV,
};

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Failed to read settings: {0}")]
    ReadError(std::io::Error),

    #[error("Failed to write settings: {0}")]
    WriteError(std::io::Error),

    #[error("Failed to parse settings: {0}")]
    ParseError(serde_json::Error),

    #[error("Failed to create config directory: {0}")]
    CreateDirError(std::io::Error),
}

pub type Result<T> = std::result::Result<T, SettingsError>;

/// `$HOME/.kolescrow`, or `.kolescrow` in the working directory without a home
pub fn default_config_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".kolescrow")
}

/// Get the default settings file path
pub fn default_settings_path() -> PathBuf {
    default_config_dir().join("settings.json")
}
