//! KolEscrow App Framework
//!
//! Standard initialization for KolEscrow binaries: logging, settings and
//! the merkle and finalization services configured from them.
//!
//! ## Usage
//!
//! ```no_run
//! use kolescrow_app::App;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let app = App::builder()
//!         .name("kolescrow")
//!         .verbose(true)
//!         .build()?;
//!
//!     let finalizer = app.finalizer()?;
//!     println!("{}", finalizer.contract_address());
//!     Ok(())
//! }
//! ```

mod builder;

pub use builder::AppBuilder;

use std::sync::Arc;

use kolescrow_core::EscrowError;
use kolescrow_finalize::Finalizer;
use kolescrow_merkle::Distributor;
use kolescrow_settings::{Settings, CONTRACT_ADDRESS_ENV};
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Initialization failed: {0}")]
    InitFailed(String),

    #[error("Settings error: {0}")]
    Settings(#[from] kolescrow_settings::SettingsError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Escrow(#[from] EscrowError),
}

pub type Result<T> = std::result::Result<T, AppError>;

/// Initialized KolEscrow application
pub struct App {
    name: String,
    version: String,
    settings: Arc<Settings>,
    distributor: Arc<Distributor>,
}

impl App {
    /// Create a new app builder
    pub fn builder() -> AppBuilder {
        AppBuilder::new()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Get application settings
    pub fn settings(&self) -> Arc<Settings> {
        self.settings.clone()
    }

    /// Tree builder and verifier with the configured leaf encoding
    pub fn distributor(&self) -> Arc<Distributor> {
        self.distributor.clone()
    }

    /// Finalizer bound to the configured contract address.
    ///
    /// Fails when no contract address is configured, since every
    /// signature would otherwise commit to the wrong domain.
    pub fn finalizer(&self) -> Result<Finalizer> {
        let address = &self.settings.finalization.contract_address;
        if address.is_empty() {
            return Err(AppError::InvalidConfig(format!(
                "finalization.contract_address is not set (or set {})",
                CONTRACT_ADDRESS_ENV
            )));
        }
        Ok(Finalizer::new(address.clone())?)
    }

    /// Attester key from the environment, if any
    pub fn signer_key(&self) -> Option<&str> {
        self.settings.signer_key()
    }

    /// Log startup banner
    pub fn log_startup(&self) {
        info!("KolEscrow {} ({})", self.version, self.name);
        info!(
            "Leaf encoding: {} secure fields, {} leaf fields, combiner {}",
            self.distributor.encoding().secure_hash_fields,
            self.distributor.encoding().leaf_hash_fields,
            self.distributor.combiner().name()
        );
        if self.settings.finalization.contract_address.is_empty() {
            info!("No escrow contract configured");
        } else {
            info!("Escrow contract {}", self.settings.finalization.contract_address);
        }
    }
}
