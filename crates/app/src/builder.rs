//! App builder for fluent initialization

use std::path::PathBuf;
use std::sync::Arc;

use kolescrow_logging::{try_init as try_init_logging, LogLevel};
use kolescrow_merkle::{Distributor, LeafEncoding, NodeCombiner, Sha256Combiner};
use kolescrow_settings::Settings;

use crate::{App, Result};

/// Builder for creating KolEscrow applications
pub struct AppBuilder {
    name: Option<String>,
    version: Option<String>,
    verbose: bool,
    log_level: Option<LogLevel>,
    config_path: Option<PathBuf>,
    contract_address: Option<String>,
    combiner: Option<Box<dyn NodeCombiner>>,
    skip_logging: bool,
    skip_settings: bool,
    skip_env: bool,
    skip_banner: bool,
}

impl AppBuilder {
    /// Create a new app builder
    pub fn new() -> Self {
        Self {
            name: None,
            version: None,
            verbose: false,
            log_level: None,
            config_path: None,
            contract_address: None,
            combiner: None,
            skip_logging: false,
            skip_settings: false,
            skip_env: false,
            skip_banner: false,
        }
    }

    /// Set the application name
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the application version
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Enable verbose logging (debug level)
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Set explicit log level
    pub fn log_level(mut self, level: LogLevel) -> Self {
        self.log_level = Some(level);
        self
    }

    /// Set custom config path
    pub fn config_path(mut self, path: PathBuf) -> Self {
        self.config_path = Some(path);
        self
    }

    /// Contract address taking precedence over settings and environment
    pub fn contract_address(mut self, address: impl Into<String>) -> Self {
        self.contract_address = Some(address.into());
        self
    }

    /// Replace the placeholder SHA-256 node combiner
    pub fn combiner(mut self, combiner: Box<dyn NodeCombiner>) -> Self {
        self.combiner = Some(combiner);
        self
    }

    /// Skip logging initialization (useful for tests)
    pub fn skip_logging(mut self) -> Self {
        self.skip_logging = true;
        self
    }

    /// Skip settings loading
    pub fn skip_settings(mut self) -> Self {
        self.skip_settings = true;
        self
    }

    /// Ignore environment overrides (useful for tests)
    pub fn skip_env(mut self) -> Self {
        self.skip_env = true;
        self
    }

    /// Skip startup banner
    pub fn skip_banner(mut self) -> Self {
        self.skip_banner = true;
        self
    }

    /// Build the application
    pub fn build(self) -> Result<App> {
        let name = self.name.unwrap_or_else(|| "kolescrow".to_string());
        let version = self.version.unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string());

        // Load settings
        let mut settings = if self.skip_settings {
            Settings::default()
        } else if let Some(path) = self.config_path {
            Settings::load_from(&path)?
        } else {
            Settings::load_or_default()?
        };
        if !self.skip_env {
            settings = settings.with_env_overrides();
        }
        if let Some(address) = self.contract_address {
            settings = settings.with_overrides(Some(address), None);
        }

        // Initialize logging
        if !self.skip_logging {
            let level = self.log_level.unwrap_or(if self.verbose {
                LogLevel::Debug
            } else {
                settings.logging.level
            });

            // Try to initialize, ignore if already initialized
            let _ = try_init_logging(level);
        }

        let encoding = LeafEncoding {
            secure_hash_fields: settings.merkle.secure_hash_fields,
            leaf_hash_fields: settings.merkle.leaf_hash_fields,
        };
        let combiner = self.combiner.unwrap_or_else(|| Box::new(Sha256Combiner));

        let app = App {
            name,
            version,
            settings: Arc::new(settings),
            distributor: Arc::new(Distributor::new(encoding, combiner)),
        };

        // Log startup banner
        if !self.skip_banner && !self.skip_logging {
            app.log_startup();
        }

        Ok(app)
    }
}

impl Default for AppBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AppError;
    use kolescrow_core::HexHash;

    fn quiet() -> AppBuilder {
        AppBuilder::new()
            .skip_logging()
            .skip_settings()
            .skip_env()
            .skip_banner()
    }

    #[test]
    fn test_builder_defaults() {
        let app = quiet().build().unwrap();
        assert_eq!(app.name(), "kolescrow");
        assert!(!app.version().is_empty());
        assert_eq!(*app.distributor().encoding(), LeafEncoding::default());
        assert!(app.signer_key().is_none());
    }

    #[test]
    fn test_builder_custom_name() {
        let app = quiet().name("my-app").version("1.0.0").build().unwrap();
        assert_eq!(app.name(), "my-app");
        assert_eq!(app.version(), "1.0.0");
    }

    #[test]
    fn test_finalizer_requires_contract() {
        let app = quiet().build().unwrap();
        assert!(matches!(app.finalizer(), Err(AppError::InvalidConfig(_))));

        let app = quiet().contract_address("0x05ab").build().unwrap();
        assert_eq!(app.finalizer().unwrap().contract_address(), "0x05ab");
    }

    #[test]
    fn test_invalid_contract_rejected() {
        let app = quiet().contract_address("0x1,2").build().unwrap();
        assert!(matches!(app.finalizer(), Err(AppError::Escrow(_))));
    }

    #[test]
    fn test_settings_from_file() {
        let dir = std::env::temp_dir().join(format!("kolescrow-app-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("settings.json");
        std::fs::write(
            &path,
            r#"{"finalization":{"contract_address":"0x0777"},"merkle":{"secure_hash_fields":6}}"#,
        )
        .unwrap();

        let app = AppBuilder::new()
            .skip_logging()
            .skip_env()
            .skip_banner()
            .config_path(path)
            .build()
            .unwrap();
        assert_eq!(app.finalizer().unwrap().contract_address(), "0x0777");
        assert_eq!(app.distributor().encoding().secure_hash_fields, 6);

        let _ = std::fs::remove_dir_all(&dir);
    }

    struct Reversed;

    impl NodeCombiner for Reversed {
        fn combine(&self, left: &str, right: &str) -> HexHash {
            Sha256Combiner.combine(right, left)
        }

        fn name(&self) -> &'static str {
            "reversed"
        }
    }

    #[test]
    fn test_custom_combiner() {
        let app = quiet().combiner(Box::new(Reversed)).build().unwrap();
        assert_eq!(app.distributor().combiner().name(), "reversed");
    }
}
