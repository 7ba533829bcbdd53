//! Application configuration loading from petstore.toml
//!
//! Every section is optional; anything left out falls back to the storefront's
//! standard behaviour (18% tax, flat shipping of 100, 1.5s simulated payment,
//! embedded seed data, in-memory storage).

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Environment variable naming the configuration file.
pub const CONFIG_PATH_ENV: &str = "PETSTORE_CONFIG";
/// Configuration file used when [`CONFIG_PATH_ENV`] is unset.
pub const DEFAULT_CONFIG_PATH: &str = "petstore.toml";

/// Configuration structure representing the entire petstore.toml file
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Where session and cart state are persisted
    pub storage: StorageConfig,
    /// Where the initial dataset comes from
    pub seed: SeedConfig,
    /// Order total formula
    pub pricing: PricingConfig,
    /// Payment simulation
    pub checkout: CheckoutConfig,
}

/// Persisted client state location.
#[derive(Debug, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct StorageConfig {
    /// `"memory"` or a `SeaORM` `SQLite` url such as `sqlite://data/petstore.sqlite?mode=rwc`.
    /// Unset means `STORAGE_URL` or memory.
    pub url: Option<String>,
}

/// Seed data location.
#[derive(Debug, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct SeedConfig {
    /// Directory holding `users.json`, `pets.json`, ... Unset means the embedded seed.
    pub dir: Option<PathBuf>,
}

/// Order total formula: `subtotal + subtotal × tax_rate + shipping_fee`.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct PricingConfig {
    /// Fraction of the subtotal charged as tax
    pub tax_rate: f64,
    /// Flat fee added when the subtotal is positive
    pub shipping_fee: f64,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            tax_rate: 0.18,
            shipping_fee: 100.0,
        }
    }
}

/// Payment simulation settings.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct CheckoutConfig {
    /// Simulated processing time before a payment is confirmed
    pub payment_delay_ms: u64,
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            payment_delay_ms: 1500,
        }
    }
}

impl CheckoutConfig {
    #[must_use]
    pub const fn payment_delay(&self) -> Duration {
        Duration::from_millis(self.payment_delay_ms)
    }
}

impl AppConfig {
    fn validate(&self) -> Result<()> {
        let PricingConfig {
            tax_rate,
            shipping_fee,
        } = self.pricing;
        if !tax_rate.is_finite() || tax_rate < 0.0 {
            return Err(Error::Config {
                message: format!("pricing.tax_rate must be a non-negative number, got {tax_rate}"),
            });
        }
        if !shipping_fee.is_finite() || shipping_fee < 0.0 {
            return Err(Error::Config {
                message: format!(
                    "pricing.shipping_fee must be a non-negative number, got {shipping_fee}"
                ),
            });
        }
        Ok(())
    }
}

/// Parses configuration from TOML text.
///
/// # Errors
/// Returns an error if the TOML syntax is invalid or pricing values are negative.
pub fn parse_config(contents: &str) -> Result<AppConfig> {
    let config: AppConfig = toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse petstore.toml: {e}"),
    })?;
    config.validate()?;
    Ok(config)
}

/// Loads configuration from a TOML file
///
/// # Arguments
/// * `path` - Path to the petstore.toml file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - Pricing values are negative or not finite
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file: {e}"),
    })?;
    parse_config(&contents)
}

/// Loads the application configuration the way a host process should.
///
/// Loads `.env` (if present), reads the file named by `PETSTORE_CONFIG` (default
/// `petstore.toml`; a missing file means defaults), then lets `STORAGE_URL`
/// override the storage url.
pub fn load_app_configuration() -> Result<AppConfig> {
    // Non-fatal, env vars can be set externally
    dotenvy::dotenv().ok();

    let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let mut config = if Path::new(&path).exists() {
        debug!("Loading configuration from {}", path);
        load_config(&path)?
    } else {
        info!("No configuration file at {}, using defaults", path);
        AppConfig::default()
    };

    if let Ok(url) = std::env::var(super::storage::STORAGE_URL_ENV) {
        config.storage.url = Some(url);
    }
    Ok(config)
}
