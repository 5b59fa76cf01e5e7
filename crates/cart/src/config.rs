//! Cart configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All optional:
//! - `PANIER_STORAGE_DIR` - Directory for file-backed storage (default: `.panier`)
//! - `PANIER_STORAGE_KEY` - Key the cart is stored under (default: `cart`)
//! - `PANIER_CURRENCY` - Currency for prices without a symbol and for totals (default: `EUR`)
//! - `PANIER_LOG_FORMAT` - `pretty` or `json` (default: `pretty`)

use std::path::PathBuf;
use std::str::FromStr;

use panier_core::CurrencyCode;
use thiserror::Error;

use crate::storage::validate_key;
use crate::store::CART_STORAGE_KEY;

const DEFAULT_STORAGE_DIR: &str = ".panier";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            _ => Err(format!("expected `pretty` or `json`, got `{s}`")),
        }
    }
}

/// Cart application configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartConfig {
    /// Directory holding file-backed storage
    pub storage_dir: PathBuf,
    /// Key the cart is persisted under
    pub storage_key: String,
    /// Currency for totals and symbol-less prices
    pub currency: CurrencyCode,
    /// Log output format
    pub log_format: LogFormat,
}

impl Default for CartConfig {
    fn default() -> Self {
        Self {
            storage_dir: PathBuf::from(DEFAULT_STORAGE_DIR),
            storage_key: CART_STORAGE_KEY.to_string(),
            currency: CurrencyCode::default(),
            log_format: LogFormat::default(),
        }
    }
}

impl CartConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let storage_dir = lookup("PANIER_STORAGE_DIR")
            .filter(|dir| !dir.is_empty())
            .map_or(defaults.storage_dir, PathBuf::from);

        let storage_key = lookup("PANIER_STORAGE_KEY").unwrap_or(defaults.storage_key);
        validate_key(&storage_key).map_err(|e| {
            ConfigError::InvalidEnvVar("PANIER_STORAGE_KEY".to_string(), e.to_string())
        })?;

        let currency = parse_or_default(&lookup, "PANIER_CURRENCY", defaults.currency)?;
        let log_format = parse_or_default(&lookup, "PANIER_LOG_FORMAT", defaults.log_format)?;

        Ok(Self {
            storage_dir,
            storage_key,
            currency,
            log_format,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse a variable, falling back to `default` when unset.
fn parse_or_default<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr<Err = String>,
{
    lookup(key).map_or(Ok(default), |value| {
        value
            .parse()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e))
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<CartConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        CartConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config, CartConfig::default());
        assert_eq!(config.storage_key, "cart");
        assert_eq!(config.storage_dir, PathBuf::from(".panier"));
        assert_eq!(config.currency, CurrencyCode::EUR);
        assert_eq!(config.log_format, LogFormat::Pretty);
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("PANIER_STORAGE_DIR", "/tmp/carts"),
            ("PANIER_STORAGE_KEY", "panier"),
            ("PANIER_CURRENCY", "usd"),
            ("PANIER_LOG_FORMAT", "JSON"),
        ])
        .unwrap();
        assert_eq!(config.storage_dir, PathBuf::from("/tmp/carts"));
        assert_eq!(config.storage_key, "panier");
        assert_eq!(config.currency, CurrencyCode::USD);
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn test_empty_storage_dir_uses_default() {
        let config = load(&[("PANIER_STORAGE_DIR", "")]).unwrap();
        assert_eq!(config.storage_dir, PathBuf::from(".panier"));
    }

    #[test]
    fn test_invalid_currency() {
        let err = load(&[("PANIER_CURRENCY", "BTC")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref k, _) if k == "PANIER_CURRENCY"));
    }

    #[test]
    fn test_invalid_log_format() {
        assert!(load(&[("PANIER_LOG_FORMAT", "xml")]).is_err());
    }

    #[test]
    fn test_invalid_storage_key() {
        for key in ["", "../cart", "a/b"] {
            let err = load(&[("PANIER_STORAGE_KEY", key)]).unwrap_err();
            assert!(matches!(err, ConfigError::InvalidEnvVar(ref k, _) if k == "PANIER_STORAGE_KEY"));
        }
    }
}
