//! Application configuration.
//!
//! Read from `<config_dir>/pinechat/config.toml` (e.g. `~/.config/pinechat/config.toml`).
//! Every section is optional; missing keys take their defaults.
//!
//! ```toml
//! [backend]
//! base_url = "https://assistant.example.com"
//! timeout_secs = 30
//!
//! [endpoints]
//! query = "/query"
//!
//! [merchant]
//! default_name = "IRCTC E-ticketing"
//! ```

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{PinechatError, Result};
use crate::merchant::DEFAULT_MERCHANT_NAME;

/// Overrides `backend.base_url`.
pub const ENV_BASE_URL: &str = "PINECHAT_BASE_URL";
/// Overrides `merchant.default_name`.
pub const ENV_MERCHANT: &str = "PINECHAT_MERCHANT";

const APP_DIR: &str = "pinechat";
const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub backend: BackendConfig,
    pub endpoints: EndpointsConfig,
    pub merchant: MerchantConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            timeout_secs: 30,
        }
    }
}

impl BackendConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Paths of the backend endpoints, relative to `backend.base_url`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointsConfig {
    pub query: String,
    pub business_insights: String,
    pub card_insights: String,
    pub weekly_insights: String,
    pub business_insights_get: String,
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            query: "/query".to_string(),
            business_insights: "/business-insights".to_string(),
            card_insights: "/get-cards-data".to_string(),
            weekly_insights: "/weekly-insights".to_string(),
            business_insights_get: "/business-insights".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MerchantConfig {
    /// Used by every surface when the page names no merchant.
    pub default_name: String,
}

impl Default for MerchantConfig {
    fn default() -> Self {
        Self {
            default_name: DEFAULT_MERCHANT_NAME.to_string(),
        }
    }
}

impl AppConfig {
    /// Loads the configuration and applies environment overrides.
    ///
    /// With an explicit `path` the file must exist. Without one, the default
    /// location is tried and a missing file yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                _ => {
                    tracing::debug!("No config file found, using defaults");
                    Self::default()
                }
            },
        };

        let config = config.with_overrides(|key| env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| PinechatError::Io {
            message: format!("Failed to read config file at {}: {}", path.display(), e),
        })?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Returns `<config_dir>/pinechat/config.toml` when a config dir exists.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
    }

    /// Applies overrides from a variable lookup (normally the process environment).
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(base_url) = lookup(ENV_BASE_URL).filter(|v| !v.trim().is_empty()) {
            self.backend.base_url = base_url;
        }
        if let Some(merchant) = lookup(ENV_MERCHANT).filter(|v| !v.trim().is_empty()) {
            self.merchant.default_name = merchant;
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.backend.base_url.trim().is_empty() {
            return Err(PinechatError::config("backend.base_url must not be empty"));
        }
        if self.backend.timeout_secs == 0 {
            return Err(PinechatError::config("backend.timeout_secs must be greater than 0"));
        }
        if self.merchant.default_name.trim().is_empty() {
            return Err(PinechatError::config("merchant.default_name must not be empty"));
        }
        Ok(())
    }
}
