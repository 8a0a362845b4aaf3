//! Sentenza configuration from YAML
//!
//! Everything here is optional; command-line flags override file values.
//!
//! ```yaml
//! provider: bitbucket
//! repository: SergioLeone/western-project
//! polling_rate: 5
//! auth:
//!   username: tuco
//!   password: app-password
//! providers:
//!   bitbucket:
//!     api_url: https://api.bitbucket.org/2.0
//! ```

use crate::core::error::{Result, SentenzaError};
use crate::provider::{Credentials, MAX_POLLING_RATE};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const DEFAULT_PROVIDER: &str = "bitbucket";

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentenzaConfig {
    /// Provider used when `--provider` is not given
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Repository used when `--repository` is not given
    #[serde(default)]
    pub repository: Option<String>,

    /// Credentials used when `--auth` is not given
    #[serde(default)]
    pub auth: Option<AuthConfig>,

    /// Seconds between two status polls
    #[serde(default = "default_polling_rate")]
    pub polling_rate: u64,

    /// Per-provider settings, keyed by provider name
    #[serde(default)]
    pub providers: HashMap<String, ProviderSettings>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub username: String,
    pub password: String,
}

impl From<AuthConfig> for Credentials {
    fn from(auth: AuthConfig) -> Self {
        Credentials::basic(auth.username, auth.password)
    }
}

/// Settings handed to a provider package when it is loaded
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderSettings {
    /// Override of the vendor API base URL
    #[serde(default)]
    pub api_url: Option<String>,
}

fn default_provider() -> String {
    DEFAULT_PROVIDER.to_string()
}

fn default_polling_rate() -> u64 {
    crate::provider::DEFAULT_POLLING_RATE
}

impl Default for SentenzaConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            repository: None,
            auth: None,
            polling_rate: default_polling_rate(),
            providers: HashMap::new(),
        }
    }
}

impl SentenzaConfig {
    /// Load from an explicit path, or from the default location if it exists
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => match Self::default_path().filter(|p| p.exists()) {
                Some(path) => Self::from_file(path),
                None => {
                    debug!("No configuration file found, using defaults");
                    Ok(Self::default())
                }
            },
        }
    }

    /// `<config dir>/sentenza/config.yaml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("sentenza").join("config.yaml"))
    }

    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading configuration from {}", path.display());
        let content = std::fs::read_to_string(path).map_err(|e| {
            SentenzaError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: SentenzaConfig =
            serde_yaml::from_str(yaml).map_err(|e| SentenzaError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.provider.trim().is_empty() {
            return Err(SentenzaError::Config("provider must not be empty".to_string()));
        }
        if self.polling_rate == 0 {
            return Err(SentenzaError::Config(
                "polling_rate must be at least 1 second".to_string(),
            ));
        }
        if self.polling_rate > MAX_POLLING_RATE {
            return Err(SentenzaError::Config(format!(
                "polling_rate must be at most {} seconds",
                MAX_POLLING_RATE
            )));
        }
        Ok(())
    }

    /// Settings for one provider, defaulted when absent
    pub fn provider_settings(&self, name: &str) -> ProviderSettings {
        self.providers.get(name).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_yaml_uses_defaults() {
        let config = SentenzaConfig::from_yaml("{}").unwrap();
        assert_eq!(config.provider, "bitbucket");
        assert_eq!(config.polling_rate, 10);
        assert!(config.repository.is_none());
        assert!(config.auth.is_none());
    }

    #[test]
    fn test_full_config() {
        let yaml = r#"
provider: bitbucket
repository: SergioLeone/western-project
polling_rate: 3
auth:
  username: tuco
  password: secret
providers:
  bitbucket:
    api_url: http://localhost:8080
"#;
        let config = SentenzaConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.repository.as_deref(), Some("SergioLeone/western-project"));
        assert_eq!(config.polling_rate, 3);
        assert_eq!(
            config.provider_settings("bitbucket").api_url.as_deref(),
            Some("http://localhost:8080")
        );
        assert_eq!(config.provider_settings("other"), ProviderSettings::default());

        let credentials: Credentials = config.auth.unwrap().into();
        assert_eq!(credentials, Credentials::basic("tuco", "secret"));
    }

    #[test]
    fn test_zero_polling_rate_is_rejected() {
        let result = SentenzaConfig::from_yaml("polling_rate: 0");
        assert!(matches!(result, Err(SentenzaError::Config(_))));
    }

    #[test]
    fn test_polling_rate_above_one_day_is_rejected() {
        let result = SentenzaConfig::from_yaml("polling_rate: 18446744073709551615");
        assert!(matches!(result, Err(SentenzaError::Config(_))));

        let config = SentenzaConfig::from_yaml("polling_rate: 86400").unwrap();
        assert_eq!(config.polling_rate, MAX_POLLING_RATE);
    }

    #[test]
    fn test_missing_file_is_a_config_error() {
        let result = SentenzaConfig::from_file("/nonexistent/sentenza.yaml");
        assert!(matches!(result, Err(SentenzaError::Config(_))));
    }
}
