//! Provider registry
//!
//! Providers ship as packages named `sentenza-<name>`. A package is
//! registered once at start-up; loading it by short name yields its default
//! provider, checked against the provider contract.

use crate::core::config::ProviderSettings;
use crate::core::error::{Result, SentenzaError};
use crate::provider::{Provider, Sentenza};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

pub const PACKAGE_PREFIX: &str = "sentenza";

/// `sentenza-<provider>`
pub fn package_name(provider: &str) -> String {
    format!("{}-{}", PACKAGE_PREFIX, provider)
}

/// What a loaded package exposes
#[derive(Clone, Default)]
pub struct ProviderModule {
    pub default: Option<Arc<dyn Provider>>,
}

impl ProviderModule {
    pub fn new(provider: Arc<dyn Provider>) -> Self {
        Self {
            default: Some(provider),
        }
    }
}

/// An installable provider package
pub trait ProviderPackage: Send + Sync {
    /// Full package name, e.g. `sentenza-bitbucket`
    fn package(&self) -> &str;

    fn version(&self) -> &str;

    /// Instantiate the package with its settings
    fn load(&self, settings: &ProviderSettings) -> Result<ProviderModule>;
}

/// A provider ready for configuration
#[derive(Clone)]
pub struct LoadedProvider {
    pub provider: Arc<dyn Provider>,
    pub package: String,
    pub version: String,
}

impl LoadedProvider {
    /// Start a fresh configuration for this provider
    pub fn sentenza(&self) -> Sentenza {
        Sentenza::new(self.provider.clone())
    }
}

/// Maps package names to packages
#[derive(Default)]
pub struct ProviderRegistry {
    packages: BTreeMap<String, Box<dyn ProviderPackage>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every provider compiled into this binary
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(crate::providers::bitbucket::BitbucketPackage));
        registry
    }

    /// Register a package, replacing any package with the same name
    pub fn register(&mut self, package: Box<dyn ProviderPackage>) {
        debug!("registering provider package {}", package.package());
        self.packages.insert(package.package().to_string(), package);
    }

    /// Registered `(provider name, version)` pairs
    pub fn providers(&self) -> Vec<(&str, &str)> {
        let prefix = format!("{}-", PACKAGE_PREFIX);
        self.packages
            .iter()
            .map(|(name, package)| {
                (name.strip_prefix(&prefix).unwrap_or(name.as_str()), package.version())
            })
            .collect()
    }

    /// Resolve a provider by short name
    pub fn load(&self, provider: &str, settings: &ProviderSettings) -> Result<LoadedProvider> {
        let package_name = package_name(provider);
        debug!("importing provider {}", package_name);

        let package = self
            .packages
            .get(&package_name)
            .ok_or_else(|| SentenzaError::ProviderNotFound {
                provider: provider.to_string(),
                package: package_name.clone(),
            })?;

        let module = package.load(settings).map_err(|e| match e {
            e @ SentenzaError::ProviderLoad { .. } => e,
            other => SentenzaError::ProviderLoad {
                package: package_name.clone(),
                reason: other.to_string(),
            },
        })?;

        let instance = module.default.ok_or_else(|| SentenzaError::NoDefaultExport {
            package: package_name.clone(),
        })?;

        let capabilities = instance.capabilities();
        debug!(
            has_on = capabilities.on,
            has_trigger = capabilities.trigger,
            "validating provider {}",
            package_name
        );
        if !capabilities.is_complete() {
            return Err(SentenzaError::InvalidProvider {
                package: package_name,
            });
        }

        Ok(LoadedProvider {
            provider: instance,
            package: package_name,
            version: package.version().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_package_name() {
        assert_eq!(package_name("bitbucket"), "sentenza-bitbucket");
    }

    #[test]
    fn test_unknown_provider() {
        let registry = ProviderRegistry::new();
        let result = registry.load("not-existing", &ProviderSettings::default());
        match result {
            Err(SentenzaError::ProviderNotFound { provider, package }) => {
                assert_eq!(provider, "not-existing");
                assert_eq!(package, "sentenza-not-existing");
            }
            Err(other) => panic!("unexpected error: {}", other),
            Ok(_) => panic!("expected an error"),
        }
    }

    #[test]
    fn test_builtin_registry_loads_bitbucket() {
        let registry = ProviderRegistry::builtin();
        assert_eq!(registry.providers(), vec![("bitbucket", env!("CARGO_PKG_VERSION"))]);

        let loaded = registry.load("bitbucket", &ProviderSettings::default()).unwrap();
        assert_eq!(loaded.package, "sentenza-bitbucket");
        assert_eq!(loaded.provider.name(), "bitbucket");
    }

    #[test]
    fn test_invalid_settings_fail_to_load() {
        let registry = ProviderRegistry::builtin();
        let settings = ProviderSettings {
            api_url: Some("not a url".to_string()),
        };
        let result = registry.load("bitbucket", &settings);
        assert!(matches!(result, Err(SentenzaError::ProviderLoad { .. })));
    }
}
