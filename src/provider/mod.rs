//! Provider contract
//!
//! A [`Provider`] adapts one CI vendor. Callers never talk to it directly:
//! they configure a [`Sentenza`] builder (repository, target, credentials)
//! and call [`Sentenza::trigger`], which resolves and validates the request
//! before handing it to the provider.
//!
//! # Example
//!
//! ```no_run
//! use sentenza::provider::{Credentials, Sentenza};
//! use sentenza::providers::bitbucket::BitbucketProvider;
//! use sentenza::core::Target;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut sentenza = Sentenza::new(Arc::new(BitbucketProvider::default()))
//!     .repository("SergioLeone/western-project")?
//!     .on(Target::Tag("v1.0.0".to_string()))
//!     .auth(Credentials::basic("tuco", "app-password"));
//!
//! let pipeline = sentenza.trigger(sentenza::core::Trigger::custom("deploy")).await?;
//! let status = pipeline.succeeded(10).await?;
//! println!("{}", status);
//! # Ok(())
//! # }
//! ```

pub mod pipeline;
pub mod registry;

pub use pipeline::{PipelineHandle, DEFAULT_POLLING_RATE, MAX_POLLING_RATE};
pub use registry::{LoadedProvider, ProviderModule, ProviderPackage, ProviderRegistry};

use crate::core::error::{Result, SentenzaError};
use crate::core::{Target, Trigger};
use async_trait::async_trait;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;

/// Credentials handed to a provider
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// Username and password (an app password for Bitbucket)
    Basic { username: String, password: String },
    /// Bearer-style access token
    Token(String),
}

impl Credentials {
    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Credentials::Basic {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// Parses `user:password`; everything after the first `:` is the password
impl FromStr for Credentials {
    type Err = SentenzaError;

    fn from_str(s: &str) -> Result<Self> {
        let (username, password) = s.split_once(':').unwrap_or((s, ""));
        Ok(Credentials::basic(username, password))
    }
}

// Never print secrets in logs
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"***")
                .finish(),
            Credentials::Token(_) => f.debug_tuple("Token").field(&"***").finish(),
        }
    }
}

/// What a provider implements of the contract
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub on: bool,
    pub trigger: bool,
}

impl Capabilities {
    pub fn full() -> Self {
        Self {
            on: true,
            trigger: true,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.on && self.trigger
    }
}

/// Configuration accumulated by the [`Sentenza`] builder
#[derive(Debug, Clone, Default)]
pub struct ProviderConfig {
    pub repository: Option<String>,
    pub target: Option<Target>,
    pub trigger: Option<Trigger>,
    pub credentials: Option<Credentials>,
}

impl ProviderConfig {
    /// Resolve a trigger into a complete request
    ///
    /// A branch pipeline with no explicit target runs on that same branch.
    /// Custom pipelines never infer a target.
    pub fn resolve(&mut self, trigger: Trigger) -> Result<TriggerRequest> {
        debug!(?trigger, "resolving trigger");

        if self.target.is_none() {
            if let Trigger::Branch(branch) = &trigger {
                debug!("trigger(\"{}\") called without target, running on same branch", branch);
                self.target = Some(Target::Branch(branch.clone()));
            }
        }
        self.trigger = Some(trigger.clone());

        let target = self.target.clone().ok_or(SentenzaError::MissingTarget)?;
        let repository = self
            .repository
            .clone()
            .ok_or(SentenzaError::MissingRepository)?;

        Ok(TriggerRequest {
            repository,
            target,
            trigger,
            credentials: self.credentials.clone(),
        })
    }
}

/// A validated request handed to [`Provider::dispatch`]
#[derive(Debug, Clone)]
pub struct TriggerRequest {
    pub repository: String,
    pub target: Target,
    pub trigger: Trigger,
    pub credentials: Option<Credentials>,
}

/// Vendor adapter
#[async_trait]
pub trait Provider: Send + Sync {
    /// Short provider name, e.g. `bitbucket`
    fn name(&self) -> &str;

    fn capabilities(&self) -> Capabilities {
        Capabilities::full()
    }

    /// Canonical repository identifier for this vendor
    fn normalize_repository(&self, url: &str) -> Result<String> {
        Ok(url.to_string())
    }

    /// Reject incomplete credentials before any network call
    fn check_credentials(&self, _credentials: Option<&Credentials>) -> Result<()> {
        Ok(())
    }

    /// Call the vendor API and wrap the created run
    async fn dispatch(&self, request: TriggerRequest) -> Result<Box<dyn PipelineHandle>>;
}

/// Fluent configuration of a provider, ending in [`Sentenza::trigger`]
#[derive(Clone)]
pub struct Sentenza {
    provider: Arc<dyn Provider>,
    config: ProviderConfig,
}

impl Sentenza {
    pub fn new(provider: Arc<dyn Provider>) -> Self {
        Self {
            provider,
            config: ProviderConfig::default(),
        }
    }

    pub fn provider(&self) -> &dyn Provider {
        self.provider.as_ref()
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    pub fn target(&self) -> Option<&Target> {
        self.config.target.as_ref()
    }

    /// Set the repository, normalized by the provider
    pub fn repository(mut self, url: &str) -> Result<Self> {
        let repository = self.provider.normalize_repository(url)?;
        debug!(url, %repository, "repository set");
        self.config.repository = Some(repository);
        Ok(self)
    }

    /// Set the target; a bare string is a branch
    pub fn on(mut self, target: impl Into<Target>) -> Self {
        let target = target.into();
        debug!(?target, "target set");
        self.config.target = Some(target);
        self
    }

    pub fn auth(mut self, credentials: Credentials) -> Self {
        self.config.credentials = Some(credentials);
        self
    }

    /// Resolve, validate and start a pipeline run; a bare string is a branch pipeline
    pub async fn trigger(&mut self, pipeline: impl Into<Trigger>) -> Result<Box<dyn PipelineHandle>> {
        let request = self.config.resolve(pipeline.into())?;
        self.provider.check_credentials(request.credentials.as_ref())?;

        debug!(
            provider = self.provider.name(),
            repository = %request.repository,
            target = %request.target,
            trigger = %request.trigger,
            "dispatching pipeline"
        );
        self.provider.dispatch(request).await
    }
}

impl fmt::Debug for Sentenza {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sentenza")
            .field("provider", &self.provider.name())
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_repository() -> ProviderConfig {
        ProviderConfig {
            repository: Some("owner/repo".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_branch_trigger_infers_target() {
        let mut config = config_with_repository();
        let request = config.resolve(Trigger::from("dev")).unwrap();
        assert_eq!(request.target, Target::Branch("dev".to_string()));
        assert_eq!(config.target, Some(Target::Branch("dev".to_string())));
        assert_eq!(config.trigger, Some(Trigger::Branch("dev".to_string())));
    }

    #[test]
    fn test_custom_trigger_requires_target() {
        let mut config = config_with_repository();
        let result = config.resolve(Trigger::custom("x"));
        assert!(matches!(result, Err(SentenzaError::MissingTarget)));
        assert!(config.target.is_none());
    }

    #[test]
    fn test_explicit_target_is_never_overwritten() {
        let mut config = config_with_repository();
        config.target = Some(Target::Commit("abc".to_string()));

        config.resolve(Trigger::from("main")).unwrap();
        assert_eq!(config.target, Some(Target::Commit("abc".to_string())));

        config.resolve(Trigger::custom("nightly")).unwrap();
        assert_eq!(config.target, Some(Target::Commit("abc".to_string())));
    }

    #[test]
    fn test_missing_repository() {
        let mut config = ProviderConfig::default();
        let result = config.resolve(Trigger::from("main"));
        assert!(matches!(result, Err(SentenzaError::MissingRepository)));
    }

    #[test]
    fn test_credentials_from_str() {
        assert_eq!(
            "tuco:s3cr:et".parse::<Credentials>().unwrap(),
            Credentials::basic("tuco", "s3cr:et")
        );
        assert_eq!(
            "tuco".parse::<Credentials>().unwrap(),
            Credentials::basic("tuco", "")
        );
    }

    #[test]
    fn test_credentials_debug_hides_password() {
        let debug = format!("{:?}", Credentials::basic("tuco", "hunter2"));
        assert!(debug.contains("tuco"));
        assert!(!debug.contains("hunter2"));
    }
}
