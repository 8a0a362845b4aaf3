//! Bitbucket Pipelines provider
//!
//! Repositories are given either as a full URL
//! (`https://bitbucket.org/SergioLeone/western-project/`) or in the short
//! `<owner>/<repository>` form. Authentication uses a username and an app
//! password.

pub mod api;
pub mod payload;
pub mod pipeline;

pub use api::{BitbucketApi, DEFAULT_API_URL};
pub use payload::{build_payload, TriggerPayload};
pub use pipeline::BitbucketPipeline;

use crate::core::config::ProviderSettings;
use crate::core::error::{Result, SentenzaError};
use crate::provider::{
    Credentials, PipelineHandle, Provider, ProviderModule, ProviderPackage, TriggerRequest,
};
use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use std::sync::{Arc, OnceLock};
use tracing::{debug, info};

pub const NAME: &str = "bitbucket";

fn full_url_parser() -> &'static Regex {
    static PARSER: OnceLock<Regex> = OnceLock::new();
    PARSER.get_or_init(|| Regex::new(r"^https?://[^/]+/(.+)$").expect("valid regex"))
}

/// Reduce a repository URL or short form to `owner/repository`
pub fn normalize_repository(url: &str) -> Result<String> {
    let repository = full_url_parser()
        .captures(url)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .unwrap_or(url);
    let repository = repository.strip_suffix('/').unwrap_or(repository);

    let segments: Vec<&str> = repository.split('/').collect();
    if segments.len() != 2 || segments.iter().any(|s| s.trim().is_empty()) {
        return Err(SentenzaError::InvalidRepository(url.to_string()));
    }
    Ok(repository.to_string())
}

#[derive(Debug, Clone)]
pub struct BitbucketProvider {
    api_url: String,
    client: Client,
}

impl BitbucketProvider {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self::with_client(api_url, Client::new())
    }

    /// Use a preconfigured HTTP client (timeouts, proxies, TLS)
    pub fn with_client(api_url: impl Into<String>, client: Client) -> Self {
        Self {
            api_url: api_url.into(),
            client,
        }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }
}

impl Default for BitbucketProvider {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL)
    }
}

#[async_trait]
impl Provider for BitbucketProvider {
    fn name(&self) -> &str {
        NAME
    }

    fn normalize_repository(&self, url: &str) -> Result<String> {
        normalize_repository(url)
    }

    fn check_credentials(&self, credentials: Option<&Credentials>) -> Result<()> {
        match credentials {
            None => Err(SentenzaError::InvalidCredentials(None)),
            Some(Credentials::Token(_)) => Err(SentenzaError::invalid_credentials(
                "Bitbucket needs a username and an app password",
            )),
            Some(Credentials::Basic { username, .. }) if username.is_empty() => {
                Err(SentenzaError::invalid_credentials("missing username"))
            }
            Some(Credentials::Basic { password, .. }) if password.is_empty() => {
                Err(SentenzaError::invalid_credentials("missing app password"))
            }
            Some(Credentials::Basic { .. }) => Ok(()),
        }
    }

    async fn dispatch(&self, request: TriggerRequest) -> Result<Box<dyn PipelineHandle>> {
        let (username, app_password) = match &request.credentials {
            Some(Credentials::Basic { username, password }) => (username.clone(), password.clone()),
            _ => return Err(SentenzaError::InvalidCredentials(None)),
        };

        let api = BitbucketApi::new(self.api_url.as_str(), self.client.clone(), username, app_password);
        let details = api
            .create_pipeline_run(&request.repository, &request.target, &request.trigger)
            .await?;
        let pipeline = BitbucketPipeline::new(api, &request.repository, details)?;

        info!(
            "Triggered {} on {} in {} ({})",
            request.trigger,
            request.target,
            pipeline.repository(),
            pipeline.id()
        );
        Ok(Box::new(pipeline))
    }
}

/// The `sentenza-bitbucket` package
#[derive(Debug, Clone, Copy, Default)]
pub struct BitbucketPackage;

impl ProviderPackage for BitbucketPackage {
    fn package(&self) -> &str {
        "sentenza-bitbucket"
    }

    fn version(&self) -> &str {
        env!("CARGO_PKG_VERSION")
    }

    fn load(&self, settings: &ProviderSettings) -> Result<ProviderModule> {
        let api_url = settings.api_url.as_deref().unwrap_or(DEFAULT_API_URL);
        reqwest::Url::parse(api_url).map_err(|e| SentenzaError::ProviderLoad {
            package: self.package().to_string(),
            reason: format!("invalid api_url '{}': {}", api_url, e),
        })?;
        debug!("bitbucket provider using {}", api_url);
        Ok(ProviderModule::new(Arc::new(BitbucketProvider::new(api_url))))
    }
}
