//! Bitbucket Cloud REST client

use crate::core::error::{Result, SentenzaError};
use crate::core::{RemoteStatus, Target, Trigger};
use crate::providers::bitbucket::payload::{build_payload, TriggerPayload};
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};

pub const DEFAULT_API_URL: &str = "https://api.bitbucket.org/2.0";

#[derive(Debug, Deserialize)]
struct TagDetails {
    target: TagCommit,
}

#[derive(Debug, Deserialize)]
struct TagCommit {
    hash: String,
}

/// Authenticated client for the pipelines endpoints
#[derive(Clone)]
pub struct BitbucketApi {
    base_url: String,
    client: Client,
    username: String,
    app_password: String,
}

impl BitbucketApi {
    pub fn new(
        base_url: impl Into<String>,
        client: Client,
        username: impl Into<String>,
        app_password: impl Into<String>,
    ) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            username: username.into(),
            app_password: app_password.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Endpoint under `repositories/<workspace>/<slug>/`, each segment percent-encoded
    fn url(&self, repository: &str, segments: &[&str]) -> Result<Url> {
        let invalid = |reason: String| {
            SentenzaError::Config(format!("Invalid API URL '{}': {}", self.base_url, reason))
        };
        let mut url = Url::parse(&self.base_url).map_err(|e| invalid(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| invalid("cannot be a base".to_string()))?
            .pop_if_empty()
            .push("repositories")
            .extend(repository.split('/'))
            .extend(segments);
        Ok(url)
    }

    /// Commit hash a tag points to
    pub async fn fetch_tag_commit(&self, repository: &str, tag: &str) -> Result<String> {
        let url = self.url(repository, &["refs", "tags", tag])?;
        debug!("GET {}", url);
        let response = self
            .client
            .get(url.clone())
            .basic_auth(&self.username, Some(&self.app_password))
            .send()
            .await?;
        let details: TagDetails = Self::handle_response(response).await?;
        debug!("GET {} -> tag {} at {}", url, tag, details.target.hash);
        Ok(details.target.hash)
    }

    /// Start a pipeline run
    pub async fn create_pipeline_run(
        &self,
        repository: &str,
        target: &Target,
        trigger: &Trigger,
    ) -> Result<RemoteStatus> {
        let payload = self.payload(repository, target, trigger).await?;
        let url = self.url(repository, &["pipelines", ""])?;
        // Variables may be secured, log the selector only
        debug!(
            "POST {} target={:?} selector={}",
            url, payload.target.kind, payload.target.selector.pattern
        );
        let response = self
            .client
            .post(url.clone())
            .basic_auth(&self.username, Some(&self.app_password))
            .json(&payload)
            .send()
            .await?;
        let status: RemoteStatus = Self::handle_response(response).await?;
        debug!("POST {} -> {}", url, status);
        Ok(status)
    }

    /// Current status of a pipeline run
    pub async fn fetch_pipeline_status(&self, repository: &str, uuid: &str) -> Result<RemoteStatus> {
        let url = self.url(repository, &["pipelines", uuid])?;
        debug!("GET {}", url);
        let response = self
            .client
            .get(url.clone())
            .basic_auth(&self.username, Some(&self.app_password))
            .send()
            .await?;
        let status: RemoteStatus = Self::handle_response(response).await?;
        debug!("GET {} -> {}", url, status);
        Ok(status)
    }

    async fn payload(&self, repository: &str, target: &Target, trigger: &Trigger) -> Result<TriggerPayload> {
        let tag_commit = match target {
            Target::Tag(tag) => Some(self.fetch_tag_commit(repository, tag).await?),
            Target::Branch(_) | Target::Commit(_) => None,
        };
        Ok(build_payload(target, trigger, tag_commit.as_deref()))
    }

    /// Check the status code and deserialize the JSON body
    async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();

        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            warn!("Bitbucket API returned {}: {}", status, message.trim());
            return Err(SentenzaError::Api {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json()
            .await
            .map_err(|e| SentenzaError::Parse(format!("Failed to parse JSON response: {}", e)))
    }
}

impl std::fmt::Debug for BitbucketApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BitbucketApi")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}
