//! Handle on a Bitbucket pipeline run

use crate::core::error::{Result, SentenzaError};
use crate::core::RemoteStatus;
use crate::provider::PipelineHandle;
use crate::providers::bitbucket::api::BitbucketApi;
use async_trait::async_trait;
use serde_json::Value;

#[derive(Debug, Clone)]
pub struct BitbucketPipeline {
    api: BitbucketApi,
    repository: String,
    uuid: String,
    details: RemoteStatus,
}

impl BitbucketPipeline {
    /// Wrap the response of a trigger call
    ///
    /// The repository full name reported by Bitbucket wins over the one the
    /// run was requested for.
    pub fn new(api: BitbucketApi, repository: &str, details: RemoteStatus) -> Result<Self> {
        let uuid = details
            .run_id()
            .ok_or_else(|| SentenzaError::Parse("pipeline response has no uuid".to_string()))?
            .to_string();
        let repository = details
            .details
            .get("repository")
            .and_then(|r| r.get("full_name"))
            .and_then(Value::as_str)
            .unwrap_or(repository)
            .to_string();

        Ok(Self {
            api,
            repository,
            uuid,
            details,
        })
    }

    pub fn repository(&self) -> &str {
        &self.repository
    }
}

#[async_trait]
impl PipelineHandle for BitbucketPipeline {
    fn id(&self) -> &str {
        &self.uuid
    }

    fn initial(&self) -> &RemoteStatus {
        &self.details
    }

    async fn status(&self) -> Result<RemoteStatus> {
        self.api
            .fetch_pipeline_status(&self.repository, &self.uuid)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::bitbucket::api::DEFAULT_API_URL;
    use reqwest::Client;

    fn api() -> BitbucketApi {
        BitbucketApi::new(DEFAULT_API_URL, Client::new(), "u", "p")
    }

    #[test]
    fn test_repository_from_response() {
        let details = RemoteStatus::pending()
            .with_detail("uuid", "{42}")
            .with_detail("repository", serde_json::json!({ "full_name": "owner/renamed" }));
        let pipeline = BitbucketPipeline::new(api(), "owner/repo", details).unwrap();
        assert_eq!(pipeline.id(), "{42}");
        assert_eq!(pipeline.repository(), "owner/renamed");
    }

    #[test]
    fn test_repository_falls_back_to_request() {
        let details = RemoteStatus::pending().with_detail("uuid", "{42}");
        let pipeline = BitbucketPipeline::new(api(), "owner/repo", details).unwrap();
        assert_eq!(pipeline.repository(), "owner/repo");
    }

    #[test]
    fn test_missing_uuid_is_a_parse_error() {
        let result = BitbucketPipeline::new(api(), "owner/repo", RemoteStatus::pending());
        assert!(matches!(result, Err(SentenzaError::Parse(_))));
    }
}
