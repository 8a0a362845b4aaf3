//! Error types

use crate::core::status::RemoteStatus;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SentenzaError>;

/// Errors raised while configuring, resolving or calling a provider
#[derive(Debug, Error)]
pub enum SentenzaError {
    #[error("Invalid repository '{0}': pass either the full URL (e.g. https://bitbucket.org/SergioLeone/western-project/) or the short form <owner>/<repository> (e.g. SergioLeone/western-project)")]
    InvalidRepository(String),

    #[error("No repository defined to run pipeline")]
    MissingRepository,

    #[error("No target defined to run pipeline. Please specify a target branch, commit hash or target tag.")]
    MissingTarget,

    #[error("Invalid credentials{}", .0.as_ref().map(|m| format!(": {}", m)).unwrap_or_default())]
    InvalidCredentials(Option<String>),

    #[error("Invalid pipeline name '{0}'. Use the following syntax: branch:<your-branch> or custom:<your-custom-pipeline>")]
    InvalidPipelineName(String),

    #[error("No provider found for {provider}. Make sure {package} is registered")]
    ProviderNotFound { provider: String, package: String },

    #[error("Failed to load {package}: {reason}")]
    ProviderLoad { package: String, reason: String },

    #[error("Package {package} has no default provider")]
    NoDefaultExport { package: String },

    #[error("Provider {package} incorrectly implements the provider API")]
    InvalidProvider { package: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl SentenzaError {
    pub fn invalid_credentials(reason: impl Into<String>) -> Self {
        Self::InvalidCredentials(Some(reason.into()))
    }

    /// Raised before any network call was made
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidRepository(_)
                | Self::MissingRepository
                | Self::MissingTarget
                | Self::InvalidCredentials(_)
                | Self::InvalidPipelineName(_)
                | Self::Config(_)
        )
    }
}

/// Why watching a pipeline did not resolve
#[derive(Debug, Error)]
pub enum WatchError {
    /// A status fetch failed; polling stopped
    #[error(transparent)]
    Fetch(#[from] SentenzaError),

    /// The run reached a terminal state other than success
    #[error("Pipeline finished with status {0}")]
    Unsuccessful(Box<RemoteStatus>),
}

impl WatchError {
    /// The terminal status, when the run itself did not succeed
    pub fn status(&self) -> Option<&RemoteStatus> {
        match self {
            WatchError::Unsuccessful(status) => Some(status),
            WatchError::Fetch(_) => None,
        }
    }
}
