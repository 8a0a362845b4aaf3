//! sentenza - trigger and watch CI/CD pipelines through pluggable providers

pub mod cli;
pub mod core;
pub mod execution;
pub mod provider;
pub mod providers;

// Re-export commonly used types
pub use core::{RemoteStatus, SentenzaError, Target, Trigger, Variable, Variables, WatchError};
pub use execution::{PollEvent, Poller};
pub use provider::{Credentials, PipelineHandle, Provider, ProviderRegistry, Sentenza};
