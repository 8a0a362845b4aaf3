//! Handle on a triggered remote pipeline run

use crate::core::error::{Result, WatchError};
use crate::core::RemoteStatus;
use crate::execution::Poller;
use async_trait::async_trait;

/// Seconds between two status polls unless told otherwise
pub const DEFAULT_POLLING_RATE: u64 = 10;

/// Longest accepted polling rate, one day
pub const MAX_POLLING_RATE: u64 = 24 * 60 * 60;

/// A running remote pipeline, returned by a successful trigger
///
/// Providers only implement [`status`](PipelineHandle::status); watching is
/// shared and implemented on top of the [`Poller`].
#[async_trait]
pub trait PipelineHandle: Send + Sync {
    /// Vendor run identifier
    fn id(&self) -> &str;

    /// Status returned when the run was created
    fn initial(&self) -> &RemoteStatus;

    /// Fetch the current status once
    async fn status(&self) -> Result<RemoteStatus>;

    /// Resolve once the run reaches any terminal state
    async fn finished(&self, polling_rate: u64) -> std::result::Result<RemoteStatus, WatchError> {
        Poller::new(polling_rate).finished(self).await
    }

    /// Resolve only if the run ends successfully; otherwise the error carries
    /// the terminal status
    async fn succeeded(&self, polling_rate: u64) -> std::result::Result<RemoteStatus, WatchError> {
        Poller::new(polling_rate).succeeded(self).await
    }
}
