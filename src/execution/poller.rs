//! Polling engine - watches a remote run until it reaches a terminal state

use crate::core::error::{Result, WatchError};
use crate::core::RemoteStatus;
use crate::provider::{PipelineHandle, MAX_POLLING_RATE};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Events emitted while polling
#[derive(Debug, Clone)]
pub enum PollEvent {
    Started {
        run_id: String,
        interval: Duration,
    },
    Tick {
        attempt: usize,
        status: RemoteStatus,
    },
    Finished {
        attempts: usize,
        status: RemoteStatus,
    },
}

/// Type for event handlers
pub type PollEventHandler = Arc<dyn Fn(PollEvent) + Send + Sync>;

/// Periodically fetches the status of a run
///
/// The first fetch happens one interval after polling starts. Each tick waits
/// for its fetch to complete before the next one is scheduled, so the first
/// terminal status observed is the one returned. The timer lives inside the
/// returned future: it stops on a terminal status, on a fetch error, or when
/// the future is dropped. There is no timeout and no retry.
#[derive(Clone)]
pub struct Poller {
    interval: Duration,
    handlers: Vec<PollEventHandler>,
}

impl Poller {
    /// Poll every `polling_rate` seconds, between one second and one day
    pub fn new(polling_rate: u64) -> Self {
        Self::with_interval(Duration::from_secs(polling_rate))
    }

    /// Zero becomes one second; anything above one day becomes one day
    pub fn with_interval(interval: Duration) -> Self {
        let interval = if interval.is_zero() {
            Duration::from_secs(1)
        } else {
            interval.min(Duration::from_secs(MAX_POLLING_RATE))
        };
        Self {
            interval,
            handlers: Vec::new(),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Add an event handler
    pub fn with_event_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(PollEvent) + Send + Sync + 'static,
    {
        self.handlers.push(Arc::new(handler));
        self
    }

    fn emit(&self, event: PollEvent) {
        for handler in &self.handlers {
            handler(event.clone());
        }
    }

    /// Wait for any terminal state
    pub async fn finished<H>(&self, handle: &H) -> std::result::Result<RemoteStatus, WatchError>
    where
        H: PipelineHandle + ?Sized,
    {
        Ok(self.watch(handle).await?)
    }

    /// Wait for a terminal state and require it to be successful
    pub async fn succeeded<H>(&self, handle: &H) -> std::result::Result<RemoteStatus, WatchError>
    where
        H: PipelineHandle + ?Sized,
    {
        let status = self.watch(handle).await?;
        if status.is_successful() {
            Ok(status)
        } else {
            Err(WatchError::Unsuccessful(Box::new(status)))
        }
    }

    async fn watch<H>(&self, handle: &H) -> Result<RemoteStatus>
    where
        H: PipelineHandle + ?Sized,
    {
        let run_id = handle.id().to_string();
        debug!(%run_id, interval = ?self.interval, "polling started");
        self.emit(PollEvent::Started {
            run_id: run_id.clone(),
            interval: self.interval,
        });

        let mut ticker = interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut attempt = 0;
        loop {
            ticker.tick().await;
            attempt += 1;

            let status = handle.status().await.map_err(|e| {
                warn!(%run_id, attempt, "status fetch failed, polling stopped: {}", e);
                e
            })?;
            debug!(%run_id, attempt, %status, "polled status");
            self.emit(PollEvent::Tick {
                attempt,
                status: status.clone(),
            });

            if status.is_terminal() {
                info!(%run_id, attempts = attempt, %status, "pipeline reached terminal state");
                self.emit(PollEvent::Finished {
                    attempts: attempt,
                    status: status.clone(),
                });
                return Ok(status);
            }
        }
    }
}

impl std::fmt::Debug for Poller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Poller")
            .field("interval", &self.interval)
            .field("handlers", &self.handlers.len())
            .finish()
    }
}
