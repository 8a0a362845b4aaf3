//! Remote pipeline status as reported by a provider

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Lifecycle phase of a remote pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    Pending,
    InProgress,
    Completed,
    /// Any phase name the vendor reports that we do not know about
    #[serde(other)]
    Other,
}

impl Phase {
    /// Everything that is neither pending nor in progress is terminal
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Phase::Pending | Phase::InProgress)
    }
}

/// Result of a terminal run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Outcome {
    Successful,
    Failed,
    Stopped,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    pub name: Outcome,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunState {
    pub name: Phase,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<RunResult>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Snapshot of a remote pipeline run
///
/// Only `state` is interpreted; every other field the vendor returns is kept
/// verbatim in `details`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteStatus {
    pub state: RunState,

    #[serde(flatten)]
    pub details: Map<String, Value>,
}

impl RemoteStatus {
    pub fn new(phase: Phase, outcome: Option<Outcome>) -> Self {
        Self {
            state: RunState {
                name: phase,
                result: outcome.map(|name| RunResult {
                    name,
                    extra: Map::new(),
                }),
                extra: Map::new(),
            },
            details: Map::new(),
        }
    }

    pub fn pending() -> Self {
        Self::new(Phase::Pending, None)
    }

    pub fn in_progress() -> Self {
        Self::new(Phase::InProgress, None)
    }

    pub fn completed(outcome: Outcome) -> Self {
        Self::new(Phase::Completed, Some(outcome))
    }

    /// Attach a vendor field
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }

    pub fn phase(&self) -> Phase {
        self.state.name
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.state.result.as_ref().map(|r| r.name)
    }

    pub fn is_terminal(&self) -> bool {
        self.phase().is_terminal()
    }

    pub fn is_successful(&self) -> bool {
        self.outcome() == Some(Outcome::Successful)
    }

    /// Vendor run identifier, if the status carries one
    pub fn run_id(&self) -> Option<&str> {
        self.details.get("uuid").and_then(Value::as_str)
    }

    pub fn build_number(&self) -> Option<u64> {
        self.details.get("build_number").and_then(Value::as_u64)
    }
}

impl fmt::Display for RemoteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let phase = match self.phase() {
            Phase::Pending => "PENDING",
            Phase::InProgress => "IN_PROGRESS",
            Phase::Completed => "COMPLETED",
            Phase::Other => "UNKNOWN",
        };
        match self.outcome() {
            Some(outcome) => {
                let outcome = match outcome {
                    Outcome::Successful => "SUCCESSFUL",
                    Outcome::Failed => "FAILED",
                    Outcome::Stopped => "STOPPED",
                    Outcome::Other => "UNKNOWN",
                };
                write!(f, "{}/{}", phase, outcome)
            }
            None => write!(f, "{}", phase),
        }
    }
}
