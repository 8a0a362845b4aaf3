//! Core domain models for Sentenza
//!
//! Value types shared by every provider: targets, triggers, variables,
//! remote statuses, errors and configuration.

pub mod config;
pub mod error;
pub mod status;
pub mod target;

pub use error::{Result, SentenzaError, WatchError};
pub use status::*;
pub use target::*;
