//! Command-line interface

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};
use commands::{TriggerCommand, WatchCommand};
use std::ffi::OsString;
use std::path::PathBuf;

/// Trigger and watch CI/CD pipelines
#[derive(Debug, Parser, Clone)]
#[command(name = "sentenza")]
#[command(author = "Sentenza Contributors")]
#[command(version)]
#[command(about = "Trigger and watch CI/CD pipelines", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to the configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// CI provider (defaults to the configured one, then bitbucket)
    #[arg(short, long, global = true)]
    pub provider: Option<String>,
}

/// Available commands
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Trigger a pipeline and exit once it has started
    Trigger(TriggerCommand),

    /// Trigger a pipeline and wait for it to finish; exits 0 whatever the status
    Watch(WatchCommand),

    /// Trigger a pipeline and exit 0 only if it succeeds
    ExpectSuccess(WatchCommand),

    /// List available providers
    Providers,

    /// Print the version banner
    Version,
}

impl Cli {
    /// Parse CLI arguments from environment
    pub fn from_args() -> Self {
        Self::parse()
    }

    /// Parse CLI arguments from a slice
    pub fn try_parse_from<I, T>(itr: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(itr)
    }

    /// Log filter used when `RUST_LOG` is not set
    pub fn log_filter(&self) -> &'static str {
        if self.verbose {
            "warn,sentenza=debug"
        } else {
            "warn"
        }
    }
}
