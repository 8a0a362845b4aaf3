//! CLI command definitions

use crate::core::error::{Result, SentenzaError};
use crate::core::{Target, Trigger, Variable, Variables};
use crate::provider::{Credentials, MAX_POLLING_RATE};
use clap::{ArgGroup, Args};

/// Trigger a pipeline
#[derive(Debug, Args, Clone)]
#[command(group(ArgGroup::new("target").args(["commit", "branch", "tag"]).multiple(false)))]
pub struct TriggerCommand {
    /// Pipeline to run: branch:<name> or custom:<name>
    #[arg(value_name = "custom:pipeline|branch:pipeline", value_parser = parse_trigger)]
    pub pipeline: Trigger,

    /// Target repository (URL or <owner>/<repository>)
    #[arg(short, long)]
    pub repository: Option<String>,

    /// Credentials as <user>:<app_password>
    #[arg(short, long, value_name = "USER:APP_PASSWORD", value_parser = parse_credentials)]
    pub auth: Option<Credentials>,

    /// Run on this commit
    #[arg(short, long, value_name = "HASH")]
    pub commit: Option<String>,

    /// Run on this branch
    #[arg(short, long, value_name = "NAME")]
    pub branch: Option<String>,

    /// Run on this tag
    #[arg(short, long, value_name = "NAME")]
    pub tag: Option<String>,

    /// Custom pipeline variable (key=value)
    #[arg(long = "variable", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub variables: Vec<(String, String)>,

    /// Secured custom pipeline variable (key=value)
    #[arg(long = "secured-variable", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub secured_variables: Vec<(String, String)>,
}

impl TriggerCommand {
    /// The explicitly requested target, if any
    pub fn target(&self) -> Option<Target> {
        if let Some(hash) = &self.commit {
            Some(Target::Commit(hash.clone()))
        } else if let Some(branch) = &self.branch {
            Some(Target::Branch(branch.clone()))
        } else {
            self.tag.as_ref().map(|tag| Target::Tag(tag.clone()))
        }
    }

    /// The pipeline with its variables attached
    pub fn trigger(&self) -> Result<Trigger> {
        let variables = self.collect_variables();
        match (&self.pipeline, variables) {
            (trigger, None) => Ok(trigger.clone()),
            (Trigger::Custom { name, .. }, Some(vars)) => Ok(Trigger::custom_with(name.clone(), vars)),
            (Trigger::Branch(_), Some(_)) => Err(SentenzaError::Config(
                "variables can only be passed to custom pipelines".to_string(),
            )),
        }
    }

    /// Values are sent as given, always as strings
    fn collect_variables(&self) -> Option<Variables> {
        if self.variables.is_empty() && self.secured_variables.is_empty() {
            return None;
        }
        let plain = self
            .variables
            .iter()
            .map(|(k, v)| Variable::new(k.as_str(), v.as_str()));
        let secured = self
            .secured_variables
            .iter()
            .map(|(k, v)| Variable::secured(k.as_str(), v.as_str()));
        Some(Variables::Secured(plain.chain(secured).collect()))
    }
}

/// Trigger a pipeline and wait for it
#[derive(Debug, Args, Clone)]
pub struct WatchCommand {
    #[command(flatten)]
    pub trigger: TriggerCommand,

    /// Seconds between two status checks, at most one day [default: 10]
    #[arg(long, value_name = "SECONDS", value_parser = clap::value_parser!(u64).range(1..=MAX_POLLING_RATE))]
    pub polling_rate: Option<u64>,
}

fn parse_trigger(s: &str) -> std::result::Result<Trigger, String> {
    s.parse().map_err(|e: SentenzaError| e.to_string())
}

fn parse_credentials(s: &str) -> std::result::Result<Credentials, String> {
    s.parse().map_err(|e: SentenzaError| e.to_string())
}

/// Parse key=value pairs
pub fn parse_key_value(s: &str) -> std::result::Result<(String, String), String> {
    let parts: Vec<&str> = s.splitn(2, '=').collect();
    if parts.len() != 2 || parts[0].is_empty() {
        return Err(format!("Invalid key=value pair: {}", s));
    }
    Ok((parts[0].to_string(), parts[1].to_string()))
}
