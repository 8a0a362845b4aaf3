//! CLI output formatting

use crate::core::{Outcome, Phase, RemoteStatus};
use crate::execution::PollEvent;
use console::Emoji;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

// Re-export style
pub use console::style;

// Emojis for output
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "✓ ");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "✗ ");
pub static SPINNER: Emoji<'_, '_> = Emoji("⏳ ", "~ ");
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "i ");
pub static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "!");
pub static ROCKET: Emoji<'_, '_> = Emoji("🚀 ", "> ");

const BANNER: &str = r#"
            (_/-------------_____________________________________________)
          `|  /~~~~~~~~~~\                                              |
           ;  |--------(-||______________________________________________|
           ;  |--------(-| ____________|
           ;  \__________/'
         _/__         ___;
      ,~~    |  __----~~
     '        ~~|    (  |
    '      '~~  `____'
   '      '
  '      `"#;

const QUOTES: &[&str] = &[
    "Tuco the Ugly: When you have to shoot, shoot. Don't talk.",
    "The Good: Every gun makes its own tune.",
    "The Good: There are two kinds of people in the world, my friend: those with loaded guns and those who dig. You dig.",
    "Tuco the Ugly: If you work for a living, why do you kill yourself working?",
    "The Bad: People with ropes around their necks don't always hang.",
    "Tuco the Ugly: There are two kinds of spurs, my friend. Those that come in by the door; those that come in by the window.",
    "The Good: I've never seen so many men wasted so badly.",
    "Tuco the Ugly: Even when Judas hanged himself there was thunder.",
    "The Good: I'll sleep better knowing my good friend is by my side to protect me.",
    "Tuco the Ugly: One bastard goes in, another one comes out.",
];

/// Create a spinner with a message
pub fn create_spinner(message: impl Into<String>) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message.into());
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

/// Format a remote status for display
pub fn format_status(status: &RemoteStatus) -> String {
    match (status.phase(), status.outcome()) {
        (Phase::Pending, _) => style("PENDING").dim().to_string(),
        (Phase::InProgress, _) => style("IN PROGRESS").yellow().to_string(),
        (_, Some(Outcome::Successful)) => style("SUCCESSFUL").green().to_string(),
        (_, Some(Outcome::Failed)) => style("FAILED").red().to_string(),
        (_, Some(Outcome::Stopped)) => style("STOPPED").yellow().to_string(),
        _ => style(status.to_string()).dim().to_string(),
    }
}

/// Format a polling event for display
pub fn format_poll_event(event: &PollEvent) -> String {
    match event {
        PollEvent::Started { run_id, interval } => format!(
            "Watching {} every {}s",
            style(run_id).dim(),
            interval.as_secs()
        ),
        PollEvent::Tick { attempt, status } => format!(
            "{} (check #{})",
            format_status(status),
            style(attempt).dim()
        ),
        PollEvent::Finished { attempts, status } => format!(
            "Finished {} after {} checks",
            format_status(status),
            attempts
        ),
    }
}

/// A short human reference to a run: `#<build number>` when known
pub fn format_run(status: &RemoteStatus, run_id: &str) -> String {
    match status.build_number() {
        Some(number) => format!("#{} {}", number, style(run_id).dim()),
        None => style(run_id).dim().to_string(),
    }
}

/// Version banner with an optional provider line and a quote
pub fn banner(version: &str, provider: Option<(&str, &str)>) -> String {
    let provider_line = provider
        .map(|(name, version)| format!("{} {}", name, version))
        .unwrap_or_default();
    format!(
        "{}\n '       `                             Sentenza {}\n'--------`                             {}\n\n {}\n",
        BANNER,
        version,
        provider_line,
        quote_of_the_moment()
    )
}

fn quote_of_the_moment() -> &'static str {
    let nanos = chrono::Utc::now().timestamp_subsec_nanos() as usize;
    QUOTES[nanos % QUOTES.len()]
}
