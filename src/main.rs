use anyhow::{Context, Result};
use sentenza::cli::commands::{TriggerCommand, WatchCommand};
use sentenza::cli::output::*;
use sentenza::cli::{Cli, Command};
use sentenza::core::config::SentenzaConfig;
use sentenza::execution::Poller;
use sentenza::provider::{LoadedProvider, PipelineHandle, ProviderRegistry, Sentenza};
use sentenza::{SentenzaError, WatchError};
use tracing::debug;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// What `watch`-style commands require from the terminal state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Expectation {
    Finished,
    Success,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::from_args();

    // Initialize logging; stdout belongs to the spinner. RUST_LOG wins over --verbose
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| cli.log_filter().into()),
        )
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set logging subscriber")?;

    if let Err(e) = run(&cli).await {
        eprintln!("{} {:#}", CROSS, e);
        std::process::exit(1);
    }
    Ok(())
}

async fn run(cli: &Cli) -> Result<()> {
    let config = SentenzaConfig::load(cli.config.as_deref())
        .context("Failed to load configuration")?;
    let registry = ProviderRegistry::builtin();
    let provider = cli.provider.clone().unwrap_or_else(|| config.provider.clone());
    debug!(%provider, "selected provider");

    match &cli.command {
        Command::Trigger(cmd) => {
            let loaded = load_provider(&registry, &provider, &config)?;
            trigger_pipeline(cmd, &loaded, &config).await?
        }
        Command::Watch(cmd) => {
            let loaded = load_provider(&registry, &provider, &config)?;
            watch_pipeline(cmd, &loaded, &config, Expectation::Finished).await?
        }
        Command::ExpectSuccess(cmd) => {
            let loaded = load_provider(&registry, &provider, &config)?;
            watch_pipeline(cmd, &loaded, &config, Expectation::Success).await?
        }
        Command::Providers => list_providers(&registry),
        Command::Version => print_version(&registry, &provider, &config),
    }

    Ok(())
}

fn load_provider(
    registry: &ProviderRegistry,
    provider: &str,
    config: &SentenzaConfig,
) -> Result<LoadedProvider> {
    registry
        .load(provider, &config.provider_settings(provider))
        .with_context(|| format!("Failed to load provider {}", provider))
}

/// Apply flags, falling back to the configuration file
fn configure(loaded: &LoadedProvider, cmd: &TriggerCommand, config: &SentenzaConfig) -> Result<Sentenza> {
    let mut sentenza = loaded.sentenza();

    if let Some(credentials) = cmd
        .auth
        .clone()
        .or_else(|| config.auth.clone().map(Into::into))
    {
        sentenza = sentenza.auth(credentials);
    }

    let repository = cmd
        .repository
        .as_deref()
        .or(config.repository.as_deref())
        .ok_or(SentenzaError::MissingRepository)?;
    sentenza = sentenza.repository(repository)?;

    if let Some(target) = cmd.target() {
        sentenza = sentenza.on(target);
    }

    Ok(sentenza)
}

async fn start_pipeline(
    sentenza: &mut Sentenza,
    cmd: &TriggerCommand,
) -> Result<Box<dyn PipelineHandle>> {
    let trigger = cmd.trigger()?;
    let label = trigger.to_string();
    let spinner = create_spinner(format!("Trigger pipeline {}", style(&label).cyan()));

    match sentenza.trigger(trigger).await {
        Ok(pipeline) => {
            let target = sentenza
                .target()
                .map(ToString::to_string)
                .unwrap_or_default();
            spinner.finish_with_message(format!(
                "{}Pipeline {} triggered on {} ({})",
                ROCKET,
                style(&label).bold(),
                style(target).cyan(),
                format_run(pipeline.initial(), pipeline.id())
            ));
            Ok(pipeline)
        }
        Err(e) => {
            spinner.finish_with_message(format!("{}Pipeline {} not triggered", CROSS, label));
            Err(e).with_context(|| format!("Failed to trigger {}", label))
        }
    }
}

async fn trigger_pipeline(cmd: &TriggerCommand, loaded: &LoadedProvider, config: &SentenzaConfig) -> Result<()> {
    let mut sentenza = configure(loaded, cmd, config)?;
    start_pipeline(&mut sentenza, cmd).await?;
    Ok(())
}

async fn watch_pipeline(
    cmd: &WatchCommand,
    loaded: &LoadedProvider,
    config: &SentenzaConfig,
    expectation: Expectation,
) -> Result<()> {
    let mut sentenza = configure(loaded, &cmd.trigger, config)?;
    let pipeline = start_pipeline(&mut sentenza, &cmd.trigger).await?;
    let label = cmd.trigger.pipeline.to_string();

    let polling_rate = cmd.polling_rate.unwrap_or(config.polling_rate);
    let spinner = create_spinner(format!("{}Waiting for {}", SPINNER, style(&label).cyan()));
    let progress = spinner.clone();
    let poller = Poller::new(polling_rate)
        .with_event_handler(move |event| progress.set_message(format_poll_event(&event)));

    let result = match expectation {
        Expectation::Finished => poller.finished(&*pipeline).await,
        Expectation::Success => poller.succeeded(&*pipeline).await,
    };

    match result {
        Ok(status) => {
            let icon = if status.is_successful() { &CHECK } else { &WARN };
            spinner.finish_with_message(format!(
                "{}Pipeline {} finished: {}",
                icon,
                style(&label).bold(),
                format_status(&status)
            ));
            Ok(())
        }
        Err(WatchError::Unsuccessful(status)) => {
            spinner.finish_with_message(format!(
                "{}Pipeline {} finished: {}",
                CROSS,
                style(&label).bold(),
                format_status(&status)
            ));
            std::process::exit(1);
        }
        Err(e) => {
            spinner.finish_with_message(format!("{}Lost track of pipeline {}", CROSS, label));
            Err(e).context("Failed to poll pipeline status")
        }
    }
}

fn list_providers(registry: &ProviderRegistry) {
    println!("{} Available providers:", INFO);
    for (name, version) in registry.providers() {
        println!("  {} {}", style(name).bold(), style(version).dim());
    }
}

fn print_version(registry: &ProviderRegistry, provider: &str, config: &SentenzaConfig) {
    let loaded = registry.load(provider, &config.provider_settings(provider)).ok();
    let provider_line = loaded
        .as_ref()
        .map(|l| (l.package.as_str(), l.version.as_str()));
    println!("{}", banner(env!("CARGO_PKG_VERSION"), provider_line));
}
