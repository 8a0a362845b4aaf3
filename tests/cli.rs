//! Command-line parsing tests

use sentenza::cli::{Cli, Command};
use sentenza::core::{Scalar, Target, Trigger, Variable, Variables};
use sentenza::provider::{Credentials, MAX_POLLING_RATE};

fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(std::iter::once("sentenza").chain(args.iter().copied()))
        .unwrap_or_else(|e| panic!("failed to parse {:?}: {}", args, e))
}

fn parse_err(args: &[&str]) -> clap::Error {
    match Cli::try_parse_from(std::iter::once("sentenza").chain(args.iter().copied())) {
        Ok(cli) => panic!("{:?} should not parse, got {:?}", args, cli),
        Err(e) => e,
    }
}

#[test]
fn test_trigger_branch_pipeline() {
    let cli = parse(&["trigger", "branch:main", "-r", "owner/repo", "-a", "tuco:pw"]);

    match cli.command {
        Command::Trigger(cmd) => {
            assert_eq!(cmd.pipeline, Trigger::Branch("main".to_string()));
            assert_eq!(cmd.repository.as_deref(), Some("owner/repo"));
            assert_eq!(cmd.auth, Some(Credentials::basic("tuco", "pw")));
            assert_eq!(cmd.target(), None);
            assert_eq!(cmd.trigger().unwrap(), Trigger::Branch("main".to_string()));
        }
        other => panic!("unexpected command: {:?}", other),
    }
    assert!(!cli.verbose);
}

#[test]
fn test_trigger_custom_pipeline_on_tag() {
    let cli = parse(&["trigger", "custom:deploy", "--tag", "v1.0.0", "-v"]);

    match cli.command {
        Command::Trigger(cmd) => {
            assert_eq!(cmd.pipeline, Trigger::custom("deploy"));
            assert_eq!(cmd.target(), Some(Target::Tag("v1.0.0".to_string())));
        }
        other => panic!("unexpected command: {:?}", other),
    }
    assert!(cli.verbose);
}

#[test]
fn test_targets_are_mutually_exclusive() {
    let err = parse_err(&["trigger", "custom:deploy", "-c", "abc", "-b", "main"]);
    assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
}

#[test]
fn test_invalid_pipeline_name() {
    let err = parse_err(&["trigger", "deploy"]);
    assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    assert!(err.to_string().contains("Invalid pipeline name 'deploy'"));

    parse_err(&["trigger", "custom:"]);
}

#[test]
fn test_variables_are_attached_to_custom_pipeline() {
    let cli = parse(&[
        "trigger",
        "custom:deploy",
        "-b",
        "main",
        "--variable",
        "ENV=prod",
        "--variable",
        "RETRIES=3",
        "--secured-variable",
        "TOKEN=s3cret",
    ]);

    let Command::Trigger(cmd) = cli.command else {
        panic!("expected the trigger command");
    };
    let expected = Variables::Secured(vec![
        Variable::new("ENV", "prod"),
        Variable::new("RETRIES", "3"),
        Variable::secured("TOKEN", "s3cret"),
    ]);
    assert_eq!(
        cmd.trigger().unwrap(),
        Trigger::custom_with("deploy", expected)
    );
}

#[test]
fn test_variable_values_are_sent_verbatim() {
    let cli = parse(&[
        "trigger",
        "custom:deploy",
        "-c",
        "abc",
        "--variable",
        "VERSION=1.10",
        "--variable",
        "ZIP=007",
        "--variable",
        "N=1e3",
        "--secured-variable",
        "DRY_RUN=true",
    ]);
    let Command::Trigger(cmd) = cli.command else {
        panic!("expected the trigger command");
    };

    let Trigger::Custom {
        variables: Some(vars),
        ..
    } = cmd.trigger().unwrap()
    else {
        panic!("expected a custom trigger with variables");
    };
    let values: Vec<Scalar> = vars.into_ordered().into_iter().map(|v| v.value).collect();
    assert_eq!(
        values,
        vec![
            Scalar::String("1.10".to_string()),
            Scalar::String("007".to_string()),
            Scalar::String("1e3".to_string()),
            Scalar::String("true".to_string()),
        ]
    );
}

#[test]
fn test_variables_on_branch_pipeline_are_rejected() {
    let cli = parse(&["trigger", "branch:main", "--variable", "ENV=prod"]);
    let Command::Trigger(cmd) = cli.command else {
        panic!("expected the trigger command");
    };
    assert!(cmd.trigger().is_err());
}

#[test]
fn test_watch_and_expect_success() {
    let cli = parse(&["watch", "branch:main", "--polling-rate", "3"]);
    match cli.command {
        Command::Watch(cmd) => {
            assert_eq!(cmd.polling_rate, Some(3));
            assert_eq!(cmd.trigger.pipeline, Trigger::Branch("main".to_string()));
        }
        other => panic!("unexpected command: {:?}", other),
    }

    let cli = parse(&["expect-success", "custom:nightly", "-c", "abc123"]);
    match cli.command {
        Command::ExpectSuccess(cmd) => {
            assert_eq!(cmd.polling_rate, None);
            assert_eq!(cmd.trigger.target(), Some(Target::Commit("abc123".to_string())));
        }
        other => panic!("unexpected command: {:?}", other),
    }
}

#[test]
fn test_polling_rate_must_be_positive() {
    let err = parse_err(&["watch", "branch:main", "--polling-rate", "0"]);
    assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
}

#[test]
fn test_polling_rate_is_bounded_to_one_day() {
    let err = parse_err(&["watch", "branch:main", "--polling-rate", "18446744073709551615"]);
    assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);

    let max = MAX_POLLING_RATE.to_string();
    let cli = parse(&["expect-success", "branch:main", "--polling-rate", max.as_str()]);
    let Command::ExpectSuccess(cmd) = cli.command else {
        panic!("expected the expect-success command");
    };
    assert_eq!(cmd.polling_rate, Some(MAX_POLLING_RATE));
}

#[test]
fn test_global_flags() {
    let cli = parse(&["providers", "--provider", "github", "--config", "/tmp/sentenza.yaml"]);
    assert!(matches!(cli.command, Command::Providers));
    assert_eq!(cli.provider.as_deref(), Some("github"));
    assert_eq!(
        cli.config.as_deref(),
        Some(std::path::Path::new("/tmp/sentenza.yaml"))
    );

    assert!(matches!(parse(&["version"]).command, Command::Version));
}

#[test]
fn test_verbose_selects_debug_log_filter() {
    assert_eq!(parse(&["version"]).log_filter(), "warn");

    let filter = parse(&["version", "--verbose"]).log_filter();
    assert_eq!(filter, "warn,sentenza=debug");
    assert!(tracing_subscriber::EnvFilter::try_new(filter).is_ok());
}
