use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

#[test]
fn sync_without_configuration_fails_naming_the_variable() {
    let tmp = tempdir().unwrap();
    let mut cmd = Command::cargo_bin("pod-bucket").expect("Binary exists");

    cmd.current_dir(tmp.path()).env_clear().arg("sync");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("R2_ACCOUNT_ID"));
    assert!(!tmp.path().join("downloads").exists());
    assert!(!tmp.path().join("feeds").exists());
}

#[test]
fn missing_secret_halts_before_any_stage() {
    let tmp = tempdir().unwrap();
    let mut cmd = Command::cargo_bin("pod-bucket").expect("Binary exists");

    cmd.current_dir(tmp.path())
        .env_clear()
        .env("R2_ACCOUNT_ID", "acct")
        .env("R2_BUCKET", "pods")
        .env("R2_ACCESS_KEY_ID", "id")
        .env("PLAYLISTS", "https://x/playlist1")
        .arg("publish");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("R2_SECRET_ACCESS_KEY"));
    assert!(!tmp.path().join("feeds").exists());
}

#[test]
fn help_lists_stage_subcommands() {
    let mut cmd = Command::cargo_bin("pod-bucket").expect("Binary exists");
    cmd.arg("--help");
    cmd.assert().success().stdout(
        predicate::str::contains("sync")
            .and(predicate::str::contains("download"))
            .and(predicate::str::contains("upload"))
            .and(predicate::str::contains("publish")),
    );
}

#[test]
fn no_subcommand_parses_as_full_pipeline() {
    use clap::Parser;
    use pod_bucket::cli::{Cli, Commands};

    let cli = Cli::try_parse_from(["pod-bucket"]).expect("bare invocation parses");
    assert_eq!(cli.command.unwrap_or(Commands::Sync), Commands::Sync);

    let cli = Cli::try_parse_from(["pod-bucket", "upload"]).expect("subcommand parses");
    assert_eq!(cli.command, Some(Commands::Upload));
}

#[test]
fn bare_invocation_runs_sync_and_fails_on_missing_configuration() {
    let tmp = tempdir().unwrap();
    let mut cmd = Command::cargo_bin("pod-bucket").expect("Binary exists");

    cmd.current_dir(tmp.path()).env_clear();

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("R2_ACCOUNT_ID"));
}

use std::sync::{Arc, Mutex};
use tracing_subscriber::{layer::Context, Layer, Registry};
use tracing_subscriber::prelude::*;

/// Collects emitted event messages.
struct EventCollector {
    events: Arc<Mutex<Vec<String>>>,
}

impl<S> Layer<S> for EventCollector
where
    S: tracing::Subscriber,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        self.events.lock().unwrap().push(format!("{:?}", event));
    }
}

#[tokio::test]
#[serial_test::serial]
async fn run_emits_trace_initialised_before_config_error() {
    let events = Arc::new(Mutex::new(Vec::new()));
    let collector = EventCollector {
        events: events.clone(),
    };
    let subscriber = Registry::default().with(collector);
    let _guard = tracing::subscriber::set_default(subscriber);

    std::env::remove_var("R2_ACCOUNT_ID");

    use pod_bucket::cli::{run, Cli, Commands};
    let result = run(Cli {
        command: Some(Commands::Sync),
    })
    .await;

    assert!(result.is_err());
    let event_msgs = events.lock().unwrap();
    assert!(
        event_msgs.iter().any(|msg| msg.contains("trace_initialised")),
        "Expected a 'trace_initialised' trace event, got: {:?}",
        event_msgs
    );
}
