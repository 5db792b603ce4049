#![cfg(unix)]

use mcp_launcher::error::{Error, Result};
use mcp_launcher::server::{ExitOutcome, LaunchSpec, ProcessSupervisor, SupervisorState};
use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};
use tempfile::TempDir;

/// Writes a shell script standing in for the server entry point
fn script(dir: &TempDir, body: &str) -> std::path::PathBuf {
    let path = dir.path().join("main.sh");
    fs::write(&path, body).unwrap();
    path
}

/// Shutdown signal that never fires
fn never() -> std::future::Pending<()> {
    std::future::pending()
}

fn spec(entry_point: &Path) -> LaunchSpec {
    LaunchSpec::new("sh", entry_point)
}

#[tokio::test]
async fn test_clean_exit() -> Result<()> {
    let dir = tempfile::tempdir().unwrap();
    let entry = script(&dir, "exit 0\n");
    let mut supervisor = ProcessSupervisor::new();

    let outcome = supervisor
        .run_until(&spec(&entry), never())
        .await?;

    assert_eq!(outcome, ExitOutcome::ExitedOk);
    assert_eq!(supervisor.state(), SupervisorState::ExitedOk);
    Ok(())
}

#[tokio::test]
async fn test_failure_status_is_reported() -> Result<()> {
    let dir = tempfile::tempdir().unwrap();
    let entry = script(&dir, "exit 3\n");
    let mut supervisor = ProcessSupervisor::new();

    let outcome = supervisor
        .run_until(&spec(&entry), never())
        .await?;

    assert_eq!(outcome, ExitOutcome::ExitedError { code: 3 });
    assert_eq!(outcome.exit_code(), 3);
    assert_eq!(supervisor.state(), SupervisorState::ExitedError(3));
    Ok(())
}

#[tokio::test]
async fn test_interrupt_is_clean_stop() -> Result<()> {
    let dir = tempfile::tempdir().unwrap();
    let entry = script(&dir, "sleep 30\n");
    let mut supervisor = ProcessSupervisor::new();

    let started = Instant::now();
    let outcome = supervisor
        .run_until(&spec(&entry), tokio::time::sleep(Duration::from_millis(200)))
        .await?;

    assert_eq!(outcome, ExitOutcome::CleanStop);
    assert_eq!(outcome.exit_code(), 0);
    assert_eq!(supervisor.state(), SupervisorState::CleanStop);
    assert!(started.elapsed() < Duration::from_secs(20));
    Ok(())
}

#[tokio::test]
async fn test_interrupt_is_forwarded_to_child() -> Result<()> {
    let dir = tempfile::tempdir().unwrap();
    let marker = dir.path().join("stopped");
    let entry = script(
        &dir,
        r#"trap 'echo done > "$STOP_MARKER"; exit 0' INT TERM
while :; do sleep 0.1; done
"#,
    );
    let spec = spec(&entry).with_env("STOP_MARKER", marker.to_string_lossy());
    let mut supervisor = ProcessSupervisor::new().with_grace_period(Duration::from_secs(10));

    let started = Instant::now();
    let outcome = supervisor
        .run_until(&spec, tokio::time::sleep(Duration::from_millis(300)))
        .await?;

    assert_eq!(outcome, ExitOutcome::CleanStop);
    // The child ran its own shutdown instead of being killed outright.
    assert_eq!(fs::read_to_string(&marker).unwrap().trim(), "done");
    assert!(started.elapsed() < Duration::from_secs(10));
    Ok(())
}

#[tokio::test]
async fn test_unresponsive_child_is_killed_after_grace_period() -> Result<()> {
    let dir = tempfile::tempdir().unwrap();
    let entry = script(
        &dir,
        r#"trap '' INT
while :; do sleep 0.1; done
"#,
    );
    let mut supervisor = ProcessSupervisor::new().with_grace_period(Duration::from_millis(300));

    let started = Instant::now();
    let outcome = supervisor
        .run_until(&spec(&entry), tokio::time::sleep(Duration::from_millis(200)))
        .await?;

    assert_eq!(outcome, ExitOutcome::CleanStop);
    assert_eq!(supervisor.state(), SupervisorState::CleanStop);
    assert!(started.elapsed() < Duration::from_secs(10));
    Ok(())
}

#[tokio::test]
async fn test_missing_runtime_fails_to_start() {
    let dir = tempfile::tempdir().unwrap();
    let entry = script(&dir, "exit 0\n");
    let mut supervisor = ProcessSupervisor::new();
    let spec = LaunchSpec::new(dir.path().join("no-such-runtime"), &entry);

    let err = supervisor
        .run_until(&spec, never())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::ProcessStart(_)));
    assert_eq!(supervisor.state(), SupervisorState::FailedToStart);
}

#[tokio::test]
async fn test_arguments_and_env_reach_child() -> Result<()> {
    let dir = tempfile::tempdir().unwrap();
    let entry = script(
        &dir,
        r#"[ "$1" = "--transport" ] || exit 10
[ "$2" = "http" ] || exit 11
[ "$3" = "--host" ] || exit 12
[ "$4" = "127.0.0.1" ] || exit 13
[ "$5" = "--port" ] || exit 14
[ "$6" = "8123" ] || exit 15
[ "$LAUNCHER_TEST_TOKEN" = "secret" ] || exit 16
exit 0
"#,
    );
    let spec = spec(&entry)
        .with_host("127.0.0.1")
        .with_port(8123)
        .with_env("LAUNCHER_TEST_TOKEN", "secret");
    let mut supervisor = ProcessSupervisor::new();

    let outcome = supervisor.run_until(&spec, never()).await?;

    assert_eq!(outcome, ExitOutcome::ExitedOk);
    // Overrides apply to the child only.
    assert!(std::env::var("LAUNCHER_TEST_TOKEN").is_err());
    Ok(())
}
