// src/server/process.rs
use crate::error::{Error, Result};
use crate::server::LaunchSpec;
use async_process::{Child, Command, ExitStatus, Stdio};
use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;

/// How long an interrupted server gets to shut down before it is killed
pub const DEFAULT_GRACE_PERIOD: Duration = Duration::from_secs(5);

/// State of a supervised server process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorState {
    /// No process has been started yet
    NotStarted,
    /// The process is running and the supervisor is waiting on it
    Running,
    /// The operator interrupted the run
    CleanStop,
    /// The process exited with status 0
    ExitedOk,
    /// The process exited with a failure status
    ExitedError(i32),
    /// The process could not be started
    FailedToStart,
}

impl SupervisorState {
    /// Whether no further transition can happen
    pub fn is_terminal(self) -> bool {
        !matches!(self, SupervisorState::NotStarted | SupervisorState::Running)
    }
}

/// How a supervised run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitOutcome {
    /// Stopped by an operator interrupt; a successful shutdown
    CleanStop,
    /// The server exited on its own with status 0
    ExitedOk,
    /// The server exited with a failure status
    ExitedError {
        /// Exit status of the server (`128 + signal` if it was killed)
        code: i32,
    },
}

impl ExitOutcome {
    /// Exit code the launcher should terminate with
    pub fn exit_code(self) -> i32 {
        match self {
            ExitOutcome::CleanStop | ExitOutcome::ExitedOk => 0,
            ExitOutcome::ExitedError { code } => code,
        }
    }

    /// Whether this outcome counts as success
    pub fn is_success(self) -> bool {
        self.exit_code() == 0
    }

    fn from_status(status: ExitStatus) -> Self {
        if status.success() {
            return ExitOutcome::ExitedOk;
        }
        if let Some(code) = status.code() {
            return ExitOutcome::ExitedError { code };
        }

        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            if let Some(signal) = status.signal() {
                if signal == nix::sys::signal::Signal::SIGINT as i32 {
                    // The terminal interrupt reached the child before us.
                    return ExitOutcome::CleanStop;
                }
                return ExitOutcome::ExitedError { code: 128 + signal };
            }
        }

        ExitOutcome::ExitedError { code: 1 }
    }

    fn state(self) -> SupervisorState {
        match self {
            ExitOutcome::CleanStop => SupervisorState::CleanStop,
            ExitOutcome::ExitedOk => SupervisorState::ExitedOk,
            ExitOutcome::ExitedError { code } => SupervisorState::ExitedError(code),
        }
    }
}

/// Something that runs a server to completion.
///
/// [`ProcessSupervisor`] is the real implementation; the launcher only
/// depends on this trait.
#[async_trait]
pub trait Supervise: Send {
    /// Start the server described by `spec` and wait for it to finish
    async fn run(&mut self, spec: &LaunchSpec) -> Result<ExitOutcome>;
}

/// Runs the server as a foreground child process.
///
/// The child shares the launcher's standard streams, so its output is the
/// visible server log. The supervisor blocks until the child exits or an
/// interrupt arrives. A running server is never timed out; only stopping it
/// after an interrupt is bounded by the grace period.
pub struct ProcessSupervisor {
    state: SupervisorState,
    grace_period: Duration,
}

impl ProcessSupervisor {
    /// Create a supervisor that has not started anything yet
    pub fn new() -> Self {
        Self {
            state: SupervisorState::NotStarted,
            grace_period: DEFAULT_GRACE_PERIOD,
        }
    }

    /// Set how long an interrupted server may take to exit before it is killed
    pub fn with_grace_period(mut self, grace_period: Duration) -> Self {
        self.grace_period = grace_period;
        self
    }

    /// Get the supervisor state
    pub fn state(&self) -> SupervisorState {
        self.state
    }

    /// Build the child command for `spec`.
    ///
    /// Environment overrides are set on the command only, never on the
    /// launcher's own environment.
    pub fn command(spec: &LaunchSpec) -> Command {
        let mut command = Command::new(&spec.runtime);
        command.args(spec.args());

        for (key, value) in &spec.env {
            command.env(key, value);
        }

        command
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);

        command
    }

    /// Run the server until it exits or `shutdown` resolves.
    ///
    /// Resolution of `shutdown` is the interrupt path: the interrupt is
    /// forwarded to the child, which gets the grace period to exit before it
    /// is killed. The child is always reaped and the outcome is
    /// [`ExitOutcome::CleanStop`].
    ///
    /// # Errors
    ///
    /// * [`Error::ProcessStart`] if the child cannot be spawned
    /// * [`Error::Other`] if waiting on the child fails
    ///
    /// A child that runs and fails is not an error here; it is reported as
    /// [`ExitOutcome::ExitedError`].
    #[tracing::instrument(skip(self, spec, shutdown), fields(runtime = %spec.runtime.display(), address = %spec.address()))]
    pub async fn run_until<F>(&mut self, spec: &LaunchSpec, shutdown: F) -> Result<ExitOutcome>
    where
        F: Future<Output = ()>,
    {
        if self.state == SupervisorState::Running {
            return Err(Error::Other("Server is already running".to_string()));
        }

        let mut child = match Self::command(spec).spawn() {
            Ok(child) => child,
            Err(e) => {
                self.state = SupervisorState::FailedToStart;
                tracing::error!(error = %e, "Failed to spawn server process");
                return Err(Error::ProcessStart(format!(
                    "{} {}: {}",
                    spec.runtime.display(),
                    spec.entry_point.display(),
                    e
                )));
            }
        };

        self.state = SupervisorState::Running;
        tracing::info!(pid = child.id(), "Server process started");

        let outcome = match wait_or_shutdown(&mut child, shutdown).await {
            Waited::Exited(Ok(status)) => {
                tracing::debug!(?status, "Server process exited");
                ExitOutcome::from_status(status)
            }
            Waited::Exited(Err(e)) => {
                // The child may still be alive; make sure it is gone.
                let _ = child.kill();
                let _ = child.status().await;
                self.state = SupervisorState::ExitedError(1);
                return Err(Error::Other(format!(
                    "Failed to wait for server process: {}",
                    e
                )));
            }
            Waited::Interrupted => {
                tracing::info!("Interrupt received, stopping server");
                self.stop_child(&mut child).await;
                ExitOutcome::CleanStop
            }
        };

        self.state = outcome.state();
        match outcome {
            ExitOutcome::CleanStop => tracing::info!("Server stopped by user"),
            ExitOutcome::ExitedOk => tracing::info!("Server exited"),
            ExitOutcome::ExitedError { code } => {
                tracing::error!(code, "Server exited with failure status")
            }
        }
        Ok(outcome)
    }
}

impl ProcessSupervisor {
    async fn stop_child(&self, child: &mut Child) {
        // The child may have already exited from the same interrupt.
        if let Ok(Some(_)) = child.try_status() {
            return;
        }

        forward_interrupt(child);
        let waited = tokio::time::timeout(self.grace_period, child.status()).await;
        if waited.is_ok() {
            return;
        }

        tracing::warn!(
            grace_period = ?self.grace_period,
            "Server did not exit after interrupt, killing it"
        );
        if let Err(e) = child.kill() {
            tracing::warn!(error = %e, "Failed to kill server process");
        }
        let _ = child.status().await;
    }
}

/// Sends SIGINT to the child, as the terminal would on Ctrl+C
#[cfg(unix)]
fn forward_interrupt(child: &Child) {
    use nix::sys::signal::{Signal, kill};
    use nix::unistd::Pid;

    if let Err(e) = kill(Pid::from_raw(child.id() as i32), Signal::SIGINT) {
        tracing::warn!(error = %e, "Failed to forward interrupt to server process");
    }
}

#[cfg(not(unix))]
fn forward_interrupt(_child: &Child) {}

impl Default for ProcessSupervisor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Supervise for ProcessSupervisor {
    /// Runs until the child exits or Ctrl+C is pressed
    async fn run(&mut self, spec: &LaunchSpec) -> Result<ExitOutcome> {
        self.run_until(spec, interrupt()).await
    }
}

enum Waited {
    Exited(std::io::Result<ExitStatus>),
    Interrupted,
}

async fn wait_or_shutdown<F>(child: &mut Child, shutdown: F) -> Waited
where
    F: Future<Output = ()>,
{
    let status = child.status();
    tokio::pin!(status);
    tokio::pin!(shutdown);

    tokio::select! {
        biased;
        _ = &mut shutdown => Waited::Interrupted,
        result = &mut status => Waited::Exited(result),
    }
}

/// Resolves on the first Ctrl+C.
///
/// If the signal handler cannot be installed the future never resolves, so
/// the run simply waits for the child.
pub async fn interrupt() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_exit_codes() {
        assert_eq!(ExitOutcome::CleanStop.exit_code(), 0);
        assert_eq!(ExitOutcome::ExitedOk.exit_code(), 0);
        assert_eq!(ExitOutcome::ExitedError { code: 3 }.exit_code(), 3);
        assert!(!ExitOutcome::ExitedError { code: 3 }.is_success());
    }

    #[test]
    fn test_terminal_states() {
        assert!(!SupervisorState::NotStarted.is_terminal());
        assert!(!SupervisorState::Running.is_terminal());
        assert!(SupervisorState::CleanStop.is_terminal());
        assert!(SupervisorState::ExitedError(2).is_terminal());
        assert!(SupervisorState::FailedToStart.is_terminal());
    }

    #[test]
    fn test_new_supervisor_is_not_started() {
        let supervisor = ProcessSupervisor::new();
        assert_eq!(supervisor.state(), SupervisorState::NotStarted);
        assert_eq!(supervisor.grace_period, DEFAULT_GRACE_PERIOD);
    }

    #[cfg(unix)]
    #[test]
    fn test_signal_exit_mapping() {
        use std::os::unix::process::ExitStatusExt;

        // Raw wait statuses: low 7 bits carry the terminating signal.
        assert_eq!(
            ExitOutcome::from_status(ExitStatus::from_raw(2)),
            ExitOutcome::CleanStop
        );
        assert_eq!(
            ExitOutcome::from_status(ExitStatus::from_raw(9)),
            ExitOutcome::ExitedError { code: 137 }
        );
        assert_eq!(
            ExitOutcome::from_status(ExitStatus::from_raw(3 << 8)),
            ExitOutcome::ExitedError { code: 3 }
        );
    }
}
