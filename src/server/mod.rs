/// Server supervision module for MCP Launcher.
///
/// This module turns resolved launch parameters into a child process and
/// supervises it until it exits or the operator interrupts the run.
/// All public entry points are instrumented with `tracing` spans.
///
/// # Components
///
/// * `launch` - Launch parameters and runtime resolution
/// * `process` - Foreground supervision of the server process
///
/// # Examples
///
/// Running a server until Ctrl+C:
///
/// ```no_run
/// use mcp_launcher::server::{ExitOutcome, LaunchSpec, ProcessSupervisor, Supervise};
///
/// # async fn example() -> mcp_launcher::Result<()> {
/// let spec = LaunchSpec::new("python3", "/opt/server/main.py").with_port(8000);
///
/// let mut supervisor = ProcessSupervisor::new();
/// match supervisor.run(&spec).await? {
///     ExitOutcome::CleanStop => println!("Stopped by user"),
///     outcome => println!("Server exited with code {}", outcome.exit_code()),
/// }
/// # Ok(())
/// # }
/// ```
pub mod launch;
mod process;

pub use launch::{
    LaunchSpec, absolute_entry_point, default_entry_point, resolve_runtime,
    runtime_for_registration,
};
pub use process::{ExitOutcome, ProcessSupervisor, Supervise, SupervisorState, interrupt};
