use crate::config::{ConfigMerger, ConfigStore, DEFAULT_SERVER_NAME, FsConfigStore};
use crate::error::{Error, Result};
use crate::server::{ExitOutcome, LaunchSpec, ProcessSupervisor, Supervise};
use std::path::PathBuf;

/// Inputs for a single launcher run.
#[derive(Debug, Clone)]
pub struct LaunchOptions {
    /// Host application config file to register the server in
    pub config_path: PathBuf,
    /// Registry key the server is registered under
    pub server_name: String,
    /// How the server is launched
    pub spec: LaunchSpec,
    /// Only update the config; do not start the server
    pub config_only: bool,
}

impl LaunchOptions {
    /// Create options for registering and running `spec`
    pub fn new(config_path: impl Into<PathBuf>, spec: LaunchSpec) -> Self {
        Self {
            config_path: config_path.into(),
            server_name: DEFAULT_SERVER_NAME.to_string(),
            spec,
            config_only: false,
        }
    }

    /// Register under a different name
    pub fn with_server_name(mut self, name: impl Into<String>) -> Self {
        self.server_name = name.into();
        self
    }

    /// Toggle config-only mode
    pub fn config_only(mut self, config_only: bool) -> Self {
        self.config_only = config_only;
        self
    }
}

/// Registers the server in the host config, then supervises it.
///
/// The config is always reconciled first. A config failure ends the run
/// before any process is started.
pub struct Launcher<S = FsConfigStore, P = ProcessSupervisor> {
    merger: ConfigMerger<S>,
    supervisor: P,
}

impl Launcher<FsConfigStore, ProcessSupervisor> {
    /// Create a launcher working on the real filesystem and processes
    pub fn new() -> Self {
        Self::with_parts(ConfigMerger::new(), ProcessSupervisor::new())
    }
}

impl Default for Launcher<FsConfigStore, ProcessSupervisor> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: ConfigStore, P: Supervise> Launcher<S, P> {
    /// Create a launcher from a merger and a supervisor
    pub fn with_parts(merger: ConfigMerger<S>, supervisor: P) -> Self {
        Self { merger, supervisor }
    }

    /// Get the config merger
    pub fn merger(&self) -> &ConfigMerger<S> {
        &self.merger
    }

    /// Get the supervisor
    pub fn supervisor(&self) -> &P {
        &self.supervisor
    }

    /// Run the launcher.
    ///
    /// Returns `None` in config-only mode, otherwise the supervisor's outcome.
    /// A server exiting with a failure status is turned into
    /// [`Error::ProcessExit`] so the run ends non-zero.
    #[tracing::instrument(skip(self, options), fields(server_name = %options.server_name, config_only = options.config_only))]
    pub async fn run(&mut self, options: &LaunchOptions) -> Result<Option<ExitOutcome>> {
        options.spec.validate()?;

        let registration = options.spec.to_server_config();
        self.merger
            .reconcile(&options.config_path, &options.server_name, &registration)?;
        tracing::info!(
            config_path = %options.config_path.display(),
            server_name = %options.server_name,
            "Registered server in host application config"
        );

        if options.config_only {
            tracing::info!("Configuration updated; restart the host application to pick it up");
            return Ok(None);
        }

        tracing::info!(address = %options.spec.address(), "Starting server; press Ctrl+C to stop");
        match self.supervisor.run(&options.spec).await? {
            ExitOutcome::ExitedError { code } => Err(Error::ProcessExit(code)),
            outcome => Ok(Some(outcome)),
        }
    }
}
