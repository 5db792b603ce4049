use crate::config::{ServerConfig, validate_endpoint};
use crate::error::{Error, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Default host the server binds to
pub const DEFAULT_HOST: &str = "localhost";

/// Default port the server binds to
pub const DEFAULT_PORT: u16 = 8000;

/// Transport the server is always started with
pub const TRANSPORT: &str = "http";

/// Interpreters tried, in order, when no runtime is given explicitly
pub const RUNTIME_CANDIDATES: &[&str] = &["python3", "python"];

/// Entry point file name, looked up next to the launcher executable
pub const DEFAULT_ENTRY_POINT: &str = "main.py";

/// Resolved parameters for one launch of the server.
///
/// Derived once per run. The same value produces both the registry entry
/// written to the host config and the supervised child invocation, so the
/// two never disagree.
///
/// # Examples
///
/// ```
/// use mcp_launcher::server::LaunchSpec;
///
/// let spec = LaunchSpec::new("/usr/bin/python3", "/opt/server/main.py")
///     .with_host("0.0.0.0")
///     .with_port(9000);
///
/// assert_eq!(
///     spec.args(),
///     vec!["/opt/server/main.py", "--transport", "http", "--host", "0.0.0.0", "--port", "9000"]
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchSpec {
    /// Runtime (interpreter) executing the entry point
    pub runtime: PathBuf,
    /// Server entry point passed as the first argument
    pub entry_point: PathBuf,
    /// Host the server binds to
    pub host: String,
    /// Port the server binds to
    pub port: u16,
    /// Environment overrides applied to the child only
    pub env: HashMap<String, String>,
}

impl LaunchSpec {
    /// Create a spec with the default host and port
    pub fn new(runtime: impl Into<PathBuf>, entry_point: impl Into<PathBuf>) -> Self {
        Self {
            runtime: runtime.into(),
            entry_point: entry_point.into(),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            env: HashMap::new(),
        }
    }

    /// Set the host
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Set the port
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Add an environment override for the child
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// The executable to run
    pub fn command(&self) -> String {
        self.runtime.to_string_lossy().into_owned()
    }

    /// Full argument vector after the runtime: entry point, then transport flags
    pub fn args(&self) -> Vec<String> {
        vec![
            self.entry_point.to_string_lossy().into_owned(),
            "--transport".to_string(),
            TRANSPORT.to_string(),
            "--host".to_string(),
            self.host.clone(),
            "--port".to_string(),
            self.port.to_string(),
        ]
    }

    /// URL the server will be reachable at
    pub fn address(&self) -> String {
        format!("{}://{}:{}", TRANSPORT, self.host, self.port)
    }

    /// The registry entry describing this launch
    pub fn to_server_config(&self) -> ServerConfig {
        ServerConfig {
            command: self.command(),
            args: self.args(),
            env: self.env.clone(),
        }
    }

    /// Check that the spec describes something launchable
    pub fn validate(&self) -> Result<()> {
        if self.runtime.as_os_str().is_empty() {
            return Err(Error::ConfigInvalid("Runtime is empty".to_string()));
        }
        if self.entry_point.as_os_str().is_empty() {
            return Err(Error::ConfigInvalid("Entry point is empty".to_string()));
        }
        validate_endpoint(&self.host, self.port)
    }
}

/// Resolves the runtime that executes the server.
///
/// An explicit runtime is looked up on `PATH` when it is a bare name and
/// used as-is otherwise. Without one, the first of [`RUNTIME_CANDIDATES`]
/// found on `PATH` is used.
pub fn resolve_runtime(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(runtime) = explicit {
        if runtime.components().count() > 1 {
            return Ok(runtime.to_path_buf());
        }
        return which::which(runtime).map_err(|e| {
            Error::ConfigInvalid(format!(
                "Runtime '{}' not found: {}",
                runtime.display(),
                e
            ))
        });
    }

    RUNTIME_CANDIDATES
        .iter()
        .find_map(|candidate| which::which(candidate).ok())
        .ok_or_else(|| {
            Error::ConfigInvalid(format!(
                "No runtime found on PATH (tried {}); pass --runtime",
                RUNTIME_CANDIDATES.join(", ")
            ))
        })
}

/// Resolves the runtime, falling back to the unresolved name.
///
/// Used when only the registration is written: the host application looks
/// the command up itself, so a runtime missing from this machine's `PATH`
/// must not block updating the config.
pub fn runtime_for_registration(explicit: Option<&Path>) -> PathBuf {
    resolve_runtime(explicit).unwrap_or_else(|e| {
        let fallback = explicit
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(RUNTIME_CANDIDATES[0]));
        tracing::warn!(error = %e, runtime = %fallback.display(), "Registering unresolved runtime");
        fallback
    })
}

/// The default entry point: [`DEFAULT_ENTRY_POINT`] in the directory holding
/// the launcher executable.
pub fn default_entry_point() -> Result<PathBuf> {
    let exe = std::env::current_exe().map_err(|e| {
        Error::ConfigInvalid(format!("Cannot determine the launcher location: {}", e))
    })?;
    let dir = exe.parent().ok_or_else(|| {
        Error::ConfigInvalid(format!(
            "Launcher executable {} has no parent directory",
            exe.display()
        ))
    })?;
    Ok(dir.join(DEFAULT_ENTRY_POINT))
}

/// Makes the entry point absolute against `base` so the registry entry works
/// regardless of the host application's working directory.
pub fn absolute_entry_point(entry_point: &Path, base: &Path) -> PathBuf {
    if entry_point.is_absolute() {
        entry_point.to_path_buf()
    } else {
        base.join(entry_point)
    }
}
