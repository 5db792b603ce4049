/// Error handling module for MCP Launcher.
///
/// This module defines the error types used throughout the launcher.
/// Configuration failures always abort a run before any server process is
/// started, and every variant maps to a process exit code through
/// [`Error::exit_code`].
///
/// # Example
///
/// ```
/// use mcp_launcher::error::{Error, Result};
///
/// fn handle_error(result: Result<()>) {
///     match result {
///         Ok(_) => println!("Launch succeeded"),
///         Err(Error::ConfigRead(msg)) => println!("Config is unreadable: {}", msg),
///         Err(Error::ProcessExit(code)) => println!("Server exited with status {}", code),
///         Err(e) => println!("Other error: {}", e),
///     }
/// }
/// ```
use thiserror::Error;

/// Exit code used for configuration failures.
pub const CONFIG_FAILURE_EXIT_CODE: i32 = 2;

/// Exit code used when the server process could not be started, and for
/// any failure without a more specific code.
pub const GENERAL_FAILURE_EXIT_CODE: i32 = 1;

/// Errors that can occur in the mcp-launcher library.
#[derive(Error, Debug)]
pub enum Error {
    /// The existing configuration file could not be read or parsed.
    ///
    /// This error occurs when:
    /// - The file exists but cannot be read
    /// - The file contents are not valid JSON
    /// - The top-level value, or the servers registry, is not a JSON object
    #[error("Failed to read configuration: {0}")]
    ConfigRead(String),

    /// The configuration could not be persisted.
    ///
    /// This error occurs when:
    /// - The parent directory chain cannot be created
    /// - A path component collides with an existing non-directory
    /// - The destination file cannot be written or replaced
    #[error("Failed to write configuration: {0}")]
    ConfigWrite(String),

    /// The server registration or launch parameters are invalid.
    #[error("Invalid configuration: {0}")]
    ConfigInvalid(String),

    /// The server process could not be started at all.
    ///
    /// Carries the underlying OS error, e.g. a missing executable or a
    /// permission failure.
    #[error("Failed to start server process: {0}")]
    ProcessStart(String),

    /// The server process ran and terminated with a failure status.
    #[error("Server process exited with status {0}")]
    ProcessExit(i32),

    /// Any other error not covered by the above categories.
    #[error("Other error: {0}")]
    Other(String),
}

impl Error {
    /// Returns the process exit code a run failing with this error should
    /// terminate with.
    ///
    /// A failed server mirrors its own status. Configuration failures share a
    /// fixed code so they can be told apart from server failures.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::ProcessExit(code) if *code != 0 => *code,
            Error::ConfigRead(_) | Error::ConfigWrite(_) | Error::ConfigInvalid(_) => {
                CONFIG_FAILURE_EXIT_CODE
            }
            _ => GENERAL_FAILURE_EXIT_CODE,
        }
    }

    /// Whether this error happened before any server process was involved.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Error::ConfigRead(_) | Error::ConfigWrite(_) | Error::ConfigInvalid(_)
        )
    }
}

/// Result type for mcp-launcher operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(Error::ProcessExit(3).exit_code(), 3);
        assert_eq!(Error::ProcessExit(0).exit_code(), GENERAL_FAILURE_EXIT_CODE);
        assert_eq!(
            Error::ConfigRead("bad".into()).exit_code(),
            CONFIG_FAILURE_EXIT_CODE
        );
        assert_eq!(
            Error::ConfigWrite("bad".into()).exit_code(),
            CONFIG_FAILURE_EXIT_CODE
        );
        assert_eq!(
            Error::ProcessStart("missing".into()).exit_code(),
            GENERAL_FAILURE_EXIT_CODE
        );
    }

    #[test]
    fn test_config_error_classification() {
        assert!(Error::ConfigInvalid("x".into()).is_config_error());
        assert!(!Error::ProcessExit(1).is_config_error());
        assert!(!Error::ProcessStart("x".into()).is_config_error());
    }
}
