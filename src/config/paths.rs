//! Location of the host application's per-user configuration file.

use crate::error::{Error, Result};
use std::env;
use std::path::PathBuf;

/// File name of the host application configuration.
pub const CONFIG_FILE_NAME: &str = "claude_desktop_config.json";

/// Resolves the OS-conventional host application config path.
///
/// * macOS: `~/Library/Application Support/Claude`
/// * Windows: `%APPDATA%\Claude`, else `~\AppData\Roaming\Claude`
/// * elsewhere: `$XDG_CONFIG_HOME/claude`, else `~/.config/claude`
pub fn default_config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

fn home_dir() -> Result<PathBuf> {
    env::var_os("HOME")
        .or_else(|| env::var_os("USERPROFILE"))
        .filter(|home| !home.is_empty())
        .map(PathBuf::from)
        .ok_or_else(|| {
            Error::ConfigInvalid(
                "Cannot determine the home directory; pass --config-path".to_string(),
            )
        })
}

#[cfg(target_os = "macos")]
fn config_dir() -> Result<PathBuf> {
    Ok(home_dir()?
        .join("Library")
        .join("Application Support")
        .join("Claude"))
}

#[cfg(windows)]
fn config_dir() -> Result<PathBuf> {
    match env::var_os("APPDATA").filter(|dir| !dir.is_empty()) {
        Some(app_data) => Ok(PathBuf::from(app_data).join("Claude")),
        None => Ok(home_dir()?.join("AppData").join("Roaming").join("Claude")),
    }
}

#[cfg(not(any(target_os = "macos", windows)))]
fn config_dir() -> Result<PathBuf> {
    match env::var_os("XDG_CONFIG_HOME").filter(|dir| !dir.is_empty()) {
        Some(config_home) => Ok(PathBuf::from(config_home).join("claude")),
        None => Ok(home_dir()?.join(".config").join("claude")),
    }
}
