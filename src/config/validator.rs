use crate::config::ServerConfig;
use crate::error::{Error, Result};

/// Validates a server registration before it is written
pub fn validate_server_config(name: &str, config: &ServerConfig) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::ConfigInvalid("Server name is empty".to_string()));
    }

    if config.command.is_empty() {
        return Err(Error::ConfigInvalid(format!(
            "Server '{}' has empty command",
            name
        )));
    }

    for key in config.env.keys() {
        if key.is_empty() || key.contains('=') || key.contains('\0') {
            return Err(Error::ConfigInvalid(format!(
                "Server '{}' has invalid environment variable name '{}'",
                name, key
            )));
        }
    }

    Ok(())
}

/// Validates the address the server will listen on
pub fn validate_endpoint(host: &str, port: u16) -> Result<()> {
    if host.trim().is_empty() {
        return Err(Error::ConfigInvalid("Host is empty".to_string()));
    }

    if port == 0 {
        return Err(Error::ConfigInvalid("Port must be non-zero".to_string()));
    }

    Ok(())
}
