use clap::Parser;
use mcp_launcher::config::{DEFAULT_SERVER_NAME, default_config_path};
use mcp_launcher::error::{GENERAL_FAILURE_EXIT_CODE, Result};
use mcp_launcher::server::launch::{DEFAULT_HOST, DEFAULT_PORT};
use mcp_launcher::server::{
    LaunchSpec, absolute_entry_point, default_entry_point, resolve_runtime,
    runtime_for_registration,
};
use mcp_launcher::{ExitOutcome, LaunchOptions, Launcher};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{EnvFilter, fmt};

/// Register an MCP server with the host application and run it over HTTP
#[derive(Parser, Debug)]
#[command(name = "mcp-launcher", version, about, long_about = None)]
struct Cli {
    /// Host to bind to
    #[arg(long, default_value = DEFAULT_HOST)]
    host: String,

    /// Port to bind to
    #[arg(long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Only update the host application config, don't start the server
    #[arg(long)]
    config_only: bool,

    /// Host application config file (defaults to the per-user location)
    #[arg(long)]
    config_path: Option<PathBuf>,

    /// Name to register the server under
    #[arg(long, default_value = DEFAULT_SERVER_NAME)]
    server_name: String,

    /// Runtime executing the server (defaults to python3, then python)
    #[arg(long)]
    runtime: Option<PathBuf>,

    /// Server entry point (defaults to main.py next to the launcher executable)
    #[arg(long)]
    entry_point: Option<PathBuf>,

    /// Environment variable for the server, repeatable
    #[arg(long = "env", value_name = "KEY=VALUE", value_parser = parse_env_pair)]
    env: Vec<(String, String)>,
}

fn parse_env_pair(raw: &str) -> std::result::Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{}'", raw)),
    }
}

impl Cli {
    fn into_options(self) -> Result<LaunchOptions> {
        let config_path = match self.config_path {
            Some(path) => path,
            None => default_config_path()?,
        };

        let runtime = if self.config_only {
            runtime_for_registration(self.runtime.as_deref())
        } else {
            resolve_runtime(self.runtime.as_deref())?
        };

        let entry_point = match self.entry_point {
            Some(entry_point) => {
                let base = std::env::current_dir().map_err(|e| {
                    mcp_launcher::Error::ConfigInvalid(format!(
                        "Cannot determine the current directory: {}",
                        e
                    ))
                })?;
                absolute_entry_point(&entry_point, &base)
            }
            None => default_entry_point()?,
        };

        let spec = self.env.into_iter().fold(
            LaunchSpec::new(runtime, entry_point)
                .with_host(self.host)
                .with_port(self.port),
            |spec, (key, value)| spec.with_env(key, value),
        );

        Ok(LaunchOptions::new(config_path, spec)
            .with_server_name(self.server_name)
            .config_only(self.config_only))
    }
}

async fn run(cli: Cli) -> Result<Option<ExitOutcome>> {
    let options = cli.into_options()?;
    Launcher::new().run(&options).await
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let result = run(cli).await;
    if let Err(e) = &result {
        tracing::error!("{}", e);
    }
    ExitCode::from(exit_status(&result))
}

/// Process exit status for the result of a run.
///
/// Codes that do not fit an exit status are reported as a general failure.
fn exit_status(result: &Result<Option<ExitOutcome>>) -> u8 {
    let code = match result {
        Ok(None) => 0,
        Ok(Some(outcome)) => outcome.exit_code(),
        Err(e) => e.exit_code(),
    };
    u8::try_from(code).unwrap_or(GENERAL_FAILURE_EXIT_CODE as u8)
}
