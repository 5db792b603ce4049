/*!
 # MCP Launcher

 A Rust library and CLI for registering an MCP server with a host
 application and running it in the foreground.

 ## Overview

 MCP Launcher provides functionality to:
 - Register a server under `mcpServers` in the host application's JSON
   config without disturbing anything else in the file
 - Start the server as a foreground child process with the HTTP transport
 - Treat Ctrl+C as a clean stop and surface the server's exit status

 ## Basic Usage

 ```no_run
 use mcp_launcher::{LaunchOptions, LaunchSpec, Launcher, Result};
 use mcp_launcher::config::default_config_path;

 #[tokio::main]
 async fn main() -> Result<()> {
     let spec = LaunchSpec::new("python3", "/opt/whatsapp-mcp-server/main.py")
         .with_host("localhost")
         .with_port(8000);

     let options = LaunchOptions::new(default_config_path()?, spec);

     // Registers the server, then runs it until it exits or Ctrl+C
     let outcome = Launcher::new().run(&options).await?;
     println!("Finished: {:?}", outcome);

     Ok(())
 }
 ```

 ## Features

 - **Idempotent Registration**: Re-running rewrites the same entry, nothing else
 - **Safe Writes**: Unparseable configs are never overwritten
 - **Process Supervision**: Pass-through output, clean interrupt handling
 - **Error Handling**: Every failure maps to a process exit code

 ## License

 This project is licensed under the terms in the LICENSE file.
*/

pub mod config;
pub mod error;
pub mod launcher;
pub mod server;

pub use config::{ConfigMerger, ServerConfig};
pub use error::{Error, Result};
pub use launcher::{LaunchOptions, Launcher};
pub use server::{ExitOutcome, LaunchSpec, ProcessSupervisor, Supervise, SupervisorState};
