//! Configuration module for MCP Launcher.
//!
//! This module owns the host application's JSON configuration file. It
//! registers one MCP server under the `mcpServers` registry while leaving
//! every other key in the document untouched.
//!
//! # Examples
//!
//! Registering a server in a config file:
//!
//! ```no_run
//! use mcp_launcher::config::{ConfigMerger, ServerConfig};
//! use std::collections::HashMap;
//!
//! let registration = ServerConfig {
//!     command: "python3".to_string(),
//!     args: vec!["main.py".to_string(), "--transport".to_string(), "http".to_string()],
//!     env: HashMap::new(),
//! };
//!
//! let merger = ConfigMerger::new();
//! merger
//!     .reconcile("claude_desktop_config.json", "whatsapp", &registration)
//!     .unwrap();
//! ```
//!
//! Reconciling against an in-memory store:
//!
//! ```
//! use mcp_launcher::config::{ConfigMerger, MemoryConfigStore, ServerConfig};
//! use std::collections::HashMap;
//!
//! let registration = ServerConfig {
//!     command: "python3".to_string(),
//!     args: vec!["main.py".to_string()],
//!     env: HashMap::new(),
//! };
//!
//! let merger = ConfigMerger::with_store(MemoryConfigStore::new());
//! merger.reconcile("/virtual/config.json", "whatsapp", &registration).unwrap();
//! assert!(merger.store().get("/virtual/config.json").is_some());
//! ```
mod merger;
mod parser;
pub mod paths;
mod store;
pub mod validator;

pub use merger::{ConfigMerger, merge_registration};
pub use parser::{ConfigDocument, ServerConfig, parse_document, render_document};
pub use paths::default_config_path;
pub use store::{ConfigStore, FsConfigStore, MemoryConfigStore};
pub use validator::{validate_endpoint, validate_server_config};

/// Top-level key of the servers registry inside the host application config.
pub const SERVERS_REGISTRY_KEY: &str = "mcpServers";

/// Registry key the launched server is registered under by default.
pub const DEFAULT_SERVER_NAME: &str = "whatsapp";
