use assert_fs::TempDir;
use assert_fs::prelude::*;
use mcp_launcher::config::{ConfigMerger, ServerConfig, parse_document};
use mcp_launcher::error::{Error, Result};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::fs;

fn registration() -> ServerConfig {
    ServerConfig {
        command: "/usr/bin/python3".to_string(),
        args: vec![
            "/srv/whatsapp-mcp-server/main.py".to_string(),
            "--transport".to_string(),
            "http".to_string(),
            "--host".to_string(),
            "localhost".to_string(),
            "--port".to_string(),
            "8000".to_string(),
        ],
        env: HashMap::new(),
    }
}

fn read_json(path: &std::path::Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn test_bootstrap_creates_directories_and_file() -> Result<()> {
    let temp = TempDir::new().unwrap();
    let config_file = temp.child("Application Support/Claude/claude_desktop_config.json");

    ConfigMerger::new().reconcile(config_file.path(), "whatsapp", &registration())?;

    assert!(config_file.path().exists());
    let doc = read_json(config_file.path());
    assert_eq!(
        doc,
        json!({ "mcpServers": { "whatsapp": serde_json::to_value(registration()).unwrap() } })
    );

    Ok(())
}

#[test]
fn test_preserves_unrelated_configuration() -> Result<()> {
    let temp = TempDir::new().unwrap();
    let config_file = temp.child("claude_desktop_config.json");
    config_file
        .write_str(
            r#"{
  "globalShortcut": "Alt+Space",
  "mcpServers": {
    "github": {
      "command": "npx",
      "args": ["-y", "@modelcontextprotocol/server-github"],
      "env": { "GITHUB_TOKEN": "token" }
    }
  }
}"#,
        )
        .unwrap();

    ConfigMerger::new().reconcile(config_file.path(), "whatsapp", &registration())?;

    let doc = read_json(config_file.path());
    assert_eq!(doc["globalShortcut"], "Alt+Space");
    assert_eq!(
        doc["mcpServers"]["github"],
        json!({
            "command": "npx",
            "args": ["-y", "@modelcontextprotocol/server-github"],
            "env": { "GITHUB_TOKEN": "token" }
        })
    );
    assert_eq!(doc["mcpServers"]["whatsapp"]["command"], "/usr/bin/python3");

    Ok(())
}

#[test]
fn test_reconcile_twice_is_stable() -> Result<()> {
    let temp = TempDir::new().unwrap();
    let config_file = temp.child("claude_desktop_config.json");
    config_file.write_str(r#"{"theme": "light"}"#).unwrap();
    let merger = ConfigMerger::new();

    merger.reconcile(config_file.path(), "whatsapp", &registration())?;
    let first = fs::read_to_string(config_file.path()).unwrap();
    merger.reconcile(config_file.path(), "whatsapp", &registration())?;
    let second = fs::read_to_string(config_file.path()).unwrap();

    assert_eq!(parse_document(&first)?, parse_document(&second)?);
    assert_eq!(first, second);

    Ok(())
}

#[test]
fn test_corrupt_config_is_not_overwritten() {
    let temp = TempDir::new().unwrap();
    let config_file = temp.child("claude_desktop_config.json");
    config_file.write_str("{\"mcpServers\": {").unwrap();

    let result = ConfigMerger::new().reconcile(config_file.path(), "whatsapp", &registration());

    assert!(matches!(result, Err(Error::ConfigRead(_))));
    assert_eq!(
        fs::read_to_string(config_file.path()).unwrap(),
        "{\"mcpServers\": {"
    );
}

#[test]
fn test_array_config_is_rejected() {
    let temp = TempDir::new().unwrap();
    let config_file = temp.child("claude_desktop_config.json");
    config_file.write_str("[\"whatsapp\"]").unwrap();

    let result = ConfigMerger::new().reconcile(config_file.path(), "whatsapp", &registration());

    assert!(matches!(result, Err(Error::ConfigRead(_))));
    assert_eq!(
        fs::read_to_string(config_file.path()).unwrap(),
        "[\"whatsapp\"]"
    );
}

#[test]
fn test_parent_path_collision_is_write_error() {
    let temp = TempDir::new().unwrap();
    let blocker = temp.child("Claude");
    blocker.write_str("not a directory").unwrap();

    let result = ConfigMerger::new().reconcile(
        blocker.path().join("claude_desktop_config.json"),
        "whatsapp",
        &registration(),
    );

    assert!(matches!(result, Err(Error::ConfigWrite(_))));
    assert_eq!(
        fs::read_to_string(blocker.path()).unwrap(),
        "not a directory"
    );
}

#[test]
fn test_destination_directory_is_rejected() {
    let temp = TempDir::new().unwrap();
    let target = temp.child("claude_desktop_config.json");
    target.create_dir_all().unwrap();

    let result = ConfigMerger::new().reconcile(target.path(), "whatsapp", &registration());

    // Reading a directory fails before anything is written.
    assert!(matches!(result, Err(Error::ConfigRead(_))));
    assert!(target.path().is_dir());
}

#[cfg(unix)]
#[test]
fn test_symlinked_config_is_written_through() -> Result<()> {
    let temp = TempDir::new().unwrap();
    temp.child("dotfiles").create_dir_all().unwrap();
    temp.child("claude").create_dir_all().unwrap();
    let dotfile = temp.child("dotfiles/claude.json");
    dotfile.write_str(r#"{"theme": "dark"}"#).unwrap();
    let config_file = temp.child("claude/claude_desktop_config.json");
    std::os::unix::fs::symlink(dotfile.path(), config_file.path()).unwrap();

    ConfigMerger::new().reconcile(config_file.path(), "whatsapp", &registration())?;

    let link_meta = fs::symlink_metadata(config_file.path()).unwrap();
    assert!(link_meta.file_type().is_symlink());
    let doc = read_json(dotfile.path());
    assert_eq!(doc["theme"], "dark");
    assert_eq!(doc["mcpServers"]["whatsapp"]["command"], "/usr/bin/python3");

    Ok(())
}
