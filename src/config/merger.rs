use crate::config::SERVERS_REGISTRY_KEY;
use crate::config::parser::{ConfigDocument, ServerConfig, json_kind, parse_document, render_document};
use crate::config::store::{ConfigStore, FsConfigStore};
use crate::config::validator::validate_server_config;
use crate::error::{Error, Result};
use serde_json::Value;
use std::path::Path;

/// Registers a server in a host application configuration file.
///
/// Reconciliation is a read-modify-write of a single registry entry: the
/// entry is replaced wholesale, everything else in the document is kept.
/// Running it repeatedly with the same registration yields the same file.
///
/// Concurrent launchers writing the same file are not coordinated; the last
/// writer wins.
#[derive(Debug, Clone)]
pub struct ConfigMerger<S = FsConfigStore> {
    store: S,
    registry_key: String,
}

impl ConfigMerger<FsConfigStore> {
    /// Create a merger that works on the real filesystem
    pub fn new() -> Self {
        Self::with_store(FsConfigStore::new())
    }
}

impl Default for ConfigMerger<FsConfigStore> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: ConfigStore> ConfigMerger<S> {
    /// Create a merger backed by the given store
    pub fn with_store(store: S) -> Self {
        Self {
            store,
            registry_key: SERVERS_REGISTRY_KEY.to_string(),
        }
    }

    /// Use a different top-level key for the servers registry
    pub fn registry_key(mut self, key: impl Into<String>) -> Self {
        self.registry_key = key.into();
        self
    }

    /// Get the underlying store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Registers `registration` under `name` in the config file at `path`.
    ///
    /// Creates the parent directories and the file when they are missing.
    ///
    /// # Errors
    ///
    /// * [`Error::ConfigInvalid`] if the registration fails validation
    /// * [`Error::ConfigRead`] if the existing file is not a valid config
    ///   document; the file is left untouched
    /// * [`Error::ConfigWrite`] if the directories or the file cannot be
    ///   written
    #[tracing::instrument(skip(self, path, registration), fields(config_path = ?path.as_ref(), registry = %self.registry_key))]
    pub fn reconcile(
        &self,
        path: impl AsRef<Path>,
        name: &str,
        registration: &ServerConfig,
    ) -> Result<()> {
        let path = path.as_ref();
        validate_server_config(name, registration)?;

        self.store.ensure_parent_dir(path)?;

        let mut document = self.load(path)?;
        merge_registration(&mut document, &self.registry_key, name, registration)?;

        let rendered = render_document(&document)?;
        self.store.write(path, &rendered)?;

        tracing::info!(config_path = %path.display(), "Configuration updated");
        Ok(())
    }

    /// Loads the document at `path`, or an empty one if there is no file.
    pub fn load(&self, path: impl AsRef<Path>) -> Result<ConfigDocument> {
        let path = path.as_ref();
        match self.store.read(path)? {
            Some(content) => parse_document(&content).map_err(|e| match e {
                Error::ConfigRead(msg) => {
                    Error::ConfigRead(format!("{}: {}", path.display(), msg))
                }
                other => other,
            }),
            None => {
                tracing::debug!("No existing config file, starting from an empty document");
                Ok(ConfigDocument::new())
            }
        }
    }
}

/// Sets `document[registry_key][name]` to `registration`.
///
/// The registry is created when absent. Other registry entries and other
/// top-level keys are not touched.
///
/// # Errors
///
/// Returns [`Error::ConfigRead`] if the registry exists but is not an
/// object; it is never coerced.
pub fn merge_registration(
    document: &mut ConfigDocument,
    registry_key: &str,
    name: &str,
    registration: &ServerConfig,
) -> Result<()> {
    let registry = document
        .entry(registry_key.to_string())
        .or_insert_with(|| Value::Object(Default::default()));

    let servers = match registry {
        Value::Object(servers) => servers,
        other => {
            return Err(Error::ConfigRead(format!(
                "Expected \"{}\" to be an object, found {}",
                registry_key,
                json_kind(other)
            )));
        }
    };

    if servers.contains_key(name) {
        tracing::debug!(server_name = %name, "Replacing existing server entry");
    }
    servers.insert(name.to_string(), registration.to_value()?);
    Ok(())
}
