use crate::error::{Error, Result};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::NamedTempFile;

/// Storage backend for configuration documents.
///
/// The merger only ever goes through this trait, so reconciliation can be
/// exercised against [`MemoryConfigStore`] without touching the real
/// filesystem.
pub trait ConfigStore {
    /// Creates the parent directory chain of `path` if it does not exist.
    fn ensure_parent_dir(&self, path: &Path) -> Result<()>;

    /// Reads the file at `path`, returning `None` if it does not exist.
    fn read(&self, path: &Path) -> Result<Option<String>>;

    /// Replaces the file at `path` with `contents`.
    fn write(&self, path: &Path, contents: &str) -> Result<()>;
}

/// Filesystem-backed store.
///
/// Writes go to a temporary file in the destination directory which is then
/// renamed over the target, so a failed write leaves the previous file intact.
/// A symlinked config is written through: the file the link points at is
/// replaced and the link itself is kept.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsConfigStore;

impl FsConfigStore {
    /// Create a new filesystem store
    pub fn new() -> Self {
        Self
    }
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

/// The file a write to `path` should actually replace.
fn write_target(path: &Path) -> PathBuf {
    let is_link = fs::symlink_metadata(path)
        .map(|meta| meta.file_type().is_symlink())
        .unwrap_or(false);
    if !is_link {
        return path.to_path_buf();
    }

    if let Ok(real) = fs::canonicalize(path) {
        return real;
    }
    // Dangling link: create the file it names.
    match fs::read_link(path) {
        Ok(link) => parent_dir(path).join(link),
        Err(_) => path.to_path_buf(),
    }
}

impl ConfigStore for FsConfigStore {
    fn ensure_parent_dir(&self, path: &Path) -> Result<()> {
        let parent = parent_dir(path);
        fs::create_dir_all(parent).map_err(|e| {
            Error::ConfigWrite(format!(
                "Failed to create config directory {}: {}",
                parent.display(),
                e
            ))
        })
    }

    fn read(&self, path: &Path) -> Result<Option<String>> {
        match fs::read_to_string(path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::ConfigRead(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))),
        }
    }

    fn write(&self, path: &Path, contents: &str) -> Result<()> {
        let write_err = |e: io::Error| {
            Error::ConfigWrite(format!(
                "Failed to write config file {}: {}",
                path.display(),
                e
            ))
        };

        let target = write_target(path);
        if target != path {
            tracing::debug!(resolved = %target.display(), "Writing config through symlink");
        }

        let mut file = NamedTempFile::new_in(parent_dir(&target)).map_err(write_err)?;
        file.write_all(contents.as_bytes()).map_err(write_err)?;
        file.as_file().sync_all().map_err(write_err)?;

        // Keep the permissions of the file being replaced.
        if let Ok(metadata) = fs::metadata(&target) {
            file.as_file()
                .set_permissions(metadata.permissions())
                .map_err(write_err)?;
        }

        file.persist(&target).map_err(|e| write_err(e.error))?;
        Ok(())
    }
}

/// In-memory store, mainly for tests.
///
/// Clones share the same underlying files, so a test can keep one handle
/// while the merger owns another.
#[derive(Debug, Clone, Default)]
pub struct MemoryConfigStore {
    files: Arc<Mutex<HashMap<PathBuf, String>>>,
    dirs: Arc<Mutex<HashSet<PathBuf>>>,
}

impl MemoryConfigStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a file with the given contents
    pub fn insert(&self, path: impl AsRef<Path>, contents: impl Into<String>) {
        if let Ok(mut files) = self.files.lock() {
            files.insert(path.as_ref().to_path_buf(), contents.into());
        }
    }

    /// Get the current contents of a file
    pub fn get(&self, path: impl AsRef<Path>) -> Option<String> {
        self.files
            .lock()
            .ok()
            .and_then(|files| files.get(path.as_ref()).cloned())
    }

    /// Whether `ensure_parent_dir` has created `dir`
    pub fn has_dir(&self, dir: impl AsRef<Path>) -> bool {
        self.dirs
            .lock()
            .map(|dirs| dirs.contains(dir.as_ref()))
            .unwrap_or(false)
    }
}

impl ConfigStore for MemoryConfigStore {
    fn ensure_parent_dir(&self, path: &Path) -> Result<()> {
        let files = self
            .files
            .lock()
            .map_err(|_| Error::Other("Failed to lock config files".to_string()))?;
        let mut dirs = self
            .dirs
            .lock()
            .map_err(|_| Error::Other("Failed to lock config dirs".to_string()))?;

        for dir in parent_dir(path).ancestors() {
            if dir.as_os_str().is_empty() {
                continue;
            }
            if files.contains_key(dir) {
                return Err(Error::ConfigWrite(format!(
                    "Failed to create config directory {}: path exists and is not a directory",
                    dir.display()
                )));
            }
            dirs.insert(dir.to_path_buf());
        }
        Ok(())
    }

    fn read(&self, path: &Path) -> Result<Option<String>> {
        let files = self
            .files
            .lock()
            .map_err(|_| Error::Other("Failed to lock config files".to_string()))?;
        Ok(files.get(path).cloned())
    }

    fn write(&self, path: &Path, contents: &str) -> Result<()> {
        if self.has_dir(path) {
            return Err(Error::ConfigWrite(format!(
                "Failed to write config file {}: path is a directory",
                path.display()
            )));
        }
        let mut files = self
            .files
            .lock()
            .map_err(|_| Error::Other("Failed to lock config files".to_string()))?;
        files.insert(path.to_path_buf(), contents.to_string());
        Ok(())
    }
}
