//! File store
//!
//! Source of the files served by the transfer variant.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use crate::error::{LinkError, Result};

use super::message::FileEntry;

/// Provider of listable, readable files.
pub trait FileStore: Send + Sync {
    /// Enumerate the available files
    fn list(&self) -> Result<Vec<FileEntry>>;

    /// Whether `name` refers to an existing regular file
    fn exists(&self, name: &str) -> bool;

    /// Read a file's full content
    fn read(&self, name: &str) -> Result<Vec<u8>>;
}

/// File store backed by a flat directory.
///
/// Only regular files directly inside the root are visible. Names
/// containing path separators or parent references are rejected so a peer
/// cannot reach outside the served directory.
pub struct DirStore {
    root: PathBuf,
}

impl DirStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, name: &str) -> Option<PathBuf> {
        if name.is_empty()
            || name.contains('/')
            || name.contains('\\')
            || name.contains("..")
        {
            return None;
        }
        Some(self.root.join(name))
    }
}

impl FileStore for DirStore {
    fn list(&self) -> Result<Vec<FileEntry>> {
        // Create the directory on first use, like a freshly deployed server.
        if !self.root.exists() {
            fs::create_dir_all(&self.root)?;
            tracing::info!("Created file directory: {}", self.root.display());
        }

        let mut entries = Vec::new();
        for dir_entry in fs::read_dir(&self.root)? {
            let dir_entry = dir_entry?;
            let meta = dir_entry.metadata()?;
            if !meta.is_file() {
                continue;
            }
            let name = dir_entry.file_name().to_string_lossy().to_string();
            let modified_ms = meta
                .modified()
                .ok()
                .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
                .map(|d| d.as_millis() as u64)
                .unwrap_or(0);
            entries.push(FileEntry::new(name, meta.len(), modified_ms));
        }

        tracing::debug!(
            "Found {} files in directory: {}",
            entries.len(),
            self.root.display()
        );
        Ok(entries)
    }

    fn exists(&self, name: &str) -> bool {
        self.resolve(name)
            .map(|p| p.is_file())
            .unwrap_or(false)
    }

    fn read(&self, name: &str) -> Result<Vec<u8>> {
        let path = self
            .resolve(name)
            .filter(|p: &PathBuf| p.is_file())
            .ok_or_else(|| LinkError::Remote(format!("File not found: {}", name)))?;
        read_file(&path)
    }
}

fn read_file(path: &Path) -> Result<Vec<u8>> {
    let data = fs::read(path)?;
    tracing::debug!("Read file: {}, size: {} bytes", path.display(), data.len());
    Ok(data)
}
