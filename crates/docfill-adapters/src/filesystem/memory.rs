//! In-memory filesystem adapter for testing.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::{Arc, RwLock},
};

use docfill_core::{
    application::{ApplicationError, ports::Filesystem},
    error::{DocfillError, DocfillResult},
};

/// In-memory filesystem for testing.
#[derive(Debug, Clone, Default)]
pub struct MemoryFilesystem {
    files: Arc<RwLock<HashMap<PathBuf, Vec<u8>>>>,
}

impl MemoryFilesystem {
    /// Create a new empty memory filesystem.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a file (testing helper).
    pub fn with_file(self, path: impl Into<PathBuf>, bytes: impl Into<Vec<u8>>) -> Self {
        if let Ok(mut files) = self.files.write() {
            files.insert(path.into(), bytes.into());
        }
        self
    }

    /// Read a file's content (testing helper).
    pub fn read_file(&self, path: &Path) -> Option<Vec<u8>> {
        self.files.read().ok()?.get(path).cloned()
    }

    /// List all files, sorted.
    pub fn list_files(&self) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = self
            .files
            .read()
            .map(|f| f.keys().cloned().collect())
            .unwrap_or_default();
        paths.sort();
        paths
    }
}

impl Filesystem for MemoryFilesystem {
    fn read(&self, path: &Path) -> DocfillResult<Vec<u8>> {
        let files = self.files.read().map_err(|_| lock_error(path))?;
        files.get(path).cloned().ok_or_else(|| {
            ApplicationError::FilesystemError {
                path: path.to_path_buf(),
                reason: "File not found".into(),
            }
            .into()
        })
    }

    fn exists(&self, path: &Path) -> bool {
        self.files
            .read()
            .map(|f| f.contains_key(path))
            .unwrap_or(false)
    }

    fn write_atomic(&self, path: &Path, bytes: &[u8]) -> DocfillResult<()> {
        let mut files = self.files.write().map_err(|_| lock_error(path))?;
        files.insert(path.to_path_buf(), bytes.to_vec());
        Ok(())
    }
}

fn lock_error(path: &Path) -> DocfillError {
    ApplicationError::FilesystemError {
        path: path.to_path_buf(),
        reason: "in-memory filesystem lock poisoned".into(),
    }
    .into()
}
