//! Local filesystem adapter using std::fs.

use std::io::{self, Write};
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::debug;

use docfill_core::{
    application::{ApplicationError, ports::Filesystem},
    error::{DocfillError, DocfillResult},
};

/// Production filesystem implementation using `std::fs`.
#[derive(Debug, Clone, Copy)]
pub struct LocalFilesystem;

impl LocalFilesystem {
    /// Create a new local filesystem adapter.
    pub fn new() -> Self {
        Self
    }
}

impl Default for LocalFilesystem {
    fn default() -> Self {
        Self::new()
    }
}

impl Filesystem for LocalFilesystem {
    fn read(&self, path: &Path) -> DocfillResult<Vec<u8>> {
        std::fs::read(path).map_err(|e| map_io_error(path, e, "read file"))
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    /// Writes to a temporary file in the destination directory, then renames
    /// it over `path`. A failure before the rename leaves `path` untouched.
    fn write_atomic(&self, path: &Path, bytes: &[u8]) -> DocfillResult<()> {
        let parent = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };

        if !parent.is_dir() {
            std::fs::create_dir_all(parent)
                .map_err(|e| map_io_error(parent, e, "create directory"))?;
        }

        let mut tmp =
            NamedTempFile::new_in(parent).map_err(|e| map_io_error(parent, e, "create temp file"))?;
        tmp.write_all(bytes)
            .and_then(|()| tmp.as_file().sync_all())
            .map_err(|e| map_io_error(tmp.path(), e, "write temp file"))?;

        tmp.persist(path)
            .map_err(|e| map_io_error(path, e.error, "replace file"))?;

        debug!(path = %path.display(), bytes = bytes.len(), "File written");
        Ok(())
    }
}

fn map_io_error(path: &Path, e: io::Error, operation: &str) -> DocfillError {
    ApplicationError::FilesystemError {
        path: path.to_path_buf(),
        reason: format!("Failed to {}: {}", operation, e),
    }
    .into()
}
