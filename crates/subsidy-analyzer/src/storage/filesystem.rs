use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::StorageError;

/// Writes downloaded documents and analysis artifacts under one directory.
/// Existing files with the same name are overwritten.
pub struct FileStorage {
    output_directory: PathBuf,
}

impl FileStorage {
    pub fn new<P: AsRef<Path>>(output_directory: P) -> Self {
        Self {
            output_directory: output_directory.as_ref().to_path_buf(),
        }
    }

    pub fn store_bytes(&self, filename: &str, content: &[u8]) -> Result<PathBuf, StorageError> {
        self.ensure_directory(&self.output_directory)?;

        let path = self.output_directory.join(filename);
        std::fs::write(&path, content).map_err(|e| StorageError::WriteFile {
            path: path.clone(),
            source: e,
        })?;

        Ok(path)
    }

    /// Pretty-printed JSON, non-ASCII characters kept as-is.
    pub fn store_json<T: Serialize + ?Sized>(
        &self,
        filename: &str,
        value: &T,
    ) -> Result<PathBuf, StorageError> {
        let json = serde_json::to_string_pretty(value)?;
        self.store_bytes(filename, json.as_bytes())
    }

    fn ensure_directory(&self, path: &Path) -> Result<(), StorageError> {
        if !path.exists() {
            std::fs::create_dir_all(path).map_err(|e| StorageError::CreateDirectory {
                path: path.to_path_buf(),
                source: e,
            })?;
        }
        Ok(())
    }
}
