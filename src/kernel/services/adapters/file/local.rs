//! Local filesystem provider.

use crate::kernel::services::ports::file::{FileError, FileProvider, Result};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFileProvider;

impl LocalFileProvider {
    pub fn new() -> Self {
        Self
    }

    fn check_file(path: &Path) -> Result<()> {
        match fs::metadata(path) {
            Ok(meta) if meta.is_file() => Ok(()),
            Ok(_) => Err(FileError::NotAFile(path.to_path_buf())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(FileError::NotFound(path.to_path_buf()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

impl FileProvider for LocalFileProvider {
    fn read_file(&self, path: &Path) -> Result<String> {
        let bytes = self.read_file_bytes(path)?;
        String::from_utf8(bytes).map_err(|_| FileError::NotText(path.to_path_buf()))
    }

    fn read_file_bytes(&self, path: &Path) -> Result<Vec<u8>> {
        Self::check_file(path)?;
        Ok(fs::read(path)?)
    }

    fn write_file(&self, path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        if path.is_dir() {
            return Err(FileError::NotAFile(path.to_path_buf()));
        }
        Ok(fs::write(path, content)?)
    }
}

#[cfg(test)]
#[path = "../../../../../tests/unit/kernel/services/adapters/file/local.rs"]
mod tests;
