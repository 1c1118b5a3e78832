//! File persistence port.
//!
//! The workspace only reads and writes whole files; dialogs and directory
//! listings belong to the shell around it.

use std::io;
use std::path::{Path, PathBuf};

pub type Result<T> = std::result::Result<T, FileError>;

#[derive(Debug, thiserror::Error)]
pub enum FileError {
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("not a file: {}", .0.display())]
    NotAFile(PathBuf),
    #[error("not valid UTF-8: {}", .0.display())]
    NotText(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

pub trait FileProvider: Send + Sync {
    fn read_file(&self, path: &Path) -> Result<String>;

    fn read_file_bytes(&self, path: &Path) -> Result<Vec<u8>>;

    fn write_file(&self, path: &Path, content: &str) -> Result<()>;
}
