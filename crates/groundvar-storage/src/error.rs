//! Error types for artifact persistence

use std::io;
use std::path::PathBuf;

use groundvar_types::CorruptLibraryError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, StorageError>;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Corrupt type library: {0}")]
    CorruptLibrary(#[from] CorruptLibraryError),

    #[error("Invalid file path: {}", .0.display())]
    InvalidPath(PathBuf),
}
