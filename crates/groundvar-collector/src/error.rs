//! Error types for collection runs

use std::path::PathBuf;

use groundvar_ast::Address;
use groundvar_storage::StorageError;
use thiserror::Error;

/// The host could not decompile a function. Never fatal to a run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecompileError {
    #[error("decompilation of {entry} failed: {reason}")]
    Failed { entry: Address, reason: String },

    #[error("no function at {0}")]
    UnknownFunction(Address),
}

#[derive(Debug, Error)]
pub enum CollectError {
    #[error("Failed to write artifacts: {0}")]
    Storage(#[from] StorageError),

    #[error("Failed to read dump {}: {source}", .path.display())]
    DumpRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid dump {}: {source}", .path.display())]
    DumpParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Missing environment variable {0}")]
    MissingEnv(&'static str),
}
