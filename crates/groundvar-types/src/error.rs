//! Error types for decoding a persisted type library

use thiserror::Error;

use crate::{NominalKind, TypeId};

#[derive(Debug, Error)]
pub enum CorruptLibraryError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("not a type library (format tag {0:?})")]
    UnexpectedFormat(String),

    #[error("unsupported type library version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    #[error("entry {index}: missing or invalid field `{field}`")]
    MissingField { index: usize, field: &'static str },

    #[error("entry {index}: unknown type kind `{kind}`")]
    UnknownKind { index: usize, kind: String },

    #[error("entry {index}: {message}")]
    MalformedEntry { index: usize, message: String },

    #[error("entry {index} carries id {found}")]
    NonDenseId { index: usize, found: u64 },

    #[error("{from} references missing type {to}")]
    DanglingReference { from: TypeId, to: TypeId },

    #[error("{second} duplicates {first}")]
    DuplicateDescriptor { first: TypeId, second: TypeId },

    #[error("{kind} `{name}` is defined more than once")]
    DuplicateName { kind: NominalKind, name: String },

    #[error("reference cycle through {at} does not pass through a named aggregate")]
    ReferenceCycle { at: TypeId },
}
