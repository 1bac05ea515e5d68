//! groundvar - Ground truth for decompiled variable names and types
//!
//! This is the root workspace crate that provides end-to-end tests.
//! The implementation lives in the workspace member crates.

// Re-export member crates for convenience
pub use groundvar_ast as ast;
pub use groundvar_collector as collector;
pub use groundvar_fingerprint as fingerprint;
pub use groundvar_storage as storage;
pub use groundvar_types as types;
