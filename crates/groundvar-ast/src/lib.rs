//! groundvar AST - Decompiled functions as seen by the collector
//!
//! This crate defines the read-only view of a decompiled function:
//! addresses, the flattened expression node stream with parent links,
//! and the function's variables with their declared types and storage.

mod address;
mod error;
mod function;
mod node;
mod stream;

pub use address::Address;
pub use error::AstError;
pub use function::{DecompiledFunction, FrameLocation, LocalVar, StorageLocation};
pub use node::{Node, NodeId, NodeOp};
pub use stream::{Ancestors, NodeStream};
