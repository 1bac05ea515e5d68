//! groundvar Fingerprint - Identifying variables by where they are used
//!
//! A variable's fingerprint is the set of instruction addresses at which
//! the decompiled code references it. The fingerprint of a human-named
//! variable in one decompilation can be matched against the fingerprint of
//! a generated variable in another, which recovers the original name.
//!
//! - [`resolve_address`] / [`AddressResolver`]: addresses for nodes that
//!   have none of their own, taken from the nearest ancestor
//! - [`build_fingerprints`]: per-variable address sets of one function
//! - [`FingerprintTable`]: run-wide mapping with collision tracking
//!
//! # Example
//!
//! ```
//! use groundvar_ast::{Address, NodeOp, NodeStream};
//! use groundvar_fingerprint::{build_fingerprints, FingerprintTable};
//!
//! let mut stream = NodeStream::new();
//! stream
//!     .push(NodeOp::Var { name: "count".into() }, Some(Address(0x10)), None)
//!     .unwrap();
//!
//! let mut table = FingerprintTable::new();
//! for (name, fingerprint) in build_fingerprints(&stream, ["count"]) {
//!     table.insert(fingerprint, &name);
//! }
//! assert_eq!(table.len(), 1);
//! ```

mod builder;
mod fingerprint;
mod resolver;
mod table;

pub use builder::{build_fingerprints, fingerprint_function};
pub use fingerprint::Fingerprint;
pub use resolver::{resolve_address, AddressResolver};
pub use table::{FingerprintTable, InsertOutcome, VarIdentity, SENTINEL};
