//! groundvar Storage - Artifacts of a collection run
//!
//! A run produces up to three artifacts:
//! - the Function Locals Table (bincode): function entry to the names of
//!   its human-named variables
//! - the type library (versioned JSON text, see `groundvar-types`)
//! - optionally the collected variables, i.e. the fingerprint table
//!   (bincode)
//!
//! Writers create missing parent directories. Loading the input type
//! library at startup never fails: see [`load_type_library_or_empty`].

mod error;
mod locals;
mod persist;

pub use error::{Result, StorageError};
pub use locals::FunctionLocalsTable;
pub use persist::{
    load_type_library, load_type_library_or_empty, read_collected_vars, read_function_locals,
    write_collected_vars, write_function_locals, write_type_library,
};
