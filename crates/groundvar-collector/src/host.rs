//! The decompiler seam

use groundvar_ast::{Address, DecompiledFunction};

use crate::DecompileError;

/// A decompiler the collector can drive.
///
/// Implemented by bindings to an interactive disassembler as well as by
/// [`JsonDumpHost`](crate::JsonDumpHost) for dumps exported ahead of time.
pub trait Decompiler {
    /// Entry addresses of every function in the binary, in host order
    fn function_entries(&self) -> Vec<Address>;

    fn decompile(&mut self, entry: Address) -> Result<DecompiledFunction, DecompileError>;
}
