//! groundvar Types - Deduplicated type library
//!
//! Collects the declared types of human-named variables across many
//! functions and binaries:
//! - [`HostType`]: the decompiler's description of a type, as handed over
//! - [`TypeDescriptor`]: the canonical, interned form stored in the library
//! - [`TypeLibrary`]: additive, deduplicating store with merge support
//! - [`TypeLibCodec`]: stable text encoding for persisting the library
//!   between runs

mod codec;
mod descriptor;
mod error;
mod host;
mod library;

pub use codec::{TypeLibCodec, FORMAT_TAG, FORMAT_VERSION};
pub use descriptor::{
    EnumVariant, Member, NominalKind, TypeDescriptor, TypeId, UnionMember, KIND_TAGS,
};
pub use error::CorruptLibraryError;
pub use host::{HostMember, HostType};
pub use library::{TypeEntry, TypeLibrary};
