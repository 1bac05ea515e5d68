//! Reading and writing the collector's artifacts

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use groundvar_fingerprint::FingerprintTable;
use groundvar_types::{TypeLibCodec, TypeLibrary};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::{FunctionLocalsTable, Result, StorageError};

/// Create the parent directory of `path` if it doesn't exist
fn ensure_parent(path: &Path) -> Result<()> {
    if path.as_os_str().is_empty() {
        return Err(StorageError::InvalidPath(path.to_path_buf()));
    }
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

fn write_bincode<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    ensure_parent(path)?;
    let mut writer = BufWriter::new(File::create(path)?);
    bincode::serialize_into(&mut writer, value)?;
    writer.flush()?;
    Ok(())
}

fn read_bincode<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let reader = BufReader::new(File::open(path)?);
    Ok(bincode::deserialize_from(reader)?)
}

pub fn write_function_locals(path: impl AsRef<Path>, table: &FunctionLocalsTable) -> Result<()> {
    let path = path.as_ref();
    write_bincode(path, table)?;
    debug!(
        "wrote {} function entries to {}",
        table.len(),
        path.display()
    );
    Ok(())
}

pub fn read_function_locals(path: impl AsRef<Path>) -> Result<FunctionLocalsTable> {
    read_bincode(path.as_ref())
}

/// Write the fingerprint table (the collected variables)
pub fn write_collected_vars(path: impl AsRef<Path>, table: &FingerprintTable) -> Result<()> {
    let path = path.as_ref();
    write_bincode(path, table)?;
    debug!("wrote {} fingerprints to {}", table.len(), path.display());
    Ok(())
}

pub fn read_collected_vars(path: impl AsRef<Path>) -> Result<FingerprintTable> {
    read_bincode(path.as_ref())
}

/// Write the type library in its text encoding
pub fn write_type_library(path: impl AsRef<Path>, lib: &TypeLibrary) -> Result<()> {
    let path = path.as_ref();
    ensure_parent(path)?;
    let text = TypeLibCodec::encode(lib)?;
    fs::write(path, text)?;
    debug!("wrote {} type descriptors to {}", lib.len(), path.display());
    Ok(())
}

/// Read and decode a type library. Every failure is reported.
pub fn load_type_library(path: impl AsRef<Path>) -> Result<TypeLibrary> {
    let text = fs::read_to_string(path.as_ref())?;
    Ok(TypeLibCodec::decode(&text)?)
}

/// Load the library a run starts from.
///
/// A run always starts, so an unreadable or corrupt library is logged and
/// replaced by an empty one. No path means starting fresh.
pub fn load_type_library_or_empty(path: Option<&Path>) -> TypeLibrary {
    let Some(path) = path else {
        return TypeLibrary::new();
    };
    match load_type_library(path) {
        Ok(lib) => {
            debug!("loaded {} type descriptors from {}", lib.len(), path.display());
            lib
        }
        Err(e) => {
            warn!(
                "could not load type library {}: {}; starting with an empty library",
                path.display(),
                e
            );
            TypeLibrary::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use groundvar_ast::Address;
    use groundvar_types::HostType;
    use tempfile::tempdir;

    #[test]
    fn test_locals_persistence() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/out/fun_locals.bin");

        let mut table = FunctionLocalsTable::new();
        table.record(Address(0x401000), vec!["argc".into(), "argv".into()]);
        write_function_locals(&path, &table).unwrap();

        let back = read_function_locals(&path).unwrap();
        assert_eq!(back, table);
    }

    #[test]
    fn test_type_library_is_text() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("types.json");

        let mut lib = TypeLibrary::new();
        lib.add(&HostType::pointer(HostType::scalar("char", 1), 8));
        write_type_library(&path, &lib).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"groundvar-typelib\""));
        assert_eq!(load_type_library(&path).unwrap(), lib);
    }

    #[test]
    fn test_missing_library_falls_back_to_empty() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope.json");

        assert!(matches!(
            load_type_library(&missing),
            Err(StorageError::Io(_))
        ));
        assert!(load_type_library_or_empty(Some(missing.as_path())).is_empty());
        assert!(load_type_library_or_empty(None).is_empty());
    }

    #[test]
    fn test_corrupt_library_falls_back_to_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("types.json");
        fs::write(&path, "{\"format\": \"something-else\", \"version\": 1, \"types\": []}").unwrap();

        assert!(matches!(
            load_type_library(&path),
            Err(StorageError::CorruptLibrary(_))
        ));
        assert!(load_type_library_or_empty(Some(path.as_path())).is_empty());
    }

    #[test]
    fn test_empty_path_is_rejected() {
        let table = FunctionLocalsTable::new();
        assert!(matches!(
            write_function_locals("", &table),
            Err(StorageError::InvalidPath(_))
        ));
    }
}
