//! Artifacts written by one run and read back by the next

use groundvar_ast::Address;
use groundvar_fingerprint::{Fingerprint, FingerprintTable, SENTINEL};
use groundvar_storage::{
    load_type_library_or_empty, read_collected_vars, write_collected_vars, write_type_library,
};
use groundvar_types::{HostMember, HostType, NominalKind, TypeLibrary};
use tempfile::tempdir;

fn fp(addresses: &[u64]) -> Fingerprint {
    addresses.iter().copied().map(Address).collect()
}

#[test]
fn test_collected_vars_keep_ambiguity() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("collected_vars.bin");

    let mut table = FingerprintTable::new();
    table.insert(fp(&[0x10, 0x14]), "count");
    table.insert(fp(&[0x10, 0x14]), "total");
    table.insert(fp(&[0x20]), "buf");
    write_collected_vars(&path, &table).unwrap();

    let back = read_collected_vars(&path).unwrap();
    assert_eq!(back.len(), 2);
    assert_eq!(back.lookup(&fp(&[0x10, 0x14])).unwrap().to_string(), SENTINEL);
    assert_eq!(back.lookup(&fp(&[0x20])).unwrap().name(), Some("buf"));
}

#[test]
fn test_library_accumulates_across_runs() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("type_lib.json");
    let node = HostType::named_struct(
        "node",
        16,
        vec![
            HostMember::new("value", 0, HostType::scalar("int", 4)),
            HostMember::new(
                "next",
                8,
                HostType::pointer(HostType::forward(NominalKind::Struct, "node", 16), 8),
            ),
        ],
    );

    // first run: nothing on disk yet
    let mut lib = load_type_library_or_empty(Some(path.as_path()));
    assert!(lib.is_empty());
    lib.add(&node);
    write_type_library(&path, &lib).unwrap();
    let after_first = lib.len();

    // second run continues from the first run's output
    let mut lib: TypeLibrary = load_type_library_or_empty(Some(path.as_path()));
    assert_eq!(lib.len(), after_first);
    let id = lib.add(&node);
    assert_eq!(lib.len(), after_first);
    assert_eq!(lib.frequency(id), 2);
}
