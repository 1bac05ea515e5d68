//! Fingerprints across whole functions, from host JSON to the table

use groundvar_ast::{Address, DecompiledFunction};
use groundvar_fingerprint::{fingerprint_function, FingerprintTable, SENTINEL};

fn parse(json: &str) -> DecompiledFunction {
    serde_json::from_str(json).expect("valid function JSON")
}

#[test]
fn test_shared_addresses_collapse_to_sentinel() {
    // `count` and `total` both live in the same register and are only
    // touched by the same two instructions.
    let func = parse(
        r#"{
            "entry": 4096,
            "name": "accumulate",
            "variables": [
                {"name": "count", "has_user_name": true},
                {"name": "total", "has_user_name": true}
            ],
            "nodes": [
                {"id": 0, "op": "var", "name": "count", "address": 16},
                {"id": 1, "op": "var", "name": "total", "address": 16},
                {"id": 2, "op": "var", "name": "count", "address": 20},
                {"id": 3, "op": "var", "name": "total", "address": 20}
            ]
        }"#,
    );

    let mut table = FingerprintTable::new();
    let collided = table.record_function(func.entry, fingerprint_function(&func));
    assert_eq!(collided, 1);
    assert_eq!(table.len(), 1);

    let (fingerprint, identity) = table.iter().next().unwrap();
    assert_eq!(fingerprint.as_slice(), &[Address(0x10), Address(0x14)]);
    assert_eq!(identity.to_string(), SENTINEL);
}

#[test]
fn test_address_inherited_from_enclosing_call() {
    let func = parse(
        r#"{
            "entry": 4096,
            "variables": [{"name": "buf", "has_user_name": true}],
            "nodes": [
                {"id": 0, "op": "opaque", "code": 57, "address": 64},
                {"id": 1, "op": "opaque", "code": 12, "parent": 0},
                {"id": 2, "op": "var", "name": "buf", "parent": 1}
            ]
        }"#,
    );

    let prints = fingerprint_function(&func);
    assert_eq!(prints["buf"].as_slice(), &[Address(0x40)]);
}

#[test]
fn test_generated_names_never_enter_table() {
    let func = parse(
        r#"{
            "entry": 8192,
            "variables": [
                {"name": "v1"},
                {"name": "len", "has_user_name": true}
            ],
            "nodes": [
                {"id": 0, "op": "var", "name": "v1", "address": 8200},
                {"id": 1, "op": "var", "name": "len", "address": 8204}
            ]
        }"#,
    );

    let mut table = FingerprintTable::new();
    table.record_function(func.entry, fingerprint_function(&func));
    let names: Vec<String> = table.iter().map(|(_, id)| id.to_string()).collect();
    assert_eq!(names, vec!["len"]);
}
