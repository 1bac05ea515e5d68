//! Text encoding of the type library
//!
//! The library is written as pretty-printed JSON, one object per
//! descriptor in id order, so two encodings of equal libraries are
//! byte-identical and diffs between runs stay readable:
//!
//! ```text
//! {
//!   "format": "groundvar-typelib",
//!   "version": 1,
//!   "types": [
//!     { "id": 0, "frequency": 3, "kind": "scalar", "name": "int", "size": 4 },
//!     { "id": 1, "frequency": 1, "kind": "pointer", "target": 0, "size": 8 }
//!   ]
//! }
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    CorruptLibraryError, NominalKind, TypeDescriptor, TypeEntry, TypeId, TypeLibrary, KIND_TAGS,
};

pub const FORMAT_TAG: &str = "groundvar-typelib";
pub const FORMAT_VERSION: u32 = 1;

#[derive(Serialize)]
struct WireLibrary<'a> {
    format: &'a str,
    version: u32,
    types: Vec<WireEntry<'a>>,
}

#[derive(Serialize)]
struct WireEntry<'a> {
    id: u32,
    frequency: u64,
    #[serde(flatten)]
    descriptor: &'a TypeDescriptor,
}

#[derive(Deserialize)]
struct RawLibrary {
    format: String,
    version: u32,
    types: Vec<Value>,
}

/// Encoder/decoder for the persisted type library
pub struct TypeLibCodec;

impl TypeLibCodec {
    pub fn encode(lib: &TypeLibrary) -> serde_json::Result<String> {
        let wire = WireLibrary {
            format: FORMAT_TAG,
            version: FORMAT_VERSION,
            types: lib
                .iter()
                .map(|(id, entry)| WireEntry {
                    id: id.0,
                    frequency: entry.frequency,
                    descriptor: &entry.descriptor,
                })
                .collect(),
        };
        serde_json::to_string_pretty(&wire)
    }

    /// Parse an encoded library. Never returns a partially decoded library.
    pub fn decode(text: &str) -> Result<TypeLibrary, CorruptLibraryError> {
        let raw: RawLibrary = serde_json::from_str(text)?;
        if raw.format != FORMAT_TAG {
            return Err(CorruptLibraryError::UnexpectedFormat(raw.format));
        }
        if raw.version != FORMAT_VERSION {
            return Err(CorruptLibraryError::UnsupportedVersion {
                found: raw.version,
                expected: FORMAT_VERSION,
            });
        }

        let entries = raw
            .types
            .into_iter()
            .enumerate()
            .map(|(index, value)| decode_entry(index, value))
            .collect::<Result<Vec<_>, _>>()?;
        validate(&entries)?;
        Ok(TypeLibrary::from_entries(entries))
    }
}

fn decode_entry(index: usize, value: Value) -> Result<TypeEntry, CorruptLibraryError> {
    let Value::Object(mut fields) = value else {
        return Err(CorruptLibraryError::MalformedEntry {
            index,
            message: "expected an object".to_string(),
        });
    };

    let id = fields
        .remove("id")
        .and_then(|v| v.as_u64())
        .ok_or(CorruptLibraryError::MissingField { index, field: "id" })?;
    if id != index as u64 {
        return Err(CorruptLibraryError::NonDenseId { index, found: id });
    }
    let frequency = fields
        .remove("frequency")
        .and_then(|v| v.as_u64())
        .ok_or(CorruptLibraryError::MissingField {
            index,
            field: "frequency",
        })?;

    let kind = fields
        .get("kind")
        .and_then(Value::as_str)
        .ok_or(CorruptLibraryError::MissingField {
            index,
            field: "kind",
        })?;
    if !KIND_TAGS.contains(&kind) {
        return Err(CorruptLibraryError::UnknownKind {
            index,
            kind: kind.to_string(),
        });
    }

    let descriptor = serde_json::from_value(Value::Object(fields)).map_err(|e| {
        CorruptLibraryError::MalformedEntry {
            index,
            message: e.to_string(),
        }
    })?;
    Ok(TypeEntry {
        descriptor,
        frequency,
    })
}

/// Check the invariants a library built through `add`/`merge` always holds
fn validate(entries: &[TypeEntry]) -> Result<(), CorruptLibraryError> {
    let mut structural: HashMap<&TypeDescriptor, TypeId> = HashMap::new();
    let mut nominal: HashMap<(NominalKind, &str), TypeId> = HashMap::new();

    for (index, entry) in entries.iter().enumerate() {
        let id = TypeId(index as u32);
        for to in entry.descriptor.references() {
            if to.index() >= entries.len() {
                return Err(CorruptLibraryError::DanglingReference { from: id, to });
            }
        }
        match entry.descriptor.nominal_key() {
            Some((kind, name)) => {
                if nominal.insert((kind, name), id).is_some() {
                    return Err(CorruptLibraryError::DuplicateName {
                        kind,
                        name: name.to_string(),
                    });
                }
            }
            None => {
                if let Some(first) = structural.insert(&entry.descriptor, id) {
                    return Err(CorruptLibraryError::DuplicateDescriptor { first, second: id });
                }
            }
        }
    }

    check_cycles(entries)
}

/// Every reference cycle must pass through a named aggregate; a cycle made
/// only of shape-identified descriptors has no finite shape.
fn check_cycles(entries: &[TypeEntry]) -> Result<(), CorruptLibraryError> {
    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        Unvisited,
        Active,
        Done,
    }

    let structural = |id: TypeId| entries[id.index()].descriptor.nominal_key().is_none();
    let children = |id: TypeId| entries[id.index()].descriptor.references();
    let mut marks = vec![Mark::Unvisited; entries.len()];

    for start in (0..entries.len()).map(|i| TypeId(i as u32)) {
        if marks[start.index()] != Mark::Unvisited || !structural(start) {
            continue;
        }
        marks[start.index()] = Mark::Active;
        let mut stack = vec![(start, children(start))];

        loop {
            let Some(frame) = stack.last_mut() else {
                break;
            };
            let node = frame.0;
            match frame.1.pop() {
                Some(child) if structural(child) => match marks[child.index()] {
                    Mark::Active => return Err(CorruptLibraryError::ReferenceCycle { at: child }),
                    Mark::Unvisited => {
                        marks[child.index()] = Mark::Active;
                        stack.push((child, children(child)));
                    }
                    Mark::Done => {}
                },
                Some(_) => {}
                None => {
                    marks[node.index()] = Mark::Done;
                    stack.pop();
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{HostMember, HostType};

    fn sample_library() -> TypeLibrary {
        let mut lib = TypeLibrary::new();
        lib.add(&HostType::scalar("int", 4));
        lib.add(&HostType::named_struct(
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
        ));
        lib
    }

    fn wrap(types: &str) -> String {
        format!(
            r#"{{"format":"groundvar-typelib","version":1,"types":[{}]}}"#,
            types
        )
    }

    #[test]
    fn test_roundtrip() {
        let lib = sample_library();
        let text = TypeLibCodec::encode(&lib).unwrap();
        let decoded = TypeLibCodec::decode(&text).unwrap();

        assert_eq!(decoded, lib);
        assert_eq!(TypeLibCodec::encode(&decoded).unwrap(), text);
    }

    #[test]
    fn test_decoded_library_keeps_deduplicating() {
        let lib = sample_library();
        let mut decoded = TypeLibCodec::decode(&TypeLibCodec::encode(&lib).unwrap()).unwrap();

        let count = decoded.len();
        decoded.add(&HostType::scalar("int", 4));
        decoded.add(&HostType::forward(NominalKind::Struct, "node", 16));
        assert_eq!(decoded.len(), count);
    }

    #[test]
    fn test_empty_library() {
        let text = TypeLibCodec::encode(&TypeLibrary::new()).unwrap();
        assert!(TypeLibCodec::decode(&text).unwrap().is_empty());
    }

    #[test]
    fn test_rejects_unknown_kind() {
        let text = wrap(r#"{"id":0,"frequency":0,"kind":"bitfield","size":1}"#);
        assert!(matches!(
            TypeLibCodec::decode(&text),
            Err(CorruptLibraryError::UnknownKind { index: 0, .. })
        ));
    }

    #[test]
    fn test_rejects_missing_fields() {
        let text = wrap(r#"{"id":0,"kind":"void"}"#);
        assert!(matches!(
            TypeLibCodec::decode(&text),
            Err(CorruptLibraryError::MissingField {
                field: "frequency",
                ..
            })
        ));

        let text = wrap(r#"{"id":0,"frequency":0,"kind":"scalar","name":"int"}"#);
        assert!(matches!(
            TypeLibCodec::decode(&text),
            Err(CorruptLibraryError::MalformedEntry { index: 0, .. })
        ));

        assert!(matches!(
            TypeLibCodec::decode(r#"{"version":1,"types":[]}"#),
            Err(CorruptLibraryError::Json(_))
        ));
    }

    #[test]
    fn test_rejects_dangling_reference() {
        let text = wrap(r#"{"id":0,"frequency":0,"kind":"pointer","target":7,"size":8}"#);
        assert!(matches!(
            TypeLibCodec::decode(&text),
            Err(CorruptLibraryError::DanglingReference { .. })
        ));
    }

    #[test]
    fn test_rejects_duplicates() {
        let text = wrap(
            r#"{"id":0,"frequency":0,"kind":"void"},{"id":1,"frequency":0,"kind":"void"}"#,
        );
        assert!(matches!(
            TypeLibCodec::decode(&text),
            Err(CorruptLibraryError::DuplicateDescriptor { .. })
        ));

        let text = wrap(
            r#"{"id":0,"frequency":0,"kind":"enum","name":"e","size":4,"variants":[]},
               {"id":1,"frequency":0,"kind":"enum","name":"e","size":8,"variants":[]}"#,
        );
        assert!(matches!(
            TypeLibCodec::decode(&text),
            Err(CorruptLibraryError::DuplicateName { .. })
        ));
    }

    #[test]
    fn test_rejects_anonymous_cycle() {
        let text = wrap(
            r#"{"id":0,"frequency":0,"kind":"pointer","target":1,"size":8},
               {"id":1,"frequency":0,"kind":"pointer","target":0,"size":8}"#,
        );
        assert!(matches!(
            TypeLibCodec::decode(&text),
            Err(CorruptLibraryError::ReferenceCycle { .. })
        ));
    }

    #[test]
    fn test_rejects_ids_out_of_order() {
        let text = wrap(r#"{"id":3,"frequency":0,"kind":"void"}"#);
        assert!(matches!(
            TypeLibCodec::decode(&text),
            Err(CorruptLibraryError::NonDenseId { index: 0, found: 3 })
        ));
    }

    #[test]
    fn test_rejects_other_versions() {
        let text = r#"{"format":"groundvar-typelib","version":2,"types":[]}"#;
        assert!(matches!(
            TypeLibCodec::decode(text),
            Err(CorruptLibraryError::UnsupportedVersion { found: 2, .. })
        ));
        let text = r#"{"format":"something-else","version":1,"types":[]}"#;
        assert!(matches!(
            TypeLibCodec::decode(text),
            Err(CorruptLibraryError::UnexpectedFormat(_))
        ));
    }
}
