//! Library behaviour across encode/decode and merge

use groundvar_types::{
    HostMember, HostType, NominalKind, TypeDescriptor, TypeLibCodec, TypeLibrary,
};

fn int() -> HostType {
    HostType::scalar("int", 4)
}

/// `struct dnode { struct dnode *prev; struct dnode *next; int value; }`
fn dnode() -> HostType {
    let link = || HostType::pointer(HostType::forward(NominalKind::Struct, "dnode", 24), 8);
    HostType::named_struct(
        "dnode",
        24,
        vec![
            HostMember::new("prev", 0, link()),
            HostMember::new("next", 8, link()),
            HostMember::new("value", 16, int()),
        ],
    )
}

/// `union word { int i; float f; }`
fn word() -> HostType {
    HostType::Union {
        name: Some("word".into()),
        size: 4,
        members: vec![
            HostMember::new("i", 0, int()),
            HostMember::new("f", 0, HostType::scalar("float", 4)),
        ],
    }
}

/// `int (*)(const char *, ...)`
fn printf_ptr() -> HostType {
    let fmt = HostType::pointer(HostType::scalar("const char", 1), 8);
    HostType::pointer(
        HostType::Function {
            ret: Box::new(int()),
            params: vec![fmt],
            variadic: true,
        },
        8,
    )
}

fn sample() -> TypeLibrary {
    let mut lib = TypeLibrary::new();
    lib.add(&dnode());
    lib.add(&word());
    lib.add(&printf_ptr());
    lib.add(&HostType::typedef("size_t", HostType::scalar("unsigned __int64", 8)));
    lib.add(&int());
    lib
}

#[test]
fn test_rich_library_survives_roundtrip() {
    let lib = sample();
    let text = TypeLibCodec::encode(&lib).unwrap();
    let back = TypeLibCodec::decode(&text).unwrap();

    assert_eq!(back, lib);
    assert_eq!(TypeLibCodec::encode(&back).unwrap(), text);

    let node = back.lookup_named(NominalKind::Struct, "dnode").unwrap();
    match back.get(node).unwrap() {
        TypeDescriptor::Struct { layout: Some(layout), .. } => assert_eq!(layout.len(), 3),
        other => panic!("expected complete struct, got {:?}", other),
    }
}

#[test]
fn test_decoded_library_keeps_deduplicating() {
    let lib = sample();
    let mut back = TypeLibCodec::decode(&TypeLibCodec::encode(&lib).unwrap()).unwrap();
    let before = back.len();

    let id = back.add(&dnode());
    assert_eq!(back.len(), before);
    assert_eq!(Some(id), back.lookup_named(NominalKind::Struct, "dnode"));
    assert_eq!(back.frequency(id), 2);
}

#[test]
fn test_merge_of_decoded_libraries() {
    let first = sample();

    let mut second = TypeLibrary::new();
    second.add(&int());
    second.add(&HostType::pointer(dnode(), 8));
    second.add(&HostType::array(HostType::scalar("char", 1), 16));

    let first = TypeLibCodec::decode(&TypeLibCodec::encode(&first).unwrap()).unwrap();
    let second = TypeLibCodec::decode(&TypeLibCodec::encode(&second).unwrap()).unwrap();

    let mut merged = first.clone();
    merged.merge(&second);

    // the int and the dnode structure are shared, the char array is new
    let int_id = merged
        .lookup(&TypeDescriptor::Scalar {
            name: "int".into(),
            size: 4,
        })
        .unwrap();
    assert_eq!(merged.frequency(int_id), 2);
    assert!(merged.len() > first.len());
    assert_eq!(merged.with_size(16).count(), 1);

    // merging the same library twice adds no descriptors
    let len = merged.len();
    merged.merge(&second);
    assert_eq!(merged.len(), len);
}
