//! The deduplicated type library

use std::collections::{HashMap, HashSet};
use std::fmt;

use tracing::debug;

use crate::{
    HostMember, HostType, Member, NominalKind, TypeDescriptor, TypeId, UnionMember,
};

/// A descriptor together with how often it was declared as a variable type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeEntry {
    pub descriptor: TypeDescriptor,
    pub frequency: u64,
}

/// Deduplicated store of type descriptors.
///
/// Descriptors are only ever added or completed, never removed, so a
/// [`TypeId`] handed out once stays valid for the lifetime of the library
/// and across an encode/decode round trip.
#[derive(Debug, Clone, Default)]
pub struct TypeLibrary {
    entries: Vec<TypeEntry>,
    /// Shape-identified descriptors
    structural: HashMap<TypeDescriptor, TypeId>,
    /// Named aggregates
    nominal: HashMap<(NominalKind, String), TypeId>,
}

impl PartialEq for TypeLibrary {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl Eq for TypeLibrary {}

impl TypeLibrary {
    /// Create a new empty library
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: TypeId) -> Option<&TypeDescriptor> {
        self.entries.get(id.index()).map(|e| &e.descriptor)
    }

    /// Number of times `id` was recorded as a declared variable type
    pub fn frequency(&self, id: TypeId) -> u64 {
        self.entries.get(id.index()).map_or(0, |e| e.frequency)
    }

    pub fn iter(&self) -> impl Iterator<Item = (TypeId, &TypeEntry)> {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, e)| (TypeId(i as u32), e))
    }

    /// Find an existing descriptor with exactly this shape
    pub fn lookup(&self, descriptor: &TypeDescriptor) -> Option<TypeId> {
        match descriptor.nominal_key() {
            Some((kind, name)) => self
                .lookup_named(kind, name)
                .filter(|id| self.entries[id.index()].descriptor == *descriptor),
            None => self.structural.get(descriptor).copied(),
        }
    }

    /// Find a named aggregate, complete or not
    pub fn lookup_named(&self, kind: NominalKind, name: &str) -> Option<TypeId> {
        self.nominal.get(&(kind, name.to_string())).copied()
    }

    /// Size in bytes of a descriptor.
    ///
    /// Typedefs are followed to their target and arrays multiply their
    /// element's size, so the answer tracks forward declarations that have
    /// since been completed. Opaque aggregates report their declared size.
    pub fn size_of(&self, id: TypeId) -> u64 {
        let mut current = id;
        let mut count = 1u64;
        // typedef and array chains are acyclic, so this terminates
        for _ in 0..=self.entries.len() {
            match self.get(current) {
                Some(TypeDescriptor::Typedef { target, .. }) => current = *target,
                Some(TypeDescriptor::Array { element, count: n }) => {
                    count = count.saturating_mul(*n);
                    current = *element;
                }
                Some(desc) => return desc.declared_size().unwrap_or(0).saturating_mul(count),
                None => return 0,
            }
        }
        0
    }

    /// All descriptors occupying exactly `size` bytes
    pub fn with_size(&self, size: u64) -> impl Iterator<Item = (TypeId, &TypeDescriptor)> + '_ {
        self.iter()
            .filter(move |(id, _)| self.size_of(*id) == size)
            .map(|(id, e)| (id, &e.descriptor))
    }

    /// Record a variable's declared type.
    ///
    /// Nested types are inserted as needed. Adding a shape that is already
    /// known returns the existing id and only bumps its frequency.
    pub fn add(&mut self, ty: &HostType) -> TypeId {
        let mut in_progress = HashSet::new();
        let id = self.intern_host(ty, &mut in_progress);
        self.entries[id.index()].frequency += 1;
        id
    }

    /// Fold another library into this one, summing frequencies
    pub fn merge(&mut self, other: &TypeLibrary) {
        let mut remap = vec![None; other.len()];
        for index in 0..other.len() {
            self.import(other, TypeId(index as u32), &mut remap);
        }
        for (index, entry) in other.entries.iter().enumerate() {
            if let Some(local) = remap[index] {
                self.entries[local.index()].frequency += entry.frequency;
            }
        }
    }

    /// Rebuild a library from already validated entries
    pub(crate) fn from_entries(entries: Vec<TypeEntry>) -> Self {
        let mut lib = TypeLibrary::new();
        for (index, entry) in entries.iter().enumerate() {
            let id = TypeId(index as u32);
            match entry.descriptor.nominal_key() {
                Some((kind, name)) => {
                    lib.nominal.insert((kind, name.to_string()), id);
                }
                None => {
                    lib.structural.insert(entry.descriptor.clone(), id);
                }
            }
        }
        lib.entries = entries;
        lib
    }

    fn push(&mut self, descriptor: TypeDescriptor) -> TypeId {
        let id = TypeId(self.entries.len() as u32);
        self.entries.push(TypeEntry {
            descriptor,
            frequency: 0,
        });
        id
    }

    /// Insert a shape-identified descriptor unless it already exists
    fn intern(&mut self, descriptor: TypeDescriptor) -> TypeId {
        if let Some(id) = self.structural.get(&descriptor) {
            return *id;
        }
        let id = self.push(descriptor.clone());
        self.structural.insert(descriptor, id);
        id
    }

    /// Reserve (or find) the slot of a named aggregate
    fn declare(&mut self, kind: NominalKind, name: &str, size: u64) -> TypeId {
        if let Some(id) = self.lookup_named(kind, name) {
            return id;
        }
        let id = self.push(TypeDescriptor::opaque(kind, name, size));
        self.nominal.insert((kind, name.to_string()), id);
        id
    }

    fn intern_host(&mut self, ty: &HostType, in_progress: &mut HashSet<TypeId>) -> TypeId {
        match ty {
            HostType::Void => self.intern(TypeDescriptor::Void),
            HostType::Scalar { name, size } => self.intern(TypeDescriptor::Scalar {
                name: name.clone(),
                size: *size,
            }),
            HostType::Pointer { target, size } => {
                let target = self.intern_host(target, in_progress);
                self.intern(TypeDescriptor::Pointer {
                    target,
                    size: *size,
                })
            }
            HostType::Array { element, count } => {
                let element = self.intern_host(element, in_progress);
                self.intern(TypeDescriptor::Array {
                    element,
                    count: *count,
                })
            }
            HostType::Typedef { name, target } => {
                let target = self.intern_host(target, in_progress);
                self.intern(TypeDescriptor::Typedef {
                    name: name.clone(),
                    target,
                })
            }
            HostType::Function {
                ret,
                params,
                variadic,
            } => {
                let ret = self.intern_host(ret, in_progress);
                let params = params
                    .iter()
                    .map(|p| self.intern_host(p, in_progress))
                    .collect();
                self.intern(TypeDescriptor::Function {
                    ret,
                    params,
                    variadic: *variadic,
                })
            }
            HostType::Struct {
                name: None,
                size,
                members,
            } => {
                let layout = self.struct_layout(*size, members, in_progress);
                self.intern(TypeDescriptor::Struct {
                    name: None,
                    size: *size,
                    layout: Some(layout),
                })
            }
            HostType::Union {
                name: None,
                size,
                members,
            } => {
                let members = self.union_members(members, in_progress);
                self.intern(TypeDescriptor::Union {
                    name: None,
                    size: *size,
                    members: Some(members),
                })
            }
            HostType::Struct {
                name: Some(name),
                size,
                members,
            } => self.define(ty, NominalKind::Struct, name, *size, in_progress, |lib, pending| {
                TypeDescriptor::Struct {
                    name: Some(name.clone()),
                    size: *size,
                    layout: Some(lib.struct_layout(*size, members, pending)),
                }
            }),
            HostType::Union {
                name: Some(name),
                size,
                members,
            } => self.define(ty, NominalKind::Union, name, *size, in_progress, |lib, pending| {
                TypeDescriptor::Union {
                    name: Some(name.clone()),
                    size: *size,
                    members: Some(lib.union_members(members, pending)),
                }
            }),
            HostType::Enum {
                name,
                size,
                variants,
            } => self.define(ty, NominalKind::Enum, name, *size, in_progress, |_, _| {
                TypeDescriptor::Enum {
                    name: name.clone(),
                    size: *size,
                    variants: variants.clone(),
                }
            }),
            HostType::Named {
                nominal,
                name,
                size,
            } => self.declare(*nominal, name, *size),
        }
    }

    /// Complete a named aggregate, reserving its slot first so that
    /// members referring back to it resolve to the same id
    fn define(
        &mut self,
        ty: &HostType,
        kind: NominalKind,
        name: &str,
        size: u64,
        in_progress: &mut HashSet<TypeId>,
        body: impl FnOnce(&mut Self, &mut HashSet<TypeId>) -> TypeDescriptor,
    ) -> TypeId {
        let id = self.declare(kind, name, size);
        if in_progress.contains(&id) {
            return id;
        }
        let existing = &self.entries[id.index()].descriptor;
        if !existing.is_opaque() {
            if !same_definition(existing, ty) {
                debug!(
                    "{} {} already defined with {:?} bytes, ignoring a different {}-byte definition",
                    kind,
                    name,
                    existing.declared_size(),
                    size
                );
            }
            return id;
        }

        in_progress.insert(id);
        let complete = body(self, in_progress);
        in_progress.remove(&id);
        self.entries[id.index()].descriptor = complete;
        id
    }

    /// Order members by offset and make gaps explicit.
    ///
    /// Gaps are measured with the sizes the host description carries, never
    /// with what the library currently knows, so the same host type always
    /// yields the same layout. When a member's size is unknown (a forward
    /// reference without a size) no padding is emitted at all.
    fn struct_layout(
        &mut self,
        size: u64,
        members: &[HostMember],
        in_progress: &mut HashSet<TypeId>,
    ) -> Vec<Member> {
        let mut sorted: Vec<&HostMember> = members.iter().collect();
        sorted.sort_by_key(|m| m.offset);
        let sizes: Option<Vec<u64>> = sorted.iter().map(|m| m.ty.known_size()).collect();

        let mut layout = Vec::with_capacity(sorted.len());
        let mut cursor = 0u64;
        for (index, member) in sorted.into_iter().enumerate() {
            let known = sizes.as_ref().map(|sizes| sizes[index]);
            if known.is_some() && member.offset > cursor {
                layout.push(Member::Padding {
                    offset: cursor,
                    size: member.offset - cursor,
                });
            }
            let ty = self.intern_host(&member.ty, in_progress);
            layout.push(Member::Field {
                name: member.name.clone(),
                offset: member.offset,
                ty,
            });
            if let Some(member_size) = known {
                cursor = cursor.max(member.offset.saturating_add(member_size));
            }
        }
        if sizes.is_some() && size > cursor {
            layout.push(Member::Padding {
                offset: cursor,
                size: size - cursor,
            });
        }
        layout
    }

    fn union_members(
        &mut self,
        members: &[HostMember],
        in_progress: &mut HashSet<TypeId>,
    ) -> Vec<UnionMember> {
        members
            .iter()
            .map(|m| UnionMember {
                name: m.name.clone(),
                ty: self.intern_host(&m.ty, in_progress),
            })
            .collect()
    }

    /// Copy `id` (and everything it references) from `other`, memoized in `remap`
    fn import(&mut self, other: &TypeLibrary, id: TypeId, remap: &mut [Option<TypeId>]) -> TypeId {
        if let Some(local) = remap[id.index()] {
            return local;
        }
        let descriptor = &other.entries[id.index()].descriptor;

        if let Some((kind, name)) = descriptor.nominal_key() {
            let size = descriptor.declared_size().unwrap_or(0);
            let local = self.declare(kind, name, size);
            remap[id.index()] = Some(local);
            if !descriptor.is_opaque() && self.entries[local.index()].descriptor.is_opaque() {
                let complete = descriptor.map_refs(|child| self.import(other, child, remap));
                self.entries[local.index()].descriptor = complete;
            }
            return local;
        }

        let mapped = descriptor.map_refs(|child| self.import(other, child, remap));
        let local = self.intern(mapped);
        remap[id.index()] = Some(local);
        local
    }
}

/// Whether a host definition describes the same aggregate as a complete
/// descriptor: same size and the same member names at the same offsets
fn same_definition(existing: &TypeDescriptor, ty: &HostType) -> bool {
    match (existing, ty) {
        (
            TypeDescriptor::Struct {
                size,
                layout: Some(layout),
                ..
            },
            HostType::Struct {
                size: host_size,
                members,
                ..
            },
        ) => {
            let fields: Vec<(&str, u64)> = layout
                .iter()
                .filter_map(|m| match m {
                    Member::Field { name, offset, .. } => Some((name.as_str(), *offset)),
                    Member::Padding { .. } => None,
                })
                .collect();
            let mut host: Vec<(&str, u64)> =
                members.iter().map(|m| (m.name.as_str(), m.offset)).collect();
            host.sort_by_key(|&(_, offset)| offset);
            size == host_size && fields == host
        }
        (
            TypeDescriptor::Union {
                size,
                members: Some(known),
                ..
            },
            HostType::Union {
                size: host_size,
                members,
                ..
            },
        ) => {
            size == host_size
                && known.len() == members.len()
                && known.iter().zip(members).all(|(k, m)| k.name == m.name)
        }
        (
            TypeDescriptor::Enum { size, variants, .. },
            HostType::Enum {
                size: host_size,
                variants: host_variants,
                ..
            },
        ) => size == host_size && variants == host_variants,
        _ => false,
    }
}

impl fmt::Display for TypeLibrary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let opaque = self
            .entries
            .iter()
            .filter(|e| e.descriptor.is_opaque())
            .count();
        writeln!(
            f,
            "Type library: {} descriptors ({} named aggregates, {} opaque)",
            self.entries.len(),
            self.nominal.len(),
            opaque
        )?;
        for (id, entry) in self.iter() {
            writeln!(f, "  {:>5} x{:<6} {}", id, entry.frequency, entry.descriptor)?;
        }
        Ok(())
    }
}
