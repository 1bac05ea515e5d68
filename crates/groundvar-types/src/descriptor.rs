//! Canonical type descriptors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Index of a descriptor inside a [`TypeLibrary`](crate::TypeLibrary)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeId(pub u32);

impl TypeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Kind of a named aggregate.
///
/// Named aggregates are identified by kind and name rather than by shape,
/// which is what lets a struct hold a pointer to itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NominalKind {
    Struct,
    Union,
    Enum,
}

impl fmt::Display for NominalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NominalKind::Struct => "struct",
            NominalKind::Union => "union",
            NominalKind::Enum => "enum",
        };
        f.write_str(s)
    }
}

/// A canonical type descriptor
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeDescriptor {
    Void,

    /// Integer, floating point, bool, char and friends: `int`, `unsigned __int64`
    Scalar { name: String, size: u64 },

    Pointer { target: TypeId, size: u64 },

    /// Fixed-size array. Its byte size follows from the element, see
    /// [`TypeLibrary::size_of`](crate::TypeLibrary::size_of).
    Array { element: TypeId, count: u64 },

    /// `layout` is `None` while the struct is only forward-declared
    Struct {
        name: Option<String>,
        size: u64,
        layout: Option<Vec<Member>>,
    },

    /// `members` is `None` while the union is only forward-declared
    Union {
        name: Option<String>,
        size: u64,
        members: Option<Vec<UnionMember>>,
    },

    Enum {
        name: String,
        size: u64,
        variants: Vec<EnumVariant>,
    },

    Typedef { name: String, target: TypeId },

    Function {
        ret: TypeId,
        params: Vec<TypeId>,
        variadic: bool,
    },
}

/// Every `kind` tag the text encoding may carry
pub const KIND_TAGS: [&str; 9] = [
    "void", "scalar", "pointer", "array", "struct", "union", "enum", "typedef", "function",
];

/// One slot of a struct layout, ordered by offset
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "member", rename_all = "snake_case")]
pub enum Member {
    Field { name: String, offset: u64, ty: TypeId },
    /// Bytes not covered by any field
    Padding { offset: u64, size: u64 },
}

impl Member {
    pub fn offset(&self) -> u64 {
        match self {
            Member::Field { offset, .. } | Member::Padding { offset, .. } => *offset,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnionMember {
    pub name: String,
    pub ty: TypeId,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnumVariant {
    pub name: String,
    pub value: i64,
}

impl EnumVariant {
    pub fn new(name: impl Into<String>, value: i64) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

impl TypeDescriptor {
    /// The `kind` tag used by the text encoding
    pub fn kind_tag(&self) -> &'static str {
        match self {
            TypeDescriptor::Void => "void",
            TypeDescriptor::Scalar { .. } => "scalar",
            TypeDescriptor::Pointer { .. } => "pointer",
            TypeDescriptor::Array { .. } => "array",
            TypeDescriptor::Struct { .. } => "struct",
            TypeDescriptor::Union { .. } => "union",
            TypeDescriptor::Enum { .. } => "enum",
            TypeDescriptor::Typedef { .. } => "typedef",
            TypeDescriptor::Function { .. } => "function",
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            TypeDescriptor::Scalar { name, .. }
            | TypeDescriptor::Enum { name, .. }
            | TypeDescriptor::Typedef { name, .. } => Some(name),
            TypeDescriptor::Struct { name, .. } | TypeDescriptor::Union { name, .. } => {
                name.as_deref()
            }
            _ => None,
        }
    }

    /// Identity of a named aggregate, or `None` for descriptors that are
    /// identified by their full shape
    pub fn nominal_key(&self) -> Option<(NominalKind, &str)> {
        match self {
            TypeDescriptor::Struct { name: Some(name), .. } => Some((NominalKind::Struct, name)),
            TypeDescriptor::Union { name: Some(name), .. } => Some((NominalKind::Union, name)),
            TypeDescriptor::Enum { name, .. } => Some((NominalKind::Enum, name)),
            _ => None,
        }
    }

    /// Placeholder for a named aggregate whose body has not been seen yet
    pub fn opaque(kind: NominalKind, name: impl Into<String>, size: u64) -> Self {
        let name = name.into();
        match kind {
            NominalKind::Struct => TypeDescriptor::Struct {
                name: Some(name),
                size,
                layout: None,
            },
            NominalKind::Union => TypeDescriptor::Union {
                name: Some(name),
                size,
                members: None,
            },
            NominalKind::Enum => TypeDescriptor::Enum {
                name,
                size,
                variants: Vec::new(),
            },
        }
    }

    /// Whether this is a forward declaration still waiting for its body
    pub fn is_opaque(&self) -> bool {
        match self {
            TypeDescriptor::Struct { layout, .. } => layout.is_none(),
            TypeDescriptor::Union { members, .. } => members.is_none(),
            TypeDescriptor::Enum { variants, .. } => variants.is_empty(),
            _ => false,
        }
    }

    /// Size carried by the descriptor itself. Typedefs and arrays take
    /// their size from the descriptor they refer to, which only the library
    /// can answer.
    pub fn declared_size(&self) -> Option<u64> {
        match self {
            TypeDescriptor::Void | TypeDescriptor::Function { .. } => Some(0),
            TypeDescriptor::Scalar { size, .. }
            | TypeDescriptor::Pointer { size, .. }
            | TypeDescriptor::Struct { size, .. }
            | TypeDescriptor::Union { size, .. }
            | TypeDescriptor::Enum { size, .. } => Some(*size),
            TypeDescriptor::Typedef { .. } | TypeDescriptor::Array { .. } => None,
        }
    }

    /// Every descriptor this one refers to, in declaration order
    pub fn references(&self) -> Vec<TypeId> {
        match self {
            TypeDescriptor::Void | TypeDescriptor::Scalar { .. } | TypeDescriptor::Enum { .. } => {
                Vec::new()
            }
            TypeDescriptor::Pointer { target, .. } | TypeDescriptor::Typedef { target, .. } => {
                vec![*target]
            }
            TypeDescriptor::Array { element, .. } => vec![*element],
            TypeDescriptor::Struct { layout, .. } => layout
                .iter()
                .flatten()
                .filter_map(|m| match m {
                    Member::Field { ty, .. } => Some(*ty),
                    Member::Padding { .. } => None,
                })
                .collect(),
            TypeDescriptor::Union { members, .. } => {
                members.iter().flatten().map(|m| m.ty).collect()
            }
            TypeDescriptor::Function { ret, params, .. } => {
                std::iter::once(*ret).chain(params.iter().copied()).collect()
            }
        }
    }

    /// Rebuild the descriptor with every reference passed through `f`
    pub fn map_refs(&self, mut f: impl FnMut(TypeId) -> TypeId) -> TypeDescriptor {
        match self {
            TypeDescriptor::Void | TypeDescriptor::Scalar { .. } | TypeDescriptor::Enum { .. } => {
                self.clone()
            }
            TypeDescriptor::Pointer { target, size } => TypeDescriptor::Pointer {
                target: f(*target),
                size: *size,
            },
            TypeDescriptor::Array { element, count } => TypeDescriptor::Array {
                element: f(*element),
                count: *count,
            },
            TypeDescriptor::Struct { name, size, layout } => TypeDescriptor::Struct {
                name: name.clone(),
                size: *size,
                layout: layout.as_ref().map(|members| {
                    members
                        .iter()
                        .map(|m| match m {
                            Member::Field { name, offset, ty } => Member::Field {
                                name: name.clone(),
                                offset: *offset,
                                ty: f(*ty),
                            },
                            Member::Padding { .. } => m.clone(),
                        })
                        .collect()
                }),
            },
            TypeDescriptor::Union {
                name,
                size,
                members,
            } => TypeDescriptor::Union {
                name: name.clone(),
                size: *size,
                members: members.as_ref().map(|members| {
                    members
                        .iter()
                        .map(|m| UnionMember {
                            name: m.name.clone(),
                            ty: f(m.ty),
                        })
                        .collect()
                }),
            },
            TypeDescriptor::Typedef { name, target } => TypeDescriptor::Typedef {
                name: name.clone(),
                target: f(*target),
            },
            TypeDescriptor::Function {
                ret,
                params,
                variadic,
            } => TypeDescriptor::Function {
                ret: f(*ret),
                params: params.iter().map(|p| f(*p)).collect(),
                variadic: *variadic,
            },
        }
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeDescriptor::Void => write!(f, "void"),
            TypeDescriptor::Scalar { name, size } => write!(f, "{} ({} bytes)", name, size),
            TypeDescriptor::Pointer { target, .. } => write!(f, "{} *", target),
            TypeDescriptor::Array { element, count } => write!(f, "{}[{}]", element, count),
            TypeDescriptor::Struct { name, size, layout } => {
                write!(f, "struct {}", name.as_deref().unwrap_or("<anonymous>"))?;
                match layout {
                    Some(layout) => write!(f, " ({} bytes, {} members)", size, layout.len()),
                    None => write!(f, " (opaque)"),
                }
            }
            TypeDescriptor::Union {
                name,
                size,
                members,
            } => {
                write!(f, "union {}", name.as_deref().unwrap_or("<anonymous>"))?;
                match members {
                    Some(members) => write!(f, " ({} bytes, {} members)", size, members.len()),
                    None => write!(f, " (opaque)"),
                }
            }
            TypeDescriptor::Enum { name, variants, .. } => {
                write!(f, "enum {} ({} variants)", name, variants.len())
            }
            TypeDescriptor::Typedef { name, target } => write!(f, "typedef {} = {}", name, target),
            TypeDescriptor::Function {
                ret,
                params,
                variadic,
            } => {
                write!(f, "{} (", ret)?;
                for (i, p) in params.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", p)?;
                }
                if *variadic {
                    write!(f, "{}...", if params.is_empty() { "" } else { ", " })?;
                }
                write!(f, ")")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_aggregates_are_nominal() {
        let named = TypeDescriptor::opaque(NominalKind::Struct, "node", 16);
        assert_eq!(named.nominal_key(), Some((NominalKind::Struct, "node")));
        assert!(named.is_opaque());

        let anonymous = TypeDescriptor::Struct {
            name: None,
            size: 4,
            layout: Some(vec![]),
        };
        assert_eq!(anonymous.nominal_key(), None);
        assert!(!anonymous.is_opaque());
    }

    #[test]
    fn test_references_skip_padding() {
        let desc = TypeDescriptor::Struct {
            name: Some("pair".into()),
            size: 16,
            layout: Some(vec![
                Member::Field {
                    name: "a".into(),
                    offset: 0,
                    ty: TypeId(1),
                },
                Member::Padding { offset: 4, size: 4 },
                Member::Field {
                    name: "b".into(),
                    offset: 8,
                    ty: TypeId(2),
                },
            ]),
        };
        assert_eq!(desc.references(), vec![TypeId(1), TypeId(2)]);

        let shifted = desc.map_refs(|id| TypeId(id.0 + 10));
        assert_eq!(shifted.references(), vec![TypeId(11), TypeId(12)]);
    }

    #[test]
    fn test_function_display() {
        let desc = TypeDescriptor::Function {
            ret: TypeId(0),
            params: vec![TypeId(1), TypeId(2)],
            variadic: true,
        };
        assert_eq!(desc.to_string(), "#0 (#1, #2, ...)");
    }
}
