//! Host-native type description
//!
//! This is the shape in which the decompiler hands over a variable's
//! declared type. It is a plain tree: recursion (a struct pointing at
//! itself) is expressed with [`HostType::Named`] forward references.

use serde::{Deserialize, Serialize};

use crate::{EnumVariant, NominalKind};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HostType {
    Void,
    Scalar {
        name: String,
        size: u64,
    },
    Pointer {
        target: Box<HostType>,
        size: u64,
    },
    Array {
        element: Box<HostType>,
        count: u64,
    },
    Struct {
        #[serde(default)]
        name: Option<String>,
        size: u64,
        members: Vec<HostMember>,
    },
    Union {
        #[serde(default)]
        name: Option<String>,
        size: u64,
        members: Vec<HostMember>,
    },
    Enum {
        name: String,
        size: u64,
        variants: Vec<EnumVariant>,
    },
    Typedef {
        name: String,
        target: Box<HostType>,
    },
    Function {
        ret: Box<HostType>,
        #[serde(default)]
        params: Vec<HostType>,
        #[serde(default)]
        variadic: bool,
    },
    /// Reference to a named aggregate by name only
    Named {
        nominal: NominalKind,
        name: String,
        #[serde(default)]
        size: u64,
    },
}

/// A struct or union member. Union members ignore `offset`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostMember {
    pub name: String,
    #[serde(default)]
    pub offset: u64,
    pub ty: HostType,
}

impl HostMember {
    pub fn new(name: impl Into<String>, offset: u64, ty: HostType) -> Self {
        Self {
            name: name.into(),
            offset,
            ty,
        }
    }
}

impl HostType {
    /// Byte size as far as the description itself tells. `None` when it
    /// hinges on a forward reference that carries no size.
    pub fn known_size(&self) -> Option<u64> {
        match self {
            HostType::Void => Some(0),
            HostType::Scalar { size, .. }
            | HostType::Pointer { size, .. }
            | HostType::Struct { size, .. }
            | HostType::Union { size, .. }
            | HostType::Enum { size, .. } => Some(*size),
            HostType::Array { element, count } => {
                element.known_size().map(|s| s.saturating_mul(*count))
            }
            HostType::Typedef { target, .. } => target.known_size(),
            HostType::Named { size, .. } => (*size > 0).then_some(*size),
            HostType::Function { .. } => None,
        }
    }

    pub fn scalar(name: impl Into<String>, size: u64) -> Self {
        HostType::Scalar {
            name: name.into(),
            size,
        }
    }

    pub fn pointer(target: HostType, size: u64) -> Self {
        HostType::Pointer {
            target: Box::new(target),
            size,
        }
    }

    pub fn array(element: HostType, count: u64) -> Self {
        HostType::Array {
            element: Box::new(element),
            count,
        }
    }

    pub fn named_struct(name: impl Into<String>, size: u64, members: Vec<HostMember>) -> Self {
        HostType::Struct {
            name: Some(name.into()),
            size,
            members,
        }
    }

    pub fn forward(nominal: NominalKind, name: impl Into<String>, size: u64) -> Self {
        HostType::Named {
            nominal,
            name: name.into(),
            size,
        }
    }

    pub fn typedef(name: impl Into<String>, target: HostType) -> Self {
        HostType::Typedef {
            name: name.into(),
            target: Box::new(target),
        }
    }
}
