//! Expression nodes

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::Address;

/// Position of a node in its function's node stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// Operator of a node.
///
/// Only variable references matter to the collector; every other host
/// operator is carried as an opaque code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum NodeOp {
    /// Reference to a local variable or argument
    Var { name: String },
    Opaque { code: u16 },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    #[serde(flatten)]
    pub op: NodeOp,
    #[serde(default, deserialize_with = "Address::deserialize_optional")]
    pub address: Option<Address>,
    #[serde(default)]
    pub parent: Option<NodeId>,
}

impl Node {
    pub fn var(
        id: NodeId,
        name: impl Into<String>,
        address: Option<Address>,
        parent: Option<NodeId>,
    ) -> Self {
        Self {
            id,
            op: NodeOp::Var { name: name.into() },
            address,
            parent,
        }
    }

    pub fn opaque(id: NodeId, code: u16, address: Option<Address>, parent: Option<NodeId>) -> Self {
        Self {
            id,
            op: NodeOp::Opaque { code },
            address,
            parent,
        }
    }

    /// Name of the referenced variable, if this is a variable reference
    pub fn var_name(&self) -> Option<&str> {
        match &self.op {
            NodeOp::Var { name } => Some(name),
            NodeOp::Opaque { .. } => None,
        }
    }
}
