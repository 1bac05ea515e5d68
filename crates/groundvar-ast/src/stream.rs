//! The flattened node stream of one function

use serde::{Deserialize, Serialize};

use crate::{Address, AstError, Node, NodeId, NodeOp};

/// All expression nodes of a function, in pre-order.
///
/// Every node's id equals its position and every parent precedes its
/// child, so walking parent links always terminates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Node>", into = "Vec<Node>")]
pub struct NodeStream {
    nodes: Vec<Node>,
}

impl NodeStream {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a stream from host-supplied nodes, checking the ordering invariants
    pub fn from_nodes(nodes: Vec<Node>) -> Result<Self, AstError> {
        for (index, node) in nodes.iter().enumerate() {
            if node.id.index() != index {
                return Err(AstError::MisnumberedNode {
                    index,
                    found: node.id,
                });
            }
            if let Some(parent) = node.parent {
                if parent >= node.id {
                    return Err(AstError::ForwardParent {
                        node: node.id,
                        parent,
                    });
                }
            }
        }
        Ok(Self { nodes })
    }

    /// Append a node, returning its id
    pub fn push(
        &mut self,
        op: NodeOp,
        address: Option<Address>,
        parent: Option<NodeId>,
    ) -> Result<NodeId, AstError> {
        let id = NodeId(self.nodes.len() as u32);
        if let Some(parent) = parent {
            if parent >= id {
                return Err(AstError::ForwardParent { node: id, parent });
            }
        }
        self.nodes.push(Node {
            id,
            op,
            address,
            parent,
        });
        Ok(id)
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    pub fn parent(&self, id: NodeId) -> Option<&Node> {
        self.get(id)?.parent.and_then(|p| self.get(p))
    }

    /// Parent, grandparent, ... of `id`, nearest first
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            stream: self,
            next: self.get(id).and_then(|n| n.parent),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl TryFrom<Vec<Node>> for NodeStream {
    type Error = AstError;

    fn try_from(nodes: Vec<Node>) -> Result<Self, Self::Error> {
        NodeStream::from_nodes(nodes)
    }
}

impl From<NodeStream> for Vec<Node> {
    fn from(stream: NodeStream) -> Self {
        stream.nodes
    }
}

/// Iterator over the predecessor chain of a node
pub struct Ancestors<'a> {
    stream: &'a NodeStream,
    next: Option<NodeId>,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stream.get(self.next?)?;
        self.next = node.parent;
        Some(node)
    }
}
