//! Error types for node stream construction

use thiserror::Error;

use crate::NodeId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AstError {
    #[error("node at position {index} carries id {found}")]
    MisnumberedNode { index: usize, found: NodeId },

    /// Parents are emitted before their children; anything else could loop
    #[error("node {node} names parent {parent}, which does not precede it")]
    ForwardParent { node: NodeId, parent: NodeId },
}
