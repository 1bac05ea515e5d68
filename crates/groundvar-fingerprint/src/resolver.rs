//! Address resolution for nodes without an address of their own

use groundvar_ast::{Address, NodeId, NodeStream};

/// Address of `id`, or of its nearest ancestor that has one.
///
/// Walks the parent chain; use [`AddressResolver`] when resolving many
/// nodes of the same stream.
pub fn resolve_address(stream: &NodeStream, id: NodeId) -> Option<Address> {
    let node = stream.get(id)?;
    node.address
        .or_else(|| stream.ancestors(id).find_map(|n| n.address))
}

/// Resolved addresses for every node of a stream.
///
/// Parents precede their children, so one forward pass settles every node:
/// a node without an address inherits whatever its parent resolved to.
pub struct AddressResolver {
    resolved: Vec<Option<Address>>,
}

impl AddressResolver {
    pub fn new(stream: &NodeStream) -> Self {
        let mut resolved: Vec<Option<Address>> = Vec::with_capacity(stream.len());
        for node in stream.iter() {
            let inherited = node.parent.and_then(|p| resolved.get(p.index()).copied().flatten());
            resolved.push(node.address.or(inherited));
        }
        Self { resolved }
    }

    pub fn resolve(&self, id: NodeId) -> Option<Address> {
        self.resolved.get(id.index()).copied().flatten()
    }
}
