//! Per-function fingerprint construction

use std::collections::{BTreeMap, HashMap, HashSet};

use groundvar_ast::{DecompiledFunction, NodeStream};

use crate::{AddressResolver, Fingerprint};

/// Collect, for every user-named variable, the addresses it is referenced at.
///
/// References whose address cannot be resolved are dropped. Variables
/// without a single resolved reference do not appear in the result.
pub fn build_fingerprints<'a>(
    stream: &NodeStream,
    user_named: impl IntoIterator<Item = &'a str>,
) -> BTreeMap<String, Fingerprint> {
    let user_named: HashSet<&str> = user_named.into_iter().collect();
    let resolver = AddressResolver::new(stream);

    let mut by_name: HashMap<&str, Fingerprint> = HashMap::new();
    for node in stream.iter() {
        let Some(name) = node.var_name() else {
            continue;
        };
        if !user_named.contains(name) {
            continue;
        }
        if let Some(address) = resolver.resolve(node.id) {
            by_name.entry(name).or_default().insert(address);
        }
    }

    by_name
        .into_iter()
        .map(|(name, fingerprint)| (name.to_string(), fingerprint))
        .collect()
}

/// Fingerprints of a function's human-named variables
pub fn fingerprint_function(func: &DecompiledFunction) -> BTreeMap<String, Fingerprint> {
    build_fingerprints(&func.nodes, func.user_named().map(|v| v.name.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use groundvar_ast::{Address, LocalVar, NodeOp};

    fn var(name: &str) -> NodeOp {
        NodeOp::Var { name: name.into() }
    }

    #[test]
    fn test_collects_resolved_addresses() {
        let mut stream = NodeStream::new();
        let call = stream
            .push(NodeOp::Opaque { code: 57 }, Some(Address(0x40)), None)
            .unwrap();
        stream.push(var("count"), Some(Address(0x10)), None).unwrap();
        stream.push(var("count"), None, Some(call)).unwrap();
        stream.push(var("count"), Some(Address(0x10)), None).unwrap();
        stream.push(var("v3"), Some(Address(0x18)), None).unwrap();

        let prints = build_fingerprints(&stream, ["count"]);
        assert_eq!(prints.len(), 1);
        assert_eq!(
            prints["count"].as_slice(),
            &[Address(0x10), Address(0x40)]
        );
    }

    #[test]
    fn test_unresolved_variables_are_omitted() {
        let mut stream = NodeStream::new();
        let root = stream.push(NodeOp::Opaque { code: 1 }, None, None).unwrap();
        stream.push(var("lost"), None, Some(root)).unwrap();
        stream.push(var("kept"), Some(Address(0x20)), Some(root)).unwrap();

        let prints = build_fingerprints(&stream, ["lost", "kept"]);
        assert!(!prints.contains_key("lost"));
        assert_eq!(prints["kept"].len(), 1);
    }

    #[test]
    fn test_function_uses_user_named_variables() {
        let mut func = DecompiledFunction::new(Address(0x1000), "f");
        func.variables = vec![LocalVar::new("total").user_named(), LocalVar::new("v1")];
        func.nodes.push(var("total"), Some(Address(0x1004)), None).unwrap();
        func.nodes.push(var("v1"), Some(Address(0x1008)), None).unwrap();

        let prints = fingerprint_function(&func);
        assert_eq!(prints.keys().collect::<Vec<_>>(), vec!["total"]);
    }
}
