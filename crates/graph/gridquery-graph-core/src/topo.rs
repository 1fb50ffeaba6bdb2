//! Topological ordering of graph definitions.

use std::collections::VecDeque;

use hashbrown::HashMap;

use crate::error::ConfigError;
use crate::types::{InputRef, NodeDef};

/// Order node ids so every node comes after the nodes it samples from.
/// Rejects cycles and references to undefined nodes.
pub fn topo_order(nodes: &[NodeDef]) -> Result<Vec<String>, ConfigError> {
    let mut indeg: HashMap<&str, usize> = HashMap::new();
    let mut adj: HashMap<&str, Vec<&str>> = HashMap::new();

    for n in nodes {
        indeg.entry(&n.id).or_insert(0);
    }
    for n in nodes {
        for input in n.inputs.values() {
            for r in input.refs() {
                let InputRef::Socket { node: upstream, .. } = r else {
                    continue;
                };
                if !indeg.contains_key(upstream.as_str()) {
                    return Err(ConfigError::UnknownSource {
                        node: n.id.clone(),
                        upstream: upstream.clone(),
                    });
                }
                adj.entry(upstream).or_default().push(&n.id);
                *indeg.entry(&n.id).or_default() += 1;
            }
        }
    }

    let mut queue: VecDeque<&str> = nodes
        .iter()
        .map(|n| n.id.as_str())
        .filter(|id| indeg[id] == 0)
        .collect();

    let mut order = Vec::new();
    while let Some(id) = queue.pop_front() {
        order.push(id.to_string());
        if let Some(downstream) = adj.get(id) {
            for &d in downstream {
                if let Some(deg) = indeg.get_mut(d) {
                    *deg -= 1;
                    if *deg == 0 {
                        queue.push_back(d);
                    }
                }
            }
        }
    }

    if order.len() != indeg.len() {
        return Err(ConfigError::Cycle);
    }
    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::InputDef;
    use hashbrown::HashMap;

    fn node(id: &str, upstream: &[&str]) -> NodeDef {
        let mut inputs = HashMap::new();
        for (i, u) in upstream.iter().enumerate() {
            inputs.insert(
                format!("in{i}"),
                InputDef::One(InputRef::Socket {
                    node: u.to_string(),
                    output: "output".to_string(),
                }),
            );
        }
        NodeDef {
            id: id.to_string(),
            kind: "test".to_string(),
            params: HashMap::new(),
            inputs,
            bounds: None,
        }
    }

    #[test]
    fn upstream_nodes_come_first() {
        let nodes = vec![node("c", &["a", "b"]), node("b", &["a"]), node("a", &[])];
        let order = topo_order(&nodes).unwrap();
        assert_eq!(order, vec!["a", "b", "c"]);
    }

    #[test]
    fn cycles_are_rejected() {
        let nodes = vec![node("a", &["b"]), node("b", &["a"])];
        assert!(matches!(topo_order(&nodes), Err(ConfigError::Cycle)));
    }

    #[test]
    fn dangling_references_are_rejected() {
        let nodes = vec![node("a", &["ghost"])];
        assert!(matches!(
            topo_order(&nodes),
            Err(ConfigError::UnknownSource { .. })
        ));
    }
}
