use std::collections::HashMap;

use super::{EdgeStyle, Graph, Node, NodeId};
use crate::util::last_segment;

/// Removes nodes that only restate their single successor (a `*demo.Node` header
/// pointing at a `Node` record, say) and reroutes their incoming edges.
///
/// Returns how many nodes were removed. Repeats until no candidate remains, so a
/// second call on the result is a no-op.
pub fn collapse_trivial_nodes(graph: &mut Graph) -> usize {
    let mut collapsed = 0usize;

    while let Some((candidate, successor)) = find_candidate(graph) {
        collapse(graph, candidate, successor);
        collapsed += 1;
    }

    if collapsed > 0 {
        tracing::debug!(collapsed, remaining = graph.node_count(), "collapsed trivial nodes");
    }
    collapsed
}

fn find_candidate(graph: &Graph) -> Option<(NodeId, NodeId)> {
    let mut direct: HashMap<NodeId, Vec<NodeId>> = HashMap::new();
    for edge in &graph.edges {
        direct.entry(edge.from).or_default().push(edge.to);
    }

    let access = graph
        .nodes
        .iter()
        .map(|node| (node.id, node))
        .collect::<HashMap<NodeId, &Node>>();

    graph.nodes.iter().find_map(|node| {
        let [to] = direct.get(&node.id)?.as_slice() else {
            return None;
        };

        if *to == node.id || node.rows.len() > 1 {
            return None;
        }

        let target = access.get(to)?;
        let matches = target.name == node.name || target.name == last_segment(&node.name);
        matches.then_some((node.id, *to))
    })
}

fn collapse(graph: &mut Graph, candidate: NodeId, successor: NodeId) {
    let style = match graph.node(successor) {
        Some(node) if node.rows.is_empty() => EdgeStyle::Pointer,
        _ => EdgeStyle::Aggregate,
    };

    graph.edges.retain(|edge| edge.from != candidate);
    for edge in graph.edges.iter_mut().filter(|edge| edge.to == candidate) {
        edge.to = successor;
        edge.style = style;
    }
    graph.nodes.retain(|node| node.id != candidate);

    tracing::trace!(%candidate, %successor, "collapsed node");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::CellCategory;

    fn node(id: usize, name: &str, rows: usize) -> Node {
        let mut node = Node::new(NodeId(id), name, "");
        for index in 0..rows {
            node.add_inlined(format!("f{index}"), format!("k{index}"), "v", CellCategory::Value);
        }
        node
    }

    fn pointer_chain() -> Graph {
        let mut graph = Graph::default();
        graph.add_node(node(1, "Holder", 2));
        graph.add_node(node(2, "*demo.Node", 0));
        graph.add_node(node(3, "Node", 2));
        graph.add_edge(NodeId(1), "o0", NodeId(2), "A", EdgeStyle::Pointer);
        graph.add_edge(NodeId(1), "o1", NodeId(3), "B", EdgeStyle::Nested);
        graph.add_edge(NodeId(2), "name", NodeId(3), "", EdgeStyle::Pointer);
        graph
    }

    #[test]
    fn pointer_header_collapses_into_its_target() {
        let mut graph = pointer_chain();

        assert_eq!(collapse_trivial_nodes(&mut graph), 1);
        assert!(graph.node(NodeId(2)).is_none());
        assert_eq!(graph.edge_count(), 2);

        let redirected = graph
            .edges
            .iter()
            .find(|edge| edge.tooltip == "A")
            .expect("redirected edge");
        assert_eq!(redirected.to, NodeId(3));
        assert_eq!(redirected.style, EdgeStyle::Aggregate);
    }

    #[test]
    fn collapsing_twice_changes_nothing() {
        let mut once = pointer_chain();
        collapse_trivial_nodes(&mut once);

        let mut twice = once.clone();
        assert_eq!(collapse_trivial_nodes(&mut twice), 0);
        assert_eq!(once, twice);
    }

    #[test]
    fn chained_candidates_and_self_loops() {
        let mut graph = Graph::default();
        graph.add_node(node(1, "Root", 2));
        graph.add_node(node(2, "**demo.Leaf", 0));
        graph.add_node(node(3, "*demo.Leaf", 0));
        graph.add_node(node(4, "Leaf", 0));
        graph.add_node(node(5, "Loop", 1));
        graph.add_edge(NodeId(1), "o0", NodeId(2), "x", EdgeStyle::Pointer);
        graph.add_edge(NodeId(2), "name", NodeId(3), "", EdgeStyle::Pointer);
        graph.add_edge(NodeId(3), "name", NodeId(4), "", EdgeStyle::Pointer);
        graph.add_edge(NodeId(5), "o0", NodeId(5), "self", EdgeStyle::Pointer);

        assert_eq!(collapse_trivial_nodes(&mut graph), 2);

        let ids = graph.nodes.iter().map(|node| node.id.0).collect::<Vec<_>>();
        assert_eq!(ids, [1, 4, 5]);
        assert!(graph.edges.iter().any(|edge| {
            edge.from == NodeId(1) && edge.to == NodeId(4) && edge.style == EdgeStyle::Pointer
        }));
        assert!(graph.edges.iter().any(|edge| edge.from == NodeId(5) && edge.to == NodeId(5)));
    }
}
