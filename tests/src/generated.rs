//! Graphs built from generated parts, for property tests.

use weft_core::{props, VertexId};
use weft_graph::MemoryGraph;

/// Edge labels picked by `label % EDGE_LABELS.len()`.
pub const EDGE_LABELS: [&str; 3] = ["knows", "created", "blocked"];

/// Build a graph with one vertex per flag and the given edges.
///
/// Vertex `i` is named `v{i}` and carries `visible = flags[i]`. Edge
/// endpoints are taken modulo the vertex count; with no vertices there are
/// no edges.
pub fn graph_from_parts(flags: &[bool], edges: &[(usize, usize, u8)]) -> MemoryGraph {
    let mut g = MemoryGraph::new();
    let ids: Vec<VertexId> = flags
        .iter()
        .enumerate()
        .map(|(i, visible)| {
            let label = if i % 2 == 0 { "person" } else { "software" };
            g.add_vertex(label, props! { "name" => format!("v{}", i), "visible" => *visible })
        })
        .collect();

    if ids.is_empty() {
        return g;
    }
    for (n, &(from, to, label)) in edges.iter().enumerate() {
        let out_v = ids[from % ids.len()];
        let in_v = ids[to % ids.len()];
        let label = EDGE_LABELS[label as usize % EDGE_LABELS.len()];
        // Both endpoints exist, so insertion cannot fail.
        let _ = g.add_edge(out_v, label, in_v, props! { "seq" => n as i64 });
    }
    g
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_graph_from_parts_wraps_endpoints() {
        let g = graph_from_parts(&[true, false], &[(0, 1, 0), (5, 4, 2)]);

        assert_eq!(g.vertex_count(), 2);
        assert_eq!(g.edge_count(), 2);
        assert_eq!(g.vertices_with_label("person").len(), 1);
    }

    #[test]
    fn test_no_vertices_means_no_edges() {
        let g = graph_from_parts(&[], &[(0, 0, 0)]);

        assert_eq!(g.edge_count(), 0);
    }
}
