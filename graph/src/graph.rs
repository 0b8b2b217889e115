//! The graph capability interface.

use weft_core::{Direction, Edge, EdgeId, ElementId, GraphResult, Value, Vertex, VertexId};

/// One step of adjacency expansion: the traversed edge and the vertex at its
/// far end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Adjacency {
    pub edge: Edge,
    pub vertex: VertexId,
}

/// Boxed lazy sequence handed out by graph scans and expansions.
pub type GraphIter<'a, T> = Box<dyn Iterator<Item = T> + 'a>;

/// Read-only access to a property graph.
///
/// Lookups by identifier report a missing element as
/// `GraphError::VertexNotFound` / `GraphError::EdgeNotFound`, never as an
/// absent value. Implementations must be safe for concurrent reads.
pub trait Graph: Send + Sync {
    /// Look up a vertex by identifier.
    fn vertex(&self, id: VertexId) -> GraphResult<Vertex>;

    /// Look up an edge by identifier.
    fn edge(&self, id: EdgeId) -> GraphResult<Edge>;

    /// Scan all vertex identifiers in ascending order.
    fn vertex_ids(&self) -> GraphIter<'_, VertexId>;

    /// Scan all edge identifiers in ascending order.
    fn edge_ids(&self) -> GraphIter<'_, EdgeId>;

    /// Expand a vertex along its incident edges.
    ///
    /// An empty `labels` slice means "any label". For `Direction::Both`,
    /// outgoing adjacencies come first.
    fn adjacent(
        &self,
        vertex: VertexId,
        direction: Direction,
        labels: &[String],
    ) -> GraphResult<GraphIter<'_, Adjacency>>;

    /// Read a property of a vertex or edge. `Ok(None)` if the key is unset.
    fn property(&self, element: ElementId, key: &str) -> GraphResult<Option<Value>>;

    /// Label of a vertex or edge.
    fn label(&self, element: ElementId) -> GraphResult<String> {
        match element {
            ElementId::Vertex(id) => Ok(self.vertex(id)?.label),
            ElementId::Edge(id) => Ok(self.edge(id)?.label),
        }
    }
}
