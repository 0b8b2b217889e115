//! A graph wrapper that counts capability calls.

use std::sync::atomic::{AtomicUsize, Ordering};
use weft_core::{Direction, Edge, EdgeId, ElementId, GraphResult, Value, Vertex, VertexId};
use weft_graph::{Adjacency, Graph, GraphIter};

/// Forwards to an inner graph, counting every call.
pub struct CountingGraph<G> {
    inner: G,
    calls: AtomicUsize,
}

impl<G: Graph> CountingGraph<G> {
    pub fn new(inner: G) -> Self {
        Self {
            inner,
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of graph calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn inner(&self) -> &G {
        &self.inner
    }

    fn tick(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

impl<G: Graph> Graph for CountingGraph<G> {
    fn vertex(&self, id: VertexId) -> GraphResult<Vertex> {
        self.tick();
        self.inner.vertex(id)
    }

    fn edge(&self, id: EdgeId) -> GraphResult<Edge> {
        self.tick();
        self.inner.edge(id)
    }

    fn vertex_ids(&self) -> GraphIter<'_, VertexId> {
        self.tick();
        self.inner.vertex_ids()
    }

    fn edge_ids(&self) -> GraphIter<'_, EdgeId> {
        self.tick();
        self.inner.edge_ids()
    }

    fn adjacent(
        &self,
        vertex: VertexId,
        direction: Direction,
        labels: &[String],
    ) -> GraphResult<GraphIter<'_, Adjacency>> {
        self.tick();
        self.inner.adjacent(vertex, direction, labels)
    }

    fn property(&self, element: ElementId, key: &str) -> GraphResult<Option<Value>> {
        self.tick();
        self.inner.property(element, key)
    }

    fn label(&self, element: ElementId) -> GraphResult<String> {
        self.tick();
        self.inner.label(element)
    }
}
