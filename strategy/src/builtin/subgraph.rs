//! Subgraph views.
//!
//! A subgraph is described by a vertex predicate and an edge predicate. The
//! strategy filters every element a pipeline reads from the graph; the view
//! hides the same elements from direct lookups.

use crate::{IncidentToAdjacentStrategy, MatchPredicateStrategy, Strategy};
use tracing::debug;
use weft_core::{
    Direction, Edge, EdgeId, ElementId, GraphError, GraphResult, Value, Vertex, VertexId,
};
use weft_graph::{Adjacency, Graph, GraphIter};
use weft_traversal::{ElementPredicate, Pipeline, Step, TraversalResult, VisibilityFilter};

/// Restricts a traversal to the visible part of the graph.
///
/// Inserts a visibility filter right after every step that reads elements
/// from the graph. A filter already sitting there is taken as a previous
/// application and left alone.
#[derive(Debug, Clone)]
pub struct SubgraphStrategy {
    filter: VisibilityFilter,
}

impl SubgraphStrategy {
    pub const NAME: &'static str = "subgraph";

    pub fn new(vertices: ElementPredicate, edges: ElementPredicate) -> Self {
        Self {
            filter: VisibilityFilter::new(vertices, edges),
        }
    }

    pub fn filter(&self) -> &VisibilityFilter {
        &self.filter
    }

    /// Wrap `graph` so that hidden elements cannot be looked up either.
    pub fn view<'g>(&self, graph: &'g dyn Graph) -> SubgraphGraph<'g> {
        SubgraphGraph {
            inner: graph,
            filter: self.filter.clone(),
        }
    }
}

impl Strategy for SubgraphStrategy {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn runs_after(&self) -> &[&'static str] {
        &[MatchPredicateStrategy::NAME]
    }

    /// The filter between `outE` and `inV` carries the edge test, so the
    /// pair must not be merged into `out` first.
    fn runs_before(&self) -> &[&'static str] {
        &[IncidentToAdjacentStrategy::NAME]
    }

    fn apply(&self, pipeline: &mut Pipeline) -> TraversalResult<()> {
        // Highest position first so pending positions do not shift.
        for position in (0..pipeline.len()).rev() {
            let introduces = pipeline
                .step_at(position)
                .is_some_and(|step| step.introduces_elements());
            let marked = matches!(pipeline.step_at(position + 1), Some(Step::SubgraphFilter(_)));
            if introduces && !marked {
                pipeline.insert(position + 1, Step::SubgraphFilter(self.filter.clone()))?;
            }
        }
        Ok(())
    }
}

/// A graph that only shows the elements a [`VisibilityFilter`] admits.
///
/// Lookups of hidden elements fail with the usual "not found" errors, scans
/// skip them, and expansion never crosses a hidden edge or reaches a hidden
/// vertex.
pub struct SubgraphGraph<'g> {
    inner: &'g dyn Graph,
    filter: VisibilityFilter,
}

impl<'g> SubgraphGraph<'g> {
    fn check_vertex(&self, id: VertexId) -> GraphResult<()> {
        if self.filter.vertex_visible(self.inner, id)? {
            Ok(())
        } else {
            debug!(id = %id, "subgraph rejected vertex lookup");
            Err(GraphError::VertexNotFound(id))
        }
    }

    fn check_edge(&self, id: EdgeId) -> GraphResult<()> {
        if self.filter.edge_visible(self.inner, id)? {
            Ok(())
        } else {
            debug!(id = %id, "subgraph rejected edge lookup");
            Err(GraphError::EdgeNotFound(id))
        }
    }

    /// Visibility inside an iterator, where errors cannot be reported.
    fn visible(&self, result: GraphResult<bool>) -> bool {
        result.unwrap_or_else(|err| {
            debug!(error = %err, "subgraph treating unreadable element as hidden");
            false
        })
    }
}

impl<'g> Graph for SubgraphGraph<'g> {
    fn vertex(&self, id: VertexId) -> GraphResult<Vertex> {
        self.check_vertex(id)?;
        self.inner.vertex(id)
    }

    fn edge(&self, id: EdgeId) -> GraphResult<Edge> {
        self.check_edge(id)?;
        self.inner.edge(id)
    }

    fn vertex_ids(&self) -> GraphIter<'_, VertexId> {
        Box::new(
            self.inner
                .vertex_ids()
                .filter(move |id| self.visible(self.filter.vertex_visible(self.inner, *id))),
        )
    }

    fn edge_ids(&self) -> GraphIter<'_, EdgeId> {
        Box::new(
            self.inner
                .edge_ids()
                .filter(move |id| self.visible(self.filter.edge_visible(self.inner, *id))),
        )
    }

    fn adjacent(
        &self,
        vertex: VertexId,
        direction: Direction,
        labels: &[String],
    ) -> GraphResult<GraphIter<'_, Adjacency>> {
        self.check_vertex(vertex)?;
        let adjacencies = self.inner.adjacent(vertex, direction, labels)?;
        Ok(Box::new(adjacencies.filter(move |adjacency| {
            self.visible(self.filter.edge_visible(self.inner, adjacency.edge.id))
        })))
    }

    fn property(&self, element: ElementId, key: &str) -> GraphResult<Option<Value>> {
        match element {
            ElementId::Vertex(id) => self.check_vertex(id)?,
            ElementId::Edge(id) => self.check_edge(id)?,
        }
        self.inner.property(element, key)
    }
}
