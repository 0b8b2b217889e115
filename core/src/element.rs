//! Element handles for graph traversal.
//!
//! Vertices and edges are handed out as lightweight handles carrying identity,
//! label and (for edges) endpoints. Properties are read through the graph.

use crate::{EdgeId, ElementId, VertexId};
use std::fmt;

/// Direction of an adjacency relative to a vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Edges leaving the vertex.
    Out,
    /// Edges arriving at the vertex.
    In,
    /// Both directions.
    Both,
}

impl Direction {
    /// The opposite direction. `Both` is its own opposite.
    pub fn opposite(&self) -> Direction {
        match self {
            Direction::Out => Direction::In,
            Direction::In => Direction::Out,
            Direction::Both => Direction::Both,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Out => write!(f, "OUT"),
            Direction::In => write!(f, "IN"),
            Direction::Both => write!(f, "BOTH"),
        }
    }
}

/// A vertex in the graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Vertex {
    /// Unique identifier for this vertex.
    pub id: VertexId,
    /// Vertex label.
    pub label: String,
}

impl Vertex {
    /// Create a new vertex handle.
    pub fn new(id: VertexId, label: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
        }
    }
}

/// A directed, labeled edge in the graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Edge {
    /// Unique identifier for this edge.
    pub id: EdgeId,
    /// Edge label.
    pub label: String,
    /// Tail vertex (the edge leaves this vertex).
    pub out_v: VertexId,
    /// Head vertex (the edge arrives at this vertex).
    pub in_v: VertexId,
}

impl Edge {
    /// Create a new edge handle.
    pub fn new(id: EdgeId, label: impl Into<String>, out_v: VertexId, in_v: VertexId) -> Self {
        Self {
            id,
            label: label.into(),
            out_v,
            in_v,
        }
    }

    /// Endpoint(s) of this edge for the given direction.
    ///
    /// `Out` yields the tail, `In` the head, `Both` yields tail then head.
    pub fn vertices(&self, direction: Direction) -> Vec<VertexId> {
        match direction {
            Direction::Out => vec![self.out_v],
            Direction::In => vec![self.in_v],
            Direction::Both => vec![self.out_v, self.in_v],
        }
    }

    /// The endpoint that is not `vertex`. For self-loops this is `vertex` itself.
    pub fn other(&self, vertex: VertexId) -> VertexId {
        if self.out_v == vertex {
            self.in_v
        } else {
            self.out_v
        }
    }
}

/// Either a vertex or an edge handle.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Element {
    Vertex(Vertex),
    Edge(Edge),
}

impl Element {
    /// The element's identifier.
    pub fn id(&self) -> ElementId {
        match self {
            Element::Vertex(v) => ElementId::Vertex(v.id),
            Element::Edge(e) => ElementId::Edge(e.id),
        }
    }

    /// The element's label.
    pub fn label(&self) -> &str {
        match self {
            Element::Vertex(v) => &v.label,
            Element::Edge(e) => &e.label,
        }
    }
}
