//! Indexed in-memory graph.

use crate::index::{AdjacencyIndex, LabelIndex, PropertyIndex};
use crate::{Adjacency, Graph, GraphIter};
use std::collections::BTreeMap;
use weft_core::{
    Direction, Edge, EdgeId, ElementId, GraphError, GraphResult, Properties, Value, Vertex,
    VertexId,
};

/// ID allocator for vertices and edges.
#[derive(Debug)]
struct IdAllocator {
    next_vertex_id: u64,
    next_edge_id: u64,
}

impl IdAllocator {
    fn new() -> Self {
        Self {
            next_vertex_id: 1,
            next_edge_id: 1,
        }
    }

    fn alloc_vertex_id(&mut self) -> VertexId {
        let id = VertexId::new(self.next_vertex_id);
        self.next_vertex_id += 1;
        id
    }

    fn alloc_edge_id(&mut self) -> EdgeId {
        let id = EdgeId::new(self.next_edge_id);
        self.next_edge_id += 1;
        id
    }
}

#[derive(Debug)]
struct VertexRecord {
    vertex: Vertex,
    properties: Properties,
}

#[derive(Debug)]
struct EdgeRecord {
    edge: Edge,
    properties: Properties,
}

/// An in-memory property graph.
///
/// Storage is ordered by identifier so scans are deterministic.
#[derive(Debug)]
pub struct MemoryGraph {
    /// Vertex storage
    vertices: BTreeMap<VertexId, VertexRecord>,
    /// Edge storage
    edges: BTreeMap<EdgeId, EdgeRecord>,
    /// ID allocator
    id_alloc: IdAllocator,
    /// Label index
    label_index: LabelIndex,
    /// Vertex property index
    prop_index: PropertyIndex,
    /// Adjacency index
    adj_index: AdjacencyIndex,
}

impl Default for MemoryGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryGraph {
    /// Create a new empty graph.
    pub fn new() -> Self {
        Self {
            vertices: BTreeMap::new(),
            edges: BTreeMap::new(),
            id_alloc: IdAllocator::new(),
            label_index: LabelIndex::new(),
            prop_index: PropertyIndex::new(),
            adj_index: AdjacencyIndex::new(),
        }
    }

    // ==================== Vertex Operations ====================

    /// Add a vertex with the given label and properties.
    pub fn add_vertex(&mut self, label: &str, properties: Properties) -> VertexId {
        let id = self.id_alloc.alloc_vertex_id();

        self.label_index.insert(label, id);
        for (key, value) in &properties {
            self.prop_index.insert(key, value, id);
        }

        self.vertices.insert(
            id,
            VertexRecord {
                vertex: Vertex::new(id, label),
                properties,
            },
        );
        id
    }

    /// Vertices carrying the given label, in ascending id order.
    pub fn vertices_with_label(&self, label: &str) -> Vec<VertexId> {
        self.label_index.get(label).collect()
    }

    /// Vertices whose property `key` equals `value`.
    ///
    /// Uses the property index when the value kind is indexed and falls back
    /// to a scan otherwise.
    pub fn vertex_by_property(&self, key: &str, value: &Value) -> Vec<VertexId> {
        if let Some(found) = self.prop_index.find_exact(key, value) {
            return found;
        }
        self.vertices
            .iter()
            .filter(|(_, record)| record.properties.get(key) == Some(value))
            .map(|(id, _)| *id)
            .collect()
    }

    // ==================== Edge Operations ====================

    /// Add a directed edge `out_v -label-> in_v`.
    pub fn add_edge(
        &mut self,
        out_v: VertexId,
        label: &str,
        in_v: VertexId,
        properties: Properties,
    ) -> GraphResult<EdgeId> {
        for endpoint in [out_v, in_v] {
            if !self.vertices.contains_key(&endpoint) {
                return Err(GraphError::VertexNotFound(endpoint));
            }
        }

        let id = self.id_alloc.alloc_edge_id();
        self.adj_index.insert(id, label, out_v, in_v);
        self.edges.insert(
            id,
            EdgeRecord {
                edge: Edge::new(id, label, out_v, in_v),
                properties,
            },
        );
        Ok(id)
    }

    // ==================== Properties ====================

    /// Set a property on a vertex or edge.
    pub fn set_property(&mut self, element: ElementId, key: &str, value: Value) -> GraphResult<()> {
        match element {
            ElementId::Vertex(id) => {
                let record = self
                    .vertices
                    .get_mut(&id)
                    .ok_or(GraphError::VertexNotFound(id))?;
                if let Some(old) = record.properties.get(key) {
                    self.prop_index.remove(key, old, id);
                }
                self.prop_index.insert(key, &value, id);
                record.properties.insert(key.to_string(), value);
            }
            ElementId::Edge(id) => {
                let record = self
                    .edges
                    .get_mut(&id)
                    .ok_or(GraphError::EdgeNotFound(id))?;
                record.properties.insert(key.to_string(), value);
            }
        }
        Ok(())
    }

    // ==================== Statistics ====================

    /// Get the number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Get the number of edges.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    fn edge_record(&self, id: EdgeId) -> GraphResult<&EdgeRecord> {
        self.edges.get(&id).ok_or(GraphError::EdgeNotFound(id))
    }

    fn adjacency(&self, edge: EdgeId, far_end: Direction) -> GraphResult<Adjacency> {
        let edge = self.edge_record(edge)?.edge.clone();
        let vertex = match far_end {
            Direction::In => edge.in_v,
            _ => edge.out_v,
        };
        Ok(Adjacency { edge, vertex })
    }
}

impl Graph for MemoryGraph {
    fn vertex(&self, id: VertexId) -> GraphResult<Vertex> {
        self.vertices
            .get(&id)
            .map(|record| record.vertex.clone())
            .ok_or(GraphError::VertexNotFound(id))
    }

    fn edge(&self, id: EdgeId) -> GraphResult<Edge> {
        self.edge_record(id).map(|record| record.edge.clone())
    }

    fn vertex_ids(&self) -> GraphIter<'_, VertexId> {
        Box::new(self.vertices.keys().copied())
    }

    fn edge_ids(&self) -> GraphIter<'_, EdgeId> {
        Box::new(self.edges.keys().copied())
    }

    fn adjacent(
        &self,
        vertex: VertexId,
        direction: Direction,
        labels: &[String],
    ) -> GraphResult<GraphIter<'_, Adjacency>> {
        if !self.vertices.contains_key(&vertex) {
            return Err(GraphError::VertexNotFound(vertex));
        }

        let mut found = Vec::new();
        if matches!(direction, Direction::Out | Direction::Both) {
            for edge in self.adj_index.edges_from(vertex, labels) {
                found.push(self.adjacency(edge, Direction::In)?);
            }
        }
        if matches!(direction, Direction::In | Direction::Both) {
            for edge in self.adj_index.edges_to(vertex, labels) {
                found.push(self.adjacency(edge, Direction::Out)?);
            }
        }
        Ok(Box::new(found.into_iter()))
    }

    fn property(&self, element: ElementId, key: &str) -> GraphResult<Option<Value>> {
        let properties = match element {
            ElementId::Vertex(id) => {
                &self
                    .vertices
                    .get(&id)
                    .ok_or(GraphError::VertexNotFound(id))?
                    .properties
            }
            ElementId::Edge(id) => &self.edge_record(id)?.properties,
        };
        Ok(properties.get(key).cloned())
    }
}
