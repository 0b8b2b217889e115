//! Weft Core Types
//!
//! This crate provides the foundational types used throughout Weft:
//! - Identity types (VertexId, EdgeId, ElementId)
//! - Value types (the Value enum with scalar, element and composite values)
//! - Element handles (Vertex, Edge) and traversal direction
//! - Graph-boundary error types

mod element;
mod error;
mod id;
mod value;

pub use element::*;
pub use error::*;
pub use id::*;
pub use value::*;
