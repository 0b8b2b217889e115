//! Weft Graph Access
//!
//! This crate provides the graph capability boundary consumed by the engine:
//! - The `Graph` trait: identifier lookups, scans, adjacency expansion, property reads
//! - `MemoryGraph`: an indexed in-memory reference implementation
//! - Label index: find vertices by label
//! - Adjacency index: find edges leaving or arriving at a vertex
//! - Property index: find vertices by exact property value
//! - `toy`: small canonical datasets

mod graph;
mod index;
mod memory;
pub mod toy;

pub use graph::*;
pub use memory::*;
