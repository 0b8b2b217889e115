//! Canonical small datasets.

use crate::MemoryGraph;
use weft_core::{props, GraphResult};

/// The "modern" toy graph.
///
/// ```text
/// marko -knows(0.5)-> vadas      marko -created(0.4)-> lop
/// marko -knows(1.0)-> josh       josh  -created(1.0)-> ripple
///                                josh  -created(0.4)-> lop
///                                peter -created(0.2)-> lop
/// ```
///
/// Vertices are allocated in the order marko, vadas, lop, josh, ripple, peter.
pub fn modern() -> MemoryGraph {
    // Endpoints always exist here, so edge insertion cannot fail.
    match build_modern() {
        Ok(graph) => graph,
        Err(err) => unreachable!("modern graph construction failed: {}", err),
    }
}

fn build_modern() -> GraphResult<MemoryGraph> {
    let mut g = MemoryGraph::new();

    let marko = g.add_vertex("person", props! { "name" => "marko", "age" => 29i64 });
    let vadas = g.add_vertex("person", props! { "name" => "vadas", "age" => 27i64 });
    let lop = g.add_vertex("software", props! { "name" => "lop", "lang" => "java" });
    let josh = g.add_vertex("person", props! { "name" => "josh", "age" => 32i64 });
    let ripple = g.add_vertex("software", props! { "name" => "ripple", "lang" => "java" });
    let peter = g.add_vertex("person", props! { "name" => "peter", "age" => 35i64 });

    g.add_edge(marko, "knows", vadas, props! { "weight" => 0.5 })?;
    g.add_edge(marko, "knows", josh, props! { "weight" => 1.0 })?;
    g.add_edge(marko, "created", lop, props! { "weight" => 0.4 })?;
    g.add_edge(josh, "created", ripple, props! { "weight" => 1.0 })?;
    g.add_edge(josh, "created", lop, props! { "weight" => 0.4 })?;
    g.add_edge(peter, "created", lop, props! { "weight" => 0.2 })?;

    Ok(g)
}
