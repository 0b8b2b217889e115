//! Subgraph visibility through strategies and the graph view.

use pretty_assertions::assert_eq;
use proptest::prelude::{any, prop, prop_assert, prop_assert_eq, proptest, ProptestConfig};
use weft_core::EdgeId;
use weft_tests::prelude::*;

fn visible_only() -> SubgraphStrategy {
    SubgraphStrategy::new(
        ElementPredicate::property("visible", P::eq(true)),
        ElementPredicate::has_label(["knows", "created"]),
    )
}

fn registry(strategy: SubgraphStrategy) -> StrategyRegistry {
    let mut registry = StrategyRegistry::from_config(&EngineConfig::default()).unwrap();
    registry.register(strategy).unwrap();
    registry
}

/// Pipelines that reach elements through every graph-entry step.
fn entry_pipelines() -> Vec<Pipeline> {
    vec![
        Pipeline::new().v(),
        Pipeline::new().e(),
        Pipeline::new().v().out(&[]),
        Pipeline::new().v().in_(&[]),
        Pipeline::new().v().both(&[]).both(&[]),
        Pipeline::new().v().out_e(&[]),
        Pipeline::new().v().both_e(&[]).both_v(),
        Pipeline::new().e().out_v(),
        Pipeline::new().v().out_e(&[]).in_v(),
    ]
}

fn sorted_values(traversers: &[Traverser]) -> Vec<String> {
    let mut values: Vec<String> = expand(traversers).iter().map(|v| v.to_string()).collect();
    values.sort();
    values
}

#[test]
fn test_hidden_vertex_disappears_from_modern() {
    // GIVEN josh hidden
    let g = toy::modern();
    let strategy = SubgraphStrategy::new(
        ElementPredicate::property("name", P::neq("josh")),
        ElementPredicate::Any,
    );
    let compiled = registry(strategy)
        .compile(Pipeline::new().v().out(&[]).values(&["name"]))
        .unwrap();

    // WHEN run
    let mut names: Vec<String> = render_all(&g, &compiled.to_list(&g).unwrap())
        .iter()
        .filter_map(|v| v.as_str().map(str::to_string))
        .collect();
    names.sort();

    // THEN nothing reaches josh, and josh reaches nothing
    assert_eq!(names, vec!["lop", "lop", "vadas"]);
}

#[test]
fn test_edge_predicate_survives_default_rewrites() {
    // GIVEN marko->vadas hidden by its weight
    let g = toy::modern();
    let strategy = SubgraphStrategy::new(
        ElementPredicate::Any,
        ElementPredicate::property("weight", P::gte(0.6))
            .or(ElementPredicate::has_label(["created"])),
    );
    let pipeline = || {
        Pipeline::new()
            .v()
            .has("name", P::eq("marko"))
            .out_e(&["knows"])
            .in_v()
            .values(&["name"])
    };
    let mut alone = StrategyRegistry::new();
    alone.register(strategy.clone()).unwrap();

    // WHEN compiled with the subgraph alone and with every default rewrite
    let only_subgraph = alone.compile(pipeline()).unwrap();
    let with_defaults = registry(strategy).compile(pipeline()).unwrap();

    // THEN the edge hop is kept and both reach josh only
    assert!(with_defaults
        .pipeline()
        .iter()
        .any(|(step, _)| matches!(step, Step::Incident { .. })));
    let expected = sorted_values(&only_subgraph.to_list(&g).unwrap());
    assert_eq!(expected, vec!["\"josh\"".to_string()]);
    assert_eq!(sorted_values(&with_defaults.to_list(&g).unwrap()), expected);
}

#[test]
fn test_hidden_edges_fail_lookup_through_view() {
    let g = toy::modern();
    let strategy = SubgraphStrategy::new(ElementPredicate::Any, ElementPredicate::has_label(["knows"]));
    let view = strategy.view(&g);

    let knows = g.adjacent(VertexId::new(1), Direction::Out, &["knows".to_string()]);
    let knows: Vec<EdgeId> = knows.unwrap().map(|a| a.edge.id).collect();
    for id in knows {
        assert!(view.edge(id).is_ok());
    }

    let created: Vec<EdgeId> = g
        .adjacent(VertexId::new(1), Direction::Out, &["created".to_string()])
        .unwrap()
        .map(|a| a.edge.id)
        .collect();
    assert_eq!(created.len(), 1);
    assert!(view.edge(created[0]).is_err_and(|e| e.is_not_found()));
}

#[test]
fn test_lookup_of_hidden_vertex_by_id_errors() {
    // GIVEN V(josh) against the view
    let g = toy::modern();
    let strategy = SubgraphStrategy::new(
        ElementPredicate::property("name", P::neq("josh")),
        ElementPredicate::Any,
    );
    let view = strategy.view(&g);

    // WHEN the id is read through a traversal
    let out = Pipeline::new()
        .v_ids([VertexId::new(4)])
        .values(&["name"])
        .to_list(&view)
        .unwrap();

    // THEN the missing vertex is skipped
    assert!(out.is_empty());
    assert!(view.vertex(VertexId::new(4)).is_err_and(|e| e.is_not_found()));
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 64,
        failure_persistence: None,
        ..ProptestConfig::default()
    })]

    #[test]
    fn strategy_never_emits_hidden_elements(
        flags in prop::collection::vec(any::<bool>(), 0..7),
        edges in prop::collection::vec((0usize..7, 0usize..7, 0u8..3), 0..14),
    ) {
        let g = graph_from_parts(&flags, &edges);
        let strategy = visible_only();
        let filter = strategy.filter().clone();
        let registry = registry(strategy);

        for pipeline in entry_pipelines() {
            let compiled = registry.compile(pipeline).unwrap();
            for traverser in compiled.to_list(&g).unwrap() {
                prop_assert!(filter.admits(&g, &traverser.value).unwrap());
            }
        }
    }

    #[test]
    fn view_lookups_match_visibility(
        flags in prop::collection::vec(any::<bool>(), 0..7),
        edges in prop::collection::vec((0usize..7, 0usize..7, 0u8..3), 0..14),
    ) {
        let g = graph_from_parts(&flags, &edges);
        let strategy = visible_only();
        let view = strategy.view(&g);

        for id in g.edge_ids() {
            let visible = strategy.filter().edge_visible(&g, id).unwrap();
            prop_assert_eq!(view.edge(id).is_ok(), visible);
        }
        for id in g.vertex_ids() {
            let visible = strategy.filter().vertex_visible(&g, id).unwrap();
            prop_assert_eq!(view.vertex(id).is_ok(), visible);
        }
    }

    #[test]
    fn inserted_filters_are_redundant_on_the_view(
        flags in prop::collection::vec(any::<bool>(), 0..7),
        edges in prop::collection::vec((0usize..7, 0usize..7, 0u8..3), 0..14),
    ) {
        let g = graph_from_parts(&flags, &edges);
        let strategy = visible_only();
        let view = strategy.view(&g);
        let registry = registry(strategy);

        for pipeline in entry_pipelines() {
            let plain = sorted_values(&pipeline.to_list(&view).unwrap());
            let compiled = registry.compile(pipeline).unwrap();
            let filtered = sorted_values(&compiled.to_list(&view).unwrap());
            prop_assert_eq!(plain, filtered);
        }
    }
}
