//! Pattern errors surface before the graph is touched.

use pretty_assertions::assert_eq;
use std::collections::BTreeSet;
use weft_tests::prelude::*;

fn clause(start: &str, body: Pipeline, end: &str) -> PatternExpr {
    PatternExpr::clause(start, body, end)
}

fn marko() -> Traverser {
    Traverser::new(VertexId::new(1))
}

#[test]
fn test_unsolvable_pattern_reads_nothing() {
    // GIVEN an anonymous match with two independent roots
    let g = CountingGraph::new(toy::modern());
    let body = anon::match_(vec![
        clause("a", anon::out(&["knows"]), "b"),
        clause("c", anon::out(&["knows"]), "b"),
    ])
    .unwrap();

    // WHEN it is prepared for execution
    let result = body.execute_from(&g, vec![marko()]);

    // THEN planning fails without a single graph call
    let err = result.err().unwrap();
    assert!(matches!(
        err,
        TraversalError::Validation(ValidationError::UnsolvablePattern { .. })
    ));
    assert_eq!(g.calls(), 0);
}

#[test]
fn test_where_on_unknown_label_fails_before_any_graph_access() {
    // GIVEN a where unit comparing against a label nothing produces
    let g = CountingGraph::new(toy::modern());

    // WHEN the traversal is built and run
    let result = Pipeline::new()
        .v()
        .match_(vec![
            clause("a", anon::out(&[]), "b"),
            PatternExpr::compare("b", CompareOp::Neq, "c"),
        ])
        .and_then(|p| p.to_list(&g));

    // THEN construction fails and the graph was never read
    assert!(matches!(
        result,
        Err(TraversalError::Validation(
            ValidationError::WhereIntroducesLabel { .. }
        ))
    ));
    assert_eq!(g.calls(), 0);
}

#[test]
fn test_rooted_builder_rejects_unsolvable_pattern() {
    let result = Pipeline::new().v().match_(vec![
        clause("a", anon::out(&["knows"]), "b"),
        clause("c", anon::out(&["knows"]), "b"),
    ]);

    assert!(result.is_err_and(|e| e.to_string().contains("unsolvable")));
}

#[test]
fn test_where_cannot_introduce_labels() {
    // GIVEN a where pattern mentioning a label no plain clause binds
    let result = MatchStep::new(vec![
        clause("a", anon::out(&[]), "b"),
        PatternExpr::where_(clause("b", anon::out(&[]), "z")),
    ]);

    // THEN the step cannot be built
    assert_eq!(
        result.err(),
        Some(ValidationError::WhereIntroducesLabel { label: "z".into() })
    );
}

#[test]
fn test_not_cannot_introduce_labels() {
    let result = MatchStep::new(vec![
        clause("a", anon::out(&[]), "b"),
        PatternExpr::not(PatternExpr::compare("a", CompareOp::Eq, "q")),
    ]);

    assert!(matches!(
        result,
        Err(ValidationError::WhereIntroducesLabel { .. })
    ));
}

#[test]
fn test_empty_connectives_are_malformed() {
    assert!(matches!(
        MatchStep::new(vec![]),
        Err(ValidationError::MalformedExpression { .. })
    ));
    assert!(matches!(
        MatchStep::new(vec![PatternExpr::and(vec![])]),
        Err(ValidationError::MalformedExpression { .. })
    ));
    assert!(matches!(
        MatchStep::new(vec![PatternExpr::or(vec![])]),
        Err(ValidationError::MalformedExpression { .. })
    ));
}

#[test]
fn test_nested_match_is_validated_at_compile_time() {
    // GIVEN a where body holding an unsolvable anonymous match
    let inner = anon::match_(vec![
        clause("a", anon::out(&[]), "b"),
        clause("c", anon::out(&[]), "d"),
    ])
    .unwrap();
    let pipeline = Pipeline::new().v().where_(inner);

    // WHEN compiled
    let result = StrategyRegistry::new().compile(pipeline);

    // THEN compilation fails before any graph is involved
    assert!(matches!(
        result,
        Err(StrategyError::Traversal(TraversalError::Validation(
            ValidationError::UnsolvablePattern { .. }
        )))
    ));
}

#[test]
fn test_cyclic_pattern_without_roots_uses_first_start_label() {
    // GIVEN a.knows.b and b.in(knows).a: every start label is also produced
    let step = MatchStep::new(vec![
        clause("a", anon::out(&["knows"]), "b"),
        clause("b", anon::in_(&["knows"]), "a"),
    ])
    .unwrap();

    // WHEN planned with nothing bound upstream
    let plan = step.plan(&BTreeSet::new()).unwrap();

    // THEN the first start label starts the match
    assert_eq!(plan.start_label.as_deref(), Some("a"));
}

#[test]
fn test_labels_bound_upstream_are_roots() {
    let step = MatchStep::new(vec![
        clause("a", anon::out(&[]).count(), "c"),
        clause("b", anon::in_(&[]).count(), "c"),
    ])
    .unwrap();
    let upstream: BTreeSet<String> = ["a".to_string(), "b".to_string()].into();

    let plan = step.plan(&upstream).unwrap();
    assert_eq!(plan.start_label, None);

    // One bound root is not enough
    let partial: BTreeSet<String> = ["a".to_string()].into();
    assert!(matches!(
        step.plan(&partial),
        Err(ValidationError::UnsolvablePattern { .. })
    ));
}

#[test]
fn test_introduced_label_fails_the_step() {
    Scenario::new("validation")
        .strategies(EngineConfig::default())
        .step(
            "where_introduces",
            || {
                Pipeline::new().v().match_(vec![
                    clause("a", anon::out(&[]), "b"),
                    PatternExpr::compare("b", CompareOp::Eq, "zz"),
                ])
            },
            |a| a.error_pattern("introduce label 'zz'"),
        )
        .run()
        .unwrap();
}
