//! Declarative match over the modern graph.

use weft_tests::prelude::*;

fn clause(start: &str, body: Pipeline, end: &str) -> PatternExpr {
    PatternExpr::clause(start, body, end)
}

pub fn scenario() -> Scenario {
    Scenario::new("match_patterns")
        .step(
            "single_clause",
            || Pipeline::new().v().match_(vec![clause("a", anon::out(&[]), "b")]),
            |a| {
                a.exactly(vec![
                    row! { a: "marko", b: "lop" },
                    row! { a: "marko", b: "vadas" },
                    row! { a: "marko", b: "josh" },
                    row! { a: "josh", b: "ripple" },
                    row! { a: "josh", b: "lop" },
                    row! { a: "peter", b: "lop" },
                ])
            },
        )
        .step(
            "chained_clauses",
            || {
                Pipeline::new().v().match_(vec![
                    clause("a", anon::out(&["knows"]), "b"),
                    clause("b", anon::out(&["created"]), "c"),
                ])
            },
            |a| {
                a.exactly(vec![
                    row! { a: "marko", b: "josh", c: "ripple" },
                    row! { a: "marko", b: "josh", c: "lop" },
                ])
            },
        )
        .step(
            "declaration_order_does_not_matter",
            || {
                Pipeline::new().v().match_(vec![
                    clause("b", anon::out(&["created"]), "c"),
                    clause("a", anon::out(&["knows"]), "b"),
                ])
            },
            |a| {
                a.exactly(vec![
                    row! { a: "marko", b: "josh", c: "ripple" },
                    row! { a: "marko", b: "josh", c: "lop" },
                ])
            },
        )
        .step(
            "two_hops",
            || Pipeline::new().v().match_(vec![clause("a", anon::out(&[]).out(&[]), "b")]),
            |a| {
                a.exactly(vec![
                    row! { a: "marko", b: "ripple" },
                    row! { a: "marko", b: "lop" },
                ])
            },
        )
        .step(
            "two_roots_are_unsolvable",
            || {
                Pipeline::new().v().match_(vec![
                    clause("a", anon::out(&["knows"]), "b"),
                    clause("c", anon::out(&["knows"]), "b"),
                ])
            },
            |a| a.error("unsolvable"),
        )
        .step(
            "where_after_match",
            || {
                Ok(Pipeline::new()
                    .v()
                    .match_(vec![
                        clause("a", anon::out(&["created"]), "b"),
                        clause("b", anon::in_(&["created"]), "c"),
                    ])?
                    .where_compare(Some("a"), CompareOp::Neq, "c")
                    .select(&["a", "c"]))
            },
            |a| {
                a.exactly(vec![
                    row! { a: "marko", c: "josh" },
                    row! { a: "marko", c: "peter" },
                    row! { a: "josh", c: "marko" },
                    row! { a: "josh", c: "peter" },
                    row! { a: "peter", c: "marko" },
                    row! { a: "peter", c: "josh" },
                ])
            },
        )
        .step(
            "where_inside_match",
            || {
                Pipeline::new().v().match_(vec![
                    clause("a", anon::out(&["created"]), "b"),
                    clause("b", anon::in_(&["created"]), "c"),
                    PatternExpr::compare("a", CompareOp::Neq, "c"),
                ])
            },
            |a| a.rows(6).contains(row! { a: "josh", b: "lop", c: "peter" }),
        )
        .step(
            "both_directions_dedup_by_pair",
            || {
                Ok(Pipeline::new()
                    .v()
                    .match_(vec![
                        clause("a", anon::both(&[]), "b"),
                        clause("b", anon::both(&[]), "c"),
                    ])?
                    .dedup(&["a", "b"]))
            },
            |a| a.rows(12),
        )
        .step(
            "dedup_pair_by_label",
            || {
                Ok(Pipeline::new()
                    .v()
                    .match_(vec![
                        clause("a", anon::both(&[]), "b"),
                        clause("b", anon::both(&[]), "c"),
                    ])?
                    .dedup(&["a", "b"])
                    .by(Projection::Label))
            },
            |a| a.rows(3),
        )
        .step(
            "labels_bound_upstream_join_on_count",
            || {
                Pipeline::new().v().as_("a").out(&[]).as_("b").match_(vec![
                    clause("a", anon::out(&[]).count(), "c"),
                    clause("b", anon::in_(&[]).count(), "c"),
                ])
            },
            |a| a.rows(1).contains(row! { a: "marko", b: "lop", c: 3 }),
        )
        .step(
            "nested_and_with_count_join",
            || {
                Pipeline::new().v().match_(vec![
                    clause("a", anon::out(&["knows"]), "b"),
                    PatternExpr::and(vec![
                        clause("a", anon::out(&["created"]), "c"),
                        clause("b", anon::out(&["created"]), "c"),
                        PatternExpr::and(vec![
                            clause("b", anon::out(&["created"]).count(), "d"),
                            clause("a", anon::out(&["knows"]).count(), "d"),
                        ]),
                    ]),
                ])
            },
            |a| a.exactly(vec![row! { a: "marko", b: "josh", c: "lop", d: 2 }]),
        )
        .step(
            "not_excludes_created_pairs",
            || {
                Pipeline::new().v().match_(vec![
                    clause("a", anon::out(&[]), "b"),
                    PatternExpr::not(clause("a", anon::out(&["created"]), "b")),
                ])
            },
            |a| {
                a.exactly(vec![
                    row! { a: "marko", b: "vadas" },
                    row! { a: "marko", b: "josh" },
                ])
            },
        )
        .step(
            "not_excludes_known_creators",
            || {
                Pipeline::new().v().match_(vec![
                    clause("a", anon::out(&["created"]), "b"),
                    PatternExpr::not(PatternExpr::filter("a", anon::in_(&["knows"]))),
                ])
            },
            |a| {
                a.exactly(vec![
                    row! { a: "marko", b: "lop" },
                    row! { a: "peter", b: "lop" },
                ])
            },
        )
        .step(
            "or_of_filters",
            || {
                Pipeline::new().v().match_(vec![
                    clause("a", anon::out(&["created"]), "b"),
                    PatternExpr::or(vec![
                        PatternExpr::filter("a", anon::has("name", P::eq("marko"))),
                        PatternExpr::filter("b", anon::has("name", P::eq("ripple"))),
                    ]),
                ])
            },
            |a| {
                a.exactly(vec![
                    row! { a: "marko", b: "lop" },
                    row! { a: "josh", b: "ripple" },
                ])
            },
        )
        .step(
            "or_checks_labels_bound_by_siblings",
            || {
                Pipeline::new().v().as_("a").out(&[]).as_("b").match_(vec![
                    clause("a", anon::out(&[]).count(), "c"),
                    PatternExpr::or(vec![
                        clause("a", anon::out(&["knows"]), "b"),
                        PatternExpr::and(vec![
                            clause("b", anon::in_(&[]).count(), "c"),
                            PatternExpr::filter("c", anon::is(P::gt(2))),
                        ]),
                    ]),
                ])
            },
            |a| {
                a.exactly(vec![
                    row! { a: "marko", b: "lop", c: 3 },
                    row! { a: "marko", b: "vadas", c: 3 },
                    row! { a: "marko", b: "josh", c: 3 },
                ])
            },
        )
        .step(
            "or_keeps_every_succeeding_branch",
            || {
                Pipeline::new().v().match_(vec![
                    clause("a", anon::out(&["created"]), "b"),
                    PatternExpr::or(vec![
                        PatternExpr::filter("a", anon::has("name", P::eq("marko"))),
                        PatternExpr::filter("b", anon::has("name", P::eq("lop"))),
                    ]),
                ])
            },
            |a| {
                a.exactly(vec![
                    row! { a: "marko", b: "lop" },
                    row! { a: "marko", b: "lop" },
                    row! { a: "josh", b: "lop" },
                    row! { a: "peter", b: "lop" },
                ])
            },
        )
        .step(
            "or_first_stops_at_first_success",
            || {
                Pipeline::new().v().match_(vec![
                    clause("a", anon::out(&["created"]), "b"),
                    PatternExpr::or_first(vec![
                        PatternExpr::filter("a", anon::has("name", P::eq("marko"))),
                        PatternExpr::filter("b", anon::has("name", P::eq("lop"))),
                    ]),
                ])
            },
            |a| {
                a.exactly(vec![
                    row! { a: "marko", b: "lop" },
                    row! { a: "josh", b: "lop" },
                    row! { a: "peter", b: "lop" },
                ])
            },
        )
        .step(
            "or_branch_private_labels_collapse",
            || {
                Pipeline::new().v().match_(vec![
                    clause("a", anon::out(&["created"]), "b"),
                    PatternExpr::or_first(vec![
                        PatternExpr::filter("a", anon::has("name", P::eq("josh"))),
                        clause("b", anon::in_(&["created"]), "c"),
                    ]),
                ])
            },
            |a| {
                a.exactly(vec![
                    row! { a: "marko", b: "lop" },
                    row! { a: "josh", b: "ripple" },
                    row! { a: "josh", b: "lop" },
                    row! { a: "peter", b: "lop" },
                ])
            },
        )
        .step(
            "nested_match_exposes_selected_label",
            || {
                Pipeline::new().v().match_(vec![
                    clause("a", anon::out(&["knows"]), "b"),
                    PatternExpr::filter("b", anon::out(&["created"]).has("name", P::eq("lop"))),
                    clause(
                        "b",
                        anon::match_(vec![
                            clause("b", anon::out(&["created"]), "d"),
                            clause("d", anon::in_(&["created"]), "c"),
                        ])?
                        .select(&["c"]),
                        "c",
                    ),
                ])
            },
            |a| {
                a.exactly(vec![
                    row! { a: "marko", b: "josh", c: "josh" },
                    row! { a: "marko", b: "josh", c: "josh" },
                    row! { a: "marko", b: "josh", c: "marko" },
                    row! { a: "marko", b: "josh", c: "peter" },
                ])
            },
        )
        .step(
            "repeat_inside_clause",
            || {
                Pipeline::new()
                    .v()
                    .match_(vec![clause("a", anon::repeat(anon::out(&[]), 2), "b")])
            },
            |a| {
                a.exactly(vec![
                    row! { a: "marko", b: "ripple" },
                    row! { a: "marko", b: "lop" },
                ])
            },
        )
        .step(
            "repeat_inside_where",
            || {
                Pipeline::new().v().match_(vec![
                    clause("a", anon::out(&[]), "b"),
                    PatternExpr::where_(PatternExpr::filter(
                        "a",
                        anon::repeat(anon::out(&[]), 2),
                    )),
                ])
            },
            |a| {
                a.exactly(vec![
                    row! { a: "marko", b: "lop" },
                    row! { a: "marko", b: "vadas" },
                    row! { a: "marko", b: "josh" },
                ])
            },
        )
        .step(
            "cyclic_pattern_returns_to_start",
            || {
                Pipeline::new().v().match_(vec![
                    clause("a", anon::out(&["created"]), "b"),
                    clause("b", anon::in_(&["created"]), "a"),
                ])
            },
            |a| {
                a.exactly(vec![
                    row! { a: "marko", b: "lop" },
                    row! { a: "josh", b: "ripple" },
                    row! { a: "josh", b: "lop" },
                    row! { a: "peter", b: "lop" },
                ])
            },
        )
        .step(
            "select_after_match",
            || {
                Ok(Pipeline::new()
                    .v()
                    .match_(vec![
                        clause("a", anon::out(&["knows"]), "b"),
                        clause("b", anon::out(&["created"]), "c"),
                    ])?
                    .select(&["c"])
                    .values(&["name"]))
            },
            |a| a.values(["ripple", "lop"]),
        )
}

#[test]
fn test_match_patterns() {
    scenario().run().unwrap();
}

#[test]
fn test_match_patterns_under_default_strategies() {
    // Same expectations once identity removal and predicate folding run
    scenario().strategies(EngineConfig::default()).run().unwrap();
}

#[test]
fn test_match_patterns_greedy() {
    scenario()
        .strategies(EngineConfig::default().with_match_algorithm(AlgorithmKind::Greedy))
        .run()
        .unwrap();
}

#[test]
fn test_or_under_both_algorithms() {
    // GIVEN an OR testing a label another unit binds
    let g = toy::modern();
    let units = || {
        vec![
            clause("a", anon::out(&[]).count(), "c"),
            PatternExpr::or(vec![
                clause("a", anon::out(&["knows"]), "b"),
                PatternExpr::and(vec![
                    clause("b", anon::in_(&[]).count(), "c"),
                    PatternExpr::filter("c", anon::is(P::gt(2))),
                ]),
            ]),
        ]
    };
    let run = |kind: AlgorithmKind| {
        let step = MatchStep::new(units()).unwrap().with_algorithm(kind);
        let pipeline = Pipeline::new()
            .v()
            .as_("a")
            .out(&[])
            .as_("b")
            .match_step(step)
            .unwrap();
        let mut rows: Vec<String> = render_all(&g, &pipeline.to_list(&g).unwrap())
            .iter()
            .map(|v| v.to_string())
            .collect();
        rows.sort();
        rows
    };

    // WHEN run greedily and cost-driven
    let greedy = run(AlgorithmKind::Greedy);
    let count_based = run(AlgorithmKind::CountBased);

    // THEN both find the same three rows
    assert_eq!(greedy.len(), 3);
    assert_eq!(greedy, count_based);
}

#[test]
fn test_where_folded_into_match_keeps_results() {
    // GIVEN a where step right after a match
    let g = toy::modern();
    let pipeline = Pipeline::new()
        .v()
        .match_(vec![
            clause("a", anon::out(&["created"]), "b"),
            clause("b", anon::in_(&["created"]), "c"),
        ])
        .unwrap()
        .where_compare(Some("a"), CompareOp::Neq, "c");
    let registry = StrategyRegistry::from_config(&EngineConfig::default()).unwrap();

    // WHEN compiled
    let compiled = registry.compile(pipeline).unwrap();

    // THEN the where step became part of the match
    assert_eq!(compiled.pipeline().len(), 2);
    assert!(matches!(compiled.pipeline().step_at(1), Some(Step::Match(_))));
    assert_eq!(expand(&compiled.to_list(&g).unwrap()).len(), 6);
}
