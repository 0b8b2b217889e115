//! One compiled traversal, many concurrent executions.

use pretty_assertions::assert_eq;
use std::thread;
use weft_tests::prelude::*;

fn sorted(graph: &dyn Graph, traversers: &[Traverser]) -> Vec<String> {
    let mut rows: Vec<String> = render_all(graph, traversers)
        .iter()
        .map(|v| v.to_string())
        .collect();
    rows.sort();
    rows
}

#[test]
fn test_shared_compiled_match_across_threads() {
    // GIVEN a compiled match with a folded where step
    let g = toy::modern();
    let pipeline = Pipeline::new()
        .v()
        .match_(vec![
            PatternExpr::clause("a", anon::out(&["created"]), "b"),
            PatternExpr::clause("b", anon::in_(&["created"]), "c"),
        ])
        .unwrap()
        .where_compare(Some("a"), CompareOp::Neq, "c")
        .dedup(&["a", "c"]);
    let compiled = StrategyRegistry::from_config(&EngineConfig::default())
        .unwrap()
        .compile(pipeline)
        .unwrap();
    let expected = sorted(&g, &compiled.to_list(&g).unwrap());

    // WHEN executed from eight threads at once
    let results: Vec<Vec<String>> = thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let compiled = &compiled;
                let g = &g;
                scope.spawn(move || sorted(g, &compiled.to_list(g).unwrap()))
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    // THEN every execution sees its own state and the same answer
    assert_eq!(expected.len(), 6);
    for result in results {
        assert_eq!(result, expected);
    }
}

#[test]
fn test_cloned_handles_share_the_pipeline() {
    let compiled = StrategyRegistry::new()
        .compile(Pipeline::new().v().out(&[]).limit(2))
        .unwrap();
    let g = toy::modern();

    let clones: Vec<CompiledTraversal> = (0..4).map(|_| compiled.clone()).collect();

    thread::scope(|scope| {
        for clone in &clones {
            let g = &g;
            scope.spawn(move || {
                let out = clone.to_list(g).unwrap();
                assert_eq!(expand(&out).len(), 2);
            });
        }
    });
    assert!(std::ptr::eq(clones[0].pipeline(), compiled.pipeline()));
}
