//! Validator options, lazy documents, forbidden sets and bookkeeping

#[cfg(target_arch = "wasm32")]
use wasm_bindgen_test::wasm_bindgen_test as test;

#[cfg(target_arch = "wasm32")]
wasm_bindgen_test::wasm_bindgen_test_configure!(run_in_browser);

use rustc_hash::FxHashSet;
use serde_json::json;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use trail_core::{
    EdgeRef, EnumeratorBuilder, EnumeratorConfig, EnumeratorStats, Expression, PathExpression,
    PathType, PathValidatorOptions, UniquenessLevel, VertexRef,
};
use trail_storage::{DocumentMode, MemGraph};
use trail_test_harness::{collect_paths, grid, make_enumerator, route, scenario_a, FailingProvider};

fn k_shortest() -> EnumeratorConfig {
    EnumeratorConfig::new(PathType::KShortestPaths)
}

fn options() -> PathValidatorOptions {
    PathValidatorOptions::new(UniquenessLevel::PathVertex)
}

#[test]
fn test_forbidden_vertices() {
    let graph = scenario_a();
    let mut enumerator = make_enumerator(&graph, DocumentMode::Eager, k_shortest(), None).unwrap();
    let forbidden: FxHashSet<VertexRef> = ["v/B".into()].into_iter().collect();
    enumerator.set_forbidden_vertices(Some(Arc::new(forbidden)));
    enumerator.reset("v/A".into(), "v/D".into(), 0).unwrap();

    let paths = collect_paths(&mut enumerator, usize::MAX).unwrap();
    assert_eq!(paths.len(), 1);
    assert_eq!(route(&paths[0]), vec!["v/A", "v/C", "v/D"]);

    // The set outlives a reset and can be lifted
    enumerator.set_forbidden_vertices(None);
    enumerator.reset("v/A".into(), "v/D".into(), 0).unwrap();
    assert_eq!(collect_paths(&mut enumerator, usize::MAX).unwrap().len(), 2);
}

#[test]
fn test_forbidden_edges() {
    let graph = scenario_a();
    let mut enumerator = make_enumerator(&graph, DocumentMode::Eager, k_shortest(), None).unwrap();
    let forbidden: FxHashSet<EdgeRef> = ["e/CD".into()].into_iter().collect();
    enumerator.set_forbidden_edges(Some(Arc::new(forbidden)));
    enumerator.reset("v/A".into(), "v/D".into(), 0).unwrap();

    let paths = collect_paths(&mut enumerator, usize::MAX).unwrap();
    assert_eq!(paths.len(), 1);
    assert_eq!(route(&paths[0]), vec!["v/A", "v/B", "v/D"]);
}

#[test]
fn test_vertex_filter() {
    let graph = scenario_a();
    let filter = options().with_vertex_filter(Expression::new("not B", |ctx| {
        Ok(ctx.vertex.as_str() != "v/B")
    }));
    let mut enumerator =
        make_enumerator(&graph, DocumentMode::Eager, k_shortest(), Some(filter)).unwrap();
    enumerator.reset("v/A".into(), "v/D".into(), 0).unwrap();

    let paths = collect_paths(&mut enumerator, usize::MAX).unwrap();
    assert_eq!(paths.len(), 1);
    assert_eq!(route(&paths[0]), vec!["v/A", "v/C", "v/D"]);
}

#[test]
fn test_depth_filter_counts_from_each_center() {
    let graph = scenario_a();
    let not_c = options().with_depth_filter(1, Expression::new("not C at 1", |ctx| {
        Ok(ctx.vertex.as_str() != "v/C")
    }));
    let mut enumerator =
        make_enumerator(&graph, DocumentMode::Eager, k_shortest(), Some(not_c)).unwrap();
    enumerator.reset("v/A".into(), "v/D".into(), 0).unwrap();
    let paths = collect_paths(&mut enumerator, usize::MAX).unwrap();
    assert_eq!(paths.len(), 1);
    assert_eq!(route(&paths[0]), vec!["v/A", "v/B", "v/D"]);

    // D is two edges from the source but the backward ball's center
    let not_d = options().with_depth_filter(2, Expression::new("not D at 2", |ctx| {
        Ok(ctx.vertex.as_str() != "v/D")
    }));
    let mut enumerator =
        make_enumerator(&graph, DocumentMode::Eager, k_shortest(), Some(not_d)).unwrap();
    enumerator.reset("v/A".into(), "v/D".into(), 0).unwrap();
    assert_eq!(collect_paths(&mut enumerator, usize::MAX).unwrap().len(), 2);
}

#[test]
fn test_pruned_vertex_still_joins_halves() {
    let graph = MemGraph::new();
    graph.add_edge("e/AB", "v/A", "v/B", 1.0);
    graph.add_edge("e/BC", "v/B", "v/C", 1.0);
    graph.add_edge("e/CD", "v/C", "v/D", 1.0);
    graph.add_edge("e/BE", "v/B", "v/E", 1.0);

    let prune_b = options().with_prune(Expression::new("stop at B", |ctx| {
        Ok(ctx.vertex.as_str() == "v/B")
    }));
    let mut enumerator =
        make_enumerator(&graph, DocumentMode::Eager, k_shortest(), Some(prune_b)).unwrap();
    enumerator.reset("v/A".into(), "v/D".into(), 0).unwrap();

    // Neither ball expands B, they meet there
    let paths = collect_paths(&mut enumerator, usize::MAX).unwrap();
    assert_eq!(paths.len(), 1);
    assert_eq!(route(&paths[0]), vec!["v/A", "v/B", "v/C", "v/D"]);
    assert_eq!(enumerator.steal_stats().steps_pruned, 2);

    // Past B only the backward ball can walk
    enumerator.reset("v/A".into(), "v/E".into(), 0).unwrap();
    let paths = collect_paths(&mut enumerator, usize::MAX).unwrap();
    assert_eq!(paths.len(), 1);
    assert_eq!(route(&paths[0]), vec!["v/A", "v/B", "v/E"]);
}

#[test]
fn test_reset_depth_offsets_source() {
    let graph = scenario_a();
    let config = k_shortest().with_depth(3, Some(3));
    let mut enumerator = make_enumerator(&graph, DocumentMode::Eager, config, None).unwrap();

    enumerator.reset("v/A".into(), "v/D".into(), 0).unwrap();
    assert!(collect_paths(&mut enumerator, usize::MAX).unwrap().is_empty());

    // One edge already walked in front of the source
    enumerator.reset("v/A".into(), "v/D".into(), 1).unwrap();
    let paths = collect_paths(&mut enumerator, usize::MAX).unwrap();
    assert_eq!(paths.len(), 2);
    assert!(paths.iter().all(|p| p.len() == 2));

    enumerator.reset("v/A".into(), "v/D".into(), 2).unwrap();
    assert!(collect_paths(&mut enumerator, usize::MAX).unwrap().is_empty());
}

#[test]
fn test_backward_options_apply_to_target_side() {
    let graph = scenario_a();
    let center_only = options()
        .with_vertex_filter(Expression::new("center only", |ctx| Ok(ctx.depth == 0)))
        .with_post_filter(PathExpression::new("reject all", |_| Ok(false)));

    let mut enumerator = EnumeratorBuilder::new(k_shortest())
        .with_backward_options(center_only)
        .build(
            graph.provider(DocumentMode::Eager),
            graph.provider(DocumentMode::Eager),
        )
        .unwrap();
    enumerator.reset("v/A".into(), "v/D".into(), 0).unwrap();

    // The forward ball walks all the way; only forward options post-filter
    let paths = collect_paths(&mut enumerator, usize::MAX).unwrap();
    assert_eq!(paths.len(), 2);
    let stats = enumerator.steal_stats();
    assert_eq!(stats.steps_filtered, 2);
    assert_eq!(stats.paths_filtered, 0);
}

fn blocked_graph() -> MemGraph {
    let graph = scenario_a();
    graph.set_document(&"v/B".into(), json!({"blocked": true})).unwrap();
    graph
}

fn not_blocked() -> PathValidatorOptions {
    options().with_vertex_filter(Expression::new("not blocked", |ctx| {
        Ok(ctx.attribute("blocked") != Some(&json!(true)))
    }))
}

#[test]
fn test_document_filter_eager_and_lazy() {
    for mode in [DocumentMode::Eager, DocumentMode::Lazy] {
        let graph = blocked_graph();
        let mut enumerator =
            make_enumerator(&graph, mode, k_shortest(), Some(not_blocked())).unwrap();
        enumerator.reset("v/A".into(), "v/D".into(), 0).unwrap();

        let paths = collect_paths(&mut enumerator, usize::MAX).unwrap();
        assert_eq!(paths.len(), 1, "mode {:?}", mode);
        assert_eq!(route(&paths[0]), vec!["v/A", "v/C", "v/D"]);
    }
}

#[test]
fn test_allowed_collections() {
    let graph = MemGraph::new();
    graph.add_edge("e/1", "v/A", "hub/X", 1.0);
    graph.add_edge("e/2", "hub/X", "v/D", 1.0);
    graph.add_edge("e/3", "v/A", "v/B", 2.0);
    graph.add_edge("e/4", "v/B", "v/D", 2.0);

    let restricted = options().with_allowed_collections(["v"]);
    let mut enumerator =
        make_enumerator(&graph, DocumentMode::Eager, k_shortest(), Some(restricted)).unwrap();
    enumerator.reset("v/A".into(), "v/D".into(), 0).unwrap();

    let paths = collect_paths(&mut enumerator, usize::MAX).unwrap();
    assert_eq!(paths.len(), 1);
    assert_eq!(route(&paths[0]), vec!["v/A", "v/B", "v/D"]);
}

#[test]
fn test_post_filter_consumes_rejected_paths() {
    let graph = scenario_a();
    let light = options().with_post_filter(PathExpression::new("light", |p| Ok(p.weight < 3.0)));
    let mut enumerator =
        make_enumerator(&graph, DocumentMode::Eager, k_shortest(), Some(light)).unwrap();
    enumerator.reset("v/A".into(), "v/D".into(), 0).unwrap();

    let paths = collect_paths(&mut enumerator, usize::MAX).unwrap();
    assert_eq!(paths.len(), 1);
    assert_eq!(paths[0].weight, 2.0);
    assert_eq!(enumerator.steal_stats().paths_filtered, 1);
}

#[test]
fn test_lazy_documents_match_eager() {
    let graph = grid(3);
    let run = |mode: DocumentMode| {
        let mut enumerator = make_enumerator(&graph, mode, k_shortest(), None).unwrap();
        enumerator.reset("cell/0_0".into(), "cell/2_2".into(), 0).unwrap();
        let paths = collect_paths(&mut enumerator, usize::MAX).unwrap();
        (paths, enumerator.steal_stats())
    };

    let (eager, eager_stats) = run(DocumentMode::Eager);
    let (lazy, lazy_stats) = run(DocumentMode::Lazy);
    assert_eq!(eager, lazy);
    assert!(lazy
        .iter()
        .all(|p| p.documents.iter().all(|d| d.is_some())));

    assert_eq!(eager_stats.provider.round_trips, 0);
    // Loose ends are fetched in batches, not one vertex at a time
    assert!(lazy_stats.provider.round_trips > 0);
    assert!(lazy_stats.provider.documents_fetched > lazy_stats.provider.round_trips);
}

#[test]
fn test_steal_stats_resets() {
    let graph = scenario_a();
    let mut enumerator = make_enumerator(&graph, DocumentMode::Eager, k_shortest(), None).unwrap();
    enumerator.reset("v/A".into(), "v/D".into(), 0).unwrap();
    collect_paths(&mut enumerator, usize::MAX).unwrap();

    let stats = enumerator.steal_stats();
    assert_eq!(stats.paths_produced, 2);
    assert!(stats.steps_created > 0);
    assert!(stats.candidates_produced >= 2);
    assert!(stats.provider.expansions > 0);
    assert!(stats.provider.scanned_index > 0);

    assert_eq!(enumerator.steal_stats(), EnumeratorStats::default());
}

#[test]
fn test_destroy_engines_idempotent() {
    let graph = scenario_a();
    let forward = FailingProvider::new(graph.provider(DocumentMode::Eager));
    let backward = FailingProvider::new(graph.provider(DocumentMode::Eager));
    let forward_calls = forward.destroy_calls.clone();
    let backward_calls = backward.destroy_calls.clone();

    let mut enumerator = EnumeratorBuilder::new(k_shortest())
        .build(forward, backward)
        .unwrap();
    enumerator.reset("v/A".into(), "v/D".into(), 0).unwrap();
    assert!(!enumerator.is_done());

    enumerator.destroy_engines();
    enumerator.destroy_engines();
    assert!(enumerator.is_done());
    assert!(!enumerator.skip_path().unwrap());
    drop(enumerator);

    assert_eq!(forward_calls.load(Ordering::SeqCst), 1);
    assert_eq!(backward_calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_drop_releases_engines() {
    let graph = scenario_a();
    let forward = FailingProvider::new(graph.provider(DocumentMode::Eager));
    let calls = forward.destroy_calls.clone();

    let enumerator = EnumeratorBuilder::new(k_shortest())
        .build(forward, graph.provider(DocumentMode::Eager))
        .unwrap();
    drop(enumerator);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_memory_released_on_reset() {
    let graph = grid(3);
    let mut enumerator = make_enumerator(&graph, DocumentMode::Eager, k_shortest(), None).unwrap();
    enumerator.reset("cell/0_0".into(), "cell/2_2".into(), 0).unwrap();
    collect_paths(&mut enumerator, 3).unwrap();
    let busy = enumerator.memory_used();

    enumerator.reset("cell/0_0".into(), "cell/0_0".into(), 0).unwrap();
    assert!(enumerator.memory_used() < busy);
}

#[test]
fn test_trace_report_when_enabled() {
    let graph = scenario_a();
    let config = k_shortest().with_tracing(true);
    let mut enumerator = make_enumerator(&graph, DocumentMode::Eager, config, None).unwrap();
    enumerator.reset("v/A".into(), "v/D".into(), 0).unwrap();
    collect_paths(&mut enumerator, usize::MAX).unwrap();

    let report = enumerator.trace_report().unwrap();
    let expand = report
        .iter()
        .find(|(name, _)| *name == "provider.expand")
        .map(|(_, entry)| entry.calls)
        .unwrap();
    assert_eq!(expand, enumerator.steal_stats().provider.expansions);
}
