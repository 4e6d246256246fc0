//! Helper functions for enumerator tests

use serde_json::json;
use trail_core::{
    EnumeratorBuilder, EnumeratorConfig, PathResult, PathValidatorOptions, TrailResult,
    WeightedTwoSidedEnumerator,
};
use trail_storage::{DocumentMode, MemGraph};

/// A→B(1), B→D(1), A→C(1), C→D(3)
pub fn scenario_a() -> MemGraph {
    let graph = MemGraph::new();
    graph.add_edge("e/AB", "v/A", "v/B", 1.0);
    graph.add_edge("e/BD", "v/B", "v/D", 1.0);
    graph.add_edge("e/AC", "v/A", "v/C", 1.0);
    graph.add_edge("e/CD", "v/C", "v/D", 3.0);
    graph
}

/// Two parallel edges A→B with weights 1 and 2
pub fn scenario_b() -> MemGraph {
    let graph = MemGraph::new();
    graph.add_edge("e/1", "v/A", "v/B", 1.0);
    graph.add_edge("e/2", "v/A", "v/B", 2.0);
    graph
}

/// A single vertex with a self-contained neighbourhood, for source == target
pub fn scenario_c() -> MemGraph {
    let graph = MemGraph::new();
    graph.add_edge("e/AB", "v/A", "v/B", 1.0);
    graph.add_edge("e/BA", "v/B", "v/A", 1.0);
    graph
}

/// Two components: A→B and C→D; D is unreachable from A
pub fn scenario_d() -> MemGraph {
    let graph = MemGraph::new();
    graph.add_edge("e/AB", "v/A", "v/B", 1.0);
    graph.add_edge("e/CD", "v/C", "v/D", 1.0);
    graph
}

/// Edge list of a `size`×`size` grid with integer weights
///
/// Every cell links to its right and lower neighbour, and back again with
/// one extra unit of weight, so the graph is full of cycles.
pub fn grid_edges(size: usize) -> Vec<(String, String, String, f64)> {
    let cell = |x: usize, y: usize| format!("cell/{}_{}", x, y);
    let mut edges = Vec::new();
    for y in 0..size {
        for x in 0..size {
            if x + 1 < size {
                let w = 1.0 + ((x * 7 + y * 3) % 4) as f64;
                edges.push((format!("road/r{}_{}", x, y), cell(x, y), cell(x + 1, y), w));
                edges.push((format!("road/l{}_{}", x, y), cell(x + 1, y), cell(x, y), w + 1.0));
            }
            if y + 1 < size {
                let w = 1.0 + ((x * 5 + y * 11) % 3) as f64;
                edges.push((format!("road/d{}_{}", x, y), cell(x, y), cell(x, y + 1), w));
                edges.push((format!("road/u{}_{}", x, y), cell(x, y + 1), cell(x, y), w + 1.0));
            }
        }
    }
    edges
}

/// Grid graph from [`grid_edges`]; every cell carries `{"x": .., "y": ..}`
pub fn grid(size: usize) -> MemGraph {
    let graph = MemGraph::new();
    for y in 0..size {
        for x in 0..size {
            graph.add_vertex(format!("cell/{}_{}", x, y), Some(json!({"x": x, "y": y})));
        }
    }
    for (id, from, to, weight) in grid_edges(size) {
        graph.add_edge(id, from, to, weight);
    }
    graph
}

/// Every simple path from `source` to `target` by depth-first search, as
/// `(edge ids, weight)`
pub fn simple_paths(
    edges: &[(String, String, String, f64)],
    source: &str,
    target: &str,
) -> Vec<(Vec<String>, f64)> {
    fn walk<'a>(
        edges: &'a [(String, String, String, f64)],
        at: &'a str,
        target: &str,
        visited: &mut Vec<&'a str>,
        trail: &mut Vec<&'a str>,
        weight: f64,
        out: &mut Vec<(Vec<String>, f64)>,
    ) {
        if at == target {
            out.push((trail.iter().map(|e| e.to_string()).collect(), weight));
            return;
        }
        for (id, from, to, w) in edges {
            if from == at && !visited.contains(&to.as_str()) {
                visited.push(to);
                trail.push(id);
                walk(edges, to, target, visited, trail, weight + w, out);
                trail.pop();
                visited.pop();
            }
        }
    }

    let mut out = Vec::new();
    let mut visited = vec![source];
    walk(edges, source, target, &mut visited, &mut Vec::new(), 0.0, &mut out);
    out
}

/// Build an enumerator with one provider per ball over `graph`
pub fn make_enumerator(
    graph: &MemGraph,
    mode: DocumentMode,
    config: EnumeratorConfig,
    options: Option<PathValidatorOptions>,
) -> TrailResult<WeightedTwoSidedEnumerator> {
    let mut builder = EnumeratorBuilder::new(config);
    if let Some(options) = options {
        builder = builder.with_options(options);
    }
    builder.build(graph.provider(mode), graph.provider(mode))
}

/// Pull up to `limit` paths
pub fn collect_paths(
    enumerator: &mut WeightedTwoSidedEnumerator,
    limit: usize,
) -> TrailResult<Vec<PathResult>> {
    let mut paths = Vec::new();
    while paths.len() < limit && enumerator.get_next_path(&mut paths)? {}
    Ok(paths)
}

/// Edge ids of a path, in order
pub fn edge_ids(path: &PathResult) -> Vec<String> {
    path.edges.iter().map(|e| e.as_str().to_string()).collect()
}

/// Vertex ids of a path, in order
pub fn route(path: &PathResult) -> Vec<&str> {
    path.vertices.iter().map(|v| v.as_str()).collect()
}

/// Install a test subscriber honouring `RUST_LOG`; safe to call repeatedly
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
