//! Graph generation for benchmarks

use rand::prelude::*;
use serde_json::json;
use trail_storage::MemGraph;

pub const LAYERED_SOURCE: &str = "node/source";
pub const LAYERED_TARGET: &str = "node/target";

/// Vertex id of a grid cell
pub fn grid_cell(x: usize, y: usize) -> String {
    format!("cell/{}_{}", x, y)
}

/// Square grid with roads in both directions and seeded random weights
///
/// Every cell carries a `{"x", "y", "toll"}` document.
pub fn weighted_grid(size: usize, seed: u64) -> MemGraph {
    let mut rng = StdRng::seed_from_u64(seed);
    let graph = MemGraph::new();
    let mut next_edge = 0usize;
    let mut road = |graph: &MemGraph, rng: &mut StdRng, from: &str, to: &str| {
        graph.add_edge(
            format!("road/{}", next_edge),
            from,
            to,
            rng.gen_range(0.5..2.0),
        );
        next_edge += 1;
    };

    for y in 0..size {
        for x in 0..size {
            let toll: bool = rng.gen_bool(0.1);
            graph.add_vertex(grid_cell(x, y), Some(json!({"x": x, "y": y, "toll": toll})));
        }
    }
    for y in 0..size {
        for x in 0..size {
            let here = grid_cell(x, y);
            if x + 1 < size {
                let right = grid_cell(x + 1, y);
                road(&graph, &mut rng, &here, &right);
                road(&graph, &mut rng, &right, &here);
            }
            if y + 1 < size {
                let down = grid_cell(x, y + 1);
                road(&graph, &mut rng, &here, &down);
                road(&graph, &mut rng, &down, &here);
            }
        }
    }
    graph
}

/// Acyclic layered graph between [`LAYERED_SOURCE`] and [`LAYERED_TARGET`]
///
/// The source links to the whole first layer, every vertex links to
/// `fanout` distinct vertices of the next layer and the last layer links to
/// the target.
pub fn layered(layers: usize, width: usize, fanout: usize, seed: u64) -> MemGraph {
    let mut rng = StdRng::seed_from_u64(seed);
    let graph = MemGraph::new();
    let fanout = fanout.min(width);
    let node = |layer: usize, i: usize| format!("node/{}_{}", layer, i);

    graph.add_vertex(LAYERED_SOURCE, Some(json!({"layer": "source"})));
    graph.add_vertex(LAYERED_TARGET, Some(json!({"layer": "target"})));
    for layer in 0..layers {
        for i in 0..width {
            graph.add_vertex(node(layer, i), Some(json!({"layer": layer, "slot": i})));
        }
    }

    if layers == 0 {
        return graph;
    }

    let mut next_edge = 0usize;
    let mut link = |from: &str, to: &str, weight: f64| {
        graph.add_edge(format!("link/{}", next_edge), from, to, weight);
        next_edge += 1;
    };
    for i in 0..width {
        link(LAYERED_SOURCE, &node(0, i), rng.gen_range(1.0..4.0));
        link(&node(layers - 1, i), LAYERED_TARGET, rng.gen_range(1.0..4.0));
    }
    for layer in 0..layers - 1 {
        for i in 0..width {
            for j in rand::seq::index::sample(&mut rng, width, fanout).into_iter() {
                link(&node(layer, i), &node(layer + 1, j), rng.gen_range(1.0..4.0));
            }
        }
    }
    graph
}
