//! Test infrastructure for Trail path enumeration testing
//!
//! Provides reusable scenario graphs, a provider with failure injection,
//! and helpers for building enumerators and collecting their output.

pub mod failing_provider;
pub mod helpers;

pub use failing_provider::FailingProvider;
pub use helpers::{
    collect_paths, edge_ids, grid, grid_edges, init_tracing, make_enumerator, route, scenario_a,
    scenario_b, scenario_c, scenario_d, simple_paths,
};
