//! Trail Provider Implementations
//!
//! This crate provides concrete implementations of the `Provider` trait
//! from `trail-core`.
//!
//! # Available Providers
//!
//! - `MemGraphProvider`: In-memory adjacency lists over a shared `MemGraph`
//!   (for testing, benchmarking and embedded use). Documents are either
//!   available immediately or only through batched fetches, and edges are
//!   weighed by their stored weight or by a document attribute.

// Configure WASM tests to run in browser
#[cfg(all(target_arch = "wasm32", test))]
wasm_bindgen_test::wasm_bindgen_test_configure!(run_in_browser);

pub mod mem;

// Re-export the trait from trail-core
pub use trail_core::{Provider, ProviderError, ProviderStats, Resolution};

// Re-export implementations
pub use mem::{DocumentMode, EdgeWeight, MemGraph, MemGraphProvider};
