//! Graph access module
//!
//! The search engine reaches the graph only through the [`Provider`] trait.
//! Concrete providers live outside this crate (see `trail-storage`); this
//! module holds the trait and its tracing decorator.

pub mod provider;
pub mod traced;

pub use provider::{Neighbour, Provider, Resolution};
pub use traced::TracedProvider;
