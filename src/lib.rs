// thiserror's #[error("...{field}...")] format strings reference struct fields,
// but the compiler doesn't see through the derive macro and reports false positives.
#![allow(unused_assignments)]

//! # rxgraph
//!
//! Drug interaction graphs: ingest pairwise interaction records, ask for the
//! hop distance between two drugs, and estimate the mean distance from one
//! drug to the rest of the graph by convergent random sampling.
//!
//! ## Architecture
//!
//! - **Graph store** (`graph`): petgraph arena of vertices and half-edges
//! - **Finder** (`graph::traverse`): breadth-first hop distance
//! - **Estimator** (`graph::sampling`): bounded Monte-Carlo mean distance
//! - **Resolution cache** (`resolve`, `store`): persisted name → rxcui lookups
//!
//! ## Library usage
//!
//! ```
//! use rxgraph::graph::InteractionGraph;
//! use rxgraph::graph::traverse::{shortest_path, PathLength};
//!
//! let mut graph = InteractionGraph::new();
//! graph.add_edge("A", "Aspirin", "B", "Warfarin", "DrugBank", "high", "bleeding risk");
//! graph.add_edge("B", "Warfarin", "C", "Ibuprofen", "DrugBank", "moderate", "");
//! assert_eq!(shortest_path(&graph, "A", "C"), PathLength::Found(2));
//! ```

pub mod config;
pub mod error;
pub mod export;
pub mod graph;
pub mod ingest;
pub mod paths;
pub mod resolve;
pub mod store;
