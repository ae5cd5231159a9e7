//! Export types for handing a built graph to rendering collaborators.
//!
//! The snapshot is a two-level map: each vertex lists its display name and,
//! per neighbor, the neighbor's name plus the interaction stored on that
//! half-edge. It is an output view only; graphs are never reloaded from it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::graph::{InteractionGraph, Severity};

/// One neighbor entry in a [`VertexExport`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeighborExport {
    /// Neighbor display name.
    pub name: String,
    /// Source that reported the interaction.
    pub provenance: String,
    pub severity: Severity,
    pub description: String,
}

/// Exported vertex with its adjacency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VertexExport {
    pub name: String,
    /// Neighbor identifier → interaction on the half-edge toward it.
    pub neighbors: BTreeMap<String, NeighborExport>,
}

/// Whole-graph snapshot keyed by vertex identifier.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphExport {
    pub vertices: BTreeMap<String, VertexExport>,
}

impl GraphExport {
    /// Snapshot every vertex and half-edge of `graph`.
    pub fn from_graph(graph: &InteractionGraph) -> Self {
        let vertices = graph
            .vertices()
            .map(|v| {
                let neighbors = graph
                    .adjacency(&v.id)
                    .into_iter()
                    .map(|edge| {
                        (
                            edge.destination.id.clone(),
                            NeighborExport {
                                name: edge.destination.name.clone(),
                                provenance: edge.interaction.provenance.clone(),
                                severity: edge.interaction.severity.clone(),
                                description: edge.interaction.description.clone(),
                            },
                        )
                    })
                    .collect();
                (
                    v.id.clone(),
                    VertexExport {
                        name: v.name.clone(),
                        neighbors,
                    },
                )
            })
            .collect();
        Self { vertices }
    }

    /// Pretty-printed JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
