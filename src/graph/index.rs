//! In-memory interaction graph backed by a petgraph arena.
//!
//! Vertices are arena nodes and half-edges are arena edges. An identifier
//! index gives O(1) lookup from rxcui to node; a vertex's adjacency is its set
//! of outgoing arena edges, at most one per neighbor.

use std::collections::HashMap;

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;

use super::{HalfEdge, Interaction, InteractionRecord, Severity, Vertex};

/// Graph Store for one query session.
///
/// Built incrementally from [`InteractionRecord`]s and discarded once the
/// query it serves is answered; nothing here is persisted.
#[derive(Debug, Default)]
pub struct InteractionGraph {
    /// Nodes carry vertices, edges carry the interaction payload.
    graph: DiGraph<Vertex, Interaction>,
    /// Identifier → NodeIndex.
    node_index: HashMap<String, NodeIndex>,
    /// Number of `add_edge` calls, duplicates included.
    record_count: usize,
}

impl InteractionGraph {
    /// Create a new empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    fn ensure_vertex(&mut self, id: &str, name: &str) -> NodeIndex {
        if let Some(&idx) = self.node_index.get(id) {
            return idx;
        }
        let idx = self.graph.add_node(Vertex::new(id, name));
        self.node_index.insert(id.to_string(), idx);
        idx
    }

    /// Insert a vertex unless `id` is already present.
    ///
    /// Returns the stored vertex; on re-insertion the first display name wins.
    pub fn add_vertex(&mut self, id: &str, name: &str) -> &Vertex {
        let idx = self.ensure_vertex(id, name);
        &self.graph[idx]
    }

    /// Record one relationship between `id_a` and `id_b`.
    ///
    /// Creates missing endpoints, then stores a half-edge in each direction.
    /// Repeating the call for the same pair replaces the stored half-edges
    /// (last write wins per direction).
    #[allow(clippy::too_many_arguments)]
    pub fn add_edge(
        &mut self,
        id_a: &str,
        name_a: &str,
        id_b: &str,
        name_b: &str,
        provenance: &str,
        severity: impl Into<Severity>,
        description: &str,
    ) {
        let interaction = Interaction::new(provenance, severity, description);
        self.insert_pair(id_a, name_a, id_b, name_b, interaction);
    }

    /// Ingest a single parsed record.
    pub fn add_record(&mut self, record: &InteractionRecord) {
        self.insert_pair(
            &record.a.id,
            &record.a.name,
            &record.b.id,
            &record.b.name,
            record.interaction(),
        );
    }

    /// Ingest every record, returning how many were applied.
    pub fn ingest<'r>(&mut self, records: impl IntoIterator<Item = &'r InteractionRecord>) -> usize {
        let before = self.record_count;
        for record in records {
            self.add_record(record);
        }
        let applied = self.record_count - before;
        tracing::debug!(
            applied,
            vertices = self.vertex_count(),
            half_edges = self.half_edge_count(),
            "ingested interaction records"
        );
        applied
    }

    fn insert_pair(
        &mut self,
        id_a: &str,
        name_a: &str,
        id_b: &str,
        name_b: &str,
        interaction: Interaction,
    ) {
        let a = self.ensure_vertex(id_a, name_a);
        let b = self.ensure_vertex(id_b, name_b);
        self.graph.update_edge(a, b, interaction.clone());
        self.graph.update_edge(b, a, interaction);
        self.record_count += 1;
    }

    /// Look up a vertex by identifier.
    pub fn vertex(&self, id: &str) -> Option<&Vertex> {
        self.node_index.get(id).map(|&idx| &self.graph[idx])
    }

    /// Check if a vertex exists.
    pub fn has_vertex(&self, id: &str) -> bool {
        self.node_index.contains_key(id)
    }

    /// Number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of stored half-edges (two per distinct related pair).
    pub fn half_edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Number of relationships ingested, duplicates included.
    pub fn record_count(&self) -> usize {
        self.record_count
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// All vertices, in insertion order.
    pub fn vertices(&self) -> impl Iterator<Item = &Vertex> {
        self.graph.node_weights()
    }

    /// All vertex identifiers: the sampling population.
    pub fn vertex_ids(&self) -> Vec<String> {
        self.graph.node_weights().map(|v| v.id.clone()).collect()
    }

    /// Identifiers adjacent to `id`. Empty if `id` is unknown.
    pub fn neighbors(&self, id: &str) -> Vec<&str> {
        match self.node_index.get(id) {
            Some(&idx) => self
                .graph
                .neighbors_directed(idx, Direction::Outgoing)
                .map(|n| self.graph[n].id.as_str())
                .collect(),
            None => vec![],
        }
    }

    /// Outgoing half-edges of `id`, one per neighbor.
    pub fn adjacency(&self, id: &str) -> Vec<HalfEdge<'_>> {
        let Some(&idx) = self.node_index.get(id) else {
            return vec![];
        };
        self.graph
            .edges_directed(idx, Direction::Outgoing)
            .map(|e| HalfEdge {
                source: &self.graph[e.source()],
                destination: &self.graph[e.target()],
                interaction: e.weight(),
            })
            .collect()
    }

    /// The half-edge stored under `from`'s adjacency for neighbor `to`.
    pub fn half_edge(&self, from: &str, to: &str) -> Option<HalfEdge<'_>> {
        let a = *self.node_index.get(from)?;
        let b = *self.node_index.get(to)?;
        let edge = self.graph.find_edge(a, b)?;
        Some(HalfEdge {
            source: &self.graph[a],
            destination: &self.graph[b],
            interaction: &self.graph[edge],
        })
    }

    /// Every half-edge in the graph.
    pub fn half_edges(&self) -> Vec<HalfEdge<'_>> {
        self.graph
            .edge_references()
            .map(|e| HalfEdge {
                source: &self.graph[e.source()],
                destination: &self.graph[e.target()],
                interaction: e.weight(),
            })
            .collect()
    }

    pub(crate) fn node(&self, id: &str) -> Option<NodeIndex> {
        self.node_index.get(id).copied()
    }

    pub(crate) fn arena(&self) -> &DiGraph<Vertex, Interaction> {
        &self.graph
    }
}
