//! Graph summaries: degree, connected components and severity counts.
//!
//! All functions operate on an [`InteractionGraph`] reference and return
//! structured results sorted by relevance (degree desc, size desc, etc.).

use std::collections::BTreeMap;

use petgraph::algo::tarjan_scc;

use super::index::InteractionGraph;

// ---------------------------------------------------------------------------
// Degree
// ---------------------------------------------------------------------------

/// Neighbor count of a single vertex.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VertexDegree {
    pub id: String,
    pub name: String,
    /// Distinct neighbors (parallel records collapse into one).
    pub degree: usize,
}

/// Number of distinct neighbors of `id`, or `None` if it is not in the graph.
pub fn degree(graph: &InteractionGraph, id: &str) -> Option<usize> {
    graph.vertex(id).map(|_| graph.neighbors(id).len())
}

/// Degree of every vertex. Returns sorted by degree desc, then id.
pub fn degree_table(graph: &InteractionGraph) -> Vec<VertexDegree> {
    let mut results: Vec<VertexDegree> = graph
        .vertices()
        .map(|v| VertexDegree {
            id: v.id.clone(),
            name: v.name.clone(),
            degree: graph.neighbors(&v.id).len(),
        })
        .collect();
    results.sort_by(|a, b| b.degree.cmp(&a.degree).then_with(|| a.id.cmp(&b.id)));
    results
}

// ---------------------------------------------------------------------------
// Connected components
// ---------------------------------------------------------------------------

/// A connected component of the graph.
#[derive(Debug, Clone)]
pub struct ConnectedComponent {
    /// Component identifier (arbitrary, for display).
    pub id: usize,
    /// Member identifiers, sorted.
    pub members: Vec<String>,
    /// Number of members.
    pub size: usize,
}

/// Find connected components. Returns sorted by size desc.
///
/// Every relationship is stored in both directions, so strongly connected
/// components of the arena are exactly the undirected components.
pub fn connected_components(graph: &InteractionGraph) -> Vec<ConnectedComponent> {
    let arena = graph.arena();
    let mut components: Vec<ConnectedComponent> = tarjan_scc(arena)
        .into_iter()
        .map(|indices| {
            let mut members: Vec<String> =
                indices.iter().map(|&idx| arena[idx].id.clone()).collect();
            members.sort();
            let size = members.len();
            ConnectedComponent {
                id: 0,
                members,
                size,
            }
        })
        .collect();

    components.sort_by(|a, b| b.size.cmp(&a.size).then_with(|| a.members.cmp(&b.members)));
    for (id, component) in components.iter_mut().enumerate() {
        component.id = id;
    }
    components
}

// ---------------------------------------------------------------------------
// Severity histogram
// ---------------------------------------------------------------------------

/// Number of related pairs per severity label.
///
/// Each relationship is counted once even though it is stored as two half-edges.
pub fn severity_histogram(graph: &InteractionGraph) -> BTreeMap<String, usize> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for edge in graph.half_edges() {
        if edge.source.id <= edge.destination.id {
            *counts.entry(edge.interaction.severity.to_string()).or_default() += 1;
        }
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build_star_graph() -> InteractionGraph {
        // hub connects to spokes 2..=5
        let mut g = InteractionGraph::new();
        for spoke in 2..=5 {
            let s = spoke.to_string();
            g.add_edge("1", "hub", &s, &s, "test", "moderate", "");
        }
        g
    }

    #[test]
    fn hub_has_highest_degree() {
        let g = build_star_graph();
        let table = degree_table(&g);
        assert_eq!(table[0].id, "1");
        assert_eq!(table[0].degree, 4);
        assert!(table[1..].iter().all(|d| d.degree == 1));
        assert_eq!(degree(&g, "1"), Some(4));
        assert_eq!(degree(&g, "nope"), None);
    }

    #[test]
    fn parallel_records_do_not_inflate_degree() {
        let mut g = build_star_graph();
        g.add_edge("1", "hub", "2", "2", "other", "high", "");
        assert_eq!(degree(&g, "1"), Some(4));
    }

    #[test]
    fn components_split_disjoint_parts() {
        let mut g = build_star_graph();
        g.add_edge("x", "x", "y", "y", "test", "low", "");
        g.add_vertex("solo", "solo");

        let components = connected_components(&g);
        assert_eq!(components.len(), 3);
        assert_eq!(components[0].size, 5);
        assert_eq!(components[1].members, vec!["x", "y"]);
        assert_eq!(components[2].members, vec!["solo"]);
        assert_eq!(components[2].id, 2);
    }

    #[test]
    fn empty_graph_has_no_components() {
        let g = InteractionGraph::new();
        assert!(connected_components(&g).is_empty());
        assert!(severity_histogram(&g).is_empty());
    }

    #[test]
    fn histogram_counts_pairs_once() {
        let mut g = build_star_graph();
        g.add_edge("2", "2", "3", "3", "test", "high", "");
        let hist = severity_histogram(&g);
        assert_eq!(hist.get("moderate"), Some(&4));
        assert_eq!(hist.get("high"), Some(&1));
    }

    #[test]
    fn histogram_keys_keep_source_labels() {
        let mut g = InteractionGraph::new();
        g.add_edge("1", "x", "2", "y", "DrugBank", "Major", "");
        g.add_edge("2", "y", "3", "z", "DrugBank", "na", "");
        let hist = severity_histogram(&g);
        assert_eq!(hist.get("Major"), Some(&1));
        assert_eq!(hist.get("na"), Some(&1));
        assert!(!hist.contains_key("high"));
        assert!(!hist.contains_key("N/A"));
    }
}
