//! Interaction graph: entities joined by provenance- and severity-annotated edges.
//!
//! - **Store** ([`InteractionGraph`]): `petgraph` arena holding vertices and half-edges
//! - **Finder** ([`traverse`]): breadth-first hop distance between two identifiers
//! - **Estimator** ([`sampling`]): convergent Monte-Carlo mean distance from one reference
//! - **Analytics** ([`analytics`]): degree, components and severity summaries
//!
//! Every ingested relationship is stored as two directed half-edges carrying the
//! same [`Interaction`], so the graph reads as undirected.

pub mod analytics;
pub mod index;
pub mod sampling;
pub mod traverse;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::GraphError;

pub use index::InteractionGraph;

/// Result type for graph operations.
pub type GraphResult<T> = std::result::Result<T, GraphError>;

/// One entity in the graph, keyed by an opaque identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vertex {
    /// Unique key within a graph (an rxcui for drug data).
    pub id: String,
    /// Display label. Not required to be unique.
    pub name: String,
}

impl Vertex {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Strength of an interaction as reported by its source.
///
/// Parsing is lossless: only the canonical labels (`high`, `moderate`, `low`,
/// `N/A`) become named variants. Every other spelling, including synonyms such
/// as `Major` or `na`, is kept verbatim in [`Severity::Other`] so exports and
/// histograms show what the source said. [`Severity::level`] folds synonyms
/// for ranking.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Severity {
    High,
    Moderate,
    Low,
    NotAvailable,
    Other(String),
}

impl Severity {
    /// Canonical level, folding case and known synonyms of a verbatim label.
    /// Unrecognised labels stay as they are.
    pub fn level(&self) -> Severity {
        let Severity::Other(label) = self else {
            return self.clone();
        };
        match label.to_ascii_lowercase().as_str() {
            "high" | "major" => Severity::High,
            "moderate" => Severity::Moderate,
            "low" | "minor" => Severity::Low,
            "" | "n/a" | "na" => Severity::NotAvailable,
            _ => self.clone(),
        }
    }

    /// Ordinal rank for sorting; unknown labels rank with `NotAvailable`.
    pub fn rank(&self) -> u8 {
        match self.level() {
            Severity::High => 3,
            Severity::Moderate => 2,
            Severity::Low => 1,
            Severity::NotAvailable | Severity::Other(_) => 0,
        }
    }
}

impl From<&str> for Severity {
    fn from(raw: &str) -> Self {
        match raw.trim() {
            "high" => Severity::High,
            "moderate" => Severity::Moderate,
            "low" => Severity::Low,
            "N/A" => Severity::NotAvailable,
            label => Severity::Other(label.to_string()),
        }
    }
}

impl From<String> for Severity {
    fn from(raw: String) -> Self {
        Severity::from(raw.as_str())
    }
}

impl From<Severity> for String {
    fn from(severity: Severity) -> Self {
        severity.to_string()
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::High => f.write_str("high"),
            Severity::Moderate => f.write_str("moderate"),
            Severity::Low => f.write_str("low"),
            Severity::NotAvailable => f.write_str("N/A"),
            Severity::Other(label) => f.write_str(label),
        }
    }
}

/// Payload shared by both half-edges of one relationship.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interaction {
    /// Name of the data source that reported the interaction.
    pub provenance: String,
    pub severity: Severity,
    /// Free-text rationale.
    pub description: String,
}

impl Interaction {
    pub fn new(
        provenance: impl Into<String>,
        severity: impl Into<Severity>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            provenance: provenance.into(),
            severity: severity.into(),
            description: description.into(),
        }
    }
}

/// Identifier and display name of one side of a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    pub id: String,
    pub name: String,
}

impl Endpoint {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// A parsed pairwise interaction, the only shape the store ingests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionRecord {
    pub a: Endpoint,
    pub b: Endpoint,
    pub provenance: String,
    pub severity: Severity,
    pub description: String,
}

impl InteractionRecord {
    pub fn new(a: Endpoint, b: Endpoint, interaction: Interaction) -> Self {
        Self {
            a,
            b,
            provenance: interaction.provenance,
            severity: interaction.severity,
            description: interaction.description,
        }
    }

    /// The payload both half-edges will carry.
    pub fn interaction(&self) -> Interaction {
        Interaction {
            provenance: self.provenance.clone(),
            severity: self.severity.clone(),
            description: self.description.clone(),
        }
    }
}

/// Borrowed view of one directed half-edge.
#[derive(Debug, Clone, Copy)]
pub struct HalfEdge<'g> {
    pub source: &'g Vertex,
    pub destination: &'g Vertex,
    pub interaction: &'g Interaction,
}
