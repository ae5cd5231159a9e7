//! Turning upstream documents into [`InteractionRecord`]s.
//!
//! The store only accepts parsed records. This module reads the two shapes
//! records arrive in: the interaction-list JSON returned by the drug
//! interaction service, and a plain JSON array of records on disk.

use std::path::Path;

use serde_json::Value;

use crate::error::GraphError;
use crate::graph::{Endpoint, GraphResult, Interaction, InteractionRecord};

fn field<'v>(value: &'v Value, key: &str, context: &str) -> GraphResult<&'v Value> {
    value.get(key).ok_or_else(|| GraphError::MalformedRecord {
        message: format!("{context}: missing `{key}`"),
    })
}

fn text(value: &Value, key: &str, context: &str) -> GraphResult<String> {
    field(value, key, context)?
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| GraphError::MalformedRecord {
            message: format!("{context}: `{key}` is not a string"),
        })
}

fn array<'v>(value: &'v Value, key: &str, context: &str) -> GraphResult<&'v Vec<Value>> {
    field(value, key, context)?
        .as_array()
        .ok_or_else(|| GraphError::MalformedRecord {
            message: format!("{context}: `{key}` is not an array"),
        })
}

fn concept(pair: &[Value], position: usize, context: &str) -> GraphResult<Endpoint> {
    let concept = pair.get(position).ok_or_else(|| GraphError::MalformedRecord {
        message: format!("{context}: minConcept has no entry {position}"),
    })?;
    Ok(Endpoint::new(
        text(concept, "rxcui", context)?,
        text(concept, "name", context)?,
    ))
}

/// Parse an interaction-list document.
///
/// Each `fullInteractionType` yields one record between its first two
/// `minConcept`s, annotated with the group's `sourceName` and the first
/// `interactionPair`'s severity and description. A document without
/// `fullInteractionTypeGroup` means no interactions were found; any other
/// missing field is an error.
pub fn parse_interaction_list(document: &Value) -> GraphResult<Vec<InteractionRecord>> {
    let Some(groups) = document.get("fullInteractionTypeGroup") else {
        return Ok(vec![]);
    };
    let groups = groups.as_array().ok_or_else(|| GraphError::MalformedRecord {
        message: "`fullInteractionTypeGroup` is not an array".into(),
    })?;

    let mut records = Vec::new();
    for (g, group) in groups.iter().enumerate() {
        let group_ctx = format!("group {g}");
        let source = text(group, "sourceName", &group_ctx)?;
        for (t, kind) in array(group, "fullInteractionType", &group_ctx)?
            .iter()
            .enumerate()
        {
            let ctx = format!("group {g} type {t}");
            let concepts = array(kind, "minConcept", &ctx)?;
            let a = concept(concepts, 0, &ctx)?;
            let b = concept(concepts, 1, &ctx)?;
            let pair = array(kind, "interactionPair", &ctx)?
                .first()
                .ok_or_else(|| GraphError::MalformedRecord {
                    message: format!("{ctx}: interactionPair is empty"),
                })?;
            let severity = text(pair, "severity", &ctx)?;
            let description = text(pair, "description", &ctx)?;
            records.push(InteractionRecord::new(
                a,
                b,
                Interaction::new(source.clone(), severity, description),
            ));
        }
    }
    tracing::debug!(records = records.len(), "parsed interaction list");
    Ok(records)
}

/// Read a JSON array of records, or an interaction-list document, from `path`.
pub fn load_records(path: &Path) -> GraphResult<Vec<InteractionRecord>> {
    let content = std::fs::read_to_string(path).map_err(|e| GraphError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    let value: Value = serde_json::from_str(&content).map_err(|e| GraphError::MalformedRecord {
        message: format!("{}: {e}", path.display()),
    })?;
    if value.is_array() {
        serde_json::from_value(value).map_err(|e| GraphError::MalformedRecord {
            message: format!("{}: {e}", path.display()),
        })
    } else {
        parse_interaction_list(&value)
    }
}
