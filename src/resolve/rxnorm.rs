//! Name resolution against the RxNorm drugs endpoint.
//!
//! Uses `ureq` for synchronous HTTP requests with a per-request timeout.
//! Only `drugGroup.conceptGroup[].conceptProperties[]` is read; concept
//! groups without properties are ignored.

use std::time::Duration;

use serde_json::Value;

use crate::error::ResolveError;

use super::{Resolution, ResolveResult, Resolver};

/// Default public endpoint.
pub const DEFAULT_BASE_URL: &str = "https://rxnav.nlm.nih.gov/REST";

/// Blocking client for `GET {base_url}/drugs.json?name=<term>`.
#[derive(Debug, Clone)]
pub struct RxNormClient {
    base_url: String,
    agent: ureq::Agent,
}

impl RxNormClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            agent,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl Default for RxNormClient {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL, Duration::from_secs(10))
    }
}

impl Resolver for RxNormClient {
    fn resolve(&self, term: &str) -> ResolveResult<Resolution> {
        let url = format!("{}/drugs.json", self.base_url);
        tracing::debug!(term, url = %url, "querying name service");

        let response = match self.agent.get(&url).query("name", term).call() {
            Ok(response) => response,
            Err(ureq::Error::Status(code, _)) => {
                return Err(ResolveError::Upstream {
                    term: term.to_string(),
                    message: format!("HTTP {code}"),
                });
            }
            Err(ureq::Error::Transport(transport)) => {
                return Err(ResolveError::Upstream {
                    term: term.to_string(),
                    message: transport.to_string(),
                });
            }
        };

        let body: Value = response
            .into_json()
            .map_err(|_| ResolveError::UpstreamMissingData {
                term: term.to_string(),
                field: "a JSON body".into(),
            })?;
        parse_drugs_response(term, &body)
    }
}

/// Extract rxcui → name pairs from a drugs response.
pub fn parse_drugs_response(term: &str, body: &Value) -> ResolveResult<Resolution> {
    let missing = |field: &str| ResolveError::UpstreamMissingData {
        term: term.to_string(),
        field: field.to_string(),
    };

    let groups = body
        .get("drugGroup")
        .ok_or_else(|| missing("drugGroup"))?
        .get("conceptGroup")
        .and_then(Value::as_array)
        .ok_or_else(|| missing("drugGroup.conceptGroup"))?;

    let mut resolution = Resolution::new();
    for group in groups {
        let Some(properties) = group.get("conceptProperties").and_then(Value::as_array) else {
            continue;
        };
        for concept in properties {
            let id = concept.get("rxcui").and_then(Value::as_str);
            let name = concept.get("name").and_then(Value::as_str);
            if let (Some(id), Some(name)) = (id, name) {
                resolution.insert(id.to_string(), name.to_string());
            }
        }
    }

    if resolution.is_empty() {
        return Err(missing("conceptProperties"));
    }
    Ok(resolution)
}
