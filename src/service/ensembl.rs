//! Blocking Ensembl REST client.

use std::collections::BTreeSet;

use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::config::ServiceConfig;
use crate::error::Error;
use crate::sequence::SequenceRecord;

use super::retry::{Failure, with_retry};
use super::{FeatureLookup, LookupRecord, SequenceKind, SequenceLookup, SynonymLookup};

/// One entry of a `/xrefs/id` response; only the synonyms are used.
#[derive(Debug, Deserialize)]
struct XrefEntry {
    #[serde(default)]
    synonyms: Option<Vec<String>>,
}

/// Ensembl REST client sharing one connection pool across calls.
///
/// `ureq::Agent` is cheaply cloneable and thread-safe, so one client can be
/// used from the bounded prefetch pool.
#[derive(Clone)]
pub struct EnsemblClient {
    agent: ureq::Agent,
    config: ServiceConfig,
}

impl EnsemblClient {
    #[must_use]
    pub fn new(config: ServiceConfig) -> Self {
        let agent_config = ureq::Agent::config_builder()
            .timeout_global(Some(config.timeout()))
            .build();
        Self {
            agent: ureq::Agent::new_with_config(agent_config),
            config,
        }
    }

    #[must_use]
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, Error> {
        let url = format!("{}{path}", self.config.base_url());
        let body = with_retry(self.config.max_attempts, self.config.backoff(), || {
            self.get_once(&url, query)
        })?;
        serde_json::from_str(&body)
            .map_err(|e| Error::Lookup(format!("invalid JSON from {url}: {e}")))
    }

    fn get_once(&self, url: &str, query: &[(&str, &str)]) -> Result<String, Failure> {
        let mut request = self.agent.get(url).header("Content-Type", "application/json");
        for (key, value) in query {
            request = request.query(*key, *value);
        }
        let mut response = request.call().map_err(|e| classify(url, e))?;
        response
            .body_mut()
            .read_to_string()
            .map_err(|e| classify(url, e))
    }
}

/// Throttling and server-side errors are worth another attempt; other
/// status codes (400 for unknown identifiers) are not.
fn classify(url: &str, err: ureq::Error) -> Failure {
    match err {
        ureq::Error::StatusCode(code) if code == 429 || code >= 500 => {
            Failure::Transient(format!("request error for {url}: HTTP {code}"))
        }
        ureq::Error::StatusCode(code) => {
            Failure::Permanent(format!("request error for {url}: HTTP {code}"))
        }
        other => Failure::Transient(format!("request error for {url}: {other}")),
    }
}

impl FeatureLookup for EnsemblClient {
    fn lookup(&self, id: &str) -> Result<LookupRecord, Error> {
        self.get_json(
            &format!("/lookup/id/{id}"),
            &[("species", self.config.species.as_str())],
        )
    }
}

impl SynonymLookup for EnsemblClient {
    fn synonyms(&self, id: &str) -> Result<Vec<String>, Error> {
        let entries: Vec<XrefEntry> = self.get_json(&format!("/xrefs/id/{id}"), &[])?;
        Ok(collect_synonyms(entries))
    }
}

impl SequenceLookup for EnsemblClient {
    fn sequence(&self, id: &str, kind: SequenceKind) -> Result<SequenceRecord, Error> {
        self.get_json(
            &format!("/sequence/id/{id}"),
            &[("type", kind.as_param())],
        )
    }
}

fn collect_synonyms(entries: Vec<XrefEntry>) -> Vec<String> {
    entries
        .into_iter()
        .filter_map(|entry| entry.synonyms)
        .flatten()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
