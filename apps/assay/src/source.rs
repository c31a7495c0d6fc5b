//! # Evidence Sources
//!
//! The async boundary of the engine. Interrogation loops call an
//! [`EvidenceSource`] concurrently from many tasks; a source must therefore
//! be `Send + Sync` and must not rely on call ordering.
//!
//! Implementations:
//! - [`SimulatedSource`]: deterministic canned text, no I/O
//! - [`StaticSource`]: keyword table, loadable from JSON
//! - [`TimeoutSource`]: bounds any source's per-query latency

use assay_core::SourceRecord;
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Failure of a single query. Never fatal to a run.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("source unavailable: {0}")]
    Unavailable(String),

    #[error("query timed out after {0:?}")]
    Timeout(Duration),

    #[error("malformed source data: {0}")]
    Malformed(String),
}

/// Something that answers text queries with raw records.
#[async_trait]
pub trait EvidenceSource: Send + Sync {
    async fn query(&self, text: &str) -> Result<Vec<SourceRecord>, SourceError>;

    /// Short name for logs.
    fn name(&self) -> &str;
}

// =============================================================================
// SIMULATED
// =============================================================================

/// Deterministic offline source.
///
/// Every query yields one verified reference record and one community
/// record built from the query text, so a fresh hypothesis converges after a
/// single query under the default threshold.
#[derive(Debug, Clone, Default)]
pub struct SimulatedSource;

impl SimulatedSource {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EvidenceSource for SimulatedSource {
    async fn query(&self, text: &str) -> Result<Vec<SourceRecord>, SourceError> {
        let subject = text.trim().trim_end_matches(['?', '.', '!']);
        if subject.is_empty() {
            return Ok(Vec::new());
        }

        Ok(vec![
            SourceRecord::ok(
                format!(
                    "Reference material describes {subject} consistently across independent editions. \
                     The core facts are stable and well documented."
                ),
                "https://reference.example.org/entry",
            )
            .with_meta("verified", "true"),
            SourceRecord::ok(
                format!(
                    "Practitioners discussing {subject} broadly agree with the reference description \
                     and add practical notes from experience."
                ),
                "https://forum.example.com/thread",
            ),
        ])
    }

    fn name(&self) -> &str {
        "simulated"
    }
}

// =============================================================================
// STATIC
// =============================================================================

/// Keyword table source.
///
/// A query receives the records of every keyword it contains
/// (case-insensitive), in keyword order. JSON form:
///
/// ```json
/// { "rust": [ { "content": "...", "source": "doc.rust-lang.org" } ] }
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct StaticSource {
    table: BTreeMap<String, Vec<SourceRecord>>,
}

impl StaticSource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add records answered for `keyword`.
    #[must_use]
    pub fn with_entry(mut self, keyword: &str, records: Vec<SourceRecord>) -> Self {
        self.table
            .entry(keyword.to_lowercase())
            .or_default()
            .extend(records);
        self
    }

    pub fn from_json(json: &str) -> Result<Self, SourceError> {
        let parsed: BTreeMap<String, Vec<SourceRecord>> =
            serde_json::from_str(json).map_err(|e| SourceError::Malformed(e.to_string()))?;
        Ok(parsed
            .into_iter()
            .fold(Self::new(), |source, (k, v)| source.with_entry(&k, v)))
    }

    pub fn load(path: &Path) -> Result<Self, SourceError> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| SourceError::Unavailable(format!("{}: {e}", path.display())))?;
        Self::from_json(&json)
    }

    pub fn keyword_count(&self) -> usize {
        self.table.len()
    }
}

#[async_trait]
impl EvidenceSource for StaticSource {
    async fn query(&self, text: &str) -> Result<Vec<SourceRecord>, SourceError> {
        let lowered = text.to_lowercase();
        Ok(self
            .table
            .iter()
            .filter(|(keyword, _)| lowered.contains(keyword.as_str()))
            .flat_map(|(_, records)| records.iter().cloned())
            .collect())
    }

    fn name(&self) -> &str {
        "static"
    }
}

// =============================================================================
// TIMEOUT
// =============================================================================

/// Fails queries of the wrapped source that take longer than `timeout`.
#[derive(Debug, Clone)]
pub struct TimeoutSource<S> {
    inner: S,
    timeout: Duration,
}

impl<S: EvidenceSource> TimeoutSource<S> {
    #[must_use]
    pub fn new(inner: S, timeout: Duration) -> Self {
        Self { inner, timeout }
    }
}

#[async_trait]
impl<S: EvidenceSource> EvidenceSource for TimeoutSource<S> {
    async fn query(&self, text: &str) -> Result<Vec<SourceRecord>, SourceError> {
        tokio::time::timeout(self.timeout, self.inner.query(text))
            .await
            .map_err(|_| SourceError::Timeout(self.timeout))?
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}

// =============================================================================
// TESTS
// =============================================================================
