//! # Evidence Module
//!
//! The immutable facts a hypothesis accumulates, and the raw records an
//! evidence source hands back before they are scored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Number of leading characters kept when an evidence text is quoted as a claim.
pub const CLAIM_PREFIX_CHARS: usize = 100;

/// Return the first `max_chars` characters of `text` without splitting a code point.
pub fn char_prefix(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

// =============================================================================
// SOURCE RECORD
// =============================================================================

/// One item returned by an evidence source for a query.
///
/// Records are not evidence yet: they carry no confidence. The interrogation
/// step scores each successful record and turns it into [`Evidence`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRecord {
    /// Whether the source produced usable content for this item.
    #[serde(default = "default_success")]
    pub success: bool,
    /// Raw text content.
    #[serde(default)]
    pub content: String,
    /// Identifier of the origin (domain, URL, or source name).
    #[serde(default = "default_source")]
    pub source: String,
    /// Free-form annotations (e.g. `verified = "true"`).
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

fn default_success() -> bool {
    true
}

fn default_source() -> String {
    String::from("unknown")
}

impl SourceRecord {
    /// A successful record.
    #[must_use]
    pub fn ok(content: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            success: true,
            content: content.into(),
            source: source.into(),
            metadata: BTreeMap::new(),
        }
    }

    /// A record the source marked as unusable.
    #[must_use]
    pub fn failed(source: impl Into<String>) -> Self {
        Self {
            success: false,
            content: String::new(),
            source: source.into(),
            metadata: BTreeMap::new(),
        }
    }

    /// Attach a metadata entry.
    #[must_use]
    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

// =============================================================================
// EVIDENCE
// =============================================================================

/// A scored piece of information owned by one cognitive state.
///
/// Evidence is immutable once created: fields are private and only exposed
/// through accessors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evidence {
    content: String,
    source: String,
    confidence: f64,
    timestamp: DateTime<Utc>,
    metadata: BTreeMap<String, String>,
}

impl Evidence {
    /// Create evidence stamped with the current time.
    ///
    /// `confidence` is clamped into `[0, 1]`; NaN becomes `0.0`.
    #[must_use]
    pub fn new(content: impl Into<String>, source: impl Into<String>, confidence: f64) -> Self {
        Self {
            content: content.into(),
            source: source.into(),
            confidence: clamp_unit(confidence),
            timestamp: Utc::now(),
            metadata: BTreeMap::new(),
        }
    }

    /// Replace the metadata map at construction time.
    #[must_use]
    pub fn with_metadata(mut self, metadata: BTreeMap<String, String>) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn metadata(&self) -> &BTreeMap<String, String> {
        &self.metadata
    }

    /// Key used to collapse duplicates: source plus the first 100 characters.
    pub fn dedup_key(&self) -> (&str, &str) {
        (&self.source, char_prefix(&self.content, CLAIM_PREFIX_CHARS))
    }
}

// =============================================================================
// CONTRADICTION
// =============================================================================

/// Two pieces of evidence that disagree.
///
/// Derived data: created by contradiction detection and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contradiction {
    claim_a: String,
    claim_b: String,
    source_a: String,
    source_b: String,
    severity: f64,
    timestamp: DateTime<Utc>,
}

impl Contradiction {
    /// Create a contradiction from explicit claims.
    #[must_use]
    pub fn new(
        claim_a: impl Into<String>,
        claim_b: impl Into<String>,
        source_a: impl Into<String>,
        source_b: impl Into<String>,
        severity: f64,
    ) -> Self {
        Self {
            claim_a: claim_a.into(),
            claim_b: claim_b.into(),
            source_a: source_a.into(),
            source_b: source_b.into(),
            severity: clamp_unit(severity),
            timestamp: Utc::now(),
        }
    }

    /// Create a contradiction between two evidence items, quoting each by its prefix.
    #[must_use]
    pub fn between(a: &Evidence, b: &Evidence, severity: f64) -> Self {
        Self::new(
            char_prefix(a.content(), CLAIM_PREFIX_CHARS),
            char_prefix(b.content(), CLAIM_PREFIX_CHARS),
            a.source(),
            b.source(),
            severity,
        )
    }

    pub fn claim_a(&self) -> &str {
        &self.claim_a
    }

    pub fn claim_b(&self) -> &str {
        &self.claim_b
    }

    pub fn source_a(&self) -> &str {
        &self.source_a
    }

    pub fn source_b(&self) -> &str {
        &self.source_b
    }

    pub fn severity(&self) -> f64 {
        self.severity
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Whether this records the same pair of claims as `other` (timestamps ignored).
    pub fn same_pair(&self, other: &Self) -> bool {
        self.claim_a == other.claim_a
            && self.claim_b == other.claim_b
            && self.source_a == other.source_a
            && self.source_b == other.source_b
    }
}

/// Clamp into `[0, 1]`, mapping NaN to zero.
pub(crate) fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

// =============================================================================
// TESTS
// =============================================================================
