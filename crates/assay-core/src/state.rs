//! # State Module
//!
//! The cognitive state: everything one hypothesis has learned so far.
//!
//! A state is an evidence ledger keyed by topic plus the derived quantities
//! computed from it. Confidence is never assigned directly. It is recomputed
//! whenever evidence or contradictions are added:
//!
//! ```text
//! confidence = mean(evidence confidence)
//!            + min(0.2, 0.04 * distinct sources)
//!            - min(0.3, 0.05 * contradictions)
//! ```
//!
//! clamped into `[0, 1]`. A state with no evidence has confidence `0.0`.

use crate::evidence::{Contradiction, Evidence, clamp_unit};
use crate::heuristics::ContradictionDetector;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Bonus per distinct source accessed.
pub const DIVERSITY_STEP: f64 = 0.04;
/// Cap on the source diversity bonus.
pub const MAX_DIVERSITY_BONUS: f64 = 0.2;
/// Penalty per recorded contradiction.
pub const CONTRADICTION_STEP: f64 = 0.05;
/// Cap on the contradiction penalty.
pub const MAX_CONTRADICTION_PENALTY: f64 = 0.3;

// =============================================================================
// UNCERTAINTY LEVEL
// =============================================================================

/// Ordinal uncertainty, from `Certain` (lowest) to `Unknown` (highest).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UncertaintyLevel {
    Certain,
    Low,
    Medium,
    High,
    #[default]
    Unknown,
}

impl UncertaintyLevel {
    /// Map an uncertainty score in `[0, 1]` to a level.
    ///
    /// Cuts: `< 0.2` Certain, `< 0.4` Low, `< 0.6` Medium, `< 0.8` High,
    /// otherwise Unknown.
    pub fn from_score(score: f64) -> Self {
        if score < 0.2 {
            Self::Certain
        } else if score < 0.4 {
            Self::Low
        } else if score < 0.6 {
            Self::Medium
        } else if score < 0.8 {
            Self::High
        } else {
            Self::Unknown
        }
    }

    /// Level implied by a confidence value.
    ///
    /// Cuts: `>= 0.8` Certain, `>= 0.6` Low, `>= 0.4` Medium, `>= 0.2` High,
    /// otherwise Unknown.
    pub fn from_confidence(confidence: f64) -> Self {
        if confidence >= 0.8 {
            Self::Certain
        } else if confidence >= 0.6 {
            Self::Low
        } else if confidence >= 0.4 {
            Self::Medium
        } else if confidence >= 0.2 {
            Self::High
        } else {
            Self::Unknown
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Certain => "CERTAIN",
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for UncertaintyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// COGNITIVE STATE
// =============================================================================

/// Everything one hypothesis knows.
///
/// Exclusively owned by its hypothesis. [`CognitiveState::fork`] produces an
/// independent deep copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CognitiveState {
    knowledge: BTreeMap<String, Vec<Evidence>>,
    confidence: f64,
    confidence_history: Vec<f64>,
    uncertainty: UncertaintyLevel,
    uncertainty_map: BTreeMap<String, f64>,
    contradictions: Vec<Contradiction>,
    sources_accessed: BTreeSet<String>,
    queries_made: Vec<String>,
    created_at: DateTime<Utc>,
    last_update: DateTime<Utc>,
}

impl Default for CognitiveState {
    fn default() -> Self {
        Self::new()
    }
}

impl CognitiveState {
    /// An empty state: no evidence, confidence `0.0`, uncertainty `Unknown`.
    #[must_use]
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            knowledge: BTreeMap::new(),
            confidence: 0.0,
            confidence_history: Vec::new(),
            uncertainty: UncertaintyLevel::Unknown,
            uncertainty_map: BTreeMap::new(),
            contradictions: Vec::new(),
            sources_accessed: BTreeSet::new(),
            queries_made: Vec::new(),
            created_at: now,
            last_update: now,
        }
    }

    /// An empty state whose overall uncertainty starts at `level`.
    #[must_use]
    pub fn with_uncertainty(level: UncertaintyLevel) -> Self {
        Self {
            uncertainty: level,
            ..Self::new()
        }
    }

    // -------------------------------------------------------------------------
    // Mutation
    // -------------------------------------------------------------------------

    /// Append evidence under `topic` and recompute confidence.
    pub fn add_evidence(&mut self, topic: &str, evidence: Evidence) {
        self.sources_accessed.insert(evidence.source().to_string());
        self.knowledge
            .entry(topic.to_string())
            .or_default()
            .push(evidence);
        self.recompute_confidence();
    }

    /// Remember that `query` was issued.
    pub fn record_query(&mut self, query: &str) {
        self.queries_made.push(query.to_string());
        self.last_update = Utc::now();
    }

    /// Append contradictions and recompute confidence.
    pub fn record_contradictions(&mut self, found: impl IntoIterator<Item = Contradiction>) {
        let before = self.contradictions.len();
        self.contradictions.extend(found);
        if self.contradictions.len() != before {
            self.recompute_confidence();
        }
    }

    /// Compare every pair of evidence under `topic` and record new contradictions.
    ///
    /// Pairs already recorded are not recorded again. Returns the number of
    /// contradictions added.
    pub fn detect_contradictions(
        &mut self,
        topic: &str,
        detector: &dyn ContradictionDetector,
    ) -> usize {
        let Some(items) = self.knowledge.get(topic) else {
            return 0;
        };

        let mut found: Vec<Contradiction> = Vec::new();
        for (i, a) in items.iter().enumerate() {
            for b in &items[i + 1..] {
                if let Some(severity) = detector.contradiction(a, b) {
                    let candidate = Contradiction::between(a, b, severity);
                    let known = self
                        .contradictions
                        .iter()
                        .chain(found.iter())
                        .any(|c| c.same_pair(&candidate));
                    if !known {
                        found.push(candidate);
                    }
                }
            }
        }

        let added = found.len();
        self.record_contradictions(found);
        added
    }

    /// Recompute and store the uncertainty score for `topic`.
    ///
    /// A topic with no evidence scores `1.0` and yields `Unknown`. Otherwise:
    /// `1 - mean confidence + 0.1 * topic contradictions - 0.05 * topic sources`,
    /// clamped. The overall level is set to the level of that score.
    pub fn update_uncertainty(&mut self, topic: &str) -> UncertaintyLevel {
        let score = match self.knowledge.get(topic).filter(|items| !items.is_empty()) {
            None => 1.0,
            Some(items) => {
                let avg = items.iter().map(Evidence::confidence).sum::<f64>() / items.len() as f64;
                let sources: BTreeSet<&str> = items.iter().map(Evidence::source).collect();
                let conflicts = self
                    .contradictions
                    .iter()
                    .filter(|c| {
                        items.iter().any(|e| {
                            e.content().starts_with(c.claim_a())
                                || e.content().starts_with(c.claim_b())
                        })
                    })
                    .count();

                clamp_unit(1.0 - avg + 0.1 * conflicts as f64 - 0.05 * sources.len() as f64)
            }
        };

        self.uncertainty_map.insert(topic.to_string(), score);
        self.uncertainty = UncertaintyLevel::from_score(score);
        self.last_update = Utc::now();
        self.uncertainty
    }

    /// Independent deep copy with a fresh creation time.
    #[must_use]
    pub fn fork(&self) -> Self {
        let mut copy = self.clone();
        copy.created_at = Utc::now();
        copy
    }

    fn recompute_confidence(&mut self) {
        let total = self.evidence_count();
        self.confidence = if total == 0 {
            0.0
        } else {
            let mean = self.all_evidence().map(Evidence::confidence).sum::<f64>() / total as f64;
            let diversity =
                (DIVERSITY_STEP * self.sources_accessed.len() as f64).min(MAX_DIVERSITY_BONUS);
            let penalty = (CONTRADICTION_STEP * self.contradictions.len() as f64)
                .min(MAX_CONTRADICTION_PENALTY);
            clamp_unit(mean + diversity - penalty)
        };
        self.confidence_history.push(self.confidence);
        self.last_update = Utc::now();
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    pub fn uncertainty(&self) -> UncertaintyLevel {
        self.uncertainty
    }

    /// Last stored uncertainty score for `topic`, if computed.
    pub fn uncertainty_for(&self, topic: &str) -> Option<f64> {
        self.uncertainty_map.get(topic).copied()
    }

    pub fn knowledge(&self) -> &BTreeMap<String, Vec<Evidence>> {
        &self.knowledge
    }

    /// Evidence under `topic`, empty if none.
    pub fn evidence_for(&self, topic: &str) -> &[Evidence] {
        self.knowledge.get(topic).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All evidence across topics, in topic order then insertion order.
    pub fn all_evidence(&self) -> impl Iterator<Item = &Evidence> {
        self.knowledge.values().flatten()
    }

    pub fn evidence_count(&self) -> usize {
        self.knowledge.values().map(Vec::len).sum()
    }

    /// Mean evidence confidence, `None` when there is no evidence.
    pub fn average_evidence_confidence(&self) -> Option<f64> {
        let total = self.evidence_count();
        (total > 0).then(|| self.all_evidence().map(Evidence::confidence).sum::<f64>() / total as f64)
    }

    pub fn contradictions(&self) -> &[Contradiction] {
        &self.contradictions
    }

    /// Most recently recorded contradiction.
    pub fn latest_contradiction(&self) -> Option<&Contradiction> {
        self.contradictions.last()
    }

    pub fn sources_accessed(&self) -> &BTreeSet<String> {
        &self.sources_accessed
    }

    pub fn queries_made(&self) -> &[String] {
        &self.queries_made
    }

    pub fn confidence_history(&self) -> &[f64] {
        &self.confidence_history
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn last_update(&self) -> DateTime<Utc> {
        self.last_update
    }

    /// Compact overview for logs and reports.
    pub fn summary(&self) -> StateSummary {
        StateSummary {
            confidence: self.confidence,
            uncertainty: self.uncertainty,
            topics: self.knowledge.len(),
            total_evidence: self.evidence_count(),
            contradictions: self.contradictions.len(),
            sources_accessed: self.sources_accessed.len(),
            queries_made: self.queries_made.len(),
        }
    }
}

/// Counts describing a cognitive state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StateSummary {
    pub confidence: f64,
    pub uncertainty: UncertaintyLevel,
    pub topics: usize,
    pub total_evidence: usize,
    pub contradictions: usize,
    pub sources_accessed: usize,
    pub queries_made: usize,
}

// =============================================================================
// TESTS
// =============================================================================
