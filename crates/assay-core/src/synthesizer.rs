//! # Synthesizer Module
//!
//! Aggregates the surviving hypotheses into one decision artifact.
//!
//! The decision text is an extractive summary of the best hypothesis'
//! evidence with a short source attribution. Confidence is a weighted mean
//! across survivors, each weighted by `confidence * evidence / (cost + 1)`,
//! and the confidence interval is simply the survivors' min and max.

use crate::evidence::{Contradiction, Evidence, char_prefix};
use crate::heuristics::word_set;
use crate::hypothesis::{Hypothesis, HypothesisId};
use crate::state::UncertaintyLevel;
use crate::summarize::{Summarizer, SummarizerKind, source_domain};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Decision text used when nothing survived elimination.
pub const NO_DECISION: &str = "Unable to reach decision. All hypotheses eliminated.";

/// Word overlap at which two contradictions count as duplicates.
pub const CONTRADICTION_OVERLAP: f64 = 0.5;

// =============================================================================
// CONFIG
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthesisConfig {
    pub max_evidence: usize,
    pub max_alternatives: usize,
    pub summary_sentences: usize,
    /// Distinct source domains named in the attribution line.
    pub max_attributed_sources: usize,
    pub summarizer: SummarizerKind,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            max_evidence: 10,
            max_alternatives: 3,
            summary_sentences: 3,
            max_attributed_sources: 3,
            summarizer: SummarizerKind::Salience,
        }
    }
}

// =============================================================================
// OUTPUT
// =============================================================================

/// Provenance of a synthesis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynthesisMetadata {
    pub total_hypotheses: usize,
    pub surviving_hypotheses: usize,
    pub total_evidence: usize,
    pub method: String,
    /// Set when no decision could be made.
    pub reason: Option<String>,
}

/// The synthesized decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthesizedState {
    pub decision: String,
    pub confidence: f64,
    pub confidence_interval: (f64, f64),
    pub supporting_evidence: Vec<Evidence>,
    pub contradictions: Vec<Contradiction>,
    pub alternatives: Vec<String>,
    pub uncertainty: UncertaintyLevel,
    /// Number of survivors that accessed each source.
    pub source_breakdown: BTreeMap<String, usize>,
    pub contributing: Vec<HypothesisId>,
    pub eliminated: Vec<HypothesisId>,
    pub metadata: SynthesisMetadata,
}

// =============================================================================
// SYNTHESIZER
// =============================================================================

/// Builds a [`SynthesizedState`] from an elimination outcome.
pub struct StateSynthesizer {
    config: SynthesisConfig,
    summarizer: Box<dyn Summarizer>,
}

impl std::fmt::Debug for StateSynthesizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateSynthesizer")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Default for StateSynthesizer {
    fn default() -> Self {
        Self::new(SynthesisConfig::default())
    }
}

impl StateSynthesizer {
    #[must_use]
    pub fn new(config: SynthesisConfig) -> Self {
        Self {
            summarizer: config.summarizer.build(),
            config,
        }
    }

    /// Replace the summarizer chosen by the config.
    #[must_use]
    pub fn with_summarizer(mut self, summarizer: Box<dyn Summarizer>) -> Self {
        self.summarizer = summarizer;
        self
    }

    pub fn config(&self) -> &SynthesisConfig {
        &self.config
    }

    /// Synthesize `survivors` into a decision.
    ///
    /// With no survivors the artifact is the fixed "unable to decide" text,
    /// confidence and interval zero, uncertainty `Unknown`, the ids of
    /// `eliminated`, and a metadata reason of `all_hypotheses_eliminated`.
    pub fn synthesize(&self, survivors: &[Hypothesis], eliminated: &[Hypothesis]) -> SynthesizedState {
        let eliminated_ids: Vec<HypothesisId> = eliminated.iter().map(|h| h.id).collect();

        let Some(best) = highest_confidence(survivors) else {
            return SynthesizedState {
                decision: NO_DECISION.to_string(),
                confidence: 0.0,
                confidence_interval: (0.0, 0.0),
                supporting_evidence: Vec::new(),
                contradictions: Vec::new(),
                alternatives: Vec::new(),
                uncertainty: UncertaintyLevel::Unknown,
                source_breakdown: BTreeMap::new(),
                contributing: Vec::new(),
                eliminated: eliminated_ids,
                metadata: SynthesisMetadata {
                    total_hypotheses: eliminated.len(),
                    surviving_hypotheses: 0,
                    total_evidence: 0,
                    method: String::from("none"),
                    reason: Some(String::from("all_hypotheses_eliminated")),
                },
            };
        };

        let confidence = aggregate_confidence(survivors);
        let supporting_evidence = self.collect_evidence(survivors);
        let total_evidence = survivors.iter().map(Hypothesis::evidence_count).sum();

        SynthesizedState {
            decision: self.decision_text(best),
            confidence,
            confidence_interval: confidence_interval(survivors),
            supporting_evidence,
            contradictions: merge_contradictions(survivors),
            alternatives: self.alternatives(survivors, best.id),
            uncertainty: UncertaintyLevel::from_confidence(confidence),
            source_breakdown: source_breakdown(survivors),
            contributing: survivors.iter().map(|h| h.id).collect(),
            eliminated: eliminated_ids,
            metadata: SynthesisMetadata {
                total_hypotheses: survivors.len() + eliminated.len(),
                surviving_hypotheses: survivors.len(),
                total_evidence,
                method: String::from("weighted_aggregation"),
                reason: None,
            },
        }
    }

    fn decision_text(&self, best: &Hypothesis) -> String {
        let mut evidence: Vec<&Evidence> = best.state.all_evidence().collect();
        evidence.sort_by(|a, b| b.confidence().total_cmp(&a.confidence()));

        let combined = evidence
            .iter()
            .map(|e| e.content())
            .collect::<Vec<_>>()
            .join(" ");
        let summary = self
            .summarizer
            .summarize(&combined, self.config.summary_sentences);
        if summary.is_empty() {
            return best.description.clone();
        }

        let mut domains: Vec<String> = Vec::new();
        for e in &evidence {
            let domain = source_domain(e.source());
            if !domain.is_empty() && !domains.contains(&domain) {
                domains.push(domain);
            }
            if domains.len() >= self.config.max_attributed_sources {
                break;
            }
        }

        if domains.is_empty() {
            summary
        } else {
            format!("{summary}\n\nSources: {}", domains.join(", "))
        }
    }

    fn collect_evidence(&self, survivors: &[Hypothesis]) -> Vec<Evidence> {
        let mut unique: Vec<Evidence> = Vec::new();
        for evidence in survivors.iter().flat_map(|h| h.state.all_evidence()) {
            if !unique.iter().any(|u| u.dedup_key() == evidence.dedup_key()) {
                unique.push(evidence.clone());
            }
        }
        unique.sort_by(|a, b| b.confidence().total_cmp(&a.confidence()));
        unique.truncate(self.config.max_evidence);
        unique
    }

    fn alternatives(&self, survivors: &[Hypothesis], best: HypothesisId) -> Vec<String> {
        let mut others: Vec<&Hypothesis> = survivors.iter().filter(|h| h.id != best).collect();
        others.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
        others
            .into_iter()
            .take(self.config.max_alternatives)
            .map(|h| format!("{} (confidence: {:.2})", h.description, h.confidence))
            .collect()
    }
}

// =============================================================================
// AGGREGATION
// =============================================================================

/// First hypothesis with the maximum confidence.
fn highest_confidence(hypotheses: &[Hypothesis]) -> Option<&Hypothesis> {
    hypotheses.iter().fold(None, |best: Option<&Hypothesis>, h| match best {
        Some(b) if b.confidence >= h.confidence => Some(b),
        _ => Some(h),
    })
}

/// Weighted mean of confidences with weight `c * (n / (cost + 1))`; zero if all weights are zero.
pub fn aggregate_confidence(hypotheses: &[Hypothesis]) -> f64 {
    let (weighted, total) = hypotheses.iter().fold((0.0, 0.0), |(sum, weights), h| {
        let weight = h.confidence * (h.evidence_count() as f64 / (h.cost + 1.0));
        (sum + h.confidence * weight, weights + weight)
    });
    if total > 0.0 { weighted / total } else { 0.0 }
}

/// Minimum and maximum confidence; `(0, 0)` when empty.
pub fn confidence_interval(hypotheses: &[Hypothesis]) -> (f64, f64) {
    let mut iter = hypotheses.iter().map(|h| h.confidence);
    let Some(first) = iter.next() else {
        return (0.0, 0.0);
    };
    iter.fold((first, first), |(lo, hi), c| (lo.min(c), hi.max(c)))
}

/// All contradictions, most severe first, without near-duplicates.
fn merge_contradictions(hypotheses: &[Hypothesis]) -> Vec<Contradiction> {
    let mut all: Vec<&Contradiction> = hypotheses
        .iter()
        .flat_map(|h| h.state.contradictions())
        .collect();
    all.sort_by(|a, b| b.severity().total_cmp(&a.severity()));

    let mut kept: Vec<Contradiction> = Vec::new();
    for c in all {
        if !kept.iter().any(|k| overlap(k, c) >= CONTRADICTION_OVERLAP) {
            kept.push(c.clone());
        }
    }
    kept
}

/// Word overlap of two contradictions relative to the smaller word set.
/// Claims without words never overlap.
fn overlap(a: &Contradiction, b: &Contradiction) -> f64 {
    let words_a = word_set(&format!(
        "{} {}",
        char_prefix(a.claim_a(), 100),
        char_prefix(a.claim_b(), 100)
    ));
    let words_b = word_set(&format!(
        "{} {}",
        char_prefix(b.claim_a(), 100),
        char_prefix(b.claim_b(), 100)
    ));
    let smaller = words_a.len().min(words_b.len());
    if smaller == 0 {
        return 0.0;
    }
    words_a.intersection(&words_b).count() as f64 / smaller as f64
}

/// For each source, how many hypotheses accessed it.
fn source_breakdown(hypotheses: &[Hypothesis]) -> BTreeMap<String, usize> {
    let mut breakdown = BTreeMap::new();
    for source in hypotheses.iter().flat_map(|h| h.state.sources_accessed()) {
        *breakdown.entry(source.clone()).or_default() += 1;
    }
    breakdown
}

// =============================================================================
// TESTS
// =============================================================================
