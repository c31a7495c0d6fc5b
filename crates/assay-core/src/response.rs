//! # Response Module
//!
//! The public decision format returned by the engine, and the cheap
//! answerability estimate computed without any interrogation.
//!
//! Every decision reports its confidence interval, the evidence it rests on,
//! the contradictions it could not resolve, and how many hypotheses were
//! discarded on the way. A failed run is still a [`DecisionResult`]: it has
//! confidence `0.0` and names the failure in its metadata.

use crate::evidence::{Contradiction, Evidence, char_prefix};
use crate::hypothesis::HypothesisId;
use crate::intent::{DecisionCategory, Intent};
use crate::interrogation::RunReport;
use crate::router::{SourceStrategy, SourceType};
use crate::state::UncertaintyLevel;
use crate::synthesizer::SynthesizedState;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Seconds assumed per routed strategy when estimating run time.
pub const SECONDS_PER_STRATEGY: f64 = 2.0;

/// Characters of evidence content shown in a decision.
pub const EVIDENCE_PREVIEW_CHARS: usize = 200;

// =============================================================================
// VIEWS
// =============================================================================

/// Evidence as shown to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceView {
    pub content: String,
    pub source: String,
    pub confidence: f64,
}

impl From<&Evidence> for EvidenceView {
    fn from(evidence: &Evidence) -> Self {
        let preview = char_prefix(evidence.content(), EVIDENCE_PREVIEW_CHARS);
        let content = if preview.len() < evidence.content().len() {
            format!("{preview}...")
        } else {
            preview.to_string()
        };
        Self {
            content,
            source: evidence.source().to_string(),
            confidence: evidence.confidence(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContradictionView {
    pub claim_a: String,
    pub claim_b: String,
    pub source_a: String,
    pub source_b: String,
    pub severity: f64,
}

impl From<&Contradiction> for ContradictionView {
    fn from(c: &Contradiction) -> Self {
        Self {
            claim_a: c.claim_a().to_string(),
            claim_b: c.claim_b().to_string(),
            source_a: c.source_a().to_string(),
            source_b: c.source_b().to_string(),
            severity: c.severity(),
        }
    }
}

/// Population counts. `total == surviving + eliminated + lost`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HypothesisCounts {
    pub total: usize,
    pub surviving: usize,
    pub eliminated: usize,
    /// Hypotheses whose interrogation task failed before returning.
    #[serde(default)]
    pub lost: usize,
}

/// How the query was read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentSummary {
    pub goal: String,
    pub category: DecisionCategory,
    pub uncertainty: f64,
    pub subgoals: Vec<String>,
}

impl From<&Intent> for IntentSummary {
    fn from(intent: &Intent) -> Self {
        Self {
            goal: intent.goal.clone(),
            category: intent.category,
            uncertainty: intent.uncertainty,
            subgoals: intent.subgoals.clone(),
        }
    }
}

/// What happened during execution.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutionMetadata {
    pub strategies_used: Vec<SourceType>,
    pub forks: usize,
    pub total_evidence: usize,
    pub synthesis_method: String,
    /// Set for `no_strategies` and `all_hypotheses_eliminated`.
    pub failure_reason: Option<String>,
    pub eliminated_ids: Vec<HypothesisId>,
    /// Elimination reason code histogram.
    pub elimination_reasons: BTreeMap<String, usize>,
    pub runs: Vec<RunReport>,
}

// =============================================================================
// DECISION RESULT
// =============================================================================

/// The engine's answer to a query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionResult {
    pub query: String,
    pub decision: String,
    pub confidence: f64,
    pub confidence_interval: (f64, f64),
    pub uncertainty: UncertaintyLevel,
    pub evidence: Vec<EvidenceView>,
    pub contradictions: Vec<ContradictionView>,
    pub alternatives: Vec<String>,
    pub source_breakdown: BTreeMap<String, usize>,
    pub hypotheses: HypothesisCounts,
    pub intent: IntentSummary,
    pub metadata: ExecutionMetadata,
}

impl DecisionResult {
    /// Wrap a synthesis into a result.
    ///
    /// `metadata.failure_reason` is taken from the synthesis when it carries one.
    #[must_use]
    pub fn from_synthesis(
        query: &str,
        intent: &Intent,
        synthesis: SynthesizedState,
        hypotheses: HypothesisCounts,
        mut metadata: ExecutionMetadata,
    ) -> Self {
        metadata.total_evidence = synthesis.metadata.total_evidence;
        metadata.synthesis_method = synthesis.metadata.method.clone();
        if metadata.failure_reason.is_none() {
            metadata.failure_reason = synthesis.metadata.reason.clone();
        }
        metadata.eliminated_ids = synthesis.eliminated.clone();

        Self {
            query: query.to_string(),
            decision: synthesis.decision,
            confidence: synthesis.confidence,
            confidence_interval: synthesis.confidence_interval,
            uncertainty: synthesis.uncertainty,
            evidence: synthesis.supporting_evidence.iter().map(EvidenceView::from).collect(),
            contradictions: synthesis.contradictions.iter().map(ContradictionView::from).collect(),
            alternatives: synthesis.alternatives,
            source_breakdown: synthesis.source_breakdown,
            hypotheses,
            intent: IntentSummary::from(intent),
            metadata,
        }
    }

    /// A confidence-zero result for a query that could not be processed at all.
    #[must_use]
    pub fn unable(query: &str, intent: &Intent, reason: &str) -> Self {
        Self {
            query: query.to_string(),
            decision: format!("Unable to process: {reason}"),
            confidence: 0.0,
            confidence_interval: (0.0, 0.0),
            uncertainty: UncertaintyLevel::Unknown,
            evidence: Vec::new(),
            contradictions: Vec::new(),
            alternatives: Vec::new(),
            source_breakdown: BTreeMap::new(),
            hypotheses: HypothesisCounts::default(),
            intent: IntentSummary::from(intent),
            metadata: ExecutionMetadata {
                synthesis_method: String::from("none"),
                failure_reason: Some(reason.to_string()),
                ..ExecutionMetadata::default()
            },
        }
    }

    /// A certain result answered without consulting any source.
    #[must_use]
    pub fn local(query: &str, intent: &Intent, reply: &str) -> Self {
        Self {
            query: query.to_string(),
            decision: reply.to_string(),
            confidence: 1.0,
            confidence_interval: (1.0, 1.0),
            uncertainty: UncertaintyLevel::Certain,
            evidence: Vec::new(),
            contradictions: Vec::new(),
            alternatives: Vec::new(),
            source_breakdown: BTreeMap::new(),
            hypotheses: HypothesisCounts::default(),
            intent: IntentSummary::from(intent),
            metadata: ExecutionMetadata {
                synthesis_method: String::from("local_response"),
                ..ExecutionMetadata::default()
            },
        }
    }

    /// Whether a decision was reached.
    pub fn is_decided(&self) -> bool {
        self.metadata.failure_reason.is_none()
    }

    /// Format as plain text.
    #[must_use]
    pub fn to_text(&self) -> String {
        let mut output = String::new();

        output.push_str("┌─────────────────────────────────────┐\n");
        output.push_str("│ DECISION                            │\n");
        for line in self.decision.lines() {
            output.push_str(&format!("│ {line}\n"));
        }
        output.push_str(&format!(
            "│ confidence {:.0}% [{:.0}%–{:.0}%], uncertainty {}\n",
            self.confidence * 100.0,
            self.confidence_interval.0 * 100.0,
            self.confidence_interval.1 * 100.0,
            self.uncertainty
        ));

        output.push_str("├─────────────────────────────────────┤\n");
        output.push_str("│ EVIDENCE                            │\n");
        if self.evidence.is_empty() {
            output.push_str("│ - (none)                            │\n");
        } else {
            for e in &self.evidence {
                output.push_str(&format!(
                    "│ - {} [{}, {:.0}%]\n",
                    e.content,
                    e.source,
                    e.confidence * 100.0
                ));
            }
        }

        output.push_str("├─────────────────────────────────────┤\n");
        output.push_str("│ CONTRADICTIONS                      │\n");
        if self.contradictions.is_empty() {
            output.push_str("│ - (none)                            │\n");
        } else {
            for c in &self.contradictions {
                output.push_str(&format!(
                    "│ - \"{}\" vs \"{}\" [severity {:.2}]\n",
                    c.claim_a, c.claim_b, c.severity
                ));
            }
        }

        output.push_str("├─────────────────────────────────────┤\n");
        output.push_str("│ ALTERNATIVES                        │\n");
        if self.alternatives.is_empty() {
            output.push_str("│ - (none)                            │\n");
        } else {
            for alt in &self.alternatives {
                output.push_str(&format!("│ - {alt}\n"));
            }
        }

        output.push_str("├─────────────────────────────────────┤\n");
        output.push_str(&format!(
            "│ hypotheses: {} total, {} surviving, {} eliminated",
            self.hypotheses.total, self.hypotheses.surviving, self.hypotheses.eliminated
        ));
        if self.hypotheses.lost > 0 {
            output.push_str(&format!(", {} lost", self.hypotheses.lost));
        }
        output.push('\n');
        if let Some(reason) = &self.metadata.failure_reason {
            output.push_str(&format!("│ reason: {reason}\n"));
        }
        output.push_str("└─────────────────────────────────────┘\n");

        output
    }
}

// =============================================================================
// ANSWERABILITY
// =============================================================================

/// Estimate of whether a query is worth executing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answerability {
    pub answerable: bool,
    /// Mean expected value of the routed strategies.
    pub confidence: f64,
    pub reason: String,
    pub estimated_cost: f64,
    pub estimated_time_secs: f64,
    pub strategies: Vec<SourceType>,
}

impl Answerability {
    /// Assess `intent` from its routed strategies alone.
    ///
    /// Answerable iff the mean expected value exceeds 0.5 and the intent's
    /// uncertainty is below 0.9.
    pub fn assess(intent: &Intent, strategies: &[SourceStrategy]) -> Self {
        if strategies.is_empty() {
            return Self {
                answerable: false,
                confidence: 0.0,
                reason: String::from("No suitable information sources found"),
                estimated_cost: 0.0,
                estimated_time_secs: 0.0,
                strategies: Vec::new(),
            };
        }

        let count = strategies.len() as f64;
        let mean_value = strategies.iter().map(|s| s.expected_value).sum::<f64>() / count;
        let answerable = mean_value > 0.5 && intent.uncertainty < 0.9;
        let reason = if answerable {
            format!("Can answer using {} source strategies", strategies.len())
        } else if intent.uncertainty >= 0.9 {
            format!("Query uncertainty too high: {:.2}", intent.uncertainty)
        } else {
            format!("Expected value too low: {mean_value:.2}")
        };

        Self {
            answerable,
            confidence: mean_value,
            reason,
            estimated_cost: strategies.iter().map(|s| s.cost).sum(),
            estimated_time_secs: SECONDS_PER_STRATEGY * count,
            strategies: strategies.iter().map(|s| s.source_type).collect(),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
