//! # Interrogation Module
//!
//! The synchronous half of one interrogation loop: stop checks, next-query
//! selection and evidence absorption. The async driver that actually calls
//! an evidence source lives in the application crate and only sequences
//! these steps.
//!
//! One iteration, in order:
//! 1. stop if confidence reached the threshold
//! 2. stop if the iteration limit is exceeded
//! 3. stop if the run's spend reached the budget
//! 4. pick the next query, or stop when there is none
//! 5. query the source (a failure is logged by the driver and charges nothing)
//! 6. [`absorb`] the records
//! 7. detect contradictions and update uncertainty (also inside [`absorb`])

use crate::error::{ValidationError, check_non_negative, check_non_zero, check_unit};
use crate::evidence::{Evidence, SourceRecord, char_prefix};
use crate::heuristics::{ContradictionDetector, EvidenceScorer};
use crate::hypothesis::{Hypothesis, HypothesisId};
use crate::state::UncertaintyLevel;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity above which a contradiction may trigger a fork.
pub const FORK_SEVERITY: f64 = 0.6;
/// Confidence band (exclusive) inside which a contradicted hypothesis forks.
pub const FORK_CONFIDENCE_BAND: (f64, f64) = (0.3, 0.7);

// =============================================================================
// LIMITS
// =============================================================================

/// Bounds for one interrogation run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoopLimits {
    pub confidence_threshold: f64,
    pub max_iterations: usize,
    /// Spend allowed for this run, counted from zero.
    pub budget: f64,
}

impl Default for LoopLimits {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.7,
            max_iterations: 10,
            budget: 10.0,
        }
    }
}

impl LoopLimits {
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_unit("confidence_threshold", self.confidence_threshold)?;
        check_non_zero("max_iterations", self.max_iterations)?;
        check_non_negative("budget", self.budget)
    }

    /// The stop reason that applies before iteration `iteration` (1-based), if any.
    pub fn check(&self, confidence: f64, iteration: usize, spent: f64) -> Option<StopReason> {
        if confidence >= self.confidence_threshold {
            Some(StopReason::ConfidenceThresholdReached)
        } else if iteration > self.max_iterations {
            Some(StopReason::MaxIterationsExceeded)
        } else if spent >= self.budget {
            Some(StopReason::BudgetExceeded)
        } else {
            None
        }
    }
}

// =============================================================================
// STOP REASON
// =============================================================================

/// Why an interrogation run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    ConfidenceThresholdReached,
    MaxIterationsExceeded,
    BudgetExceeded,
    NoMoreQueries,
}

impl StopReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ConfidenceThresholdReached => "confidence_threshold_reached",
            Self::MaxIterationsExceeded => "max_iterations_exceeded",
            Self::BudgetExceeded => "budget_exceeded",
            Self::NoMoreQueries => "no_more_queries",
        }
    }

    /// Only reaching the confidence threshold counts as convergence.
    pub fn is_converged(&self) -> bool {
        matches!(self, Self::ConfidenceThresholdReached)
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// QUERY SELECTION
// =============================================================================

/// Choose the next query for `hypothesis`, or `None` when nothing is worth asking.
///
/// - no evidence yet: the strategy's query template
/// - uncertainty High or Unknown: `"alternative view <template>"`
/// - any contradiction: `"clarify <latest claim_a, 50 chars>"`
/// - confidence below 0.5: `"detailed <template>"`
pub fn select_next_query(hypothesis: &Hypothesis) -> Option<String> {
    let state = &hypothesis.state;
    let template = &hypothesis.strategy.query_template;

    if state.evidence_count() == 0 {
        return Some(template.clone());
    }
    if state.uncertainty() >= UncertaintyLevel::High {
        return Some(format!("alternative view {template}"));
    }
    if let Some(latest) = state.latest_contradiction() {
        return Some(format!("clarify {}", char_prefix(latest.claim_a(), 50)));
    }
    if state.confidence() < 0.5 {
        return Some(format!("detailed {template}"));
    }
    None
}

// =============================================================================
// ABSORPTION
// =============================================================================

/// What one successful query added to a hypothesis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Absorbed {
    pub evidence_added: usize,
    pub contradictions_added: usize,
    /// Cost charged for the query.
    pub cost: f64,
}

/// Fold the records of one successful query into `hypothesis`.
///
/// Records with `success == false` are skipped. Each remaining record is
/// scored and filed under the hypothesis topic. The strategy's per-query cost
/// is charged once, contradictions are detected, uncertainty is updated and
/// `hypothesis.confidence` is synced with the state.
pub fn absorb(
    hypothesis: &mut Hypothesis,
    records: &[SourceRecord],
    scorer: &dyn EvidenceScorer,
    detector: &dyn ContradictionDetector,
) -> Absorbed {
    let topic = hypothesis.topic().to_string();

    let mut evidence_added = 0;
    for record in records.iter().filter(|r| r.success) {
        let evidence = Evidence::new(record.content.clone(), record.source.clone(), scorer.score(record))
            .with_metadata(record.metadata.clone());
        hypothesis.state.add_evidence(&topic, evidence);
        evidence_added += 1;
    }

    let cost = hypothesis.strategy.cost;
    hypothesis.cost += cost;

    let contradictions_added = hypothesis.state.detect_contradictions(&topic, detector);
    hypothesis.state.update_uncertainty(&topic);
    hypothesis.confidence = hypothesis.state.confidence();

    Absorbed {
        evidence_added,
        contradictions_added,
        cost,
    }
}

/// Whether a contradicted, middling hypothesis should be forked.
///
/// True when the latest contradiction is more severe than 0.6 and confidence
/// lies strictly between 0.3 and 0.7.
pub fn should_fork(hypothesis: &Hypothesis) -> bool {
    let (low, high) = FORK_CONFIDENCE_BAND;
    hypothesis
        .state
        .latest_contradiction()
        .is_some_and(|c| c.severity() > FORK_SEVERITY)
        && hypothesis.confidence > low
        && hypothesis.confidence < high
}

// =============================================================================
// RESULTS
// =============================================================================

/// The outcome of one interrogation run.
#[derive(Debug, Clone, PartialEq)]
pub struct InterrogationResult {
    pub hypothesis: Hypothesis,
    /// Iterations that issued a query.
    pub iterations: usize,
    /// Spend during this run only.
    pub total_cost: f64,
    pub final_confidence: f64,
    pub converged: bool,
    pub reason: StopReason,
}

impl InterrogationResult {
    #[must_use]
    pub fn new(hypothesis: Hypothesis, iterations: usize, total_cost: f64, reason: StopReason) -> Self {
        Self {
            final_confidence: hypothesis.state.confidence(),
            hypothesis,
            iterations,
            total_cost,
            converged: reason.is_converged(),
            reason,
        }
    }

    /// Run statistics without the hypothesis.
    pub fn report(&self) -> RunReport {
        RunReport {
            hypothesis_id: self.hypothesis.id,
            iterations: self.iterations,
            total_cost: self.total_cost,
            final_confidence: self.final_confidence,
            converged: self.converged,
            reason: self.reason,
        }
    }

    /// Split into the hypothesis and its run statistics.
    pub fn into_parts(self) -> (Hypothesis, RunReport) {
        let report = self.report();
        (self.hypothesis, report)
    }
}

/// Run statistics paired with a hypothesis by id.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub hypothesis_id: HypothesisId,
    pub iterations: usize,
    pub total_cost: f64,
    pub final_confidence: f64,
    pub converged: bool,
    pub reason: StopReason,
}

// =============================================================================
// TESTS
// =============================================================================
