//! # Interrogation Loop
//!
//! Drives one hypothesis against an evidence source until a stop condition
//! holds. The decisions themselves (stop checks, next query, absorption)
//! come from `assay_core::interrogation`; this module only awaits the source
//! in between and logs what happened.

use crate::source::EvidenceSource;
use assay_core::{
    ContradictionDetector, DomainReputation, EvidenceScorer, Hypothesis, InterrogationResult,
    LoopLimits, NegationOverlap, StopReason, absorb, select_next_query,
};
use std::sync::Arc;
use tracing::{debug, warn};

/// A reusable interrogation loop. Cheap to clone: every part is shared.
#[derive(Clone)]
pub struct InterrogationLoop {
    source: Arc<dyn EvidenceSource>,
    limits: LoopLimits,
    scorer: Arc<dyn EvidenceScorer>,
    detector: Arc<dyn ContradictionDetector>,
}

impl std::fmt::Debug for InterrogationLoop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InterrogationLoop")
            .field("source", &self.source.name())
            .field("limits", &self.limits)
            .finish_non_exhaustive()
    }
}

impl InterrogationLoop {
    /// Loop with the default scorer and contradiction detector.
    #[must_use]
    pub fn new(source: Arc<dyn EvidenceSource>, limits: LoopLimits) -> Self {
        Self {
            source,
            limits,
            scorer: Arc::new(DomainReputation::default()),
            detector: Arc::new(NegationOverlap::default()),
        }
    }

    #[must_use]
    pub fn with_scorer(mut self, scorer: Arc<dyn EvidenceScorer>) -> Self {
        self.scorer = scorer;
        self
    }

    #[must_use]
    pub fn with_detector(mut self, detector: Arc<dyn ContradictionDetector>) -> Self {
        self.detector = detector;
        self
    }

    pub fn limits(&self) -> &LoopLimits {
        &self.limits
    }

    /// Interrogate `hypothesis` until a stop condition holds.
    ///
    /// Query failures are logged and charge nothing; the loop moves on to
    /// the next iteration. `iterations` in the result counts iterations that
    /// issued a query.
    pub async fn run(&self, mut hypothesis: Hypothesis) -> InterrogationResult {
        let mut iteration = 0usize;
        let mut spent = 0.0;

        let reason = loop {
            if let Some(reason) = self
                .limits
                .check(hypothesis.state.confidence(), iteration + 1, spent)
            {
                break reason;
            }
            let Some(query) = select_next_query(&hypothesis) else {
                break StopReason::NoMoreQueries;
            };
            iteration += 1;
            hypothesis.state.record_query(&query);

            match self.source.query(&query).await {
                Ok(records) => {
                    let absorbed = absorb(
                        &mut hypothesis,
                        &records,
                        self.scorer.as_ref(),
                        self.detector.as_ref(),
                    );
                    spent += absorbed.cost;
                    debug!(
                        hypothesis = %hypothesis.id.short(),
                        iteration,
                        query = %query,
                        evidence_added = absorbed.evidence_added,
                        contradictions_added = absorbed.contradictions_added,
                        confidence = hypothesis.confidence,
                        uncertainty = %hypothesis.state.uncertainty(),
                        "iteration complete"
                    );
                }
                Err(e) => {
                    warn!(
                        hypothesis = %hypothesis.id.short(),
                        iteration,
                        source = self.source.name(),
                        query = %query,
                        error = %e,
                        "query failed"
                    );
                }
            }
        };

        debug!(
            hypothesis = %hypothesis.id.short(),
            iterations = iteration,
            spent,
            reason = %reason,
            "interrogation stopped"
        );
        InterrogationResult::new(hypothesis, iteration, spent, reason)
    }
}

// =============================================================================
// TESTS
// =============================================================================
