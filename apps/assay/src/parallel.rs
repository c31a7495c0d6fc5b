//! # Parallel Interrogation
//!
//! Runs one interrogation loop per hypothesis, each in its own tokio task.
//! Hypotheses are moved into their task and moved back out with the result,
//! so tasks never share mutable state. A task that panics is logged and
//! dropped from the batch; the others still complete.

use crate::interrogation::InterrogationLoop;
use assay_core::{Hypothesis, InterrogationResult};
use tokio::task::JoinSet;
use tracing::error;

pub use assay_core::should_fork;

/// Everything a batch produced.
#[derive(Debug, Default)]
pub struct ParallelOutcome {
    /// One result per hypothesis that finished, in completion order.
    pub results: Vec<InterrogationResult>,
    /// Inputs that were already eliminated, returned untouched.
    pub skipped: Vec<Hypothesis>,
    /// Number of tasks that panicked or were cancelled.
    pub failed: usize,
}

#[derive(Debug, Clone)]
pub struct ParallelEngine {
    interrogation: InterrogationLoop,
}

impl ParallelEngine {
    #[must_use]
    pub fn new(interrogation: InterrogationLoop) -> Self {
        Self { interrogation }
    }

    pub fn interrogation(&self) -> &InterrogationLoop {
        &self.interrogation
    }

    /// Interrogate every active hypothesis concurrently and wait for all of them.
    pub async fn run_parallel(&self, hypotheses: Vec<Hypothesis>) -> ParallelOutcome {
        let mut outcome = ParallelOutcome::default();
        let mut tasks = JoinSet::new();

        for hypothesis in hypotheses {
            if hypothesis.eliminated {
                outcome.skipped.push(hypothesis);
                continue;
            }
            let interrogation = self.interrogation.clone();
            tasks.spawn(async move { interrogation.run(hypothesis).await });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(result) => outcome.results.push(result),
                Err(e) => {
                    error!(error = %e, "interrogation task failed");
                    outcome.failed += 1;
                }
            }
        }

        outcome
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::source::{EvidenceSource, SimulatedSource, SourceError};
    use assay_core::{EliminationReason, LoopLimits, SourceRecord, SourceStrategy, SourceType};
    use async_trait::async_trait;
    use std::sync::Arc;

    /// Panics on queries that mention "explode".
    struct Volatile;

    #[async_trait]
    impl EvidenceSource for Volatile {
        async fn query(&self, text: &str) -> Result<Vec<SourceRecord>, SourceError> {
            if text.contains("explode") {
                panic!("volatile source blew up");
            }
            SimulatedSource.query(text).await
        }

        fn name(&self) -> &str {
            "volatile"
        }
    }

    fn hypothesis(goal: &str) -> Hypothesis {
        Hypothesis::new(
            format!("answer {goal}"),
            Vec::new(),
            SourceStrategy::for_source(SourceType::Encyclopedic, goal),
        )
    }

    fn engine(source: Arc<dyn EvidenceSource>) -> ParallelEngine {
        ParallelEngine::new(InterrogationLoop::new(source, LoopLimits::default()))
    }

    #[tokio::test]
    async fn runs_every_active_hypothesis() {
        let outcome = engine(Arc::new(SimulatedSource::new()))
            .run_parallel(vec![hypothesis("a"), hypothesis("b"), hypothesis("c")])
            .await;

        assert_eq!(outcome.results.len(), 3);
        assert!(outcome.skipped.is_empty());
        assert_eq!(outcome.failed, 0);
    }

    #[tokio::test]
    async fn eliminated_inputs_are_skipped() {
        let mut gone = hypothesis("gone");
        gone.eliminate(EliminationReason::InsufficientEvidence { count: 0, minimum: 2 });

        let outcome = engine(Arc::new(SimulatedSource::new()))
            .run_parallel(vec![gone, hypothesis("kept")])
            .await;

        assert_eq!(outcome.results.len(), 1);
        assert_eq!(outcome.skipped.len(), 1);
    }

    #[tokio::test]
    async fn panicking_task_is_excluded() {
        let outcome = engine(Arc::new(Volatile))
            .run_parallel(vec![hypothesis("fine"), hypothesis("explode")])
            .await;

        assert_eq!(outcome.results.len(), 1);
        assert_eq!(outcome.failed, 1);
    }

    #[tokio::test]
    async fn empty_batch_is_empty() {
        let outcome = engine(Arc::new(SimulatedSource::new())).run_parallel(Vec::new()).await;
        assert!(outcome.results.is_empty());
    }
}
