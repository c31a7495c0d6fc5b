//! # Engine
//!
//! The lifecycle entry point. One call to [`Engine::execute`] takes a query
//! through every phase:
//!
//! ```text
//! intent -> routing -> generation -> parallel interrogation
//!        -> forking (second batch) -> elimination -> ranking -> synthesis
//! ```
//!
//! `execute` never fails. Starvation (no strategies, everything eliminated)
//! produces a confidence-zero [`DecisionResult`] that names the reason.

use crate::config::EngineConfig;
use crate::interrogation::InterrogationLoop;
use crate::parallel::{ParallelEngine, ParallelOutcome, should_fork};
use crate::source::EvidenceSource;
use assay_core::{
    Answerability, ContradictionDetector, DecisionResult, EvidenceScorer, ExecutionMetadata,
    Hypothesis, HypothesisCounts, HypothesisEliminator, HypothesisGenerator, IntentParser,
    RunReport, SourceRouter, StateSynthesizer,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Failure reason reported when routing finds no usable source.
pub const NO_STRATEGIES: &str = "no_strategies";

#[derive(Debug)]
pub struct Engine {
    config: EngineConfig,
    parser: IntentParser,
    router: SourceRouter,
    generator: HypothesisGenerator,
    parallel: ParallelEngine,
    eliminator: HypothesisEliminator,
    synthesizer: StateSynthesizer,
}

impl Engine {
    /// Build an engine that owns `source` and every lifecycle component.
    #[must_use]
    pub fn new(config: EngineConfig, source: Arc<dyn EvidenceSource>) -> Self {
        let interrogation = InterrogationLoop::new(source, config.loop_limits());
        Self {
            parser: IntentParser::new(),
            router: SourceRouter::new(),
            generator: HypothesisGenerator::new(config.max_hypotheses),
            parallel: ParallelEngine::new(interrogation),
            eliminator: HypothesisEliminator::new(config.elimination),
            synthesizer: StateSynthesizer::new(config.synthesis),
            config,
        }
    }

    /// Replace the evidence scorer and contradiction detector.
    #[must_use]
    pub fn with_heuristics(
        mut self,
        scorer: Arc<dyn EvidenceScorer>,
        detector: Arc<dyn ContradictionDetector>,
    ) -> Self {
        let interrogation = self
            .parallel
            .interrogation()
            .clone()
            .with_scorer(scorer)
            .with_detector(detector);
        self.parallel = ParallelEngine::new(interrogation);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Run the full lifecycle for `query`.
    pub async fn execute(&self, query: &str) -> DecisionResult {
        let intent = self.parser.parse(query);
        info!(
            category = %intent.category,
            uncertainty = intent.uncertainty,
            subgoals = intent.subgoals.len(),
            "intent parsed"
        );

        if let Some(reply) = intent.local_reply() {
            info!(category = %intent.category, "answered locally");
            return DecisionResult::local(query, &intent, reply);
        }

        let strategies = self.router.route(
            &intent,
            self.config.max_hypotheses,
            self.config.routing_budget,
        );
        if strategies.is_empty() {
            info!(category = %intent.category, "no source strategies for query");
            return DecisionResult::unable(query, &intent, NO_STRATEGIES);
        }
        info!(
            strategies = strategies.len(),
            cost = strategies.iter().map(|s| s.cost).sum::<f64>(),
            "sources routed"
        );

        let hypotheses = self.generator.generate(&intent, &strategies);
        info!(hypotheses = hypotheses.len(), "hypotheses generated");

        let mut population: Vec<Hypothesis> = Vec::new();
        let mut reports: Vec<RunReport> = Vec::new();

        let first = self.parallel.run_parallel(hypotheses).await;
        let mut lost = collect(first, &mut population, &mut reports);
        info!(
            completed = reports.len(),
            converged = reports.iter().filter(|r| r.converged).count(),
            lost,
            "interrogation finished"
        );
        debug!(
            continue_search = self
                .eliminator
                .should_continue_search(&population, self.config.confidence_threshold),
            "first batch assessed"
        );

        let forks: Vec<Hypothesis> = population
            .iter()
            .filter(|h| h.is_active() && should_fork(h))
            .map(|h| self.generator.fork(h))
            .collect();
        let fork_count = forks.len();
        if fork_count > 0 {
            info!(forks = fork_count, "forking contradicted hypotheses");
            let second = self.parallel.run_parallel(forks).await;
            lost += collect(second, &mut population, &mut reports);
        }

        let total = population.len() + lost;
        let partition = self.eliminator.eliminate_weak(population, Some(&reports));
        let summary = self.eliminator.report(&partition);
        info!(
            survivors = summary.survivors,
            eliminated = summary.eliminated,
            rate = summary.elimination_rate,
            "elimination complete"
        );
        debug!("{}", self.eliminator.elimination_report(&partition.eliminated));

        let survivors = self.eliminator.rank(partition.survivors);
        let synthesis = self.synthesizer.synthesize(&survivors, &partition.eliminated);
        info!(
            confidence = synthesis.confidence,
            uncertainty = %synthesis.uncertainty,
            survivors = survivors.len(),
            "decision synthesized"
        );

        let counts = HypothesisCounts {
            total,
            surviving: survivors.len(),
            eliminated: partition.eliminated.len(),
            lost,
        };
        let metadata = ExecutionMetadata {
            strategies_used: strategies.iter().map(|s| s.source_type).collect(),
            forks: fork_count,
            elimination_reasons: summary.reasons,
            runs: reports,
            ..ExecutionMetadata::default()
        };
        DecisionResult::from_synthesis(query, &intent, synthesis, counts, metadata)
    }

    /// Estimate whether `query` is answerable without interrogating anything.
    pub fn can_answer(&self, query: &str) -> Answerability {
        let intent = self.parser.parse(query);
        let strategies = self.router.route(
            &intent,
            self.config.max_hypotheses,
            self.config.routing_budget,
        );
        Answerability::assess(&intent, &strategies)
    }
}

/// Move a batch's hypotheses and reports into the working set.
/// Returns how many hypotheses the batch lost to failed tasks.
fn collect(
    outcome: ParallelOutcome,
    population: &mut Vec<Hypothesis>,
    reports: &mut Vec<RunReport>,
) -> usize {
    if outcome.failed > 0 {
        warn!(failed = outcome.failed, "hypotheses lost to failed tasks");
    }
    for result in outcome.results {
        let (hypothesis, report) = result.into_parts();
        population.push(hypothesis);
        reports.push(report);
    }
    population.extend(outcome.skipped);
    outcome.failed
}

// =============================================================================
// TESTS
// =============================================================================
