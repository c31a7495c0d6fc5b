//! End-to-end lifecycle tests for the engine.
//!
//! Uses scripted evidence sources so every scenario is deterministic.

// Allow unwrap and panic in tests - these are standard for test code
#![allow(clippy::unwrap_used, clippy::panic)]

use assay::config::EngineConfig;
use assay::engine::{Engine, NO_STRATEGIES};
use assay::source::{EvidenceSource, SimulatedSource, SourceError};
use assay_core::{
    ContradictionDetector, DecisionCategory, EvidenceScorer, NegationOverlap, SourceRecord,
    UncertaintyLevel, synthesizer::NO_DECISION,
};
use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

// =============================================================================
// HELPERS
// =============================================================================

type Script = dyn Fn(&str) -> Vec<SourceRecord> + Send + Sync;

/// Answers each query through a closure and counts calls.
struct ScriptedSource {
    script: Box<Script>,
    calls: AtomicUsize,
}

impl ScriptedSource {
    fn new(script: impl Fn(&str) -> Vec<SourceRecord> + Send + Sync + 'static) -> Arc<Self> {
        Arc::new(Self {
            script: Box::new(script),
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EvidenceSource for ScriptedSource {
    async fn query(&self, text: &str) -> Result<Vec<SourceRecord>, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok((self.script)(text))
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// Reads the score from record metadata.
struct MetadataScore;

impl EvidenceScorer for MetadataScore {
    fn score(&self, record: &SourceRecord) -> f64 {
        record
            .metadata
            .get("score")
            .and_then(|s| s.parse().ok())
            .unwrap_or(0.5)
    }
}

fn scored(content: &str, source: &str, score: f64) -> SourceRecord {
    SourceRecord::ok(content, source).with_meta("score", score.to_string())
}

fn strong_records(query: &str) -> Vec<SourceRecord> {
    vec![
        scored(&format!("Reference texts describe {query} in consistent terms"), "reference.org", 0.8),
        scored(&format!("Lecture notes about {query} agree with the reference texts"), "uni.edu", 0.8),
    ]
}

fn engine_with(source: Arc<dyn EvidenceSource>, config: EngineConfig) -> Engine {
    let detector: Arc<dyn ContradictionDetector> = Arc::new(NegationOverlap::default());
    Engine::new(config, source).with_heuristics(Arc::new(MetadataScore), detector)
}

// =============================================================================
// SCENARIOS
// =============================================================================

#[tokio::test]
async fn test_factual_query_with_simulated_source() {
    let engine = Engine::new(EngineConfig::default(), Arc::new(SimulatedSource::new()));
    let result = engine.execute("What is quantum computing?").await;

    assert_eq!(result.intent.category, DecisionCategory::Factual);
    assert!(result.is_decided());
    assert!(result.confidence > 0.7);
    assert_eq!(result.hypotheses.surviving, 3);
    assert_eq!(result.alternatives.len(), 2);
    assert!(result.decision.contains("Sources: reference.example.org"));
    assert!(result.confidence_interval.0 <= result.confidence_interval.1);
}

#[tokio::test]
async fn test_no_strategies_yields_zero_confidence() {
    let source = ScriptedSource::new(strong_records);
    let engine = engine_with(source.clone(), EngineConfig::default());
    let result = engine.execute("Write a function that sorts a list").await;

    assert!(result.decision.contains(NO_STRATEGIES));
    assert_eq!(result.confidence, 0.0);
    assert_eq!(result.hypotheses.total, 0);
    assert_eq!(result.metadata.failure_reason.as_deref(), Some(NO_STRATEGIES));
    assert_eq!(source.calls(), 0);
}

#[tokio::test]
async fn test_zero_budget_eliminates_everything() {
    let source = ScriptedSource::new(strong_records);
    let config = EngineConfig {
        budget_per_hypothesis: 0.0,
        ..EngineConfig::default()
    };
    let result = engine_with(source.clone(), config).execute("What is entropy?").await;

    assert!(result.metadata.runs.iter().all(|r| r.reason.as_str() == "budget_exceeded"));
    assert!(source.calls() <= result.metadata.runs.len());
    assert_eq!(result.decision, NO_DECISION);
    assert_eq!(result.confidence, 0.0);
    assert_eq!(result.confidence_interval, (0.0, 0.0));
    assert_eq!(result.uncertainty, UncertaintyLevel::Unknown);
    assert_eq!(result.hypotheses.surviving, 0);
    assert_eq!(result.hypotheses.eliminated, result.hypotheses.total);
    assert_eq!(
        result.metadata.failure_reason.as_deref(),
        Some("all_hypotheses_eliminated")
    );
}

#[tokio::test]
async fn test_weak_source_is_eliminated() {
    let source = ScriptedSource::new(|query| {
        if query.starts_with("documentation") {
            vec![SourceRecord::failed("docs.example.com")]
        } else {
            strong_records(query)
        }
    });
    let result = engine_with(source, EngineConfig::default())
        .execute("What is entropy?")
        .await;

    assert_eq!(result.hypotheses.total, 3);
    assert_eq!(result.hypotheses.surviving, 2);
    assert_eq!(result.hypotheses.eliminated, 1);
    assert_eq!(result.metadata.elimination_reasons.get("low_confidence"), Some(&1));
    assert!(result.is_decided());
}

#[tokio::test]
async fn test_panicked_task_is_counted_as_lost() {
    let source = ScriptedSource::new(|query| {
        if query.starts_with("documentation") {
            panic!("documentation index corrupted");
        }
        strong_records(query)
    });
    let result = engine_with(source, EngineConfig::default())
        .execute("What is entropy?")
        .await;

    let counts = result.hypotheses;
    assert_eq!(counts.total, 3);
    assert_eq!(counts.lost, 1);
    assert_eq!(counts.surviving, 2);
    assert_eq!(counts.total, counts.surviving + counts.eliminated + counts.lost);
    assert_eq!(result.metadata.runs.len(), 2);
    assert!(result.to_text().contains("2 surviving, 0 eliminated, 1 lost"));
}

#[tokio::test]
async fn test_contradiction_forks_hypothesis() {
    let source = ScriptedSource::new(|query| {
        if query.starts_with("scholarly") {
            vec![
                scored("The new treatment reduces symptoms in most adult patients", "journal.edu", 0.95),
                scored("The new treatment does not reduce symptoms in most adult patients", "blog.example.com", 0.1),
            ]
        } else if query.starts_with("clarify") {
            Vec::new()
        } else {
            strong_records(query)
        }
    });
    let result = engine_with(source, EngineConfig::default())
        .execute("What is the new treatment for migraines?")
        .await;

    assert_eq!(result.metadata.forks, 1);
    assert_eq!(result.hypotheses.total, 4);
    assert!(!result.contradictions.is_empty());
    assert!(result.contradictions[0].severity > 0.6);
    assert!(result.alternatives.iter().any(|a| a.starts_with("Forked from:")));
}

#[tokio::test]
async fn test_predictive_population_is_capped() {
    let engine = Engine::new(EngineConfig::default(), Arc::new(SimulatedSource::new()));
    let result = engine
        .execute("Will quantum computers maybe break encryption?")
        .await;

    assert_eq!(result.intent.category, DecisionCategory::Predictive);
    assert_eq!(result.hypotheses.total, 5);
}

#[tokio::test]
async fn test_unavailable_source_still_returns_decision() {
    struct Down;

    #[async_trait]
    impl EvidenceSource for Down {
        async fn query(&self, _text: &str) -> Result<Vec<SourceRecord>, SourceError> {
            Err(SourceError::Unavailable(String::from("maintenance")))
        }

        fn name(&self) -> &str {
            "down"
        }
    }

    let engine = Engine::new(EngineConfig::default(), Arc::new(Down));
    let result = engine.execute("What is entropy?").await;

    assert_eq!(result.confidence, 0.0);
    assert!(
        result
            .metadata
            .runs
            .iter()
            .all(|r| r.reason.as_str() == "max_iterations_exceeded" && r.total_cost == 0.0)
    );
}

#[test]
fn test_can_answer_reports_estimates() {
    let engine = Engine::new(EngineConfig::default(), Arc::new(SimulatedSource::new()));
    let assessment = engine.can_answer("What is entropy?");

    assert!(assessment.answerable);
    assert!((assessment.estimated_time_secs - 6.0).abs() < 1e-9);
    assert!((assessment.estimated_cost - 8.0).abs() < 1e-9);
}
