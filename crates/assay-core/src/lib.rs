//! # Assay Core
//!
//! The deterministic half of the Assay hypothesis lifecycle engine.
//!
//! A query becomes an [`Intent`], the intent is routed to a set of
//! [`SourceStrategy`] values, each strategy seeds a [`Hypothesis`] with its
//! own [`CognitiveState`], and the hypotheses are interrogated, pruned by the
//! [`HypothesisEliminator`] and merged by the [`StateSynthesizer`] into a
//! [`DecisionResult`].
//!
//! This crate owns every data type and scoring rule of that pipeline. It has
//! no async runtime, no I/O and no logging: the interrogation step is split
//! into pure functions ([`select_next_query`], [`absorb`]) that an async
//! driver sequences around evidence source calls.
//!
//! ## Modules
//!
//! - `evidence`: evidence, contradictions, raw source records
//! - `state`: the cognitive state and uncertainty levels
//! - `heuristics`: contradiction detection and evidence scoring traits
//! - `intent`: query classification
//! - `router`: source types and strategy selection
//! - `hypothesis`: hypotheses and their generator
//! - `interrogation`: loop limits, query selection, absorption, run results
//! - `eliminator`: elimination criteria and ranking
//! - `summarize`: text cleaning and extractive summaries
//! - `synthesizer`: aggregation into a decision
//! - `response`: the public decision and answerability formats

pub mod eliminator;
pub mod error;
pub mod evidence;
pub mod heuristics;
pub mod hypothesis;
pub mod intent;
pub mod interrogation;
pub mod response;
pub mod router;
pub mod state;
pub mod summarize;
pub mod synthesizer;

pub use eliminator::{
    EliminationCriteria, EliminationReason, EliminationReport, HypothesisEliminator, Partition,
};
pub use error::ValidationError;
pub use evidence::{Contradiction, Evidence, SourceRecord};
pub use heuristics::{ContradictionDetector, DomainReputation, EvidenceScorer, NegationOverlap};
pub use hypothesis::{Hypothesis, HypothesisGenerator, HypothesisId};
pub use intent::{Constraints, DecisionCategory, Intent, IntentParser};
pub use interrogation::{
    Absorbed, InterrogationResult, LoopLimits, RunReport, StopReason, absorb, select_next_query,
    should_fork,
};
pub use response::{
    Answerability, DecisionResult, ExecutionMetadata, HypothesisCounts, IntentSummary,
};
pub use router::{Freshness, SourceRouter, SourceStrategy, SourceType};
pub use state::{CognitiveState, StateSummary, UncertaintyLevel};
pub use summarize::{LeadSummarizer, SalienceSummarizer, Summarizer, SummarizerKind};
pub use synthesizer::{StateSynthesizer, SynthesisConfig, SynthesizedState};
