//! # Hypothesis Module
//!
//! A hypothesis is a candidate line of inquiry: one source strategy applied
//! to the intent's goal, with its own cognitive state. The generator builds
//! the initial population and forks existing hypotheses into variants.

use crate::eliminator::EliminationReason;
use crate::evidence::char_prefix;
use crate::intent::{DecisionCategory, Intent};
use crate::router::SourceStrategy;
use crate::state::{CognitiveState, UncertaintyLevel};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Uncertainty above which a contrarian hypothesis joins the population.
pub const CONTRARIAN_UNCERTAINTY: f64 = 0.7;

// =============================================================================
// IDENTIFIER
// =============================================================================

/// Unique hypothesis identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HypothesisId(pub Uuid);

impl HypothesisId {
    /// A fresh random identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// First eight hex digits, for log lines.
    pub fn short(&self) -> String {
        self.0.simple().to_string()[..8].to_string()
    }
}

impl Default for HypothesisId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for HypothesisId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// =============================================================================
// HYPOTHESIS
// =============================================================================

/// A candidate line of inquiry and everything learned along it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hypothesis {
    pub id: HypothesisId,
    pub description: String,
    pub assumptions: Vec<String>,
    pub strategy: SourceStrategy,
    pub state: CognitiveState,
    /// Mirrors `state.confidence()` after each interrogation step.
    pub confidence: f64,
    /// Cumulative cost charged across every run, forks included.
    pub cost: f64,
    pub eliminated: bool,
    pub elimination_reason: Option<EliminationReason>,
}

impl Hypothesis {
    /// A fresh, active hypothesis with an empty state.
    #[must_use]
    pub fn new(
        description: impl Into<String>,
        assumptions: Vec<String>,
        strategy: SourceStrategy,
    ) -> Self {
        Self {
            id: HypothesisId::new(),
            description: description.into(),
            assumptions,
            strategy,
            state: CognitiveState::new(),
            confidence: 0.0,
            cost: 0.0,
            eliminated: false,
            elimination_reason: None,
        }
    }

    /// The knowledge topic this hypothesis files evidence under.
    pub fn topic(&self) -> &str {
        &self.description
    }

    pub fn is_active(&self) -> bool {
        !self.eliminated
    }

    pub fn evidence_count(&self) -> usize {
        self.state.evidence_count()
    }

    pub fn contradiction_count(&self) -> usize {
        self.state.contradictions().len()
    }

    /// Mean evidence confidence, `0.0` without evidence.
    pub fn average_evidence_confidence(&self) -> f64 {
        self.state.average_evidence_confidence().unwrap_or(0.0)
    }

    /// Mark as eliminated. The first recorded reason is kept.
    pub fn eliminate(&mut self, reason: EliminationReason) {
        self.eliminated = true;
        if self.elimination_reason.is_none() {
            self.elimination_reason = Some(reason);
        }
    }
}

// =============================================================================
// GENERATOR
// =============================================================================

/// Builds the initial hypothesis population and forks.
#[derive(Debug, Clone, Copy)]
pub struct HypothesisGenerator {
    pub max_hypotheses: usize,
}

impl Default for HypothesisGenerator {
    fn default() -> Self {
        Self::new(5)
    }
}

impl HypothesisGenerator {
    #[must_use]
    pub fn new(max_hypotheses: usize) -> Self {
        Self { max_hypotheses }
    }

    /// Generate at most `max_hypotheses` hypotheses for `intent`.
    ///
    /// One hypothesis per strategy comes first. Comparative intents add a
    /// pair arguing for each option, predictive intents a positive/negative
    /// pair, and a highly uncertain intent adds a contrarian. All competing
    /// variants reuse the top strategy. Every hypothesis starts with an empty
    /// state at the intent's uncertainty level, confidence `0.0` and cost `0.0`.
    pub fn generate(&self, intent: &Intent, strategies: &[SourceStrategy]) -> Vec<Hypothesis> {
        let goal = char_prefix(&intent.goal, 50);
        let mut hypotheses: Vec<Hypothesis> = strategies
            .iter()
            .enumerate()
            .map(|(i, strategy)| {
                Hypothesis::new(
                    format!(
                        "Hypothesis {}: use {} to answer '{}'",
                        i + 1,
                        strategy.source_type,
                        goal
                    ),
                    vec![
                        format!("{} is reliable for this query", strategy.source_type),
                        format!("Trust score {:.2} is sufficient", strategy.trust_score),
                        format!("Freshness {:?} meets requirements", strategy.freshness),
                    ],
                    strategy.clone(),
                )
            })
            .collect();

        let Some(lead) = strategies.first() else {
            return hypotheses;
        };

        match intent.category {
            DecisionCategory::Comparative => {
                hypotheses.push(Hypothesis::new(
                    format!("First option is superior for '{goal}'"),
                    vec![String::from("The first option has better characteristics")],
                    lead.clone(),
                ));
                hypotheses.push(Hypothesis::new(
                    format!("Second option is superior for '{goal}'"),
                    vec![String::from("The second option has better characteristics")],
                    lead.clone(),
                ));
            }
            DecisionCategory::Predictive => {
                hypotheses.push(Hypothesis::new(
                    format!("Positive outcome is likely for '{goal}'"),
                    vec![String::from("Current trends point towards a positive outcome")],
                    lead.clone(),
                ));
                hypotheses.push(Hypothesis::new(
                    format!("Negative outcome is likely for '{goal}'"),
                    vec![String::from("Current trends point towards a negative outcome")],
                    lead.clone(),
                ));
            }
            _ => {}
        }

        if intent.uncertainty > CONTRARIAN_UNCERTAINTY {
            let premise = hypotheses
                .first()
                .and_then(|h| h.assumptions.first().cloned())
                .unwrap_or_else(|| intent.goal.clone());
            hypotheses.push(Hypothesis::new(
                format!("Contrarian: the opposite holds for '{}'", char_prefix(&intent.goal, 40)),
                vec![
                    format!("Assume the premise does not hold: {premise}"),
                    String::from("Contradictory evidence is more informative here"),
                ],
                lead.clone(),
            ));
        }

        hypotheses.truncate(self.max_hypotheses);
        let initial = UncertaintyLevel::from_score(intent.uncertainty);
        for hypothesis in &mut hypotheses {
            hypothesis.state = CognitiveState::with_uncertainty(initial);
        }
        hypotheses
    }

    /// Fork `original` into an independent variant.
    ///
    /// The fork gets a new id, a "Forked from" description, copied
    /// assumptions and strategy, a deep copy of the state, and the original's
    /// confidence and cost. It starts active.
    pub fn fork(&self, original: &Hypothesis) -> Hypothesis {
        Hypothesis {
            id: HypothesisId::new(),
            description: format!("Forked from: {}", original.description),
            assumptions: original.assumptions.clone(),
            strategy: original.strategy.clone(),
            state: original.state.fork(),
            confidence: original.confidence,
            cost: original.cost,
            eliminated: false,
            elimination_reason: None,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
