//! # Router Module
//!
//! Maps an intent to a ranked, budget-bounded list of source strategies.
//!
//! Every source type carries a fixed profile (trust, freshness, depth, cost).
//! The router picks candidate types for the intent's category, adjusts them
//! for the intent's constraints, scores each candidate by expected value and
//! keeps the best ones that fit both the strategy limit and the cost budget.

use crate::intent::{DecisionCategory, Intent};
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// SOURCE TYPES
// =============================================================================

/// The closed set of evidence source kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    FormalDocs,
    Academic,
    Forums,
    LiveData,
    Social,
    CodeRepos,
    News,
    Encyclopedic,
    QaSites,
    Government,
}

/// Static characteristics of a source type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SourceProfile {
    pub trust: f64,
    pub freshness: f64,
    pub depth: f64,
    pub cost: f64,
}

impl SourceType {
    pub const ALL: [Self; 10] = [
        Self::FormalDocs,
        Self::Academic,
        Self::Forums,
        Self::LiveData,
        Self::Social,
        Self::CodeRepos,
        Self::News,
        Self::Encyclopedic,
        Self::QaSites,
        Self::Government,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FormalDocs => "formal_docs",
            Self::Academic => "academic",
            Self::Forums => "forums",
            Self::LiveData => "live_data",
            Self::Social => "social",
            Self::CodeRepos => "code_repos",
            Self::News => "news",
            Self::Encyclopedic => "encyclopedic",
            Self::QaSites => "qa_sites",
            Self::Government => "government",
        }
    }

    pub fn profile(&self) -> SourceProfile {
        let (trust, freshness, depth, cost) = match self {
            Self::FormalDocs => (0.9, 0.6, 0.8, 2.0),
            Self::Academic => (0.95, 0.4, 0.95, 5.0),
            Self::Forums => (0.5, 0.8, 0.6, 1.0),
            Self::LiveData => (0.85, 1.0, 0.3, 3.0),
            Self::Social => (0.3, 0.95, 0.2, 1.0),
            Self::CodeRepos => (0.7, 0.7, 0.7, 2.0),
            Self::News => (0.6, 0.9, 0.4, 1.5),
            Self::Encyclopedic => (0.8, 0.5, 0.7, 1.0),
            Self::QaSites => (0.65, 0.7, 0.5, 1.5),
            Self::Government => (0.9, 0.5, 0.6, 3.0),
        };
        SourceProfile {
            trust,
            freshness,
            depth,
            cost,
        }
    }

    /// The query issued first against this source for `goal`.
    pub fn query_template(&self, goal: &str) -> String {
        match self {
            Self::Encyclopedic => goal.to_string(),
            Self::Academic => format!("scholarly {goal}"),
            Self::Forums => format!("discussion {goal}"),
            Self::News => format!("latest {goal}"),
            Self::QaSites => format!("how to {goal}"),
            Self::FormalDocs => format!("documentation {goal}"),
            Self::CodeRepos => format!("code {goal}"),
            Self::LiveData => format!("current {goal}"),
            Self::Social => format!("opinion {goal}"),
            Self::Government => format!("official {goal}"),
        }
    }

    /// How well this source type suits a decision category.
    pub fn alignment(&self, category: DecisionCategory) -> f64 {
        use DecisionCategory as C;
        match (category, self) {
            (C::Factual, Self::Encyclopedic) => 0.9,
            (C::Factual, Self::Academic) => 0.85,
            (C::Factual, Self::FormalDocs) => 0.8,
            (C::Factual, Self::QaSites) => 0.6,
            (C::Predictive, Self::LiveData) => 0.9,
            (C::Predictive, Self::News) => 0.8,
            (C::Predictive, Self::Academic) => 0.7,
            (C::Predictive, Self::Social) => 0.5,
            (C::Procedural, Self::FormalDocs) => 0.9,
            (C::Procedural, Self::QaSites) => 0.85,
            (C::Procedural, Self::CodeRepos) => 0.8,
            (C::Procedural, Self::Forums) => 0.6,
            _ => 0.5,
        }
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How recent the evidence should be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Freshness {
    Any,
    Recent,
}

// =============================================================================
// STRATEGY
// =============================================================================

/// One way of interrogating a source type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceStrategy {
    pub source_type: SourceType,
    pub priority: f64,
    pub query_template: String,
    pub trust_score: f64,
    pub freshness: Freshness,
    /// Cost charged per successful query.
    pub cost: f64,
    pub expected_value: f64,
}

impl SourceStrategy {
    /// Strategy with the profile values of `source_type` and neutral priority.
    #[must_use]
    pub fn for_source(source_type: SourceType, goal: &str) -> Self {
        let profile = source_type.profile();
        Self {
            source_type,
            priority: 0.5,
            query_template: source_type.query_template(goal),
            trust_score: profile.trust,
            freshness: Freshness::Any,
            cost: profile.cost,
            expected_value: 0.5,
        }
    }

    /// Ranking score: trust 40%, expected value 30%, priority 20%, cheapness 10%.
    pub fn compute_score(&self) -> f64 {
        let cost_efficiency = 1.0 - (self.cost / 10.0).min(1.0);
        0.4 * self.trust_score + 0.3 * self.expected_value + 0.2 * self.priority + 0.1 * cost_efficiency
    }
}

// =============================================================================
// ROUTER
// =============================================================================

/// Chooses source strategies for an intent.
#[derive(Debug, Clone, Copy, Default)]
pub struct SourceRouter;

impl SourceRouter {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Candidate source types for a category before constraints apply.
    pub fn candidates(&self, category: DecisionCategory) -> Vec<SourceType> {
        use SourceType as S;
        match category {
            DecisionCategory::Factual => vec![S::Encyclopedic, S::FormalDocs, S::Academic],
            DecisionCategory::Comparative => {
                vec![S::Encyclopedic, S::QaSites, S::Forums, S::Academic]
            }
            DecisionCategory::Predictive => vec![S::LiveData, S::News, S::Social, S::Academic],
            DecisionCategory::Strategic => vec![S::Academic, S::FormalDocs, S::QaSites, S::Forums],
            DecisionCategory::Analytical => vec![S::Academic, S::FormalDocs, S::Encyclopedic],
            DecisionCategory::Procedural => {
                vec![S::FormalDocs, S::QaSites, S::Forums, S::CodeRepos]
            }
            DecisionCategory::Generative
            | DecisionCategory::Social
            | DecisionCategory::Meta
            | DecisionCategory::Creative => Vec::new(),
        }
    }

    /// Select at most `max_strategies` strategies whose total cost stays within `budget`.
    ///
    /// Candidates are ordered by [`SourceStrategy::compute_score`] (stable on
    /// ties). A candidate that would exceed the remaining budget is skipped and
    /// cheaper candidates further down are still considered.
    pub fn route(&self, intent: &Intent, max_strategies: usize, budget: f64) -> Vec<SourceStrategy> {
        let mut types = self.candidates(intent.category);
        if types.is_empty() {
            return Vec::new();
        }

        if intent.constraints.wants_recent() {
            types.extend([SourceType::News, SourceType::LiveData]);
        }
        if intent.constraints.wants_academic() {
            types.retain(|t| matches!(t, SourceType::Academic | SourceType::FormalDocs));
        }

        let mut seen: Vec<SourceType> = Vec::with_capacity(types.len());
        types.retain(|t| {
            if seen.contains(t) {
                false
            } else {
                seen.push(*t);
                true
            }
        });

        let mut strategies: Vec<SourceStrategy> = types
            .into_iter()
            .map(|t| self.build_strategy(t, intent))
            .collect();
        strategies.sort_by(|a, b| b.compute_score().total_cmp(&a.compute_score()));

        let mut selected = Vec::new();
        let mut spent = 0.0;
        for strategy in strategies {
            if selected.len() >= max_strategies {
                break;
            }
            if spent + strategy.cost > budget {
                continue;
            }
            spent += strategy.cost;
            selected.push(strategy);
        }
        selected
    }

    fn build_strategy(&self, source_type: SourceType, intent: &Intent) -> SourceStrategy {
        let profile = source_type.profile();
        let recent = intent.constraints.wants_recent();

        let priority = if intent.uncertainty > 0.7 {
            profile.trust
        } else if intent.uncertainty < 0.3 {
            profile.freshness
        } else {
            (profile.trust + profile.freshness) / 2.0
        };

        let efficiency = (profile.trust / (profile.cost + 0.1)).min(1.0);
        let timeliness = if recent { profile.freshness * 0.2 } else { 0.2 };
        let expected_value =
            (source_type.alignment(intent.category) * 0.5 + efficiency * 0.3 + timeliness).min(1.0);

        SourceStrategy {
            source_type,
            priority,
            query_template: source_type.query_template(&intent.goal),
            trust_score: profile.trust,
            freshness: if recent { Freshness::Recent } else { Freshness::Any },
            cost: profile.cost,
            expected_value,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intent::IntentParser;

    fn intent(query: &str) -> Intent {
        IntentParser::new().parse(query)
    }

    #[test]
    fn factual_query_routes_to_reference_sources() {
        let strategies = SourceRouter::new().route(&intent("What is quantum computing?"), 5, 10.0);
        let types: Vec<SourceType> = strategies.iter().map(|s| s.source_type).collect();

        assert_eq!(types.len(), 3);
        assert!(types.contains(&SourceType::Encyclopedic));
        assert!(types.contains(&SourceType::FormalDocs));
        assert!(types.contains(&SourceType::Academic));
    }

    #[test]
    fn strategies_are_sorted_by_score() {
        let strategies = SourceRouter::new().route(&intent("Compare tabs versus spaces"), 5, 100.0);
        assert!(
            strategies
                .windows(2)
                .all(|w| w[0].compute_score() >= w[1].compute_score())
        );
    }

    #[test]
    fn budget_skips_expensive_candidates() {
        // Academic costs 5.0 and cannot fit; cheaper ones still can.
        let strategies = SourceRouter::new().route(&intent("What is quantum computing?"), 5, 3.5);
        let total: f64 = strategies.iter().map(|s| s.cost).sum();

        assert!(total <= 3.5);
        assert!(strategies.iter().all(|s| s.source_type != SourceType::Academic));
        assert!(!strategies.is_empty());
    }

    #[test]
    fn max_strategies_limits_selection() {
        let strategies = SourceRouter::new().route(&intent("What is quantum computing?"), 1, 10.0);
        assert_eq!(strategies.len(), 1);
    }

    #[test]
    fn zero_budget_selects_nothing() {
        assert!(SourceRouter::new().route(&intent("What is entropy?"), 5, 0.0).is_empty());
    }

    #[test]
    fn non_interrogable_categories_route_nowhere() {
        let router = SourceRouter::new();
        assert!(router.route(&intent("Tell me a story"), 5, 10.0).is_empty());
        assert!(router.route(&intent("hello"), 5, 10.0).is_empty());
    }

    #[test]
    fn recent_constraint_adds_timely_sources() {
        let strategies =
            SourceRouter::new().route(&intent("What is the latest rust release?"), 10, 100.0);
        let types: Vec<SourceType> = strategies.iter().map(|s| s.source_type).collect();

        assert!(types.contains(&SourceType::News));
        assert!(types.contains(&SourceType::LiveData));
        assert!(strategies.iter().all(|s| s.freshness == Freshness::Recent));
    }

    #[test]
    fn academic_constraint_filters_candidates() {
        let strategies = SourceRouter::new().route(
            &intent("What is the academic consensus on dark matter?"),
            10,
            100.0,
        );
        assert!(strategies.iter().all(|s| matches!(
            s.source_type,
            SourceType::Academic | SourceType::FormalDocs
        )));
        assert_eq!(strategies.len(), 2);
    }

    #[test]
    fn duplicates_are_removed() {
        let strategies = SourceRouter::new().route(&intent("Will the latest chips win?"), 10, 100.0);
        let mut types: Vec<SourceType> = strategies.iter().map(|s| s.source_type).collect();
        let before = types.len();
        types.sort();
        types.dedup();
        assert_eq!(types.len(), before);
    }

    #[test]
    fn score_weights_trust_over_priority() {
        let mut strategy = SourceStrategy::for_source(SourceType::Encyclopedic, "x");
        strategy.trust_score = 1.0;
        strategy.expected_value = 0.0;
        strategy.priority = 0.0;
        strategy.cost = 10.0;
        assert!((strategy.compute_score() - 0.4).abs() < 1e-9);

        strategy.cost = 0.0;
        assert!((strategy.compute_score() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn templates_prefix_goal() {
        assert_eq!(SourceType::Academic.query_template("x"), "scholarly x");
        assert_eq!(SourceType::Encyclopedic.query_template("x"), "x");
        assert_eq!(SourceType::Government.query_template("x"), "official x");
    }

    #[test]
    fn expected_value_never_exceeds_one() {
        let strategies = SourceRouter::new().route(&intent("How to install rust"), 10, 100.0);
        assert!(strategies.iter().all(|s| s.expected_value <= 1.0));
    }
}
