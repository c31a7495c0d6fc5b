//! # Eliminator Module
//!
//! Removes weak hypotheses and ranks the survivors.
//!
//! Rules are checked in order and the first that fires names the reason:
//! confidence floor, cost ceiling, evidence floor, contradiction ceiling,
//! optional convergence, and finally `Unknown` uncertainty with confidence
//! below 0.5.

use crate::error::{ValidationError, check_non_negative, check_unit};
use crate::hypothesis::{Hypothesis, HypothesisId};
use crate::interrogation::{RunReport, StopReason};
use crate::state::UncertaintyLevel;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// =============================================================================
// CRITERIA
// =============================================================================

/// Thresholds a hypothesis must satisfy to survive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EliminationCriteria {
    pub min_confidence: f64,
    pub max_cost: f64,
    pub min_evidence: usize,
    pub max_contradictions: usize,
    pub require_convergence: bool,
}

impl Default for EliminationCriteria {
    fn default() -> Self {
        Self {
            min_confidence: 0.3,
            max_cost: 10.0,
            min_evidence: 2,
            max_contradictions: 5,
            require_convergence: false,
        }
    }
}

impl EliminationCriteria {
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_unit("min_confidence", self.min_confidence)?;
        check_non_negative("max_cost", self.max_cost)
    }
}

// =============================================================================
// REASONS
// =============================================================================

/// Why a hypothesis was eliminated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum EliminationReason {
    LowConfidence { confidence: f64, minimum: f64 },
    CostTooHigh { cost: f64, maximum: f64 },
    InsufficientEvidence { count: usize, minimum: usize },
    TooManyContradictions { count: usize, maximum: usize },
    NotConverged { reason: StopReason },
    UnknownUncertainty { confidence: f64 },
}

impl EliminationReason {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::LowConfidence { .. } => "low_confidence",
            Self::CostTooHigh { .. } => "cost_too_high",
            Self::InsufficientEvidence { .. } => "insufficient_evidence",
            Self::TooManyContradictions { .. } => "too_many_contradictions",
            Self::NotConverged { .. } => "not_converged",
            Self::UnknownUncertainty { .. } => "unknown_uncertainty",
        }
    }
}

impl fmt::Display for EliminationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LowConfidence {
                confidence,
                minimum,
            } => write!(f, "Low confidence: {confidence:.2} < {minimum:.2}"),
            Self::CostTooHigh { cost, maximum } => {
                write!(f, "Cost too high: {cost:.2} > {maximum:.2}")
            }
            Self::InsufficientEvidence { count, minimum } => {
                write!(f, "Insufficient evidence: {count} < {minimum}")
            }
            Self::TooManyContradictions { count, maximum } => {
                write!(f, "Too many contradictions: {count} > {maximum}")
            }
            Self::NotConverged { reason } => write!(f, "Did not converge: {reason}"),
            Self::UnknownUncertainty { confidence } => {
                write!(f, "Uncertainty unknown with low confidence: {confidence:.2}")
            }
        }
    }
}

// =============================================================================
// ELIMINATOR
// =============================================================================

/// Partition of a population after elimination.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Partition {
    pub survivors: Vec<Hypothesis>,
    pub eliminated: Vec<Hypothesis>,
}

/// Applies [`EliminationCriteria`] and ranks survivors.
#[derive(Debug, Clone, Copy, Default)]
pub struct HypothesisEliminator {
    pub criteria: EliminationCriteria,
}

impl HypothesisEliminator {
    #[must_use]
    pub fn new(criteria: EliminationCriteria) -> Self {
        Self { criteria }
    }

    /// The first rule `hypothesis` violates, if any.
    ///
    /// The convergence rule applies only when `report` is present.
    pub fn check(&self, hypothesis: &Hypothesis, report: Option<&RunReport>) -> Option<EliminationReason> {
        let c = &self.criteria;

        if hypothesis.confidence < c.min_confidence {
            return Some(EliminationReason::LowConfidence {
                confidence: hypothesis.confidence,
                minimum: c.min_confidence,
            });
        }
        if hypothesis.cost > c.max_cost {
            return Some(EliminationReason::CostTooHigh {
                cost: hypothesis.cost,
                maximum: c.max_cost,
            });
        }
        let evidence = hypothesis.evidence_count();
        if evidence < c.min_evidence {
            return Some(EliminationReason::InsufficientEvidence {
                count: evidence,
                minimum: c.min_evidence,
            });
        }
        let contradictions = hypothesis.contradiction_count();
        if contradictions > c.max_contradictions {
            return Some(EliminationReason::TooManyContradictions {
                count: contradictions,
                maximum: c.max_contradictions,
            });
        }
        if c.require_convergence {
            if let Some(report) = report.filter(|r| !r.converged) {
                return Some(EliminationReason::NotConverged {
                    reason: report.reason,
                });
            }
        }
        if hypothesis.state.uncertainty() == UncertaintyLevel::Unknown && hypothesis.confidence < 0.5 {
            return Some(EliminationReason::UnknownUncertainty {
                confidence: hypothesis.confidence,
            });
        }
        None
    }

    /// Split `hypotheses` into survivors and eliminated, preserving order.
    ///
    /// Hypotheses already marked eliminated go straight to the eliminated
    /// side. `reports` are matched to hypotheses by id.
    pub fn eliminate_weak(
        &self,
        hypotheses: Vec<Hypothesis>,
        reports: Option<&[RunReport]>,
    ) -> Partition {
        let by_id: BTreeMap<HypothesisId, &RunReport> = reports
            .unwrap_or_default()
            .iter()
            .map(|r| (r.hypothesis_id, r))
            .collect();

        let mut partition = Partition::default();
        for mut hypothesis in hypotheses {
            if hypothesis.eliminated {
                partition.eliminated.push(hypothesis);
                continue;
            }
            match self.check(&hypothesis, by_id.get(&hypothesis.id).copied()) {
                Some(reason) => {
                    hypothesis.eliminate(reason);
                    partition.eliminated.push(hypothesis);
                }
                None => partition.survivors.push(hypothesis),
            }
        }
        partition
    }

    /// Ranking score: `0.4 c + 0.3 avg + 0.2 min(1, c / (cost + 0.1)) + (0.1 - min(0.1, 0.02 k))`
    /// where `c` is confidence, `avg` the mean evidence confidence and `k`
    /// the contradiction count.
    pub fn score(&self, hypothesis: &Hypothesis) -> f64 {
        let c = hypothesis.confidence;
        let efficiency = (c / (hypothesis.cost + 0.1)).min(1.0);
        let consistency = 0.1 - (0.02 * hypothesis.contradiction_count() as f64).min(0.1);
        0.4 * c + 0.3 * hypothesis.average_evidence_confidence() + 0.2 * efficiency + consistency
    }

    /// Active hypotheses ordered by [`Self::score`] descending, stable on ties.
    pub fn rank(&self, hypotheses: Vec<Hypothesis>) -> Vec<Hypothesis> {
        let mut scored: Vec<(f64, Hypothesis)> = hypotheses
            .into_iter()
            .filter(Hypothesis::is_active)
            .map(|h| (self.score(&h), h))
            .collect();
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));
        scored.into_iter().map(|(_, h)| h).collect()
    }

    /// The `n` top-ranked active hypotheses.
    pub fn select_best(&self, hypotheses: Vec<Hypothesis>, n: usize) -> Vec<Hypothesis> {
        let mut ranked = self.rank(hypotheses);
        ranked.truncate(n);
        ranked
    }

    /// False iff some active hypothesis already reached `threshold`.
    pub fn should_continue_search(&self, hypotheses: &[Hypothesis], threshold: f64) -> bool {
        !hypotheses
            .iter()
            .any(|h| h.is_active() && h.confidence >= threshold)
    }

    /// Aggregate view of an elimination pass.
    pub fn report(&self, partition: &Partition) -> EliminationReport {
        let mut reasons: BTreeMap<String, usize> = BTreeMap::new();
        for reason in partition.eliminated.iter().filter_map(|h| h.elimination_reason) {
            *reasons.entry(reason.code().to_string()).or_default() += 1;
        }

        let total = partition.survivors.len() + partition.eliminated.len();
        let avg = |items: &[Hypothesis]| {
            if items.is_empty() {
                0.0
            } else {
                items.iter().map(|h| h.confidence).sum::<f64>() / items.len() as f64
            }
        };

        EliminationReport {
            total,
            survivors: partition.survivors.len(),
            eliminated: partition.eliminated.len(),
            elimination_rate: if total == 0 {
                0.0
            } else {
                partition.eliminated.len() as f64 / total as f64
            },
            reasons,
            survivor_avg_confidence: avg(&partition.survivors),
            eliminated_avg_confidence: avg(&partition.eliminated),
        }
    }

    /// One line per eliminated hypothesis with its reason, under a count header.
    pub fn elimination_report(&self, eliminated: &[Hypothesis]) -> String {
        let mut out = format!("Eliminated {} hypotheses", eliminated.len());
        for h in eliminated {
            let reason = h
                .elimination_reason
                .map_or_else(|| String::from("unspecified"), |r| r.to_string());
            out.push_str(&format!("\n- [{}] {}: {}", h.id.short(), h.description, reason));
        }
        out
    }
}

/// Counts, rate, reason histogram and average confidences of an elimination pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EliminationReport {
    pub total: usize,
    pub survivors: usize,
    pub eliminated: usize,
    pub elimination_rate: f64,
    pub reasons: BTreeMap<String, usize>,
    pub survivor_avg_confidence: f64,
    pub eliminated_avg_confidence: f64,
}

// =============================================================================
// TESTS
// =============================================================================
