//! # Heuristics Module
//!
//! Pluggable judgement calls: when two pieces of evidence disagree, and how
//! much a raw source record should be trusted.
//!
//! Both sit behind traits so the interrogation step never hard-codes a
//! particular rule. The defaults are deliberately simple lexical rules.

use crate::evidence::{Evidence, SourceRecord};
use std::collections::BTreeSet;

// =============================================================================
// CONTRADICTION DETECTION
// =============================================================================

/// Decides whether two pieces of evidence contradict each other.
pub trait ContradictionDetector: Send + Sync {
    /// Returns the severity in `[0, 1]` if `a` and `b` contradict.
    fn contradiction(&self, a: &Evidence, b: &Evidence) -> Option<f64>;
}

/// Negation asymmetry plus topical overlap.
///
/// Two texts contradict when exactly one of them contains a negation term and
/// they share at least `min_shared_words` lowercase words. Severity is the
/// absolute difference of the two confidences.
#[derive(Debug, Clone)]
pub struct NegationOverlap {
    negations: BTreeSet<String>,
    min_shared_words: usize,
}

impl Default for NegationOverlap {
    fn default() -> Self {
        Self::new(["not", "no", "never", "neither", "none", "nobody"], 4)
    }
}

impl NegationOverlap {
    #[must_use]
    pub fn new<I, S>(negations: I, min_shared_words: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            negations: negations.into_iter().map(Into::into).collect(),
            min_shared_words,
        }
    }

    fn is_negated(&self, words: &BTreeSet<String>) -> bool {
        words.iter().any(|w| self.negations.contains(w))
    }
}

impl ContradictionDetector for NegationOverlap {
    fn contradiction(&self, a: &Evidence, b: &Evidence) -> Option<f64> {
        let words_a = word_set(a.content());
        let words_b = word_set(b.content());

        if self.is_negated(&words_a) == self.is_negated(&words_b) {
            return None;
        }

        let shared = words_a.intersection(&words_b).count();
        if shared < self.min_shared_words {
            return None;
        }

        Some((a.confidence() - b.confidence()).abs())
    }
}

/// Lowercase words with surrounding punctuation trimmed.
pub fn word_set(text: &str) -> BTreeSet<String> {
    text.split_whitespace()
        .map(|w| {
            w.trim_matches(|c: char| !c.is_alphanumeric() && c != '\'')
                .to_lowercase()
        })
        .filter(|w| !w.is_empty())
        .collect()
}

// =============================================================================
// EVIDENCE SCORING
// =============================================================================

/// Assigns a confidence to a raw source record.
pub trait EvidenceScorer: Send + Sync {
    /// Score in `[0, 1]`.
    fn score(&self, record: &SourceRecord) -> f64;
}

/// Domain reputation, content length and verification flag.
#[derive(Debug, Clone)]
pub struct DomainReputation {
    /// Source substrings that earn the reputation bonus.
    pub trusted_markers: Vec<String>,
    pub base: f64,
    pub reputation_bonus: f64,
    pub long_content_chars: usize,
    pub short_content_chars: usize,
}

impl Default for DomainReputation {
    fn default() -> Self {
        Self {
            trusted_markers: vec![".edu".into(), ".gov".into(), ".org".into()],
            base: 0.5,
            reputation_bonus: 0.2,
            long_content_chars: 500,
            short_content_chars: 100,
        }
    }
}

impl EvidenceScorer for DomainReputation {
    fn score(&self, record: &SourceRecord) -> f64 {
        let mut score = self.base;

        let source = record.source.to_lowercase();
        if self.trusted_markers.iter().any(|m| source.contains(m.as_str())) {
            score += self.reputation_bonus;
        }

        let length = record.content.chars().count();
        if length > self.long_content_chars {
            score += 0.1;
        } else if length < self.short_content_chars {
            score -= 0.1;
        }

        if record.metadata.get("verified").is_some_and(|v| v == "true") {
            score += 0.1;
        }

        score.clamp(0.0, 1.0)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negation_with_overlap_contradicts() {
        let detector = NegationOverlap::default();
        let a = Evidence::new("Coffee consumption is linked to longer life expectancy", "a.org", 0.8);
        let b = Evidence::new("Coffee consumption is not linked to longer life expectancy", "b.com", 0.3);

        let severity = detector.contradiction(&a, &b);
        assert!(severity.is_some_and(|s| (s - 0.5).abs() < 1e-9));
    }

    #[test]
    fn both_negated_is_not_a_contradiction() {
        let detector = NegationOverlap::default();
        let a = Evidence::new("Coffee is not linked to longer life expectancy", "a.org", 0.8);
        let b = Evidence::new("Coffee is never linked to longer life expectancy", "b.com", 0.3);
        assert_eq!(detector.contradiction(&a, &b), None);
    }

    #[test]
    fn small_overlap_is_not_a_contradiction() {
        let detector = NegationOverlap::default();
        let a = Evidence::new("Rust compiles fast", "a.org", 0.8);
        let b = Evidence::new("Python does not compile", "b.com", 0.3);
        assert_eq!(detector.contradiction(&a, &b), None);
    }

    #[test]
    fn word_set_trims_punctuation() {
        let words = word_set("Not. really, NO!");
        assert!(words.contains("not"));
        assert!(words.contains("no"));
        assert!(words.contains("really"));
    }

    #[test]
    fn short_unverified_record_scores_below_base() {
        let scorer = DomainReputation::default();
        let record = SourceRecord::ok("tiny", "example.com");
        assert!((scorer.score(&record) - 0.4).abs() < 1e-9);
    }

    #[test]
    fn reputable_long_verified_record_scores_high() {
        let scorer = DomainReputation::default();
        let record = SourceRecord::ok("a".repeat(600), "https://cs.stanford.edu/page")
            .with_meta("verified", "true");
        assert!((scorer.score(&record) - 0.9).abs() < 1e-9);
    }

    #[test]
    fn medium_length_record_keeps_base() {
        let scorer = DomainReputation::default();
        let record = SourceRecord::ok("b".repeat(200), "blog.example.com");
        assert!((scorer.score(&record) - 0.5).abs() < 1e-9);
    }
}
