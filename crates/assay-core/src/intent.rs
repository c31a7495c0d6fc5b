//! # Intent Module
//!
//! Turns a free-text query into a structured intent: goal, subgoals,
//! decision category, initial uncertainty and constraints.
//!
//! Classification is keyword based. Each category owns a list of phrases
//! matched on word boundaries; the category with the most matches wins, ties
//! go to the earlier category in [`DecisionCategory::PRECEDENCE`], and a query
//! matching nothing is `Factual`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Upper bound on extracted subgoals.
pub const MAX_SUBGOALS: usize = 5;

// =============================================================================
// CATEGORY
// =============================================================================

/// What kind of decision a query asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionCategory {
    Factual,
    Comparative,
    Predictive,
    Strategic,
    Analytical,
    Procedural,
    Generative,
    Social,
    Meta,
    Creative,
}

impl DecisionCategory {
    /// Tie-break order when several categories match equally often.
    pub const PRECEDENCE: [Self; 10] = [
        Self::Social,
        Self::Meta,
        Self::Creative,
        Self::Generative,
        Self::Factual,
        Self::Comparative,
        Self::Predictive,
        Self::Strategic,
        Self::Analytical,
        Self::Procedural,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Factual => "factual",
            Self::Comparative => "comparative",
            Self::Predictive => "predictive",
            Self::Strategic => "strategic",
            Self::Analytical => "analytical",
            Self::Procedural => "procedural",
            Self::Generative => "generative",
            Self::Social => "social",
            Self::Meta => "meta",
            Self::Creative => "creative",
        }
    }

    /// Baseline uncertainty before query-specific adjustments.
    pub fn baseline_uncertainty(&self) -> f64 {
        match self {
            Self::Factual => 0.2,
            Self::Comparative | Self::Procedural => 0.3,
            Self::Analytical => 0.4,
            Self::Strategic => 0.5,
            Self::Predictive => 0.7,
            Self::Generative | Self::Social | Self::Meta | Self::Creative => 0.3,
        }
    }

    /// Phrases that signal this category. `Social` phrases must match the whole query.
    fn phrases(&self) -> &'static [&'static str] {
        match self {
            Self::Social => &[
                "hi",
                "hello",
                "hey",
                "how are you",
                "thanks",
                "thank you",
                "good morning",
                "good night",
                "bye",
                "goodbye",
                "see you",
            ],
            Self::Meta => &["who are you", "what are you", "what can you do"],
            Self::Creative => &["story", "poem", "joke", "tell me a"],
            Self::Generative => &["write", "create", "generate", "make", "code", "example"],
            Self::Factual => &["what is", "what are", "define", "explain"],
            Self::Comparative => &["compare", "vs", "versus", "difference", "better than"],
            Self::Predictive => &["will", "predict", "forecast", "future"],
            Self::Strategic => &["how to achieve", "strategy", "plan"],
            Self::Analytical => &["why", "cause", "reason"],
            Self::Procedural => &["how to", "how do", "steps", "procedure"],
        }
    }
}

impl fmt::Display for DecisionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// CONSTRAINTS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemporalConstraint {
    Recent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceConstraint {
    Academic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DepthConstraint {
    Deep,
    Shallow,
}

/// Optional restrictions extracted from the query wording.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Constraints {
    pub temporal: Option<TemporalConstraint>,
    pub source: Option<SourceConstraint>,
    pub depth: Option<DepthConstraint>,
}

impl Constraints {
    pub fn wants_recent(&self) -> bool {
        self.temporal == Some(TemporalConstraint::Recent)
    }

    pub fn wants_academic(&self) -> bool {
        self.source == Some(SourceConstraint::Academic)
    }
}

// =============================================================================
// INTENT
// =============================================================================

/// The structured reading of a query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Intent {
    pub raw_query: String,
    /// The first sentence of the query.
    pub goal: String,
    pub subgoals: Vec<String>,
    pub category: DecisionCategory,
    /// Initial uncertainty in `[0, 1]`.
    pub uncertainty: f64,
    pub constraints: Constraints,
}

impl Intent {
    /// A canned reply for conversational queries that need no evidence.
    ///
    /// Only `Social` and `Meta` queries get one. Everything else, including
    /// `Creative`, goes through routing.
    pub fn local_reply(&self) -> Option<&'static str> {
        let tokens = tokenize(&self.raw_query);
        let has = |phrase: &str| contains_phrase(&tokens, phrase);

        match self.category {
            DecisionCategory::Social if has("how are you") => {
                Some("All systems ready. Ask me something to investigate.")
            }
            DecisionCategory::Social if has("thanks") || has("thank you") => {
                Some("You're welcome! Anything else to look into?")
            }
            DecisionCategory::Social if has("bye") || has("goodbye") || has("see you") => {
                Some("Goodbye!")
            }
            DecisionCategory::Social => Some("Hello! What would you like me to investigate?"),
            DecisionCategory::Meta => Some(
                "I answer questions by testing competing hypotheses against evidence \
                 sources and reporting how confident the surviving ones are.",
            ),
            _ => None,
        }
    }
}

/// Keyword-driven query parser.
#[derive(Debug, Clone)]
pub struct IntentParser {
    hedges: Vec<&'static str>,
}

impl Default for IntentParser {
    fn default() -> Self {
        Self::new()
    }
}

impl IntentParser {
    #[must_use]
    pub fn new() -> Self {
        Self {
            hedges: vec!["maybe", "possibly", "probably", "might", "could"],
        }
    }

    /// Parse `query` into an [`Intent`].
    pub fn parse(&self, query: &str) -> Intent {
        let tokens = tokenize(query);
        let category = classify(&tokens);

        Intent {
            raw_query: query.to_string(),
            goal: first_sentence(query),
            subgoals: extract_subgoals(query),
            category,
            uncertainty: self.estimate_uncertainty(&tokens, category),
            constraints: extract_constraints(&tokens),
        }
    }

    fn estimate_uncertainty(&self, tokens: &[String], category: DecisionCategory) -> f64 {
        let hedges = tokens
            .iter()
            .filter(|t| self.hedges.contains(&t.as_str()))
            .count();

        let mut score = 0.15 * hedges as f64 + category.baseline_uncertainty();
        if tokens.len() > 50 {
            score += 0.1;
        } else if tokens.len() < 5 {
            score += 0.2;
        }
        score.min(1.0)
    }
}

// =============================================================================
// HELPERS
// =============================================================================

/// Lowercase alphanumeric words; apostrophes stay inside words.
fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric() && c != '\'')
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}

/// Whether `phrase` appears in `tokens` as a contiguous word sequence.
fn contains_phrase(tokens: &[String], phrase: &str) -> bool {
    let words: Vec<&str> = phrase.split_whitespace().collect();
    if words.is_empty() || words.len() > tokens.len() {
        return false;
    }
    tokens
        .windows(words.len())
        .any(|window| window.iter().zip(&words).all(|(t, w)| t == w))
}

fn classify(tokens: &[String]) -> DecisionCategory {
    let mut best: Option<(DecisionCategory, usize)> = None;

    for category in DecisionCategory::PRECEDENCE {
        let score = if category == DecisionCategory::Social {
            let joined = tokens.join(" ");
            usize::from(category.phrases().contains(&joined.as_str()))
        } else {
            category
                .phrases()
                .iter()
                .filter(|p| contains_phrase(tokens, p))
                .count()
        };

        if score > 0 && best.is_none_or(|(_, top)| score > top) {
            best = Some((category, score));
        }
    }

    best.map_or(DecisionCategory::Factual, |(category, _)| category)
}

/// Text up to the first sentence-ending period, trimmed.
fn first_sentence(query: &str) -> String {
    let trimmed = query.trim();
    let mut chars = trimmed.char_indices().peekable();
    while let Some((idx, c)) = chars.next() {
        if c == '.' && chars.peek().is_none_or(|(_, next)| next.is_whitespace()) {
            let sentence = trimmed[..idx].trim();
            if !sentence.is_empty() {
                return sentence.to_string();
            }
        }
    }
    trimmed.to_string()
}

fn extract_subgoals(query: &str) -> Vec<String> {
    let questions: Vec<String> = query
        .split('?')
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .map(|q| format!("{q}?"))
        .collect();
    if questions.len() > 1 {
        return questions.into_iter().take(MAX_SUBGOALS).collect();
    }

    let mut parts: Vec<String> = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for word in query.split_whitespace() {
        let bare = word
            .trim_matches(|c: char| !c.is_alphanumeric())
            .to_lowercase();
        if matches!(bare.as_str(), "and" | "or" | "also") {
            if !current.is_empty() {
                parts.push(current.join(" "));
                current.clear();
            }
        } else {
            current.push(word);
        }
    }
    if !current.is_empty() {
        parts.push(current.join(" "));
    }

    if parts.len() > 1 {
        parts.into_iter().take(MAX_SUBGOALS).collect()
    } else {
        Vec::new()
    }
}

fn extract_constraints(tokens: &[String]) -> Constraints {
    let any = |words: &[&str]| words.iter().any(|w| contains_phrase(tokens, w));

    Constraints {
        temporal: any(&["latest", "current", "recent", "today"]).then_some(TemporalConstraint::Recent),
        source: any(&["scientific", "academic", "research"]).then_some(SourceConstraint::Academic),
        depth: if any(&["detailed", "comprehensive", "in depth"]) {
            Some(DepthConstraint::Deep)
        } else if any(&["brief", "summary", "quick"]) {
            Some(DepthConstraint::Shallow)
        } else {
            None
        },
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(query: &str) -> Intent {
        IntentParser::new().parse(query)
    }

    #[test]
    fn classifies_common_queries() {
        assert_eq!(parse("What is quantum computing?").category, DecisionCategory::Factual);
        assert_eq!(
            parse("Python vs JavaScript for backend work?").category,
            DecisionCategory::Comparative
        );
        assert_eq!(
            parse("Will AI replace programmers?").category,
            DecisionCategory::Predictive
        );
        assert_eq!(
            parse("Why do leaves change colour in autumn?").category,
            DecisionCategory::Analytical
        );
        assert_eq!(
            parse("Steps for replacing a bike chain").category,
            DecisionCategory::Procedural
        );
        assert_eq!(
            parse("Write a function that parses dates").category,
            DecisionCategory::Generative
        );
        assert_eq!(parse("Tell me a story").category, DecisionCategory::Creative);
    }

    #[test]
    fn greeting_is_social_only_when_whole_query() {
        assert_eq!(parse("Hello!").category, DecisionCategory::Social);
        assert_ne!(parse("hello world protocol history").category, DecisionCategory::Social);
    }

    #[test]
    fn conversational_queries_get_local_replies() {
        assert_eq!(
            parse("Hello!").local_reply(),
            Some("Hello! What would you like me to investigate?")
        );
        assert_eq!(parse("Thanks").local_reply(), Some("You're welcome! Anything else to look into?"));
        assert_eq!(parse("Goodbye").local_reply(), Some("Goodbye!"));
        assert!(parse("What can you do?").local_reply().is_some());

        assert_eq!(parse("Tell me a story").local_reply(), None);
        assert_eq!(parse("What is entropy?").local_reply(), None);
    }

    #[test]
    fn ties_follow_precedence() {
        // "how to achieve" (strategic) and "how to" (procedural) both match once.
        assert_eq!(
            parse("How to achieve inbox zero").category,
            DecisionCategory::Strategic
        );
    }

    #[test]
    fn unmatched_query_is_factual() {
        assert_eq!(parse("photosynthesis in desert plants").category, DecisionCategory::Factual);
    }

    #[test]
    fn phrases_match_on_word_boundaries() {
        // "willow" must not trigger "will", "codes" must not trigger "code".
        let intent = parse("willow bark codes in folklore");
        assert_eq!(intent.category, DecisionCategory::Factual);
    }

    #[test]
    fn short_factual_query_uncertainty() {
        let intent = parse("What is 2+2?");
        assert!((intent.uncertainty - 0.4).abs() < 1e-9);
    }

    #[test]
    fn hedges_raise_uncertainty_and_cap_at_one() {
        let intent = parse("Maybe AI will probably transform society within a decade");
        assert_eq!(intent.category, DecisionCategory::Predictive);
        assert!((intent.uncertainty - 1.0).abs() < 1e-9);
    }

    #[test]
    fn goal_is_first_sentence() {
        let intent = parse("Explain Node.js event loops. Keep it short.");
        assert_eq!(intent.goal, "Explain Node.js event loops");
    }

    #[test]
    fn multiple_questions_become_subgoals() {
        let intent = parse("What is Rust? Who uses it? Is it fast?");
        assert_eq!(
            intent.subgoals,
            vec!["What is Rust?", "Who uses it?", "Is it fast?"]
        );
    }

    #[test]
    fn conjunctions_split_subgoals() {
        let intent = parse("compare latency and throughput");
        assert_eq!(intent.subgoals, vec!["compare latency", "throughput"]);
    }

    #[test]
    fn single_clause_has_no_subgoals() {
        assert!(parse("What is entropy?").subgoals.is_empty());
    }

    #[test]
    fn extracts_constraints() {
        let intent = parse("Give me a detailed summary of the latest academic work on fusion");
        assert!(intent.constraints.wants_recent());
        assert!(intent.constraints.wants_academic());
        assert_eq!(intent.constraints.depth, Some(DepthConstraint::Deep));
    }

    #[test]
    fn no_constraints_by_default() {
        assert_eq!(parse("What is entropy?").constraints, Constraints::default());
    }
}
