//! # Summarize Module
//!
//! Extractive summaries of evidence text for the final decision.
//!
//! Raw evidence is cleaned first: URLs and bracketed reference markers are
//! removed, glued words ("historyThe") are split, and spacing around
//! punctuation is normalized. Sentences longer than 20 characters are then
//! scored by a pluggable [`Summarizer`]; the selected sentences keep their
//! original order.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::LazyLock;

/// Sentences this short are considered fragments.
pub const MIN_SENTENCE_CHARS: usize = 20;

static URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:https?://|www\.)\S+").expect("valid URL pattern"));

static REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\[(?:\d+(?:\s*[,\-–]\s*\d+)*|citation needed|note \d+)\]")
        .expect("valid reference pattern")
});

static GLUED_WORDS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([a-z]{2})([A-Z][a-z])").expect("valid glued-word pattern"));

// =============================================================================
// CLEANING
// =============================================================================

/// Strip URLs and reference markers, split glued words and normalize spacing.
pub fn clean_text(text: &str) -> String {
    let without_urls = URL.replace_all(text, "");
    let without_refs = REFERENCE.replace_all(&without_urls, "");
    let split = GLUED_WORDS.replace_all(&without_refs, "${1} ${2}");
    normalize_spacing(&split)
}

/// Collapse whitespace, remove space before punctuation and ensure one space after it.
///
/// Digits on both sides of `.`, `,` or `:` are left alone (3.14, 1,000, 10:30).
/// After a period a space is only inserted before an uppercase letter, so
/// abbreviations like "e.g" and names like "node.js" survive.
pub fn normalize_spacing(text: &str) -> String {
    let chars: Vec<char> = text.split_whitespace().collect::<Vec<_>>().join(" ").chars().collect();
    let mut out = String::with_capacity(chars.len());

    for (i, &c) in chars.iter().enumerate() {
        if c == ' ' && chars.get(i + 1).is_some_and(|n| is_punct(*n)) {
            continue;
        }
        out.push(c);

        if !is_punct(c) {
            continue;
        }
        let prev = i.checked_sub(1).and_then(|p| chars.get(p)).copied();
        let Some(next) = chars.get(i + 1).copied() else {
            continue;
        };
        let numeric = matches!(c, '.' | ',' | ':')
            && prev.is_some_and(|p| p.is_ascii_digit())
            && next.is_ascii_digit();
        let needs_space = match c {
            '.' => next.is_uppercase(),
            _ => next.is_alphanumeric(),
        };
        if needs_space && !numeric {
            out.push(' ');
        }
    }
    out
}

fn is_punct(c: char) -> bool {
    matches!(c, '.' | ',' | ';' | ':' | '!' | '?')
}

/// Split cleaned text into trimmed sentences at `.`, `!` or `?` followed by whitespace.
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        current.push(c);
        if matches!(c, '.' | '!' | '?') && chars.peek().is_none_or(|n| n.is_whitespace()) {
            let sentence = current.trim();
            if !sentence.is_empty() {
                sentences.push(sentence.to_string());
            }
            current.clear();
        }
    }
    let rest = current.trim();
    if !rest.is_empty() {
        sentences.push(rest.to_string());
    }
    sentences
}

/// Capitalize the first letter and make sure the text ends with terminal punctuation.
pub fn finish_sentence(text: &str) -> String {
    let trimmed = text.trim();
    let mut chars = trimmed.chars();
    let Some(first) = chars.next() else {
        return String::new();
    };
    let mut out: String = first.to_uppercase().chain(chars).collect();
    if !out.ends_with(['.', '!', '?']) {
        out.push('.');
    }
    out
}

/// Domain of a source identifier: the host of a URL without `www.`, else the identifier.
pub fn source_domain(source: &str) -> String {
    let rest = source
        .split_once("://")
        .map_or(source, |(_, after)| after)
        .trim();
    if rest.contains(char::is_whitespace) {
        return source.trim().to_string();
    }
    let host = rest.split(['/', '?', '#']).next().unwrap_or(rest);
    host.strip_prefix("www.").unwrap_or(host).to_lowercase()
}

// =============================================================================
// SUMMARIZERS
// =============================================================================

/// Picks the most representative sentences.
pub trait Summarizer: Send + Sync {
    /// Score each sentence; higher is more representative.
    fn score(&self, sentences: &[String]) -> Vec<f64>;

    /// Clean `text` and return up to `max_sentences` sentences in original order.
    fn summarize(&self, text: &str, max_sentences: usize) -> String {
        let all = split_sentences(&clean_text(text));
        let mut sentences: Vec<String> = all
            .iter()
            .filter(|s| s.chars().count() > MIN_SENTENCE_CHARS)
            .cloned()
            .collect();
        if sentences.is_empty() {
            sentences = all;
        }
        if sentences.is_empty() || max_sentences == 0 {
            return String::new();
        }

        let scores = self.score(&sentences);
        let mut order: Vec<usize> = (0..sentences.len()).collect();
        order.sort_by(|&a, &b| {
            let sa = scores.get(a).copied().unwrap_or(0.0);
            let sb = scores.get(b).copied().unwrap_or(0.0);
            sb.total_cmp(&sa)
        });
        let mut chosen: Vec<usize> = order.into_iter().take(max_sentences).collect();
        chosen.sort_unstable();

        let text = chosen
            .iter()
            .map(|&i| sentences[i].as_str())
            .collect::<Vec<_>>()
            .join(" ");
        finish_sentence(&text)
    }
}

/// Favours long sentences near the start.
#[derive(Debug, Clone, Copy, Default)]
pub struct LeadSummarizer;

impl Summarizer for LeadSummarizer {
    fn score(&self, sentences: &[String]) -> Vec<f64> {
        sentences
            .iter()
            .enumerate()
            .map(|(i, s)| s.chars().count() as f64 / (i + 1) as f64)
            .collect()
    }
}

/// Favours sentences built from the text's most frequent content words.
#[derive(Debug, Clone, Copy, Default)]
pub struct SalienceSummarizer;

const STOPWORDS: &[&str] = &[
    "the", "and", "for", "are", "but", "not", "you", "all", "any", "can", "had", "her", "was",
    "one", "our", "out", "has", "have", "with", "this", "that", "from", "they", "will", "would",
    "there", "their", "what", "which", "when", "were", "been", "into", "than", "then", "them",
    "these", "those", "its", "also", "such", "some", "more", "most", "other",
];

fn content_words(sentence: &str) -> Vec<String> {
    sentence
        .split(|c: char| !c.is_alphanumeric())
        .map(str::to_lowercase)
        .filter(|w| w.chars().count() >= 3 && !STOPWORDS.contains(&w.as_str()))
        .collect()
}

impl Summarizer for SalienceSummarizer {
    fn score(&self, sentences: &[String]) -> Vec<f64> {
        let words: Vec<Vec<String>> = sentences.iter().map(|s| content_words(s)).collect();

        let mut frequency: BTreeMap<&str, usize> = BTreeMap::new();
        for word in words.iter().flatten() {
            *frequency.entry(word.as_str()).or_default() += 1;
        }

        words
            .iter()
            .map(|ws| {
                if ws.is_empty() {
                    0.0
                } else {
                    let total: usize = ws
                        .iter()
                        .map(|w| frequency.get(w.as_str()).copied().unwrap_or(0))
                        .sum();
                    total as f64 / ws.len() as f64
                }
            })
            .collect()
    }
}

/// Which summarizer the synthesizer uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SummarizerKind {
    Lead,
    #[default]
    Salience,
}

impl SummarizerKind {
    pub fn build(&self) -> Box<dyn Summarizer> {
        match self {
            Self::Lead => Box::new(LeadSummarizer),
            Self::Salience => Box::new(SalienceSummarizer),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
