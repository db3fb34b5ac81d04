//! Heuristic answer extraction and scoring.
//!
//! Three related strategies over sentence candidates (split on `'.'`):
//!
//! - [`extract_answer`]: the full scorer, used on the internet path before
//!   any generation is attempted;
//! - [`fallback_answer`]: a reduced-feature variant used to replace
//!   generation output that leaked its own instructions;
//! - [`direct_response`]: the simplest variant, the generation engine's
//!   terminal fallback when every model is exhausted.

use crate::response::Source;
use std::collections::HashSet;

/// Phrases that indicate the model echoed its prompt instead of answering.
const LEAK_MARKERS: &[&str] = &[
    "if the information is available",
    "based on the given information",
    "provide direct answers",
    "do not repeat instructions",
    "answer questions directly",
    "respond with only",
    "give only the factual",
    "you are a helpful assistant",
];

/// Detect leaked-instruction output from the generation engine.
pub fn leaks_instructions(answer: &str) -> bool {
    let lower = answer.to_lowercase();
    LEAK_MARKERS.iter().any(|marker| lower.contains(marker))
}

/// Score one sentence against the query.
///
/// Weights: exact query substring 10, each overlapping query word 2, length
/// bonus +2 for 5–30 words (−1 outside), proper nouns capped at 3, +1 for a
/// unique-word ratio in [0.6, 0.8].
fn score_sentence(query_lower: &str, query_words: &HashSet<&str>, sentence: &str) -> i32 {
    let sentence_lower = sentence.to_lowercase();
    let mut score = 0i32;

    if sentence_lower.contains(query_lower) {
        score += 10;
    }

    let sentence_words: HashSet<&str> = sentence_lower.split_whitespace().collect();
    let overlap = query_words.intersection(&sentence_words).count() as i32;
    score += overlap * 2;

    score += length_bonus(sentence);

    let proper_nouns = count_proper_nouns(sentence);
    if proper_nouns > 0 {
        score += proper_nouns.min(3);
    }

    let word_count = sentence.split_whitespace().count();
    if word_count > 0 {
        let unique = sentence_lower.split_whitespace().collect::<HashSet<_>>().len();
        let density = unique as f32 / word_count as f32;
        if (0.6..=0.8).contains(&density) {
            score += 1;
        }
    }

    score
}

fn length_bonus(sentence: &str) -> i32 {
    let word_count = sentence.split_whitespace().count();
    if (5..=30).contains(&word_count) {
        2
    } else {
        -1
    }
}

fn count_proper_nouns(sentence: &str) -> i32 {
    sentence
        .split_whitespace()
        .filter(|word| word.chars().next().is_some_and(|c| c.is_uppercase()))
        .count() as i32
}

fn sentences(content: &str) -> impl Iterator<Item = &str> {
    content.split('.').map(str::trim).filter(|s| !s.is_empty())
}

/// Extract a direct answer from sources using the full scorer.
///
/// Returns the highest-scoring sentence (first encountered wins ties) with
/// a trailing period, or `None` when no sentence scores positively.
pub fn extract_answer(query: &str, sources: &[Source]) -> Option<String> {
    let query_lower = query.to_lowercase();
    let query_words: HashSet<&str> = query_lower.split_whitespace().collect();

    let mut best: Option<(&str, i32)> = None;
    for source in sources {
        for sentence in sentences(&source.content) {
            let score = score_sentence(&query_lower, &query_words, sentence);
            if score > 0 && best.map_or(true, |(_, b)| score > b) {
                best = Some((sentence, score));
            }
        }
    }

    best.map(|(sentence, _)| format!("{}.", sentence))
}

/// Reduced-feature scorer used to replace leaked-instruction output.
///
/// Only sentences containing the query verbatim are considered, ranked by
/// the length-bonus term.
pub fn fallback_answer(query: &str, sources: &[Source]) -> Option<String> {
    let query_lower = query.to_lowercase();

    let mut best: Option<(&str, i32)> = None;
    for source in sources {
        for sentence in sentences(&source.content) {
            if !sentence.to_lowercase().contains(&query_lower) {
                continue;
            }
            let score = 10 + length_bonus(sentence);
            if score > 0 && best.map_or(true, |(_, b)| score > b) {
                best = Some((sentence, score));
            }
        }
    }

    best.map(|(sentence, _)| format!("{}.", sentence))
}

/// First sentence of the first non-empty source; the last resort after the
/// reduced scorer also comes up empty.
pub fn first_sentence(sources: &[Source]) -> Option<String> {
    for source in sources {
        if let Some(sentence) = sentences(&source.content).next() {
            return Some(format!("{}.", sentence));
        }
    }
    None
}

/// Generate an answer without any model: pick the sentence with the highest
/// raw word overlap with the query, skipping metadata and markup.
///
/// Metadata lines (starting with `---`) are dropped before sentence
/// splitting, and sentences carrying `#`, `**`, or `[` markers are never
/// returned.
pub fn direct_response(query: &str, context: &str) -> String {
    let content = context
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with("---"))
        .collect::<Vec<_>>()
        .join(" ");

    let query_words: HashSet<String> = query
        .to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect();

    let mut best_sentence: Option<&str> = None;
    let mut max_overlap = 0usize;

    for sentence in sentences(&content) {
        if sentence.contains('#') || sentence.contains("**") || sentence.contains('[') {
            continue;
        }

        let sentence_lower = sentence.to_lowercase();
        let sentence_words: HashSet<&str> = sentence_lower.split_whitespace().collect();
        let overlap = sentence_words
            .iter()
            .filter(|w| query_words.contains(**w))
            .count();
        if overlap > max_overlap {
            max_overlap = overlap;
            best_sentence = Some(sentence);
        }
    }

    match best_sentence {
        Some(sentence) => {
            let cleaned = sentence.replace("**", "").replace('\\', "");
            format!("{}.", cleaned.trim())
        }
        None => {
            "I couldn't find a specific answer to your question in the documentation.".to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(content: &str) -> Source {
        Source::new("test", None, content, 1.0)
    }

    #[test]
    fn test_exact_match_outranks_overlap() {
        let sources = vec![source(
            "France has many cities with capital investment programs. \
             The capital of France is Paris, a major European city.",
        )];

        let answer = extract_answer("capital of France", &sources).unwrap();
        assert!(answer.contains("Paris"));
        assert!(answer.ends_with('.'));
    }

    #[test]
    fn test_no_positive_sentence_yields_none() {
        let sources = vec![source("word")];
        assert!(extract_answer("completely unrelated query terms", &sources).is_none());
    }

    #[test]
    fn test_tie_broken_by_first_encountered() {
        // Two sentences with identical scores; the earlier one must win.
        let sources = vec![source(
            "Tenants isolate alpha workloads cleanly here. \
             Tenants isolate gamma workloads cleanly here.",
        )];

        let answer = extract_answer("tenants isolate workloads", &sources).unwrap();
        assert!(answer.contains("alpha"));
    }

    #[test]
    fn test_long_sentences_are_penalized() {
        let long = "tenants ".repeat(40);
        let short = "Tenants group related cloud resources together";
        let sources = vec![source(&format!("{}. {}.", long.trim(), short))];

        let answer = extract_answer("tenants", &sources).unwrap();
        assert!(answer.contains("group related"));
    }

    #[test]
    fn test_leak_marker_detection() {
        assert!(leaks_instructions(
            "You are a helpful assistant that provides direct, factual answers."
        ));
        assert!(leaks_instructions("I will Respond With Only the facts"));
        assert!(!leaks_instructions("Paris is the capital of France."));
    }

    #[test]
    fn test_fallback_requires_exact_substring() {
        let sources = vec![source(
            "Paris has a famous tower. The capital of France is Paris and it hosts the government.",
        )];

        let answer = fallback_answer("capital of France", &sources).unwrap();
        assert!(answer.contains("capital of France"));

        assert!(fallback_answer("capital of Spain", &sources).is_none());
    }

    #[test]
    fn test_first_sentence_skips_empty_sources() {
        let sources = vec![source(""), source("First real sentence. Second one.")];
        assert_eq!(
            first_sentence(&sources).unwrap(),
            "First real sentence.".to_string()
        );
    }

    #[test]
    fn test_direct_response_skips_markup_sentences() {
        let context = "---\ntitle: intro\n---\n\
                       # Tenants overview.\n\
                       See [the docs] for tenants details.\n\
                       Tenants provide **strong** isolation.\n\
                       Tenants separate workloads into isolated environments.";

        let answer = direct_response("what are tenants", context);
        assert!(!answer.contains('#'));
        assert!(!answer.contains("**"));
        assert!(!answer.contains('['));
        assert!(answer.contains("isolated environments"));
    }

    #[test]
    fn test_direct_response_without_overlap_uses_generic_message() {
        let answer = direct_response("quantum entanglement", "Tenants separate workloads.");
        assert!(answer.contains("couldn't find a specific answer"));
    }

    #[test]
    fn test_direct_response_strips_bold_markers_from_winner() {
        // Markup filtering happens per sentence; a clean winner is still
        // scrubbed of stray escapes.
        let answer = direct_response("workload isolation", "Workload isolation\\ is built in.");
        assert_eq!(answer, "Workload isolation is built in.");
    }
}
