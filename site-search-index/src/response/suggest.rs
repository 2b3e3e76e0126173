use std::collections::HashSet;

use serde_json::{json, Value};
use site_search_shared::{Suggestion, SuggestionKind};

use super::{ResponseContext, SuggestResponseProcessor};
use crate::errors::IndexError;

/// Spelling suggester scores are rescaled by this factor to be comparable
/// with completion and significant text scores.
const SPELLING_SCORE_FACTOR: f64 = 100.0;

/// Ranking works on integer scores scaled by this factor.
const SCORE_SCALE: f64 = 100_000.0;

/// Bonus for suggestions starting with the query; outranks any score.
const PREFIX_BONUS: i64 = 100_000;

/// When spelling corrections are added to the suggestions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpellingPolicy {
    #[default]
    Always,
    /// Only when neither the completion suggester nor the significant text
    /// aggregation produced anything.
    WhenNoOtherSuggestions,
}

/// Merges completion, spelling and significant text suggestions into one
/// ranked, deduplicated list.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultSuggestResponseProcessor {
    spelling: SpellingPolicy,
}

impl DefaultSuggestResponseProcessor {
    pub fn new(spelling: SpellingPolicy) -> Self {
        Self { spelling }
    }

    /// Rank `response` for `query`.
    pub fn suggestions(&self, query: &str, response: &Value) -> Vec<Suggestion> {
        let query = query.trim().to_lowercase();
        let trailing = query.split_whitespace().last().unwrap_or_default().to_string();

        let phrases = options(&response["suggest"]["phrases"])
            .map(|option| {
                Suggestion::new(
                    text(&option["text"]),
                    option["_score"].as_f64().unwrap_or_default(),
                    SuggestionKind::Phrase,
                )
            })
            .collect::<Vec<_>>();

        let spelling = options(&response["suggest"]["spelling"])
            .map(|option| {
                Suggestion::new(
                    text(&option["text"]),
                    option["score"].as_f64().unwrap_or_default() * SPELLING_SCORE_FACTOR,
                    SuggestionKind::Spelling,
                )
            })
            .collect::<Vec<_>>();

        let significant = response["aggregations"]["bucket_sample"]["keywords"]["buckets"]
            .as_array()
            .into_iter()
            .flatten()
            .map(|bucket| {
                Suggestion::new(
                    text(&bucket["key"]),
                    bucket["score"].as_f64().unwrap_or_default(),
                    SuggestionKind::Significant,
                )
            })
            .filter(|suggestion| !query.contains(&suggestion.text.to_lowercase()))
            .collect::<Vec<_>>();

        let significant = autocompletions(significant, &trailing);
        let spelling = autocompletions(spelling, &trailing);
        // Applied a second time on purpose; kept for compatible ranking.
        let significant = autocompletions(significant, &trailing);

        let significant = significant
            .into_iter()
            .map(|suggestion| complete_query(suggestion, &query, &trailing));

        let mut suggestions: Vec<Suggestion> = phrases.into_iter().chain(significant).collect();
        if self.spelling == SpellingPolicy::Always || suggestions.is_empty() {
            suggestions.extend(spelling);
        }

        for suggestion in &mut suggestions {
            suggestion.highlight = highlight(&suggestion.text, &query);
        }

        rank(&mut suggestions, &query);
        dedup(suggestions)
    }
}

impl SuggestResponseProcessor for DefaultSuggestResponseProcessor {
    fn process(&self, context: &ResponseContext<'_>, response: &Value) -> Result<Value, IndexError> {
        let query = context.input.query.as_deref().unwrap_or_default();
        let suggestions = self.suggestions(query, response);

        Ok(json!({
            "links": {
                "self": context.links.link(context.input, &[]),
            },
            "data": {
                "suggestions": suggestions,
            }
        }))
    }
}

/// Options of the first entry of a suggester result.
fn options(suggester: &Value) -> impl Iterator<Item = &Value> {
    suggester[0]["options"].as_array().into_iter().flatten()
}

fn text(value: &Value) -> String {
    value.as_str().unwrap_or_default().to_string()
}

/// Narrow `suggestions` to those continuing the trailing query token, if
/// there are any.
fn autocompletions(suggestions: Vec<Suggestion>, trailing: &str) -> Vec<Suggestion> {
    if trailing.is_empty() {
        return suggestions;
    }

    let completing: Vec<Suggestion> = suggestions
        .iter()
        .filter(|suggestion| suggestion.text.to_lowercase().starts_with(trailing))
        .cloned()
        .collect();

    if completing.is_empty() {
        suggestions
    } else {
        completing
    }
}

/// Turn a significant term into a full query proposal.
fn complete_query(mut suggestion: Suggestion, query: &str, trailing: &str) -> Suggestion {
    let lowered = suggestion.text.to_lowercase();
    if query.is_empty() || lowered.starts_with(query) {
        return suggestion;
    }

    let head = if !trailing.is_empty() && lowered.starts_with(trailing) {
        query[..query.len() - trailing.len()].trim_end()
    } else {
        query
    };

    suggestion.text = if head.is_empty() {
        suggestion.text
    } else {
        format!("{} {}", head, suggestion.text)
    };
    suggestion
}

/// Wrap every word that differs from the query word at the same position.
fn highlight(text: &str, query: &str) -> String {
    let query_words: Vec<&str> = query.split_whitespace().collect();

    text.split_whitespace()
        .enumerate()
        .map(|(position, word)| match query_words.get(position) {
            Some(query_word) if word.to_lowercase() == *query_word => word.to_string(),
            _ => format!("<em>{}</em>", word),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn rank_score(suggestion: &Suggestion, query: &str) -> i64 {
    let mut score = (suggestion.score * SCORE_SCALE).round() as i64;
    if suggestion.text.to_lowercase().starts_with(query) {
        score += PREFIX_BONUS;
    }
    score
}

/// Score descending, then fewer words, then alphabetically ignoring case.
fn rank(suggestions: &mut [Suggestion], query: &str) {
    suggestions.sort_by(|a, b| {
        rank_score(b, query)
            .cmp(&rank_score(a, query))
            .then_with(|| a.word_count().cmp(&b.word_count()))
            .then_with(|| a.text.to_lowercase().cmp(&b.text.to_lowercase()))
    });
}

/// Keep the first occurrence of every text.
fn dedup(suggestions: Vec<Suggestion>) -> Vec<Suggestion> {
    let mut seen = HashSet::new();
    suggestions
        .into_iter()
        .filter(|suggestion| seen.insert(suggestion.text.clone()))
        .collect()
}
