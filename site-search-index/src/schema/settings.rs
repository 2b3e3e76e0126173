//! Analysis settings.

use serde_json::{json, Value};

/// Build the index analysis settings around a predefined stopword list.
///
/// Locale independent parts:
/// - `ngram_tokenizer` (3-grams of letters and digits) and
///   `edge_ngram_tokenizer` (3-grams) for partial word matching
/// - `completion_filter` (edge n-grams 1..=24) for type-ahead
/// - shingle/reverse analyzers for trigram and reverse spelling correction
pub fn build_settings(stopwords: &str) -> Value {
    json!({
        "analysis": {
            "analyzer": {
                "ngram_analyzer": {
                    "type": "custom",
                    "tokenizer": "ngram_tokenizer",
                    "filter": ["lowercase"]
                },
                "edge_ngram_analyzer": {
                    "type": "custom",
                    "tokenizer": "edge_ngram_tokenizer",
                    "filter": ["lowercase"]
                },
                "spelling_correction_ngram": {
                    "type": "custom",
                    "tokenizer": "ngram_tokenizer",
                    "filter": ["shingle", "lowercase"]
                },
                "spelling_correction_trigram": {
                    "type": "custom",
                    "tokenizer": "standard",
                    "filter": ["shingle", "lowercase"]
                },
                "spelling_correction_reverse": {
                    "type": "custom",
                    "tokenizer": "standard",
                    "filter": ["reverse", "lowercase"]
                },
                "completion_analyzer": {
                    "type": "custom",
                    "tokenizer": "ngram_tokenizer",
                    "filter": ["lowercase", "completion_filter"]
                },
                "language_stopwords": {
                    "type": "custom",
                    "tokenizer": "standard",
                    "filter": ["lowercase", "language_stop"]
                }
            },
            "tokenizer": {
                "ngram_tokenizer": {
                    "type": "ngram",
                    "min_gram": 3,
                    "max_gram": 3,
                    "token_chars": ["letter", "digit"]
                },
                "edge_ngram_tokenizer": {
                    "type": "edge_ngram",
                    "min_gram": 3,
                    "max_gram": 3,
                    "token_chars": ["letter", "digit"]
                }
            },
            "filter": {
                "completion_filter": {
                    "type": "edge_ngram",
                    "min_gram": 1,
                    "max_gram": 24
                },
                "language_stop": {
                    "type": "stop",
                    "stopwords": stopwords
                }
            }
        }
    })
}
