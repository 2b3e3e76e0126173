//! Default field mappings.

use serde_json::{json, Value};
use site_search_shared::MAPPING_DATE_FORMAT;

/// Names of the default fields.
pub mod fields {
    pub const POST_DATE: &str = "postDate";
    pub const NO_POST_DATE: &str = "noPostDate";
    pub const EXPIRY_DATE: &str = "expiryDate";
    pub const NO_EXPIRY_DATE: &str = "noExpiryDate";
    pub const PHRASE_SUGGESTIONS: &str = "phraseSuggestions";
    pub const SPELLING_SUGGESTIONS: &str = "spellingSuggestions";
    pub const UNUSUAL_SUGGESTIONS: &str = "unusualSuggestions";
    pub const TITLE: &str = "title";
    pub const DESCRIPTION: &str = "description";
    pub const IMAGE_URL: &str = "imageUrl";
    pub const URL: &str = "url";
    pub const CONTENT: &str = "content";
    pub const ATTACHMENT: &str = "attachment";
    pub const ATTACHMENT_CONTENT: &str = "attachment.content";
}

use fields::*;

/// Text fields also feed every suggestion field.
fn suggestion_sources() -> Value {
    json!([PHRASE_SUGGESTIONS, SPELLING_SUGGESTIONS, UNUSUAL_SUGGESTIONS])
}

/// Full-text field with n-gram and edge n-gram sub-fields.
fn text_field(analyzer: &str, store: bool) -> Value {
    let mut field = json!({
        "type": "text",
        "analyzer": analyzer,
        "copy_to": suggestion_sources(),
        "fields": {
            "ngram": {
                "type": "text",
                "analyzer": "ngram_analyzer"
            },
            "edge_ngram": {
                "type": "text",
                "analyzer": "edge_ngram_analyzer",
                "search_analyzer": "standard"
            }
        }
    });

    if store {
        field["store"] = json!(true);
    }

    field
}

/// Default properties of every index, in declaration order.
///
/// `noPostDate`/`noExpiryDate` are "no constraint" sentinels: a missing
/// value counts as `true`. `content` only carries the base64 encoded page
/// for the ingest pipeline, which replaces it with `attachment.content`.
pub fn default_properties(analyzer: &str) -> Vec<(String, Value)> {
    vec![
        (
            POST_DATE.to_string(),
            json!({ "type": "date", "format": MAPPING_DATE_FORMAT }),
        ),
        (
            NO_POST_DATE.to_string(),
            json!({ "type": "boolean", "null_value": true }),
        ),
        (
            EXPIRY_DATE.to_string(),
            json!({ "type": "date", "format": MAPPING_DATE_FORMAT }),
        ),
        (
            NO_EXPIRY_DATE.to_string(),
            json!({ "type": "boolean", "null_value": true }),
        ),
        (
            PHRASE_SUGGESTIONS.to_string(),
            json!({
                "type": "completion",
                "analyzer": "completion_analyzer",
                "search_analyzer": "standard"
            }),
        ),
        (
            SPELLING_SUGGESTIONS.to_string(),
            json!({
                "type": "text",
                "analyzer": analyzer,
                "store": true,
                "fields": {
                    "trigram": {
                        "type": "text",
                        "analyzer": "spelling_correction_trigram"
                    },
                    "ngram": {
                        "type": "text",
                        "analyzer": "spelling_correction_ngram"
                    },
                    "reverse": {
                        "type": "text",
                        "analyzer": "spelling_correction_reverse"
                    }
                }
            }),
        ),
        (
            UNUSUAL_SUGGESTIONS.to_string(),
            json!({
                "type": "text",
                "analyzer": "language_stopwords"
            }),
        ),
        (TITLE.to_string(), text_field(analyzer, true)),
        (DESCRIPTION.to_string(), text_field(analyzer, true)),
        (IMAGE_URL.to_string(), json!({ "type": "keyword" })),
        (URL.to_string(), json!({ "type": "text" })),
        (
            CONTENT.to_string(),
            json!({ "type": "text", "analyzer": analyzer }),
        ),
        (
            ATTACHMENT.to_string(),
            json!({
                "properties": {
                    "content": text_field(analyzer, false)
                }
            }),
        ),
    ]
}
