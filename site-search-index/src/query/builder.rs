use chrono::NaiveDateTime;
use serde_json::{json, Value};
use site_search_shared::{QueryInput, DATE_FORMAT};

use crate::schema::fields;

/// Weighted fields of the full-text match. Sub-fields (n-grams) catch
/// partial words.
pub const SEARCH_FIELDS: [&str; 6] = [
    "title^6",
    "title.*^6",
    "description^2",
    "description.*^2",
    "attachment.content",
    "attachment.content.*",
];

fn multi_match(query: &str) -> Value {
    json!({
        "multi_match": {
            "query": query,
            "type": "cross_fields",
            "minimum_should_match": "50%",
            "fields": SEARCH_FIELDS,
        }
    })
}

/// Full-text query restricted to documents published at `now` and not
/// yet expired.
pub fn build_search_query(input: &QueryInput, now: NaiveDateTime) -> Value {
    let query = input.query.as_deref().unwrap_or_default();
    let now = now.format(DATE_FORMAT).to_string();

    let mut body = json!({
        "query": {
            "bool": {
                "must": [multi_match(query)],
                "filter": {
                    "bool": {
                        "must": [
                            { "range": { (fields::POST_DATE): { "lte": now } } },
                            {
                                "bool": {
                                    "should": [
                                        { "range": { (fields::EXPIRY_DATE): { "gt": now } } },
                                        { "term": { (fields::NO_EXPIRY_DATE): true } }
                                    ],
                                    "minimum_should_match": 1
                                }
                            }
                        ]
                    }
                }
            }
        }
    });

    if input.highlight {
        body["highlight"] = json!({
            "fields": {
                (fields::TITLE): { "number_of_fragments": 1 },
                (fields::DESCRIPTION): { "number_of_fragments": 1 }
            }
        });
    }

    body
}

/// Relevance query plus completion, phrase and significant text suggestions.
pub fn build_suggest_query(input: &QueryInput) -> Value {
    let query = input.query.as_deref().unwrap_or_default();
    let size = input.suggest_size();
    let spelling = format!("{}.trigram", fields::SPELLING_SUGGESTIONS);

    json!({
        "query": multi_match(query),
        "suggest": {
            "phrases": {
                "text": query,
                "completion": {
                    "field": fields::PHRASE_SUGGESTIONS,
                    "skip_duplicates": true,
                    "size": size
                }
            },
            "spelling": {
                "text": query,
                "phrase": {
                    "field": spelling,
                    "size": size,
                    "max_errors": 1,
                    "gram_size": 4,
                    "direct_generator": [
                        {
                            "field": spelling,
                            "min_word_length": 2,
                            "suggest_mode": "always"
                        },
                        {
                            "field": format!("{}.ngram", fields::SPELLING_SUGGESTIONS),
                            "min_word_length": 2,
                            "suggest_mode": "always"
                        },
                        {
                            "field": format!("{}.reverse", fields::SPELLING_SUGGESTIONS),
                            "min_word_length": 2,
                            "suggest_mode": "always",
                            "pre_filter": "spelling_correction_reverse",
                            "post_filter": "spelling_correction_reverse"
                        }
                    ]
                }
            }
        },
        "aggregations": {
            "bucket_sample": {
                "sampler": { "shard_size": 25 },
                "aggregations": {
                    "keywords": {
                        "significant_text": {
                            "field": fields::UNUSUAL_SUGGESTIONS,
                            "source_fields": [fields::ATTACHMENT_CONTENT, fields::TITLE, fields::DESCRIPTION],
                            "filter_duplicate_text": true
                        }
                    }
                }
            }
        }
    })
}
