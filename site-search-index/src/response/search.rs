use serde_json::{json, Map, Value};

use super::{ResponseContext, SearchResponseProcessor};
use crate::errors::IndexError;
use crate::schema::fields;

/// Highlighted fields merged over the stored values.
const HIGHLIGHTED_FIELDS: [&str; 2] = [fields::TITLE, fields::DESCRIPTION];

/// Paginated hit list with `self`, `next` and `last` links.
///
/// ```json
/// {
///   "links": { "self": "...", "next": "...", "last": "..." },
///   "data": { "totalHits": 30, "hits": [{ "title": "...", "id": "1-2", "score": 1.2 }] }
/// }
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultSearchResponseProcessor;

/// `hits.total` is either a number or `{ "value": n, "relation": ".." }`.
fn total_hits(total: &Value) -> Option<u64> {
    total.as_u64().or_else(|| total["value"].as_u64())
}

fn flatten_hit(hit: &Value, highlight: bool) -> Value {
    let mut flat: Map<String, Value> = hit["_source"].as_object().cloned().unwrap_or_default();

    if highlight {
        for field in HIGHLIGHTED_FIELDS {
            if let Some(fragment) = hit["highlight"][field].get(0) {
                flat.insert(field.to_string(), fragment.clone());
            }
        }
    }

    flat.insert("id".to_string(), hit["_id"].clone());
    flat.insert("score".to_string(), hit["_score"].clone());
    Value::Object(flat)
}

impl SearchResponseProcessor for DefaultSearchResponseProcessor {
    fn process(&self, context: &ResponseContext<'_>, response: &Value) -> Result<Value, IndexError> {
        let total = total_hits(&response["hits"]["total"])
            .ok_or_else(|| IndexError::Store("Search response without hits.total".to_string()))?;
        let hits: Vec<Value> = response["hits"]["hits"]
            .as_array()
            .map(|hits| {
                hits.iter()
                    .map(|hit| flatten_hit(hit, context.input.highlight))
                    .collect()
            })
            .unwrap_or_default();

        let (from, size) = (context.from, context.size);
        let mut links = Map::new();
        links.insert("self".to_string(), json!(context.links.link(context.input, &[])));

        let next = from.saturating_add(size);
        if next < total {
            links.insert(
                "next".to_string(),
                json!(context
                    .links
                    .link(context.input, &[("from", next.to_string()), ("size", size.to_string())])),
            );
        }

        if from > 0 {
            links.insert(
                "last".to_string(),
                json!(context.links.link(
                    context.input,
                    &[("from", from.saturating_sub(size).to_string()), ("size", size.to_string())]
                )),
            );
        }

        Ok(json!({
            "links": links,
            "data": {
                "totalHits": total,
                "hits": hits,
            }
        }))
    }
}
