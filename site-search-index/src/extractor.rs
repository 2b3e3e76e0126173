//! Markup extraction.
//!
//! Turns a fetched HTML page into the text fragment that should be indexed.
//! Page authors control what is indexed with comment markers:
//!
//! - `<!-- search:allow -->…<!-- /search:allow -->` restricts indexing to the
//!   enclosed segments. Without any allow markers the whole `<body>` is used.
//! - `<!-- search:deny -->…<!-- /search:deny -->` removes the enclosed text
//!   from whatever was selected.

use std::sync::LazyLock;

use regex::Regex;
use tracing::error;

use crate::errors::IndexError;

type Pattern = LazyLock<Result<Regex, regex::Error>>;

static ALLOW_RE: Pattern =
    LazyLock::new(|| Regex::new(r"(?s)<!--\s?search:allow\s?-->(.*?)<!--\s?/search:allow\s?-->"));

static DENY_RE: Pattern =
    LazyLock::new(|| Regex::new(r"(?s)<!--\s?search:deny\s?-->(.*?)<!--\s?/search:deny\s?-->"));

static BODY_RE: Pattern = LazyLock::new(|| Regex::new(r"(?si)<body[^>]*>(.*)</body>"));

fn pattern(pattern: &'static Pattern) -> Result<&'static Regex, IndexError> {
    pattern
        .as_ref()
        .map_err(|e| IndexError::markup_extraction(format!("Invalid pattern: {}", e)))
}

/// Extracts indexable content from fetched page markup.
///
/// Documents call their extractor after fetching the page; a before-index
/// hook may swap it for a different implementation.
pub trait ContentExtractor: Send + Sync {
    /// Extract the indexable fragment of `html`.
    fn extract(&self, html: &str) -> Result<String, IndexError>;
}

/// Default extractor honouring `search:allow` and `search:deny` markers.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkupExtractor;

impl MarkupExtractor {
    pub fn new() -> Self {
        Self
    }

    fn candidate_blocks(html: &str) -> Result<Vec<&str>, IndexError> {
        let allowed: Vec<&str> = pattern(&ALLOW_RE)?
            .captures_iter(html)
            .filter_map(|captures| captures.get(1))
            .map(|m| m.as_str())
            .collect();

        if !allowed.is_empty() {
            return Ok(allowed);
        }

        match pattern(&BODY_RE)?.captures(html).and_then(|captures| captures.get(1)) {
            Some(body) => Ok(vec![body.as_str()]),
            None => {
                let message =
                    "Could not parse document - no HTML body found and no explicit search:allow comments exist";
                error!("{}", message);
                Err(IndexError::markup_extraction(message))
            }
        }
    }
}

impl ContentExtractor for MarkupExtractor {
    fn extract(&self, html: &str) -> Result<String, IndexError> {
        let deny = pattern(&DENY_RE)?;

        Ok(Self::candidate_blocks(html)?
            .into_iter()
            .map(|block| deny.replace_all(block, ""))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(html: &str) -> Result<String, IndexError> {
        MarkupExtractor::new().extract(html)
    }

    #[test]
    fn test_body_with_deny_block() {
        let content = extract("<body>A<!--search:deny-->B<!--/search:deny-->C</body>").unwrap();
        assert_eq!(content, "AC");
    }

    #[test]
    fn test_no_body_no_markers_fails() {
        let result = extract("no body tag, no allow markers");
        assert!(matches!(result, Err(IndexError::MarkupExtraction(_))));
    }

    #[test]
    fn test_body_attributes_and_case() {
        let html = "<html><BODY class=\"page\">\n<p>Hello</p>\n</BODY></html>";
        assert_eq!(extract(html).unwrap(), "\n<p>Hello</p>\n");
    }

    #[test]
    fn test_allow_blocks_are_concatenated() {
        let html = "<body>skip<!-- search:allow -->one<!-- /search:allow -->skip\
                    <!--search:allow-->two\nlines<!--/search:allow--></body>";
        assert_eq!(extract(html).unwrap(), "onetwo\nlines");
    }

    #[test]
    fn test_allow_blocks_without_body() {
        let html = "<!--search:allow-->fragment<!--/search:allow-->";
        assert_eq!(extract(html).unwrap(), "fragment");
    }

    #[test]
    fn test_deny_is_applied_per_allow_block() {
        let html = "<!--search:allow-->a<!--search:deny-->x<!--/search:deny-->b<!--/search:allow-->\
                    <!--search:allow-->c<!-- search:deny -->y\nz<!-- /search:deny --><!--/search:allow-->";
        assert_eq!(extract(html).unwrap(), "abc");
    }

    #[test]
    fn test_multiple_deny_blocks_are_non_greedy() {
        let html = "<body>1<!--search:deny-->2<!--/search:deny-->3<!--search:deny-->4<!--/search:deny-->5</body>";
        assert_eq!(extract(html).unwrap(), "135");
    }
}
