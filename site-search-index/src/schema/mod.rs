//! Index schema: analysis settings and field mappings per locale.
//!
//! The locale independent building blocks (n-gram tokenizers, completion
//! filter, spelling correction analyzers) are combined with the locale's
//! language analyzer and stopword list.

mod languages;
mod mappings;
mod settings;

pub use languages::{resolve_analyzer, resolve_stopwords, DEFAULT_ANALYZER, NO_STOPWORDS};
pub use mappings::{default_properties, fields};
pub use settings::build_settings;

use serde_json::{Map, Value};

/// Schema of one locale's index.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    /// Language tag the schema was built for.
    pub locale: String,
    /// Primary text analyzer.
    pub analyzer: String,
    /// Predefined stopword list feeding the `language_stopwords` analyzer.
    pub stopwords: String,
}

impl Schema {
    /// Build the schema for a locale, resolving analyzer and stopwords
    /// from the language tables.
    pub fn for_locale(locale: &str) -> Self {
        Self::with_analyzer(locale, None)
    }

    /// Build the schema for a locale with an optional configured analyzer
    /// taking precedence over the language table.
    pub fn with_analyzer(locale: &str, analyzer_override: Option<&str>) -> Self {
        let analyzer = analyzer_override
            .filter(|analyzer| !analyzer.trim().is_empty())
            .map(|analyzer| analyzer.trim().to_string())
            .unwrap_or_else(|| resolve_analyzer(locale).to_string());

        Self {
            locale: locale.to_string(),
            analyzer,
            stopwords: resolve_stopwords(locale).to_string(),
        }
    }

    /// Index settings (analysis chain).
    pub fn settings(&self) -> Value {
        build_settings(&self.stopwords)
    }

    /// Default field mappings, in declaration order.
    pub fn properties(&self) -> Vec<(String, Value)> {
        default_properties(&self.analyzer)
    }

    /// Default field mappings as a `{"properties": {...}}` object.
    pub fn mappings(&self) -> Value {
        let properties: Map<String, Value> = self.properties().into_iter().collect();
        serde_json::json!({ "properties": properties })
    }
}

/// Settings for a locale. See [`Schema::settings`].
pub fn build_settings_for_locale(locale: &str) -> Value {
    Schema::for_locale(locale).settings()
}

/// Field mappings for a locale. See [`Schema::mappings`].
pub fn build_mappings(locale: &str) -> Value {
    Schema::for_locale(locale).mappings()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locales_differ_in_analyzer_choice() {
        let german = Schema::for_locale("de");
        let english = Schema::for_locale("en");

        assert_ne!(german.analyzer, english.analyzer);
        assert_ne!(german.settings(), english.settings());
        assert_ne!(build_mappings("de"), build_mappings("en"));
    }

    #[test]
    fn test_analyzer_override_wins() {
        let schema = Schema::with_analyzer("de", Some("custom_german"));
        assert_eq!(schema.analyzer, "custom_german");
        assert_eq!(schema.stopwords, "_german_");

        let schema = Schema::with_analyzer("de", Some("  "));
        assert_eq!(schema.analyzer, "german");
    }

    #[test]
    fn test_mappings_use_locale_analyzer() {
        let mappings = build_mappings("fr-CA");
        assert_eq!(mappings["properties"]["title"]["analyzer"], "french");
        assert_eq!(
            mappings["properties"]["attachment"]["properties"]["content"]["analyzer"],
            "french"
        );
    }

    #[test]
    fn test_settings_for_unmapped_locale() {
        let settings = build_settings_for_locale("xx");
        assert_eq!(
            settings["analysis"]["filter"]["language_stop"]["stopwords"],
            NO_STOPWORDS
        );
    }
}
