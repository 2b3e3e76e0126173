//! Locale to analyzer and stopword list lookup tables.

/// Analyzer used for locales without a dedicated language analyzer.
pub const DEFAULT_ANALYZER: &str = "standard";

/// Stopword sentinel disabling stopword removal.
pub const NO_STOPWORDS: &str = "_none_";

const ANALYZERS: &[(&str, &str)] = &[
    ("ar", "arabic"),
    ("bg", "bulgarian"),
    ("bn", "bengali"),
    ("ca", "catalan"),
    ("cs", "czech"),
    ("da", "danish"),
    ("de", "german"),
    ("el", "greek"),
    ("en", "english"),
    ("es", "spanish"),
    ("et", "estonian"),
    ("eu", "basque"),
    ("fa", "persian"),
    ("fi", "finnish"),
    ("fr", "french"),
    ("ga", "irish"),
    ("gl", "galician"),
    ("hi", "hindi"),
    ("hu", "hungarian"),
    ("hy", "armenian"),
    ("id", "indonesian"),
    ("it", "italian"),
    ("ja", "cjk"),
    ("ko", "cjk"),
    ("lt", "lithuanian"),
    ("lv", "latvian"),
    ("nb", "norwegian"),
    ("nl", "dutch"),
    ("no", "norwegian"),
    ("pl", "polish"),
    ("pt-BR", "brazilian"),
    ("pt", "portuguese"),
    ("ro", "romanian"),
    ("ru", "russian"),
    ("sv", "swedish"),
    ("th", "thai"),
    ("tr", "turkish"),
    ("zh", "cjk"),
];

// Polish has no predefined stopword list.
const STOPWORDS: &[(&str, &str)] = &[
    ("ar", "_arabic_"),
    ("bg", "_bulgarian_"),
    ("bn", "_bengali_"),
    ("ca", "_catalan_"),
    ("cs", "_czech_"),
    ("da", "_danish_"),
    ("de", "_german_"),
    ("el", "_greek_"),
    ("en", "_english_"),
    ("es", "_spanish_"),
    ("et", "_estonian_"),
    ("eu", "_basque_"),
    ("fa", "_persian_"),
    ("fi", "_finnish_"),
    ("fr", "_french_"),
    ("ga", "_irish_"),
    ("gl", "_galician_"),
    ("hi", "_hindi_"),
    ("hu", "_hungarian_"),
    ("hy", "_armenian_"),
    ("id", "_indonesian_"),
    ("it", "_italian_"),
    ("ja", "_cjk_"),
    ("ko", "_cjk_"),
    ("lt", "_lithuanian_"),
    ("lv", "_latvian_"),
    ("nb", "_norwegian_"),
    ("nl", "_dutch_"),
    ("no", "_norwegian_"),
    ("pt-BR", "_brazilian_"),
    ("pt", "_portuguese_"),
    ("ro", "_romanian_"),
    ("ru", "_russian_"),
    ("sv", "_swedish_"),
    ("th", "_thai_"),
    ("tr", "_turkish_"),
    ("zh", "_cjk_"),
];

/// Look a locale up: exact tag first, then its primary subtag.
fn lookup(table: &[(&'static str, &'static str)], locale: &str) -> Option<&'static str> {
    let locale = locale.trim().replace('_', "-");

    let find = |tag: &str| {
        table
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(tag))
            .map(|(_, value)| *value)
    };

    find(&locale).or_else(|| {
        let primary = locale.split('-').next().unwrap_or_default();
        find(primary)
    })
}

/// Resolve the text analyzer for a locale.
///
/// `pt-BR` resolves to `brazilian` before `pt` would fall back to
/// `portuguese`; unknown languages use [`DEFAULT_ANALYZER`].
pub fn resolve_analyzer(locale: &str) -> &'static str {
    lookup(ANALYZERS, locale).unwrap_or(DEFAULT_ANALYZER)
}

/// Resolve the predefined stopword list for a locale, falling back to
/// [`NO_STOPWORDS`].
pub fn resolve_stopwords(locale: &str) -> &'static str {
    lookup(STOPWORDS, locale).unwrap_or(NO_STOPWORDS)
}
