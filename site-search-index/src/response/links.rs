use site_search_shared::QueryInput;
use url::Url;

use crate::errors::IndexError;

/// Builds `self`/`next`/`last` links to the public search page.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkBuilder {
    search_url: Url,
}

impl LinkBuilder {
    /// `base_url` is the public site URL; links point at `{base_url}search`.
    pub fn new(base_url: &str) -> Result<Self, IndexError> {
        let invalid =
            |e: url::ParseError| IndexError::configuration(format!("Invalid base URL \"{}\": {}", base_url, e));

        let mut base = Url::parse(base_url).map_err(invalid)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let search_url = base.join("search").map_err(invalid)?;

        Ok(Self { search_url })
    }

    /// Link carrying the caller's input parameters, with `overrides`
    /// replacing or extending them.
    pub fn link(&self, input: &QueryInput, overrides: &[(&str, String)]) -> String {
        let mut pairs = input.to_pairs();
        for (key, value) in overrides {
            match pairs.iter_mut().find(|(existing, _)| existing == key) {
                Some(pair) => pair.1 = value.clone(),
                None => pairs.push((key.to_string(), value.clone())),
            }
        }

        let mut url = self.search_url.clone();
        if !pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(pairs.iter());
        }
        url.to_string()
    }
}
