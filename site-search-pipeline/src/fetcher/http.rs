use async_trait::async_trait;
use reqwest::header::LOCATION;
use reqwest::redirect::Policy;
use reqwest::Client as HttpClient;
use tracing::{debug, instrument};
use url::Url;

use super::{rewrite_base_url, FetchConfig, FetchError, PageFetcher};

/// [`PageFetcher`] over HTTP.
///
/// Redirects are followed by hand so every hop can be rewritten onto the
/// configured internal base URL.
pub struct HttpPageFetcher {
    client: HttpClient,
    config: FetchConfig,
}

fn transport_error(err: reqwest::Error) -> FetchError {
    if err.is_connect() || err.is_timeout() {
        FetchError::connection(err.to_string())
    } else {
        FetchError::request(err.to_string())
    }
}

impl HttpPageFetcher {
    pub fn new(config: FetchConfig) -> Result<Self, FetchError> {
        let client = HttpClient::builder()
            .timeout(config.timeout)
            .redirect(Policy::none())
            .build()
            .map_err(|e| FetchError::request(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    fn rewrite(&self, url: &str) -> String {
        rewrite_base_url(url, self.config.base_url.as_deref())
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    #[instrument(skip(self))]
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let mut current = self.rewrite(url);

        for _ in 0..=self.config.max_redirects {
            let response = self.client.get(&current).send().await.map_err(transport_error)?;
            let status = response.status();

            if status.is_redirection() {
                let location = response
                    .headers()
                    .get(LOCATION)
                    .and_then(|value| value.to_str().ok())
                    .ok_or_else(|| {
                        FetchError::request(format!("Redirect without location from {}", current))
                    })?;
                let next = Url::parse(&current)
                    .and_then(|base| base.join(location))
                    .map_err(|e| FetchError::request(format!("Invalid redirect target: {}", e)))?;

                debug!(from = %current, to = %next, "Following redirect");
                current = self.rewrite(next.as_str());
                continue;
            }

            if status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                return Err(FetchError::server(status.as_u16(), body));
            }

            if !status.is_success() {
                return Err(FetchError::request(format!("HTTP {} for {}", status, current)));
            }

            return response.text().await.map_err(transport_error);
        }

        Err(FetchError::request(format!("Too many redirects fetching {}", url)))
    }
}
