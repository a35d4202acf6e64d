use async_trait::async_trait;
use reqwest::Client;
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::sleep;

use crate::config::ServiceOptions;
use crate::error::CatalogError;

/// Fetch capability: `(url, headers) -> body`. The host application may
/// supply its own implementation; [`HttpFetcher`] is the built-in one.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(
        &self,
        url: &str,
        headers: &HashMap<String, String>,
    ) -> Result<String, CatalogError>;
}

/// Reqwest-backed fetcher with retry and exponential backoff.
pub struct HttpFetcher {
    client: Client,
    max_retries: u32,
}

impl HttpFetcher {
    pub fn new(options: &ServiceOptions) -> Self {
        let client = Client::builder()
            .user_agent(&options.user_agent)
            .timeout(Duration::from_millis(options.fetch_timeout_ms))
            .gzip(true)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            max_retries: options.max_retries,
        }
    }

    fn backoff_ms(attempt: u32) -> u64 {
        (1u64 << attempt).saturating_mul(500).min(10_000)
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(
        &self,
        url: &str,
        headers: &HashMap<String, String>,
    ) -> Result<String, CatalogError> {
        let mut last_err: Option<CatalogError> = None;

        for attempt in 0..=self.max_retries {
            let mut request = self.client.get(url);
            for (key, value) in headers {
                request = request.header(key, value);
            }

            match request.send().await {
                Ok(resp) => {
                    let status = resp.status();
                    if status.is_success() {
                        return resp
                            .text()
                            .await
                            .map_err(|e| CatalogError::fetch(url, e.to_string()));
                    }

                    if status == reqwest::StatusCode::TOO_MANY_REQUESTS
                        && attempt < self.max_retries
                    {
                        let backoff_ms = Self::backoff_ms(attempt);
                        tracing::warn!("fetch_retry" = attempt + 1, "reason" = "429", "backoff_ms" = backoff_ms);
                        sleep(Duration::from_millis(backoff_ms)).await;
                        continue;
                    }

                    let reason = status
                        .canonical_reason()
                        .unwrap_or("request failed");
                    return Err(CatalogError::fetch(
                        url,
                        format!("HTTP {}: {}", status.as_u16(), reason),
                    ));
                }
                Err(err) => {
                    last_err = Some(CatalogError::fetch(url, err.to_string()));
                    if attempt < self.max_retries {
                        let backoff_ms = Self::backoff_ms(attempt);
                        tracing::warn!("fetch_retry" = attempt + 1, "reason" = "network", "backoff_ms" = backoff_ms);
                        sleep(Duration::from_millis(backoff_ms)).await;
                    }
                }
            }
        }

        Err(last_err.unwrap_or_else(|| CatalogError::fetch(url, "unknown fetch error")))
    }
}
