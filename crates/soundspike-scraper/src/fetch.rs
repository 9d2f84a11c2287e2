//! Relay-backed page fetching.
//!
//! Sound pages are not reachable directly from every network position, so
//! requests go through a pass-through relay that forwards the request and
//! returns the body verbatim. Relays are tried in configured order; the
//! first 2xx body wins. Retry/timeout policy beyond the per-request timeout
//! is the relay's concern, not ours; a failed fetch is simply reported and
//! the caller degrades that sound to "no data this run".

use std::time::Duration;

use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use reqwest::Client;

use crate::error::ScrapeError;

/// Fetches raw page HTML through an ordered chain of relay base URLs. The
/// target URL is percent-encoded and appended to each base.
pub struct PageFetcher {
    client: Client,
    relays: Vec<String>,
}

impl PageFetcher {
    /// Creates a `PageFetcher` with configured timeout and `User-Agent`.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        timeout_secs: u64,
        user_agent: &str,
        relays: Vec<String>,
    ) -> Result<Self, ScrapeError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self { client, relays })
    }

    /// Fetch a page body through the relay chain.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::AllRelaysFailed`] when no relay produced a
    /// 2xx response body.
    pub async fn fetch_page(&self, url: &str) -> Result<String, ScrapeError> {
        let encoded = utf8_percent_encode(url, NON_ALPHANUMERIC).to_string();

        for relay in &self.relays {
            let relay_url = format!("{relay}{encoded}");
            tracing::debug!(url, relay, "fetching page via relay");

            let response = match self
                .client
                .get(&relay_url)
                .header(
                    reqwest::header::ACCEPT,
                    "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
                )
                .send()
                .await
            {
                Ok(response) => response,
                Err(e) => {
                    tracing::warn!(url, relay, error = %e, "relay request failed");
                    continue;
                }
            };

            let status = response.status();
            if !status.is_success() {
                tracing::warn!(url, relay, status = status.as_u16(), "relay returned non-2xx");
                continue;
            }

            match response.text().await {
                Ok(body) => {
                    tracing::debug!(url, relay, bytes = body.len(), "fetched page body");
                    return Ok(body);
                }
                Err(e) => {
                    tracing::warn!(url, relay, error = %e, "failed to read relay body");
                }
            }
        }

        Err(ScrapeError::AllRelaysFailed {
            url: url.to_string(),
            relays: self.relays.len(),
        })
    }
}
