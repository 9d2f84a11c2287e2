use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("all {relays} relays failed for {url}")]
    AllRelaysFailed { url: String, relays: usize },
}
