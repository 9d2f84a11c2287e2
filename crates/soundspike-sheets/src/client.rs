//! HTTP client for the spreadsheet's gviz JSON export endpoint.

use std::time::Duration;

use reqwest::Client;

use crate::envelope::strip_envelope;
use crate::error::SheetsError;
use crate::grid::{Grid, GvizResponse};

const DEFAULT_BASE_URL: &str = "https://docs.google.com";

/// Client for `GET /spreadsheets/d/{sheet_id}/gviz/tq?tqx=out:json&gid={gid}`.
///
/// Returns the raw cell grid for one tab. Envelope stripping and JSON
/// decoding failures surface as typed errors; the pipeline degrades them to
/// an empty grid (a tab-level failure never aborts a run).
pub struct SheetsClient {
    client: Client,
    base_url: String,
}

impl SheetsClient {
    /// Creates a `SheetsClient` with configured timeout and `User-Agent`.
    ///
    /// # Errors
    ///
    /// Returns [`SheetsError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(timeout_secs: u64, user_agent: &str) -> Result<Self, SheetsError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    /// Override the endpoint origin. Used by tests to point at a local mock
    /// server.
    #[must_use]
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Fetch one tab of the sheet as a raw cell grid.
    ///
    /// # Errors
    ///
    /// - [`SheetsError::Http`]: network failure or timeout.
    /// - [`SheetsError::UnexpectedStatus`]: any non-2xx response.
    /// - [`SheetsError::Envelope`]: body has no JSON object to extract.
    /// - [`SheetsError::Deserialize`]: inner JSON does not match the
    ///   `table.rows[].c[].v` shape.
    pub async fn fetch_grid(&self, sheet_id: &str, gid: &str) -> Result<Grid, SheetsError> {
        let url = format!(
            "{}/spreadsheets/d/{sheet_id}/gviz/tq?tqx=out:json&gid={gid}",
            self.base_url
        );

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SheetsError::UnexpectedStatus {
                status: status.as_u16(),
                url,
            });
        }

        let body = response.text().await?;
        let json_text = strip_envelope(&body).ok_or_else(|| SheetsError::Envelope {
            gid: gid.to_string(),
            reason: "no JSON object found in response body".to_string(),
        })?;

        let parsed: GvizResponse =
            serde_json::from_str(json_text).map_err(|source| SheetsError::Deserialize {
                context: url,
                source,
            })?;

        let grid = parsed.into_grid();
        tracing::debug!(gid, rows = grid.len(), "fetched sheet tab");
        Ok(grid)
    }
}
