use std::path::PathBuf;

/// Runtime configuration, read from `SOUNDSPIKE_*` env vars.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Spreadsheet document id for the tabular export endpoint.
    pub sheet_id: String,
    /// Tab (gid) holding the per-day post-count grid.
    pub sheet_gid_daily_log: String,
    /// Tab (gid) holding the per-sound overview rows.
    pub sheet_gid_overview: String,
    /// Tab (gid) holding the performance-ranking rows.
    pub sheet_gid_ranking: String,
    pub log_level: String,
    /// Tracked-sounds roster (YAML).
    pub sounds_path: PathBuf,
    /// Persisted history-ledger document (JSON).
    pub ledger_path: PathBuf,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    /// Pass-through relay base URLs for page fetches, tried in order. The
    /// target page URL is percent-encoded and appended to each base.
    pub relay_urls: Vec<String>,
    pub max_concurrent_scrapes: usize,
    /// Automatic pipeline refresh cadence for `watch` mode.
    pub refresh_interval_secs: u64,
}
