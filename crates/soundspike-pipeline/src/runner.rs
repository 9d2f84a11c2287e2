//! One pipeline run: fetch, parse, reconcile, aggregate.
//!
//! A run never aborts on a partial failure. Each sheet tab degrades to an
//! empty grid, each failed scrape degrades that one sound to "no data this
//! run", and a pipeline-level error string is surfaced only when every
//! source failed. Consumers keep last-known-good data; staleness beats
//! blocking.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};

use soundspike_core::{AppConfig, Artist, ArtistConfig, SoundConfig};
use soundspike_ledger::HistoryLedger;
use soundspike_scraper::{extract_post_count, PageFetcher, ScrapeError};
use soundspike_sheets::{parse_daily_log, parse_overview, parse_ranking, Grid, SheetsClient};

use crate::aggregate::aggregate_artist;
use crate::error::PipelineError;
use crate::reconcile::{reconcile_scraped, reconcile_tabular, ScrapedSound};

/// Result of one completed pipeline run. Rebuilt whole every run; `error`
/// is set only when all sources failed (consumers show it as a non-blocking
/// indicator next to last-known-good data).
#[derive(Debug, Clone)]
pub struct PipelineRun {
    pub artist: Artist,
    pub error: Option<String>,
    pub completed_at: DateTime<Utc>,
}

/// The ingestion pipeline: tabular source preferred, page-scrape + ledger
/// fallback.
pub struct Pipeline {
    sheets: SheetsClient,
    fetcher: PageFetcher,
    ledger: Arc<HistoryLedger>,
    sheet_id: String,
    gid_daily_log: String,
    gid_overview: String,
    gid_ranking: String,
    max_concurrent_scrapes: usize,
}

impl Pipeline {
    /// Build a pipeline from the app configuration and a shared ledger.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError`] if an HTTP client cannot be constructed.
    pub fn from_config(
        config: &AppConfig,
        ledger: Arc<HistoryLedger>,
    ) -> Result<Self, PipelineError> {
        let sheets = SheetsClient::new(config.request_timeout_secs, &config.user_agent)?;
        let fetcher = PageFetcher::new(
            config.request_timeout_secs,
            &config.user_agent,
            config.relay_urls.clone(),
        )?;
        Ok(Self {
            sheets,
            fetcher,
            ledger,
            sheet_id: config.sheet_id.clone(),
            gid_daily_log: config.sheet_gid_daily_log.clone(),
            gid_overview: config.sheet_gid_overview.clone(),
            gid_ranking: config.sheet_gid_ranking.clone(),
            max_concurrent_scrapes: config.max_concurrent_scrapes.max(1),
        })
    }

    /// Swap the sheets client. Used by tests to point at a mock server.
    #[must_use]
    pub fn with_sheets_client(mut self, sheets: SheetsClient) -> Self {
        self.sheets = sheets;
        self
    }

    /// Swap the page fetcher. Used by tests to point at a mock relay.
    #[must_use]
    pub fn with_page_fetcher(mut self, fetcher: PageFetcher) -> Self {
        self.fetcher = fetcher;
        self
    }

    /// Execute one full run for an artist.
    pub async fn run_artist(&self, artist: &ArtistConfig) -> PipelineRun {
        let artist_id = artist.artist_id();
        tracing::info!(artist = %artist_id, "starting pipeline run");

        let mut source_errors: Vec<String> = Vec::new();

        // Preferred origin: the three tabular tabs, fetched concurrently and
        // jointly awaited. A failed tab degrades to an empty grid.
        let (daily_res, overview_res, ranking_res) = tokio::join!(
            self.sheets.fetch_grid(&self.sheet_id, &self.gid_daily_log),
            self.sheets.fetch_grid(&self.sheet_id, &self.gid_overview),
            self.sheets.fetch_grid(&self.sheet_id, &self.gid_ranking),
        );

        let mut failed_tabs = 0usize;
        let mut grid_or_empty = |res: Result<Grid, soundspike_sheets::SheetsError>,
                                 tab: &str|
         -> Grid {
            match res {
                Ok(grid) => grid,
                Err(e) => {
                    tracing::warn!(tab, error = %e, "sheet tab fetch failed");
                    source_errors.push(format!("tab {tab}: {e}"));
                    failed_tabs += 1;
                    Vec::new()
                }
            }
        };
        let daily_grid = grid_or_empty(daily_res, "daily-log");
        let overview_grid = grid_or_empty(overview_res, "overview");
        let ranking_grid = grid_or_empty(ranking_res, "ranking");

        let daily_log = parse_daily_log(&daily_grid);
        let overview = parse_overview(&overview_grid);
        let ranking = parse_ranking(&ranking_grid);

        let now = Utc::now();
        let tabular_sounds = reconcile_tabular(&daily_log, &overview, &ranking, &artist.name, now);

        if !tabular_sounds.is_empty() {
            tracing::info!(
                artist = %artist_id,
                sounds = tabular_sounds.len(),
                "run complete via tabular source"
            );
            return PipelineRun {
                artist: aggregate_artist(tabular_sounds, &artist_id, &artist.name),
                error: None,
                completed_at: Utc::now(),
            };
        }

        // Fallback origin: scrape each sound page and lean on the ledger.
        tracing::info!(artist = %artist_id, "tabular source empty, falling back to page scrape");
        let (scraped, scrape_errors, all_scrapes_failed) = self.scrape_sounds(&artist.sounds).await;
        source_errors.extend(scrape_errors);

        let histories = match self.ledger.snapshot().await {
            Ok(snapshot) => snapshot
                .into_iter()
                .map(|h| (h.sound_id.clone(), h.history))
                .collect(),
            Err(e) => {
                tracing::warn!(error = %e, "ledger snapshot failed");
                source_errors.push(format!("ledger: {e}"));
                HashMap::new()
            }
        };

        let sounds = reconcile_scraped(&scraped, &histories, &artist.name, now);

        // Surface an error summary only when every source for the run failed.
        let all_tabs_failed = failed_tabs == 3;
        let error = if all_tabs_failed && all_scrapes_failed {
            Some(source_errors.join("; "))
        } else {
            None
        };

        tracing::info!(
            artist = %artist_id,
            sounds = sounds.len(),
            degraded = error.is_some(),
            "run complete via scrape fallback"
        );
        PipelineRun {
            artist: aggregate_artist(sounds, &artist_id, &artist.name),
            error,
            completed_at: Utc::now(),
        }
    }

    /// Scrape every configured sound concurrently (bounded), recording
    /// successful non-zero counts in the ledger.
    ///
    /// Returns the per-sound scrape results, the collected error strings,
    /// and whether every fetch failed outright.
    async fn scrape_sounds(
        &self,
        sounds: &[SoundConfig],
    ) -> (Vec<ScrapedSound>, Vec<String>, bool) {
        let outcomes: Vec<(SoundConfig, Result<u64, ScrapeError>)> = stream::iter(sounds.to_vec())
            .map(|config| async move {
                let count = self.scrape_one(&config).await;
                (config, count)
            })
            .buffer_unordered(self.max_concurrent_scrapes)
            .collect()
            .await;

        let mut scraped = Vec::with_capacity(outcomes.len());
        let mut errors = Vec::new();
        let mut failures = 0usize;

        for (config, result) in outcomes {
            let sound_id = config.sound_id();
            let total_posts = match result {
                Ok(count) => {
                    if count > 0 {
                        // Only real observations reach the ledger: a 0 is
                        // "unknown" and recording it would corrupt growth.
                        if let Err(e) = self.ledger.upsert_today(&sound_id, count).await {
                            tracing::warn!(sound = %sound_id, error = %e, "ledger upsert failed");
                            errors.push(format!("{sound_id}: {e}"));
                        }
                    } else {
                        tracing::warn!(sound = %sound_id, "no post count extracted");
                    }
                    count
                }
                Err(e) => {
                    tracing::warn!(sound = %sound_id, error = %e, "scrape failed");
                    errors.push(format!("{sound_id}: {e}"));
                    failures += 1;
                    0
                }
            };

            scraped.push(ScrapedSound {
                id: sound_id,
                name: config.name.clone(),
                total_posts,
                sound_link: Some(config.url.clone()),
            });
        }

        // An empty roster has no scrape source to succeed.
        let all_failed = sounds.is_empty() || failures == sounds.len();
        (scraped, errors, all_failed)
    }

    async fn scrape_one(&self, config: &SoundConfig) -> Result<u64, ScrapeError> {
        let html = self.fetcher.fetch_page(&config.url).await?;
        let count = extract_post_count(&html);
        tracing::debug!(sound = %config.sound_id(), count, "scraped sound page");
        Ok(count)
    }
}
