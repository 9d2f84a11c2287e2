//! End-to-end pipeline runs against mock sheet and relay servers.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use soundspike_core::{AppConfig, ArtistConfig, SoundConfig};
use soundspike_ledger::{HistoryLedger, MemoryStore};
use soundspike_pipeline::{spawn_feed, FeedSnapshot, Pipeline};
use soundspike_scraper::PageFetcher;
use soundspike_sheets::SheetsClient;

fn test_config() -> AppConfig {
    AppConfig {
        sheet_id: "sheet-under-test".to_string(),
        sheet_gid_daily_log: "0".to_string(),
        sheet_gid_overview: "1".to_string(),
        sheet_gid_ranking: "2".to_string(),
        log_level: "debug".to_string(),
        sounds_path: "./config/sounds.yaml".into(),
        ledger_path: "./data/sound_history.json".into(),
        request_timeout_secs: 5,
        user_agent: "soundspike-test/0.1".to_string(),
        relay_urls: vec!["https://unused.invalid/raw?url=".to_string()],
        max_concurrent_scrapes: 2,
        refresh_interval_secs: 300,
    }
}

fn test_artist() -> ArtistConfig {
    ArtistConfig {
        name: "Zukenee".to_string(),
        id: None,
        sounds: vec![SoundConfig {
            name: "Bromance".to_string(),
            url: "https://www.tiktok.com/music/BROMANCE-7493377885936666641".to_string(),
            id: None,
        }],
    }
}

fn pipeline_against(
    sheets: &MockServer,
    relay: &MockServer,
    ledger: Arc<HistoryLedger>,
) -> Pipeline {
    let config = test_config();
    Pipeline::from_config(&config, ledger)
        .expect("failed to build pipeline")
        .with_sheets_client(
            SheetsClient::new(5, &config.user_agent)
                .expect("sheets client")
                .with_base_url(&sheets.uri()),
        )
        .with_page_fetcher(
            PageFetcher::new(
                5,
                &config.user_agent,
                vec![format!("{}/raw?url=", relay.uri())],
            )
            .expect("page fetcher"),
        )
}

fn enveloped(table: &serde_json::Value) -> String {
    format!(
        "/*O_o*/\ngoogle.visualization.Query.setResponse({});",
        json!({ "version": "0.6", "status": "ok", "table": table })
    )
}

async fn mount_tab(server: &MockServer, gid: &str, table: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/spreadsheets/d/sheet-under-test/gviz/tq"))
        .and(query_param("gid", gid))
        .respond_with(ResponseTemplate::new(200).set_body_string(enveloped(&table)))
        .mount(server)
        .await;
}

#[tokio::test]
async fn run_uses_tabular_source_when_available() {
    let sheets = MockServer::start().await;
    let relay = MockServer::start().await;
    mount_overview_fixture(&sheets, 9000).await;

    let ledger = Arc::new(HistoryLedger::new(MemoryStore::new()));
    let pipeline = pipeline_against(&sheets, &relay, Arc::clone(&ledger));

    let run = pipeline.run_artist(&test_artist()).await;

    assert!(run.error.is_none());
    assert_eq!(run.artist.sounds.len(), 1);
    let sound = &run.artist.sounds[0];
    assert_eq!(sound.name, "Bromance");
    assert_eq!(sound.total_posts, 9000);
    assert_eq!(sound.daily_growth, 240);
    assert!(sound.is_spike);
    assert_eq!(sound.performance_rank, Some(1));
    // One chart point above the flat 100 threshold.
    assert_eq!(run.artist.total_spike_days, 1);

    // The tabular path never touches the ledger.
    assert!(ledger.get("bromance").await.unwrap().is_empty());
}

#[tokio::test]
async fn run_falls_back_to_scrape_when_tabular_is_empty() {
    let sheets = MockServer::start().await;
    let relay = MockServer::start().await;

    for gid in ["0", "1", "2"] {
        mount_tab(&sheets, gid, json!({"rows": []})).await;
    }
    Mock::given(method("GET"))
        .and(path("/raw"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<html><body><strong>1.2K posts</strong></body></html>"),
        )
        .mount(&relay)
        .await;

    let ledger = Arc::new(HistoryLedger::new(MemoryStore::new()));
    let pipeline = pipeline_against(&sheets, &relay, Arc::clone(&ledger));

    let run = pipeline.run_artist(&test_artist()).await;

    assert!(run.error.is_none(), "unexpected error: {:?}", run.error);
    assert_eq!(run.artist.sounds.len(), 1);
    let sound = &run.artist.sounds[0];
    assert_eq!(sound.total_posts, 1200);
    assert_eq!(sound.daily_growth, 0); // first observation
    assert_eq!(sound.chart_series.len(), 1);

    // The scrape recorded today's observation in the ledger.
    let history = ledger.get("bromance").await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].total_posts, 1200);
    assert_eq!(history[0].daily_growth, 0);
}

#[tokio::test]
async fn run_treats_extraction_miss_as_unknown() {
    let sheets = MockServer::start().await;
    let relay = MockServer::start().await;

    for gid in ["0", "1", "2"] {
        mount_tab(&sheets, gid, json!({"rows": []})).await;
    }
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>sign in to view</html>"))
        .mount(&relay)
        .await;

    let ledger = Arc::new(HistoryLedger::new(MemoryStore::new()));
    let pipeline = pipeline_against(&sheets, &relay, Arc::clone(&ledger));

    let run = pipeline.run_artist(&test_artist()).await;

    // An extraction miss must never write a growth data point.
    assert!(ledger.get("bromance").await.unwrap().is_empty());
    assert_eq!(run.artist.sounds[0].total_posts, 0);
    assert!(run.error.is_none());
}

#[tokio::test]
async fn run_surfaces_error_only_when_every_source_fails() {
    let sheets = MockServer::start().await;
    let relay = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&sheets)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&relay)
        .await;

    let ledger = Arc::new(HistoryLedger::new(MemoryStore::new()));
    let pipeline = pipeline_against(&sheets, &relay, Arc::clone(&ledger));

    let run = pipeline.run_artist(&test_artist()).await;

    let error = run.error.expect("expected an all-sources-failed summary");
    assert!(error.contains("daily-log"), "error was: {error}");
    assert!(error.contains("bromance"), "error was: {error}");
    // The degraded record is still emitted for last-known-good display.
    assert_eq!(run.artist.sounds.len(), 1);
    assert_eq!(run.artist.sounds[0].total_posts, 0);
}

async fn mount_overview_fixture(sheets: &MockServer, live_posts: u64) {
    mount_tab(
        sheets,
        "0",
        json!({"rows": [
            {"c": [{"v": "Sound"}, {"v": "2024-01-01"}, {"v": "2024-01-02"}]},
            {"c": [{"v": "Bromance"}, {"v": 50}, {"v": 240}]}
        ]}),
    )
    .await;
    mount_tab(
        sheets,
        "1",
        json!({"rows": [
            {"c": [{"v": "Sound"}, {"v": "Link"}, {"v": "Live"}]},
            {"c": [{"v": "Bromance"}, {"v": "https://example.com/bromance"}, {"v": live_posts}]}
        ]}),
    )
    .await;
    mount_tab(
        sheets,
        "2",
        json!({"rows": [
            {"c": [{"v": "Sound"}, {"v": "Live"}]},
            {"c": [{"v": "Bromance"}, {"v": live_posts}]}
        ]}),
    )
    .await;
}

/// Await completed snapshots, asserting that any in-flight marker seen on
/// the way keeps the previously published data visible.
async fn next_completed(rx: &mut tokio::sync::watch::Receiver<FeedSnapshot>) -> FeedSnapshot {
    loop {
        rx.changed().await.expect("feed task dropped its sender");
        let snapshot = rx.borrow_and_update().clone();
        if snapshot.loading {
            if snapshot.last_updated.is_some() {
                assert!(snapshot.artist.is_some(), "in-flight marker dropped data");
            }
            continue;
        }
        return snapshot;
    }
}

#[tokio::test]
async fn feed_publishes_whole_snapshots_with_last_run_winning() {
    let sheets = MockServer::start().await;
    let relay = MockServer::start().await;
    mount_overview_fixture(&sheets, 9000).await;

    let ledger = Arc::new(HistoryLedger::new(MemoryStore::new()));
    let pipeline = Arc::new(pipeline_against(&sheets, &relay, ledger));

    // Long interval: only the startup run and manual refreshes fire here.
    let feed = spawn_feed(pipeline, test_artist(), Duration::from_secs(3600));

    // The current-thread runtime has not polled the feed task yet, so this
    // is the pre-first-run snapshot.
    let initial = feed.latest();
    assert!(initial.loading);
    assert!(initial.artist.is_none());
    assert!(initial.last_updated.is_none());

    let mut rx = feed.subscribe();
    let first = next_completed(&mut rx).await;
    assert!(!first.loading);
    assert!(first.error.is_none());
    let first_at = first.last_updated.expect("completed run sets last_updated");
    let artist = first.artist.expect("completed run publishes the artist");
    assert_eq!(artist.sounds.len(), 1);
    assert_eq!(artist.sounds[0].total_posts, 9000);

    // New upstream data, then a manual refresh: the refreshed run's snapshot
    // replaces the old one wholesale.
    sheets.reset().await;
    mount_overview_fixture(&sheets, 9500).await;
    feed.refresh();

    let second = next_completed(&mut rx).await;
    let second_artist = second.artist.expect("refreshed run publishes the artist");
    assert_eq!(second_artist.sounds[0].total_posts, 9500);
    assert!(second.last_updated.expect("set on completion") >= first_at);

    feed.shutdown();
}

#[tokio::test]
async fn repeated_runs_accumulate_ledger_growth() {
    let sheets = MockServer::start().await;
    let relay = MockServer::start().await;

    for gid in ["0", "1", "2"] {
        mount_tab(&sheets, gid, json!({"rows": []})).await;
    }

    let ledger = Arc::new(HistoryLedger::new(MemoryStore::new()));

    // Seed yesterday's observation directly.
    let yesterday = chrono::Utc::now().date_naive() - chrono::Duration::days(1);
    ledger.upsert_on("bromance", 1000, yesterday).await.unwrap();

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<html><strong>1,400</strong></html>"),
        )
        .mount(&relay)
        .await;

    let pipeline = pipeline_against(&sheets, &relay, Arc::clone(&ledger));
    let run = pipeline.run_artist(&test_artist()).await;

    let sound = &run.artist.sounds[0];
    assert_eq!(sound.total_posts, 1400);
    assert_eq!(sound.daily_growth, 400);
    // 400 > max(2 * 0, 100)? Trailing window is [0, 400]; prior average 0.
    assert!(sound.is_spike);
    assert_eq!(sound.chart_series.len(), 2);
}
