use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context};

use soundspike_core::{AppConfig, Artist, ArtistConfig, SoundConfig};
use soundspike_ledger::{HistoryLedger, JsonFileStore};
use soundspike_pipeline::{demo_artists, spawn_feed, Pipeline};
use soundspike_scraper::{extract_post_count, PageFetcher};

pub async fn run_once(config: &AppConfig, artist_id: Option<&str>) -> anyhow::Result<()> {
    let artist = load_artist(config, artist_id)?;
    let ledger = build_ledger(config);
    let pipeline = Pipeline::from_config(config, ledger)?;

    let run = pipeline.run_artist(&artist).await;
    print_artist(&run.artist);
    if let Some(error) = run.error {
        println!("\nall sources failed this run: {error}");
    }
    Ok(())
}

pub async fn watch(config: &AppConfig, artist_id: Option<&str>) -> anyhow::Result<()> {
    let artist = load_artist(config, artist_id)?;
    let ledger = build_ledger(config);
    let pipeline = Arc::new(Pipeline::from_config(config, ledger)?);

    let interval = Duration::from_secs(config.refresh_interval_secs);
    println!(
        "watching {} (refresh every {}s, ctrl-c to stop)",
        artist.name, config.refresh_interval_secs
    );

    let feed = spawn_feed(pipeline, artist, interval);
    let mut snapshots = feed.subscribe();

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = &mut ctrl_c => break,
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = snapshots.borrow_and_update().clone();
                if snapshot.loading {
                    continue;
                }
                if let Some(artist) = &snapshot.artist {
                    println!();
                    print_artist(artist);
                }
                if let Some(error) = &snapshot.error {
                    println!("all sources failed this refresh: {error}");
                }
            }
        }
    }

    feed.shutdown();
    Ok(())
}

pub async fn scrape(config: &AppConfig, sound_id: &str) -> anyhow::Result<()> {
    let sound = load_sound(config, sound_id)?;
    let fetcher = PageFetcher::new(
        config.request_timeout_secs,
        &config.user_agent,
        config.relay_urls.clone(),
    )?;

    let html = fetcher.fetch_page(&sound.url).await?;
    let count = extract_post_count(&html);
    if count == 0 {
        println!("{sound_id}: no post count extracted");
    } else {
        println!("{sound_id}: {count} posts");
    }
    Ok(())
}

pub async fn history(config: &AppConfig, sound_id: &str) -> anyhow::Result<()> {
    let ledger = build_ledger(config);
    let entries = ledger.get(sound_id).await?;
    if entries.is_empty() {
        println!("no history recorded for {sound_id}");
        return Ok(());
    }

    println!("{:<12} {:>14} {:>12}", "date", "total posts", "growth");
    for entry in entries {
        println!(
            "{:<12} {:>14} {:>12}",
            entry.date, entry.total_posts, entry.daily_growth
        );
    }
    Ok(())
}

pub async fn clear_history(config: &AppConfig) -> anyhow::Result<()> {
    let ledger = build_ledger(config);
    ledger.clear_all().await?;
    println!("cleared ledger at {}", config.ledger_path.display());
    Ok(())
}

pub fn demo() -> anyhow::Result<()> {
    let artists = demo_artists();
    println!("{}", serde_json::to_string_pretty(&artists)?);
    Ok(())
}

fn load_artist(config: &AppConfig, artist_id: Option<&str>) -> anyhow::Result<ArtistConfig> {
    let roster = soundspike_core::load_sounds(&config.sounds_path).with_context(|| {
        format!("loading sounds roster from {}", config.sounds_path.display())
    })?;
    match roster.artist(artist_id) {
        Some(artist) => Ok(artist.clone()),
        None => match artist_id {
            Some(id) => bail!("no artist with id {id:?} in the roster"),
            None => bail!("the sounds roster is empty"),
        },
    }
}

fn load_sound(config: &AppConfig, sound_id: &str) -> anyhow::Result<SoundConfig> {
    let roster = soundspike_core::load_sounds(&config.sounds_path).with_context(|| {
        format!("loading sounds roster from {}", config.sounds_path.display())
    })?;
    roster
        .artists
        .iter()
        .flat_map(|a| &a.sounds)
        .find(|s| s.sound_id() == sound_id)
        .cloned()
        .with_context(|| format!("no sound with id {sound_id:?} in the roster"))
}

fn build_ledger(config: &AppConfig) -> Arc<HistoryLedger> {
    Arc::new(HistoryLedger::new(JsonFileStore::new(&config.ledger_path)))
}

fn print_artist(artist: &Artist) {
    println!(
        "{}: {} sounds, {} spike days",
        artist.name,
        artist.sounds.len(),
        artist.total_spike_days
    );
    for sound in &artist.sounds {
        let spike = if sound.is_spike { "  SPIKE" } else { "" };
        let rank = sound
            .performance_rank
            .map_or_else(String::new, |r| format!("  #{r}"));
        println!(
            "  {:<24} {:>12} total  {:>+8}/day{rank}{spike}",
            sound.name, sound.total_posts, sound.daily_growth
        );
    }
}
