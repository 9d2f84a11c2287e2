//! The refreshable artist feed consumed by the presentation layer.
//!
//! A spawned task owns the refresh cadence (fixed interval plus manual
//! triggers) and publishes whole snapshots through a watch channel, so
//! consumers always observe the most recently *completed* run regardless of
//! request order: last writer wins at the presentation boundary. The feed
//! holds no mutable state of its own; the ledger inside the pipeline is the
//! only cross-run state.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use soundspike_core::{Artist, ArtistConfig};

use crate::runner::Pipeline;

/// What consumers see: the latest completed run's output plus in-flight and
/// error indicators. Replaced whole on every publish.
#[derive(Debug, Clone)]
pub struct FeedSnapshot {
    /// Output of the most recently completed run; `None` until the first
    /// run finishes.
    pub artist: Option<Artist>,
    /// True while a run is in flight. Existing data stays visible.
    pub loading: bool,
    /// Error summary from the latest completed run (all sources failed).
    pub error: Option<String>,
    pub last_updated: Option<DateTime<Utc>>,
}

impl FeedSnapshot {
    fn initial() -> Self {
        Self {
            artist: None,
            loading: true,
            error: None,
            last_updated: None,
        }
    }
}

/// Handle to a running feed task.
pub struct FeedHandle {
    snapshot_rx: watch::Receiver<FeedSnapshot>,
    refresh_tx: mpsc::Sender<()>,
    task: JoinHandle<()>,
}

impl FeedHandle {
    /// A receiver for snapshot updates; `borrow()` gives the current value.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<FeedSnapshot> {
        self.snapshot_rx.clone()
    }

    /// The current snapshot.
    #[must_use]
    pub fn latest(&self) -> FeedSnapshot {
        self.snapshot_rx.borrow().clone()
    }

    /// Request an immediate refresh. A refresh already queued while a run
    /// is in flight is enough; extra requests coalesce.
    pub fn refresh(&self) {
        let _ = self.refresh_tx.try_send(());
    }

    /// Stop the feed task.
    pub fn shutdown(self) {
        self.task.abort();
    }
}

/// Spawn the feed task for one artist: run immediately, then on every
/// interval tick or manual refresh.
#[must_use]
pub fn spawn_feed(
    pipeline: Arc<Pipeline>,
    artist: ArtistConfig,
    refresh_interval: Duration,
) -> FeedHandle {
    let (snapshot_tx, snapshot_rx) = watch::channel(FeedSnapshot::initial());
    let (refresh_tx, mut refresh_rx) = mpsc::channel::<()>(1);

    let task = tokio::spawn(async move {
        let mut interval = tokio::time::interval(refresh_interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // The first tick completes immediately; consume it so the loop's
        // ticks are all one full interval apart.
        interval.tick().await;

        run_and_publish(&pipeline, &artist, &snapshot_tx).await;

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    run_and_publish(&pipeline, &artist, &snapshot_tx).await;
                }
                msg = refresh_rx.recv() => match msg {
                    Some(()) => run_and_publish(&pipeline, &artist, &snapshot_tx).await,
                    // All handles dropped; nothing left to refresh for.
                    None => break,
                },
            }
        }
    });

    FeedHandle {
        snapshot_rx,
        refresh_tx,
        task,
    }
}

async fn run_and_publish(
    pipeline: &Pipeline,
    artist: &ArtistConfig,
    snapshot_tx: &watch::Sender<FeedSnapshot>,
) {
    // Mark in-flight while keeping last-known-good data visible.
    let mut loading = snapshot_tx.borrow().clone();
    loading.loading = true;
    snapshot_tx.send_replace(loading);

    let run = pipeline.run_artist(artist).await;

    snapshot_tx.send_replace(FeedSnapshot {
        artist: Some(run.artist),
        loading: false,
        error: run.error,
        last_updated: Some(run.completed_at),
    });
}
