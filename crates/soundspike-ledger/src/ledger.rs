use chrono::{NaiveDate, Utc};
use tokio::sync::Mutex;

use soundspike_core::{HistoryEntry, SoundHistory};

use crate::error::LedgerError;
use crate::store::HistoryStore;

/// Append-mostly ledger over an injected [`HistoryStore`].
///
/// All mutation goes through one async mutex, so overlapping pipeline runs
/// cannot interleave partial upserts for the same sound: writers are
/// serialized process-wide, which also satisfies the per-sound discipline.
pub struct HistoryLedger {
    store: Mutex<Box<dyn HistoryStore>>,
}

impl HistoryLedger {
    pub fn new(store: impl HistoryStore + 'static) -> Self {
        Self {
            store: Mutex::new(Box::new(store)),
        }
    }

    /// Record today's observed cumulative total for a sound and return the
    /// sound's updated history.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] if the store cannot be read or written.
    pub async fn upsert_today(
        &self,
        sound_id: &str,
        total_posts: u64,
    ) -> Result<Vec<HistoryEntry>, LedgerError> {
        self.upsert_on(sound_id, total_posts, Utc::now().date_naive())
            .await
    }

    /// Record a cumulative total for a sound on an explicit date.
    ///
    /// If an entry for `date` already exists its `total_posts` is
    /// overwritten and `daily_growth` is left exactly as first written
    /// (growth is fixed at first-write time for a date). Otherwise a new entry
    /// is appended with `daily_growth` relative to the previous entry's
    /// total (0 on the first observation of a sound), and the history is
    /// truncated to the most recent [`SoundHistory::RETENTION`] entries.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] if the store cannot be read or written.
    pub async fn upsert_on(
        &self,
        sound_id: &str,
        total_posts: u64,
        date: NaiveDate,
    ) -> Result<Vec<HistoryEntry>, LedgerError> {
        let store = self.store.lock().await;
        let mut all = store.load()?;

        let sound = match all.iter_mut().find(|h| h.sound_id == sound_id) {
            Some(sound) => sound,
            None => {
                all.push(SoundHistory {
                    sound_id: sound_id.to_string(),
                    history: Vec::new(),
                    last_updated: Utc::now(),
                });
                all.last_mut().expect("just pushed")
            }
        };

        if let Some(existing) = sound.history.iter_mut().find(|e| e.date == date) {
            existing.total_posts = total_posts;
            tracing::debug!(sound_id, %date, total_posts, "overwrote today's total");
        } else {
            #[allow(clippy::cast_possible_wrap)]
            let daily_growth = sound
                .history
                .last()
                .map_or(0, |prev| total_posts as i64 - prev.total_posts as i64);
            sound.history.push(HistoryEntry {
                date,
                total_posts,
                daily_growth,
            });
            if sound.history.len() > SoundHistory::RETENTION {
                let excess = sound.history.len() - SoundHistory::RETENTION;
                sound.history.drain(..excess);
            }
            tracing::debug!(sound_id, %date, total_posts, daily_growth, "appended history entry");
        }

        sound.last_updated = Utc::now();
        let updated = sound.history.clone();

        store.save(&all)?;
        Ok(updated)
    }

    /// The persisted history for one sound; empty if the sound is unknown.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] if the store cannot be read.
    pub async fn get(&self, sound_id: &str) -> Result<Vec<HistoryEntry>, LedgerError> {
        let store = self.store.lock().await;
        Ok(store
            .load()?
            .into_iter()
            .find(|h| h.sound_id == sound_id)
            .map(|h| h.history)
            .unwrap_or_default())
    }

    /// Snapshot of every persisted sound history.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] if the store cannot be read.
    pub async fn snapshot(&self) -> Result<Vec<SoundHistory>, LedgerError> {
        let store = self.store.lock().await;
        store.load()
    }

    /// Wipe all persisted ledger state. Irreversible; manual resets only.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] if the store cannot be written.
    pub async fn clear_all(&self) -> Result<(), LedgerError> {
        let store = self.store.lock().await;
        store.save(&[])?;
        tracing::info!("cleared all ledger history");
        Ok(())
    }
}

#[cfg(test)]
#[path = "ledger_test.rs"]
mod ledger_test;
