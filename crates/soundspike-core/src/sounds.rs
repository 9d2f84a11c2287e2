use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// One tracked sound: a display name plus the public page URL its total
/// post count is scraped from when the tabular source is unavailable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SoundConfig {
    pub name: String,
    pub url: String,
    /// Explicit stable id; defaults to a slug of `name` when absent.
    pub id: Option<String>,
}

impl SoundConfig {
    /// Ledger key for this sound: the explicit id when configured, otherwise
    /// a slug of the display name.
    #[must_use]
    pub fn sound_id(&self) -> String {
        self.id.clone().unwrap_or_else(|| slugify(&self.name))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtistConfig {
    pub name: String,
    pub sounds: Vec<SoundConfig>,
    pub id: Option<String>,
}

impl ArtistConfig {
    #[must_use]
    pub fn artist_id(&self) -> String {
        self.id.clone().unwrap_or_else(|| slugify(&self.name))
    }
}

#[derive(Debug, Deserialize)]
pub struct SoundsFile {
    pub artists: Vec<ArtistConfig>,
}

impl SoundsFile {
    /// Look up one artist by id, or the first configured artist when no id
    /// is given.
    #[must_use]
    pub fn artist(&self, id: Option<&str>) -> Option<&ArtistConfig> {
        match id {
            Some(id) => self.artists.iter().find(|a| a.artist_id() == id),
            None => self.artists.first(),
        }
    }
}

/// Generate a URL-safe slug from a display name.
#[must_use]
pub fn slugify(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' {
                c
            } else if c.is_whitespace() {
                '-'
            } else {
                '\0'
            }
        })
        .filter(|&c| c != '\0')
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// Load and validate the tracked-sounds roster from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails
/// validation (empty roster, duplicate ids, empty names/URLs).
pub fn load_sounds(path: &Path) -> Result<SoundsFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::SoundsFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let sounds_file: SoundsFile = serde_yaml::from_str(&content)?;

    validate_sounds(&sounds_file)?;

    Ok(sounds_file)
}

fn validate_sounds(file: &SoundsFile) -> Result<(), ConfigError> {
    if file.artists.is_empty() {
        return Err(ConfigError::SoundsFileInvalid(
            "no artists configured".to_string(),
        ));
    }

    let mut artist_ids = HashSet::new();
    // Sound ids key the ledger, so they must be unique across the whole
    // roster, not just within one artist.
    let mut sound_ids = HashSet::new();

    for artist in &file.artists {
        if artist.name.trim().is_empty() {
            return Err(ConfigError::SoundsFileInvalid(
                "artist with empty name".to_string(),
            ));
        }
        let artist_id = artist.artist_id();
        if !artist_ids.insert(artist_id.clone()) {
            return Err(ConfigError::SoundsFileInvalid(format!(
                "duplicate artist id: {artist_id}"
            )));
        }
        for sound in &artist.sounds {
            if sound.name.trim().is_empty() {
                return Err(ConfigError::SoundsFileInvalid(format!(
                    "sound with empty name under artist {artist_id}"
                )));
            }
            if sound.url.trim().is_empty() {
                return Err(ConfigError::SoundsFileInvalid(format!(
                    "sound \"{}\" has an empty url",
                    sound.name
                )));
            }
            let sound_id = sound.sound_id();
            if !sound_ids.insert(sound_id.clone()) {
                return Err(ConfigError::SoundsFileInvalid(format!(
                    "duplicate sound id: {sound_id}"
                )));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "sounds_test.rs"]
mod sounds_test;
