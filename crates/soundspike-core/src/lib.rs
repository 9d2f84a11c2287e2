pub mod app_config;
pub mod config;
pub mod sounds;
pub mod types;

use thiserror::Error;

pub use app_config::AppConfig;
pub use config::{load_app_config, load_app_config_from_env};
pub use sounds::{load_sounds, slugify, ArtistConfig, SoundConfig, SoundsFile};
pub use types::{
    Artist, ChartPoint, DailyLogEntry, HistoryEntry, ProcessedSound, RankingRecord, SoundHistory,
    SoundOverviewRecord,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required env var: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for env var {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read sounds file {path}: {source}")]
    SoundsFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse sounds file: {0}")]
    SoundsFileParse(#[from] serde_yaml::Error),

    #[error("invalid sounds file: {0}")]
    SoundsFileInvalid(String),
}
