//! Pipeline orchestration: spike classification, source reconciliation,
//! artist aggregation, and the refreshable feed consumed by the
//! presentation layer.

pub mod aggregate;
pub mod demo;
pub mod error;
pub mod feed;
pub mod reconcile;
pub mod runner;
pub mod spike;

pub use aggregate::aggregate_artist;
pub use demo::{demo_artist, demo_artists};
pub use error::PipelineError;
pub use feed::{spawn_feed, FeedHandle, FeedSnapshot};
pub use reconcile::{reconcile_scraped, reconcile_tabular, ScrapedSound};
pub use runner::{Pipeline, PipelineRun};
pub use spike::classify_spike;
