//! Page source: best-effort extraction of a sound's total post count from
//! its public page HTML, fetched through a pass-through relay.

pub mod error;
pub mod extract;
pub mod fetch;
pub mod number;

pub use error::ScrapeError;
pub use extract::extract_post_count;
pub use fetch::PageFetcher;
pub use number::parse_magnitude;
