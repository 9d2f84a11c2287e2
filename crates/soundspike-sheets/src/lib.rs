//! Tabular source: fetches spreadsheet-export tabs and parses the raw cell
//! grids into typed daily-log, overview, and ranking records.

pub mod client;
pub mod envelope;
pub mod error;
pub mod grid;
pub mod parse;

pub use client::SheetsClient;
pub use error::SheetsError;
pub use grid::Grid;
pub use parse::{normalize_header_date, parse_daily_log, parse_overview, parse_ranking};
