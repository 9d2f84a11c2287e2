use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("sheets client error: {0}")]
    Sheets(#[from] soundspike_sheets::SheetsError),

    #[error("page fetcher error: {0}")]
    Scrape(#[from] soundspike_scraper::ScrapeError),

    #[error("ledger error: {0}")]
    Ledger(#[from] soundspike_ledger::LedgerError),
}
