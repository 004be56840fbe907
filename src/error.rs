// src/error.rs
// =============================================================================
// Error types for the scraper.
//
// There are two layers of failure:
// - ScrapeError: something went wrong for a whole page (or for the run,
//   e.g. bad configuration or a failed write)
// - ListingError: one listing block could not be turned into a Listing
//
// Page-level errors are recovered by the paginator (the page contributes zero
// listings). Block-level errors are recovered by the extractor (the block is
// skipped). Only configuration and write errors end the run.
// =============================================================================

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScrapeError {
    /// Network/transport failure, or a non-2xx response, for one page
    #[error("failed to fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: FetchCause,
    },

    /// The body could not be treated as markup at all
    #[error("failed to parse {url}: {reason}")]
    Parse { url: String, reason: String },

    /// The offer container is not on the page
    #[error("offer container not found on {url}")]
    ContainerMissing { url: String },

    #[error("invalid selector '{selector}': {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: csv::Error,
    },
}

/// What actually went wrong underneath a `ScrapeError::Fetch`.
#[derive(Error, Debug)]
pub enum FetchCause {
    #[error(transparent)]
    Transport(reqwest::Error),

    #[error("HTTP {0}")]
    Status(u16),
}

/// Why a single listing block was skipped.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ListingError {
    #[error("missing {0} element")]
    MissingElement(&'static str),

    #[error("{element} element has no '{attribute}' attribute")]
    MissingAttribute {
        element: &'static str,
        attribute: &'static str,
    },

    #[error("stats block split into {found} segment(s), need at least 2: {text:?}")]
    TooFewStatsSegments { found: usize, text: String },

    #[error("found {found} data element(s), need at least 4")]
    TooFewDataElements { found: usize },
}

impl ScrapeError {
    /// Short label used in the run summary
    pub fn kind(&self) -> &'static str {
        match self {
            ScrapeError::Fetch { .. } => "fetch",
            ScrapeError::Parse { .. } => "parse",
            ScrapeError::ContainerMissing { .. } => "container_missing",
            ScrapeError::InvalidSelector { .. } => "invalid_selector",
            ScrapeError::InvalidUrl { .. } => "invalid_url",
            ScrapeError::Config(_) => "config",
            ScrapeError::Write { .. } => "write",
        }
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What does #[derive(Error)] from thiserror give us?
//    - A Display impl built from the #[error("...")] strings
//    - std::error::Error, with source() wired to the #[source] field
//    - No hand-written boilerplate for either
//
// 2. Why are there two error enums?
//    - ScrapeError loses a whole page (or the run)
//    - ListingError loses one block and nothing else
//    - Keeping them apart means a block error can never end a page by accident
//
// 3. Why is FetchCause built by hand instead of with #[from]?
//    - The fetcher always knows the URL, so it wraps the cause itself
//    - There is no bare reqwest::Error -> FetchCause conversion to hide that
//
// 4. What is kind() for?
//    - A short, stable label for the summary table and --json output
//    - The full message (with the URL) goes in the log and in `error`
// -----------------------------------------------------------------------------
