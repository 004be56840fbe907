// src/crawl/mod.rs
// =============================================================================
// This module drives a whole scrape run.
//
// Features:
// - Walks pages 1..=N of one search in order
// - Fetch -> parse -> extract per page
// - Collects Listings and a per-page report
//
// Pages are never fetched in parallel; output order is page order.
// =============================================================================

mod paginator;

// Re-export the main crawling types
pub use paginator::{Paginator, ScrapeReport};
