// src/fetch/mod.rs
// =============================================================================
// This module downloads pages.
//
// Submodules:
// - http: the reqwest-backed fetcher and the PageSource trait
// =============================================================================

mod http;

pub use http::{HttpFetcher, PageSource};
