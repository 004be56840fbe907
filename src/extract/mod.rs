// src/extract/mod.rs
// =============================================================================
// This module turns raw markup into Listings.
//
// Submodules:
// - page: parses markup and finds elements by tag + classes
// - listing: the Listing record and the per-block field extraction
//
// Rust concepts:
// - pub use: Re-export items so callers write `extract::Listing`
// =============================================================================

mod listing;
mod page;

pub use listing::{BlockOutcome, Listing, ListingExtractor};
pub use page::Page;

#[cfg(test)]
pub(crate) use listing::fixtures;
