// src/output/mod.rs
// =============================================================================
// This module writes the scraped Listings to disk.
//
// Submodules:
// - csv: the delimited file writer and the timestamped file name
// =============================================================================

mod csv;

pub use self::csv::{output_path, write_listings};
