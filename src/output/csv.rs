// src/output/csv.rs
// =============================================================================
// This module writes Listings to a delimited file.
//
// Format:
// - First row: the nine field names, in Listing's field order
// - Then one row per Listing, in the order we received them
// - No summary row at the end
//
// The header is written by hand instead of letting csv derive it from the
// first serialized record. With zero Listings there is no first record, and
// we still want a header-only file.
//
// The file name is <prefix>_<YYYY-MM-DD_HH-MM-SS>.<ext>, stamped once per run
// with the local time.
// =============================================================================

use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};

use crate::config::OutputConfig;
use crate::error::ScrapeError;
use crate::extract::Listing;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// "cars" + 2024-05-01 13:45:09 + "csv" -> "cars_2024-05-01_13-45-09.csv"
pub fn output_file_name(prefix: &str, extension: &str, now: DateTime<Local>) -> String {
    format!("{}_{}.{}", prefix, now.format(TIMESTAMP_FORMAT), extension)
}

/// Full output path for a run that starts now
pub fn output_path(config: &OutputConfig) -> PathBuf {
    config
        .directory
        .join(output_file_name(&config.prefix, &config.extension, Local::now()))
}

/// Writes the header and every Listing to `path`
///
/// A failure part-way through leaves whatever was already written; nothing
/// is cleaned up.
pub fn write_listings(path: &Path, listings: &[Listing], delimiter: char) -> Result<(), ScrapeError> {
    let fail = |source: csv::Error| ScrapeError::Write {
        path: path.display().to_string(),
        source,
    };

    // csv wants a single byte; char -> u8 is only lossless for ASCII
    if !delimiter.is_ascii() {
        return Err(ScrapeError::Config(format!(
            "output delimiter '{}' must be a single ASCII character",
            delimiter
        )));
    }

    // Step 1: open (create or truncate) the file
    // has_headers(false): we write the header row ourselves
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter as u8)
        .has_headers(false)
        .from_path(path)
        .map_err(fail)?;

    // Step 2: header row, even when there are no Listings
    writer.write_record(Listing::FIELD_NAMES).map_err(fail)?;

    // Step 3: one row per Listing, in the order we got them
    for listing in listings {
        writer.serialize(listing).map_err(fail)?;
    }
    // Step 4: csv buffers internally; flush so errors surface here
    writer.flush().map_err(|e| fail(e.into()))?;

    Ok(())
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why is the header row written explicitly?
//    - With has_headers(true), csv takes the header from the first
//      serialize() call
//    - Zero Listings means no serialize() call, so no header at all
//    - write_record(FIELD_NAMES) gives a header-only file in that case
//
// 2. Why the explicit flush()?
//    - The writer is buffered; dropping it flushes but swallows the error
//    - Calling flush() ourselves turns a full disk into a proper Write error
//
// 3. Why does output_file_name take `now` as a parameter?
//    - Tests can pass a fixed time and check the exact name
//    - output_path is the only place that reads the clock
//
// 4. What does `e.into()` do in the flush error?
//    - flush() returns std::io::Error, but Write holds a csv::Error
//    - csv implements From<io::Error>, so into() converts it
// -----------------------------------------------------------------------------
