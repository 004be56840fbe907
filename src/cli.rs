// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Two subcommands:
// - scrape: fetch the result pages and write the CSV file
// - config: print the effective configuration as JSON
//
// Settings are layered: built-in defaults, then an optional JSON config file,
// then whatever flags are given here.
//
// Rust concepts:
// - Derive macros: clap generates the parser from these structs
// - Option<T>: a flag that was not given leaves the lower layer alone
// =============================================================================

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::ScrapeConfig;
use crate::error::ScrapeError;

#[derive(Parser, Debug)]
#[command(
    name = "listing-scraper",
    version,
    about = "Scrape paginated car listings into a CSV file",
    long_about = "listing-scraper fetches the result pages of one classifieds search, \
                  extracts each car listing and writes them all to a timestamped CSV file."
)]
pub struct Cli {
    /// Log level used when RUST_LOG is not set (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scrape listing pages and write them to a CSV file
    ///
    /// Example: listing-scraper scrape uzywane/dodge/charger/od-2015 --pages 3
    Scrape(ScrapeArgs),

    /// Print the effective configuration as JSON
    ///
    /// Handy as a starting point for a --config file.
    Config {
        /// JSON config file to layer over the defaults
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[derive(Args, Debug, Default)]
pub struct ScrapeArgs {
    /// Search path segment, e.g. "uzywane/dodge/charger/od-2015"
    pub search_path: Option<String>,

    /// Number of result pages to fetch (starting at page 1)
    #[arg(long, short = 'p')]
    pub pages: Option<u32>,

    /// Site + category URL the search path is appended to
    #[arg(long)]
    pub base_url: Option<String>,

    /// JSON config file to layer over the defaults
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Write to this exact file instead of <prefix>_<timestamp>.<ext>
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Directory for the timestamped output file
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// File name prefix for the timestamped output file
    #[arg(long)]
    pub prefix: Option<String>,

    /// Field delimiter for the output file
    #[arg(long)]
    pub delimiter: Option<char>,

    /// Request timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Print the run summary as JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

/// Defaults, then the config file (if any), then flags
pub fn load_config(file: Option<&PathBuf>) -> Result<ScrapeConfig, ScrapeError> {
    match file {
        Some(path) => ScrapeConfig::from_json_file(path),
        None => Ok(ScrapeConfig::default()),
    }
}

impl ScrapeArgs {
    // Overlays every flag the user actually passed; None leaves the value alone
    pub fn apply(&self, mut config: ScrapeConfig) -> ScrapeConfig {
        if let Some(path) = &self.search_path {
            config.search_path = path.clone();
        }
        if let Some(pages) = self.pages {
            config.pages = pages;
        }
        if let Some(base) = &self.base_url {
            config.base_url = base.clone();
        }
        if let Some(dir) = &self.output_dir {
            config.output.directory = dir.clone();
        }
        if let Some(prefix) = &self.prefix {
            config.output.prefix = prefix.clone();
        }
        if let Some(delimiter) = self.delimiter {
            config.output.delimiter = delimiter;
        }
        if let Some(timeout) = self.timeout {
            config.timeout_secs = timeout;
        }
        config
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why are most scrape flags Option<T>?
//    - None means "not given on the command line"
//    - That is different from "given, with the default value"
//    - Only Some(..) overrides what the config file said
//
// 2. What does `global = true` on --log-level do?
//    - The flag is accepted before or after the subcommand name
//    - `listing-scraper --log-level debug scrape` and
//      `listing-scraper scrape --log-level debug` both work
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scrape_flags() {
        let cli = Cli::parse_from([
            "listing-scraper",
            "scrape",
            "uzywane/bmw/m3",
            "--pages",
            "0",
            "--delimiter",
            ";",
            "--json",
        ]);
        let Commands::Scrape(args) = cli.command else {
            panic!("expected scrape subcommand");
        };
        assert_eq!(args.search_path.as_deref(), Some("uzywane/bmw/m3"));
        assert_eq!(args.pages, Some(0));
        assert!(args.json);
        assert_eq!(cli.log_level, "info");

        let cfg = args.apply(ScrapeConfig::default());
        assert_eq!(cfg.search_path, "uzywane/bmw/m3");
        assert_eq!(cfg.pages, 0);
        assert_eq!(cfg.output.delimiter, ';');
        // not given on the command line
        assert_eq!(cfg.base_url, ScrapeConfig::default().base_url);
    }

    #[test]
    fn test_no_flags_keeps_config() {
        let cfg = ScrapeArgs::default().apply(ScrapeConfig::default());
        assert_eq!(cfg, ScrapeConfig::default());
    }

    #[test]
    fn test_global_log_level() {
        let cli = Cli::parse_from(["listing-scraper", "config", "--log-level", "debug"]);
        assert_eq!(cli.log_level, "debug");
        assert!(matches!(cli.command, Commands::Config { config: None }));
    }
}
