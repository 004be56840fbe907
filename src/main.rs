// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up logging (tracing, to stderr)
// 3. Dispatch to the appropriate subcommand handler
// 4. Exit with proper code (0 = success, 2 = error)
//
// A scrape run always ends with an output file, even when every page failed
// (that file is just the header row). Only a bad config (an unparseable base
// URL included) or a failed write ends the run without one.
// =============================================================================

// Module declarations - tells Rust about our other source files
mod cli;       // src/cli.rs - command-line parsing
mod config;    // src/config.rs - run configuration
mod crawl;     // src/crawl/ - walks the result pages
mod error;     // src/error.rs - error types
mod extract;   // src/extract/ - markup -> Listings
mod fetch;     // src/fetch/ - HTTP page fetching
mod output;    // src/output/ - CSV writer

use anyhow::{Context, Result};
use clap::Parser;
use std::path::Path;
use std::time::Duration;

use cli::{Cli, Commands, ScrapeArgs};
use crawl::{Paginator, ScrapeReport};
use fetch::HttpFetcher;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    let exit_code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// RUST_LOG wins; otherwise the --log-level flag
fn init_logging(level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<i32> {
    match cli.command {
        Commands::Scrape(args) => handle_scrape(&args).await,
        Commands::Config { config } => {
            let config = cli::load_config(config.as_ref())?;
            println!("{}", serde_json::to_string_pretty(&config)?);
            Ok(0)
        }
    }
}

// Handles the 'scrape' subcommand
async fn handle_scrape(args: &ScrapeArgs) -> Result<i32> {
    // Step 1: defaults -> JSON file -> command-line flags
    let config = args.apply(cli::load_config(args.config.as_ref())?);
    // Reject a config that can never work before any request goes out
    config.validate()?;

    // Step 2: one HTTP client and one compiled set of selectors for the run
    let fetcher = HttpFetcher::new(&config.headers, Duration::from_secs(config.timeout_secs))?;
    let paginator = Paginator::new(fetcher, &config)?;

    // Stamp the file name once, before the first page is fetched
    let path = match &args.output {
        Some(path) => path.clone(),
        None => output::output_path(&config.output),
    };

    if !args.json {
        println!("🔍 Scraping '{}' from {}", config.search_path, config.base_url);
        println!("📄 Pages to fetch: {}", config.pages);
    }

    // Step 3: walk the pages; failed pages are inside the report, not errors
    let report = paginator.scrape_pages().await;

    // Step 4: write whatever we got, even if that is just the header row
    output::write_listings(&path, &report.listings, config.output.delimiter)
        .with_context(|| format!("could not save {} listing(s)", report.listings.len()))?;

    // Step 5: tell the user what happened
    print_summary(&report, &path, args.json)?;
    Ok(0)
}

// Prints the run summary either as a table or JSON
fn print_summary(report: &ScrapeReport, path: &Path, json: bool) -> Result<()> {
    if json {
        let summary = serde_json::json!({
            "output": path.display().to_string(),
            "listings": report.listings.len(),
            "failed_pages": report.failed_pages(),
            "skipped_blocks": report.skipped_blocks(),
            "pages": report.pages,
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!();
    println!("{:<6} {:<10} {:<8} {:<40}", "PAGE", "LISTINGS", "SKIPPED", "ERROR");
    println!("{}", "=".repeat(66));
    for page in &report.pages {
        println!(
            "{:<6} {:<10} {:<8} {:<40}",
            page.page,
            page.listings,
            page.skipped_blocks,
            page.error_kind.unwrap_or("")
        );
    }

    println!();
    println!("📊 Summary:");
    println!("   ✅ Listings: {}", report.listings.len());
    println!("   ⚠️  Skipped blocks: {}", report.skipped_blocks());
    println!("   ❌ Failed pages: {}", report.failed_pages());
    println!("💾 Wrote {}", path.display());
    Ok(())
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What is #[tokio::main]?
//    - Rust has no built-in async runtime
//    - This macro starts tokio and runs our async main inside it
//
// 2. Why does run() return Result<i32> instead of calling exit() itself?
//    - `?` can bubble any error up to one place
//    - main() prints it with {:#}, which includes every .context() layer
//    - std::process::exit() skips destructors, so we call it exactly once
//
// 3. Why does a run with failed pages still exit 0?
//    - A lost page only means fewer rows in the file
//    - The summary (table or --json) shows which pages failed and why
//
// 4. Why do logs go to stderr?
//    - stdout carries the summary, which may be JSON for another program
//    - Mixing log lines into it would break that JSON
// -----------------------------------------------------------------------------
