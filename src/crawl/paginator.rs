// src/crawl/paginator.rs
// =============================================================================
// This module walks the result pages of one search, one page at a time.
//
// How it works:
// 1. Build the page URLs: <base>/<search path>/?page=1 .. ?page=N
// 2. For each page, in order:
//    - fetch the markup
//    - parse it
//    - extract one outcome per listing block
// 3. Append the good Listings to one accumulator, log the bad blocks
// 4. Return the Listings plus a per-page report
//
// Failure handling:
// - A page whose URL cannot be built, that fails to fetch, fails to parse,
//   or has no offer container contributes zero listings. We log it and move
//   on to the next page.
// - A block that fails extraction is logged and skipped.
// - Nothing is retried.
//
// Rust concepts:
// - Generics: Paginator<S: PageSource> works with the real fetcher or a fake
// - One accumulator Vec, pushed to in page order then document order
// =============================================================================

use serde::Serialize;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::ScrapeConfig;
use crate::error::ScrapeError;
use crate::extract::{BlockOutcome, Listing, ListingExtractor, Page};
use crate::fetch::PageSource;

// What happened to a single page
//
// #[derive(Serialize)] lets the --json summary print the page list as-is
#[derive(Debug, Clone, Serialize)]
pub struct PageReport {
    /// 1-based page number
    pub page: u32,
    /// The URL we fetched (or tried to build)
    pub url: String,
    /// How many Listings this page contributed
    pub listings: usize,
    /// How many listing blocks were found but could not be extracted
    pub skipped_blocks: usize,
    /// Set when the whole page was lost (URL, fetch, parse, or container)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Short label for `error`, e.g. "fetch" or "container_missing"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<&'static str>,
}

// Everything one run produced
//
// `listings` is what the writer consumes; `pages` is what the summary shows.
#[derive(Debug, Clone, Default)]
pub struct ScrapeReport {
    pub listings: Vec<Listing>,
    pub pages: Vec<PageReport>,
}

impl ScrapeReport {
    /// Pages that contributed nothing because of a page-level error
    pub fn failed_pages(&self) -> usize {
        self.pages.iter().filter(|p| p.error.is_some()).count()
    }

    /// Listing blocks skipped across all pages
    pub fn skipped_blocks(&self) -> usize {
        self.pages.iter().map(|p| p.skipped_blocks).sum()
    }

    // Records a page that yielded nothing at all
    fn push_failed(&mut self, page: u32, url: String, error: &ScrapeError) {
        self.pages.push(PageReport {
            page,
            url,
            listings: 0,
            skipped_blocks: 0,
            error: Some(error.to_string()),
            error_kind: Some(error.kind()),
        });
    }
}

// Builds the URL of one result page
//
// Parameters:
//   base_url: site + category, e.g. "https://www.otomoto.pl/osobowe"
//   search_path: make/model/filter segment, e.g. "uzywane/bmw"
//   page: 1-based page number
//
// Example:
//   base = "https://www.otomoto.pl/osobowe", path = "uzywane/bmw", page = 2
//   -> "https://www.otomoto.pl/osobowe/uzywane/bmw/?page=2"
pub fn page_url(base_url: &str, search_path: &str, page: u32) -> Result<String, ScrapeError> {
    // Tolerate stray slashes on either side of the join
    let base = base_url.trim().trim_end_matches('/');
    let path = search_path.trim().trim_matches('/');

    // An empty search path means "the whole category"
    let raw = if path.is_empty() {
        format!("{}/?page={}", base, page)
    } else {
        format!("{}/{}/?page={}", base, path, page)
    };

    // Let the url crate decide whether this is a real absolute URL
    Url::parse(&raw)
        .map(|u| u.to_string())
        .map_err(|source| ScrapeError::InvalidUrl { url: raw, source })
}

pub struct Paginator<S: PageSource> {
    source: S,
    extractor: ListingExtractor,
    base_url: String,
    search_path: String,
    pages: u32,
}

impl<S: PageSource> Paginator<S> {
    // Creates a paginator over `source`
    //
    // All selectors are compiled here, so a bad selector fails before the
    // first request goes out.
    pub fn new(source: S, config: &ScrapeConfig) -> Result<Self, ScrapeError> {
        Ok(Self {
            source,
            extractor: ListingExtractor::new(&config.selectors)?,
            base_url: config.base_url.clone(),
            search_path: config.search_path.clone(),
            pages: config.pages,
        })
    }

    /// Page numbers 1..=N, each with its URL (or the reason it has none)
    pub fn page_urls(&self) -> impl Iterator<Item = (u32, Result<String, ScrapeError>)> + '_ {
        (1..=self.pages).map(move |n| (n, page_url(&self.base_url, &self.search_path, n)))
    }

    /// Scrapes every configured page, strictly in page order
    ///
    /// Never fails as a whole: every page-level problem ends up in the report
    /// and the run moves on, so the caller always has something to write.
    pub async fn scrape_pages(&self) -> ScrapeReport {
        let mut report = ScrapeReport::default();

        for (page, url) in self.page_urls() {
            // A URL we cannot build is just another lost page
            let url = match url {
                Ok(url) => url,
                Err(e) => {
                    warn!(page, error = %e, "Could not build page URL");
                    let raw = format!("{}/{}/?page={}", self.base_url, self.search_path, page);
                    report.push_failed(page, raw, &e);
                    continue;
                }
            };

            info!(page, total = self.pages, url = %url, "Scraping listing page");

            // Fetch -> parse -> extract; any error here loses the whole page
            let result = self.scrape_page(&url).await;
            match result {
                Ok(outcomes) => {
                    let mut skipped = 0usize;
                    let before = report.listings.len();

                    // Keep document order: push each good Listing as we see it
                    for (index, outcome) in outcomes.into_iter().enumerate() {
                        match outcome {
                            Ok(listing) => report.listings.push(listing),
                            Err(e) => {
                                // One bad block never affects its siblings
                                skipped += 1;
                                warn!(page, block = index, url = %url, error = %e, "Skipping listing block");
                            }
                        }
                    }

                    let found = report.listings.len() - before;
                    debug!(page, found, skipped, "Page done");
                    report.pages.push(PageReport {
                        page,
                        url,
                        listings: found,
                        skipped_blocks: skipped,
                        error: None,
                        error_kind: None,
                    });
                }
                Err(e) => {
                    // The page contributes zero listings; the run goes on
                    warn!(page, url = %url, error = %e, "Page contributed no listings");
                    report.push_failed(page, url, &e);
                }
            }
        }

        info!(
            listings = report.listings.len(),
            failed_pages = report.failed_pages(),
            skipped_blocks = report.skipped_blocks(),
            "Scrape finished"
        );
        report
    }

    // Fetch -> parse -> extract for one page
    //
    // The `?` operator hands the first failure straight back to scrape_pages,
    // which turns it into a failed PageReport.
    async fn scrape_page(&self, url: &str) -> Result<Vec<BlockOutcome>, ScrapeError> {
        let markup = self.source.fetch(url).await?;
        let page = Page::parse(url, &markup)?;
        self.extractor.extract_page(url, &page)
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why is Paginator generic over PageSource?
//    - Paginator<HttpFetcher> is what the binary runs
//    - Paginator<FakeSource> is what the tests run, with no network at all
//    - The compiler generates one copy per type (monomorphization), so the
//      generic costs nothing at runtime
//
// 2. Why does scrape_pages return ScrapeReport and not Result?
//    - Every failure it can see belongs to one page
//    - A lost page is recorded and skipped, never propagated
//    - So there is no error left to return, and the type says so
//
// 3. Why one Result per block?
//    - extract_page returns Vec<Result<Listing, ListingError>>
//    - The paginator decides what to do with each: keep it or log it
//    - Nothing is silently swallowed; every skip shows up in the log and in
//      skipped_blocks
//
// 4. What does `url = %url` mean in warn!/info!?
//    - tracing records structured fields next to the message
//    - `%` records the value with its Display impl
//    - `page` on its own is shorthand for `page = page`
//
// 5. Why the explicit `let result = ...; match result`?
//    - The awaited result owns no borrow of `url`
//    - That lets each match arm move `url` into the PageReport
// -----------------------------------------------------------------------------
