// src/extract/listing.rs
// =============================================================================
// This module turns one parsed results page into Listings.
//
// How it works:
// 1. Find the single offer container on the page
// 2. Find every listing block inside it
// 3. For each block, pull out the nine fields:
//    - stats block      -> engine capacity, horsepower, optional description
//    - title block      -> link (href) and full name (text)
//    - data elements    -> mileage (0), fuel type (1), year (3)
//    - price block      -> price with all whitespace removed
// 4. Return one outcome per block: Ok(Listing) or Err(ListingError)
//
// A block either produces a complete Listing or nothing. One bad block never
// affects its siblings. Only a missing offer container fails the whole page.
// =============================================================================

use scraper::ElementRef;
use serde::Serialize;
use tracing::debug;

use super::page::{attr_of, raw_text_of, text_of, ElementMatcher, Page};
use crate::config::Selectors;
use crate::error::{ListingError, ScrapeError};

/// Placeholder used when the stats block carries no description segment
pub const NO_DESCRIPTION: &str = "No description";

/// One car-for-sale entry, exactly as displayed on the results page.
///
/// All fields are kept as text; `year` and `price_pln` are not parsed.
/// Field order here is the column order of the output file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Listing {
    pub link: String,
    pub full_name: String,
    pub description: String,
    pub year: String,
    pub mileage_km: String,
    pub engine_capacity: String,
    pub fuel_type: String,
    pub horsepower: String,
    pub price_pln: String,
}

impl Listing {
    pub const FIELD_NAMES: [&'static str; 9] = [
        "link",
        "full_name",
        "description",
        "year",
        "mileage_km",
        "engine_capacity",
        "fuel_type",
        "horsepower",
        "price_pln",
    ];
}

/// Result of extracting a single listing block
pub type BlockOutcome = Result<Listing, ListingError>;

/// Pieces of the stats line, e.g. "1 998 cm3 • 150 KM • Sedan"
#[derive(Debug, PartialEq, Eq)]
pub struct Stats {
    pub engine_capacity: String,
    pub horsepower: String,
    pub description: String,
}

/// Splits a stats line on `delimiter`
///
/// Exactly three segments: the third is the description. Two (or more than
/// three): the description is the placeholder. Fewer than two is an error.
pub fn split_stats(text: &str, delimiter: &str) -> Result<Stats, ListingError> {
    let segments: Vec<&str> = text.split(delimiter).collect();

    // Engine capacity and horsepower are mandatory
    if segments.len() < 2 {
        return Err(ListingError::TooFewStatsSegments {
            found: segments.len(),
            text: text.trim().to_string(),
        });
    }

    // Only an exact three-way split carries a description
    let description = if segments.len() == 3 {
        segments[2].trim().to_string()
    } else {
        NO_DESCRIPTION.to_string()
    };

    Ok(Stats {
        engine_capacity: segments[0].trim().to_string(),
        horsepower: segments[1].trim().to_string(),
        description,
    })
}

/// "123 456 zł" -> "123456zł"
pub fn normalize_price(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Extracts Listings from pages using a fixed set of compiled selectors
#[derive(Debug, Clone)]
pub struct ListingExtractor {
    container: ElementMatcher,
    block: ElementMatcher,
    stats: ElementMatcher,
    title: ElementMatcher,
    title_link: ElementMatcher,
    price: ElementMatcher,
    data: ElementMatcher,
    delimiter: String,
}

impl ListingExtractor {
    /// Compiles every selector up front so a typo fails before any fetch
    pub fn new(selectors: &Selectors) -> Result<Self, ScrapeError> {
        Ok(Self {
            container: ElementMatcher::compile(&selectors.offer_container)?,
            block: ElementMatcher::compile(&selectors.listing_block)?,
            stats: ElementMatcher::compile(&selectors.stats_block)?,
            title: ElementMatcher::compile(&selectors.title_block)?,
            title_link: ElementMatcher::tag(&selectors.title_link_tag)?,
            price: ElementMatcher::compile(&selectors.price_block)?,
            data: ElementMatcher::tag(&selectors.data_tag)?,
            delimiter: selectors.stats_delimiter.clone(),
        })
    }

    /// One outcome per listing block, in document order
    ///
    /// Fails only when the offer container is absent.
    pub fn extract_page(&self, url: &str, page: &Page) -> Result<Vec<BlockOutcome>, ScrapeError> {
        // Step 1: the first offer container; without it the page has nothing
        let container = self
            .container
            .find_first(page.root())
            .ok_or_else(|| ScrapeError::ContainerMissing {
                url: url.to_string(),
            })?;

        // Step 2: every listing block, searched only inside the container
        let blocks = self.block.find_all(container);
        debug!(
            url,
            container = self.container.label(),
            block = self.block.label(),
            count = blocks.len(),
            "Found listing blocks"
        );

        // Step 3: one outcome per block; collect() keeps document order
        Ok(blocks
            .into_iter()
            .map(|block| self.extract_block(block))
            .collect())
    }

    // Turns one listing block into a Listing
    //
    // Each lookup bails out with `?` on the first missing piece, so a block
    // gives either all nine fields or a ListingError naming what was missing.
    pub fn extract_block(&self, block: ElementRef<'_>) -> BlockOutcome {
        // Stats line: "1 998 cm3 • 150 KM • Sedan"
        // raw text, so the delimiter is still there to split on
        let stats_el = self
            .stats
            .find_first(block)
            .ok_or(ListingError::MissingElement("stats"))?;
        let stats = split_stats(&raw_text_of(stats_el), &self.delimiter)?;

        // Title block -> its link: href is the link, text is the full name
        let title_el = self
            .title
            .find_first(block)
            .ok_or(ListingError::MissingElement("title"))?;
        let link_el = self
            .title_link
            .find_first(title_el)
            .ok_or(ListingError::MissingElement("title link"))?;
        let link = attr_of(link_el, "href").ok_or(ListingError::MissingAttribute {
            element: "title link",
            attribute: "href",
        })?;
        let full_name = text_of(link_el);

        // Data elements are read by position:
        //   0 = mileage, 1 = fuel type, 2 = (gearbox, unused), 3 = year
        // index 2 exists in the markup but is not part of a Listing
        let data = self.data.find_all(block);
        if data.len() < 4 {
            return Err(ListingError::TooFewDataElements { found: data.len() });
        }
        let mileage_km = text_of(data[0]);
        let fuel_type = text_of(data[1]);
        let year = text_of(data[3]);

        // Price: "89 900 PLN" -> "89900PLN"
        let price_el = self
            .price
            .find_first(block)
            .ok_or(ListingError::MissingElement("price"))?;
        let price_pln = normalize_price(&raw_text_of(price_el));

        Ok(Listing {
            link: link.to_string(),
            full_name,
            description: stats.description,
            year,
            mileage_km,
            engine_capacity: stats.engine_capacity,
            fuel_type,
            horsepower: stats.horsepower,
            price_pln,
        })
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why one Result per block?
//    - Vec<Result<Listing, ListingError>> keeps good and bad blocks side by side
//    - The caller sees exactly which blocks failed and why
//    - A bad block can never take its siblings down with it
//
// 2. Why are data elements read by index?
//    - The site renders them as bare <dd> tags with no distinguishing class
//    - Their position is the only thing that says "this one is the year"
//    - Fewer than four means the block is not a normal listing, so we skip it
//
// 3. Why raw_text_of for stats and price, but text_of elsewhere?
//    - text_of trims the result, which is fine for names and years
//    - The stats line must keep its delimiter and spacing until split_stats
//    - The price loses every whitespace character anyway
//
// 4. Why does Listing derive Serialize?
//    - The csv crate serializes each Listing straight into one row
//    - Field order in the struct is the column order in the file
// -----------------------------------------------------------------------------


#[cfg(test)]
mod tests {
    use super::fixtures::{page, selectors, Block};
    use super::*;

    fn extract(html: &str) -> Result<Vec<BlockOutcome>, ScrapeError> {
        let extractor = ListingExtractor::new(&selectors()).unwrap();
        let page = Page::parse("https://example.com/?page=1", html).unwrap();
        extractor.extract_page("https://example.com/?page=1", &page)
    }

    fn ok_listings(outcomes: Vec<BlockOutcome>) -> Vec<Listing> {
        outcomes.into_iter().filter_map(Result::ok).collect()
    }

    #[test]
    fn test_split_stats_two_segments_uses_placeholder() {
        let stats = split_stats("1 998 cm3 • 150 KM", "•").unwrap();
        assert_eq!(stats.engine_capacity, "1 998 cm3");
        assert_eq!(stats.horsepower, "150 KM");
        assert_eq!(stats.description, NO_DESCRIPTION);
    }

    #[test]
    fn test_split_stats_three_segments_keeps_description() {
        let stats = split_stats("A • B •   Garage kept  ", "•").unwrap();
        assert_eq!(stats.description, "Garage kept");
    }

    #[test]
    fn test_split_stats_four_segments_uses_placeholder() {
        let stats = split_stats("A • B • C • D", "•").unwrap();
        assert_eq!(stats.horsepower, "B");
        assert_eq!(stats.description, NO_DESCRIPTION);
    }

    #[test]
    fn test_split_stats_single_segment_fails() {
        let err = split_stats("only engine", "•").unwrap_err();
        assert_eq!(
            err,
            ListingError::TooFewStatsSegments {
                found: 1,
                text: "only engine".to_string()
            }
        );
    }

    #[test]
    fn test_normalize_price() {
        assert_eq!(normalize_price("123 456 zł"), "123456zł");
        assert_eq!(normalize_price(" 89\u{a0}900 PLN\n"), "89900PLN");
    }

    #[test]
    fn test_extracts_all_fields() {
        let listings = ok_listings(extract(&page(&[Block::ok("Dodge Charger")])).unwrap());
        assert_eq!(
            listings,
            vec![Listing {
                link: "/oferta/dodge-charger".to_string(),
                full_name: "Dodge Charger".to_string(),
                description: "Sedan".to_string(),
                year: "2016".to_string(),
                mileage_km: "120 000 km".to_string(),
                engine_capacity: "1 998 cm3".to_string(),
                fuel_type: "Benzyna".to_string(),
                horsepower: "150 KM".to_string(),
                price_pln: "89900PLN".to_string(),
            }]
        );
    }

    #[test]
    fn test_data_index_two_never_appears() {
        let block = Block {
            data: &["d0", "d1", "d2-unused", "d3", "d4"],
            ..Block::ok("Car")
        };
        let listing = ok_listings(extract(&page(&[block])).unwrap()).remove(0);
        assert_eq!(listing.mileage_km, "d0");
        assert_eq!(listing.fuel_type, "d1");
        assert_eq!(listing.year, "d3");
        let row = [
            &listing.link,
            &listing.full_name,
            &listing.description,
            &listing.year,
            &listing.mileage_km,
            &listing.engine_capacity,
            &listing.fuel_type,
            &listing.horsepower,
            &listing.price_pln,
        ];
        assert!(row.iter().all(|f| !f.contains("d2")));
    }

    #[test]
    fn test_missing_price_skips_only_that_block() {
        let html = page(&[
            Block::ok("First"),
            Block { price: None, ..Block::ok("Second") },
            Block::ok("Third"),
        ]);
        let outcomes = extract(&html).unwrap();
        assert_eq!(outcomes.len(), 3);
        assert_eq!(
            outcomes[1].as_ref().unwrap_err(),
            &ListingError::MissingElement("price")
        );

        let names: Vec<String> = ok_listings(outcomes).into_iter().map(|l| l.full_name).collect();
        assert_eq!(names, vec!["First", "Third"]);
    }

    #[test]
    fn test_count_equals_blocks_minus_invalid() {
        let html = page(&[
            Block::ok("A"),
            Block { stats: Some("no delimiter here"), ..Block::ok("B") },
            Block { data: &["1", "2", "3"], ..Block::ok("C") },
            Block { stats: None, ..Block::ok("D") },
            Block::ok("E"),
        ]);
        let outcomes = extract(&html).unwrap();
        let failures: Vec<&ListingError> =
            outcomes.iter().filter_map(|o| o.as_ref().err()).collect();
        assert_eq!(failures.len(), 3);
        assert!(matches!(failures[0], ListingError::TooFewStatsSegments { found: 1, .. }));
        assert_eq!(failures[1], &ListingError::TooFewDataElements { found: 3 });
        assert_eq!(failures[2], &ListingError::MissingElement("stats"));
        assert_eq!(ok_listings(outcomes).len(), 2);
    }

    #[test]
    fn test_missing_href_is_block_failure() {
        let html = page(&[Block::ok("A")]).replace(r#"href="/oferta/a""#, "");
        let outcomes = extract(&html).unwrap();
        assert!(matches!(
            outcomes[0],
            Err(ListingError::MissingAttribute { attribute: "href", .. })
        ));
    }

    #[test]
    fn test_missing_container_fails_page() {
        let html = "<html><body><article class='car'></article></body></html>";
        let err = extract(html).unwrap_err();
        assert!(matches!(err, ScrapeError::ContainerMissing { .. }));
    }

    #[test]
    fn test_empty_container_yields_nothing() {
        let outcomes = extract("<div class='offers'></div>").unwrap();
        assert!(outcomes.is_empty());
    }

    #[test]
    fn test_extraction_is_idempotent() {
        let html = page(&[Block::ok("A"), Block { price: None, ..Block::ok("B") }, Block::ok("C")]);
        let first = ok_listings(extract(&html).unwrap());
        let second = ok_listings(extract(&html).unwrap());
        assert_eq!(first, second);
    }
}
