// src/config.rs
// =============================================================================
// Run configuration.
//
// Everything that used to be a hard-coded constant tied to one site's markup
// lives here: the search path, how many pages to fetch, the request headers,
// the (tag, class) selector pairs and the output file naming.
//
// A ScrapeConfig is built once (defaults -> optional JSON file -> CLI flags)
// and then handed by reference to the fetcher, extractor and writer. Nothing
// mutates it after that.
//
// Rust concepts:
// - #[serde(default)]: missing fields in the JSON file fall back to Default
// - impl Default: one place that describes the stock configuration
// =============================================================================

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

use crate::error::ScrapeError;

/// A tag name plus a whitespace-separated list of classes.
///
/// An element matches when it has the tag and *every* listed class.
/// An empty class string matches on the tag alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectorPair {
    pub tag: String,
    #[serde(default)]
    pub class: String,
}

impl SelectorPair {
    pub fn new(tag: &str, class: &str) -> Self {
        Self {
            tag: tag.to_string(),
            class: class.to_string(),
        }
    }
}

/// All the selectors the listing extractor needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Selectors {
    pub offer_container: SelectorPair,
    pub listing_block: SelectorPair,
    pub stats_block: SelectorPair,
    pub title_block: SelectorPair,
    /// The link element looked up inside the title block
    pub title_link_tag: String,
    pub price_block: SelectorPair,
    /// Unfiltered "data" elements, consumed by position
    pub data_tag: String,
    pub stats_delimiter: String,
}

impl Default for Selectors {
    fn default() -> Self {
        Self {
            offer_container: SelectorPair::new("div", "ooa-r53y0q ezh3mkl11"),
            listing_block: SelectorPair::new("article", "ooa-yca59n emjt7sh0"),
            stats_block: SelectorPair::new("p", "emjt7sh10 ooa-1tku07r er34gjf0"),
            title_block: SelectorPair::new("h1", "emjt7sh9 ooa-1ed90th er34gjf0"),
            title_link_tag: "a".to_string(),
            price_block: SelectorPair::new("h3", "emjt7sh16 ooa-1n2paoq er34gjf0"),
            data_tag: "dd".to_string(),
            stats_delimiter: "•".to_string(),
        }
    }
}

/// Request headers sent with every page fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeaderSet {
    pub user_agent: String,
    pub accept: String,
    pub accept_charset: String,
    pub accept_encoding: String,
    pub accept_language: String,
    pub connection: String,
}

impl Default for HeaderSet {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.11 \
                         (KHTML, like Gecko) Chrome/23.0.1271.64 Safari/537.11"
                .to_string(),
            accept: "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"
                .to_string(),
            accept_charset: "ISO-8859-1,utf-8;q=0.7,*;q=0.3".to_string(),
            accept_encoding: "none".to_string(),
            accept_language: "en-US,en;q=0.8".to_string(),
            connection: "keep-alive".to_string(),
        }
    }
}

/// Where and how the delimited file is written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub prefix: String,
    pub extension: String,
    pub directory: PathBuf,
    pub delimiter: char,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            prefix: "cars".to_string(),
            extension: "csv".to_string(),
            directory: PathBuf::from("."),
            delimiter: ',',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapeConfig {
    /// Site + category, e.g. "https://www.otomoto.pl/osobowe"
    pub base_url: String,
    /// make/model/filter segment, e.g. "uzywane/dodge/charger/od-2015"
    pub search_path: String,
    /// Number of result pages to fetch, starting at page 1
    pub pages: u32,
    pub timeout_secs: u64,
    pub headers: HeaderSet,
    pub selectors: Selectors,
    pub output: OutputConfig,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.otomoto.pl/osobowe".to_string(),
            search_path: "uzywane/dodge/charger/od-2015".to_string(),
            pages: 5,
            timeout_secs: 30,
            headers: HeaderSet::default(),
            selectors: Selectors::default(),
            output: OutputConfig::default(),
        }
    }
}

impl ScrapeConfig {
    /// Loads a JSON config file on top of the defaults
    pub fn from_json_file(path: &Path) -> Result<Self, ScrapeError> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            ScrapeError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json_str(&text)
            .map_err(|e| ScrapeError::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn from_json_str(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Catches mistakes that would otherwise only show up mid-run
    ///
    /// Checks run in order and the first failure wins.
    pub fn validate(&self) -> Result<(), ScrapeError> {
        // 1. The base URL must be present and absolute (scheme + host)
        let base = self.base_url.trim();
        if base.is_empty() {
            return Err(ScrapeError::Config("base_url is empty".to_string()));
        }
        Url::parse(base).map_err(|source| ScrapeError::InvalidUrl {
            url: base.to_string(),
            source,
        })?;

        // 2. split_stats needs something to split on
        if self.selectors.stats_delimiter.is_empty() {
            return Err(ScrapeError::Config("stats_delimiter is empty".to_string()));
        }
        // 3. The csv crate only takes a single-byte delimiter
        if !self.output.delimiter.is_ascii() {
            return Err(ScrapeError::Config(format!(
                "output delimiter '{}' must be a single ASCII character",
                self.output.delimiter
            )));
        }
        // 4. reqwest treats a zero timeout as "fail immediately"
        if self.timeout_secs == 0 {
            return Err(ScrapeError::Config("timeout_secs must be positive".to_string()));
        }
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What does #[serde(default)] on a struct do?
//    - Any field missing from the JSON is taken from Default::default()
//    - So a config file can override just "pages" and nothing else
//
// 2. Why are selectors configuration and not constants?
//    - Class names like "ooa-yca59n" are generated by the site's build
//    - They change without notice; a JSON file fixes that without a rebuild
//
// 3. Why validate() instead of checking inside each module?
//    - One place, run once, before the first request goes out
//    - A bad base URL fails here as "invalid_url" instead of losing every page
//
// 4. Why is the output delimiter a char but must be ASCII?
//    - char is what a user naturally types on the command line
//    - The csv crate writes a single byte, so we reject anything wider
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_site_layout() {
        let cfg = ScrapeConfig::default();
        assert_eq!(cfg.pages, 5);
        assert_eq!(cfg.selectors.data_tag, "dd");
        assert_eq!(cfg.selectors.offer_container.tag, "div");
        assert_eq!(cfg.headers.connection, "keep-alive");
        assert_eq!(cfg.output.prefix, "cars");
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_partial_json_overrides_only_given_fields() {
        let cfg = ScrapeConfig::from_json_str(
            r#"{
                "search_path": "uzywane/bmw/m3",
                "pages": 2,
                "selectors": { "price_block": { "tag": "span", "class": "price" } }
            }"#,
        )
        .unwrap();

        assert_eq!(cfg.search_path, "uzywane/bmw/m3");
        assert_eq!(cfg.pages, 2);
        assert_eq!(cfg.selectors.price_block, SelectorPair::new("span", "price"));
        // untouched fields keep their defaults
        assert_eq!(cfg.selectors.data_tag, "dd");
        assert_eq!(cfg.base_url, "https://www.otomoto.pl/osobowe");
    }

    #[test]
    fn test_validate_rejects_non_ascii_delimiter() {
        let mut cfg = ScrapeConfig::default();
        cfg.output.delimiter = '•';
        assert!(matches!(cfg.validate(), Err(ScrapeError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_relative_base_url() {
        let cfg = ScrapeConfig {
            base_url: "www.otomoto.pl/osobowe".to_string(),
            ..ScrapeConfig::default()
        };
        let err = cfg.validate().unwrap_err();
        assert_eq!(err.kind(), "invalid_url");
    }

    #[test]
    fn test_missing_config_file_is_config_error() {
        let err = ScrapeConfig::from_json_file(Path::new("/nonexistent/scraper.json"))
            .unwrap_err();
        assert_eq!(err.kind(), "config");
    }
}
