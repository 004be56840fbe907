// src/extract/page.rs
// =============================================================================
// A thin layer over the `scraper` crate that gives the extractor exactly the
// operations it needs:
// - parse markup into a document
// - find the first / all descendants matching a tag + classes
// - find all descendants with a tag (no class filter)
// - trimmed text and attribute lookup
//
// Classes are matched by hand instead of being spliced into a CSS selector
// string. Site class names are generated ("ooa-r53y0q") and splicing them
// would need escaping; checking `classes()` does not.
// =============================================================================

use scraper::{ElementRef, Html, Selector};

use crate::config::SelectorPair;
use crate::error::ScrapeError;

/// A parsed listing page
pub struct Page {
    document: Html,
}

impl Page {
    /// Parses raw markup into a navigable tree
    ///
    /// html5ever recovers from almost anything, so the only input we refuse
    /// is one with no markup in it at all (empty or whitespace-only).
    pub fn parse(url: &str, markup: &str) -> Result<Self, ScrapeError> {
        if markup.trim().is_empty() {
            return Err(ScrapeError::Parse {
                url: url.to_string(),
                reason: "response body is empty".to_string(),
            });
        }

        Ok(Self {
            document: Html::parse_document(markup),
        })
    }

    /// The <html> element; every search starts here
    pub fn root(&self) -> ElementRef<'_> {
        self.document.root_element()
    }
}

/// A (tag, classes) pair compiled once and reused for every block
#[derive(Debug, Clone)]
pub struct ElementMatcher {
    tag: Selector,
    classes: Vec<String>,
    label: String,
}

impl ElementMatcher {
    pub fn compile(pair: &SelectorPair) -> Result<Self, ScrapeError> {
        Self::build(&pair.tag, &pair.class)
    }

    /// Tag only, any classes
    pub fn tag(tag: &str) -> Result<Self, ScrapeError> {
        Self::build(tag, "")
    }

    fn build(tag: &str, class: &str) -> Result<Self, ScrapeError> {
        let tag = tag.trim();
        let label = if class.trim().is_empty() {
            tag.to_string()
        } else {
            format!("{}.{}", tag, class.split_whitespace().collect::<Vec<_>>().join("."))
        };

        // Only plain element names; anything else would let CSS slip in
        if tag.is_empty() || !tag.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err(ScrapeError::InvalidSelector {
                selector: label,
                reason: "tag must be a plain element name".to_string(),
            });
        }

        let selector = Selector::parse(tag).map_err(|e| ScrapeError::InvalidSelector {
            selector: label.clone(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            tag: selector,
            classes: class.split_whitespace().map(str::to_string).collect(),
            label,
        })
    }

    /// Human-readable form, e.g. "div.offers.list"
    pub fn label(&self) -> &str {
        &self.label
    }

    // Every wanted class must be on the element; extra classes are fine
    fn matches(&self, element: &ElementRef<'_>) -> bool {
        let have: Vec<&str> = element.value().classes().collect();
        self.classes.iter().all(|c| have.contains(&c.as_str()))
    }

    /// First matching descendant of `scope`, in document order
    pub fn find_first<'a>(&self, scope: ElementRef<'a>) -> Option<ElementRef<'a>> {
        // The tag selector narrows the walk, the class check does the rest
        scope.select(&self.tag).find(|el| self.matches(el))
    }

    /// All matching descendants of `scope`, in document order
    pub fn find_all<'a>(&self, scope: ElementRef<'a>) -> Vec<ElementRef<'a>> {
        scope.select(&self.tag).filter(|el| self.matches(el)).collect()
    }
}

/// All text below the element, trimmed at both ends
pub fn text_of(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// All text below the element, untouched
pub fn raw_text_of(element: ElementRef<'_>) -> String {
    element.text().collect()
}

pub fn attr_of<'a>(element: ElementRef<'a>, name: &str) -> Option<&'a str> {
    element.value().attr(name)
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why are classes matched by hand?
//    - "div.ooa-r53y0q.ezh3mkl11" works, but only until a class starts with
//      a digit or contains a character CSS treats specially
//    - classes() hands us the element's class list already split
//    - So the selector only ever holds a plain tag name
//
// 2. What is the 'a lifetime on find_first / find_all?
//    - ElementRef borrows from the parsed document
//    - The results live exactly as long as the Page they came from
//
// 3. Why does Page own the Html?
//    - Html is the whole parsed tree; ElementRefs point into it
//    - Keeping it inside Page makes "parse once, search many times" the only
//      way to use it
// -----------------------------------------------------------------------------
