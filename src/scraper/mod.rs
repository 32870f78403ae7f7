mod integrations;
mod showcases;
mod trending;

pub use integrations::{IntegrationDetail, IntegrationScraper, IntegrationSummary};
pub use showcases::{
    OtherShowcase, RepositorySummary, SearchResult, ShowcaseDetail, ShowcaseScraper,
    ShowcaseSummary,
};
pub use trending::{Contributor, TrendingDeveloper, TrendingRepo, TrendingScraper};

use crate::error::ExtractError;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;

pub struct Scraper {
    document: Html,
}

impl Scraper {
    pub fn new(html: &str) -> Self {
        Self {
            document: Html::parse_document(html),
        }
    }

    pub fn showcases(&self) -> ShowcaseScraper {
        ShowcaseScraper::new(&self.document)
    }

    pub fn integrations(&self) -> IntegrationScraper {
        IntegrationScraper::new(&self.document)
    }

    pub fn trending(&self) -> TrendingScraper {
        TrendingScraper::new(&self.document)
    }
}

pub(crate) fn sel(selector: &str) -> Selector {
    Selector::parse(selector).unwrap()
}

pub(crate) fn text_of(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

// Text nodes directly under the element, skipping nested markup.
pub(crate) fn own_text(el: ElementRef<'_>) -> String {
    el.children()
        .filter_map(|node| node.value().as_text())
        .map(|text| &**text)
        .collect::<String>()
        .trim()
        .to_string()
}

pub(crate) fn first_text(el: ElementRef<'_>) -> String {
    el.text().next().unwrap_or("").trim().to_string()
}

pub(crate) fn next_element(el: ElementRef<'_>) -> Option<ElementRef<'_>> {
    el.next_siblings().find_map(ElementRef::wrap)
}

pub(crate) fn nth_next_element(el: ElementRef<'_>, n: usize) -> Option<ElementRef<'_>> {
    (0..n).try_fold(el, |current, _| next_element(current))
}

pub(crate) fn parent_element(el: ElementRef<'_>) -> Option<ElementRef<'_>> {
    el.parent().and_then(ElementRef::wrap)
}

pub(crate) fn child_elements<'a>(el: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    el.children().filter_map(ElementRef::wrap)
}

pub(crate) fn sibling_with_class<'a>(el: ElementRef<'a>, class: &str) -> Option<ElementRef<'a>> {
    let parent = parent_element(el)?;
    child_elements(parent)
        .find(|sibling| sibling.id() != el.id() && sibling.value().classes().any(|c| c == class))
}

pub(crate) fn require_attr<'a>(
    el: ElementRef<'a>,
    element: &'static str,
    attribute: &'static str,
) -> Result<&'a str, ExtractError> {
    el.value()
        .attr(attribute)
        .ok_or(ExtractError::MissingAttribute { element, attribute })
}

// Digit extraction over matched text: strip everything that is not a digit
// and parse the remainder. Digit-free text is a fatal extraction error.
pub(crate) fn parse_count(field: &'static str, text: &str) -> Result<u64, ExtractError> {
    let digits: String = text.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return Err(ExtractError::NoDigits {
            field,
            text: text.to_string(),
        });
    }
    digits.parse().map_err(|_| ExtractError::NoDigits {
        field,
        text: text.to_string(),
    })
}

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

pub(crate) fn slugify(label: &str) -> String {
    WHITESPACE.replace_all(label.trim(), "-").into_owned()
}
