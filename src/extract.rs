//! Field extraction from a book listing page.
//!
//! Markup that is missing or does not match degrades to absent fields; nothing here fails.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

static ROW_SELECTOR: Lazy<Selector> =
    Lazy::new(|| parse_selector("tr[itemtype='http://schema.org/Book']"));
static TITLE_SELECTOR: Lazy<Selector> = Lazy::new(|| parse_selector(".bookTitle span"));
static AUTHOR_SELECTOR: Lazy<Selector> = Lazy::new(|| parse_selector(".authorName span"));
static RATING_SELECTOR: Lazy<Selector> = Lazy::new(|| parse_selector(".minirating"));
static DETAIL_LINK_SELECTOR: Lazy<Selector> = Lazy::new(|| parse_selector("a.bookTitle[href]"));
static ANY_LINK_SELECTOR: Lazy<Selector> = Lazy::new(|| parse_selector("a[href]"));

// The listing page has been seen both with a real em-dash and with its
// UTF-8-read-as-Latin-1 form, so both byte sequences are accepted.
static RATING_SUMMARY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d+\.\d+) avg rating (?:—|â€”) (\d+(?:,\d+)*) ratings")
        .expect("valid rating summary regex")
});

fn parse_selector(css: &str) -> Selector {
    Selector::parse(css).unwrap_or_else(|err| panic!("invalid selector {css}: {err}"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RatingSummary {
    /// 0-5 average scaled to 0-100 and rounded.
    pub rating: u32,
    pub ratings_count: u64,
}

/// Fields read from one listing row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingRow {
    pub title: Option<String>,
    pub author: Option<String>,
    pub rating: Option<RatingSummary>,
    /// `href` of the row's detail-page link, as written in the markup.
    pub detail_href: Option<String>,
}

/// Extracts every book row from a listing document, in document order.
pub fn parse_listing(html: &str) -> Vec<ListingRow> {
    let document = Html::parse_document(html);
    document.select(&ROW_SELECTOR).map(extract_row).collect()
}

pub fn extract_row(row: ElementRef<'_>) -> ListingRow {
    let title = first_text(row, &TITLE_SELECTOR);
    let author = first_text(row, &AUTHOR_SELECTOR);
    let rating = first_text(row, &RATING_SELECTOR)
        .as_deref()
        .and_then(parse_rating_summary);

    ListingRow {
        title,
        author,
        rating,
        detail_href: detail_href(row),
    }
}

/// Parses `"<f> avg rating — <n> ratings"` into a 0-100 rating and a plain count.
pub fn parse_rating_summary(text: &str) -> Option<RatingSummary> {
    let captures = RATING_SUMMARY_RE.captures(text)?;

    let average: f64 = captures.get(1)?.as_str().parse().ok()?;
    let ratings_count: u64 = captures.get(2)?.as_str().replace(',', "").parse().ok()?;

    Some(RatingSummary {
        rating: (average * 20.0).round() as u32,
        ratings_count,
    })
}

fn first_text(scope: ElementRef<'_>, selector: &Selector) -> Option<String> {
    let element = scope.select(selector).next()?;
    Some(element.text().collect::<String>().trim().to_owned())
}

fn detail_href(row: ElementRef<'_>) -> Option<String> {
    let href = row
        .select(&DETAIL_LINK_SELECTOR)
        .next()
        .and_then(|a| a.value().attr("href"))
        .or_else(|| {
            row.select(&ANY_LINK_SELECTOR)
                .filter_map(|a| a.value().attr("href"))
                .find(|href| href.contains("/book/show/"))
        })?;

    let href = href.trim();
    (!href.is_empty()).then(|| href.to_owned())
}
