//! HTML parser for the catalog site's listing and detail pages
//!
//! This module extracts:
//! - Book metadata from a detail page (title, author, comments, genres, cover)
//! - Detail-page links from a listing page
//! - The number of the last listing page from the pagination block
//!
//! Selectors follow the site's fixed markup; every page is wrapped in a
//! layout `table` whose `div#content` holds the actual content.

use crate::url::SiteUrls;
use crate::{BookshelfError, Result};
use scraper::{ElementRef, Html, Selector};
use url::Url;

const HEADING_SELECTOR: &str = "table div#content h1";
/// Author link, relative to the heading
const AUTHOR_SELECTOR: &str = "a";
const COMMENT_SELECTOR: &str = "table div#content span.black";
const GENRE_SELECTOR: &str = "table span.d_book a";
const COVER_SELECTOR: &str = "table div#content img";
const BOOK_CARD_SELECTOR: &str = "table div#content table";
const LINK_SELECTOR: &str = "a[href]";
const LAST_PAGE_SELECTOR: &str = "table div#content p.center a.npage:last-child";

/// Separator token between title and author in the detail-page heading
const TITLE_SEPARATOR: &str = "::";

/// Metadata read from a book detail page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedBook {
    /// Title, taken from the heading text before the `::` token
    pub title: String,

    /// Author, taken from the link inside the heading
    pub author: String,

    /// Reader comments in document order
    pub comments: Vec<String>,

    /// Genres in document order
    pub genres: Vec<String>,

    /// Site-relative `src` of the cover image
    pub cover_ref: String,
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| BookshelfError::Selector(format!("{}: {}", css, e)))
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

fn malformed(url: &Url, message: impl Into<String>) -> BookshelfError {
    BookshelfError::MalformedPage {
        url: url.to_string(),
        message: message.into(),
    }
}

/// Parses a book detail page
///
/// # Arguments
///
/// * `html` - The detail page body
/// * `url` - The page URL, used in error messages
///
/// # Returns
///
/// * `Ok(ParsedBook)` - All required elements were found
/// * `Err(BookshelfError::MalformedPage)` - Heading, author link, cover image
///   or its `src` is missing, or the title is empty
///
/// # Example
///
/// ```
/// use bookshelf::crawler::parse_book;
/// use url::Url;
///
/// let html = r#"<table><tr><td><div id="content">
///     <h1>Treasure Island :: <a href="/a1/">R. Stevenson</a></h1>
///     <img src="/shots/1.jpg">
/// </div></td></tr></table>"#;
/// let url = Url::parse("https://tululu.org/b1/").unwrap();
/// let book = parse_book(html, &url).unwrap();
/// assert_eq!(book.title, "Treasure Island");
/// assert_eq!(book.author, "R. Stevenson");
/// ```
pub fn parse_book(html: &str, url: &Url) -> Result<ParsedBook> {
    let document = Html::parse_document(html);

    let heading = document
        .select(&selector(HEADING_SELECTOR)?)
        .next()
        .ok_or_else(|| malformed(url, "missing title heading"))?;
    let title = extract_title(&heading.text().collect::<String>());
    if title.is_empty() {
        return Err(malformed(url, "empty title"));
    }

    let author = heading
        .select(&selector(AUTHOR_SELECTOR)?)
        .next()
        .map(element_text)
        .ok_or_else(|| malformed(url, "missing author link in heading"))?;

    let comments = document
        .select(&selector(COMMENT_SELECTOR)?)
        .map(element_text)
        .collect();

    let genres = document
        .select(&selector(GENRE_SELECTOR)?)
        .map(element_text)
        .collect();

    let cover_ref = document
        .select(&selector(COVER_SELECTOR)?)
        .next()
        .ok_or_else(|| malformed(url, "missing cover image"))?
        .value()
        .attr("src")
        .map(str::trim)
        .filter(|src| !src.is_empty())
        .ok_or_else(|| malformed(url, "cover image has no src"))?
        .to_string();

    Ok(ParsedBook {
        title,
        author,
        comments,
        genres,
        cover_ref,
    })
}

/// Returns the title part of a `"<title> :: <author>"` heading
///
/// Whitespace-separated tokens before the first `::` token are joined with
/// single spaces. A heading without the separator is taken whole.
pub fn extract_title(heading: &str) -> String {
    heading
        .split_whitespace()
        .take_while(|token| *token != TITLE_SEPARATOR)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Extracts the detail-page links of every book card on a listing page
///
/// Each card is a nested `table` inside the content block; the first link of
/// a card points to the book. Links are resolved against the site origin and
/// returned in document order. Cards without a usable link are skipped.
pub fn extract_book_links(html: &str, site: &SiteUrls) -> Result<Vec<Url>> {
    let document = Html::parse_document(html);
    let link_selector = selector(LINK_SELECTOR)?;
    let mut links = Vec::new();

    for card in document.select(&selector(BOOK_CARD_SELECTOR)?) {
        let Some(href) = card
            .select(&link_selector)
            .next()
            .and_then(|a| a.value().attr("href"))
        else {
            tracing::debug!("Book card without a link, skipping");
            continue;
        };

        match site.resolve(href) {
            Ok(url) => links.push(url),
            Err(e) => tracing::debug!("Unresolvable book link {:?}: {}", href, e),
        }
    }

    Ok(links)
}

/// Reads the number of the last listing page from the pagination block
///
/// # Errors
///
/// Returns `BookshelfError::MalformedPage` if the pagination block is missing
/// or its last entry is not a number.
pub fn extract_last_page(html: &str, url: &Url) -> Result<u32> {
    let document = Html::parse_document(html);

    let text = document
        .select(&selector(LAST_PAGE_SELECTOR)?)
        .next()
        .map(element_text)
        .ok_or_else(|| malformed(url, "missing pagination block"))?;

    text.parse::<u32>()
        .map_err(|_| malformed(url, format!("last page {:?} is not a number", text)))
}
