//! Listing-page discovery
//!
//! Walks the category's listing pages and collects the detail-page URL of
//! every book card, in page order and then document order.

use crate::crawler::fetcher::fetch_url;
use crate::crawler::parser::{extract_book_links, extract_last_page};
use crate::url::{CrawlRange, SiteUrls};
use crate::Result;
use reqwest::Client;
use url::Url;

/// Collects the detail-page URLs of all books on the listing pages in `range`
///
/// Pages are fetched one at a time, `range.start_page` first, and the end page
/// itself is not fetched. Any failure on a listing page (redirect, HTTP error,
/// transport error) stops discovery: a missing listing page means the range
/// does not match the site.
///
/// # Example
///
/// ```no_run
/// use bookshelf::config::Config;
/// use bookshelf::crawler::{build_http_client, discover_book_urls};
/// use bookshelf::url::{CrawlRange, SiteUrls};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = Config::default();
/// let client = build_http_client(&config.user_agent)?;
/// let site = SiteUrls::new(&config.site)?;
/// let urls = discover_book_urls(&client, &site, CrawlRange::new(1, 4)).await?;
/// println!("{} books found", urls.len());
/// # Ok(())
/// # }
/// ```
pub async fn discover_book_urls(
    client: &Client,
    site: &SiteUrls,
    range: CrawlRange,
) -> Result<Vec<Url>> {
    let mut book_urls = Vec::new();

    for page in range.pages() {
        let listing_url = site.listing_page(page)?;
        let response = fetch_url(client, &listing_url).await?.ensure_found()?;

        let links = extract_book_links(&response.text(), site)?;
        tracing::info!("Listing page {}: {} books", page, links.len());
        book_urls.extend(links);
    }

    Ok(book_urls)
}

/// Reads the number of the category's last listing page from page 1
pub async fn probe_last_page(client: &Client, site: &SiteUrls) -> Result<u32> {
    let first_page = site.listing_page(1)?;
    let response = fetch_url(client, &first_page).await?.ensure_found()?;
    let last_page = extract_last_page(&response.text(), &first_page)?;

    tracing::debug!("Category has {} listing pages", last_page);
    Ok(last_page)
}
