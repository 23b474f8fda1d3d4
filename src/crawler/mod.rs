//! Crawler module for the book catalog
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with the redirect sentinel
//! - Detail-page and listing-page parsing
//! - Book text and cover downloads
//! - Overall crawl coordination

mod assets;
mod coordinator;
mod discovery;
mod fetcher;
mod parser;

pub use assets::{download_image, download_text, sanitize_filename, sanitize_filename_within};
pub use coordinator::{run_crawl, BookOutcome, Coordinator};
pub use discovery::{discover_book_urls, probe_last_page};
pub use fetcher::{build_http_client, fetch_url, is_redirected_away, HttpResponse, RedirectHop};
pub use parser::{extract_book_links, extract_last_page, extract_title, parse_book, ParsedBook};

use crate::config::Config;
use crate::output::CrawlReport;
use crate::Result;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Build the HTTP client
/// 2. Resolve the listing-page range
/// 3. Discover and process every book
/// 4. Merge the recorded books into the catalog
///
/// # Returns
///
/// * `Ok(CrawlReport)` - Crawl completed; skipped books are counted in the report
/// * `Err(BookshelfError)` - Crawl stopped on a fatal error
pub async fn crawl(config: Config) -> Result<CrawlReport> {
    run_crawl(config).await
}
