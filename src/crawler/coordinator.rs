//! Crawler coordinator - main crawl orchestration logic
//!
//! This module drives one crawl run:
//! - Resolving the listing-page range (probing the last page if needed)
//! - Discovering detail-page URLs
//! - Moving every book through fetch, validation, extraction and the
//!   optional asset downloads
//! - Merging the recorded books into the JSON catalog

use crate::config::Config;
use crate::crawler::assets::{download_image, download_text};
use crate::crawler::build_http_client;
use crate::crawler::discovery::{discover_book_urls, probe_last_page};
use crate::crawler::fetcher::fetch_url;
use crate::crawler::parser::parse_book;
use crate::output::{append_to_catalog, CrawlReport};
use crate::state::{BookRecord, BookState, SkipReason};
use crate::url::{book_id_from_url, CrawlRange, SiteUrls};
use crate::{BookshelfError, Result};
use reqwest::Client;
use std::path::{Path, PathBuf};
use url::Url;

/// Result of processing one book URL that did not stop the run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookOutcome {
    /// The book was parsed and its assets stored
    Recorded(BookRecord),

    /// The book was left out of the catalog
    Skipped { url: Url, reason: SkipReason },
}

/// Main crawler coordinator structure
pub struct Coordinator {
    config: Config,
    site: SiteUrls,
    client: Client,
}

impl Coordinator {
    /// Creates a coordinator with a client built from the user agent config
    ///
    /// # Errors
    ///
    /// Fails if the site URLs cannot be built or the HTTP client cannot be
    /// constructed.
    pub fn new(config: Config) -> Result<Self> {
        let client = build_http_client(&config.user_agent)?;
        Self::with_client(config, client)
    }

    /// Creates a coordinator around an existing HTTP client
    pub fn with_client(config: Config, client: Client) -> Result<Self> {
        let site = SiteUrls::new(&config.site)?;
        Ok(Self {
            config,
            site,
            client,
        })
    }

    /// Works out which listing pages to crawl
    ///
    /// Uses the configured end page when there is one. Otherwise the last
    /// listing page is read from page 1 and included in the range.
    pub async fn resolve_range(&self) -> Result<CrawlRange> {
        let start_page = self.config.crawler.start_page;
        let end_page = match self.config.crawler.end_page {
            Some(end_page) => end_page,
            None => {
                let last_page = probe_last_page(&self.client, &self.site).await?;
                last_page
                    .checked_add(1)
                    .ok_or_else(|| BookshelfError::MalformedPage {
                        url: self.site.listing_page(1).map(String::from).unwrap_or_default(),
                        message: format!("last page {} is out of range", last_page),
                    })?
            }
        };

        let range = CrawlRange::new(start_page, end_page);
        if range.is_empty() {
            tracing::warn!("Listing page range {} is empty", range);
        }
        Ok(range)
    }

    /// Runs the crawl over `range`
    ///
    /// Books are processed one at a time in discovery order. Skipped books are
    /// logged and counted; any other error stops the run before the catalog is
    /// written. Recorded books are merged into the catalog at the end.
    pub async fn run(&self, range: CrawlRange) -> Result<CrawlReport> {
        let mut report = CrawlReport::new();
        tracing::info!("Starting crawl of listing pages {}", range);

        let book_urls = discover_book_urls(&self.client, &self.site, range).await?;
        report.listing_pages = range.len();
        report.books_discovered = book_urls.len();
        tracing::info!("Discovered {} books", book_urls.len());

        let mut records = Vec::with_capacity(book_urls.len());
        for (index, url) in book_urls.iter().enumerate() {
            tracing::debug!("Book {}/{}: {}", index + 1, book_urls.len(), url);

            match self.process_book(url).await {
                Ok(BookOutcome::Recorded(record)) => {
                    if record.text_asset_path.is_some() {
                        report.texts_saved += 1;
                    } else if !self.config.crawler.skip_text {
                        report.texts_unavailable += 1;
                    }
                    if record.cover_asset_path.is_some() {
                        report.covers_saved += 1;
                    }
                    records.push(record);
                }
                Ok(BookOutcome::Skipped { url, reason }) => {
                    tracing::warn!("Skipping {}: {}", url, reason);
                    report.record_skip(&reason);
                }
                Err(e) => {
                    tracing::error!("Crawl stopped at {}: {}", url, e);
                    return Err(e);
                }
            }
        }

        report.books_recorded = records.len();
        let catalog_path = PathBuf::from(&self.config.output.json_path);
        report.catalog_size =
            tokio::task::spawn_blocking(move || append_to_catalog(&catalog_path, &records))
                .await??;
        report.finish();

        tracing::info!(
            "Crawl completed: {} recorded, {} skipped",
            report.books_recorded,
            report.books_skipped()
        );
        Ok(report)
    }

    /// Processes a single book detail URL
    ///
    /// # Returns
    ///
    /// * `Ok(BookOutcome::Recorded)` - Metadata extracted, enabled assets stored
    /// * `Ok(BookOutcome::Skipped)` - URL is not a detail page, the page was
    ///   redirected away, or the page or its text answered with an HTTP error
    /// * `Err(BookshelfError)` - Transport failure, malformed page, cover
    ///   download failure or a filesystem error; the run must stop
    pub async fn process_book(&self, url: &Url) -> Result<BookOutcome> {
        let mut state = BookState::Fetching;

        let Some(book_id) = book_id_from_url(url) else {
            return Ok(skip(url, &mut state, SkipReason::InvalidUrl));
        };

        let response = fetch_url(&self.client, url).await?;
        advance(url, &mut state, BookState::Validating);

        let response = match response.ensure_found() {
            Ok(response) => response,
            Err(BookshelfError::NotFound { .. }) => {
                return Ok(skip(url, &mut state, SkipReason::Redirected));
            }
            Err(BookshelfError::Http { status, .. }) => {
                return Ok(skip(url, &mut state, SkipReason::HttpError { status }));
            }
            Err(e) => return Err(e),
        };

        advance(url, &mut state, BookState::Extracting);
        let parsed = parse_book(&response.text(), url)?;
        let mut record = BookRecord::new(
            book_id,
            parsed.title,
            parsed.author,
            parsed.genres,
            parsed.comments,
        );

        if !self.config.crawler.skip_text {
            advance(url, &mut state, BookState::DownloadingText);
            let directory = Path::new(&self.config.output.books_folder);
            match download_text(&self.client, &self.site, &record.title, book_id, directory).await
            {
                Ok(path) => record.text_asset_path = path,
                Err(BookshelfError::Http { status, .. }) => {
                    return Ok(skip(url, &mut state, SkipReason::HttpError { status }));
                }
                Err(e) => return Err(e),
            }
        }

        if !self.config.crawler.skip_images {
            advance(url, &mut state, BookState::DownloadingCover);
            let directory = Path::new(&self.config.output.images_folder);
            let cover = download_image(
                &self.client,
                &self.site,
                book_id,
                &record.title,
                &parsed.cover_ref,
                directory,
            )
            .await;
            match cover {
                Ok(path) => record.cover_asset_path = Some(path),
                Err(e) => {
                    // The book never reaches the catalog, so its text goes too
                    if let Some(text_path) = &record.text_asset_path {
                        if let Err(remove_error) = tokio::fs::remove_file(text_path).await {
                            tracing::warn!(
                                "Could not remove {}: {}",
                                text_path.display(),
                                remove_error
                            );
                        }
                    }
                    return Err(e);
                }
            }
        }

        advance(url, &mut state, BookState::Recording);
        advance(url, &mut state, BookState::Recorded);
        Ok(BookOutcome::Recorded(record))
    }
}

fn advance(url: &Url, state: &mut BookState, next: BookState) {
    debug_assert!(
        state.can_transition_to(next),
        "invalid transition {} -> {}",
        state,
        next
    );
    tracing::debug!("{}: {} -> {}", url, state, next);
    *state = next;
}

fn skip(url: &Url, state: &mut BookState, reason: SkipReason) -> BookOutcome {
    advance(url, state, reason.state());
    BookOutcome::Skipped {
        url: url.clone(),
        reason,
    }
}

/// Runs the main crawl operation
///
/// Builds the coordinator, resolves the page range and crawls it.
///
/// # Example
///
/// ```no_run
/// use bookshelf::config::load_config;
/// use bookshelf::crawler::run_crawl;
/// use std::path::{Path, PathBuf};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("bookshelf.toml"))?;
/// let report = run_crawl(config).await?;
/// println!("{} books recorded", report.books_recorded);
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: Config) -> Result<CrawlReport> {
    let coordinator = Coordinator::new(config)?;
    let range = coordinator.resolve_range().await?;
    coordinator.run(range).await
}
