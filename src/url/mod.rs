//! URL handling module for Bookshelf
//!
//! This module builds the site's endpoint URLs (listing pages, text export,
//! relative asset references), derives book ids from detail-page URLs, and
//! describes the range of listing pages a crawl covers.

mod book_id;
mod site;

pub use book_id::book_id_from_url;
pub use site::SiteUrls;

use std::fmt;
use std::ops::Range;

/// Range of listing pages to crawl, end exclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrawlRange {
    /// First listing page
    pub start_page: u32,
    /// Page the crawl stops at (not fetched)
    pub end_page: u32,
}

impl CrawlRange {
    /// Creates a new range `[start_page, end_page)`
    pub fn new(start_page: u32, end_page: u32) -> Self {
        Self {
            start_page,
            end_page,
        }
    }

    /// Page numbers covered by the range, in crawl order
    pub fn pages(&self) -> Range<u32> {
        self.start_page..self.end_page
    }

    /// Number of listing pages in the range
    pub fn len(&self) -> usize {
        self.pages().len()
    }

    /// Returns true if the range covers no page
    pub fn is_empty(&self) -> bool {
        self.end_page <= self.start_page
    }
}

impl fmt::Display for CrawlRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start_page, self.end_page)
    }
}
