//! Per-run crawl statistics
//!
//! This module collects counters while the crawl runs and prints them once
//! the catalog has been written.

use crate::state::{BookState, SkipReason};
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Counters for one crawl run
#[derive(Debug, Clone)]
pub struct CrawlReport {
    /// When the crawl started
    pub started_at: DateTime<Utc>,

    /// When the crawl finished
    pub finished_at: Option<DateTime<Utc>>,

    /// Listing pages fetched
    pub listing_pages: usize,

    /// Detail-page URLs found on the listing pages
    pub books_discovered: usize,

    /// Books added to the catalog
    pub books_recorded: usize,

    /// Skipped books by terminal state
    pub skipped: HashMap<BookState, usize>,

    /// Book texts written to disk
    pub texts_saved: usize,

    /// Books the site had no text for
    pub texts_unavailable: usize,

    /// Cover images written to disk
    pub covers_saved: usize,

    /// Entries in the catalog file after this run
    pub catalog_size: usize,
}

impl Default for CrawlReport {
    fn default() -> Self {
        Self::new()
    }
}

impl CrawlReport {
    /// Creates an empty report stamped with the current time
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            listing_pages: 0,
            books_discovered: 0,
            books_recorded: 0,
            skipped: HashMap::new(),
            texts_saved: 0,
            texts_unavailable: 0,
            covers_saved: 0,
            catalog_size: 0,
        }
    }

    /// Counts one skipped book
    pub fn record_skip(&mut self, reason: &SkipReason) {
        *self.skipped.entry(reason.state()).or_insert(0) += 1;
    }

    /// Total number of skipped books
    pub fn books_skipped(&self) -> usize {
        self.skipped.values().sum()
    }

    /// Marks the run as finished
    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// Run duration in seconds, once finished
    pub fn duration_seconds(&self) -> Option<i64> {
        self.finished_at
            .map(|finished| (finished - self.started_at).num_seconds())
    }
}

/// Formats the report as plain text
pub fn format_report(report: &CrawlReport) -> String {
    let mut out = String::new();

    out.push_str("=== Crawl Report ===\n\n");
    out.push_str(&format!("Started: {}\n", report.started_at.to_rfc3339()));
    if let Some(finished) = report.finished_at {
        out.push_str(&format!("Finished: {}\n", finished.to_rfc3339()));
    }
    if let Some(duration) = report.duration_seconds() {
        out.push_str(&format!("Duration: {}s\n", duration));
    }
    out.push('\n');

    out.push_str(&format!("Listing pages: {}\n", report.listing_pages));
    out.push_str(&format!("Books discovered: {}\n", report.books_discovered));
    out.push_str(&format!("Books recorded: {}\n", report.books_recorded));
    out.push_str(&format!("Books skipped: {}\n", report.books_skipped()));

    let mut skipped: Vec<_> = report.skipped.iter().collect();
    skipped.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.as_str().cmp(b.0.as_str())));
    for (state, count) in skipped {
        out.push_str(&format!("  {}: {}\n", state, count));
    }

    out.push_str(&format!("Texts saved: {}\n", report.texts_saved));
    out.push_str(&format!("Texts unavailable: {}\n", report.texts_unavailable));
    out.push_str(&format!("Covers saved: {}\n", report.covers_saved));
    out.push_str(&format!("Catalog size: {}\n", report.catalog_size));

    out
}

/// Prints the report to stdout
pub fn print_report(report: &CrawlReport) {
    print!("{}", format_report(report));
}
