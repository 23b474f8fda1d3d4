//! Output module for the catalog, the rendered site and run reports
//!
//! This module handles:
//! - Reading and rewriting the JSON catalog
//! - Rendering the catalog into paginated HTML pages
//! - Recording crawl statistics

pub mod catalog;
pub mod site;
pub mod stats;

pub use catalog::{append_to_catalog, load_catalog, write_catalog, CatalogEntry};
pub use site::{render_site, SiteRenderer};
pub use stats::{format_report, print_report, CrawlReport};
