//! Bookshelf: a book-catalog crawler
//!
//! This crate crawls the paginated category listings of a book-catalog site,
//! extracts per-book metadata, downloads book texts and cover images, and
//! keeps the results in a JSON catalog that can be rendered into a static,
//! paginated HTML site.

pub mod config;
pub mod crawler;
pub mod output;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for Bookshelf operations
#[derive(Debug, Error)]
pub enum BookshelfError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Resource not found (redirected away): {url}")]
    NotFound { url: String },

    #[error("HTTP {status} for {url}")]
    Http { url: String, status: u16 },

    #[error("Transport error for {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Malformed page at {url}: {message}")]
    MalformedPage { url: String, message: String },

    #[error("Not a book detail URL: {url}")]
    InvalidBookUrl { url: String },

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Catalog error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid CSS selector: {0}")]
    Selector(String),

    #[error("Template error: {0}")]
    Template(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Malformed URL: {0}")]
    Malformed(String),
}

/// Result type alias for Bookshelf operations
pub type Result<T> = std::result::Result<T, BookshelfError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use state::{BookRecord, BookState};
pub use url::{book_id_from_url, CrawlRange, SiteUrls};
