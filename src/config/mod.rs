//! Configuration module for Bookshelf
//!
//! This module handles loading, parsing, and validating the optional TOML
//! configuration file. Command-line flags are applied on top of it in `main`.
//!
//! # Example
//!
//! ```no_run
//! use bookshelf::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("bookshelf.toml")).unwrap();
//! println!("Catalog goes to: {}", config.output.json_path);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, OutputConfig, SiteConfig, UserAgentConfig};

// Re-export parser functions
pub use parser::{load_config, load_or_default, parse_config};
pub use validation::validate;
