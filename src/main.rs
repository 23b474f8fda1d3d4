//! Bookshelf main entry point
//!
//! This is the command-line interface for the Bookshelf catalog crawler.

use anyhow::Context;
use bookshelf::config::{load_or_default, validate, Config};
use bookshelf::crawler::crawl;
use bookshelf::output::{print_report, render_site};
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Bookshelf: a book-catalog crawler
///
/// Bookshelf walks the listing pages of a tululu.org category, downloads the
/// text and cover of every book, and keeps their metadata in a JSON catalog
/// that can be rendered into a static, paginated site.
#[derive(Parser, Debug)]
#[command(name = "bookshelf")]
#[command(version)]
#[command(about = "A book-catalog crawler", long_about = None)]
struct Cli {
    /// Path to an optional TOML configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// First listing page to crawl
    #[arg(long)]
    start_page: Option<u32>,

    /// Listing page to stop at (not crawled); probed from the site if omitted
    #[arg(long)]
    end_page: Option<u32>,

    /// Do not download cover images
    #[arg(long)]
    skip_images: bool,

    /// Do not download book texts
    #[arg(long)]
    skip_txt: bool,

    /// Path to the JSON catalog
    #[arg(long, value_name = "FILE")]
    json_path: Option<String>,

    /// Directory for book texts
    #[arg(long, value_name = "DIR")]
    books_folder: Option<String>,

    /// Directory for cover images
    #[arg(long, value_name = "DIR")]
    images_folder: Option<String>,

    /// Directory for rendered pages
    #[arg(long, value_name = "DIR")]
    pages_folder: Option<String>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without any request
    #[arg(long, conflicts_with_all = ["render", "render_only"])]
    dry_run: bool,

    /// Render the site from the catalog after crawling
    #[arg(long, conflicts_with_all = ["dry_run", "render_only"])]
    render: bool,

    /// Render the site from the existing catalog and exit
    #[arg(long, conflicts_with_all = ["dry_run", "render"])]
    render_only: bool,
}

impl Cli {
    /// Applies command-line values on top of the loaded configuration
    fn apply_overrides(&self, config: &mut Config) {
        if let Some(start_page) = self.start_page {
            config.crawler.start_page = start_page;
        }
        if self.end_page.is_some() {
            config.crawler.end_page = self.end_page;
        }
        if self.skip_images {
            config.crawler.skip_images = true;
        }
        if self.skip_txt {
            config.crawler.skip_text = true;
        }
        if let Some(json_path) = &self.json_path {
            config.output.json_path = json_path.clone();
        }
        if let Some(books_folder) = &self.books_folder {
            config.output.books_folder = books_folder.clone();
        }
        if let Some(images_folder) = &self.images_folder {
            config.output.images_folder = images_folder.clone();
        }
        if let Some(pages_folder) = &self.pages_folder {
            config.output.pages_folder = pages_folder.clone();
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = match load_configuration(&cli) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {:#}", e);
            return Err(e);
        }
    };

    // Handle different modes
    if cli.dry_run {
        handle_dry_run(&config);
    } else if cli.render_only {
        handle_render(&config)?;
    } else {
        handle_crawl(config.clone()).await?;
        if cli.render {
            handle_render(&config)?;
        }
    }

    Ok(())
}

/// Loads the configuration file (if any), applies CLI overrides and
/// validates the result
fn load_configuration(cli: &Cli) -> anyhow::Result<Config> {
    match &cli.config {
        Some(path) => tracing::info!("Loading configuration from: {}", path.display()),
        None => tracing::debug!("No configuration file given, using defaults"),
    }

    let mut config = load_or_default(cli.config.as_deref()).with_context(|| match &cli.config {
        Some(path) => format!("invalid configuration file {}", path.display()),
        None => "invalid default configuration".to_string(),
    })?;

    cli.apply_overrides(&mut config);
    validate(&config).context("invalid command-line options")?;
    Ok(config)
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("bookshelf=info,warn"),
            1 => EnvFilter::new("bookshelf=debug,info"),
            2 => EnvFilter::new("bookshelf=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: shows the effective configuration
fn handle_dry_run(config: &Config) {
    println!("=== Bookshelf Dry Run ===\n");

    println!("Site:");
    println!("  Base URL: {}", config.site.base_url);
    println!("  Category: {}", config.site.category_path);
    println!("  Text endpoint: {}", config.site.text_endpoint);

    println!("\nCrawl:");
    match config.crawler.end_page {
        Some(end_page) => println!("  Listing pages: [{}, {})", config.crawler.start_page, end_page),
        None => println!(
            "  Listing pages: {} to the last page (probed at crawl time)",
            config.crawler.start_page
        ),
    }
    println!("  Download texts: {}", !config.crawler.skip_text);
    println!("  Download covers: {}", !config.crawler.skip_images);

    println!("\nUser Agent:");
    println!("  Name: {}", config.user_agent.crawler_name);
    println!("  Version: {}", config.user_agent.crawler_version);
    println!("  Contact URL: {}", config.user_agent.contact_url);
    println!("  Contact Email: {}", config.user_agent.contact_email);

    println!("\nOutput:");
    println!("  Catalog: {}", config.output.json_path);
    println!("  Texts: {}", config.output.books_folder);
    println!("  Covers: {}", config.output.images_folder);
    println!("  Pages: {}", config.output.pages_folder);
    println!(
        "  Layout: {} books per row, {} rows per page",
        config.output.books_per_row, config.output.rows_per_page
    );

    println!("\n✓ Configuration is valid");
}

/// Handles --render and --render-only: writes the site pages
fn handle_render(config: &Config) -> anyhow::Result<()> {
    let catalog_path = Path::new(&config.output.json_path);
    tracing::info!("Rendering site from {}", catalog_path.display());

    let pages = render_site(catalog_path, &config.output)
        .with_context(|| format!("failed to render {}", catalog_path.display()))?;

    println!("✓ Rendered {} pages into {}", pages.len(), config.output.pages_folder);
    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config) -> anyhow::Result<()> {
    tracing::info!(
        "Crawling {}{} into {}",
        config.site.base_url,
        config.site.category_path,
        config.output.json_path
    );

    match crawl(config).await {
        Ok(report) => {
            tracing::info!("Crawl completed successfully");
            print_report(&report);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
