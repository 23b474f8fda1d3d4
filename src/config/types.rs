use serde::Deserialize;

/// Main configuration structure for Bookshelf
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Target site layout
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Site origin every relative link is resolved against
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Path of the category listing; page numbers are appended to it
    #[serde(rename = "category-path")]
    pub category_path: String,

    /// Path of the plain-text export endpoint (takes `?id=<book id>`)
    #[serde(rename = "text-endpoint")]
    pub text_endpoint: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: "https://tululu.org".to_string(),
            category_path: "/l55/".to_string(),
            text_endpoint: "/txt.php".to_string(),
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "bookshelf".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: "https://github.com/bookshelf".to_string(),
            contact_email: "bookshelf@example.com".to_string(),
        }
    }
}

/// Crawl range and asset toggles
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// First listing page to crawl
    #[serde(rename = "start-page")]
    pub start_page: u32,

    /// Listing page to stop at (exclusive). When unset the last page of the
    /// category is probed and included.
    #[serde(rename = "end-page")]
    pub end_page: Option<u32>,

    /// Do not download book texts
    #[serde(rename = "skip-text")]
    pub skip_text: bool,

    /// Do not download cover images
    #[serde(rename = "skip-images")]
    pub skip_images: bool,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            start_page: 1,
            end_page: None,
            skip_text: false,
            skip_images: false,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Path to the JSON catalog
    #[serde(rename = "json-path")]
    pub json_path: String,

    /// Directory for downloaded book texts
    #[serde(rename = "books-folder")]
    pub books_folder: String,

    /// Directory for downloaded cover images
    #[serde(rename = "images-folder")]
    pub images_folder: String,

    /// Directory for the rendered HTML pages
    #[serde(rename = "pages-folder")]
    pub pages_folder: String,

    /// Books shown side by side in one row of a page
    #[serde(rename = "books-per-row")]
    pub books_per_row: usize,

    /// Rows shown on one page
    #[serde(rename = "rows-per-page")]
    pub rows_per_page: usize,

    /// Custom page template; the built-in one is used when unset
    #[serde(rename = "template-path")]
    pub template_path: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            json_path: "books.json".to_string(),
            books_folder: "books/".to_string(),
            images_folder: "images/".to_string(),
            pages_folder: "pages/".to_string(),
            books_per_row: 2,
            rows_per_page: 10,
            template_path: None,
        }
    }
}
