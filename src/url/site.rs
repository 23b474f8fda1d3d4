//! Endpoint construction for the catalog site

use crate::config::SiteConfig;
use crate::{UrlError, UrlResult};
use url::Url;

/// Builds every remote URL the crawler requests from one site origin
#[derive(Debug, Clone)]
pub struct SiteUrls {
    origin: Url,
    category_path: String,
    text_endpoint: String,
}

impl SiteUrls {
    /// Creates the URL builder from the site configuration
    ///
    /// # Errors
    ///
    /// Returns `UrlError` if the base URL does not parse or is not http(s).
    pub fn new(site: &SiteConfig) -> UrlResult<Self> {
        let origin =
            Url::parse(&site.base_url).map_err(|e| UrlError::Parse(format!("{}: {}", site.base_url, e)))?;

        match origin.scheme() {
            "http" | "https" => {}
            other => return Err(UrlError::InvalidScheme(other.to_string())),
        }

        // Category paths are used as directories: page numbers go below them
        let mut category_path = site.category_path.clone();
        if !category_path.ends_with('/') {
            category_path.push('/');
        }

        Ok(Self {
            origin,
            category_path,
            text_endpoint: site.text_endpoint.clone(),
        })
    }

    /// URL of a numbered listing page, e.g. `https://tululu.org/l55/3/`
    pub fn listing_page(&self, page: u32) -> UrlResult<Url> {
        self.resolve(&format!("{}{}/", self.category_path, page))
    }

    /// URL of the plain-text export for a book, e.g. `https://tululu.org/txt.php?id=239`
    pub fn text_export(&self, book_id: u64) -> UrlResult<Url> {
        let mut url = self.resolve(&self.text_endpoint)?;
        url.query_pairs_mut()
            .append_pair("id", &book_id.to_string());
        Ok(url)
    }

    /// Resolves a site-relative reference (link `href`, image `src`) to an
    /// absolute URL
    pub fn resolve(&self, reference: &str) -> UrlResult<Url> {
        let reference = reference.trim();
        if reference.is_empty() {
            return Err(UrlError::Malformed("empty reference".to_string()));
        }

        self.origin
            .join(reference)
            .map_err(|e| UrlError::Parse(format!("{}: {}", reference, e)))
    }
}
