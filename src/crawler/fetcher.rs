//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the HTTP client with a proper user agent string
//! - GET requests with redirect tracking
//! - The redirect sentinel: the site answers requests for missing book ids
//!   with a redirect to a generic page instead of a 404
//! - Error classification

use crate::config::UserAgentConfig;
use crate::{BookshelfError, Result};
use encoding_rs::{Encoding, UTF_8};
use reqwest::{
    header::{CONTENT_TYPE, LOCATION},
    redirect::Policy,
    Client, StatusCode,
};
use std::time::Duration;
use url::Url;

/// One redirect the server answered with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectHop {
    /// The 3xx status code
    pub status: u16,

    /// Target of the `Location` header, if the server sent one
    pub location: Option<String>,
}

/// A fully read HTTP response
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// The requested URL
    pub url: Url,

    /// Final HTTP status code
    pub status: StatusCode,

    /// Redirects answered before the final response, in order
    pub redirects: Vec<RedirectHop>,

    /// Charset declared in the `Content-Type` header
    pub charset: Option<String>,

    body: Vec<u8>,
}

impl HttpResponse {
    /// Creates a response from its parts
    pub fn new(url: Url, status: StatusCode, redirects: Vec<RedirectHop>, body: Vec<u8>) -> Self {
        Self {
            url,
            status,
            redirects,
            charset: None,
            body,
        }
    }

    /// Sets the charset the body is decoded with
    pub fn with_charset(mut self, charset: impl Into<String>) -> Self {
        self.charset = Some(charset.into());
        self
    }

    /// Response body decoded with the declared charset
    ///
    /// Falls back to UTF-8 when no charset was declared or the label is
    /// unknown. Invalid sequences are replaced.
    pub fn text(&self) -> String {
        let encoding = self
            .charset
            .as_deref()
            .and_then(|label| Encoding::for_label(label.as_bytes()))
            .unwrap_or(UTF_8);
        let (text, _, _) = encoding.decode(&self.body);
        text.into_owned()
    }

    /// Raw response body
    pub fn bytes(&self) -> &[u8] {
        &self.body
    }

    /// Fails with `BookshelfError::Http` if the final status is not 2xx
    pub fn error_for_status(self) -> Result<Self> {
        if self.status.is_success() {
            Ok(self)
        } else {
            Err(BookshelfError::Http {
                url: self.url.to_string(),
                status: self.status.as_u16(),
            })
        }
    }

    /// Applies the redirect sentinel, then the status check
    ///
    /// # Returns
    ///
    /// * `Ok(Self)` - The page exists and the body can be trusted
    /// * `Err(BookshelfError::NotFound)` - The server redirected the request away
    /// * `Err(BookshelfError::Http)` - Non-success status without a redirect
    pub fn ensure_found(self) -> Result<Self> {
        if is_redirected_away(&self) {
            return Err(BookshelfError::NotFound {
                url: self.url.to_string(),
            });
        }
        self.error_for_status()
    }
}

/// Returns true if the request was answered with one or more redirects
///
/// The site redirects requests for missing book ids to a generic page, so a
/// redirect means "this resource does not exist", whatever the final status.
/// Must be checked before the body is trusted.
pub fn is_redirected_away(response: &HttpResponse) -> bool {
    !response.redirects.is_empty()
}

/// Builds an HTTP client with proper configuration
///
/// Redirects are never followed: a 3xx answer is reported back as a
/// [`RedirectHop`] so the sentinel can see it.
///
/// # Arguments
///
/// * `config` - The user agent configuration
///
/// # Example
///
/// ```no_run
/// use bookshelf::config::UserAgentConfig;
/// use bookshelf::crawler::build_http_client;
///
/// let client = build_http_client(&UserAgentConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &UserAgentConfig) -> std::result::Result<Client, reqwest::Error> {
    // Format: CrawlerName/Version (+ContactURL; ContactEmail)
    let user_agent = format!(
        "{}/{} (+{}; {})",
        config.crawler_name, config.crawler_version, config.contact_url, config.contact_email
    );

    Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::none())
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a URL and reads the whole body
///
/// A redirect answer is not followed; it is recorded in
/// [`HttpResponse::redirects`] and returned like any other response.
///
/// # Errors
///
/// Returns `BookshelfError::Transport` for connection-level failures
/// (connection refused, DNS failure, timeout, truncated body). HTTP status
/// codes are never turned into errors here.
pub async fn fetch_url(client: &Client, url: &Url) -> Result<HttpResponse> {
    tracing::debug!("GET {}", url);

    let response = client
        .get(url.clone())
        .send()
        .await
        .map_err(|source| BookshelfError::Transport {
            url: url.to_string(),
            source,
        })?;

    let status = response.status();
    let mut redirects = Vec::new();

    if status.is_redirection() {
        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        tracing::debug!(
            "{} redirected with {} to {}",
            url,
            status.as_u16(),
            location.as_deref().unwrap_or("<no location>")
        );
        redirects.push(RedirectHop {
            status: status.as_u16(),
            location,
        });
    }

    let charset = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(charset_from_content_type);

    let body = response
        .bytes()
        .await
        .map_err(|source| BookshelfError::Transport {
            url: url.to_string(),
            source,
        })?;

    let response = HttpResponse::new(url.clone(), status, redirects, body.to_vec());
    Ok(match charset {
        Some(charset) => response.with_charset(charset),
        None => response,
    })
}

/// Reads the `charset` parameter of a `Content-Type` value
fn charset_from_content_type(content_type: &str) -> Option<String> {
    content_type.split(';').skip(1).find_map(|param| {
        let (name, value) = param.split_once('=')?;
        if !name.trim().eq_ignore_ascii_case("charset") {
            return None;
        }
        let value = value.trim().trim_matches('"');
        (!value.is_empty()).then(|| value.to_string())
    })
}
