//! Book text and cover image downloads
//!
//! Both downloads write into a content directory that is created on demand,
//! overwrite any file already at the computed path and return the path the
//! asset was stored at.

use crate::crawler::fetcher::{fetch_url, is_redirected_away};
use crate::url::SiteUrls;
use crate::Result;
use reqwest::Client;
use std::path::{Path, PathBuf};

/// Characters that are illegal in a path segment on at least one common filesystem
const ILLEGAL_CHARS: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Device names Windows refuses as file names, with or without an extension
const RESERVED_NAMES: &[&str] = &[
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

/// Longest file name (in bytes) most filesystems accept
const MAX_FILENAME_BYTES: usize = 255;

/// Used when nothing survives sanitization
const FALLBACK_NAME: &str = "untitled";

/// Extension of saved book texts
const TEXT_EXTENSION: &str = ".txt";

/// Turns arbitrary text into a single safe path segment
///
/// Removes path separators, characters illegal on common filesystems and
/// control characters, collapses whitespace runs into single spaces, drops
/// trailing dots and spaces, suffixes Windows device names with `_`, and
/// truncates to 255 bytes on a character boundary.
///
/// # Example
///
/// ```
/// use bookshelf::crawler::sanitize_filename;
///
/// assert_eq!(sanitize_filename("AC/DC: Live?"), "ACDC Live");
/// ```
pub fn sanitize_filename(name: &str) -> String {
    sanitize_filename_within(name, MAX_FILENAME_BYTES)
}

/// Like [`sanitize_filename`], but truncates to `max_bytes`
///
/// Used when a suffix is appended afterwards: the whole name must still fit
/// in 255 bytes.
pub fn sanitize_filename_within(name: &str, max_bytes: usize) -> String {
    let max_bytes = max_bytes.clamp(1, MAX_FILENAME_BYTES);
    let cleaned: String = name
        .chars()
        .filter(|c| !c.is_control() && !ILLEGAL_CHARS.contains(c))
        .collect();

    let mut out = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    trim_trailing_dots(&mut out);

    let stem = out.split('.').next().unwrap_or_default();
    if RESERVED_NAMES
        .iter()
        .any(|reserved| stem.eq_ignore_ascii_case(reserved))
    {
        out.push('_');
    }

    if out.len() > max_bytes {
        let mut end = max_bytes;
        while !out.is_char_boundary(end) {
            end -= 1;
        }
        out.truncate(end);
        trim_trailing_dots(&mut out);
    }

    if out.is_empty() {
        FALLBACK_NAME.to_string()
    } else {
        out
    }
}

fn trim_trailing_dots(name: &mut String) {
    let len = name.trim_end_matches(['.', ' ']).len();
    name.truncate(len);
}

/// Downloads the plain-text export of a book
///
/// Writes the body to `{directory}/{sanitized title}.txt`, decoded with the
/// charset the server declared.
///
/// # Returns
///
/// * `Ok(Some(path))` - Text saved at `path`
/// * `Ok(None)` - The site redirected the request away: no text exists for this
///   book. Nothing is written.
/// * `Err(BookshelfError::Http)` - Non-success status without a redirect
/// * `Err(BookshelfError::Transport)` - Connection-level failure
pub async fn download_text(
    client: &Client,
    site: &SiteUrls,
    title: &str,
    book_id: u64,
    directory: &Path,
) -> Result<Option<PathBuf>> {
    let url = site.text_export(book_id)?;
    let response = fetch_url(client, &url).await?;

    if is_redirected_away(&response) {
        tracing::debug!("No text available for book {}", book_id);
        return Ok(None);
    }
    let response = response.error_for_status()?;

    tokio::fs::create_dir_all(directory).await?;
    let stem = sanitize_filename_within(title, MAX_FILENAME_BYTES - TEXT_EXTENSION.len());
    let path = directory.join(format!("{}{}", stem, TEXT_EXTENSION));
    tokio::fs::write(&path, response.text()).await?;

    tracing::debug!("Saved text of book {} to {}", book_id, path.display());
    Ok(Some(path))
}

/// Downloads the cover image of a book
///
/// `cover_ref` is the site-relative `src` from the detail page. The bytes are
/// written unchanged to `{directory}/{book_id}. Cover for {title}` (sanitized).
/// No redirect sentinel applies here: any non-success answer is an error.
pub async fn download_image(
    client: &Client,
    site: &SiteUrls,
    book_id: u64,
    title: &str,
    cover_ref: &str,
    directory: &Path,
) -> Result<PathBuf> {
    let url = site.resolve(cover_ref)?;
    let response = fetch_url(client, &url).await?.error_for_status()?;

    tokio::fs::create_dir_all(directory).await?;
    let filename = sanitize_filename(&format!("{}. Cover for {}", book_id, title));
    let path = directory.join(filename);
    tokio::fs::write(&path, response.bytes()).await?;

    tracing::debug!("Saved cover of book {} to {}", book_id, path.display());
    Ok(path)
}
