use url::Url;

/// Extracts the numeric book id from a detail-page URL
///
/// Detail pages live at `/b<id>/` (e.g. `https://tululu.org/b239/`). The id
/// is read from the last non-empty path segment only, so digits in the host,
/// query string or earlier segments never leak into it.
///
/// # Returns
///
/// * `Some(id)` - The path follows the `b<digits>` convention and the id is positive
/// * `None` - Anything else
///
/// # Example
///
/// ```
/// use bookshelf::url::book_id_from_url;
/// use url::Url;
///
/// let url = Url::parse("https://tululu.org/b239/").unwrap();
/// assert_eq!(book_id_from_url(&url), Some(239));
/// ```
pub fn book_id_from_url(url: &Url) -> Option<u64> {
    let segment = url
        .path_segments()?
        .filter(|segment| !segment.is_empty())
        .last()?;

    let digits = segment.strip_prefix('b')?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    digits.parse::<u64>().ok().filter(|id| *id > 0)
}
