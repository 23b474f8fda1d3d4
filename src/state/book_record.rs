use std::path::PathBuf;

/// One book of the catalog, built from a successfully parsed detail page
///
/// The id is fixed at creation. The two asset paths are filled in by the
/// optional download steps and stay `None` when a download was disabled or
/// the site had no text for the book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookRecord {
    /// The site's numeric book identifier
    pub id: u64,

    /// Book title, without the author part of the heading
    pub title: String,

    /// Book author
    pub author: String,

    /// Genres in document order
    pub genres: Vec<String>,

    /// Reader comments in document order
    pub comments: Vec<String>,

    /// Where the book text was saved
    pub text_asset_path: Option<PathBuf>,

    /// Where the cover image was saved
    pub cover_asset_path: Option<PathBuf>,
}

impl BookRecord {
    /// Creates a record with no downloaded assets yet
    pub fn new(
        id: u64,
        title: impl Into<String>,
        author: impl Into<String>,
        genres: Vec<String>,
        comments: Vec<String>,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            author: author.into(),
            genres,
            comments,
            text_asset_path: None,
            cover_asset_path: None,
        }
    }
}
