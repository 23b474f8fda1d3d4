//! Static site rendering
//!
//! Splits the catalog into rows of books and rows into pages, then renders
//! every page through an [upon] template as `index{n}.html`. The built-in
//! template can be replaced through `output.template-path`.
//!
//! # Template Variables
//!
//! | Variable        | Type                 | Description                          |
//! |-----------------|----------------------|--------------------------------------|
//! | `rows`          | list of lists        | Books of this page, row by row       |
//! | `pages`         | list                 | `{ name, number, current }` per page |
//! | `page_number`   | `usize`              | Number of this page, from 1          |
//! | `number_pages`  | `usize`              | Total number of pages                |
//! | `has_prev`      | `bool`               | Whether a previous page exists       |
//! | `prev`          | `String`             | File name of the previous page       |
//! | `has_next`      | `bool`               | Whether a next page exists           |
//! | `next`          | `String`             | File name of the next page           |
//!
//! Every book carries `name`, `author`, `image`, `txt`, `has_image`,
//! `has_txt`, `genre` (list), `genres` (joined) and `comment` (list).
//! `image` and `txt` are percent-encoded link targets. The `html` formatter
//! escapes a value for HTML output.

use crate::config::OutputConfig;
use crate::output::catalog::{load_catalog, CatalogEntry};
use crate::{BookshelfError, Result};
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use upon::{Engine, Template};

/// Template used when no custom one is configured
pub const DEFAULT_TEMPLATE: &str = include_str!("../../templates/index.html");

/// Bytes that cannot appear literally in a URL path segment
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// Turns a catalog asset path into a relative link target
///
/// Every `/`-separated segment is percent-encoded on its own, so titles with
/// `#`, `?` or `%` still point at the stored file.
pub fn asset_href(reference: &str) -> String {
    reference
        .split('/')
        .map(|segment| utf8_percent_encode(segment, PATH_SEGMENT).to_string())
        .collect::<Vec<_>>()
        .join("/")
}

#[derive(Debug, Serialize)]
struct BookView<'a> {
    name: &'a str,
    author: &'a str,
    image: String,
    txt: String,
    has_image: bool,
    has_txt: bool,
    genre: &'a [String],
    genres: String,
    comment: &'a [String],
}

impl<'a> From<&'a CatalogEntry> for BookView<'a> {
    fn from(entry: &'a CatalogEntry) -> Self {
        Self {
            name: &entry.name,
            author: &entry.author,
            image: entry.image.as_deref().map(asset_href).unwrap_or_default(),
            txt: entry.txt.as_deref().map(asset_href).unwrap_or_default(),
            has_image: entry.image.is_some(),
            has_txt: entry.txt.is_some(),
            genre: &entry.genre,
            genres: entry.genre.join(", "),
            comment: &entry.comment,
        }
    }
}

#[derive(Debug, Serialize)]
struct PageLink {
    name: String,
    number: usize,
    current: bool,
}

#[derive(Debug, Serialize)]
struct PageContext<'a> {
    rows: Vec<Vec<BookView<'a>>>,
    pages: Vec<PageLink>,
    page_number: usize,
    number_pages: usize,
    has_prev: bool,
    prev: String,
    has_next: bool,
    next: String,
}

/// File name of the `number`-th page (from 1)
pub fn page_file_name(number: usize) -> String {
    format!("index{}.html", number)
}

/// Splits entries into pages of rows
///
/// Every row holds up to `books_per_row` entries and every page up to
/// `rows_per_page` rows; only the last row and page can be shorter.
pub fn paginate<T>(items: &[T], books_per_row: usize, rows_per_page: usize) -> Vec<Vec<&[T]>> {
    let rows: Vec<&[T]> = items.chunks(books_per_row.max(1)).collect();
    rows.chunks(rows_per_page.max(1))
        .map(<[&[T]]>::to_vec)
        .collect()
}

/// Renders catalog pages with a compiled template
pub struct SiteRenderer {
    engine: Engine<'static>,
    template: Template<'static>,
}

impl SiteRenderer {
    /// Compiles `source` into a renderer
    ///
    /// # Errors
    ///
    /// Returns `BookshelfError::Template` if the template syntax is invalid.
    pub fn new(source: impl Into<String>) -> Result<Self> {
        let mut engine = Engine::new();
        addons::configure(&mut engine);
        let template = engine
            .compile(source.into())
            .map_err(|e| BookshelfError::Template(e.to_string()))?;
        Ok(Self { engine, template })
    }

    /// Loads the template at `path`, or the built-in one when `None`
    pub fn from_path(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::new(fs::read_to_string(path)?),
            None => Self::new(DEFAULT_TEMPLATE),
        }
    }

    /// Renders every page of `entries` into memory
    ///
    /// # Returns
    ///
    /// `(file name, html)` pairs in page order. An empty catalog has no pages.
    pub fn render_pages(
        &self,
        entries: &[CatalogEntry],
        books_per_row: usize,
        rows_per_page: usize,
    ) -> Result<Vec<(String, String)>> {
        let pages = paginate(entries, books_per_row, rows_per_page);
        let number_pages = pages.len();
        let mut rendered = Vec::with_capacity(number_pages);

        for (index, rows) in pages.iter().enumerate() {
            let page_number = index + 1;
            let context = PageContext {
                rows: rows
                    .iter()
                    .map(|row| row.iter().map(BookView::from).collect())
                    .collect(),
                pages: (1..=number_pages)
                    .map(|number| PageLink {
                        name: page_file_name(number),
                        number,
                        current: number == page_number,
                    })
                    .collect(),
                page_number,
                number_pages,
                has_prev: page_number > 1,
                prev: if page_number > 1 {
                    page_file_name(page_number - 1)
                } else {
                    String::new()
                },
                has_next: page_number < number_pages,
                next: if page_number < number_pages {
                    page_file_name(page_number + 1)
                } else {
                    String::new()
                },
            };

            let html = self
                .template
                .render(&self.engine, &context)
                .to_string()
                .map_err(|e| BookshelfError::Template(e.to_string()))?;
            rendered.push((page_file_name(page_number), html));
        }

        Ok(rendered)
    }
}

/// Renders the catalog at `catalog_path` into `output.pages_folder`
///
/// # Returns
///
/// The paths of the written pages, in page order.
pub fn render_site(catalog_path: &Path, output: &OutputConfig) -> Result<Vec<PathBuf>> {
    let entries = load_catalog(catalog_path)?;
    if entries.is_empty() {
        tracing::warn!("Catalog {} is empty, no pages rendered", catalog_path.display());
        return Ok(Vec::new());
    }

    let renderer = SiteRenderer::from_path(output.template_path.as_deref().map(Path::new))?;
    let pages = renderer.render_pages(&entries, output.books_per_row, output.rows_per_page)?;

    let directory = Path::new(&output.pages_folder);
    fs::create_dir_all(directory)?;

    let mut written = Vec::with_capacity(pages.len());
    for (name, html) in pages {
        let path = directory.join(name);
        fs::write(&path, html)?;
        written.push(path);
    }

    tracing::info!(
        "Rendered {} books into {} pages in {}",
        entries.len(),
        written.len(),
        directory.display()
    );
    Ok(written)
}

/// Custom [`upon`] formatters for HTML output.
mod addons {
    use std::fmt::Write;
    use upon::{fmt as upon_fmt, Engine, Value};

    /// Escapes the characters that are significant in HTML text and attributes
    pub(crate) fn escape_html(s: &str) -> String {
        let mut out = String::with_capacity(s.len());
        for c in s.chars() {
            match c {
                '&' => out.push_str("&amp;"),
                '<' => out.push_str("&lt;"),
                '>' => out.push_str("&gt;"),
                '"' => out.push_str("&quot;"),
                '\'' => out.push_str("&#x27;"),
                c => out.push(c),
            }
        }
        out
    }

    fn html_formatter(f: &mut upon_fmt::Formatter<'_>, value: &Value) -> upon_fmt::Result {
        match value {
            Value::String(s) => write!(f, "{}", escape_html(s))?,
            v => upon_fmt::default(f, v)?,
        };
        Ok(())
    }

    /// Registers the `html` formatter on the given engine.
    pub(crate) fn configure(engine: &mut Engine<'_>) {
        engine.add_formatter("html", html_formatter);
    }
}
