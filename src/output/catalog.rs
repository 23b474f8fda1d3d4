//! JSON catalog persistence
//!
//! The catalog is a single JSON array of [`CatalogEntry`] objects. New
//! records are merged into whatever the file already holds and the whole
//! array is rewritten, so repeated runs always leave one valid document.

use crate::state::BookRecord;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Prefix of asset paths in the catalog: the rendered pages live one
/// directory below the catalog root
const ASSET_PREFIX: &str = "../";

/// One book as stored in the catalog file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Book title
    pub name: String,

    /// Book author
    pub author: String,

    /// Cover image path relative to the pages directory
    pub image: Option<String>,

    /// Book text path relative to the pages directory
    pub txt: Option<String>,

    /// Reader comments
    #[serde(default)]
    pub comment: Vec<String>,

    /// Genres
    #[serde(default)]
    pub genre: Vec<String>,
}

impl From<&BookRecord> for CatalogEntry {
    fn from(record: &BookRecord) -> Self {
        Self {
            name: record.title.clone(),
            author: record.author.clone(),
            image: record.cover_asset_path.as_deref().map(asset_reference),
            txt: record.text_asset_path.as_deref().map(asset_reference),
            comment: record.comments.clone(),
            genre: record.genres.clone(),
        }
    }
}

/// Formats a stored asset path the way the rendered pages reference it
pub fn asset_reference(path: &Path) -> String {
    let path = path.to_string_lossy().replace('\\', "/");
    format!("{}{}", ASSET_PREFIX, path.trim_start_matches("./"))
}

/// Reads the catalog at `path`
///
/// A missing or blank file is an empty catalog. Anything else must be a JSON
/// array of entries.
pub fn load_catalog(path: &Path) -> Result<Vec<CatalogEntry>> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    if content.trim().is_empty() {
        return Ok(Vec::new());
    }

    Ok(serde_json::from_str(&content)?)
}

/// Replaces the catalog at `path` with `entries`
///
/// The array is written to a sibling temp file first and renamed over the
/// catalog, so a failed write leaves the previous catalog intact.
pub fn write_catalog(path: &Path, entries: &[CatalogEntry]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(entries)?;
    let tmp_path = temp_path(path);
    fs::write(&tmp_path, json)?;
    fs::rename(&tmp_path, path)?;

    Ok(())
}

/// Appends `records` to the catalog at `path`
///
/// Existing entries are read, the new ones are added after them in the given
/// order, and the whole array is rewritten.
///
/// # Returns
///
/// The number of entries in the catalog after the merge.
pub fn append_to_catalog(path: &Path, records: &[BookRecord]) -> Result<usize> {
    let mut entries = load_catalog(path)?;
    let existing = entries.len();
    entries.extend(records.iter().map(CatalogEntry::from));

    write_catalog(path, &entries)?;
    tracing::info!(
        "Catalog {}: {} existing + {} new entries",
        path.display(),
        existing,
        records.len()
    );

    Ok(entries.len())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
