//! On-disk storage for generated item artwork.
//!
//! Files are named `{item name with non-alphanumerics replaced by _}_{unix
//! millis}.png` and the bare filename is what gets recorded on the item's
//! `imageUrl`. Reads only accept plain filenames inside the artwork
//! directory.

use std::io;
use std::path::PathBuf;
use std::sync::LazyLock;

use regex::Regex;

static NON_ALPHANUMERIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-zA-Z0-9]").expect("valid sanitiser regex"));

static SAFE_FILENAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_][A-Za-z0-9_.-]*$").expect("valid filename regex")
});

/// Cache lifetime for artwork that was already stored.
pub const CACHED_MAX_AGE: &str = "public, max-age=86400";
/// Cache lifetime for freshly generated artwork.
pub const FRESH_MAX_AGE: &str = "public, max-age=3600";

/// Build the storage filename for an item's artwork.
pub fn artwork_filename(item_name: &str, unix_millis: i64) -> String {
    let stem = NON_ALPHANUMERIC.replace_all(item_name, "_");
    format!("{stem}_{unix_millis}.png")
}

/// Whether `name` is a plain filename with no path components.
pub fn is_safe_filename(name: &str) -> bool {
    SAFE_FILENAME.is_match(name) && !name.contains("..")
}

/// MIME type of recognised image data, sniffed from its header bytes.
pub fn detect_content_type(bytes: &[u8]) -> Option<&'static str> {
    image::guess_format(bytes).ok().map(|format| format.to_mime_type())
}

/// Filesystem-backed artwork directory.
#[derive(Debug, Clone)]
pub struct ArtworkStore {
    dir: PathBuf,
}

impl ArtworkStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Write artwork for `item_name`, returning the stored filename.
    pub async fn save(&self, item_name: &str, bytes: &[u8]) -> io::Result<String> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let filename = artwork_filename(item_name, chrono::Utc::now().timestamp_millis());
        tokio::fs::write(self.dir.join(&filename), bytes).await?;
        tracing::info!(%filename, size = bytes.len(), "Stored artwork");
        Ok(filename)
    }

    /// Read stored artwork. Unsafe names and missing files yield `None`.
    pub async fn read(&self, filename: &str) -> io::Result<Option<Vec<u8>>> {
        if !is_safe_filename(filename) {
            tracing::warn!(filename, "Rejected artwork filename");
            return Ok(None);
        }
        match tokio::fs::read(self.dir.join(filename)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }
}
