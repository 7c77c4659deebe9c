//! Record types for the book dataset.
//!
//! [`RawBook`] is what the fetcher produces from one catalog `works[]` entry:
//! shaped but unchecked, with no defaults applied. [`BookRecord`] is one
//! normalized row of the in-memory table and round-trips through the cache
//! artifact. [`BookView`] is the flat display mapping handed across the
//! presentation boundary.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Fallback title applied during normalization.
pub const UNKNOWN_TITLE: &str = "Unknown Title";
/// Fallback author applied during normalization.
pub const UNKNOWN_AUTHOR: &str = "Unknown Author";

/// An unnormalized catalog entry.
///
/// `year` keeps the raw JSON value so the normalizer can coerce numbers and
/// numeric strings alike; anything unparseable later becomes absent.
#[derive(Debug, Clone, Default)]
pub struct RawBook {
    pub title: Option<String>,
    /// Comma-joined contributor names, when any were listed.
    pub author: Option<String>,
    /// The subject tag this entry was fetched under.
    pub genre: String,
    pub year: Option<Value>,
    /// Externally supplied rating average in [1,5].
    pub popularity: Option<f64>,
    /// Externally supplied rank; lower is better.
    pub ranking: Option<i64>,
    pub heat_index: Option<u8>,
    pub cover_id: Option<i64>,
    pub key: Option<String>,
}

/// One normalized row of the dataset.
///
/// Absent values stay absent in storage; filtering treats them as failing
/// any bound comparison, and only [`BookView`] substitutes display fallbacks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookRecord {
    pub title: String,
    pub author: String,
    /// Lowercase genre tag, one of the configured set.
    pub genre: String,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub popularity: Option<f64>,
    #[serde(default)]
    pub ranking: Option<i64>,
    #[serde(default)]
    pub heat_index: Option<u8>,
    #[serde(default)]
    pub cover_id: Option<i64>,
    #[serde(default)]
    pub key: Option<String>,
    /// Derived desirability score; `Some` for every record the normalizer
    /// produced, possibly `None` on a table loaded from a foreign cache.
    #[serde(default)]
    pub composite_score: Option<f64>,
}

impl BookRecord {
    /// Medium-size cover URL, when a cover id is known.
    pub fn cover_url(&self, image_base: &str) -> Option<String> {
        self.cover_id
            .map(|id| format!("{}/b/id/{}-M.jpg", image_base, id))
    }

    /// Catalog detail URL, when the work key is known.
    pub fn catalog_url(&self, catalog_base: &str) -> Option<String> {
        self.key
            .as_ref()
            .map(|key| format!("{}{}", catalog_base, key))
    }
}

/// Flat display mapping handed across the presentation boundary.
///
/// Human-friendly fallback strings are substituted here and only here; the
/// stored table keeps absent values absent.
#[derive(Debug, Clone, PartialEq)]
pub struct BookView {
    pub title: String,
    pub author: String,
    pub genre: String,
    pub year: String,
    pub popularity: String,
    pub ranking: String,
    pub heat_index: String,
    pub cover_url: Option<String>,
    pub open_library_url: Option<String>,
}

impl BookView {
    /// Build the display mapping for one record.
    pub fn from_record(book: &BookRecord, catalog_base: &str, image_base: &str) -> Self {
        BookView {
            title: book.title.clone(),
            author: book.author.clone(),
            genre: book.genre.clone(),
            year: book
                .year
                .map_or_else(|| "Unknown Year".to_string(), |y| y.to_string()),
            popularity: book
                .popularity
                .map_or_else(|| "Not rated".to_string(), |p| format!("{:.1}", p)),
            ranking: book
                .ranking
                .map_or_else(|| "Not ranked".to_string(), |r| r.to_string()),
            heat_index: book
                .heat_index
                .map_or_else(|| "Unknown".to_string(), |h| h.to_string()),
            cover_url: book.cover_url(image_base),
            open_library_url: book.catalog_url(catalog_base),
        }
    }
}
