use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Genres fetched on a full refresh, matching the catalog's subject slugs.
pub const DEFAULT_GENRES: [&str; 8] = [
    "fiction",
    "mystery",
    "science fiction",
    "fantasy",
    "romance",
    "horror",
    "history",
    "biography",
];

/// Caller-tunable settings for fetching and caching.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Path of the cache artifact.
    pub data_file: PathBuf,

    /// Cache validity window in whole days; an artifact aged exactly this
    /// many days is already stale.
    pub cache_expiry_days: u64,

    /// Base URL of the catalog API.
    pub catalog_base: String,

    /// Base URL of the cover image service.
    pub image_base: String,

    /// Genres fetched on a full refresh; lowercase.
    pub genres: Vec<String>,

    /// Per-request HTTP timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            data_file: PathBuf::from("books_data.json"),
            cache_expiry_days: 7,
            catalog_base: "https://openlibrary.org".to_string(),
            image_base: "https://covers.openlibrary.org".to_string(),
            genres: DEFAULT_GENRES.iter().map(|g| g.to_string()).collect(),
            timeout_secs: 10,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// A missing file yields the defaults; a present but malformed file is
    /// an error. Fields absent from the file keep their default values.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        Ok(config)
    }

    /// Default config file path (`~/.config/bookrec/config.toml`).
    pub fn default_path() -> Option<PathBuf> {
        std::env::var_os("HOME").map(|home| {
            PathBuf::from(home)
                .join(".config")
                .join("bookrec")
                .join("config.toml")
        })
    }
}
