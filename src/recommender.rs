//! Recommendation façade owning the dataset.
//!
//! Construction runs the fetch-or-load lifecycle: a valid cache artifact is
//! loaded, anything else falls back to a fresh fetch whose per-genre failures
//! are absorbed. Either way the façade comes up holding *some* table
//! (possibly empty) and every query method answers from it.

use log::{error, info, warn};

use crate::book::{BookRecord, BookView};
use crate::cache::BookCache;
use crate::config::Config;
use crate::error::Result;
use crate::normalize;
use crate::openlibrary::CatalogClient;
use crate::query::{self, BookFilter};

pub struct BookRecommender {
    config: Config,
    client: CatalogClient,
    cache: BookCache,
    books: Vec<BookRecord>,
}

impl BookRecommender {
    /// Build against the default configuration (cache in the working
    /// directory, the standard genre set, 7-day expiry).
    pub fn with_defaults() -> Self {
        Self::new(Config::default())
    }

    pub fn new(config: Config) -> Self {
        let client = CatalogClient::new(
            &config.catalog_base,
            &config.image_base,
            config.timeout_secs,
        );
        let cache = BookCache::new(&config.data_file, config.cache_expiry_days);

        let books = if cache.is_valid() {
            match cache.load() {
                Ok(records) => {
                    info!(
                        "loaded {} books from cache {}",
                        records.len(),
                        cache.path().display()
                    );
                    records
                }
                Err(e) => {
                    warn!("cache unusable ({}), fetching fresh data", e);
                    fetch_table(&client, &cache, &config.genres)
                }
            }
        } else {
            fetch_table(&client, &cache, &config.genres)
        };

        Self {
            config,
            client,
            cache,
            books,
        }
    }

    /// Rebuild the table from the network regardless of cache age. The table
    /// is replaced wholesale; callers never observe a partial dataset.
    pub fn refresh(&mut self) {
        self.books = fetch_table(&self.client, &self.cache, &self.config.genres);
    }

    /// Distinct genres present in the current table, sorted ascending.
    pub fn available_genres(&self) -> Vec<String> {
        query::available_genres(&self.books)
    }

    /// Filtered listing, sorted by composite score descending. The result is
    /// an owned snapshot; mutating it cannot touch the master table.
    pub fn filter_books(&self, filter: &BookFilter) -> Vec<BookRecord> {
        query::filter_books(&self.books, filter)
    }

    /// One uniformly sampled record as a presentation view, optionally
    /// restricted to a genre. `None` when no record qualifies.
    pub fn get_random_book(&self, genre: Option<&str>) -> Option<BookView> {
        query::random_pick(&self.books, genre).map(|record| {
            BookView::from_record(record, &self.config.catalog_base, &self.config.image_base)
        })
    }

    /// Download the medium-size cover image for a cover id, for callers that
    /// render covers without doing their own HTTP.
    pub fn fetch_cover(&self, cover_id: i64) -> Result<Vec<u8>> {
        self.client.fetch_cover(cover_id)
    }

    /// Read-only view of the full table.
    pub fn books(&self) -> &[BookRecord] {
        &self.books
    }
}

/// Fetch every configured genre, normalize, and persist best-effort. A save
/// failure is logged; the fresh in-memory table stays authoritative.
fn fetch_table(client: &CatalogClient, cache: &BookCache, genres: &[String]) -> Vec<BookRecord> {
    info!("fetching book data for {} genres", genres.len());

    let raw = client.fetch_all(genres);
    let books = normalize::normalize(raw);
    info!("fetched and normalized {} books", books.len());

    if let Err(e) = cache.save(&books) {
        error!("could not persist book data: {}", e);
    }

    books
}
