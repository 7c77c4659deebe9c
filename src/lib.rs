pub mod book;
pub mod cache;
pub mod config;
pub mod error;
pub mod normalize;
pub mod openlibrary;
pub mod query;
pub mod recommender;

pub use book::{BookRecord, BookView, RawBook};
pub use cache::BookCache;
pub use config::Config;
pub use error::{Error, Result};
pub use openlibrary::CatalogClient;
pub use query::BookFilter;
pub use recommender::BookRecommender;
