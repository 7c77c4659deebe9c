//! Error types for the book recommendation pipeline.

use thiserror::Error;

/// Failure classes of the fetch/normalize/cache/query pipeline.
///
/// Fetch and cache failures are absorbed close to where they occur (logged,
/// with the pipeline degrading to a safe default); only
/// [`Error::InvalidFilter`] is expected to reach callers of the query API.
#[derive(Error, Debug)]
pub enum Error {
    /// Transient per-request catalog failure: network, HTTP status, or a
    /// malformed body. The affected genre contributes zero records and the
    /// run continues with the remaining genres.
    #[error("fetch error: {0}")]
    Fetch(String),

    /// The cache artifact exists but cannot be read or parsed; the caller
    /// falls back to a fresh fetch.
    #[error("cache corrupt: {0}")]
    CacheCorrupt(String),

    /// The cache artifact could not be written. Non-fatal: the in-memory
    /// table stays authoritative for the session.
    #[error("cache persist error: {0}")]
    CachePersist(String),

    /// Malformed configuration file.
    #[error("config error: {0}")]
    Config(String),

    /// A caller-supplied filter argument was rejected (e.g. a non-numeric
    /// year bound).
    #[error("invalid filter: {0}")]
    InvalidFilter(String),

    /// IO error outside the cache-specific paths.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, Error>;
