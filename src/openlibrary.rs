//! Open Library API client.
//!
//! One request per subject against the subjects endpoint
//! (`/subjects/{genre}.json`); each entry of the response's `works` array
//! becomes a raw record for the normalizer. Cover images are served from a
//! separate image host, keyed by cover id.

use std::io::Read;
use std::time::Duration;

use log::{debug, warn};
use serde::Deserialize;

use crate::book::{RawBook, UNKNOWN_AUTHOR};
use crate::error::{Error, Result};

const USER_AGENT: &str = "Mozilla/5.0 (compatible; bookrec/0.1)";

// ── API response types ───────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct SubjectResponse {
    #[serde(default)]
    works: Vec<WorkEntry>,
}

#[derive(Debug, Deserialize)]
struct WorkEntry {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    authors: Vec<AuthorEntry>,
    /// Left as a raw JSON value; the catalog serves numbers and strings both.
    #[serde(default)]
    first_publish_year: Option<serde_json::Value>,
    #[serde(default)]
    rating: Option<RatingEntry>,
    #[serde(default)]
    rank: Option<i64>,
    #[serde(default)]
    cover_id: Option<i64>,
    #[serde(default)]
    key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AuthorEntry {
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RatingEntry {
    #[serde(default)]
    average: Option<f64>,
}

// ── Client ───────────────────────────────────────────────────────────────────

/// Open Library client for subject listings and cover images.
pub struct CatalogClient {
    catalog_base: String,
    image_base: String,
    agent: ureq::Agent,
}

impl CatalogClient {
    pub fn new(catalog_base: &str, image_base: &str, timeout_secs: u64) -> Self {
        Self {
            catalog_base: catalog_base.trim_end_matches('/').to_string(),
            image_base: image_base.trim_end_matches('/').to_string(),
            agent: ureq::AgentBuilder::new()
                .timeout(Duration::from_secs(timeout_secs))
                .build(),
        }
    }

    /// Fetch up to 100 works tagged with one subject.
    ///
    /// A network failure, non-2xx status or malformed body all surface as
    /// [`Error::Fetch`]; callers decide whether that aborts anything.
    pub fn fetch_subject(&self, genre: &str) -> Result<Vec<RawBook>> {
        let url = format!("{}/subjects/{}.json?limit=100", self.catalog_base, genre);

        let response = self
            .agent
            .get(&url)
            .set("User-Agent", USER_AGENT)
            .call()
            .map_err(|e| Error::Fetch(e.to_string()))?;

        let subject: SubjectResponse = serde_json::from_reader(response.into_reader())
            .map_err(|e| Error::Fetch(format!("bad subject body for {}: {}", genre, e)))?;

        Ok(subject
            .works
            .into_iter()
            .map(|work| map_work(work, genre))
            .collect())
    }

    /// Fetch every genre in turn, skipping the ones that fail.
    ///
    /// The loop is not atomic: a genre whose request or body fails contributes
    /// zero records and the remaining genres are still fetched.
    pub fn fetch_all(&self, genres: &[String]) -> Vec<RawBook> {
        let mut all = Vec::new();

        for genre in genres {
            match self.fetch_subject(genre) {
                Ok(mut records) => {
                    debug!("fetched {} works for genre {}", records.len(), genre);
                    all.append(&mut records);
                }
                Err(e) => {
                    warn!("skipping genre {}: {}", genre, e);
                }
            }
        }

        all
    }

    /// Download the medium-size cover image for a cover id.
    pub fn fetch_cover(&self, cover_id: i64) -> Result<Vec<u8>> {
        let url = format!("{}/b/id/{}-M.jpg", self.image_base, cover_id);

        let response = self
            .agent
            .get(&url)
            .set("User-Agent", USER_AGENT)
            .call()
            .map_err(|e| Error::Fetch(e.to_string()))?;

        let mut bytes = Vec::new();
        response
            .into_reader()
            .read_to_end(&mut bytes)
            .map_err(|e| Error::Fetch(format!("reading cover {}: {}", cover_id, e)))?;

        Ok(bytes)
    }
}

/// Map one `works` entry onto a raw record tagged with the genre it was
/// fetched under. No defaults are applied here; that is the normalizer's job.
fn map_work(work: WorkEntry, genre: &str) -> RawBook {
    RawBook {
        title: work.title,
        author: join_authors(&work.authors),
        genre: genre.to_string(),
        year: work.first_publish_year,
        popularity: work.rating.and_then(|r| r.average),
        ranking: work.rank,
        heat_index: None,
        cover_id: work.cover_id,
        key: work.key,
    }
}

/// Comma-join contributor names; an entry without a name still takes a slot.
/// An empty author list yields `None` so the normalizer applies the default.
fn join_authors(authors: &[AuthorEntry]) -> Option<String> {
    if authors.is_empty() {
        return None;
    }

    Some(
        authors
            .iter()
            .map(|a| a.name.as_deref().unwrap_or(UNKNOWN_AUTHOR))
            .collect::<Vec<_>>()
            .join(", "),
    )
}
