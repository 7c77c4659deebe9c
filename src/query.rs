//! Query engine over the normalized in-memory table.
//!
//! Three operations: genre enumeration, multi-predicate filtered listing and
//! uniform random pick. Filtering treats an absent field value as failing the
//! corresponding bound; an empty result is never an error. All outputs are
//! owned copies or borrowed single records, never aliases callers can use to
//! mutate the master table.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::book::BookRecord;
use crate::error::{Error, Result};

/// Conjunctive filter over the table. Unset predicates match everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookFilter {
    pub genre: Option<String>,
    pub min_year: Option<i32>,
    pub max_year: Option<i32>,
    pub min_popularity: Option<f64>,
    pub max_ranking: Option<i64>,
    pub min_heat: Option<u8>,
    pub limit: Option<usize>,
}

impl BookFilter {
    /// Build a filter from raw `(key, value)` string pairs, as they arrive
    /// from CLI flags or form fields. A malformed bound is rejected with
    /// [`Error::InvalidFilter`], never silently dropped.
    pub fn from_args<'a, I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut filter = BookFilter::default();
        for (key, value) in pairs {
            filter.set(key, value)?;
        }
        filter.validate()?;
        Ok(filter)
    }

    /// Apply one raw `key=value` predicate to the filter.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "genre" => self.genre = Some(value.to_string()),
            "min-year" => self.min_year = Some(parse_bound(key, value)?),
            "max-year" => self.max_year = Some(parse_bound(key, value)?),
            "min-popularity" => self.min_popularity = Some(parse_bound(key, value)?),
            "max-ranking" => self.max_ranking = Some(parse_bound(key, value)?),
            "min-heat" => self.min_heat = Some(parse_bound(key, value)?),
            "limit" => self.limit = Some(parse_bound(key, value)?),
            _ => {
                return Err(Error::InvalidFilter(format!("unknown filter: {}", key)));
            }
        }
        Ok(())
    }

    /// Reject bounds that parsed but cannot be compared against.
    pub fn validate(&self) -> Result<()> {
        if let Some(p) = self.min_popularity {
            if !p.is_finite() {
                return Err(Error::InvalidFilter(format!(
                    "min-popularity must be finite, got {}",
                    p
                )));
            }
        }
        Ok(())
    }

    /// True when a record passes every supplied bound. A record missing a
    /// compared field fails that bound.
    fn matches(&self, record: &BookRecord) -> bool {
        if let Some(ref genre) = self.genre {
            if !record.genre.eq_ignore_ascii_case(genre) {
                return false;
            }
        }
        if let Some(min_year) = self.min_year {
            if !record.year.map_or(false, |y| y >= min_year) {
                return false;
            }
        }
        if let Some(max_year) = self.max_year {
            if !record.year.map_or(false, |y| y <= max_year) {
                return false;
            }
        }
        if let Some(min_popularity) = self.min_popularity {
            if !record.popularity.map_or(false, |p| p >= min_popularity) {
                return false;
            }
        }
        if let Some(max_ranking) = self.max_ranking {
            if !record.ranking.map_or(false, |r| r <= max_ranking) {
                return false;
            }
        }
        if let Some(min_heat) = self.min_heat {
            if !record.heat_index.map_or(false, |h| h >= min_heat) {
                return false;
            }
        }
        true
    }
}

fn parse_bound<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::InvalidFilter(format!("{}: expected a number, got {:?}", key, value)))
}

/// Distinct genres present in the table, sorted ascending.
pub fn available_genres(records: &[BookRecord]) -> Vec<String> {
    let genres: BTreeSet<&str> = records.iter().map(|r| r.genre.as_str()).collect();
    genres.into_iter().map(|g| g.to_string()).collect()
}

/// Filter the table with every supplied predicate ANDed, sorted by composite
/// score descending. `limit` truncates after sorting.
pub fn filter_books(records: &[BookRecord], filter: &BookFilter) -> Vec<BookRecord> {
    let mut matched: Vec<BookRecord> = records
        .iter()
        .filter(|r| filter.matches(r))
        .cloned()
        .collect();

    sort_by_desirability(&mut matched);

    if let Some(limit) = filter.limit {
        matched.truncate(limit);
    }

    matched
}

/// Composite score descending, original order breaking ties (the sort is
/// stable). Falls back to popularity descending when any record is missing a
/// score, which only happens on tables loaded from a foreign snapshot.
fn sort_by_desirability(records: &mut [BookRecord]) {
    let scored = records.iter().all(|r| r.composite_score.is_some());

    if scored {
        records.sort_by(|a, b| {
            b.composite_score
                .partial_cmp(&a.composite_score)
                .unwrap_or(Ordering::Equal)
        });
    } else {
        records.sort_by(|a, b| {
            b.popularity
                .partial_cmp(&a.popularity)
                .unwrap_or(Ordering::Equal)
        });
    }
}

/// Uniformly sample one record, optionally restricted to a genre
/// (case-insensitive). `None` when the restricted set is empty.
pub fn random_pick<'a>(records: &'a [BookRecord], genre: Option<&str>) -> Option<&'a BookRecord> {
    random_pick_with(records, genre, &mut rand::thread_rng())
}

/// [`random_pick`] over a caller-supplied RNG, so tests can seed it.
pub fn random_pick_with<'a, R: Rng>(
    records: &'a [BookRecord],
    genre: Option<&str>,
    rng: &mut R,
) -> Option<&'a BookRecord> {
    let candidates: Vec<&BookRecord> = match genre {
        Some(genre) => records
            .iter()
            .filter(|r| r.genre.eq_ignore_ascii_case(genre))
            .collect(),
        None => records.iter().collect(),
    };

    candidates.choose(rng).copied()
}
