use chrono::NaiveDate;
use std::collections::HashSet;
use std::hash::Hash;

use crate::types::{ElvisRecord, Period, ScoredRecord};

/// Ordering key for "most recent": date first, then (year, month).
/// Missing parts sort as oldest.
pub type RecencyKey = (Option<NaiveDate>, Option<Period>);

pub trait Recency {
    fn country(&self) -> &str;
    fn recency(&self) -> RecencyKey;
}

impl Recency for ElvisRecord {
    fn country(&self) -> &str {
        &self.country
    }

    fn recency(&self) -> RecencyKey {
        (self.date, self.period)
    }
}

impl Recency for ScoredRecord {
    fn country(&self) -> &str {
        &self.record.country
    }

    fn recency(&self) -> RecencyKey {
        self.record.recency()
    }
}

/// One row per country: the most recent one.
///
/// Stable sort by recency descending, then keep the first row per country,
/// so equal keys resolve to the earlier input row. Output is in that sorted
/// order.
pub fn latest_per_country<T: Recency + Clone>(rows: &[T]) -> Vec<T> {
    let mut sorted: Vec<&T> = rows.iter().collect();
    sorted.sort_by(|a, b| b.recency().cmp(&a.recency()));
    let mut seen = HashSet::new();
    sorted
        .into_iter()
        .filter(|row| seen.insert(row.country().to_string()))
        .cloned()
        .collect()
}

/// Drop rows whose key was already seen, keeping the first occurrence.
pub fn dedup_by_key<T, K, F>(rows: Vec<T>, key: F) -> Vec<T>
where
    K: Eq + Hash,
    F: Fn(&T) -> K,
{
    let mut seen = HashSet::new();
    rows.into_iter().filter(|row| seen.insert(key(row))).collect()
}
