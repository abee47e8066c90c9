use chrono::NaiveDate;
use std::collections::HashSet;

use crate::types::{ElectionDate, ElectionTiming};

/// Elections strictly after `now`, in input order.
///
/// `now` is the run's single captured processing date; it is never re-read
/// from the clock here.
pub fn filter_upcoming(elections: &[ElectionDate], now: NaiveDate) -> Vec<ElectionDate> {
    elections
        .iter()
        .filter(|e| ElectionTiming::of(e.date, now) == ElectionTiming::Upcoming)
        .cloned()
        .collect()
}

/// Upcoming elections with duplicate (country, date) rows removed, sorted by
/// date ascending with ties in registry order.
pub fn upcoming_schedule(elections: &[ElectionDate], now: NaiveDate) -> Vec<ElectionDate> {
    let mut seen = HashSet::new();
    let mut upcoming: Vec<ElectionDate> = filter_upcoming(elections, now)
        .into_iter()
        .filter(|e| seen.insert((e.country.clone(), e.date)))
        .collect();
    upcoming.sort_by_key(|e| e.date);
    upcoming
}

/// First row per country of an ascending schedule: each country's next election.
pub fn next_election_per_country(schedule: &[ElectionDate]) -> Vec<ElectionDate> {
    let mut seen = HashSet::new();
    schedule
        .iter()
        .filter(|e| seen.insert(e.country.clone()))
        .cloned()
        .collect()
}
