//! Fusion: left joins from a driving table, recency reduction and the
//! "upcoming" predicate, composed into the views the outputs consume.

pub mod join;
pub mod latest;
pub mod upcoming;
pub mod views;

pub use join::left_join;
pub use latest::{dedup_by_key, latest_per_country, Recency};
pub use upcoming::{filter_upcoming, next_election_per_country, upcoming_schedule};
pub use views::{country_view, month_view, monthly_panel, static_map_view, upcoming_election_view};
