//! Canonical forms for the keys every join depends on: country names and dates.

pub mod country;
pub mod dates;

pub use country::{Canonical, CountryCanonicalizer, UnmappedReport};
pub use dates::{month_ahead, parse_date};
