use chrono::{Datelike, NaiveDate};
use serde::{Serialize, Serializer};
use std::fmt;

use crate::constants;

/// Calendar month key used by the ELVIS and REIGN panels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Period {
    pub year: i32,
    pub month: u32,
}

impl Period {
    pub fn new(year: i32, month: u32) -> Self {
        Self { year, month }
    }

    pub fn of_date(date: NaiveDate) -> Self {
        Self::new(date.year(), date.month())
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:02}", self.year, self.month)
    }
}

/// The 13 model covariates, in model column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Covariate {
    RegimeTenure,
    GdpPerCapita,
    Growth,
    LogInfantMortality,
    LogPopulation,
    StatePowerIndex,
    ExecutiveConstraint,
    Polity,
    PoliticalCompetition,
    PoliticalViolence,
    GovDemocracy,
    GovInterim,
    DemocraticDuration,
}

impl Covariate {
    pub const COUNT: usize = 13;

    pub const ALL: [Covariate; Covariate::COUNT] = [
        Covariate::RegimeTenure,
        Covariate::GdpPerCapita,
        Covariate::Growth,
        Covariate::LogInfantMortality,
        Covariate::LogPopulation,
        Covariate::StatePowerIndex,
        Covariate::ExecutiveConstraint,
        Covariate::Polity,
        Covariate::PoliticalCompetition,
        Covariate::PoliticalViolence,
        Covariate::GovDemocracy,
        Covariate::GovInterim,
        Covariate::DemocraticDuration,
    ];

    /// ELVIS column header.
    pub fn column(self) -> &'static str {
        match self {
            Covariate::RegimeTenure => "regimetenure",
            Covariate::GdpPerCapita => "pcgdp",
            Covariate::Growth => "growth",
            Covariate::LogInfantMortality => "logIMR",
            Covariate::LogPopulation => "lnpop2",
            Covariate::StatePowerIndex => "SPI",
            Covariate::ExecutiveConstraint => "lexconst",
            Covariate::Polity => "lpolity2",
            Covariate::PoliticalCompetition => "lpolcomp",
            Covariate::PoliticalViolence => "political_violence",
            Covariate::GovDemocracy => "gov_democracy",
            Covariate::GovInterim => "gov_interim",
            Covariate::DemocraticDuration => "dem_duration",
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

/// One covariate vector; `None` marks a missing or non-numeric cell.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Covariates {
    values: [Option<f64>; Covariate::COUNT],
}

impl Covariates {
    pub fn new(values: [Option<f64>; Covariate::COUNT]) -> Self {
        Self { values }
    }

    pub fn get(&self, covariate: Covariate) -> Option<f64> {
        self.values[covariate.index()]
    }

    pub fn set(&mut self, covariate: Covariate, value: Option<f64>) {
        self.values[covariate.index()] = value;
    }

    pub fn values(&self) -> &[Option<f64>; Covariate::COUNT] {
        &self.values
    }

    /// Every value, or `None` if any is missing.
    pub fn complete(&self) -> Option<[f64; Covariate::COUNT]> {
        let mut out = [0.0; Covariate::COUNT];
        for (slot, value) in out.iter_mut().zip(self.values.iter()) {
            *slot = (*value)?;
        }
        Some(out)
    }
}

/// A row of the ELVIS covariate panel.
#[derive(Debug, Clone, PartialEq)]
pub struct ElvisRecord {
    /// 1-based data row in the source file.
    pub row: usize,
    pub country: String,
    /// Election date for the row, if the panel records one.
    pub date: Option<NaiveDate>,
    pub period: Option<Period>,
    /// `l.elecViolence2`
    pub outcome: Option<f64>,
    pub covariates: Covariates,
}

/// ELVIS rows plus the covariate columns the source actually carried.
#[derive(Debug, Clone, Default)]
pub struct ElvisTable {
    pub records: Vec<ElvisRecord>,
    pub missing_columns: Vec<String>,
}

/// An ELVIS row with its model score attached.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredRecord {
    pub record: ElvisRecord,
    pub pred_vio: f64,
}

/// A row of the election-date registry after the missing-date sentinel is dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElectionDate {
    pub row: usize,
    pub country: String,
    pub date: NaiveDate,
    /// Status text as published by the registry.
    pub status: String,
}

/// Election timing relative to the run's processing date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElectionTiming {
    Past,
    Upcoming,
}

impl ElectionTiming {
    /// Upcoming iff strictly after `now`.
    pub fn of(date: NaiveDate, now: NaiveDate) -> Self {
        if date > now {
            ElectionTiming::Upcoming
        } else {
            ElectionTiming::Past
        }
    }
}

/// A row of the REIGN leadership panel.
#[derive(Debug, Clone, PartialEq)]
pub struct RegimeRecord {
    pub row: usize,
    pub country: String,
    pub period: Period,
    pub leader: String,
    pub tenure_months: Option<f64>,
    pub government: String,
    pub anticipation: bool,
}

/// A map boundary feature.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryRecord {
    pub country: String,
    pub stateabb: Option<String>,
    pub geometry: Option<geojson::Geometry>,
}

/// A row of a previously published upcoming-election table.
#[derive(Debug, Clone, PartialEq)]
pub struct PublishedElection {
    pub country: String,
    pub date: NaiveDate,
    pub status: String,
    pub pred_vio: Option<f64>,
}

/// Election date attached by a left join, or the sentinel for "no match".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElectionSlot {
    Scheduled(NaiveDate),
    NoElection,
    NoUpcomingElection,
}

impl ElectionSlot {
    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            ElectionSlot::Scheduled(date) => Some(*date),
            _ => None,
        }
    }
}

impl fmt::Display for ElectionSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElectionSlot::Scheduled(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            ElectionSlot::NoElection => f.write_str(constants::NO_ELECTION),
            ElectionSlot::NoUpcomingElection => f.write_str(constants::NO_UPCOMING_ELECTION),
        }
    }
}

impl Serialize for ElectionSlot {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Risk score attached by a left join, or the sentinel for "no match".
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RiskSlot {
    Scored(f64),
    Unscored,
}

impl RiskSlot {
    pub fn value(&self) -> Option<f64> {
        match self {
            RiskSlot::Scored(v) => Some(*v),
            RiskSlot::Unscored => None,
        }
    }
}

impl From<Option<f64>> for RiskSlot {
    fn from(value: Option<f64>) -> Self {
        value.map_or(RiskSlot::Unscored, RiskSlot::Scored)
    }
}

impl fmt::Display for RiskSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskSlot::Scored(v) => write!(f, "{v}"),
            RiskSlot::Unscored => f.write_str(constants::NO_RISK_ESTIMATE),
        }
    }
}

impl Serialize for RiskSlot {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            RiskSlot::Scored(v) => serializer.serialize_f64(*v),
            RiskSlot::Unscored => serializer.serialize_str(constants::NO_RISK_ESTIMATE),
        }
    }
}

/// Country view: latest state per country with its next election.
#[derive(Debug, Clone, PartialEq)]
pub struct CountryRiskRow {
    pub country: String,
    pub period: Option<Period>,
    pub covariates: Covariates,
    pub pred_vio: f64,
    pub next_election: ElectionSlot,
}

/// Upcoming-election view, one row per (country, election).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpcomingElectionRow {
    pub date: NaiveDate,
    pub status: String,
    pub country: String,
    pub pred_vio: RiskSlot,
}

/// REIGN month joined with ELVIS, as shown on the map.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyRow {
    pub country: String,
    pub period: Period,
    pub leader: String,
    pub tenure_months: Option<f64>,
    pub government: String,
    pub anticipation: bool,
    pub election: ElectionSlot,
    pub pred_vio: RiskSlot,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn covariate_columns_follow_model_order() {
        let columns: Vec<&str> = Covariate::ALL.iter().map(|c| c.column()).collect();
        assert_eq!(columns.len(), 13);
        assert_eq!(columns[0], "regimetenure");
        assert_eq!(columns[12], "dem_duration");
        for (i, c) in Covariate::ALL.iter().enumerate() {
            assert_eq!(c.index(), i);
        }
    }

    #[test]
    fn complete_requires_every_value() {
        let mut covariates = Covariates::new([Some(1.0); Covariate::COUNT]);
        assert!(covariates.complete().is_some());
        covariates.set(Covariate::Growth, None);
        assert!(covariates.complete().is_none());
    }

    #[test]
    fn timing_is_strictly_after_now() {
        let now = NaiveDate::from_ymd_opt(2021, 3, 1).unwrap();
        assert_eq!(ElectionTiming::of(now, now), ElectionTiming::Past);
        assert_eq!(
            ElectionTiming::of(now.succ_opt().unwrap(), now),
            ElectionTiming::Upcoming
        );
    }

    #[test]
    fn slots_render_sentinels_not_nulls() {
        assert_eq!(ElectionSlot::NoElection.to_string(), "No election");
        assert_eq!(
            ElectionSlot::NoUpcomingElection.to_string(),
            "No upcoming election"
        );
        let date = NaiveDate::from_ymd_opt(2021, 1, 1).unwrap();
        assert_eq!(ElectionSlot::Scheduled(date).to_string(), "2021-01-01");
        assert_eq!(
            serde_json::to_value(RiskSlot::Unscored).unwrap(),
            serde_json::json!("No risk estimate")
        );
        assert_eq!(
            serde_json::to_value(RiskSlot::Scored(0.25)).unwrap(),
            serde_json::json!(0.25)
        );
    }
}
