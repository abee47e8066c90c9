//! Source names and sentinels shared across ingestion, fusion and output.

// Source names (used in logs and error messages)
pub const ELVIS_SOURCE: &str = "elvis";
pub const ELECTION_DATES_SOURCE: &str = "election_dates";
pub const REIGN_SOURCE: &str = "reign";
pub const BOUNDARIES_SOURCE: &str = "boundaries";
pub const UPCOMING_SOURCE: &str = "upcoming_elections";

// Default source locations
pub const DEFAULT_ELVIS_URL: &str = "https://raw.githubusercontent.com/OEFDataScience/REIGN_Dashboard/dd4b14f8172651a720f686b0f1bfbc3cc3a777c3/elvis_master_sept2019_final.csv";
pub const DEFAULT_ELECTION_DATES_URL: &str =
    "https://raw.githubusercontent.com/hgoers/election_dates_database/master/Election_dates.csv";
pub const DEFAULT_REIGN_URL: &str =
    "https://raw.githubusercontent.com/OEFDataScience/REIGN.github.io/gh-pages/data_sets/REIGN_2020_10.csv";
pub const DEFAULT_BOUNDARIES_URL: &str =
    "https://raw.githubusercontent.com/hgoers/hgoers.github.io/master/worldmap.json";
pub const DEFAULT_UPCOMING_URL: &str =
    "https://raw.githubusercontent.com/hgoers/election_violence_dashboard/master/upcoming_election_vio.csv";

// ELVIS columns
pub const COL_COUNTRY: &str = "country";
pub const COL_DATES: &str = "dates";
pub const COL_OUTCOME: &str = "l.elecViolence2";
pub const COL_YEAR: &str = "year";
pub const COL_MONTH: &str = "month";

// Election registry / published table columns
pub const COL_DATE: &str = "date";
pub const COL_STATUS: &str = "status";
pub const COL_PRED_VIO: &str = "pred_vio";

// REIGN columns
pub const COL_LEADER: &str = "leader";
pub const COL_TENURE_MONTHS: &str = "tenure_months";
pub const COL_GOVERNMENT: &str = "government";
pub const COL_ANTICIPATION: &str = "anticipation";

// Boundary properties
pub const PROP_ADMIN: &str = "admin";
pub const PROP_ADM0_A3: &str = "adm0_a3";

/// Cell values treated as "no value" in every table.
pub const MISSING_CELLS: &[&str] = &["", "None", "NA", "N/A", "nan", "NaN", "null"];

// Missing-match sentinels
pub const NO_ELECTION: &str = "No election";
pub const NO_UPCOMING_ELECTION: &str = "No upcoming election";
pub const NO_RISK_ESTIMATE: &str = "No risk estimate";
pub const NO_DATA: &str = "No data";

// Output artifacts
pub const UPCOMING_OUTPUT_FILE: &str = "upcoming_election_vio.csv";
pub const COUNTRY_OUTPUT_FILE: &str = "country_risk.csv";
pub const CHART_OUTPUT_FILE: &str = "upcoming_chart.json";
pub const MAP_OUTPUT_FILE: &str = "risk_map.geojson";

/// True when a raw cell should be read as missing.
pub fn is_missing_cell(cell: &str) -> bool {
    let trimmed = cell.trim();
    MISSING_CELLS.iter().any(|m| *m == trimmed)
}
