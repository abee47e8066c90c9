use tracing::warn;

use super::{cell, flag, integer, number, CsvTable};
use crate::constants::{
    self, COL_ANTICIPATION, COL_COUNTRY, COL_GOVERNMENT, COL_LEADER, COL_MONTH,
    COL_TENURE_MONTHS, COL_YEAR,
};
use crate::error::Result;
use crate::observability::metrics;
use crate::types::{Period, RegimeRecord};

/// Parse the REIGN leadership panel, keeping only the columns the map shows.
pub fn parse_reign(bytes: &[u8]) -> Result<Vec<RegimeRecord>> {
    let source = constants::REIGN_SOURCE;
    let table = CsvTable::parse(source, bytes)?;
    if table.is_empty() {
        return Ok(Vec::new());
    }
    let idx = table.require(&[
        COL_COUNTRY,
        COL_LEADER,
        COL_YEAR,
        COL_MONTH,
        COL_TENURE_MONTHS,
        COL_GOVERNMENT,
        COL_ANTICIPATION,
    ])?;

    let mut records = Vec::with_capacity(table.rows.len());
    let mut dropped = 0;
    for (i, row) in table.rows.iter().enumerate() {
        let country = cell(row, Some(idx[0]));
        let year = integer(row, Some(idx[2]));
        let month = integer(row, Some(idx[3])).filter(|m| (1..=12).contains(m));
        let (Some(country), Some(year), Some(month)) = (country, year, month) else {
            dropped += 1;
            continue;
        };
        records.push(RegimeRecord {
            row: i + 1,
            country: country.to_string(),
            period: Period::new(year as i32, month as u32),
            leader: cell(row, Some(idx[1])).unwrap_or_default().to_string(),
            tenure_months: number(row, Some(idx[4])),
            government: cell(row, Some(idx[5])).unwrap_or_default().to_string(),
            anticipation: flag(row, Some(idx[6])),
        });
    }

    if dropped > 0 {
        warn!("Dropped {} REIGN rows without country/year/month", dropped);
        metrics::sources::rows_dropped(source, dropped);
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_reign_subset_and_ignores_extra_columns() {
        let csv = "ccode,country,leader,year,month,elected,tenure_months,government,anticipation\n\
                   483,Chad,Deby,2018,9,1,334,Personal Dictatorship,0\n\
                   2,USA,Trump,2018,9,1,20,Presidential Democracy,1\n";
        let records = parse_reign(csv.as_bytes()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].country, "Chad");
        assert_eq!(records[0].period, Period::new(2018, 9));
        assert_eq!(records[0].tenure_months, Some(334.0));
        assert_eq!(records[0].government, "Personal Dictatorship");
        assert!(!records[0].anticipation);
        assert!(records[1].anticipation);
    }

    #[test]
    fn drops_rows_with_bad_month() {
        let csv = "country,leader,year,month,tenure_months,government,anticipation\n\
                   Chad,Deby,2018,13,334,Personal,0\n";
        assert!(parse_reign(csv.as_bytes()).unwrap().is_empty());
    }

    #[test]
    fn missing_columns_are_fatal() {
        let err = parse_reign(b"country,year,month\nChad,2018,1\n").unwrap_err();
        assert!(err.to_string().contains("leader"));
    }
}
