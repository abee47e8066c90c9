use tracing::debug;

use super::{cell, date_cell, CsvTable};
use crate::constants::{self, COL_COUNTRY, COL_DATE, COL_STATUS};
use crate::error::Result;
use crate::observability::metrics;
use crate::types::ElectionDate;

/// Parse the election-date registry.
///
/// Rows whose date is the `None` sentinel or empty are dropped here so no
/// later stage does arithmetic on them. Any other date text that does not
/// parse fails the source.
pub fn parse_election_dates(bytes: &[u8]) -> Result<Vec<ElectionDate>> {
    let source = constants::ELECTION_DATES_SOURCE;
    let table = CsvTable::parse(source, bytes)?;
    if table.is_empty() {
        return Ok(Vec::new());
    }
    let idx = table.require(&[COL_COUNTRY, COL_DATE])?;
    let (country_idx, date_idx) = (idx[0], idx[1]);
    let status_idx = table.column(COL_STATUS);

    let mut elections = Vec::with_capacity(table.rows.len());
    let mut dropped = 0;
    for (i, row) in table.rows.iter().enumerate() {
        let country = cell(row, Some(country_idx));
        let date = date_cell(source, COL_DATE, row, Some(date_idx), i + 1)?;
        match (country, date) {
            (Some(country), Some(date)) => elections.push(ElectionDate {
                row: i + 1,
                country: country.to_string(),
                date,
                status: cell(row, status_idx).unwrap_or_default().to_string(),
            }),
            _ => {
                debug!(row = i + 1, "dropping registry row without a usable country/date");
                dropped += 1;
            }
        }
    }

    if dropped > 0 {
        debug!("Dropped {} registry rows with missing dates", dropped);
        metrics::sources::rows_dropped(source, dropped);
    }
    Ok(elections)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn drops_none_sentinel_dates() {
        let csv = "country,date,status\nChad,2021-04-11,Presidential\nMali,None,Legislative\nPeru,2021-04-11,General\n";
        let elections = parse_election_dates(csv.as_bytes()).unwrap();
        assert_eq!(elections.len(), 2);
        assert_eq!(elections[0].country, "Chad");
        assert_eq!(elections[0].date, NaiveDate::from_ymd_opt(2021, 4, 11).unwrap());
        assert_eq!(elections[0].status, "Presidential");
        assert_eq!(elections[1].country, "Peru");
        assert_eq!(elections[1].row, 3);
    }

    #[test]
    fn malformed_date_fails_naming_the_row() {
        let csv = "country,date,status\nChad,2021-13-45,General\nPeru,2021-04-11,General\n";
        let err = parse_election_dates(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, crate::error::RiskError::Ingestion { .. }));
        let message = err.to_string();
        assert!(message.contains("data row 1"), "{message}");
        assert!(message.contains("2021-13-45"), "{message}");
    }

    #[test]
    fn empty_date_cell_is_dropped() {
        let elections = parse_election_dates(b"country,date\nChad,\nPeru,2021-04-11\n").unwrap();
        assert_eq!(elections.len(), 1);
        assert_eq!(elections[0].country, "Peru");
    }

    #[test]
    fn status_column_is_optional() {
        let elections = parse_election_dates(b"country,date\nChad,2021-04-11\n").unwrap();
        assert_eq!(elections[0].status, "");
    }

    #[test]
    fn requires_country_and_date() {
        assert!(parse_election_dates(b"country,status\nChad,x\n").is_err());
    }

    #[test]
    fn header_only_is_empty() {
        assert!(parse_election_dates(b"country,date,status\n").unwrap().is_empty());
    }
}
