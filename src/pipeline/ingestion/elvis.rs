use tracing::{debug, warn};

use super::{cell, date_cell, integer, number, CsvTable};
use crate::constants::{self, COL_COUNTRY, COL_DATES, COL_MONTH, COL_OUTCOME, COL_YEAR};
use crate::error::Result;
use crate::types::{Covariate, Covariates, ElvisRecord, ElvisTable, Period};

/// Parse the ELVIS covariate panel.
///
/// Only `country` is required here. Absent outcome or covariate columns are
/// recorded in `missing_columns` so the scorer can refuse to run with a
/// precise message; the fusion stages do not need them.
pub fn parse_elvis(bytes: &[u8]) -> Result<ElvisTable> {
    let source = constants::ELVIS_SOURCE;
    let table = CsvTable::parse(source, bytes)?;
    if table.is_empty() {
        return Ok(ElvisTable::default());
    }
    let country_idx = table.require(&[COL_COUNTRY])?[0];

    let dates_idx = table.column(COL_DATES);
    if dates_idx.is_none() {
        warn!("ELVIS table has no '{}' column; periods come from year/month only", COL_DATES);
    }
    let year_idx = table.column(COL_YEAR);
    let month_idx = table.column(COL_MONTH);
    let outcome_idx = table.column(COL_OUTCOME);
    let covariate_idx: Vec<Option<usize>> = Covariate::ALL
        .iter()
        .map(|c| table.column(c.column()))
        .collect();

    let mut missing_columns = Vec::new();
    if outcome_idx.is_none() {
        missing_columns.push(COL_OUTCOME.to_string());
    }
    for (c, idx) in Covariate::ALL.iter().zip(&covariate_idx) {
        if idx.is_none() {
            missing_columns.push(c.column().to_string());
        }
    }

    let mut records = Vec::with_capacity(table.rows.len());
    let mut skipped = 0;
    for (i, row) in table.rows.iter().enumerate() {
        let Some(country) = cell(row, Some(country_idx)) else {
            skipped += 1;
            continue;
        };
        let date = date_cell(source, COL_DATES, row, dates_idx, i + 1)?;
        let period = match (integer(row, year_idx), integer(row, month_idx)) {
            (Some(year), Some(month)) if (1..=12).contains(&month) => {
                Some(Period::new(year as i32, month as u32))
            }
            _ => date.map(Period::of_date),
        };

        let mut covariates = Covariates::default();
        for (c, idx) in Covariate::ALL.iter().zip(&covariate_idx) {
            covariates.set(*c, number(row, *idx));
        }

        records.push(ElvisRecord {
            row: i + 1,
            country: country.to_string(),
            date,
            period,
            outcome: number(row, outcome_idx),
            covariates,
        });
    }

    if skipped > 0 {
        warn!("Skipped {} ELVIS rows without a country", skipped);
        crate::observability::metrics::sources::rows_dropped(source, skipped);
    }
    debug!("Parsed {} ELVIS rows", records.len());

    Ok(ElvisTable {
        records,
        missing_columns,
    })
}
