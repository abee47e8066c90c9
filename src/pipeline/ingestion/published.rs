use super::{cell, date_cell, number, CsvTable};
use crate::constants::{self, COL_COUNTRY, COL_DATE, COL_PRED_VIO, COL_STATUS};
use crate::error::Result;
use crate::observability::metrics;
use crate::types::PublishedElection;

/// Parse a previously published `date,status,country,pred_vio` table.
/// A `pred_vio` cell holding the no-estimate sentinel reads as `None`.
pub fn parse_published_upcoming(bytes: &[u8]) -> Result<Vec<PublishedElection>> {
    let source = constants::UPCOMING_SOURCE;
    let table = CsvTable::parse(source, bytes)?;
    if table.is_empty() {
        return Ok(Vec::new());
    }
    let idx = table.require(&[COL_DATE, COL_COUNTRY, COL_PRED_VIO])?;
    let status_idx = table.column(COL_STATUS);

    let mut rows = Vec::with_capacity(table.rows.len());
    let mut dropped = 0;
    for (i, row) in table.rows.iter().enumerate() {
        let date = date_cell(source, COL_DATE, row, Some(idx[0]), i + 1)?;
        let country = cell(row, Some(idx[1]));
        let (Some(date), Some(country)) = (date, country) else {
            dropped += 1;
            continue;
        };
        rows.push(PublishedElection {
            country: country.to_string(),
            date,
            status: cell(row, status_idx).unwrap_or_default().to_string(),
            pred_vio: number(row, Some(idx[2])),
        });
    }
    if dropped > 0 {
        metrics::sources::rows_dropped(source, dropped);
    }
    Ok(rows)
}
