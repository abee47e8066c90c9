use crate::constants::{COL_COUNTRY, COL_DATE, COL_MONTH, COL_PRED_VIO, COL_STATUS, COL_YEAR};
use crate::error::{Result, RiskError};
use crate::types::{Covariate, CountryRiskRow, UpcomingElectionRow};

const NEXT_ELECTION_COLUMN: &str = "next_election";

/// `date,status,country,pred_vio`, the table the bar chart is drawn from.
///
/// The header is always written, so an empty view yields a header-only file.
pub fn upcoming_csv(rows: &[UpcomingElectionRow]) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer.write_record([COL_DATE, COL_STATUS, COL_COUNTRY, COL_PRED_VIO])?;
    for row in rows {
        writer.serialize(row)?;
    }
    finish(writer)
}

/// Latest covariates and score per country with the next election.
pub fn country_csv(rows: &[CountryRiskRow]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    let mut header: Vec<&str> = vec![COL_COUNTRY, COL_YEAR, COL_MONTH];
    header.extend(Covariate::ALL.iter().map(|c| c.column()));
    header.push(COL_PRED_VIO);
    header.push(NEXT_ELECTION_COLUMN);
    writer.write_record(&header)?;

    for row in rows {
        let mut record: Vec<String> = Vec::with_capacity(header.len());
        record.push(row.country.clone());
        record.push(row.period.map(|p| p.year.to_string()).unwrap_or_default());
        record.push(row.period.map(|p| p.month.to_string()).unwrap_or_default());
        for value in row.covariates.values() {
            record.push(value.map(|v| v.to_string()).unwrap_or_default());
        }
        record.push(row.pred_vio.to_string());
        record.push(row.next_election.to_string());
        writer.write_record(&record)?;
    }
    finish(writer)
}

fn finish(writer: csv::Writer<Vec<u8>>) -> Result<Vec<u8>> {
    writer
        .into_inner()
        .map_err(|e| RiskError::Output(format!("failed to flush CSV: {e}")))
}
