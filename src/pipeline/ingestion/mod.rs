//! Source ingestion: fetch each table through the fetcher port and parse it
//! into typed records. Schema checks happen here, once, at the boundary.

pub mod boundaries;
pub mod election_dates;
pub mod elvis;
pub mod published;
pub mod reign;

pub use boundaries::parse_boundaries;
pub use election_dates::parse_election_dates;
pub use elvis::parse_elvis;
pub use published::parse_published_upcoming;
pub use reign::parse_reign;

use chrono::NaiveDate;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use tracing::{error, info};

use crate::app::ports::SourceFetcherPort;
use crate::constants::is_missing_cell;
use crate::error::{Result, RiskError};
use crate::observability::metrics;
use crate::pipeline::processing::normalize::parse_date;

/// Fetch one source. Any failure is fatal for the run.
pub fn fetch_source(
    fetcher: &dyn SourceFetcherPort,
    source_name: &str,
    location: &str,
) -> Result<Vec<u8>> {
    info!("📡 Fetching {} from {}", source_name, location);
    match fetcher.fetch(source_name, location) {
        Ok(payload) => {
            metrics::sources::fetch_success(source_name, payload.bytes.len());
            info!(
                source = source_name,
                bytes = payload.bytes.len(),
                sha256 = %sha256_hex(&payload.bytes),
                content_type = payload.content_type.as_deref().unwrap_or("unknown"),
                "✅ Fetched source"
            );
            Ok(payload.bytes)
        }
        Err(message) => {
            metrics::sources::fetch_error(source_name);
            error!(source = source_name, "Fetch failed: {}", message);
            Err(RiskError::ingestion(source_name, message))
        }
    }
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// A delimited table read fully into memory with a header index.
pub(crate) struct CsvTable {
    source_name: String,
    columns: HashMap<String, usize>,
    pub rows: Vec<csv::StringRecord>,
}

impl CsvTable {
    /// A payload with no bytes at all reads as an empty table.
    pub fn parse(source_name: &str, bytes: &[u8]) -> Result<Self> {
        let mut table = Self {
            source_name: source_name.to_string(),
            columns: HashMap::new(),
            rows: Vec::new(),
        };
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(table);
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::Headers)
            .from_reader(bytes);
        let headers = reader
            .headers()
            .map_err(|e| RiskError::ingestion(source_name, format!("bad header: {e}")))?
            .clone();
        for (idx, name) in headers.iter().enumerate() {
            // first occurrence wins for duplicated headers
            table.columns.entry(name.to_string()).or_insert(idx);
        }
        for (i, record) in reader.records().enumerate() {
            let record = record.map_err(|e| {
                RiskError::ingestion(source_name, format!("malformed data row {}: {e}", i + 1))
            })?;
            table.rows.push(record);
        }
        metrics::sources::rows_read(source_name, table.rows.len());
        Ok(table)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() && self.columns.is_empty()
    }

    pub fn column(&self, name: &str) -> Option<usize> {
        self.columns.get(name).copied()
    }

    /// Column indexes for `names`, failing with every missing name at once.
    pub fn require(&self, names: &[&str]) -> Result<Vec<usize>> {
        let missing: Vec<String> = names
            .iter()
            .filter(|n| self.column(n).is_none())
            .map(|n| n.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(RiskError::MissingColumns {
                source_name: self.source_name.clone(),
                columns: missing,
            });
        }
        Ok(names.iter().filter_map(|n| self.column(n)).collect())
    }
}

/// Cell text, or `None` for a missing-value sentinel.
pub(crate) fn cell<'r>(record: &'r csv::StringRecord, idx: Option<usize>) -> Option<&'r str> {
    let value = record.get(idx?)?.trim();
    if is_missing_cell(value) {
        None
    } else {
        Some(value)
    }
}

/// Date cell. Missing-value sentinels read as `None`; any other text that
/// does not parse as a date fails the source, naming the 1-based data row.
pub(crate) fn date_cell(
    source_name: &str,
    column: &str,
    record: &csv::StringRecord,
    idx: Option<usize>,
    row: usize,
) -> Result<Option<NaiveDate>> {
    match cell(record, idx) {
        None => Ok(None),
        Some(text) => parse_date(text).map(Some).ok_or_else(|| {
            RiskError::ingestion(
                source_name,
                format!("data row {row}: unparseable {column} '{text}'"),
            )
        }),
    }
}

pub(crate) fn number(record: &csv::StringRecord, idx: Option<usize>) -> Option<f64> {
    cell(record, idx)
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

/// Integer cell; tolerates float renderings such as `2018.0`.
pub(crate) fn integer(record: &csv::StringRecord, idx: Option<usize>) -> Option<i64> {
    let value = number(record, idx)?;
    if value.fract() == 0.0 {
        Some(value as i64)
    } else {
        None
    }
}

pub(crate) fn flag(record: &csv::StringRecord, idx: Option<usize>) -> bool {
    match cell(record, idx) {
        Some(s) => matches!(s.to_ascii_lowercase().as_str(), "1" | "1.0" | "true" | "yes"),
        None => false,
    }
}
