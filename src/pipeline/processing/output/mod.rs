//! Output assembly: turn fused views into the artifacts the renderers read.
//!
//! Builders here are pure and return bytes; writing goes through the
//! `ArtifactOutputPort` so the same run can target a directory or memory.

pub mod chart;
pub mod map;
pub mod table;

pub use chart::{chart_json, chart_rows, ChartBar};
pub use map::{map_features, map_geojson};
pub use table::{country_csv, upcoming_csv};

use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

use crate::app::ports::ArtifactOutputPort;
use crate::error::{Result, RiskError};
use crate::observability::metrics;
use crate::pipeline::ingestion::sha256_hex;

/// Scale a probability for percentage display. No rounding.
pub fn percent(probability: f64) -> f64 {
    probability * 100.0
}

/// An artifact that has been handed to the output port.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct WrittenArtifact {
    pub file_name: String,
    pub path: PathBuf,
    pub bytes: usize,
    pub sha256: String,
}

pub fn write_artifact(
    port: &dyn ArtifactOutputPort,
    file_name: &str,
    bytes: &[u8],
) -> Result<WrittenArtifact> {
    let path = port
        .write_artifact(file_name, bytes)
        .map_err(|e| RiskError::Output(format!("failed to write {file_name}: {e}")))?;
    let sha256 = sha256_hex(bytes);
    metrics::output::artifact_written(file_name, bytes.len());
    info!(
        file = file_name,
        bytes = bytes.len(),
        sha256 = %sha256,
        "💾 Wrote {}",
        path.display()
    );
    Ok(WrittenArtifact {
        file_name: file_name.to_string(),
        path,
        bytes: bytes.len(),
        sha256,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::in_memory::InMemoryOutput;

    #[test]
    fn percent_is_not_rounded() {
        assert_eq!(percent(0.5), 50.0);
        assert!((percent(0.123456) - 12.3456).abs() < 1e-12);
    }

    #[test]
    fn written_artifact_carries_digest() {
        let output = InMemoryOutput::new();
        let written = write_artifact(&output, "a.csv", b"date\n").unwrap();
        assert_eq!(written.bytes, 5);
        assert_eq!(written.sha256, sha256_hex(b"date\n"));
        assert_eq!(output.get("a.csv").unwrap(), b"date\n".to_vec());
    }
}
