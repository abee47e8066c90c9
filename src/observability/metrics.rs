//! Metric names and recording helpers for each pipeline stage.
//!
//! Recording goes through the `metrics` facade; without an installed
//! recorder every call is a no-op.

use std::fmt;

/// Every metric the pipeline records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricName {
    // Sources
    SourcesFetchSuccess,
    SourcesFetchError,
    SourcesPayloadBytes,
    SourcesRowsRead,
    SourcesRowsDropped,

    // Normalize
    NormalizeUnmappedNames,

    // Fusion
    FusionRowsOut,
    FusionUnmatchedRows,

    // Scoring
    ScoringTrainingRows,
    ScoringRowsScored,
    ScoringIterations,

    // Output
    OutputArtifactsWritten,
    OutputArtifactBytes,
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl MetricName {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::SourcesFetchSuccess => "risk_sources_fetch_success_total",
            MetricName::SourcesFetchError => "risk_sources_fetch_error_total",
            MetricName::SourcesPayloadBytes => "risk_sources_payload_bytes",
            MetricName::SourcesRowsRead => "risk_sources_rows_read_total",
            MetricName::SourcesRowsDropped => "risk_sources_rows_dropped_total",
            MetricName::NormalizeUnmappedNames => "risk_unmapped_country_names_total",
            MetricName::FusionRowsOut => "risk_fusion_rows_out_total",
            MetricName::FusionUnmatchedRows => "risk_fusion_unmatched_rows_total",
            MetricName::ScoringTrainingRows => "risk_scoring_training_rows",
            MetricName::ScoringRowsScored => "risk_scoring_rows_scored_total",
            MetricName::ScoringIterations => "risk_scoring_iterations",
            MetricName::OutputArtifactsWritten => "risk_output_artifacts_written_total",
            MetricName::OutputArtifactBytes => "risk_output_artifact_bytes",
        }
    }
}

pub mod sources {
    use super::MetricName;

    pub fn fetch_success(source: &str, bytes: usize) {
        metrics::counter!(MetricName::SourcesFetchSuccess.as_str(), "source" => source.to_string())
            .increment(1);
        metrics::histogram!(MetricName::SourcesPayloadBytes.as_str(), "source" => source.to_string())
            .record(bytes as f64);
    }

    pub fn fetch_error(source: &str) {
        metrics::counter!(MetricName::SourcesFetchError.as_str(), "source" => source.to_string())
            .increment(1);
    }

    pub fn rows_read(source: &str, rows: usize) {
        metrics::counter!(MetricName::SourcesRowsRead.as_str(), "source" => source.to_string())
            .increment(rows as u64);
    }

    pub fn rows_dropped(source: &str, rows: usize) {
        metrics::counter!(MetricName::SourcesRowsDropped.as_str(), "source" => source.to_string())
            .increment(rows as u64);
    }
}

pub mod normalize {
    use super::MetricName;

    pub fn unmapped_name(source: &str) {
        metrics::counter!(MetricName::NormalizeUnmappedNames.as_str(), "source" => source.to_string())
            .increment(1);
    }
}

pub mod fusion {
    use super::MetricName;

    pub fn rows_out(view: &'static str, rows: usize) {
        metrics::counter!(MetricName::FusionRowsOut.as_str(), "view" => view).increment(rows as u64);
    }

    pub fn unmatched_rows(view: &'static str, rows: usize) {
        metrics::counter!(MetricName::FusionUnmatchedRows.as_str(), "view" => view)
            .increment(rows as u64);
    }
}

pub mod scoring {
    use super::MetricName;

    pub fn training_rows(rows: usize) {
        metrics::histogram!(MetricName::ScoringTrainingRows.as_str()).record(rows as f64);
    }

    pub fn rows_scored(rows: usize) {
        metrics::counter!(MetricName::ScoringRowsScored.as_str()).increment(rows as u64);
    }

    pub fn iterations(iterations: usize) {
        metrics::histogram!(MetricName::ScoringIterations.as_str()).record(iterations as f64);
    }
}

pub mod output {
    use super::MetricName;

    pub fn artifact_written(file_name: &str, bytes: usize) {
        metrics::counter!(MetricName::OutputArtifactsWritten.as_str(), "file" => file_name.to_string())
            .increment(1);
        metrics::histogram!(MetricName::OutputArtifactBytes.as_str(), "file" => file_name.to_string())
            .record(bytes as f64);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metric_names_are_prefixed() {
        for name in [
            MetricName::SourcesFetchSuccess,
            MetricName::NormalizeUnmappedNames,
            MetricName::FusionRowsOut,
            MetricName::ScoringRowsScored,
        ] {
            assert!(name.to_string().starts_with("risk_"));
        }
    }

    #[test]
    fn recording_without_recorder_is_noop() {
        sources::fetch_success("elvis", 10);
        normalize::unmapped_name("reign");
        fusion::rows_out("country", 3);
        scoring::iterations(7);
        output::artifact_written("risk_map.geojson", 128);
    }
}
