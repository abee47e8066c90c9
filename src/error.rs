use thiserror::Error;

#[derive(Error, Debug)]
pub enum RiskError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("GeoJSON parsing failed: {0}")]
    GeoJson(#[from] geojson::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to ingest source '{source_name}': {message}")]
    Ingestion { source_name: String, message: String },

    #[error("Source '{source_name}' is missing required column(s): {}", columns.join(", "))]
    MissingColumns { source_name: String, columns: Vec<String> },

    #[error("Cannot score: {message} (columns: {}; rows: {})", columns.join(", "), format_rows(rows))]
    ScoringPrecondition {
        message: String,
        columns: Vec<String>,
        rows: Vec<usize>,
    },

    #[error("Cannot fit model: {0}")]
    DegenerateTraining(String),

    #[error("Output error: {0}")]
    Output(String),
}

impl RiskError {
    pub fn ingestion(source_name: &str, message: impl Into<String>) -> Self {
        Self::Ingestion {
            source_name: source_name.to_string(),
            message: message.into(),
        }
    }
}

/// Row lists can run into the thousands; only the head is worth printing.
fn format_rows(rows: &[usize]) -> String {
    const SHOWN: usize = 10;
    if rows.is_empty() {
        return "none".to_string();
    }
    let head: Vec<String> = rows.iter().take(SHOWN).map(|r| r.to_string()).collect();
    if rows.len() > SHOWN {
        format!("{} (+{} more)", head.join(", "), rows.len() - SHOWN)
    } else {
        head.join(", ")
    }
}

pub type Result<T> = std::result::Result<T, RiskError>;
