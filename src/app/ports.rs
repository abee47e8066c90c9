use std::path::PathBuf;

/// Fetches the raw bytes of a source table.
///
/// Implementations decide how a location string is resolved (HTTP URL,
/// local path, in-memory fixture). A failed fetch is fatal for the run.
pub trait SourceFetcherPort {
    fn fetch(&self, source_name: &str, location: &str) -> Result<FetchedPayload, String>;
}

#[derive(Clone, Debug)]
pub struct FetchedPayload {
    pub bytes: Vec<u8>,
    /// Content type when the transport reports one.
    pub content_type: Option<String>,
}

/// Receives finished artifacts (CSV tables, chart/map JSON).
pub trait ArtifactOutputPort {
    /// Persist `bytes` under `file_name`, returning where it went.
    fn write_artifact(&self, file_name: &str, bytes: &[u8]) -> Result<PathBuf, String>;
}
