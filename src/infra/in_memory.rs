use crate::app::ports::{ArtifactOutputPort, FetchedPayload, SourceFetcherPort};
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::PathBuf;

/// Serves fixed payloads keyed by location. Unknown locations fail the fetch.
#[derive(Debug, Default, Clone)]
pub struct InMemorySources {
    payloads: HashMap<String, Vec<u8>>,
}

impl InMemorySources {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, location: &str, body: impl Into<Vec<u8>>) -> Self {
        self.insert(location, body);
        self
    }

    pub fn insert(&mut self, location: &str, body: impl Into<Vec<u8>>) {
        self.payloads.insert(location.to_string(), body.into());
    }
}

impl SourceFetcherPort for InMemorySources {
    fn fetch(&self, _source_name: &str, location: &str) -> Result<FetchedPayload, String> {
        self.payloads
            .get(location)
            .map(|bytes| FetchedPayload {
                bytes: bytes.clone(),
                content_type: None,
            })
            .ok_or_else(|| format!("no payload registered for '{location}'"))
    }
}

/// Keeps written artifacts in memory.
#[derive(Debug, Default)]
pub struct InMemoryOutput {
    artifacts: RefCell<Vec<(String, Vec<u8>)>>,
}

impl InMemoryOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Latest bytes written under `file_name`.
    pub fn get(&self, file_name: &str) -> Option<Vec<u8>> {
        self.artifacts
            .borrow()
            .iter()
            .rev()
            .find(|(name, _)| name == file_name)
            .map(|(_, bytes)| bytes.clone())
    }

    pub fn file_names(&self) -> Vec<String> {
        self.artifacts.borrow().iter().map(|(n, _)| n.clone()).collect()
    }
}

impl ArtifactOutputPort for InMemoryOutput {
    fn write_artifact(&self, file_name: &str, bytes: &[u8]) -> Result<PathBuf, String> {
        self.artifacts
            .borrow_mut()
            .push((file_name.to_string(), bytes.to_vec()));
        Ok(PathBuf::from(file_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_location_fails() {
        let sources = InMemorySources::new().with("a.csv", "x");
        assert!(sources.fetch("a", "a.csv").is_ok());
        assert!(sources.fetch("b", "b.csv").is_err());
    }

    #[test]
    fn output_returns_latest_write() {
        let output = InMemoryOutput::new();
        output.write_artifact("f", b"1").unwrap();
        output.write_artifact("f", b"2").unwrap();
        assert_eq!(output.get("f").unwrap(), b"2");
        assert_eq!(output.file_names(), vec!["f", "f"]);
    }
}
