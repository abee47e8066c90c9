use crate::app::ports::{FetchedPayload, SourceFetcherPort};
use crate::config::HttpConfig;
use crate::error::Result;
use reqwest::header::CONTENT_TYPE;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Resolves `http(s)://` locations with a blocking reqwest client and
/// everything else (including `file://`) as a local path.
pub struct ReqwestFetcher {
    client: reqwest::blocking::Client,
}

impl ReqwestFetcher {
    pub fn new(config: &HttpConfig) -> Result<Self> {
        let mut builder = reqwest::blocking::Client::builder().user_agent(config.user_agent.clone());
        if let Some(secs) = config.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(secs));
        } else {
            builder = builder.timeout(None::<Duration>);
        }
        let client = builder.build()?;
        Ok(Self { client })
    }

    fn fetch_http(&self, url: &str) -> std::result::Result<FetchedPayload, String> {
        let resp = self.client.get(url).send().map_err(|e| e.to_string())?;
        let status = resp.status();
        if !status.is_success() {
            return Err(format!("GET {} returned HTTP {}", url, status.as_u16()));
        }
        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());
        let bytes = resp.bytes().map_err(|e| e.to_string())?.to_vec();
        Ok(FetchedPayload { bytes, content_type })
    }
}

impl SourceFetcherPort for ReqwestFetcher {
    fn fetch(&self, source_name: &str, location: &str) -> std::result::Result<FetchedPayload, String> {
        if is_http(location) {
            debug!(source = source_name, url = location, "fetching over HTTP");
            self.fetch_http(location)
        } else {
            let path = location.strip_prefix("file://").unwrap_or(location);
            debug!(source = source_name, path, "reading local file");
            read_local(Path::new(path))
        }
    }
}

fn is_http(location: &str) -> bool {
    let lower = location.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

fn read_local(path: &Path) -> std::result::Result<FetchedPayload, String> {
    let bytes = fs::read(path).map_err(|e| format!("{}: {}", path.display(), e))?;
    Ok(FetchedPayload {
        bytes,
        content_type: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognises_http_locations() {
        assert!(is_http("https://example.com/a.csv"));
        assert!(is_http("HTTP://example.com/a.csv"));
        assert!(!is_http("data/a.csv"));
        assert!(!is_http("file:///tmp/a.csv"));
    }

    #[test]
    fn reads_local_and_file_url_paths() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dates.csv");
        fs::write(&path, "country,date,status\n").unwrap();

        let fetcher = ReqwestFetcher::new(&HttpConfig::default()).unwrap();
        let plain = fetcher.fetch("dates", path.to_str().unwrap()).unwrap();
        assert_eq!(plain.bytes, b"country,date,status\n");

        let url = format!("file://{}", path.display());
        let via_url = fetcher.fetch("dates", &url).unwrap();
        assert_eq!(via_url.bytes, plain.bytes);
    }

    #[test]
    fn missing_local_file_is_an_error() {
        let fetcher = ReqwestFetcher::new(&HttpConfig::default()).unwrap();
        let err = fetcher.fetch("dates", "/nonexistent/dates.csv").unwrap_err();
        assert!(err.contains("/nonexistent/dates.csv"));
    }
}
