use crate::app::ports::ArtifactOutputPort;
use std::fs;
use std::path::PathBuf;
use tracing::debug;

/// Writes artifacts into a single output directory, replacing earlier runs.
pub struct FileOutputAdapter {
    dir: PathBuf,
}

impl FileOutputAdapter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl ArtifactOutputPort for FileOutputAdapter {
    fn write_artifact(&self, file_name: &str, bytes: &[u8]) -> Result<PathBuf, String> {
        fs::create_dir_all(&self.dir)
            .map_err(|e| format!("creating {}: {}", self.dir.display(), e))?;
        let path = self.dir.join(file_name);
        fs::write(&path, bytes).map_err(|e| format!("writing {}: {}", path.display(), e))?;
        debug!("Wrote {} ({} bytes)", path.display(), bytes.len());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creates_directory_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let adapter = FileOutputAdapter::new(dir.path().join("nested"));

        let first = adapter.write_artifact("a.csv", b"one").unwrap();
        let second = adapter.write_artifact("a.csv", b"two").unwrap();
        assert_eq!(first, second);
        assert_eq!(fs::read(&second).unwrap(), b"two");
    }
}
