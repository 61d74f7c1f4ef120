//! TLE catalog store backed by `tle.txt`.
//!
//! The file is repeating 3-line blocks `name\nline1\nline2`, blank lines
//! ignored, no checksum validation beyond block alignment. Writes are
//! atomic (temp file + rename) so readers never see a torn catalog.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

/// Budget for one remote catalog download.
const FETCH_TIMEOUT: Duration = Duration::from_secs(8);

#[derive(Error, Debug)]
pub enum TleError {
    #[error("TLE download failed: {0}")]
    Fetch(#[from] reqwest::Error),
    #[error("no local TLE file at {0}")]
    Missing(PathBuf),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub struct TleStore {
    path: PathBuf,
}

impl TleStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Refresh the local catalog.
    ///
    /// Manual mode just checks the local file. Otherwise the catalog is
    /// downloaded with an 8 s budget; on failure a stale local copy is
    /// kept with a warning, and only the no-local-file case is an error.
    pub async fn refresh(
        &self,
        url: &str,
        manual: bool,
        client: &reqwest::Client,
    ) -> Result<(), TleError> {
        if manual {
            info!("manual TLE mode, using local {:?}", self.path);
            if !self.exists() {
                return Err(TleError::Missing(self.path.clone()));
            }
            return Ok(());
        }

        let fetched = async {
            let response = client
                .get(url)
                .timeout(FETCH_TIMEOUT)
                .send()
                .await?
                .error_for_status()?;
            response.text().await
        }
        .await;

        match fetched {
            Ok(text) => {
                self.save_text(&text)?;
                info!("TLE downloaded from {}", url);
                Ok(())
            }
            Err(e) if self.exists() => {
                warn!("TLE download failed ({}), keeping stale copy", e);
                Ok(())
            }
            Err(e) => Err(TleError::Fetch(e)),
        }
    }

    fn blocks(&self) -> Vec<String> {
        let Ok(text) = std::fs::read_to_string(&self.path) else {
            return Vec::new();
        };
        text.lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Catalog names, in file order.
    pub fn names(&self) -> Vec<String> {
        self.blocks().chunks(3).map(|b| b[0].clone()).collect()
    }

    /// Element lines for `name`, or None when the catalog lacks it.
    pub fn get(&self, name: &str) -> Option<(String, String)> {
        self.blocks()
            .chunks(3)
            .find(|b| b.len() == 3 && b[0] == name)
            .map(|b| (b[1].clone(), b[2].clone()))
    }

    pub fn read_text(&self) -> std::io::Result<String> {
        std::fs::read_to_string(&self.path)
    }

    /// Overwrite the catalog (manual TLE upload), atomically.
    pub fn save_text(&self, text: &str) -> std::io::Result<()> {
        let dir = self.path.parent().unwrap_or_else(|| Path::new("."));
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(text.as_bytes())?;
        tmp.persist(&self.path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "NOAA 19\n1 33591U 09005A   24153.50000000  .00000100  00000-0  60000-4 0  9993\n2 33591  99.0500 200.0000 0014000  90.0000 270.0000 14.12501000790000\n\nMETOP-B\n1 38771U 12049A   24153.50000000  .00000050  00000-0  35000-4 0  9991\n2 38771  98.7000 210.0000 0001500 100.0000 260.0000 14.21477000610000\n";

    fn store_with(text: &str) -> (tempfile::TempDir, TleStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = TleStore::new(dir.path().join("tle.txt"));
        store.save_text(text).unwrap();
        (dir, store)
    }

    #[test]
    fn test_names_from_blocks() {
        let (_dir, store) = store_with(SAMPLE);
        assert_eq!(store.names(), vec!["NOAA 19", "METOP-B"]);
    }

    #[test]
    fn test_get_known_and_unknown() {
        let (_dir, store) = store_with(SAMPLE);
        let (l1, l2) = store.get("METOP-B").unwrap();
        assert!(l1.starts_with("1 38771U"));
        assert!(l2.starts_with("2 38771"));
        assert!(store.get("SPUTNIK").is_none());
    }

    #[test]
    fn test_blank_lines_ignored() {
        let (_dir, store) = store_with("\n\nNOAA 19\nline one\nline two\n\n");
        assert_eq!(store.names(), vec!["NOAA 19"]);
        assert_eq!(
            store.get("NOAA 19"),
            Some(("line one".to_string(), "line two".to_string()))
        );
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = TleStore::new(dir.path().join("tle.txt"));
        assert!(!store.exists());
        assert!(store.names().is_empty());
        assert!(store.get("NOAA 19").is_none());
    }

    #[test]
    fn test_save_overwrites() {
        let (_dir, store) = store_with(SAMPLE);
        store.save_text("X\n1\n2\n").unwrap();
        assert_eq!(store.names(), vec!["X"]);
    }
}
