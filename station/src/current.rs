//! The `current.json` tracking marker: which pass the antenna is on.
//! An empty id means "not tracking".

use serde::Deserialize;
use std::path::PathBuf;
use tracing::error;

#[derive(Debug, Deserialize)]
struct CurrentDoc {
    #[serde(default)]
    id: String,
}

pub struct CurrentMarker {
    path: PathBuf,
}

impl CurrentMarker {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn read(&self) -> String {
        std::fs::read_to_string(&self.path)
            .ok()
            .and_then(|text| serde_json::from_str::<CurrentDoc>(&text).ok())
            .map(|doc| doc.id)
            .unwrap_or_default()
    }

    pub fn set(&self, id: &str) {
        let doc = serde_json::json!({ "id": id });
        if let Err(e) = std::fs::write(&self.path, doc.to_string()) {
            error!("failed to write {:?}: {}", self.path, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_read() {
        let dir = tempfile::tempdir().unwrap();
        let marker = CurrentMarker::new(dir.path().join("current.json"));

        assert_eq!(marker.read(), "");
        marker.set("20240601_1300_NOAA_19");
        assert_eq!(marker.read(), "20240601_1300_NOAA_19");
        marker.set("");
        assert_eq!(marker.read(), "");
    }

    #[test]
    fn test_garbage_file_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("current.json");
        std::fs::write(&path, "not json").unwrap();
        assert_eq!(CurrentMarker::new(path).read(), "");
    }
}
