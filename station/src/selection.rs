//! Conflict-selection store: the pass ids the user wants to win overlap
//! groups.
//!
//! `selection.json` is authoritative; `sekimas.txt` is a derived,
//! best-effort mirror written right after the JSON. On load the JSON wins
//! when present and non-empty, otherwise the text mirror is used.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Debug, Serialize, Deserialize)]
struct SelectionDoc {
    #[serde(default)]
    ids: Vec<String>,
    /// Legacy single-id form.
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    updated: Option<String>,
}

pub struct SelectionStore {
    json_path: PathBuf,
    txt_path: PathBuf,
}

impl SelectionStore {
    pub fn new(json_path: PathBuf, txt_path: PathBuf) -> Self {
        Self {
            json_path,
            txt_path,
        }
    }

    fn load_txt(&self) -> Vec<String> {
        let Ok(text) = std::fs::read_to_string(&self.txt_path) else {
            return Vec::new();
        };
        text.lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn load(&self) -> Vec<String> {
        if let Ok(text) = std::fs::read_to_string(&self.json_path) {
            if let Ok(doc) = serde_json::from_str::<SelectionDoc>(&text) {
                let mut ids = doc.ids;
                if ids.is_empty() {
                    if let Some(single) = doc.id {
                        ids.push(single);
                    }
                }
                if !ids.is_empty() {
                    return dedup(ids);
                }
            }
        }
        self.load_txt()
    }

    pub fn as_set(&self) -> HashSet<String> {
        self.load().into_iter().collect()
    }

    /// Persist `ids` (deduplicated, order preserved) and return the stored
    /// list. The text mirror failing is logged, not surfaced.
    pub fn save(&self, ids: &[String]) -> Vec<String> {
        let ids = dedup(ids.iter().map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect());

        let doc = serde_json::json!({
            "ids": ids,
            "updated": chrono::Utc::now().to_rfc3339(),
        });
        if let Err(e) = std::fs::write(&self.json_path, doc.to_string()) {
            error!("failed to write {:?}: {}", self.json_path, e);
        }

        let mut text = String::new();
        for id in &ids {
            text.push_str(id);
            text.push('\n');
        }
        if let Err(e) = std::fs::write(&self.txt_path, text) {
            error!("failed to write {:?}: {}", self.txt_path, e);
        }

        info!("selection updated: {:?}", ids);
        ids
    }

    pub fn add(&self, id: &str) -> Vec<String> {
        let mut ids = self.load();
        if !id.is_empty() && !ids.iter().any(|existing| existing == id) {
            ids.push(id.to_string());
        }
        ids.sort();
        self.save(&ids)
    }

    pub fn remove(&self, id: &str) -> Vec<String> {
        let ids: Vec<String> = self.load().into_iter().filter(|x| x != id).collect();
        self.save(&ids)
    }

    pub fn clear(&self) -> Vec<String> {
        self.save(&[])
    }
}

fn dedup(ids: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    ids.into_iter().filter(|id| seen.insert(id.clone())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(dir: &tempfile::TempDir) -> SelectionStore {
        SelectionStore::new(
            dir.path().join("selection.json"),
            dir.path().join("sekimas.txt"),
        )
    }

    #[test]
    fn test_round_trip_both_files() {
        let dir = tempfile::tempdir().unwrap();
        let s = store(&dir);

        let ids = vec!["20240601_1300_NOAA_19".to_string(), "20240601_1310_METOP-B".to_string()];
        s.save(&ids);
        assert_eq!(s.load(), ids);

        let mirror = std::fs::read_to_string(dir.path().join("sekimas.txt")).unwrap();
        assert_eq!(mirror, "20240601_1300_NOAA_19\n20240601_1310_METOP-B\n");
    }

    #[test]
    fn test_json_wins_over_text() {
        let dir = tempfile::tempdir().unwrap();
        let s = store(&dir);

        std::fs::write(
            dir.path().join("selection.json"),
            r#"{"ids": ["FROM_JSON"], "updated": "2024-06-01T00:00:00Z"}"#,
        )
        .unwrap();
        std::fs::write(dir.path().join("sekimas.txt"), "FROM_TEXT\n").unwrap();

        assert_eq!(s.load(), vec!["FROM_JSON"]);
    }

    #[test]
    fn test_empty_json_falls_back_to_text() {
        let dir = tempfile::tempdir().unwrap();
        let s = store(&dir);

        std::fs::write(dir.path().join("selection.json"), r#"{"ids": []}"#).unwrap();
        std::fs::write(dir.path().join("sekimas.txt"), "FROM_TEXT\n").unwrap();

        assert_eq!(s.load(), vec!["FROM_TEXT"]);
    }

    #[test]
    fn test_legacy_single_id() {
        let dir = tempfile::tempdir().unwrap();
        let s = store(&dir);

        std::fs::write(dir.path().join("selection.json"), r#"{"id": "LEGACY"}"#).unwrap();
        assert_eq!(s.load(), vec!["LEGACY"]);
    }

    #[test]
    fn test_add_remove_clear() {
        let dir = tempfile::tempdir().unwrap();
        let s = store(&dir);

        s.add("B");
        s.add("A");
        s.add("A");
        assert_eq!(s.load(), vec!["A", "B"]);

        s.remove("A");
        assert_eq!(s.load(), vec!["B"]);

        s.clear();
        assert!(s.load().is_empty());
        assert!(s.as_set().is_empty());
    }
}
