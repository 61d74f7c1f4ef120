//! Planning-set store: the satellites selected for prediction,
//! persisted to `laikai.txt` under a fixed header line.

use std::path::PathBuf;
use tracing::error;

const HEADER: &str = "Pasirinkti palydovai:";

pub struct SatListStore {
    path: PathBuf,
}

impl SatListStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn read(&self) -> Vec<String> {
        let Ok(text) = std::fs::read_to_string(&self.path) else {
            return Vec::new();
        };
        text.lines()
            .map(str::trim)
            .filter(|l| !l.is_empty() && !l.starts_with("Pasirinkti"))
            .map(str::to_string)
            .collect()
    }

    pub fn write(&self, list: &[String]) -> bool {
        let mut text = String::from(HEADER);
        text.push('\n');
        for name in list {
            text.push_str(name);
            text.push('\n');
        }
        match std::fs::write(&self.path, text) {
            Ok(()) => true,
            Err(e) => {
                error!("failed to write {:?}: {}", self.path, e);
                false
            }
        }
    }
}
