//! Translation catalogs loaded from `kalbos/{lt,en}.txt`.
//!
//! Files are `key=value` pairs, UTF-8, `#` comments ignored. Missing files
//! are seeded on startup. Non-English catalogs fall back key-by-key to the
//! English one so a partially translated file still renders.

use std::collections::HashMap;
use std::path::Path;
use tracing::{info, warn};

const SEED_LT: &[(&str, &str)] = &[
    ("nav_laikai", "Laikai"),
    ("nav_galerija", "Galerija"),
    ("nav_nustatymai", "Nustatymai"),
    ("nav_local_time", "Vietos laikas"),
    ("h2_laikai", "Sekimo langai (vietiniu laiku)"),
    ("legend_conflict", "Konfliktinis laikas"),
    ("tbl_satellite", "Palydovas"),
    ("tbl_aos", "Pasirodymas"),
    ("tbl_los", "Pasislepimas"),
    ("tbl_maxelev", "Maks. elevacija"),
    ("badge_conflict", "Konfliktas"),
    ("follow", "Sekti"),
    ("recent_passes", "Paskutiniai praejimai"),
    ("gallery_title", "Galerija"),
    ("settings_title", "Nustatymai"),
    ("btn_save", "Issaugoti"),
    ("replan_button", "Perplanuoti"),
    ("manual_tle_title", "Rankinis TLE"),
    ("satlist_title", "Palydovu sarasas (laikai.txt)"),
    ("search_placeholder", "Ieskoti TLE pavadinimo..."),
    ("current_list_label", "Dabartinis sarasas (laikai.txt)"),
    ("list_empty", "Sarasas tuscias"),
    ("lang_label", "Kalba"),
    ("cleanup_title", "Galerijos valymas"),
    ("cleanup_keep", "Laikyti (dienomis)"),
    ("cleanup_now", "Valyti dabar"),
    ("btn_add", "Prideti"),
    ("btn_remove", "Salinti"),
];

const SEED_EN: &[(&str, &str)] = &[
    ("nav_laikai", "Passes"),
    ("nav_galerija", "Gallery"),
    ("nav_nustatymai", "Settings"),
    ("nav_local_time", "Local time"),
    ("h2_laikai", "Pass windows (local time)"),
    ("legend_conflict", "Conflicting time"),
    ("tbl_satellite", "Satellite"),
    ("tbl_aos", "AOS"),
    ("tbl_los", "LOS"),
    ("tbl_maxelev", "Max elevation"),
    ("badge_conflict", "Conflict"),
    ("follow", "Follow"),
    ("recent_passes", "Recent passes"),
    ("gallery_title", "Gallery"),
    ("settings_title", "Settings"),
    ("btn_save", "Save"),
    ("replan_button", "Replan"),
    ("manual_tle_title", "Manual TLE"),
    ("satlist_title", "Satellite list (laikai.txt)"),
    ("search_placeholder", "Search TLE name..."),
    ("current_list_label", "Current list (stored to laikai.txt)"),
    ("list_empty", "List is empty"),
    ("lang_label", "Language"),
    ("cleanup_title", "Gallery cleanup"),
    ("cleanup_keep", "Keep (days)"),
    ("cleanup_now", "Clean now"),
    ("btn_add", "Add"),
    ("btn_remove", "Remove"),
];

/// A loaded translation catalog.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    map: HashMap<String, String>,
}

impl Catalog {
    pub fn tr<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.map.get(key).map(String::as_str).unwrap_or(default)
    }
}

/// Write the seed catalogs for any language file that does not exist yet.
pub fn ensure_files(dir: &Path) {
    if let Err(e) = std::fs::create_dir_all(dir) {
        warn!("cannot create language dir {:?}: {}", dir, e);
        return;
    }
    for (code, seed) in [("lt", SEED_LT), ("en", SEED_EN)] {
        let path = dir.join(format!("{}.txt", code));
        if path.is_file() {
            continue;
        }
        let mut text = String::from("# key=value (UTF-8)\n");
        let mut pairs: Vec<_> = seed.to_vec();
        pairs.sort_by_key(|(k, _)| *k);
        for (k, v) in pairs {
            text.push_str(k);
            text.push('=');
            text.push_str(v);
            text.push('\n');
        }
        match std::fs::write(&path, text) {
            Ok(()) => info!("seeded language file {:?}", path),
            Err(e) => warn!("failed to write {:?}: {}", path, e),
        }
    }
}

fn read_pairs(path: &Path) -> HashMap<String, String> {
    let mut map = HashMap::new();
    let Ok(text) = std::fs::read_to_string(path) else {
        return map;
    };
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some((k, v)) = line.split_once('=') {
            map.insert(k.trim().to_string(), v.trim().to_string());
        }
    }
    map
}

/// Load the catalog for `code`, filling gaps from the English file.
pub fn load(dir: &Path, code: &str) -> Catalog {
    let mut map = read_pairs(&dir.join(format!("{}.txt", code)));
    if code != "en" {
        for (k, v) in read_pairs(&dir.join("en.txt")) {
            map.entry(k).or_insert(v);
        }
    }
    Catalog { map }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_and_load() {
        let dir = tempfile::tempdir().unwrap();
        ensure_files(dir.path());

        let lt = load(dir.path(), "lt");
        assert_eq!(lt.tr("nav_galerija", "?"), "Galerija");

        let en = load(dir.path(), "en");
        assert_eq!(en.tr("nav_galerija", "?"), "Gallery");
    }

    #[test]
    fn test_seed_does_not_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lt.txt");
        std::fs::write(&path, "nav_galerija=Custom\n").unwrap();

        ensure_files(dir.path());
        let lt = load(dir.path(), "lt");
        assert_eq!(lt.tr("nav_galerija", "?"), "Custom");
    }

    #[test]
    fn test_english_fallback_fills_gaps() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("lt.txt"), "follow=Sekti\n").unwrap();
        std::fs::write(dir.path().join("en.txt"), "follow=Follow\nbtn_save=Save\n").unwrap();

        let lt = load(dir.path(), "lt");
        assert_eq!(lt.tr("follow", "?"), "Sekti");
        assert_eq!(lt.tr("btn_save", "?"), "Save");
    }

    #[test]
    fn test_unknown_key_uses_default() {
        let catalog = Catalog::default();
        assert_eq!(catalog.tr("missing", "fallback"), "fallback");
    }
}
