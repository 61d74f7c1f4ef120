//! Gallery store: per-pass capture directories, metadata sidecars,
//! thumbnails, and retention cleanup.
//!
//! A pass directory is sealed by writing `meta.json` last, so its presence
//! is the commit marker for "pass completed"; directories without it are
//! tolerated everywhere.

use chrono::NaiveDateTime;
use pass_scheduler::LocalZone;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{info, warn};

pub const THUMB_SIZE: u32 = 300;
const THUMBS_DIR: &str = "_thumbs";
const IMAGE_EXTS: [&str; 3] = ["png", "jpg", "jpeg"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PassMeta {
    pub satellite: String,
    pub start_local: String,
    pub end_local: String,
    pub created_utc: String,
}

#[derive(Debug, Clone)]
pub struct GalleryPass {
    pub dir: PathBuf,
    pub name: String,
    pub meta: Option<PassMeta>,
    pub thumbs: Vec<PathBuf>,
    pub images: Vec<PathBuf>,
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct CleanupStats {
    pub deleted: usize,
    pub kept: usize,
    pub scanned: usize,
    pub skipped_current: usize,
}

pub struct GalleryStore {
    root: PathBuf,
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

impl GalleryStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn pass_dir(&self, pass_id: &str) -> PathBuf {
        self.root.join(pass_id)
    }

    /// Scan the gallery, newest first: `meta.start_local` when parseable,
    /// directory name otherwise.
    pub fn list_passes(&self) -> Vec<GalleryPass> {
        let Ok(entries) = std::fs::read_dir(&self.root) else {
            return Vec::new();
        };

        let mut passes: Vec<GalleryPass> = entries
            .flatten()
            .filter(|e| e.path().is_dir())
            .map(|e| {
                let dir = e.path();
                let name = e.file_name().to_string_lossy().into_owned();
                let meta = std::fs::read_to_string(dir.join("meta.json"))
                    .ok()
                    .and_then(|text| serde_json::from_str(&text).ok());

                let mut thumbs: Vec<PathBuf> = std::fs::read_dir(dir.join(THUMBS_DIR))
                    .map(|it| it.flatten().map(|t| t.path()).collect())
                    .unwrap_or_default();
                thumbs.sort();

                let mut images: Vec<PathBuf> = std::fs::read_dir(&dir)
                    .map(|it| {
                        it.flatten()
                            .map(|f| f.path())
                            .filter(|p| p.is_file() && is_image(p))
                            .collect()
                    })
                    .unwrap_or_default();
                images.sort();

                GalleryPass {
                    dir,
                    name,
                    meta,
                    thumbs,
                    images,
                }
            })
            .collect();

        passes.sort_by_key(|p| {
            std::cmp::Reverse(
                p.meta
                    .as_ref()
                    .map(|m| m.start_local.clone())
                    .unwrap_or_else(|| p.name.clone()),
            )
        });
        passes
    }

    /// Seal marker; written last at track end.
    pub fn write_meta(&self, pass_dir: &Path, meta: &PassMeta) -> std::io::Result<()> {
        let text = serde_json::to_string_pretty(meta)?;
        std::fs::write(pass_dir.join("meta.json"), text)
    }

    /// Regenerate 300x300 center-cropped thumbnails for every image in the
    /// pass tree (excluding `_thumbs/` itself) that is missing a thumb or
    /// whose thumb is older than the source.
    pub fn generate_thumbs(&self, pass_dir: &Path) {
        let thumbs_dir = pass_dir.join(THUMBS_DIR);
        if let Err(e) = std::fs::create_dir_all(&thumbs_dir) {
            warn!("cannot create {:?}: {}", thumbs_dir, e);
            return;
        }

        let mut sources = Vec::new();
        collect_images(pass_dir, &mut sources);

        for src in sources {
            let Some(file_name) = src.file_name() else {
                continue;
            };
            let dst = thumbs_dir.join(file_name);
            if !thumb_is_stale(&src, &dst) {
                continue;
            }
            if let Err(e) = make_thumb(&src, &dst) {
                warn!("thumbnail failed for {:?}: {}", src, e);
            }
        }
    }

    /// Delete pass directories whose local start time is older than
    /// `now_local - days`. The current pass is never deleted; directories
    /// with no determinable start time are kept.
    pub fn cleanup(&self, days: i64, current_id: &str, zone: &LocalZone) -> CleanupStats {
        let mut stats = CleanupStats::default();
        if days <= 0 {
            return stats;
        }
        let Ok(entries) = std::fs::read_dir(&self.root) else {
            return stats;
        };

        let cutoff = zone.now_local() - chrono::Duration::days(days);

        for entry in entries.flatten() {
            let dir = entry.path();
            if !dir.is_dir() {
                continue;
            }
            stats.scanned += 1;

            let name = entry.file_name().to_string_lossy().into_owned();
            if !current_id.is_empty() && name == current_id {
                stats.skipped_current += 1;
                stats.kept += 1;
                continue;
            }

            match pass_start_local(&dir, zone) {
                Some(start) if start < cutoff => match std::fs::remove_dir_all(&dir) {
                    Ok(()) => stats.deleted += 1,
                    Err(e) => {
                        warn!("cleanup failed to remove {:?}: {}", dir, e);
                        stats.kept += 1;
                    }
                },
                _ => stats.kept += 1,
            }
        }

        info!(
            "cleanup days={} deleted={} kept={} scanned={} skipped_current={}",
            days, stats.deleted, stats.kept, stats.scanned, stats.skipped_current
        );
        stats
    }
}

fn collect_images(dir: &Path, out: &mut Vec<PathBuf>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            if entry.file_name() != THUMBS_DIR {
                collect_images(&path, out);
            }
        } else if is_image(&path) {
            out.push(path);
        }
    }
}

fn mtime(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}

fn thumb_is_stale(src: &Path, dst: &Path) -> bool {
    match (mtime(src), mtime(dst)) {
        (_, None) => true,
        (Some(s), Some(d)) => d < s,
        (None, Some(_)) => false,
    }
}

fn make_thumb(src: &Path, dst: &Path) -> image::ImageResult<()> {
    let img = image::open(src)?;
    let (w, h) = (img.width(), img.height());
    let side = w.min(h);
    let cropped = img.crop_imm((w - side) / 2, (h - side) / 2, side, side);
    let thumb = cropped.resize_exact(THUMB_SIZE, THUMB_SIZE, image::imageops::FilterType::Lanczos3);
    thumb.save(dst)
}

/// Local start time of a pass directory: `meta.start_local`, else the
/// newest file mtime in the tree, else the directory mtime.
fn pass_start_local(dir: &Path, zone: &LocalZone) -> Option<NaiveDateTime> {
    if let Ok(text) = std::fs::read_to_string(dir.join("meta.json")) {
        if let Ok(meta) = serde_json::from_str::<PassMeta>(&text) {
            if let Ok(start) = meta.start_local.parse::<NaiveDateTime>() {
                return Some(start);
            }
        }
    }

    let mut newest: Option<SystemTime> = None;
    let mut stack = vec![dir.to_path_buf()];
    while let Some(d) = stack.pop() {
        let Ok(entries) = std::fs::read_dir(&d) else {
            continue;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                stack.push(path);
            } else if let Some(m) = mtime(&path) {
                newest = Some(newest.map_or(m, |n: SystemTime| n.max(m)));
            }
        }
    }

    newest
        .or_else(|| mtime(dir))
        .map(|t| zone.to_local(chrono::DateTime::<chrono::Utc>::from(t)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(sat: &str, start: &str) -> PassMeta {
        PassMeta {
            satellite: sat.to_string(),
            start_local: start.to_string(),
            end_local: start.to_string(),
            created_utc: "2024-06-01T10:15:00+00:00".to_string(),
        }
    }

    #[test]
    fn test_meta_round_trip_and_sort() {
        let dir = tempfile::tempdir().unwrap();
        let store = GalleryStore::new(dir.path().to_path_buf());

        for (name, start) in [
            ("20240601_1300_NOAA_19", "2024-06-01T13:00:00"),
            ("20240603_0900_METOP-B", "2024-06-03T09:00:00"),
        ] {
            let pass_dir = store.pass_dir(name);
            std::fs::create_dir_all(&pass_dir).unwrap();
            store.write_meta(&pass_dir, &meta("X", start)).unwrap();
        }
        // No meta: sorts by directory name.
        std::fs::create_dir_all(store.pass_dir("20240602_1200_ISS")).unwrap();

        let passes = store.list_passes();
        let names: Vec<&str> = passes.iter().map(|p| p.name.as_str()).collect();
        // Meta-less dirs key by name; "2024…" sorts above "2024-…".
        assert_eq!(
            names,
            vec![
                "20240602_1200_ISS",
                "20240603_0900_METOP-B",
                "20240601_1300_NOAA_19"
            ]
        );
        assert!(passes[0].meta.is_none());
    }

    #[test]
    fn test_thumbnail_generation() {
        let dir = tempfile::tempdir().unwrap();
        let store = GalleryStore::new(dir.path().to_path_buf());
        let pass_dir = store.pass_dir("20240601_1300_NOAA_19");
        std::fs::create_dir_all(&pass_dir).unwrap();

        let img = image::RgbImage::from_pixel(40, 20, image::Rgb([200, 10, 10]));
        img.save(pass_dir.join("apt.png")).unwrap();
        std::fs::write(pass_dir.join("notes.txt"), "not an image").unwrap();

        store.generate_thumbs(&pass_dir);

        let thumb = image::open(pass_dir.join("_thumbs").join("apt.png")).unwrap();
        assert_eq!((thumb.width(), thumb.height()), (THUMB_SIZE, THUMB_SIZE));
        assert!(!pass_dir.join("_thumbs").join("notes.txt").exists());
    }

    #[test]
    fn test_cleanup_skips_current_and_fresh() {
        let dir = tempfile::tempdir().unwrap();
        let store = GalleryStore::new(dir.path().to_path_buf());
        let zone = LocalZone::parse("UTC");

        let old_current = store.pass_dir("20200101_0800_NOAA_19");
        let old_other = store.pass_dir("20200101_0900_METOP-B");
        let fresh = store.pass_dir("20990101_0900_ISS");
        for d in [&old_current, &old_other, &fresh] {
            std::fs::create_dir_all(d).unwrap();
        }
        store
            .write_meta(&old_current, &meta("NOAA 19", "2020-01-01T08:00:00"))
            .unwrap();
        store
            .write_meta(&old_other, &meta("METOP-B", "2020-01-01T09:00:00"))
            .unwrap();
        store
            .write_meta(&fresh, &meta("ISS", "2099-01-01T09:00:00"))
            .unwrap();

        let stats = store.cleanup(30, "20200101_0800_NOAA_19", &zone);

        assert!(old_current.exists(), "current pass must survive");
        assert!(!old_other.exists(), "stale pass should be deleted");
        assert!(fresh.exists());
        assert_eq!(stats.deleted, 1);
        assert_eq!(stats.skipped_current, 1);
        assert_eq!(stats.scanned, 3);
    }

    #[test]
    fn test_cleanup_keeps_fresh_metaless_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let store = GalleryStore::new(dir.path().to_path_buf());
        let zone = LocalZone::parse("UTC");

        // Just created: newest-mtime fallback dates it to now, so it stays.
        let metaless = store.pass_dir("mystery_dir");
        std::fs::create_dir_all(&metaless).unwrap();
        std::fs::write(metaless.join("file.png"), b"stub").unwrap();

        let stats = store.cleanup(30, "", &zone);
        assert!(metaless.exists());
        assert_eq!(stats.deleted, 0);
        assert_eq!(stats.kept, 1);
    }

    #[test]
    fn test_cleanup_disabled() {
        let dir = tempfile::tempdir().unwrap();
        let store = GalleryStore::new(dir.path().to_path_buf());
        let zone = LocalZone::parse("UTC");
        let stats = store.cleanup(0, "", &zone);
        assert_eq!(stats.scanned, 0);
    }
}
