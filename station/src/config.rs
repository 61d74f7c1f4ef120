//! Typed settings persisted to `nustatymai.txt` as `KEY=VALUE` lines.
//!
//! Malformed lines keep the default, unknown keys are ignored, floats
//! accept a comma decimal separator. Saving rewrites the whole file;
//! applying swaps the in-memory snapshot only after the file write.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// When the SDR capture child runs relative to the pass window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureMode {
    /// Spawn before AOS, terminate after LOS plus the tail.
    Start,
    /// Run as a blocking decode step after LOS.
    End,
}

impl fmt::Display for CaptureMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureMode::Start => write!(f, "start"),
            CaptureMode::End => write!(f, "end"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(rename = "LANG")]
    pub lang: String,
    #[serde(rename = "TLE_URL")]
    pub tle_url: String,
    #[serde(rename = "USE_MANUAL_TLE")]
    pub use_manual_tle: u8,
    #[serde(rename = "KOORD_LAT")]
    pub lat: f64,
    #[serde(rename = "KOORD_LON")]
    pub lon: f64,
    #[serde(rename = "SERIAL_PORT")]
    pub serial_port: String,
    #[serde(rename = "BAUDRATE")]
    pub baudrate: u32,
    #[serde(rename = "UPDATE_INTERVAL")]
    pub update_interval: u64,
    #[serde(rename = "ALTITUDE_LIMIT")]
    pub altitude_limit: f64,
    #[serde(rename = "HTTP_PORT")]
    pub http_port: u16,
    #[serde(rename = "NUOTRAUKU_KATALOGAS")]
    pub gallery_dir: String,
    #[serde(rename = "SATDUMP_SOURCE")]
    pub satdump_source: String,
    #[serde(rename = "SATDUMP_RATE")]
    pub satdump_rate: u32,
    #[serde(rename = "SATDUMP_DEVICE_ARGS")]
    pub satdump_device_args: String,
    #[serde(rename = "SATDUMP_MODE")]
    pub satdump_mode: CaptureMode,
    #[serde(rename = "SATDUMP_LEAD")]
    pub satdump_lead: u64,
    #[serde(rename = "SATDUMP_TAIL")]
    pub satdump_tail: u64,
    #[serde(rename = "GALLERY_KEEP_DAYS")]
    pub gallery_keep_days: i64,
    #[serde(rename = "TIMEZONE")]
    pub timezone: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            lang: "lt".to_string(),
            tle_url: "http://192.168.1.64/tle.txt".to_string(),
            use_manual_tle: 0,
            lat: 55.57,
            lon: 24.25,
            serial_port: "/dev/ttyACM0".to_string(),
            baudrate: 9600,
            update_interval: 5,
            altitude_limit: 0.0,
            http_port: 8089,
            gallery_dir: "nuotraukos".to_string(),
            satdump_source: "rtlsdr".to_string(),
            satdump_rate: 2_400_000,
            satdump_device_args: "index=0,ppm=0,gain=49.6".to_string(),
            satdump_mode: CaptureMode::Start,
            satdump_lead: 10,
            satdump_tail: 120,
            gallery_keep_days: 0,
            timezone: "Europe/Vilnius".to_string(),
        }
    }
}

/// Integers tolerate `_` separators and float notation ("2_400_000", "5.0").
fn parse_int(raw: &str) -> Option<i64> {
    raw.trim()
        .replace('_', "")
        .replace(',', ".")
        .parse::<f64>()
        .ok()
        .map(|f| f as i64)
}

/// Floats accept `,` as the decimal separator.
fn parse_float(raw: &str) -> Option<f64> {
    raw.trim().replace(',', ".").parse::<f64>().ok()
}

fn parse_flag(raw: &str) -> Option<u8> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(1),
        "0" | "false" | "off" | "no" | "" => Some(0),
        _ => None,
    }
}

impl Settings {
    /// Apply one `KEY=VALUE` pair; unparseable values keep the current one.
    pub fn apply_kv(&mut self, key: &str, raw: &str) {
        let raw = raw.trim();
        match key {
            "LANG" => {
                let lang = raw.to_ascii_lowercase();
                if lang == "lt" || lang == "en" {
                    self.lang = lang;
                }
            }
            "TLE_URL" => self.tle_url = raw.to_string(),
            "USE_MANUAL_TLE" => {
                if let Some(v) = parse_flag(raw) {
                    self.use_manual_tle = v;
                }
            }
            "KOORD_LAT" => {
                if let Some(v) = parse_float(raw) {
                    self.lat = v;
                }
            }
            "KOORD_LON" => {
                if let Some(v) = parse_float(raw) {
                    self.lon = v;
                }
            }
            "SERIAL_PORT" => self.serial_port = raw.to_string(),
            "BAUDRATE" => {
                if let Some(v) = parse_int(raw) {
                    self.baudrate = v as u32;
                }
            }
            "UPDATE_INTERVAL" => {
                if let Some(v) = parse_int(raw) {
                    self.update_interval = (v.max(1)) as u64;
                }
            }
            "ALTITUDE_LIMIT" => {
                if let Some(v) = parse_float(raw) {
                    self.altitude_limit = v;
                }
            }
            "HTTP_PORT" => {
                if let Some(v) = parse_int(raw) {
                    self.http_port = v as u16;
                }
            }
            "NUOTRAUKU_KATALOGAS" => self.gallery_dir = raw.to_string(),
            "SATDUMP_SOURCE" => self.satdump_source = raw.to_string(),
            "SATDUMP_RATE" => {
                if let Some(v) = parse_int(raw) {
                    self.satdump_rate = v as u32;
                }
            }
            "SATDUMP_DEVICE_ARGS" => self.satdump_device_args = raw.to_string(),
            "SATDUMP_MODE" => match raw.to_ascii_lowercase().as_str() {
                "start" => self.satdump_mode = CaptureMode::Start,
                "end" => self.satdump_mode = CaptureMode::End,
                _ => {}
            },
            "SATDUMP_LEAD" => {
                if let Some(v) = parse_int(raw) {
                    self.satdump_lead = v.max(0) as u64;
                }
            }
            "SATDUMP_TAIL" => {
                if let Some(v) = parse_int(raw) {
                    self.satdump_tail = v.max(0) as u64;
                }
            }
            "GALLERY_KEEP_DAYS" => {
                if let Some(v) = parse_int(raw) {
                    self.gallery_keep_days = v;
                }
            }
            "TIMEZONE" => {
                if !raw.is_empty() {
                    self.timezone = raw.to_string();
                }
            }
            // Unknown keys are ignored.
            _ => {}
        }
    }

    /// Load from disk; a missing or partially malformed file yields the
    /// defaults for the affected keys. Never fails.
    pub fn load(path: &Path) -> Self {
        let mut settings = Self::default();
        let Ok(text) = std::fs::read_to_string(path) else {
            return settings;
        };
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            settings.apply_kv(key.trim(), value);
        }
        settings
    }

    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        std::fs::write(path, self.to_file_string())
    }

    fn to_file_string(&self) -> String {
        let mut out = String::from("# Settings (edited via web)\n");
        for (key, value) in [
            ("LANG", self.lang.clone()),
            ("TLE_URL", self.tle_url.clone()),
            ("USE_MANUAL_TLE", self.use_manual_tle.to_string()),
            ("KOORD_LAT", self.lat.to_string()),
            ("KOORD_LON", self.lon.to_string()),
            ("SERIAL_PORT", self.serial_port.clone()),
            ("BAUDRATE", self.baudrate.to_string()),
            ("UPDATE_INTERVAL", self.update_interval.to_string()),
            ("ALTITUDE_LIMIT", self.altitude_limit.to_string()),
            ("HTTP_PORT", self.http_port.to_string()),
            ("NUOTRAUKU_KATALOGAS", self.gallery_dir.clone()),
            ("SATDUMP_SOURCE", self.satdump_source.clone()),
            ("SATDUMP_RATE", self.satdump_rate.to_string()),
            ("SATDUMP_DEVICE_ARGS", self.satdump_device_args.clone()),
            ("SATDUMP_MODE", self.satdump_mode.to_string()),
            ("SATDUMP_LEAD", self.satdump_lead.to_string()),
            ("SATDUMP_TAIL", self.satdump_tail.to_string()),
            ("GALLERY_KEEP_DAYS", self.gallery_keep_days.to_string()),
            ("TIMEZONE", self.timezone.clone()),
        ] {
            out.push_str(key);
            out.push('=');
            out.push_str(&value);
            out.push('\n');
        }
        out
    }

    /// Apply a settings form submission (string values, checkbox flags).
    pub fn apply_form(&mut self, form: &HashMap<String, String>) {
        for (key, value) in form {
            self.apply_kv(key, value);
        }
    }

    /// Gallery root, absolute or relative to the base directory.
    pub fn gallery_root(&self, base: &Path) -> PathBuf {
        let dir = Path::new(&self.gallery_dir);
        if dir.is_absolute() {
            dir.to_path_buf()
        } else {
            base.join(dir)
        }
    }
}

/// Well-known file locations under the base directory.
#[derive(Debug, Clone)]
pub struct Paths {
    pub base: PathBuf,
}

impl Paths {
    pub fn new(base: PathBuf) -> Self {
        Self { base }
    }

    pub fn settings(&self) -> PathBuf {
        self.base.join("nustatymai.txt")
    }

    pub fn tle(&self) -> PathBuf {
        self.base.join("tle.txt")
    }

    pub fn satlist(&self) -> PathBuf {
        self.base.join("laikai.txt")
    }

    pub fn selection_json(&self) -> PathBuf {
        self.base.join("selection.json")
    }

    pub fn selection_txt(&self) -> PathBuf {
        self.base.join("sekimas.txt")
    }

    pub fn current(&self) -> PathBuf {
        self.base.join("current.json")
    }

    pub fn lang_dir(&self) -> PathBuf {
        self.base.join("kalbos")
    }

    pub fn chart(&self) -> PathBuf {
        self.base.join("elevations.png")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let s = Settings::default();
        assert_eq!(s.lang, "lt");
        assert_eq!(s.http_port, 8089);
        assert_eq!(s.satdump_mode, CaptureMode::Start);
        assert_eq!(s.gallery_keep_days, 0);
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nustatymai.txt");

        let mut s = Settings::default();
        s.lang = "en".to_string();
        s.lat = -12.345;
        s.use_manual_tle = 1;
        s.satdump_mode = CaptureMode::End;
        s.gallery_keep_days = 7;
        s.timezone = "UTC".to_string();

        s.save(&path).unwrap();
        assert_eq!(Settings::load(&path), s);
    }

    #[test]
    fn test_comma_decimal_accepted() {
        let mut s = Settings::default();
        s.apply_kv("KOORD_LAT", "55,57");
        s.apply_kv("KOORD_LON", " 24,25 ");
        assert_eq!(s.lat, 55.57);
        assert_eq!(s.lon, 24.25);
    }

    #[test]
    fn test_malformed_values_keep_defaults() {
        let mut s = Settings::default();
        s.apply_kv("BAUDRATE", "fast");
        s.apply_kv("KOORD_LAT", "north");
        s.apply_kv("SATDUMP_MODE", "sideways");
        s.apply_kv("LANG", "fr");
        assert_eq!(s, Settings::default());
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nustatymai.txt");
        std::fs::write(&path, "MYSTERY=42\nHTTP_PORT=9000\nnot a pair\n").unwrap();

        let s = Settings::load(&path);
        assert_eq!(s.http_port, 9000);
        assert_eq!(s.lang, "lt");
    }

    #[test]
    fn test_checkbox_flag_values() {
        let mut s = Settings::default();
        for v in ["1", "true", "on", "yes"] {
            s.use_manual_tle = 0;
            s.apply_kv("USE_MANUAL_TLE", v);
            assert_eq!(s.use_manual_tle, 1, "value {:?}", v);
        }
        s.apply_kv("USE_MANUAL_TLE", "0");
        assert_eq!(s.use_manual_tle, 0);
    }

    #[test]
    fn test_int_separators() {
        let mut s = Settings::default();
        s.apply_kv("SATDUMP_RATE", "2_400_000");
        assert_eq!(s.satdump_rate, 2_400_000);
    }

    #[test]
    fn test_gallery_root_resolution() {
        let s = Settings::default();
        let base = Path::new("/srv/station");
        assert_eq!(s.gallery_root(base), Path::new("/srv/station/nuotraukos"));

        let mut abs = Settings::default();
        abs.gallery_dir = "/data/passes".to_string();
        assert_eq!(abs.gallery_root(base), Path::new("/data/passes"));
    }
}
