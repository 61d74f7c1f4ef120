//! Pass Scheduling Library
//!
//! Data model, 24-hour planner, and deterministic conflict resolution for
//! a single-antenna ground station. Pure logic: orbital propagation enters
//! through the [`planner::EventSource`] seam, so every decision here is
//! reproducible from plain data.

use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub mod planner;
pub mod resolver;

/// Maximum length of the sanitized satellite-name part of a pass id.
const MAX_NAME_LEN: usize = 64;

/// A predicted visibility window for one satellite.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PassWindow {
    pub sat_name: String,
    pub t_rise: DateTime<Utc>,
    pub t_culm: DateTime<Utc>,
    pub t_set: DateTime<Utc>,
    pub max_elev_deg: f64,
}

impl PassWindow {
    /// Stable id: local rise time floored to the minute plus the
    /// sanitized satellite name. Used as directory name and selection key.
    pub fn id(&self, zone: &LocalZone) -> String {
        pass_id(&self.sat_name, zone.to_local(self.t_rise))
    }

    pub fn duration_secs(&self) -> i64 {
        (self.t_set - self.t_rise).num_seconds()
    }
}

/// Overlap-lookup entry for one pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PassStats {
    pub st_unix: f64,
    pub en_unix: f64,
    pub max_elev: f64,
}

/// PassId -> window stats, for O(1) overlap lookups keyed by id.
pub type PassIndex = HashMap<String, PassStats>;

/// Local timezone used for pass-id derivation and display.
///
/// An unknown IANA name degrades to a fixed UTC+3 offset rather than
/// failing startup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LocalZone {
    Named(Tz),
    Fixed(FixedOffset),
}

impl LocalZone {
    pub fn parse(name: &str) -> Self {
        match name.parse::<Tz>() {
            Ok(tz) => LocalZone::Named(tz),
            Err(_) => {
                tracing::warn!("unknown timezone {:?}, falling back to UTC+3", name);
                LocalZone::Fixed(FixedOffset::east_opt(3 * 3600).unwrap())
            }
        }
    }

    pub fn to_local(&self, t: DateTime<Utc>) -> NaiveDateTime {
        match self {
            LocalZone::Named(tz) => t.with_timezone(tz).naive_local(),
            LocalZone::Fixed(offset) => t.with_timezone(offset).naive_local(),
        }
    }

    pub fn now_local(&self) -> NaiveDateTime {
        self.to_local(Utc::now())
    }
}

/// Keep `[A-Za-z0-9_-]`, map spaces to `_`, cap at 64 characters.
pub fn sanitize_name(s: &str) -> String {
    let mut out: String = s
        .trim()
        .chars()
        .map(|c| if c == ' ' { '_' } else { c })
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .collect();
    out.truncate(MAX_NAME_LEN);
    out
}

pub fn pass_id(sat_name: &str, rise_local: NaiveDateTime) -> String {
    format!("{}_{}", rise_local.format("%Y%m%d_%H%M"), sanitize_name(sat_name))
}

/// Build the overlap index for a set of windows.
pub fn build_index(windows: &[PassWindow], zone: &LocalZone) -> PassIndex {
    windows
        .iter()
        .map(|w| {
            (
                w.id(zone),
                PassStats {
                    st_unix: w.t_rise.timestamp() as f64,
                    en_unix: w.t_set.timestamp() as f64,
                    max_elev: w.max_elev_deg,
                },
            )
        })
        .collect()
}
