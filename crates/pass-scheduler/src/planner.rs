//! 24-hour pass planning.

use crate::{build_index, LocalZone, PassIndex, PassWindow};
use chrono::{DateTime, Duration, Utc};
use tracing::{info, warn};

/// Planning horizon.
const HORIZON_HOURS: i64 = 24;

/// Source of visibility windows for one satellite by catalog name.
///
/// Returns `None` when the catalog has no element set under `name`.
/// The production implementation wraps the TLE store and the SGP4
/// adapter; tests substitute synthetic windows.
pub trait EventSource {
    fn passes(
        &self,
        name: &str,
        t0: DateTime<Utc>,
        t1: DateTime<Utc>,
    ) -> Option<Vec<PassWindow>>;
}

/// A complete plan: windows ordered by rise time plus the overlap index.
#[derive(Debug, Clone, Default)]
pub struct Plan {
    pub windows: Vec<PassWindow>,
    pub index: PassIndex,
}

/// Predict every pass for the selected satellites over the next 24 hours.
///
/// Unknown names are logged and skipped; a pass rising inside the horizon
/// but setting beyond it is included (the source follows it to its set).
pub fn plan(
    source: &dyn EventSource,
    selected: &[String],
    now: DateTime<Utc>,
    zone: &LocalZone,
) -> Plan {
    let t1 = now + Duration::hours(HORIZON_HOURS);

    let mut windows: Vec<PassWindow> = Vec::new();
    for name in selected {
        match source.passes(name, now, t1) {
            Some(found) => windows.extend(found),
            None => warn!("no TLE for {:?}, skipping", name),
        }
    }

    windows.sort_by_key(|w| w.t_rise);
    let index = build_index(&windows, zone);

    info!(
        "planned {} passes for {} satellites",
        windows.len(),
        selected.len()
    );

    Plan { windows, index }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    struct FakeSource;

    fn window(name: &str, rise_min: i64, len_min: i64, max_elev: f64) -> PassWindow {
        let base = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let t_rise = base + Duration::minutes(rise_min);
        PassWindow {
            sat_name: name.to_string(),
            t_rise,
            t_culm: t_rise + Duration::minutes(len_min / 2),
            t_set: t_rise + Duration::minutes(len_min),
            max_elev_deg: max_elev,
        }
    }

    impl EventSource for FakeSource {
        fn passes(
            &self,
            name: &str,
            _t0: DateTime<Utc>,
            _t1: DateTime<Utc>,
        ) -> Option<Vec<PassWindow>> {
            match name {
                // Deliberately out of rise order.
                "NOAA 19" => Some(vec![window("NOAA 19", 600, 12, 40.0), window("NOAA 19", 90, 10, 25.0)]),
                "METOP-B" => Some(vec![window("METOP-B", 300, 9, 55.0)]),
                "EMPTY" => Some(vec![]),
                _ => None,
            }
        }
    }

    #[test]
    fn test_plan_sorted_by_rise() {
        let zone = LocalZone::parse("UTC");
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let selected = vec!["NOAA 19".to_string(), "METOP-B".to_string()];

        let plan = plan(&FakeSource, &selected, now, &zone);
        assert_eq!(plan.windows.len(), 3);
        for w in plan.windows.windows(2) {
            assert!(w[0].t_rise <= w[1].t_rise);
        }
        assert_eq!(plan.index.len(), 3);
    }

    #[test]
    fn test_plan_skips_unknown_names() {
        let zone = LocalZone::parse("UTC");
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let selected = vec![
            "NO SUCH BIRD".to_string(),
            "EMPTY".to_string(),
            "METOP-B".to_string(),
        ];

        let plan = plan(&FakeSource, &selected, now, &zone);
        assert_eq!(plan.windows.len(), 1);
        assert_eq!(plan.windows[0].sat_name, "METOP-B");
    }
}
