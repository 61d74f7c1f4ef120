//! Orbital Geometry Library
//!
//! SGP4 propagation, observer look angles, and rise/culminate/set event
//! search for a fixed ground observer.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GeometryError {
    #[error("Invalid TLE format: {0}")]
    InvalidTle(String),
    #[error("Propagation failed: {0}")]
    PropagationFailed(String),
    #[error("Invalid observer coordinates: lat={0} lon={1}")]
    InvalidObserver(f64, f64),
}

pub type Result<T> = std::result::Result<T, GeometryError>;

/// Coarse scan step for the initial horizon-crossing sweep.
const COARSE_STEP_SECONDS: i64 = 60;
/// Refinement resolution for crossing and culmination times.
const FINE_STEP_SECONDS: i64 = 1;

/// Fixed ground observer (WGS84 surface point, sea level).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observer {
    pub lat_deg: f64,
    pub lon_deg: f64,
}

impl Observer {
    pub fn new(lat_deg: f64, lon_deg: f64) -> Result<Self> {
        if !(-90.0..=90.0).contains(&lat_deg)
            || !(-180.0..=180.0).contains(&lon_deg)
            || !lat_deg.is_finite()
            || !lon_deg.is_finite()
        {
            return Err(GeometryError::InvalidObserver(lat_deg, lon_deg));
        }
        Ok(Self { lat_deg, lon_deg })
    }
}

/// Instantaneous pointing solution from the observer to a satellite.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LookAngles {
    /// Azimuth in degrees, from North clockwise, normalized to [0, 360).
    pub azimuth_deg: f64,
    /// Elevation in degrees above the local horizon; negative below it.
    pub elevation_deg: f64,
    /// Slant range in km.
    pub range_km: f64,
}

/// One complete rise → culminate → set triple.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PassEvent {
    pub t_rise: DateTime<Utc>,
    pub t_culm: DateTime<Utc>,
    pub t_set: DateTime<Utc>,
    pub max_elevation_deg: f64,
}

/// A satellite parsed from a TLE pair, ready to propagate.
pub struct Propagator {
    constants: sgp4::Constants,
    epoch: DateTime<Utc>,
}

impl Propagator {
    pub fn from_tle(line1: &str, line2: &str) -> Result<Self> {
        let elements = sgp4::Elements::from_tle(None, line1.as_bytes(), line2.as_bytes())
            .map_err(|e| GeometryError::InvalidTle(format!("{:?}", e)))?;
        let constants = sgp4::Constants::from_elements(&elements)
            .map_err(|e| GeometryError::PropagationFailed(format!("{:?}", e)))?;
        let epoch = DateTime::<Utc>::from_naive_utc_and_offset(elements.datetime, Utc);
        Ok(Self { constants, epoch })
    }

    /// TEME/ECI position in km at `time`.
    pub fn position_eci(&self, time: DateTime<Utc>) -> Result<[f64; 3]> {
        let duration = time.signed_duration_since(self.epoch);
        let minutes_since_epoch = duration.num_seconds() as f64 / 60.0;

        let prediction = self
            .constants
            .propagate(minutes_since_epoch)
            .map_err(|e| GeometryError::PropagationFailed(format!("{:?}", e)))?;

        Ok(prediction.position)
    }

    /// Az/el/range from `observer` at `time`.
    pub fn look_angles(&self, observer: Observer, time: DateTime<Utc>) -> Result<LookAngles> {
        let eci = self.position_eci(time)?;
        Ok(transforms::look_angles(observer, eci, transforms::gmst_rad(time)))
    }
}

pub mod transforms {
    use super::{LookAngles, Observer};
    use chrono::{DateTime, Utc};

    const EARTH_RADIUS_KM: f64 = 6378.137;
    const EARTH_FLATTENING: f64 = 1.0 / 298.257223563;

    /// Greenwich Mean Sidereal Time in radians (IAU 1982 polynomial).
    pub fn gmst_rad(time: DateTime<Utc>) -> f64 {
        let unix = time.timestamp() as f64 + time.timestamp_subsec_micros() as f64 * 1e-6;
        let jd = unix / 86400.0 + 2440587.5;
        let t = (jd - 2451545.0) / 36525.0;

        let gmst_sec = 67310.54841
            + (876600.0 * 3600.0 + 8640184.812866) * t
            + 0.093104 * t * t
            - 6.2e-6 * t * t * t;

        (gmst_sec.rem_euclid(86400.0) / 86400.0) * 2.0 * std::f64::consts::PI
    }

    /// Observer ECEF position on the WGS84 ellipsoid, sea level.
    pub fn observer_ecef(observer: Observer) -> [f64; 3] {
        let lat = observer.lat_deg.to_radians();
        let lon = observer.lon_deg.to_radians();
        let e2 = 2.0 * EARTH_FLATTENING - EARTH_FLATTENING * EARTH_FLATTENING;

        let n = EARTH_RADIUS_KM / (1.0 - e2 * lat.sin().powi(2)).sqrt();

        [
            n * lat.cos() * lon.cos(),
            n * lat.cos() * lon.sin(),
            n * (1.0 - e2) * lat.sin(),
        ]
    }

    /// Rotate a TEME/ECI vector into ECEF by the Earth rotation angle.
    pub fn eci_to_ecef(eci: [f64; 3], gmst: f64) -> [f64; 3] {
        let (sin_g, cos_g) = gmst.sin_cos();
        [
            cos_g * eci[0] + sin_g * eci[1],
            -sin_g * eci[0] + cos_g * eci[1],
            eci[2],
        ]
    }

    /// Topocentric az/el/range from an observer to a satellite ECI position.
    pub fn look_angles(observer: Observer, sat_eci: [f64; 3], gmst: f64) -> LookAngles {
        let gs = observer_ecef(observer);
        let sat = eci_to_ecef(sat_eci, gmst);

        let dx = sat[0] - gs[0];
        let dy = sat[1] - gs[1];
        let dz = sat[2] - gs[2];
        let range_km = (dx * dx + dy * dy + dz * dz).sqrt();

        let lat = observer.lat_deg.to_radians();
        let lon = observer.lon_deg.to_radians();
        let (sin_lat, cos_lat) = lat.sin_cos();
        let (sin_lon, cos_lon) = lon.sin_cos();

        // East-North-Up rotation of the range vector
        let east = -sin_lon * dx + cos_lon * dy;
        let north = -sin_lat * cos_lon * dx - sin_lat * sin_lon * dy + cos_lat * dz;
        let up = cos_lat * cos_lon * dx + cos_lat * sin_lon * dy + sin_lat * dz;

        let azimuth_deg = east.atan2(north).to_degrees();
        let azimuth_deg = if azimuth_deg < 0.0 {
            azimuth_deg + 360.0
        } else {
            azimuth_deg
        };

        let horiz = (east * east + north * north).sqrt();
        let elevation_deg = up.atan2(horiz).to_degrees();

        LookAngles {
            azimuth_deg,
            elevation_deg,
            range_km,
        }
    }
}

/// Find all complete rise/culminate/set triples in `[t0, t1]`.
///
/// Coarse 60 s sweep with 1 s bisection refinement of the horizon
/// crossings. A pass already in progress at `t0` has no rise event and is
/// dropped; a pass rising inside the window but setting after `t1` is
/// followed until it sets (bounded to one extra hour).
pub fn find_passes(
    prop: &Propagator,
    observer: Observer,
    t0: DateTime<Utc>,
    t1: DateTime<Utc>,
    horizon_deg: f64,
) -> Result<Vec<PassEvent>> {
    let step = Duration::seconds(COARSE_STEP_SECONDS);
    let hard_end = t1 + Duration::hours(1);

    let mut passes = Vec::new();
    let mut cursor = t0;
    let mut prev_visible = prop.look_angles(observer, cursor)?.elevation_deg >= horizon_deg;
    // Visible at t0 means an in-progress pass with no rise event: skip it.
    let mut skipping_initial = prev_visible;
    let mut rise: Option<DateTime<Utc>> = None;
    let mut max_el = f64::NEG_INFINITY;
    let mut t_max = cursor;

    loop {
        cursor += step;
        let in_pass = rise.is_some() || skipping_initial;
        if cursor > hard_end || (cursor > t1 && !in_pass) {
            break;
        }

        let sample = prop.look_angles(observer, cursor)?;
        let visible = sample.elevation_deg >= horizon_deg;

        if visible && !prev_visible {
            if cursor <= t1 {
                rise = Some(refine_rise(prop, observer, cursor - step, cursor, horizon_deg)?);
                max_el = sample.elevation_deg;
                t_max = cursor;
            }
        } else if visible && in_pass {
            if sample.elevation_deg > max_el {
                max_el = sample.elevation_deg;
                t_max = cursor;
            }
        } else if !visible && prev_visible {
            if skipping_initial {
                skipping_initial = false;
            } else if let Some(t_rise) = rise.take() {
                let t_set = refine_set(prop, observer, cursor - step, cursor, horizon_deg)?;
                let (t_culm, max_elevation_deg) =
                    refine_culmination(prop, observer, t_rise, t_set, t_max, max_el)?;
                passes.push(PassEvent {
                    t_rise,
                    t_culm,
                    t_set,
                    max_elevation_deg,
                });
            }
        }

        prev_visible = visible;
    }

    Ok(passes)
}

/// Bisect to the first visible instant in `(lo, hi]` at 1 s resolution.
fn refine_rise(
    prop: &Propagator,
    observer: Observer,
    mut lo: DateTime<Utc>,
    mut hi: DateTime<Utc>,
    horizon_deg: f64,
) -> Result<DateTime<Utc>> {
    while (hi - lo) > Duration::seconds(FINE_STEP_SECONDS) {
        let mid = lo + (hi - lo) / 2;
        if prop.look_angles(observer, mid)?.elevation_deg >= horizon_deg {
            hi = mid;
        } else {
            lo = mid;
        }
    }
    Ok(hi)
}

/// Bisect to the first invisible instant in `(lo, hi]` at 1 s resolution.
fn refine_set(
    prop: &Propagator,
    observer: Observer,
    mut lo: DateTime<Utc>,
    mut hi: DateTime<Utc>,
    horizon_deg: f64,
) -> Result<DateTime<Utc>> {
    while (hi - lo) > Duration::seconds(FINE_STEP_SECONDS) {
        let mid = lo + (hi - lo) / 2;
        if prop.look_angles(observer, mid)?.elevation_deg >= horizon_deg {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    Ok(hi)
}

/// Scan around the coarse maximum for the true culmination instant.
///
/// Clamped strictly inside (t_rise, t_set) so the event triple stays
/// strictly ordered even for grazing passes.
fn refine_culmination(
    prop: &Propagator,
    observer: Observer,
    t_rise: DateTime<Utc>,
    t_set: DateTime<Utc>,
    t_coarse_max: DateTime<Utc>,
    coarse_max_el: f64,
) -> Result<(DateTime<Utc>, f64)> {
    let lo = (t_coarse_max - Duration::seconds(COARSE_STEP_SECONDS)).max(t_rise);
    let hi = (t_coarse_max + Duration::seconds(COARSE_STEP_SECONDS)).min(t_set);

    let mut best_t = t_coarse_max;
    let mut best_el = coarse_max_el;
    let mut t = lo;
    while t <= hi {
        let el = prop.look_angles(observer, t)?.elevation_deg;
        if el > best_el {
            best_el = el;
            best_t = t;
        }
        t += Duration::seconds(FINE_STEP_SECONDS);
    }

    if best_t <= t_rise || best_t >= t_set {
        best_t = t_rise + (t_set - t_rise) / 2;
    }
    Ok((best_t, best_el))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    // Reference ISS element set, epoch 2008-09-20.
    const ISS_LINE1: &str =
        "1 25544U 98067A   08264.51782528 -.00002182  00000-0 -11606-4 0  2927";
    const ISS_LINE2: &str =
        "2 25544  51.6416 247.4627 0006703 130.5360 325.0288 15.72125391563537";

    #[test]
    fn test_observer_bounds() {
        assert!(Observer::new(55.57, 24.25).is_ok());
        assert!(Observer::new(90.0, -180.0).is_ok());
        assert!(Observer::new(90.1, 0.0).is_err());
        assert!(Observer::new(0.0, 200.0).is_err());
        assert!(Observer::new(f64::NAN, 0.0).is_err());
    }

    #[test]
    fn test_invalid_tle_rejected() {
        assert!(Propagator::from_tle("garbage", "lines").is_err());
    }

    #[test]
    fn test_gmst_j2000() {
        // GMST at the J2000 epoch (2000-01-01 12:00 UT) is ~280.46 deg.
        let t = Utc.with_ymd_and_hms(2000, 1, 1, 12, 0, 0).unwrap();
        let gmst_deg = transforms::gmst_rad(t).to_degrees();
        assert!(
            (gmst_deg - 280.46).abs() < 0.1,
            "GMST at J2000 was {:.3}",
            gmst_deg
        );
    }

    #[test]
    fn test_look_angles_overhead() {
        // Observer at the equator/prime meridian, satellite straight up,
        // GMST zero so ECI == ECEF.
        let observer = Observer::new(0.0, 0.0).unwrap();
        let angles = transforms::look_angles(observer, [6878.137, 0.0, 0.0], 0.0);
        assert!(angles.elevation_deg > 89.0, "el={}", angles.elevation_deg);
        assert!((angles.range_km - 500.0).abs() < 30.0, "range={}", angles.range_km);
    }

    #[test]
    fn test_look_angles_north() {
        // Satellite displaced toward the north pole: azimuth near 0/360.
        let observer = Observer::new(0.0, 0.0).unwrap();
        let angles = transforms::look_angles(observer, [6378.137, 0.0, 2000.0], 0.0);
        assert!(
            angles.azimuth_deg < 1.0 || angles.azimuth_deg > 359.0,
            "az={}",
            angles.azimuth_deg
        );
        assert!((0.0..360.0).contains(&angles.azimuth_deg));
    }

    #[test]
    fn test_look_angles_below_horizon() {
        // Satellite on the far side of the planet is below the horizon.
        let observer = Observer::new(0.0, 0.0).unwrap();
        let angles = transforms::look_angles(observer, [-6878.137, 0.0, 0.0], 0.0);
        assert!(angles.elevation_deg < 0.0);
    }

    #[test]
    fn test_propagate_near_epoch() {
        let prop = Propagator::from_tle(ISS_LINE1, ISS_LINE2).unwrap();
        let t = Utc.with_ymd_and_hms(2008, 9, 20, 12, 30, 0).unwrap();
        let pos = prop.position_eci(t).unwrap();
        let r = (pos[0].powi(2) + pos[1].powi(2) + pos[2].powi(2)).sqrt();
        // LEO: geocentric radius ~6700-6800 km
        assert!(r > 6500.0 && r < 7100.0, "radius {:.0} km", r);
    }

    #[test]
    fn test_find_passes_invariants() {
        let prop = Propagator::from_tle(ISS_LINE1, ISS_LINE2).unwrap();
        let observer = Observer::new(55.57, 24.25).unwrap();
        let t0 = Utc.with_ymd_and_hms(2008, 9, 20, 12, 0, 0).unwrap();
        let t1 = t0 + Duration::hours(24);

        let passes = find_passes(&prop, observer, t0, t1, 0.0).unwrap();
        assert!(!passes.is_empty(), "ISS should pass within 24h at 55.6N");

        for p in &passes {
            assert!(p.t_rise < p.t_culm, "{:?}", p);
            assert!(p.t_culm < p.t_set, "{:?}", p);
            assert!(p.max_elevation_deg >= 0.0, "{:?}", p);
            assert!(p.t_rise >= t0 && p.t_rise <= t1);
        }

        for w in passes.windows(2) {
            assert!(w[0].t_set <= w[1].t_rise, "passes overlap for one satellite");
        }
    }

    #[test]
    fn test_horizon_limit_filters_low_passes() {
        let prop = Propagator::from_tle(ISS_LINE1, ISS_LINE2).unwrap();
        let observer = Observer::new(55.57, 24.25).unwrap();
        let t0 = Utc.with_ymd_and_hms(2008, 9, 20, 12, 0, 0).unwrap();
        let t1 = t0 + Duration::hours(24);

        let all = find_passes(&prop, observer, t0, t1, 0.0).unwrap();
        let high = find_passes(&prop, observer, t0, t1, 30.0).unwrap();
        assert!(high.len() <= all.len());
        for p in &high {
            assert!(p.max_elevation_deg >= 30.0);
        }
    }
}
