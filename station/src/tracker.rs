//! The per-pass tracking state machine.
//!
//! One pass at a time: decide against the conflict resolver, spawn the
//! capture lead-in, steer the rotator between AOS and LOS, run the capture
//! tail or post decode, then seal the pass directory. The `current.json`
//! marker brackets the steering phase; sealing writes `meta.json` last.

use crate::config::{CaptureMode, Settings};
use crate::gallery::{GalleryStore, PassMeta};
use crate::rotator::Rotator;
use crate::satdump::{self, CaptureConfig};
use crate::AppState;
use chrono::{DateTime, Duration as ChronoDuration, SecondsFormat, Utc};
use orbital_geometry::{Observer, Propagator};
use pass_scheduler::resolver::{self, Decision, SkipReason};
use pass_scheduler::{LocalZone, PassIndex, PassWindow};
use std::collections::HashSet;
use std::time::Duration;
use tracing::{error, info, warn};

/// Poll interval while waiting for AOS and LOS boundaries.
const WAIT_POLL: Duration = Duration::from_millis(500);

/// Run the planned passes to completion, one at a time.
///
/// The plan is re-read before every pass, so a replan triggered from the
/// control plane takes effect at the next pass boundary. Executed and
/// skipped ids are remembered so a replan cannot re-run a finished pass.
pub async fn run_loop(state: &AppState, rotator: &mut Rotator) {
    let mut done: HashSet<String> = HashSet::new();

    loop {
        let settings = state.settings.read().await.clone();
        let zone = LocalZone::parse(&settings.timezone);

        let next = {
            let plan = state.plan.read().await;
            let now = Utc::now();
            plan.windows
                .iter()
                .find(|w| w.t_set > now && !done.contains(&w.id(&zone)))
                .cloned()
                .map(|w| (w, plan.index.clone()))
        };
        let Some((window, index)) = next else {
            info!("pass list exhausted, tracker done");
            break;
        };

        done.insert(window.id(&zone));
        track_pass(state, rotator, &window, &index, &settings, &zone).await;

        if let Err(e) = crate::replan::render_current(state).await {
            warn!("page refresh after pass failed: {:#}", e);
        }
    }
}

/// Execute (or skip) a single pass.
pub async fn track_pass(
    state: &AppState,
    rotator: &mut Rotator,
    window: &PassWindow,
    index: &PassIndex,
    settings: &Settings,
    zone: &LocalZone,
) {
    let pass_id = window.id(zone);
    let start_local = zone.to_local(window.t_rise);
    let end_local = zone.to_local(window.t_set);
    info!(
        "candidate: {} {} - {} -> {}",
        window.sat_name,
        start_local.format("%H:%M"),
        end_local.format("%H:%M"),
        pass_id
    );

    let selection = state.selection().as_set();
    match resolver::decide(&pass_id, index, &selection) {
        Decision::Skip { winner, reason } => {
            match reason {
                SkipReason::UserSelected => {
                    info!("skip {} (conflict: user-selected {})", pass_id, winner)
                }
                SkipReason::HigherElevation => {
                    info!("skip {} (conflict: prefer {} by max elevation)", pass_id, winner)
                }
            }
            return;
        }
        Decision::Execute => {}
    }

    let gallery = state.gallery(settings);
    let pass_dir = gallery.pass_dir(&pass_id);
    if let Err(e) = std::fs::create_dir_all(&pass_dir) {
        error!("cannot create pass dir {:?}: {}", pass_dir, e);
    }

    // Steering needs the element set; a vanished catalog entry degrades to
    // a capture-only pass.
    let propagator = match state.tle().get(&window.sat_name) {
        Some((l1, l2)) => match Propagator::from_tle(&l1, &l2) {
            Ok(p) => Some(p),
            Err(e) => {
                warn!("bad TLE for {}: {}", window.sat_name, e);
                None
            }
        },
        None => {
            warn!("TLE for {} disappeared before track start", window.sat_name);
            None
        }
    };
    let observer = Observer::new(settings.lat, settings.lon).ok();

    let capture = CaptureConfig::from(settings);
    let mut child = None;
    if settings.satdump_mode == CaptureMode::Start {
        let spawn_at = window.t_rise - ChronoDuration::seconds(settings.satdump_lead as i64);
        wait_until(spawn_at).await;
        child = satdump::start(&capture, &window.sat_name, &pass_dir);
    }

    wait_until(window.t_rise).await;
    state.current().set(&pass_id);
    info!("START: {}", pass_id);

    while Utc::now() < window.t_set {
        if let (Some(prop), Some(obs)) = (&propagator, observer) {
            match prop.look_angles(obs, Utc::now()) {
                Ok(angles) if angles.elevation_deg >= 0.0 => {
                    rotator.point(angles.azimuth_deg, angles.elevation_deg)
                }
                Ok(_) => {}
                Err(e) => warn!("look-angle computation failed: {}", e),
            }
        }
        tokio::time::sleep(Duration::from_secs(settings.update_interval.max(1))).await;
    }
    info!("STOP: {}", pass_id);

    match settings.satdump_mode {
        CaptureMode::Start => {
            tokio::time::sleep(Duration::from_secs(settings.satdump_tail)).await;
            if let Some(child) = child.take() {
                satdump::stop(child).await;
            }
        }
        CaptureMode::End => {
            satdump::run_post(
                &capture,
                &window.sat_name,
                window.duration_secs().max(0) as u64,
                &pass_dir,
            )
            .await;
        }
    }

    seal_pass(&gallery, &pass_dir, window, zone);
    state.current().set("");
}

/// Seal a finished pass: thumbnails first, `meta.json` last so its
/// presence marks completion.
pub fn seal_pass(
    gallery: &GalleryStore,
    pass_dir: &std::path::Path,
    window: &PassWindow,
    zone: &LocalZone,
) {
    gallery.generate_thumbs(pass_dir);

    let meta = PassMeta {
        satellite: window.sat_name.clone(),
        start_local: zone
            .to_local(window.t_rise)
            .format("%Y-%m-%dT%H:%M:%S")
            .to_string(),
        end_local: zone
            .to_local(window.t_set)
            .format("%Y-%m-%dT%H:%M:%S")
            .to_string(),
        created_utc: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, false),
    };
    if let Err(e) = gallery.write_meta(pass_dir, &meta) {
        error!("failed to seal {:?}: {}", pass_dir, e);
    }
}

async fn wait_until(t: DateTime<Utc>) {
    while Utc::now() < t {
        tokio::time::sleep(WAIT_POLL).await;
    }
}
