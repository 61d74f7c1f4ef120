//! The replan pipeline: retention cleanup, TLE refresh, 24-hour planning,
//! and page regeneration, serialized by a process-wide mutex.
//!
//! Concurrent requests queue on the mutex in FIFO order; each is honored.
//! A failing step aborts the remainder and surfaces the error, leaving
//! previously persisted state (and the live plan) untouched.

use crate::tle::TleStore;
use crate::{render, AppState};
use anyhow::Context;
use chrono::{DateTime, Utc};
use orbital_geometry::{find_passes, Observer, Propagator};
use pass_scheduler::planner::{self, EventSource, Plan};
use pass_scheduler::{LocalZone, PassWindow};
use tracing::{info, warn};

/// Pass-event source backed by the TLE store and the SGP4 adapter.
struct Sgp4Source {
    store: TleStore,
    observer: Observer,
    horizon_deg: f64,
}

impl EventSource for Sgp4Source {
    fn passes(
        &self,
        name: &str,
        t0: DateTime<Utc>,
        t1: DateTime<Utc>,
    ) -> Option<Vec<PassWindow>> {
        let (line1, line2) = self.store.get(name)?;
        let propagator = match Propagator::from_tle(&line1, &line2) {
            Ok(p) => p,
            Err(e) => {
                warn!("unusable TLE for {:?}: {}", name, e);
                return None;
            }
        };
        match find_passes(&propagator, self.observer, t0, t1, self.horizon_deg) {
            Ok(events) => Some(
                events
                    .into_iter()
                    .map(|e| PassWindow {
                        sat_name: name.to_string(),
                        t_rise: e.t_rise,
                        t_culm: e.t_culm,
                        t_set: e.t_set,
                        max_elev_deg: e.max_elevation_deg,
                    })
                    .collect(),
            ),
            Err(e) => {
                warn!("pass search failed for {:?}: {}", name, e);
                None
            }
        }
    }
}

/// Run the full pipeline and swap the shared plan. Returns the number of
/// planned passes.
pub async fn replan_and_refresh(state: &AppState) -> anyhow::Result<usize> {
    let _guard = state.replan_gate.lock().await;
    info!("replan: start");

    let settings = state.settings.read().await.clone();
    let zone = LocalZone::parse(&settings.timezone);
    let gallery = state.gallery(&settings);

    if settings.gallery_keep_days > 0 {
        let current_id = state.current().read();
        gallery.cleanup(settings.gallery_keep_days, &current_id, &zone);
    }

    state
        .tle()
        .refresh(&settings.tle_url, settings.use_manual_tle != 0, &state.http)
        .await
        .context("TLE refresh")?;

    let observer =
        Observer::new(settings.lat, settings.lon).context("observer coordinates")?;
    let source = Sgp4Source {
        store: state.tle(),
        observer,
        horizon_deg: settings.altitude_limit,
    };
    let selected = state.satlist().read();
    let plan = planner::plan(&source, &selected, Utc::now(), &zone);
    let count = plan.windows.len();

    render_plan(state, &settings, &plan, &zone).await?;

    *state.plan.write().await = plan;
    info!("replan: done, {} passes", count);
    Ok(count)
}

/// Regenerate chart and pages for the plan currently in effect (used after
/// a pass completes and after a manual cleanup).
pub async fn render_current(state: &AppState) -> anyhow::Result<()> {
    let settings = state.settings.read().await.clone();
    let zone = LocalZone::parse(&settings.timezone);
    let plan = state.plan.read().await.clone();
    render_plan(state, &settings, &plan, &zone).await
}

async fn render_plan(
    state: &AppState,
    settings: &crate::config::Settings,
    plan: &Plan,
    zone: &LocalZone,
) -> anyhow::Result<()> {
    let catalog = state.catalog.read().await.clone();
    let gallery = state.gallery(settings);
    std::fs::create_dir_all(gallery.root())
        .with_context(|| format!("create gallery root {:?}", gallery.root()))?;

    render::render_chart(&state.paths.chart(), plan, zone).context("elevation chart")?;
    let passes = gallery.list_passes();
    let selection = state.selection().as_set();
    render::render_pages(
        &state.paths.base,
        settings,
        &catalog,
        plan,
        zone,
        &passes,
        &selection,
    )
    .context("page render")?;
    Ok(())
}
