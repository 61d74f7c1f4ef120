//! Ground-station pass controller.
//!
//! Predicts LEO passes for the selected satellites, runs at most one live
//! pass at a time (rotator steering + SDR capture), resolves overlapping
//! candidates deterministically, and exposes an HTTP control plane.

use anyhow::{Context, Result};
use clap::Parser;
use pass_scheduler::planner::Plan;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod current;
mod gallery;
mod i18n;
mod menu;
mod render;
mod replan;
mod rotator;
mod routes;
mod satdump;
mod satlist;
mod selection;
mod tle;
mod tracker;

use config::{Paths, Settings};
use current::CurrentMarker;
use gallery::GalleryStore;
use i18n::Catalog;
use rotator::Rotator;
use satlist::SatListStore;
use selection::SelectionStore;
use tle::TleStore;

#[derive(Parser, Debug)]
#[command(
    name = "station-controller",
    about = "LEO ground-station pass controller"
)]
struct Args {
    /// Base directory for settings, TLE, pages, and the gallery
    #[arg(long, default_value = ".")]
    base_dir: PathBuf,

    /// Offer the interactive satellite menu on stdin for 30 s at startup
    #[arg(long)]
    menu: bool,
}

/// Shared application context. Stores are cheap path wrappers constructed
/// on demand; mutable snapshots live behind `RwLock`s and are swapped
/// whole, never mutated in place.
#[derive(Clone)]
pub struct AppState {
    pub paths: Arc<Paths>,
    pub settings: Arc<RwLock<Settings>>,
    pub catalog: Arc<RwLock<Catalog>>,
    pub plan: Arc<RwLock<Plan>>,
    pub replan_gate: Arc<Mutex<()>>,
    pub http: reqwest::Client,
}

impl AppState {
    pub fn tle(&self) -> TleStore {
        TleStore::new(self.paths.tle())
    }

    pub fn satlist(&self) -> SatListStore {
        SatListStore::new(self.paths.satlist())
    }

    pub fn selection(&self) -> SelectionStore {
        SelectionStore::new(self.paths.selection_json(), self.paths.selection_txt())
    }

    pub fn current(&self) -> CurrentMarker {
        CurrentMarker::new(self.paths.current())
    }

    pub fn gallery(&self, settings: &Settings) -> GalleryStore {
        GalleryStore::new(settings.gallery_root(&self.paths.base))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "station_controller=debug,info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let base = args
        .base_dir
        .canonicalize()
        .with_context(|| format!("base dir {:?}", args.base_dir))?;
    let paths = Paths::new(base);

    let settings = Settings::load(&paths.settings());
    i18n::ensure_files(&paths.lang_dir());
    let catalog = i18n::load(&paths.lang_dir(), &settings.lang);

    std::fs::create_dir_all(settings.gallery_root(&paths.base))
        .context("create gallery root")?;

    let http_port = settings.http_port;
    let state = AppState {
        paths: Arc::new(paths),
        settings: Arc::new(RwLock::new(settings)),
        catalog: Arc::new(RwLock::new(catalog)),
        plan: Arc::new(RwLock::new(Plan::default())),
        replan_gate: Arc::new(Mutex::new(())),
        http: reqwest::Client::new(),
    };

    // ---- Control-plane HTTP server ----
    let app = routes::router(state.clone());
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", http_port))
        .await
        .with_context(|| format!("bind HTTP port {}", http_port))?;
    tracing::info!(
        "HTTP server on port {} (dir={:?})",
        http_port,
        state.paths.base
    );
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!("HTTP server error: {}", e);
        }
    });

    state.current().set("");

    // Normalize the selection mirrors on startup.
    let restored = state.selection().load();
    if !restored.is_empty() {
        tracing::info!("restored selection: {:?}", restored);
    }
    state.selection().save(&restored);

    // ---- TLE catalog; absent and unfetchable is fatal ----
    {
        let s = state.settings.read().await.clone();
        if let Err(e) = state
            .tle()
            .refresh(&s.tle_url, s.use_manual_tle != 0, &state.http)
            .await
        {
            tracing::error!("no usable TLE catalog: {}", e);
            std::process::exit(1);
        }
    }

    if args.menu {
        menu::run(&state).await;
    }

    // ---- Initial plan (cleanup + refresh + plan + render) ----
    let count = replan::replan_and_refresh(&state).await?;
    tracing::info!("initial plan: {} passes in the next 24 h", count);

    // ---- Rotator; open failure degrades to logging commands ----
    let s = state.settings.read().await.clone();
    let mut rotator = Rotator::open(&s.serial_port, s.baudrate);

    tracker::run_loop(&state, &mut rotator).await;

    Ok(())
}
