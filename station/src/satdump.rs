//! SatDump capture-tool integration.
//!
//! At most one capture child exists at a time; the tracker owns it from
//! spawn to termination. A missing binary degrades to steering without
//! capture.

use crate::config::Settings;
use std::path::Path;
use std::time::Duration;
use tokio::process::{Child, Command};
use tracing::{info, warn};

/// Grace period between terminate and force-kill.
const TERM_GRACE: Duration = Duration::from_secs(10);
/// Extra budget on top of the pass duration in end mode.
const POST_EXTRA_SECS: u64 = 120;

/// SatDump pipeline names for catalog labels that differ from them.
const ALIASES: &[(&str, &str)] = &[
    ("NOAA 15", "NOAA-15"),
    ("NOAA 18", "NOAA-18"),
    ("NOAA 19", "NOAA-19"),
    ("METOP-B", "METOP-B"),
    ("METOP-C", "METOP-C"),
    ("METEOR-M 2-3", "METEOR-M 2-3"),
    ("ISS (ZARYA)", "ISS"),
];

/// Map a catalog name to the SatDump satellite name. Names outside the
/// alias table pass through unchanged, with a warning.
pub fn satdump_name(catalog_name: &str) -> String {
    match ALIASES.iter().find(|(from, _)| *from == catalog_name) {
        Some((_, to)) => (*to).to_string(),
        None => {
            warn!(
                "no SatDump alias for {:?}, passing the raw name through",
                catalog_name
            );
            catalog_name.to_string()
        }
    }
}

#[derive(Debug, Clone)]
pub struct CaptureConfig {
    pub source: String,
    pub rate: u32,
    pub device_args: String,
}

impl From<&Settings> for CaptureConfig {
    fn from(s: &Settings) -> Self {
        Self {
            source: s.satdump_source.clone(),
            rate: s.satdump_rate,
            device_args: s.satdump_device_args.clone(),
        }
    }
}

fn build_command(cfg: &CaptureConfig, sat_name: &str, outdir: &Path) -> Command {
    let mut cmd = Command::new("satdump");
    cmd.arg("--no-gui")
        .arg("--auto")
        .arg("--source")
        .arg(&cfg.source)
        .arg("--satellite")
        .arg(satdump_name(sat_name))
        .arg("-s")
        .arg(cfg.rate.to_string())
        .arg("-o")
        .arg(outdir);
    if !cfg.device_args.is_empty() {
        cmd.arg("--device-args").arg(&cfg.device_args);
    }
    cmd
}

/// Spawn the capture child (start mode). Returns None when the binary is
/// missing or the spawn fails; the pass still steers.
pub fn start(cfg: &CaptureConfig, sat_name: &str, outdir: &Path) -> Option<Child> {
    if let Err(e) = std::fs::create_dir_all(outdir) {
        warn!("cannot create capture dir {:?}: {}", outdir, e);
    }
    let mut cmd = build_command(cfg, sat_name, outdir);
    info!("SatDump START: {:?}", cmd.as_std());
    match cmd.spawn() {
        Ok(child) => Some(child),
        Err(e) => {
            warn!("SatDump not started: {}", e);
            None
        }
    }
}

/// Terminate the capture child: polite signal first, force-kill after the
/// grace period.
pub async fn stop(mut child: Child) {
    info!("SatDump STOP");
    terminate(&child);
    match tokio::time::timeout(TERM_GRACE, child.wait()).await {
        Ok(Ok(status)) => info!("SatDump exited: {}", status),
        Ok(Err(e)) => warn!("SatDump wait failed: {}", e),
        Err(_) => {
            warn!("SatDump did not exit in {:?}, killing", TERM_GRACE);
            if let Err(e) = child.kill().await {
                warn!("SatDump kill failed: {}", e);
            }
        }
    }
}

#[cfg(unix)]
fn terminate(child: &Child) {
    if let Some(pid) = child.id() {
        unsafe {
            libc::kill(pid as i32, libc::SIGTERM);
        }
    }
}

#[cfg(not(unix))]
fn terminate(_child: &Child) {}

/// End mode: run the decode as a blocking step after LOS, bounded by the
/// pass duration plus two minutes.
pub async fn run_post(cfg: &CaptureConfig, sat_name: &str, duration_secs: u64, outdir: &Path) {
    let budget = Duration::from_secs(duration_secs + POST_EXTRA_SECS);
    info!(
        "SatDump END {} ~{}s -> {:?}",
        satdump_name(sat_name),
        budget.as_secs(),
        outdir
    );

    let Some(mut child) = start(cfg, sat_name, outdir) else {
        return;
    };
    match tokio::time::timeout(budget, child.wait()).await {
        Ok(Ok(status)) => info!("SatDump finished: {}", status),
        Ok(Err(e)) => warn!("SatDump wait failed: {}", e),
        Err(_) => {
            info!("SatDump finished by timeout");
            stop(child).await;
        }
    }
}
