//! Staged smoke load test for the `/stats` endpoint of the review assignment service.
//!
//! Each virtual user repeatedly issues one `GET` to the endpoint, checks that the response has
//! status 200 and arrived faster than the latency threshold, then pauses before the next
//! iteration. The default profile ramps to 200 VUs over 30s, holds for a minute and ramps back
//! down over 30s.
pub mod config;
pub mod scenario;

pub use config::{Args, Settings};

use anyhow::Context;
use rampage::prelude::*;
use tracing::info;

/// Runs the smoke test described by `args` and returns its summary.
///
/// The target URL, sleep and latency threshold are fixed by the first call in a process. Later
/// calls must use the same settings, otherwise they return an error without running.
pub async fn run(args: &Args) -> anyhow::Result<RunStatistics> {
    let settings = args.settings()?;
    info!(
        "Targeting {} over {} ({} stages)",
        settings.url,
        humantime::format_duration(args.total_duration()),
        args.stages.len()
    );
    scenario::configure(settings)?;

    let smoke = scenario::stats_smoke()
        .start_vus(args.start_vus)
        .stages(args.stages.iter().copied())
        .graceful_ramp_down(args.graceful_ramp_down)
        .graceful_stop(args.graceful_stop);

    let stats = match args.max_rps {
        Some(rps) => smoke.max_rps(rps).await?,
        None => smoke.await?,
    };

    if let Some(path) = &args.summary_export {
        let json = serde_json::to_vec_pretty(&stats)?;
        std::fs::write(path, json)
            .with_context(|| format!("Unable to write summary to {}", path.display()))?;
        info!("Summary written to {}", path.display());
    }

    Ok(stats)
}
