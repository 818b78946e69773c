//! Scenario logic and constants
use crate::controllers;
use crate::measurement::Summary;
use crate::pool::VuPool;
use crate::timer::Timer;
use crate::RunResult;
use rampage_core::{ScenarioConfig, Stage, BASE_INTERVAL, PROGRESS_INTERVAL};
use std::{
    future::Future,
    num::NonZeroU32,
    pin::Pin,
    task::{Context, Poll},
    time::Duration,
};
use tokio::time::Instant;
#[allow(unused_imports)]
use tracing::{debug, error, info, instrument, trace, warn, Instrument};

/// Load test scenario structure
///
/// Handler for running scenarios. Not intended for manual creation, use the [`#[scenario]`](rampage_macros::scenario) macro which will add these methods to functions.
#[pin_project::pin_project]
pub struct Scenario<T> {
    func: T,
    runner_fut: Option<Pin<Box<dyn Future<Output = RunResult> + Send>>>,
    config: ScenarioConfig,
}

impl<T> Scenario<T> {
    #[doc(hidden)]
    pub fn new(name: &str, func: T) -> Self {
        Self {
            func,
            runner_fut: None,
            config: ScenarioConfig::new(name),
        }
    }
}

impl<T, F> Future for Scenario<T>
where
    T: Fn() -> F + Send + 'static + Clone + Sync,
    F: Future<Output = ()> + Send + 'static,
{
    type Output = RunResult;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        if self.runner_fut.is_none() {
            let func = self.func.clone();
            let config = self.config.clone();
            self.runner_fut = Some(Box::pin(async move { run_scenario(func, config).await }));
        }

        if let Some(runner) = &mut self.runner_fut {
            runner.as_mut().poll(cx)
        } else {
            unreachable!()
        }
    }
}

pub trait ConfigurableScenario<T: Send>: Future<Output = T> + Sized + Send {
    fn stages(self, stages: impl IntoIterator<Item = Stage>) -> Self;
    fn stage(self, duration: Duration, target: usize) -> Self;
    fn start_vus(self, vus: usize) -> Self;
    fn vus(self, vus: usize) -> Self;
    fn duration(self, duration: Duration) -> Self;
    fn graceful_ramp_down(self, grace: Duration) -> Self;
    fn graceful_stop(self, grace: Duration) -> Self;
    fn max_rps(self, rps: NonZeroU32) -> Self;
}

impl<T, F> ConfigurableScenario<RunResult> for Scenario<T>
where
    T: Fn() -> F + Send + 'static + Clone + Sync,
    F: Future<Output = ()> + Send + 'static,
{
    /// Append stages to the ramp profile. Each stage moves the VU count linearly from the
    /// previous target to its own over its duration.
    ///
    /// # Example
    /// ```no_run
    /// use rampage::prelude::*;
    ///
    /// #[tokio::main]
    /// async fn main() {
    ///     let stages = ["30s:200", "1m:200", "30s:0"].map(|s| s.parse().unwrap());
    ///     my_scenario().stages(stages).await.unwrap();
    /// }
    ///
    /// #[scenario]
    /// async fn my_scenario() {
    /// }
    /// ```
    fn stages(mut self, stages: impl IntoIterator<Item = Stage>) -> Self {
        for stage in stages {
            self.config.push_stage(stage);
        }
        self
    }

    /// Append a single stage to the ramp profile.
    ///
    /// # Example
    /// ```no_run
    /// use rampage::prelude::*;
    /// use std::time::Duration;
    ///
    /// #[tokio::main]
    /// async fn main() {
    ///     my_scenario()
    ///         .stage(Duration::from_secs(30), 200)
    ///         .stage(Duration::from_secs(30), 0)
    ///         .await
    ///         .unwrap();
    /// }
    ///
    /// #[scenario]
    /// async fn my_scenario() {
    /// }
    /// ```
    fn stage(mut self, duration: Duration, target: usize) -> Self {
        self.config.push_stage(Stage::new(duration, target));
        self
    }

    /// VUs running before the first stage starts ramping. Defaults to 1.
    fn start_vus(mut self, vus: usize) -> Self {
        self.config.set_start_vus(vus);
        self
    }

    /// Run a fixed number of VUs. Combine with `.duration()`.
    ///
    /// # Example
    /// ```no_run
    /// use rampage::prelude::*;
    /// use std::time::Duration;
    ///
    /// #[tokio::main]
    /// async fn main() {
    ///     my_scenario()
    ///         .vus(10)
    ///         .duration(Duration::from_secs(60))
    ///         .await
    ///         .unwrap();
    /// }
    ///
    /// #[scenario]
    /// async fn my_scenario() {
    /// }
    /// ```
    fn vus(mut self, vus: usize) -> Self {
        self.config.set_vus(vus);
        self
    }

    /// Run for the given duration. Ignored once stages are set.
    fn duration(mut self, duration: Duration) -> Self {
        self.config.set_duration(duration);
        self
    }

    fn graceful_ramp_down(mut self, grace: Duration) -> Self {
        self.config.graceful_ramp_down = grace;
        self
    }

    fn graceful_stop(mut self, grace: Duration) -> Self {
        self.config.graceful_stop = grace;
        self
    }

    /// Cap the requests per second issued by all VUs together.
    fn max_rps(mut self, rps: NonZeroU32) -> Self {
        self.config.max_rps = Some(rps);
        self
    }
}

#[instrument(name="scenario", skip_all, fields(name=config.name))]
pub(crate) async fn run_scenario<T, F>(scenario: T, config: ScenarioConfig) -> RunResult
where
    T: Fn() -> F + Send + Sync + 'static + Clone,
    F: Future<Output = ()> + Send + 'static,
{
    config.validate()?;
    info!(
        "Running {} for {} with up to {} VUs",
        config.name,
        humantime::format_duration(config.total_duration()),
        config.max_vus()
    );
    debug!("Scenario config: {config:?}");

    let controller = controllers::from_config(&config);
    let total = controller.duration();
    let mut pool = VuPool::new(scenario, config.max_rps, config.graceful_ramp_down);
    let mut summary = Summary::new();

    let mut timer = Timer::new(BASE_INTERVAL).await;
    let start = Instant::now();
    let mut last_collect = start;

    pool.set_vus(controller.initial_vus());
    debug!("Adjusting VUs every {timer}");

    // NOTE: This loop is time-sensitive. Any long awaits or blocking will delay VU changes.
    loop {
        timer.tick().await;

        let elapsed = start.elapsed();
        if elapsed >= total {
            break;
        }

        pool.set_vus(controller.target_vus(elapsed));
        pool.reap();

        if last_collect.elapsed() >= PROGRESS_INTERVAL {
            let measurement = pool.collect(last_collect.elapsed());
            last_collect = Instant::now();

            info!(
                "{} / {}: VUs={}, {measurement}",
                humantime::format_duration(Duration::from_secs(elapsed.as_secs())),
                humantime::format_duration(total),
                pool.vus(),
            );
            summary.push(measurement);
        }
    }

    debug!("Scenario duration reached; stopping VUs");
    pool.shutdown(config.graceful_stop).await;
    summary.push(pool.collect(last_collect.elapsed()));

    info!("Scenario complete");

    Ok(summary.finish(&config.name, start.elapsed(), pool.max_vus()))
}
