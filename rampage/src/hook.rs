use governor::DefaultDirectRateLimiter;
use metrics_util::AtomicBucket;
use rampage_core::CheckTally;
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc, Mutex, PoisonError,
};
use std::time::Duration;

/// Counters shared between the VU tasks of one scenario and the loop collecting them.
#[derive(Clone)]
pub(crate) struct IterationData {
    pub limiter: Option<Arc<DefaultDirectRateLimiter>>,
    pub iterations: Arc<AtomicU64>,
    pub interrupted: Arc<AtomicU64>,
    pub http_reqs: Arc<AtomicU64>,
    pub http_failed: Arc<AtomicU64>,
    pub http_latency: Arc<AtomicBucket<Duration>>,
    pub iteration_latency: Arc<AtomicBucket<Duration>>,
    checks: Arc<Mutex<CheckTally>>,
}

impl IterationData {
    pub fn new(limiter: Option<DefaultDirectRateLimiter>) -> Self {
        Self {
            limiter: limiter.map(Arc::new),
            iterations: Arc::new(AtomicU64::new(0)),
            interrupted: Arc::new(AtomicU64::new(0)),
            http_reqs: Arc::new(AtomicU64::new(0)),
            http_failed: Arc::new(AtomicU64::new(0)),
            http_latency: Arc::new(AtomicBucket::new()),
            iteration_latency: Arc::new(AtomicBucket::new()),
            checks: Arc::new(Mutex::new(CheckTally::new())),
        }
    }

    pub fn record_iteration(&self, elapsed: Duration) {
        self.iterations.fetch_add(1, Ordering::Relaxed);
        self.iteration_latency.push(elapsed);

        #[cfg(feature = "metrics")]
        {
            metrics::counter!("rampage_iterations").increment(1);
            metrics::histogram!("rampage_iteration_duration").record(elapsed.as_secs_f64());
        }
    }

    pub fn record_interrupted(&self) {
        self.interrupted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_http(&self, latency: Duration, failed: bool) {
        self.http_reqs.fetch_add(1, Ordering::Relaxed);
        self.http_latency.push(latency);
        if failed {
            self.http_failed.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_check(&self, name: &str, passed: bool) {
        // NOTE: A VU panicking mid-record leaves the tally consistent, so poison is ignored.
        self.checks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .record(name, passed);
    }

    pub fn take_checks(&self) -> CheckTally {
        std::mem::take(&mut *self.checks.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

tokio::task_local! {
    pub(crate) static ITERATION_HOOK: IterationData;
}

/// Waits on the scenario-wide request limiter, if one is configured.
pub(crate) async fn until_ready() {
    if let Ok(Some(limiter)) = ITERATION_HOOK.try_with(|hook| hook.limiter.clone()) {
        limiter.until_ready().await;
    }
}
