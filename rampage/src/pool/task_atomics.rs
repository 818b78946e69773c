use crate::hook::IterationData;
use crate::measurement::Measurement;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use std::num::NonZeroU32;
use std::sync::atomic::Ordering;
use std::time::Duration;

/// Owner of the counters every VU of a scenario writes into.
pub(crate) struct TaskAtomics {
    data: IterationData,
}

impl TaskAtomics {
    pub fn new(max_rps: Option<NonZeroU32>) -> Self {
        Self {
            data: IterationData::new(max_rps.map(rate_limiter)),
        }
    }

    pub fn clone_to_iteration_data(&self) -> IterationData {
        self.data.clone()
    }

    pub fn record_interrupted(&self) {
        self.data.record_interrupted();
    }

    /// Drains everything recorded since the previous collection.
    pub fn collect(&self, elapsed: Duration) -> Measurement {
        let mut measurement = Measurement {
            elapsed,
            iterations: self.data.iterations.swap(0, Ordering::Relaxed),
            interrupted: self.data.interrupted.swap(0, Ordering::Relaxed),
            http_reqs: self.data.http_reqs.swap(0, Ordering::Relaxed),
            http_failed: self.data.http_failed.swap(0, Ordering::Relaxed),
            http_latency: vec![],
            iteration_latency: vec![],
            checks: self.data.take_checks(),
        };

        self.data
            .http_latency
            .clear_with(|dur| measurement.http_latency.extend_from_slice(dur));
        self.data
            .iteration_latency
            .clear_with(|dur| measurement.iteration_latency.extend_from_slice(dur));

        measurement
    }
}

fn rate_limiter(max_rps: NonZeroU32) -> DefaultDirectRateLimiter {
    RateLimiter::direct(Quota::per_second(max_rps).allow_burst(NonZeroU32::MIN))
}
