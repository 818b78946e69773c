use rampage_core::{CheckTally, LatencyDigest, RunStatistics};
use std::fmt;
use std::time::Duration;

/// Everything recorded by the VUs between two collections.
#[derive(Debug, Clone)]
pub(crate) struct Measurement {
    pub elapsed: Duration,
    pub iterations: u64,
    pub interrupted: u64,
    pub http_reqs: u64,
    pub http_failed: u64,
    pub http_latency: Vec<Duration>,
    pub iteration_latency: Vec<Duration>,
    pub checks: CheckTally,
}

impl Measurement {
    pub fn iteration_rate(&self) -> f64 {
        self.iterations as f64 / self.elapsed.as_secs_f64()
    }

    pub fn http_failed_rate(&self) -> f64 {
        if self.http_reqs == 0 {
            0.
        } else {
            self.http_failed as f64 / self.http_reqs as f64
        }
    }
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "iterations/s={:.2}, http_reqs={}, failed={:.2}%",
            self.iteration_rate(),
            self.http_reqs,
            self.http_failed_rate() * 100.,
        )
    }
}

/// Running totals over the whole scenario.
#[derive(Debug, Default)]
pub(crate) struct Summary {
    iterations: u64,
    interrupted: u64,
    http_reqs: u64,
    http_failed: u64,
    http_latency: LatencyDigest,
    iteration_latency: LatencyDigest,
    checks: CheckTally,
}

impl Summary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, measurement: Measurement) {
        self.iterations += measurement.iterations;
        self.interrupted += measurement.interrupted;
        self.http_reqs += measurement.http_reqs;
        self.http_failed += measurement.http_failed;
        self.http_latency.extend(&measurement.http_latency);
        self.iteration_latency
            .extend(&measurement.iteration_latency);
        self.checks.merge(measurement.checks);
    }

    pub fn finish(self, name: &str, duration: Duration, max_vus: usize) -> RunStatistics {
        RunStatistics {
            name: name.to_string(),
            duration,
            max_vus,
            iterations: self.iterations,
            interrupted_iterations: self.interrupted,
            http_reqs: self.http_reqs,
            http_req_failed: self.http_failed,
            http_req_duration: self.http_latency.summary(),
            iteration_duration: self.iteration_latency.summary(),
            checks: self.checks.into_summaries(),
        }
    }
}
