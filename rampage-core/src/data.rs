use crate::{CheckSummary, LatencySummary};
use pdatastructs::tdigest::{TDigest, K1};
use std::time::Duration;

const TDIGEST_BACKLOG_SIZE: usize = 100;

/// Cumulative latency distribution. Quantiles come from a TDigest, while count, min, max and
/// mean are tracked exactly.
#[derive(Debug, Clone)]
pub struct LatencyDigest {
    latency: TDigest<K1>,
    count: u64,
    total: Duration,
    min: Duration,
    max: Duration,
}

impl LatencyDigest {
    pub fn new() -> Self {
        Self {
            latency: default_tdigest(),
            count: 0,
            total: Duration::ZERO,
            min: Duration::MAX,
            max: Duration::ZERO,
        }
    }

    pub fn push(&mut self, latency: Duration) {
        self.latency.insert(latency.as_secs_f64());
        self.count += 1;
        self.total += latency;
        self.min = self.min.min(latency);
        self.max = self.max.max(latency);
    }

    pub fn extend(&mut self, latencies: &[Duration]) {
        for latency in latencies {
            self.push(*latency);
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> Duration {
        if self.count == 0 {
            return Duration::ZERO;
        }
        Duration::from_nanos((self.total.as_nanos() / self.count as u128) as u64)
    }

    pub fn min(&self) -> Duration {
        if self.count == 0 {
            Duration::ZERO
        } else {
            self.min
        }
    }

    pub fn max(&self) -> Duration {
        self.max
    }

    pub fn quantile(&self, quantile: f64) -> Duration {
        if self.count == 0 {
            return Duration::ZERO;
        }

        let secs = self.latency.quantile(quantile);

        // NOTE: TDigest can return NaN on sparse data.
        let secs = if secs.is_finite() {
            secs.max(0.)
        } else {
            tracing::error!("Non-finite latency quantile {quantile}; falling back to the mean.");
            self.mean().as_secs_f64()
        };

        Duration::from_secs_f64(secs).clamp(self.min(), self.max())
    }

    pub fn summary(&self) -> LatencySummary {
        LatencySummary {
            avg: self.mean(),
            min: self.min(),
            med: self.quantile(0.5),
            max: self.max(),
            p90: self.quantile(0.9),
            p95: self.quantile(0.95),
            p99: self.quantile(0.99),
        }
    }
}

impl Default for LatencyDigest {
    fn default() -> Self {
        Self::new()
    }
}

fn default_tdigest() -> TDigest<K1> {
    TDigest::new(K1::new(10.), TDIGEST_BACKLOG_SIZE)
}

/// Pass/fail counts per check, in first-recorded order.
#[derive(Debug, Clone, Default)]
pub struct CheckTally {
    checks: Vec<CheckSummary>,
}

impl CheckTally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, name: &str, passed: bool) {
        let (passes, fails) = if passed { (1, 0) } else { (0, 1) };
        self.add(name, passes, fails);
    }

    pub fn add(&mut self, name: &str, passes: u64, fails: u64) {
        match self.checks.iter_mut().find(|c| c.name == name) {
            Some(check) => {
                check.passes += passes;
                check.fails += fails;
            }
            None => self.checks.push(CheckSummary {
                name: name.to_string(),
                passes,
                fails,
            }),
        }
    }

    pub fn merge(&mut self, other: CheckTally) {
        for check in other.checks {
            self.add(&check.name, check.passes, check.fails);
        }
    }

    pub fn get(&self, name: &str) -> Option<&CheckSummary> {
        self.checks.iter().find(|c| c.name == name)
    }

    pub fn into_summaries(self) -> Vec<CheckSummary> {
        self.checks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_digest_is_zeroed() {
        let digest = LatencyDigest::new();
        let summary = digest.summary();
        assert_eq!(summary.min, Duration::ZERO);
        assert_eq!(summary.max, Duration::ZERO);
        assert_eq!(summary.med, Duration::ZERO);
        assert_eq!(summary.avg, Duration::ZERO);
    }

    #[test]
    fn exact_moments() {
        let mut digest = LatencyDigest::new();
        digest.extend(&[
            Duration::from_millis(10),
            Duration::from_millis(20),
            Duration::from_millis(30),
        ]);

        assert_eq!(digest.count(), 3);
        assert_eq!(digest.min(), Duration::from_millis(10));
        assert_eq!(digest.max(), Duration::from_millis(30));
        assert_eq!(digest.mean(), Duration::from_millis(20));
    }

    #[test]
    fn quantiles_stay_within_bounds() {
        let mut digest = LatencyDigest::new();
        for ms in 1..=1_000 {
            digest.push(Duration::from_millis(ms));
        }

        let summary = digest.summary();
        assert!(summary.med >= Duration::from_millis(400));
        assert!(summary.med <= Duration::from_millis(600));
        assert!(summary.p99 >= summary.p90);
        assert!(summary.p99 <= Duration::from_millis(1_000));
    }

    #[test]
    fn tally_keeps_first_seen_order() {
        let mut tally = CheckTally::new();
        tally.record("status 200", true);
        tally.record("time < 200ms", false);
        tally.record("status 200", false);

        let mut other = CheckTally::new();
        other.add("time < 200ms", 3, 0);
        tally.merge(other);

        let checks = tally.into_summaries();
        assert_eq!(checks[0].name, "status 200");
        assert_eq!((checks[0].passes, checks[0].fails), (1, 1));
        assert_eq!(checks[1].name, "time < 200ms");
        assert_eq!((checks[1].passes, checks[1].fails), (3, 1));
    }
}
