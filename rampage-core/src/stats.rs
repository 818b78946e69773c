use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DurationMilliSecondsWithFrac};
use std::fmt;
use std::time::Duration;

/// Run Statistics for a given Scenario
#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunStatistics {
    pub name: String,
    #[serde_as(as = "DurationMilliSecondsWithFrac<f64>")]
    pub duration: Duration,
    pub max_vus: usize,
    pub iterations: u64,
    pub interrupted_iterations: u64,
    pub http_reqs: u64,
    pub http_req_failed: u64,
    pub http_req_duration: LatencySummary,
    pub iteration_duration: LatencySummary,
    pub checks: Vec<CheckSummary>,
}

impl RunStatistics {
    pub fn check(&self, name: &str) -> Option<&CheckSummary> {
        self.checks.iter().find(|c| c.name == name)
    }

    /// Fraction of all recorded checks which passed. `None` if no check ran.
    pub fn checks_rate(&self) -> Option<f64> {
        let (passes, total) = self
            .checks
            .iter()
            .fold((0, 0), |(p, t), c| (p + c.passes, t + c.total()));
        (total > 0).then(|| passes as f64 / total as f64)
    }

    pub fn http_req_failed_rate(&self) -> f64 {
        if self.http_reqs == 0 {
            0.
        } else {
            self.http_req_failed as f64 / self.http_reqs as f64
        }
    }

    pub fn iteration_rate(&self) -> f64 {
        per_second(self.iterations, self.duration)
    }

    pub fn http_req_rate(&self) -> f64 {
        per_second(self.http_reqs, self.duration)
    }
}

fn per_second(count: u64, elapsed: Duration) -> f64 {
    let secs = elapsed.as_secs_f64();
    if secs > 0. {
        count as f64 / secs
    } else {
        0.
    }
}

#[serde_as]
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LatencySummary {
    #[serde_as(as = "DurationMilliSecondsWithFrac<f64>")]
    pub avg: Duration,
    #[serde_as(as = "DurationMilliSecondsWithFrac<f64>")]
    pub min: Duration,
    #[serde_as(as = "DurationMilliSecondsWithFrac<f64>")]
    pub med: Duration,
    #[serde_as(as = "DurationMilliSecondsWithFrac<f64>")]
    pub max: Duration,
    #[serde_as(as = "DurationMilliSecondsWithFrac<f64>")]
    pub p90: Duration,
    #[serde_as(as = "DurationMilliSecondsWithFrac<f64>")]
    pub p95: Duration,
    #[serde_as(as = "DurationMilliSecondsWithFrac<f64>")]
    pub p99: Duration,
}

impl fmt::Display for LatencySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "avg={:?} min={:?} med={:?} max={:?} p(90)={:?} p(95)={:?} p(99)={:?}",
            self.avg, self.min, self.med, self.max, self.p90, self.p95, self.p99,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckSummary {
    pub name: String,
    pub passes: u64,
    pub fails: u64,
}

impl CheckSummary {
    pub fn total(&self) -> u64 {
        self.passes + self.fails
    }

    pub fn all_passed(&self) -> bool {
        self.fails == 0
    }
}

impl fmt::Display for RunStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "scenario: {}", self.name)?;
        writeln!(
            f,
            "  duration: {}, max VUs: {}",
            humantime::format_duration(Duration::from_millis(self.duration.as_millis() as u64)),
            self.max_vus
        )?;
        writeln!(f)?;

        for check in &self.checks {
            let mark = if check.all_passed() { '✓' } else { '✗' };
            writeln!(f, "  {mark} {}", check.name)?;
            if !check.all_passed() {
                writeln!(
                    f,
                    "   ↳ {:.0}% ✓ {} / ✗ {}",
                    check.passes as f64 / check.total() as f64 * 100.,
                    check.passes,
                    check.fails
                )?;
            }
        }
        if !self.checks.is_empty() {
            writeln!(f)?;
        }

        if let Some(rate) = self.checks_rate() {
            let (passes, fails) = self
                .checks
                .iter()
                .fold((0, 0), |(p, x), c| (p + c.passes, x + c.fails));
            writeln!(
                f,
                "  checks.....................: {:.2}% ✓ {passes} ✗ {fails}",
                rate * 100.
            )?;
        }
        writeln!(
            f,
            "  http_req_duration..........: {}",
            self.http_req_duration
        )?;
        writeln!(
            f,
            "  http_req_failed............: {:.2}% ✓ {} ✗ {}",
            self.http_req_failed_rate() * 100.,
            self.http_req_failed,
            self.http_reqs - self.http_req_failed.min(self.http_reqs),
        )?;
        writeln!(
            f,
            "  http_reqs..................: {} {:.2}/s",
            self.http_reqs,
            self.http_req_rate()
        )?;
        writeln!(
            f,
            "  iteration_duration.........: {}",
            self.iteration_duration
        )?;
        write!(
            f,
            "  iterations.................: {} {:.2}/s ({} interrupted)",
            self.iterations,
            self.iteration_rate(),
            self.interrupted_iterations
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats() -> RunStatistics {
        RunStatistics {
            name: "smoke".to_string(),
            duration: Duration::from_secs(10),
            max_vus: 2,
            iterations: 20,
            interrupted_iterations: 1,
            http_reqs: 20,
            http_req_failed: 5,
            http_req_duration: LatencySummary::default(),
            iteration_duration: LatencySummary::default(),
            checks: vec![
                CheckSummary {
                    name: "status 200".to_string(),
                    passes: 15,
                    fails: 5,
                },
                CheckSummary {
                    name: "time < 200ms".to_string(),
                    passes: 20,
                    fails: 0,
                },
            ],
        }
    }

    #[test]
    fn rates() {
        let stats = stats();
        assert_eq!(stats.checks_rate(), Some(35. / 40.));
        assert_eq!(stats.http_req_failed_rate(), 0.25);
        assert_eq!(stats.iteration_rate(), 2.);
        assert_eq!(stats.check("status 200").map(|c| c.fails), Some(5));
        assert!(stats.check("missing").is_none());
    }

    #[test]
    fn no_checks_no_rate() {
        let mut stats = stats();
        stats.checks.clear();
        assert_eq!(stats.checks_rate(), None);
    }

    #[test]
    fn renders_summary() {
        let text = stats().to_string();
        assert!(text.contains("✗ status 200"));
        assert!(text.contains("✓ time < 200ms"));
        assert!(text.contains("75% ✓ 15 / ✗ 5"));
        assert!(text.contains("checks.....................: 87.50% ✓ 35 ✗ 5"));
        assert!(text.contains("iterations.................: 20 2.00/s (1 interrupted)"));
    }

    #[test]
    fn json_uses_milliseconds() {
        let json = serde_json::to_value(stats()).unwrap();
        assert_eq!(json["duration"], 10_000.0);
        assert_eq!(json["checks"][1]["passes"], 20);
    }
}
