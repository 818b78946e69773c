use clap::Parser;
use rampage::{parse_target_url, ConfigError, Stage, DEFAULT_HTTP_TIMEOUT};
use std::net::SocketAddr;
use std::num::NonZeroU32;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_URL: &str = "http://app:8080/stats";
pub const DEFAULT_STAGES: &str = "30s:200,1m:200,30s:0";

/// Ramp virtual users against the `/stats` endpoint and check status and latency.
#[derive(Debug, Clone, Parser)]
#[command(version, about)]
pub struct Args {
    /// Endpoint every iteration requests.
    #[arg(long, env = "RAMPAGE_URL", default_value = DEFAULT_URL)]
    pub url: String,

    /// Ramp stage as `<duration>:<target VUs>`. Repeat or comma-separate for several.
    #[arg(
        long = "stage",
        env = "RAMPAGE_STAGES",
        value_delimiter = ',',
        default_value = DEFAULT_STAGES
    )]
    pub stages: Vec<Stage>,

    /// Pause at the end of every iteration.
    #[arg(long, env = "RAMPAGE_SLEEP", default_value = "1s", value_parser = humantime::parse_duration)]
    pub sleep: Duration,

    /// Responses must be strictly faster than this to pass the latency check.
    #[arg(long, env = "RAMPAGE_LATENCY_THRESHOLD", default_value = "200ms", value_parser = humantime::parse_duration)]
    pub latency_threshold: Duration,

    #[arg(long, env = "RAMPAGE_START_VUS", default_value_t = 1)]
    pub start_vus: usize,

    #[arg(long, default_value = "30s", value_parser = humantime::parse_duration)]
    pub graceful_ramp_down: Duration,

    #[arg(long, default_value = "30s", value_parser = humantime::parse_duration)]
    pub graceful_stop: Duration,

    /// Cap on requests per second across all VUs.
    #[arg(long, env = "RAMPAGE_MAX_RPS")]
    pub max_rps: Option<NonZeroU32>,

    /// Per-request timeout.
    #[arg(long, default_value = "60s", value_parser = humantime::parse_duration)]
    pub timeout: Duration,

    /// Write the run summary as JSON to this file.
    #[arg(long)]
    pub summary_export: Option<PathBuf>,

    /// Serve Prometheus metrics on this address while running.
    #[arg(long, env = "RAMPAGE_METRICS_ADDR")]
    pub metrics_addr: Option<SocketAddr>,
}

/// What the iteration body needs to know.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub url: String,
    pub sleep: Duration,
    pub latency_threshold: Duration,
    pub latency_check: String,
    pub timeout: Duration,
}

impl Settings {
    pub fn new(url: &str, sleep: Duration, latency_threshold: Duration) -> Result<Self, ConfigError> {
        let url = parse_target_url(url)?;
        Ok(Self {
            url: url.to_string(),
            sleep,
            latency_threshold,
            latency_check: format!("time < {}", humantime::format_duration(latency_threshold)),
            timeout: DEFAULT_HTTP_TIMEOUT,
        })
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            sleep: Duration::from_secs(1),
            latency_threshold: Duration::from_millis(200),
            latency_check: "time < 200ms".to_string(),
            timeout: DEFAULT_HTTP_TIMEOUT,
        }
    }
}

impl Args {
    pub fn settings(&self) -> Result<Settings, ConfigError> {
        let mut settings = Settings::new(&self.url, self.sleep, self.latency_threshold)?;
        settings.timeout = self.timeout;
        Ok(settings)
    }

    pub fn total_duration(&self) -> Duration {
        self.stages.iter().map(|s| s.duration).sum()
    }
}
