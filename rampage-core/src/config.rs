use crate::{ConfigError, DEFAULT_GRACEFUL_RAMP_DOWN, DEFAULT_GRACEFUL_STOP, DEFAULT_START_VUS};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DurationMilliSeconds};
use std::fmt;
use std::num::NonZeroU32;
use std::str::FromStr;
use std::time::Duration;
use url::Url;

/// A window of time during which the VU count moves linearly toward `target`.
#[serde_as]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stage {
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub duration: Duration,
    pub target: usize,
}

impl Stage {
    pub fn new(duration: Duration, target: usize) -> Self {
        Self { duration, target }
    }
}

/// Parses the `<duration>:<target>` form, e.g. `30s:200` or `1m30s:50`.
impl FromStr for Stage {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (duration, target) = s
            .trim()
            .rsplit_once(':')
            .ok_or_else(|| ConfigError::InvalidStage(s.to_string()))?;

        let duration =
            humantime::parse_duration(duration.trim()).map_err(|source| {
                ConfigError::InvalidDuration {
                    input: duration.to_string(),
                    source,
                }
            })?;

        let target = target
            .trim()
            .parse()
            .map_err(|source| ConfigError::InvalidTarget {
                input: target.to_string(),
                source,
            })?;

        Ok(Self { duration, target })
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}",
            humantime::format_duration(self.duration),
            self.target
        )
    }
}

/// How VUs are scheduled over the lifetime of a scenario.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "executor", rename_all = "kebab-case")]
pub enum Executor {
    RampingVus {
        start_vus: usize,
        stages: Vec<Stage>,
    },
    ConstantVus {
        vus: usize,
        #[serde_as(as = "DurationMilliSeconds<u64>")]
        duration: Duration,
    },
}

impl Default for Executor {
    fn default() -> Self {
        Executor::RampingVus {
            start_vus: DEFAULT_START_VUS,
            stages: vec![],
        }
    }
}

#[doc(hidden)]
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioConfig {
    pub name: String,
    #[serde(flatten)]
    pub executor: Executor,
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub graceful_ramp_down: Duration,
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub graceful_stop: Duration,
    pub max_rps: Option<NonZeroU32>,
}

impl ScenarioConfig {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            executor: Executor::default(),
            graceful_ramp_down: DEFAULT_GRACEFUL_RAMP_DOWN,
            graceful_stop: DEFAULT_GRACEFUL_STOP,
            max_rps: None,
        }
    }

    pub fn push_stage(&mut self, stage: Stage) {
        match &mut self.executor {
            Executor::RampingVus { stages, .. } => stages.push(stage),
            Executor::ConstantVus { .. } => {
                self.executor = Executor::RampingVus {
                    start_vus: DEFAULT_START_VUS,
                    stages: vec![stage],
                };
            }
        }
    }

    pub fn set_start_vus(&mut self, vus: usize) {
        match &mut self.executor {
            Executor::RampingVus { start_vus, .. } => *start_vus = vus,
            Executor::ConstantVus { .. } => {
                self.executor = Executor::RampingVus {
                    start_vus: vus,
                    stages: vec![],
                };
            }
        }
    }

    /// Sets a fixed VU count. With stages already present this only moves the starting count.
    pub fn set_vus(&mut self, count: usize) {
        match &mut self.executor {
            Executor::ConstantVus { vus, .. } => *vus = count,
            Executor::RampingVus { stages, .. } if stages.is_empty() => {
                self.executor = Executor::ConstantVus {
                    vus: count,
                    duration: Duration::ZERO,
                };
            }
            Executor::RampingVus { start_vus, .. } => *start_vus = count,
        }
    }

    pub fn set_duration(&mut self, dur: Duration) {
        match &mut self.executor {
            Executor::ConstantVus { duration, .. } => *duration = dur,
            Executor::RampingVus { stages, .. } if stages.is_empty() => {
                self.executor = Executor::ConstantVus {
                    vus: DEFAULT_START_VUS,
                    duration: dur,
                };
            }
            Executor::RampingVus { .. } => {
                tracing::warn!(
                    "Ignoring duration for {}; the stages already define it.",
                    self.name
                );
            }
        }
    }

    pub fn total_duration(&self) -> Duration {
        match &self.executor {
            Executor::RampingVus { stages, .. } => stages.iter().map(|s| s.duration).sum(),
            Executor::ConstantVus { duration, .. } => *duration,
        }
    }

    /// Upper bound of concurrently scheduled VUs.
    pub fn max_vus(&self) -> usize {
        match &self.executor {
            Executor::RampingVus { start_vus, stages } => stages
                .iter()
                .map(|s| s.target)
                .fold(*start_vus, usize::max),
            Executor::ConstantVus { vus, .. } => *vus,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Executor::RampingVus { stages, .. } = &self.executor {
            if stages.is_empty() {
                return Err(ConfigError::NoStages);
            }
        }

        if self.total_duration().is_zero() {
            return Err(ConfigError::ZeroDuration);
        }

        Ok(())
    }
}

/// Parses the endpoint a scenario targets, accepting only absolute HTTP(S) URLs.
pub fn parse_target_url(input: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(input).map_err(|e| ConfigError::InvalidUrl {
        url: input.to_string(),
        reason: e.to_string(),
    })?;

    match url.scheme() {
        "http" | "https" if url.host().is_some() => Ok(url),
        scheme => Err(ConfigError::InvalidUrl {
            url: input.to_string(),
            reason: format!("unsupported scheme `{scheme}` or missing host"),
        }),
    }
}
