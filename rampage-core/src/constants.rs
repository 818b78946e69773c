use std::time::Duration;

/// VUs running when a ramping scenario starts, before the first stage moves them.
pub const DEFAULT_START_VUS: usize = 1;

/// How long a VU removed by a ramp-down may keep running its current iteration.
pub const DEFAULT_GRACEFUL_RAMP_DOWN: Duration = Duration::from_secs(30);

/// How long in-flight iterations may run once the scenario duration is over.
pub const DEFAULT_GRACEFUL_STOP: Duration = Duration::from_secs(30);

/// Interval between VU count adjustments.
pub const BASE_INTERVAL: Duration = Duration::from_millis(50);

/// Interval between progress log lines.
pub const PROGRESS_INTERVAL: Duration = Duration::from_secs(10);

pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(60);
