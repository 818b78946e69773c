#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

extern crate self as rampage;

#[macro_use]
#[doc(hidden)]
pub mod macros;

pub mod check;
pub mod http;
pub mod scenario;

pub(crate) mod controllers;
pub(crate) mod hook;
pub(crate) mod measurement;
pub(crate) mod pool;
pub(crate) mod timer;

pub use http::{HttpClient, HttpResponse};
pub use rampage_core::{
    parse_target_url, CheckSummary, ConfigError, Executor, LatencySummary, RunStatistics, Stage,
    DEFAULT_GRACEFUL_RAMP_DOWN, DEFAULT_GRACEFUL_STOP, DEFAULT_HTTP_TIMEOUT, DEFAULT_START_VUS,
};
pub use rampage_macros::scenario;
pub use scenario::Scenario;

/// What awaiting a [`Scenario`] resolves to.
pub type RunResult = Result<RunStatistics, ConfigError>;

pub mod prelude {
    pub use crate::check;
    pub use crate::http::{HttpClient, HttpResponse};
    pub use crate::scenario::ConfigurableScenario;
    pub use rampage_core::{RunStatistics, Stage};
    pub use rampage_macros::scenario;
}
