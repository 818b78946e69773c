use std::num::ParseIntError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Stage `{0}` is not of the form <duration>:<target>")]
    InvalidStage(String),

    #[error("Invalid stage duration `{input}`: {source}")]
    InvalidDuration {
        input: String,
        #[source]
        source: humantime::DurationError,
    },

    #[error("Invalid stage target `{input}`: {source}")]
    InvalidTarget {
        input: String,
        #[source]
        source: ParseIntError,
    },

    #[error("A ramping scenario needs at least one stage")]
    NoStages,

    #[error("Scenario duration is zero")]
    ZeroDuration,

    #[error("Invalid target URL `{url}`: {reason}")]
    InvalidUrl { url: String, reason: String },
}
