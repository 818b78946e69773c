//! Named pass/fail assertions recorded per iteration.
use crate::hook::ITERATION_HOOK;
use tracing::{trace, warn};

/// Records the outcome of the check `name` and returns `passed`.
///
/// Inside a running scenario the result is counted toward the run summary. Outside of one it is
/// only logged.
pub fn record(name: &str, passed: bool) -> bool {
    trace!(check = name, passed, "check");

    let recorded = ITERATION_HOOK.try_with(|hook| hook.record_check(name, passed));
    if recorded.is_err() {
        warn!("Check `{name}` recorded outside of a scenario; ignoring.");
    }

    #[cfg(feature = "metrics")]
    metrics::counter!(
        "rampage_checks",
        "check" => name.to_string(),
        "result" => if passed { "pass" } else { "fail" }
    )
    .increment(1);

    passed
}

#[doc(hidden)]
pub fn eval<V: ?Sized, P: FnOnce(&V) -> bool>(value: &V, predicate: P) -> bool {
    predicate(value)
}
