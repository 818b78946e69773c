/// Evaluates named predicates against a value and records each outcome.
///
/// Every predicate runs, whatever the outcome of the others. Returns `true` when all passed.
///
/// # Example
/// ```no_run
/// use rampage::prelude::*;
/// use std::time::Duration;
///
/// # async fn run() {
/// let res = HttpClient::new().get("http://localhost:8080/stats").await;
/// let ok = check!(res, {
///     "status 200" => |r| r.status == 200,
///     "time < 200ms" => |r| r.duration < Duration::from_millis(200),
/// });
/// # }
/// ```
#[macro_export]
macro_rules! check {
    ($value:expr, { $($name:expr => $predicate:expr),+ $(,)? }) => {{
        let value = &$value;
        let mut all_passed = true;
        $(
            let passed = $crate::check::eval(value, $predicate);
            all_passed &= $crate::check::record($name, passed);
        )+
        all_passed
    }};
}
