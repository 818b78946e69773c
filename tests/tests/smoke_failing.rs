mod utils;
use utils::*;

use clap::Parser;
use stats_smoke::Args;
use std::time::Duration;

#[tokio::test(flavor = "multi_thread")]
async fn server_errors_only_fail_the_status_check() {
    let (addr, state) = mock(Duration::ZERO).await;
    let args = Args::parse_from(short_run_args(&format!(
        "http://{addr}/status/500/delay/ms/10/stats"
    )));

    let stats = tokio::time::timeout(Duration::from_secs(30), stats_smoke::run(&args))
        .await
        .expect("smoke run should finish")
        .expect("failing checks do not fail the run");

    assert!(stats.iterations > 0);
    assert_eq!(state.hits(), stats.http_reqs);
    assert_eq!(stats.http_req_failed, stats.http_reqs);

    let status = stats.check("status 200").unwrap();
    assert_eq!((status.passes, status.fails), (0, stats.iterations));

    // Evaluated independently of the failed status check.
    let latency = stats.check("time < 200ms").unwrap();
    assert_eq!((latency.passes, latency.fails), (stats.iterations, 0));

    assert_eq!(stats.checks_rate(), Some(0.5));
}
