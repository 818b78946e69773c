mod utils;
use utils::*;

use clap::Parser;
use stats_smoke::Args;
use std::time::Duration;

#[tokio::test(flavor = "multi_thread")]
async fn slow_responses_only_fail_the_latency_check() {
    let (addr, _state) = mock(Duration::ZERO).await;
    let args = Args::parse_from(short_run_args(&format!(
        "http://{addr}/status/200/delay/ms/300/stats"
    )));

    let stats = tokio::time::timeout(Duration::from_secs(30), stats_smoke::run(&args))
        .await
        .expect("smoke run should finish")
        .expect("failing checks do not fail the run");

    assert!(stats.iterations > 0);
    assert_eq!(stats.http_req_failed, 0);

    let status = stats.check("status 200").unwrap();
    assert_eq!((status.passes, status.fails), (stats.iterations, 0));

    let latency = stats.check("time < 200ms").unwrap();
    assert_eq!((latency.passes, latency.fails), (0, stats.iterations));

    assert!(stats.http_req_duration.min >= Duration::from_millis(300));
    assert!(stats.iteration_duration.min >= Duration::from_millis(1_300));
}
