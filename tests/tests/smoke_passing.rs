mod utils;
use utils::*;

use clap::Parser;
use stats_smoke::Args;
use std::time::Duration;

#[tokio::test(flavor = "multi_thread")]
async fn healthy_endpoint_passes_both_checks() {
    let (addr, state) = mock(Duration::from_millis(50)).await;

    let summary_path =
        std::env::temp_dir().join(format!("stats-smoke-summary-{}.json", std::process::id()));
    let mut args = short_run_args(&format!("http://{addr}/stats"));
    args.push("--summary-export".to_string());
    args.push(summary_path.display().to_string());
    let args = Args::parse_from(args);

    let stats = tokio::time::timeout(Duration::from_secs(30), stats_smoke::run(&args))
        .await
        .expect("smoke run should finish")
        .expect("smoke run should succeed");

    assert!(stats.iterations > 0);
    assert_eq!(stats.interrupted_iterations, 0);
    assert_eq!(stats.max_vus, 3);

    // One GET per iteration.
    assert_eq!(stats.http_reqs, stats.iterations);
    assert_eq!(state.hits(), stats.http_reqs);
    assert_eq!(stats.http_req_failed, 0);

    let status = stats.check("status 200").unwrap();
    assert_eq!((status.passes, status.fails), (stats.iterations, 0));
    let latency = stats.check("time < 200ms").unwrap();
    assert_eq!((latency.passes, latency.fails), (stats.iterations, 0));
    assert_eq!(stats.checks_rate(), Some(1.));

    assert!(stats.http_req_duration.min >= Duration::from_millis(50));
    // Every iteration sleeps a full second after its checks.
    assert!(stats.iteration_duration.min >= Duration::from_millis(1_050));

    let summary: serde_json::Value =
        serde_json::from_slice(&std::fs::read(&summary_path).unwrap()).unwrap();
    assert_eq!(summary["checks"][0]["name"], "status 200");
    assert_eq!(summary["iterations"], stats.iterations);
    let _ = std::fs::remove_file(summary_path);
}
