mod utils;
use utils::*;

use clap::Parser;
use stats_smoke::Args;
use std::time::Duration;

#[tokio::test(flavor = "multi_thread")]
async fn refused_connections_are_recorded_not_raised() {
    init();
    let addr = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };

    let mut args = short_run_args(&format!("http://{addr}/stats"));
    args.extend(["--timeout".to_string(), "2s".to_string()]);
    let args = Args::parse_from(args);

    let stats = tokio::time::timeout(Duration::from_secs(30), stats_smoke::run(&args))
        .await
        .expect("smoke run should finish")
        .expect("unreachable targets do not fail the run");

    assert!(stats.http_reqs > 0);
    assert_eq!(stats.http_req_failed, stats.http_reqs);

    let status = stats.check("status 200").unwrap();
    assert_eq!(status.passes, 0);
    assert_eq!(status.fails, stats.iterations);
}

#[tokio::test]
async fn invalid_url_is_a_configuration_error() {
    let args = Args::parse_from(short_run_args("app:8080/stats"));
    let err = stats_smoke::run(&args).await.unwrap_err();
    assert!(err.to_string().contains("Invalid target URL"));
}
