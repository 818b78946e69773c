mod utils;
use utils::*;

use mock_service::prelude::*;
use rampage::prelude::*;
use std::num::NonZeroU32;
use std::sync::OnceLock;
use std::time::Duration;

static CLIENT: OnceLock<HttpClient> = OnceLock::new();
static RAMP_TARGET: OnceLock<String> = OnceLock::new();
static LIMITED_TARGET: OnceLock<String> = OnceLock::new();

#[scenario]
async fn ramp_stats() {
    let client = CLIENT.get_or_init(HttpClient::new);
    let res = client.get(RAMP_TARGET.get().unwrap()).await;
    check!(res, {
        "status 200" => |r| r.status == 200,
        "body is stats" => |r| r.json::<StatsResponse>().is_ok(),
    });
    tokio::time::sleep(Duration::from_millis(100)).await;
}

#[scenario]
async fn limited_stats() {
    let client = CLIENT.get_or_init(HttpClient::new);
    let res = client.get(LIMITED_TARGET.get().unwrap()).await;
    check!(res, { "status 200" => |r| r.status == 200 });
}

#[tokio::test(flavor = "multi_thread")]
async fn follows_stage_targets() {
    let (addr, state) = mock(Duration::from_millis(5)).await;
    RAMP_TARGET.set(format!("http://{addr}/stats")).unwrap();

    let stats = ramp_stats()
        .start_vus(0)
        .stage(Duration::from_millis(500), 5)
        .stage(Duration::from_millis(500), 5)
        .stage(Duration::from_millis(500), 0)
        .await
        .unwrap();

    assert_eq!(stats.name, "ramp_stats");
    assert_eq!(stats.max_vus, 5);
    assert_eq!(stats.interrupted_iterations, 0);
    assert_eq!(state.hits(), stats.http_reqs);
    assert_eq!(stats.http_reqs, stats.iterations);

    let body = stats.check("body is stats").unwrap();
    assert_eq!(body.passes, stats.iterations);
    assert!(stats.duration >= Duration::from_millis(1_500));
}

#[tokio::test(flavor = "multi_thread")]
async fn max_rps_caps_requests() {
    let (addr, state) = mock(Duration::ZERO).await;
    LIMITED_TARGET.set(format!("http://{addr}/stats")).unwrap();

    let stats = limited_stats()
        .vus(5)
        .duration(Duration::from_secs(2))
        .max_rps(NonZeroU32::new(10).unwrap())
        .graceful_stop(Duration::from_secs(5))
        .await
        .unwrap();

    assert!(stats.http_reqs >= 10, "too few requests: {}", stats.http_reqs);
    assert!(stats.http_reqs <= 30, "too many requests: {}", stats.http_reqs);
    assert_eq!(stats.interrupted_iterations, 0);
    assert_eq!(state.hits(), stats.http_reqs);
}
