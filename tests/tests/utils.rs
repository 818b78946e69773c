use mock_service::MockState;
use std::net::SocketAddr;
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tracing::error;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[allow(unused)]
pub fn init() {
    static ONCE_LOCK: OnceLock<()> = OnceLock::new();

    ONCE_LOCK.get_or_init(|| {
        let default_panic = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            default_panic(info);
            error!("Panic occurred: {info:?}");
        }));

        FmtSubscriber::builder()
            .with_env_filter(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new("rampage=debug,stats_smoke=debug,mock_service=info")),
            )
            .with_test_writer()
            .init();
    });
}

/// Starts a mock `/stats` service whose plain route answers after `delay`.
#[allow(unused)]
pub async fn mock(delay: Duration) -> (SocketAddr, Arc<MockState>) {
    init();
    mock_service::spawn(delay)
        .await
        .expect("mock service should bind a local port")
}

/// Command line for a short smoke run against `url`.
#[allow(unused)]
pub fn short_run_args(url: &str) -> Vec<String> {
    [
        "stats-smoke",
        "--url",
        url,
        "--stage",
        "1s:3,1s:3,1s:0",
        "--graceful-stop",
        "5s",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}
