use clap::Parser;
use metrics_exporter_prometheus::PrometheusBuilder;
use mock_service::MockState;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Stand-in for the `/stats` endpoint of the review assignment service.
#[derive(Debug, Parser)]
struct Args {
    #[arg(long, env = "MOCK_ADDR", default_value = "0.0.0.0:8080")]
    addr: SocketAddr,

    /// Delay applied to every `/stats` response, e.g. `50ms`.
    #[arg(long, env = "MOCK_DELAY", default_value = "0ms", value_parser = humantime::parse_duration)]
    delay: Duration,

    /// Serve Prometheus metrics on this address.
    #[arg(long, env = "MOCK_METRICS_ADDR")]
    metrics_addr: Option<SocketAddr>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("mock_service=debug,tower_http=debug")),
        )
        .init();

    if let Some(addr) = args.metrics_addr {
        PrometheusBuilder::new().with_http_listener(addr).install()?;
    }

    mock_service::run(args.addr, Arc::new(MockState::new(args.delay))).await
}
