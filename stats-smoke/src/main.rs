use clap::Parser;
use metrics_exporter_prometheus::PrometheusBuilder;
use stats_smoke::Args;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("rampage=info,stats_smoke=info")),
        )
        .init();

    if let Some(addr) = args.metrics_addr {
        PrometheusBuilder::new().with_http_listener(addr).install()?;
        tracing::info!("Serving metrics on {addr}");
    }

    let stats = stats_smoke::run(&args).await?;
    println!("{stats}");

    Ok(())
}
