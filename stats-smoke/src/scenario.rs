use crate::config::Settings;
use anyhow::bail;
use rampage::prelude::*;
use std::sync::OnceLock;
use std::time::Duration;

static SETTINGS: OnceLock<Settings> = OnceLock::new();
static CLIENT: OnceLock<HttpClient> = OnceLock::new();

pub const STATUS_CHECK: &str = "status 200";

/// Sets what every iteration targets. Can only be done once per process.
pub fn configure(settings: Settings) -> anyhow::Result<()> {
    let current = SETTINGS.get_or_init(|| settings.clone());
    if *current != settings {
        bail!("The smoke scenario is already configured for {}", current.url);
    }
    Ok(())
}

fn settings() -> &'static Settings {
    SETTINGS.get_or_init(Settings::default)
}

pub fn status_ok(res: &HttpResponse) -> bool {
    res.status == 200
}

pub fn fast_enough(res: &HttpResponse, threshold: Duration) -> bool {
    res.duration < threshold
}

#[scenario]
pub async fn stats_smoke() {
    let settings = settings();
    let client = CLIENT.get_or_init(|| HttpClient::with_timeout(settings.timeout));

    let res = client.get(&settings.url).await;
    check!(res, {
        STATUS_CHECK => status_ok,
        &settings.latency_check => |r| fast_enough(r, settings.latency_threshold),
    });

    tokio::time::sleep(settings.sleep).await;
}
