//! Minimal HTTP client measuring every request it makes.
use crate::hook::{self, ITERATION_HOOK};
use rampage_core::DEFAULT_HTTP_TIMEOUT;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};
#[allow(unused)]
use tracing::{debug, error, trace, warn};

/// Response of a single request.
///
/// `status` is `0` when no response was received at all (connection refused, timeout, ...), in
/// which case `error` holds the reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    /// Time from sending the request until the full body was read.
    pub duration: Duration,
    pub body: Vec<u8>,
    pub error: Option<String>,
}

impl HttpResponse {
    /// A request counts as failed unless it completed with a 2xx or 3xx status.
    pub fn is_failed(&self) -> bool {
        self.error.is_some() || !(200..400).contains(&self.status)
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_HTTP_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        let client = Client::builder().timeout(timeout).build().unwrap_or_else(|e| {
            error!("Unable to build HTTP client with timeout ({e}); using defaults.");
            Client::new()
        });

        Self { client }
    }

    /// Issues a GET request. Never fails: errors are reported through the response.
    pub async fn get(&self, url: &str) -> HttpResponse {
        hook::until_ready().await;

        let start = Instant::now();
        let res = match self.client.get(url).send().await {
            Ok(res) => {
                let status = res.status().as_u16();
                match res.bytes().await {
                    Ok(body) => HttpResponse {
                        status,
                        duration: start.elapsed(),
                        body: body.to_vec(),
                        error: None,
                    },
                    Err(e) => {
                        debug!("Reading body of GET {url} failed: {e}");
                        HttpResponse {
                            status,
                            duration: start.elapsed(),
                            body: vec![],
                            error: Some(e.to_string()),
                        }
                    }
                }
            }
            Err(e) => {
                debug!("GET {url} failed: {e}");
                HttpResponse {
                    status: 0,
                    duration: start.elapsed(),
                    body: vec![],
                    error: Some(e.to_string()),
                }
            }
        };

        trace!("GET {url} -> {} in {:?}", res.status, res.duration);
        record(&res);
        res
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

fn record(res: &HttpResponse) {
    let failed = res.is_failed();
    let _ = ITERATION_HOOK.try_with(|hook| hook.record_http(res.duration, failed));

    #[cfg(feature = "metrics")]
    {
        metrics::counter!("rampage_http_reqs", "status" => res.status.to_string()).increment(1);
        if failed {
            metrics::counter!("rampage_http_req_failed").increment(1);
        }
        metrics::histogram!("rampage_http_req_duration").record(res.duration.as_secs_f64());
    }
}
