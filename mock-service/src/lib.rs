use axum::{
    debug_handler,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use metrics::counter;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};
use std::time::Duration;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

pub mod prelude {
    pub use crate::{ErrorResponse, MockState, PrStats, StatsResponse, UserStats};
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStats {
    pub user_id: String,
    pub assignments: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrStats {
    pub pull_request_id: String,
    pub reviewers: u32,
}

/// Body of `GET /stats`: review assignments per user and reviewers per pull request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsResponse {
    pub by_user: Vec<UserStats>,
    pub by_pr: Vec<PrStats>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorObject,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorObject {
    pub code: String,
    pub message: String,
}

/// Per-server state. `delay` applies to the plain `/stats` route.
#[derive(Debug, Default)]
pub struct MockState {
    pub delay: Duration,
    hits: AtomicU64,
}

impl MockState {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            hits: AtomicU64::new(0),
        }
    }

    /// Requests served since start.
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    fn hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
        counter!("mock_service_requests").increment(1);
    }
}

pub fn router(state: Arc<MockState>) -> Router {
    Router::new()
        .route("/stats", get(stats))
        .route("/status/:status/delay/ms/:delay_ms/stats", get(controlled_stats))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run(addr: SocketAddr, state: Arc<MockState>) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Mock service listening on {}", listener.local_addr()?);
    axum::serve(listener, router(state)).await?;
    Ok(())
}

/// Starts the service on an ephemeral local port in the background.
pub async fn spawn(delay: Duration) -> anyhow::Result<(SocketAddr, Arc<MockState>)> {
    let state = Arc::new(MockState::new(delay));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;

    let app = router(state.clone());
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!("Mock service stopped: {e}");
        }
    });

    Ok((addr, state))
}

#[debug_handler]
async fn stats(State(state): State<Arc<MockState>>) -> Json<StatsResponse> {
    state.hit();
    tokio::time::sleep(state.delay).await;
    Json(sample_stats())
}

#[debug_handler]
async fn controlled_stats(
    State(state): State<Arc<MockState>>,
    Path((status, delay_ms)): Path<(u16, u64)>,
) -> Response {
    state.hit();
    tokio::time::sleep(Duration::from_millis(delay_ms)).await;

    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    debug!("Responding with {status} after {delay_ms}ms");

    if status.is_success() {
        (status, Json(sample_stats())).into_response()
    } else {
        let body = ErrorResponse {
            error: ErrorObject {
                code: status
                    .canonical_reason()
                    .unwrap_or("ERROR")
                    .to_uppercase()
                    .replace(' ', "_"),
                message: format!("mock failure {}", status.as_u16()),
            },
        };
        (status, Json(body)).into_response()
    }
}

fn sample_stats() -> StatsResponse {
    StatsResponse {
        by_user: vec![
            UserStats {
                user_id: "u1".to_string(),
                assignments: 3,
            },
            UserStats {
                user_id: "u2".to_string(),
                assignments: 1,
            },
        ],
        by_pr: vec![PrStats {
            pull_request_id: "pr-1001".to_string(),
            reviewers: 2,
        }],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn serves_stats() {
        let (addr, state) = spawn(Duration::ZERO).await.unwrap();

        let body: StatsResponse = reqwest::get(format!("http://{addr}/stats"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();

        assert_eq!(body.by_user.len(), 2);
        assert_eq!(body.by_pr[0].reviewers, 2);
        assert_eq!(state.hits(), 1);
    }

    #[tokio::test]
    async fn controlled_failure() {
        let (addr, _state) = spawn(Duration::ZERO).await.unwrap();

        let res = reqwest::get(format!("http://{addr}/status/503/delay/ms/1/stats"))
            .await
            .unwrap();
        assert_eq!(res.status().as_u16(), 503);

        let body: ErrorResponse = res.json().await.unwrap();
        assert_eq!(body.error.code, "SERVICE_UNAVAILABLE");
    }
}
