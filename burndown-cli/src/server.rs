//! HTTP surface: `/api/burndownchart` and `/api/sprints`.
//!
//! Each request derives its own `RequestConfig` from the shared, read-only
//! defaults plus its query string.

use anyhow::{Context, Result};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use burndown_core::time::today_in;
use burndown_core::{BurndownChart, BurndownError, RequestConfig, RequestOverrides, SprintSummary};
use burndown_tracker::{BurndownService, GitHubTracker};
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Clone)]
pub struct AppState {
    defaults: Arc<RequestConfig>,
    api_base: Option<Arc<str>>,
}

impl AppState {
    pub fn new(defaults: RequestConfig, api_base: Option<String>) -> Self {
        Self {
            defaults: Arc::new(defaults),
            api_base: api_base.map(Arc::from),
        }
    }

    fn request(
        &self,
        overrides: &RequestOverrides,
    ) -> Result<(RequestConfig, BurndownService<GitHubTracker>), BurndownError> {
        let cfg = self.defaults.apply(overrides)?;
        let mut tracker = GitHubTracker::new(&cfg)?;
        if let Some(base) = &self.api_base {
            tracker = tracker.with_api_base(base.to_string());
        }
        Ok((cfg, BurndownService::new(tracker)))
    }
}

/// Error body `{"error": "..."}` with the status for its kind.
pub struct ApiError(BurndownError);

impl From<BurndownError> for ApiError {
    fn from(e: BurndownError) -> Self {
        ApiError(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        warn!(status = status.as_u16(), error = %self.0, "request failed");
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/burndownchart", get(burndown_chart))
        .route("/api/sprints", get(sprints))
        .with_state(state)
}

async fn burndown_chart(
    State(state): State<AppState>,
    Query(overrides): Query<RequestOverrides>,
) -> Result<Json<BurndownChart>, ApiError> {
    let (cfg, service) = state.request(&overrides)?;
    let today = today_in(&cfg.timezone)?;
    let chart = service.chart(&cfg, today).await?;
    Ok(Json(chart))
}

async fn sprints(
    State(state): State<AppState>,
    Query(overrides): Query<RequestOverrides>,
) -> Result<Json<Vec<SprintSummary>>, ApiError> {
    let (cfg, service) = state.request(&overrides)?;
    let today = today_in(&cfg.timezone)?;
    Ok(Json(service.sprints(&cfg, today).await?))
}

pub async fn serve(addr: &str, state: AppState) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("bind {addr}"))?;
    info!(%addr, "serving burndown API");
    axum::serve(listener, router(state)).await.context("server")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use burndown_core::RepoId;
    use tower::ServiceExt;

    fn app(token: Option<&str>) -> Router {
        let mut defaults = RequestConfig::new(RepoId::parse("cosminmemetea/dashboards").unwrap());
        defaults.token = token.map(str::to_string);
        router(AppState::new(defaults, Some("http://127.0.0.1:9".to_string())))
    }

    async fn call(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let resp = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_missing_token_is_401_without_network() {
        let (status, body) = call(app(None), "/api/burndownchart").await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body["error"].as_str().unwrap().contains("token"));

        let (status, _) = call(app(None), "/api/sprints").await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_bad_override_is_400() {
        let (status, body) = call(app(Some("ghp_x")), "/api/burndownchart?policy=linear").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("linear"));

        let (status, _) = call(app(Some("ghp_x")), "/api/sprints?repo=noslash").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unreachable_tracker_is_502() {
        let (status, body) = call(app(Some("ghp_x")), "/api/sprints").await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(body["error"].as_str().unwrap().starts_with("failed to fetch projects"));
    }
}
