//! HTTP entry point for applying stored releases.
//!
//! ## Routes
//!
//! - `POST /apply` with body `{"unique_id": "..."}` fetches the release
//!   from the store and installs or upgrades it in the cluster depending
//!   on its installed state. Requires the configured bearer token when
//!   one is set.
//! - `GET /health` is a liveness probe, unauthenticated.

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use helmstash_core::{error::CoreError, installer::ChartInstaller, release::Release};
use helmstash_store::{ReleaseStore, StoreError};
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tracing::info;

/// Shared state behind the API handlers.
pub struct ApiState {
    store: ReleaseStore,
    installer: Arc<dyn ChartInstaller>,
    timeout: Duration,
    auth_token: Option<String>,
}

impl ApiState {
    pub fn new(store: ReleaseStore, installer: Arc<dyn ChartInstaller>) -> Self {
        Self {
            store,
            installer,
            timeout: Duration::from_secs(30),
            auth_token: None,
        }
    }

    /// Sets the deadline applied to store operations.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Requires the given bearer token on the apply endpoint.
    pub fn with_auth_token(mut self, token: Option<String>) -> Self {
        self.auth_token = token;
        self
    }
}

#[derive(Error, Diagnostic, Debug)]
pub enum ApplyError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Installer(#[from] CoreError),

    #[error("Store operation timed out")]
    #[diagnostic(code(helmstash_server::timeout))]
    Timeout,
}

/// Maps an apply failure to its response status: a missing release is the
/// caller's mistake, everything else is internal.
fn error_status(err: &ApplyError) -> StatusCode {
    match err {
        ApplyError::Store(store_err) if store_err.is_not_found() => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[derive(Deserialize)]
struct ApplyRequest {
    unique_id: String,
}

#[derive(Serialize)]
struct ApplyResponse {
    status: &'static str,
    message: String,
}

/// Builds the router with logging on all routes and auth on `/apply`.
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/apply", post(apply_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_auth,
        ))
        .route("/health", get(health_handler))
        .layer(middleware::from_fn(log_requests))
        .with_state(state)
}

/// Serves the API at `addr` until ctrl-c.
pub async fn serve(state: Arc<ApiState>, addr: &str) -> Result<(), std::io::Error> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

async fn health_handler() -> impl IntoResponse {
    Json(json!({ "ok": true }))
}

async fn apply_handler(
    State(state): State<Arc<ApiState>>,
    Json(request): Json<ApplyRequest>,
) -> Response {
    let outcome = apply_release(&state, &request.unique_id).await;
    match outcome {
        Ok(applied) => {
            info!(
                unique_id = %request.unique_id,
                release = %applied.release.name,
                chart = %applied.release.chart,
                version = %applied.release.version,
                namespace = %applied.release.namespace,
                successful = true,
                "apply"
            );
            let body = ApplyResponse {
                status: "success",
                message: format!("Successfully applied {}", applied.release.name),
            };
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(err) => {
            info!(
                unique_id = %request.unique_id,
                successful = false,
                error = %err,
                "apply"
            );
            let body = ApplyResponse {
                status: "error",
                message: err.to_string(),
            };
            (error_status(&err), Json(body)).into_response()
        }
    }
}

struct Applied {
    release: Release,
}

async fn apply_release(state: &ApiState, unique_id: &str) -> Result<Applied, ApplyError> {
    let release = tokio::time::timeout(state.timeout, state.store.get(unique_id))
        .await
        .map_err(|_| ApplyError::Timeout)??;

    match state.installer.installed_state(&release.name).await {
        Ok(_) => {
            state
                .installer
                .upgrade(&release.name, &release.chart, &release.version, &release.values)
                .await?;
        }
        Err(CoreError::ReleaseNotInstalled(_)) => {
            state
                .installer
                .install(
                    &release.name,
                    &release.namespace,
                    &release.chart,
                    &release.version,
                    &release.values,
                )
                .await?;
        }
        Err(err) => return Err(err.into()),
    }
    Ok(Applied { release })
}

async fn require_auth(
    State(state): State<Arc<ApiState>>,
    request: Request,
    next: Next,
) -> Response {
    if let Some(expected) = &state.auth_token {
        let presented = request
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok());
        if !token_matches(presented, expected) {
            let body = Json(json!({ "error": "unauthorized" }));
            return (StatusCode::UNAUTHORIZED, body).into_response();
        }
    }
    next.run(request).await
}

fn token_matches(presented: Option<&str>, expected: &str) -> bool {
    presented
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token == expected)
        .unwrap_or(false)
}

async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();
    let response = next.run(request).await;
    info!(
        %method,
        path,
        status = response.status().as_u16(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "request"
    );
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_mapping() {
        let not_found = ApplyError::Store(StoreError::NotFound {
            unique_id: "abc123".to_string(),
        });
        assert_eq!(error_status(&not_found), StatusCode::NOT_FOUND);

        let backend = ApplyError::Store(StoreError::Backend {
            backend: "dynamodb",
            op: "get",
            message: "throttled".to_string(),
        });
        assert_eq!(error_status(&backend), StatusCode::INTERNAL_SERVER_ERROR);

        let helm = ApplyError::Installer(CoreError::HelmCommand {
            op: "upgrade".to_string(),
            stderr: "boom".to_string(),
        });
        assert_eq!(error_status(&helm), StatusCode::INTERNAL_SERVER_ERROR);

        assert_eq!(
            error_status(&ApplyError::Timeout),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_token_matching() {
        assert!(token_matches(Some("Bearer secret"), "secret"));
        assert!(!token_matches(Some("Bearer wrong"), "secret"));
        assert!(!token_matches(Some("secret"), "secret"));
        assert!(!token_matches(None, "secret"));
    }
}
