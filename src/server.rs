//! Purpose: HTTP/JSON front for the fact-checking agent.
//! Exports: `ServeConfig`, `serve`, `router`, `cors_origins`.
//! Role: Axum server the explorer client talks to (`POST /ask`).
//! Invariants: Loopback-only unless explicitly allowed; CORS origins are explicit, never `*`.
//! Invariants: Agent work runs on the blocking pool; handlers never block the runtime.
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::{HeaderValue, Method, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::future::IntoFuture;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tokio::time::Duration;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::agent::Agent;
use crate::core::error::{Error, ErrorKind};

pub const DEFAULT_BIND: &str = "127.0.0.1:8000";
pub const DEFAULT_CORS_ORIGINS: &[&str] = &["http://localhost:5173", "http://127.0.0.1:5173"];

#[derive(Clone, Debug)]
pub struct ServeConfig {
    pub bind: SocketAddr,
    pub allow_non_loopback: bool,
    pub cors_origins: Vec<String>,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 8000)),
            allow_non_loopback: false,
            cors_origins: DEFAULT_CORS_ORIGINS.iter().map(|o| o.to_string()).collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct AskRequest {
    question: String,
}

#[derive(Debug, Serialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    kind: String,
    message: String,
}

pub async fn serve(config: ServeConfig, agent: Agent) -> Result<(), Error> {
    validate_config(&config)?;
    let origins = cors_origins(&config.cors_origins)?;
    let app = router(Arc::new(agent), origins);

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .map_err(|err| {
            Error::new(ErrorKind::Io)
                .with_message("failed to bind server")
                .with_source(err)
        })?;
    if let Ok(addr) = listener.local_addr() {
        tracing::info!(%addr, "listening");
    }

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
    let server = axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = shutdown_rx.await;
        })
        .into_future();
    tokio::pin!(server);

    tokio::select! {
        result = &mut server => {
            result.map_err(|err| {
                Error::new(ErrorKind::Io)
                    .with_message("server failed")
                    .with_source(err)
            })?;
        }
        _ = shutdown_signal() => {
            tracing::info!("shutting down");
            let _ = shutdown_tx.send(());
            match tokio::time::timeout(Duration::from_secs(10), &mut server).await {
                Ok(result) => result.map_err(|err| {
                    Error::new(ErrorKind::Io)
                        .with_message("server failed")
                        .with_source(err)
                })?,
                Err(_) => {
                    return Err(Error::new(ErrorKind::Io).with_message("server shutdown timed out"));
                }
            }
        }
    };
    Ok(())
}

pub fn router(agent: Arc<Agent>, origins: Vec<HeaderValue>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .allow_credentials(true);

    Router::new()
        .route("/", get(root))
        .route("/ask", post(ask))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(agent)
}

/// Parses configured origins into header values. A wildcard is refused because
/// credentials are allowed.
pub fn cors_origins(origins: &[String]) -> Result<Vec<HeaderValue>, Error> {
    origins
        .iter()
        .map(|origin| {
            let origin = origin.trim();
            if origin == "*" {
                return Err(Error::new(ErrorKind::Usage)
                    .with_message("wildcard CORS origin is not allowed")
                    .with_hint("List each origin explicitly, e.g. --cors-origin http://localhost:5173."));
            }
            HeaderValue::from_str(origin).map_err(|err| {
                Error::new(ErrorKind::Usage)
                    .with_message(format!("invalid CORS origin: {origin}"))
                    .with_source(err)
            })
        })
        .collect()
}

fn is_loopback(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(addr) => addr.is_loopback(),
        IpAddr::V6(addr) => addr.is_loopback(),
    }
}

fn validate_config(config: &ServeConfig) -> Result<(), Error> {
    if !is_loopback(config.bind.ip()) && !config.allow_non_loopback {
        return Err(Error::new(ErrorKind::Usage)
            .with_message("non-loopback bind requires explicit opt-in")
            .with_hint("Re-run with --allow-non-loopback or use a loopback address."));
    }
    cors_origins(&config.cors_origins).map(|_| ())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };
    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };
    #[cfg(unix)]
    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
    #[cfg(not(unix))]
    ctrl_c.await;
}

async fn root() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok", "endpoint": "/ask" }))
}

async fn ask(
    State(agent): State<Arc<Agent>>,
    payload: Result<Json<AskRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            return error_response(
                Error::new(ErrorKind::Usage)
                    .with_message(format!("invalid request body: {}", rejection.body_text())),
            );
        }
    };
    match tokio::task::spawn_blocking(move || agent.answer(&request.question)).await {
        Ok(report) => Json(report).into_response(),
        Err(err) => error_response(
            Error::new(ErrorKind::Internal)
                .with_message("agent task failed")
                .with_source(err),
        ),
    }
}

fn error_response(err: Error) -> Response {
    let status = match err.kind() {
        ErrorKind::Usage | ErrorKind::Decode => StatusCode::BAD_REQUEST,
        ErrorKind::RequestFailed => StatusCode::BAD_GATEWAY,
        ErrorKind::Io | ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    };
    tracing::warn!(%status, error = %err, "request failed");
    let body = ErrorEnvelope {
        error: ErrorBody {
            kind: format!("{:?}", err.kind()),
            message: err.display_message(),
        },
    };
    (status, Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::{ServeConfig, cors_origins, root, validate_config};
    use crate::agent::Agent;
    use crate::agent::providers::HttpProviderConfig;
    use crate::core::error::ErrorKind;
    use serde_json::json;

    #[tokio::test]
    async fn serve_rejects_non_loopback_bind() {
        let config = ServeConfig {
            bind: "0.0.0.0:0".parse().expect("bind"),
            ..ServeConfig::default()
        };
        let agent = Agent::with_http(&HttpProviderConfig::default()).expect("agent");
        let err = super::serve(config, agent).await.expect_err("usage error");
        assert_eq!(err.kind(), ErrorKind::Usage);
    }

    #[test]
    fn non_loopback_allowed_with_flag() {
        let config = ServeConfig {
            bind: "0.0.0.0:8000".parse().expect("bind"),
            allow_non_loopback: true,
            ..ServeConfig::default()
        };
        validate_config(&config).expect("allowed");
    }

    #[test]
    fn default_config_is_loopback_with_dev_origins() {
        let config = ServeConfig::default();
        assert_eq!(config.bind.to_string(), super::DEFAULT_BIND);
        validate_config(&config).expect("valid");
        assert_eq!(cors_origins(&config.cors_origins).expect("origins").len(), 2);
    }

    #[test]
    fn wildcard_and_malformed_origins_are_rejected() {
        let err = cors_origins(&["*".to_string()]).expect_err("wildcard");
        assert_eq!(err.kind(), ErrorKind::Usage);
        assert!(err.hint().is_some());

        let err = cors_origins(&["http://bad\norigin".to_string()]).expect_err("newline");
        assert_eq!(err.kind(), ErrorKind::Usage);
    }

    #[tokio::test]
    async fn root_reports_status_and_endpoint() {
        let body = root().await.0;
        assert_eq!(body, json!({"status": "ok", "endpoint": "/ask"}));
    }
}
