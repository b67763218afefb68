//! Purpose: Shared helpers for integration tests that need a live HTTP endpoint.
//! Role: Runs an axum router on a loopback port inside a background thread.
//! Invariants: Each call binds a fresh ephemeral port; the server lives until the test process exits.
#![allow(dead_code)]

use axum::Router;
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use axum::routing::post;
use std::net::SocketAddr;
use std::sync::mpsc;
use std::thread;

pub const ANSWER_BODY: &str = r#"{"claim":"When was the Eiffel Tower completed?","answer":"1889","sources":["https://en.wikipedia.org/wiki/Eiffel_Tower",{"title":"Eiffel Tower","score":0.6}],"confidence":0.6025,"notes":null,"reward_breakdown":{"raw":{"freshness":0.5}}}"#;

pub fn spawn_app(app: Router) -> SocketAddr {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .expect("runtime");
        runtime.block_on(async move {
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
                .await
                .expect("bind");
            tx.send(listener.local_addr().expect("addr")).expect("send addr");
            axum::serve(listener, app).await.expect("serve");
        });
    });
    rx.recv().expect("server addr")
}

/// Stub answer endpoint: `/ask` returns a canned report, `/fail` returns 503,
/// `/array` returns a non-object body, `/garbage` returns invalid JSON.
pub fn spawn_stub_agent() -> SocketAddr {
    let app = Router::new()
        .route("/ask", post(|| async { json_body(ANSWER_BODY) }))
        .route(
            "/fail",
            post(|| async { (StatusCode::SERVICE_UNAVAILABLE, "agent overloaded").into_response() }),
        )
        .route("/array", post(|| async { json_body("[1,2]") }))
        .route("/garbage", post(|| async { "not json" }));
    spawn_app(app)
}

fn json_body(body: &'static str) -> axum::response::Response {
    ([(header::CONTENT_TYPE, "application/json")], body).into_response()
}

/// A loopback address with nothing listening on it.
pub fn closed_addr() -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    addr
}
