//! Local HTTP server standing in for the remote API in tests.
//!
//! Each route produces one well-known outcome the executor has to handle:
//! a plain 200, a JSON body, a 404, an arbitrary status, a slow reply, a
//! large body, a redirect, duplicated response headers, and an echo of the
//! received request.

use std::{collections::BTreeMap, time::Duration};

use axum::{
    body::Bytes,
    extract::Path,
    http::{header, HeaderMap, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Redirect, Response},
    routing::{any, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;

/// How long `/slow` waits before answering.
pub const SLOW_DELAY: Duration = Duration::from_secs(5);

/// What `/echo` observed about the incoming request.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Echo {
    pub method: String,
    /// Lowercased header names; repeated headers are joined with `", "`.
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

pub fn app() -> Router {
    Router::new()
        .route("/ok", get(ok))
        .route("/json", get(json))
        .route("/not-found", get(not_found))
        .route("/status/{code}", any(status))
        .route("/slow", get(slow))
        .route("/large/{bytes}", get(large))
        .route("/redirect", get(redirect))
        .route("/duplicate-headers", get(duplicate_headers))
        .route("/echo", any(echo))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    if let Ok(addr) = listener.local_addr() {
        tracing::info!(%addr, "mock server listening");
    }
    axum::serve(listener, app()).await
}

async fn ok() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], "hello")
}

async fn json() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/json; charset=utf-8")],
        r#"{"title":"Rust (programming language)","pageid":29414838}"#,
    )
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "not found")
}

async fn status(Path(code): Path<u16>) -> Response {
    match StatusCode::from_u16(code) {
        Ok(status) => (status, format!("status {code}")).into_response(),
        Err(_) => (StatusCode::BAD_REQUEST, "invalid status code").into_response(),
    }
}

async fn slow() -> impl IntoResponse {
    tokio::time::sleep(SLOW_DELAY).await;
    "finally"
}

/// `bytes` ASCII letters, with a 200 status.
async fn large(Path(bytes): Path<usize>) -> String {
    "a".repeat(bytes)
}

async fn redirect() -> Redirect {
    Redirect::to("/ok")
}

async fn duplicate_headers() -> impl IntoResponse {
    let mut headers = HeaderMap::new();
    headers.append("x-wiki-tag", HeaderValue::from_static("first"));
    headers.append("x-wiki-tag", HeaderValue::from_static("second"));
    (headers, "tagged")
}

async fn echo(method: Method, headers: HeaderMap, body: Bytes) -> Json<Echo> {
    let mut seen: BTreeMap<String, String> = BTreeMap::new();
    for (name, value) in &headers {
        let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
        seen.entry(name.as_str().to_string())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(&value);
            })
            .or_insert(value);
    }
    Json(Echo {
        method: method.to_string(),
        headers: seen,
        body: String::from_utf8_lossy(&body).into_owned(),
    })
}
