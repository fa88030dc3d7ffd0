//! End-to-end exchanges against the live mock server.
//!
//! # Design
//! Each test starts the mock server on a random port in a background thread
//! with its own tokio runtime, then drives `HttpExecutor` over real sockets.

use std::io::{Read, Write};
use std::net::TcpListener;
use std::thread;

use mock_server::Echo;
use wikinet_core::{
    ApiError, ErrorKind, ExecutorConfig, HttpExecutor, HttpRequest, RequestOptions,
    DEFAULT_USER_AGENT,
};

/// Start the mock server and return its base URL, e.g. `http://127.0.0.1:4321`.
fn start_server() -> String {
    let std_listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    format!("http://{addr}")
}

/// A local address nothing is listening on.
fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}/ok")
}

/// Serve exactly one connection with a fixed raw HTTP/1.1 response.
fn start_raw_server(response: &'static [u8]) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = stream.read(&mut buf).unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
        }
        stream.write_all(response).unwrap();
        stream.flush().unwrap();
    });

    format!("http://{addr}")
}

fn echo_of(response: &wikinet_core::HttpResponse) -> Echo {
    serde_json::from_str(&response.body).unwrap()
}

// ---------------------------------------------------------------------------
// Success paths
// ---------------------------------------------------------------------------

#[test]
fn get_ok_returns_buffered_body() {
    let base = start_server();
    let response = HttpExecutor::new()
        .execute(&HttpRequest::get(format!("{base}/ok")))
        .unwrap();

    assert_eq!(response.status, 200);
    assert_eq!(response.body, "hello");
    assert!(response.is_successful());
    assert!(response.content_type().unwrap().starts_with("text/plain"));
    assert_eq!(response.content_length(), Some(5));
}

#[test]
fn json_response_decodes_through_helpers() {
    #[derive(serde::Deserialize)]
    struct Page {
        title: String,
        pageid: u64,
    }

    let base = start_server();
    let response = HttpExecutor::new()
        .get(&format!("{base}/json"), RequestOptions::default())
        .unwrap();

    assert!(response.is_json());
    assert!(response.as_json_string().unwrap().contains("pageid"));
    let page: Page = response.as_json().unwrap();
    assert_eq!(page.title, "Rust (programming language)");
    assert_eq!(page.pageid, 29414838);
}

#[test]
fn redirects_are_followed() {
    let base = start_server();
    let response = HttpExecutor::new()
        .get(&format!("{base}/redirect"), RequestOptions::default())
        .unwrap();

    assert_eq!(response.status, 200);
    assert_eq!(response.body, "hello");
}

#[test]
fn duplicate_response_headers_are_joined() {
    let base = start_server();
    let response = HttpExecutor::new()
        .get(&format!("{base}/duplicate-headers"), RequestOptions::default())
        .unwrap();

    assert_eq!(response.header("X-Wiki-Tag"), Some("first, second"));
}

#[test]
fn non_utf8_header_bytes_are_kept_lossily() {
    let base = start_raw_server(
        b"HTTP/1.1 200 OK\r\nX-Name: caf\xE9\r\nContent-Length: 2\r\nConnection: close\r\n\r\nok",
    );
    let response = HttpExecutor::new()
        .execute(&HttpRequest::get(format!("{base}/")))
        .unwrap();

    assert_eq!(response.header("x-name"), Some("caf\u{FFFD}"));
    assert_eq!(response.body, "ok");
}

#[test]
fn bodies_beyond_ten_mebibytes_are_read_in_full() {
    let base = start_server();
    let size = 11 * 1024 * 1024;
    let response = HttpExecutor::new()
        .get(&format!("{base}/large/{size}"), RequestOptions::default())
        .unwrap();

    assert_eq!(response.body.len(), size);
}

// ---------------------------------------------------------------------------
// Body cap
// ---------------------------------------------------------------------------

#[test]
fn capped_error_body_is_truncated_but_still_an_http_status() {
    let base = start_server();
    let executor = HttpExecutor::with_config(ExecutorConfig::default().with_max_body_bytes(4));
    let err = executor
        .get(&format!("{base}/not-found"), RequestOptions::default())
        .unwrap_err();

    match err {
        ApiError::HttpStatus { status, body } => {
            assert_eq!(status, 404);
            assert_eq!(body, "not ");
        }
        other => panic!("expected HttpStatus, got {other:?}"),
    }
}

#[test]
fn capped_error_body_within_limit_is_untouched() {
    let base = start_server();
    let executor = HttpExecutor::with_config(ExecutorConfig::default().with_max_body_bytes(1024));
    let err = executor
        .get(&format!("{base}/not-found"), RequestOptions::default())
        .unwrap_err();

    assert!(matches!(err, ApiError::HttpStatus { status: 404, ref body } if body == "not found"));
}

#[test]
fn capped_success_body_over_limit_is_a_connection_failure() {
    let base = start_server();
    let executor = HttpExecutor::with_config(ExecutorConfig::default().with_max_body_bytes(16));
    let err = executor
        .get(&format!("{base}/large/64"), RequestOptions::default())
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ConnectionFailure, "{err}");
}

#[test]
fn capped_success_body_within_limit_is_returned() {
    let base = start_server();
    let executor = HttpExecutor::with_config(ExecutorConfig::default().with_max_body_bytes(16));
    let response = executor
        .get(&format!("{base}/ok"), RequestOptions::default())
        .unwrap();

    assert_eq!(response.body, "hello");
}

// ---------------------------------------------------------------------------
// Outgoing headers and bodies
// ---------------------------------------------------------------------------

#[test]
fn post_body_gets_default_json_content_type() {
    let base = start_server();
    let response = HttpExecutor::new()
        .execute(&HttpRequest::post(format!("{base}/echo")).with_body(r#"{"a":1}"#))
        .unwrap();

    let echo = echo_of(&response);
    assert_eq!(echo.method, "POST");
    assert_eq!(echo.headers["content-type"], "application/json; charset=UTF-8");
    assert_eq!(echo.body, r#"{"a":1}"#);
}

#[test]
fn caller_accept_header_reaches_server_unchanged() {
    let base = start_server();
    let options = RequestOptions::default().with_header("Accept", "text/plain");
    let response = HttpExecutor::new()
        .get(&format!("{base}/echo"), options)
        .unwrap();

    let echo = echo_of(&response);
    assert_eq!(echo.headers["accept"], "text/plain");
}

#[test]
fn defaults_fill_missing_accept_and_user_agent() {
    let base = start_server();
    let response = HttpExecutor::new()
        .get(&format!("{base}/echo"), RequestOptions::default())
        .unwrap();

    let echo = echo_of(&response);
    assert_eq!(echo.headers["accept"], "application/json, text/plain, */*");
    assert_eq!(echo.headers["user-agent"], DEFAULT_USER_AGENT);
    assert!(!echo.headers.contains_key("content-type"));
}

#[test]
fn configured_user_agent_is_sent() {
    let base = start_server();
    let executor =
        HttpExecutor::with_config(ExecutorConfig::default().with_user_agent("wiki-android/2.1"));
    let response = executor
        .get(&format!("{base}/echo"), RequestOptions::default())
        .unwrap();

    assert_eq!(echo_of(&response).headers["user-agent"], "wiki-android/2.1");
}

#[test]
fn get_never_writes_a_body() {
    let base = start_server();
    let response = HttpExecutor::new()
        .execute(&HttpRequest::get(format!("{base}/echo")).with_body("ignored"))
        .unwrap();

    let echo = echo_of(&response);
    assert_eq!(echo.method, "GET");
    assert!(echo.body.is_empty());
}

#[test]
fn put_and_delete_use_their_wire_names() {
    let base = start_server();
    let executor = HttpExecutor::new();
    let url = format!("{base}/echo");

    let put = executor
        .put(&url, RequestOptions::default().with_body("{}"))
        .unwrap();
    assert_eq!(echo_of(&put).method, "PUT");
    assert_eq!(echo_of(&put).body, "{}");

    let delete = executor.delete(&url, RequestOptions::default()).unwrap();
    assert_eq!(echo_of(&delete).method, "DELETE");
}

// ---------------------------------------------------------------------------
// Failure paths
// ---------------------------------------------------------------------------

#[test]
fn not_found_is_an_http_status_error() {
    let base = start_server();
    let err = HttpExecutor::new()
        .execute(&HttpRequest::get(format!("{base}/not-found")))
        .unwrap_err();

    match err {
        ApiError::HttpStatus { status, body } => {
            assert_eq!(status, 404);
            assert_eq!(body, "not found");
        }
        other => panic!("expected HttpStatus, got {other:?}"),
    }
}

#[test]
fn server_error_is_an_http_status_error() {
    let base = start_server();
    let err = HttpExecutor::new()
        .post(&format!("{base}/status/500"), RequestOptions::default())
        .unwrap_err();

    assert_eq!(err.status(), Some(500));
    assert!(matches!(err, ApiError::HttpStatus { ref body, .. } if body == "status 500"));
}

#[test]
fn closed_port_is_a_connection_failure() {
    let err = HttpExecutor::new()
        .execute(&HttpRequest::get(closed_port_url()).with_timeout_ms(2000))
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ConnectionFailure, "{err}");
}

#[test]
fn unresolvable_host_is_a_connection_failure() {
    let err = HttpExecutor::new()
        .execute(&HttpRequest::get("http://wikinet-test.invalid/ok").with_timeout_ms(5000))
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ConnectionFailure, "{err}");
}

#[test]
fn slow_server_times_out() {
    let base = start_server();
    let err = HttpExecutor::new()
        .execute(&HttpRequest::get(format!("{base}/slow")).with_timeout_ms(1))
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Timeout, "{err}");
}

#[test]
fn https_against_plain_http_is_a_tls_failure() {
    let base = start_server();
    let url = base.replacen("http://", "https://", 1);
    let err = HttpExecutor::new()
        .execute(&HttpRequest::get(format!("{url}/ok")).with_timeout_ms(2000))
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::TlsFailure, "{err}");
}

// ---------------------------------------------------------------------------
// Concurrency
// ---------------------------------------------------------------------------

#[test]
fn concurrent_calls_share_one_executor() {
    let base = start_server();
    let executor = HttpExecutor::new();

    thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let executor = &executor;
                let url = format!("{base}/ok");
                scope.spawn(move || executor.get(&url, RequestOptions::default()))
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap().unwrap().body, "hello");
        }
    });
}
