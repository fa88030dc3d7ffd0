//! The request executor: one blocking request/response exchange per call.
//!
//! # Design
//! `execute` runs a fixed pipeline: validate, parse the URL, pick the
//! transport by scheme, merge headers, send, buffer the response, and
//! classify. Every transport failure is funnelled through `classify`, so
//! callers only ever see the `ApiError` taxonomy.
//!
//! A fresh `ureq::Agent` is built per call. The connect timeout and both
//! receive timeouts are each set to `timeout_ms`; elapsed time is not
//! carried across phases, so a slow connect followed by a slow read can
//! take up to roughly twice the budget before failing.

use std::io::{self, Read};
use std::time::Duration;

use url::Url;

use crate::config::{ExecutorConfig, RequestOptions};
use crate::error::{ApiError, ErrorKind};
use crate::headers::{collapse_headers, default_headers, merge_headers};
use crate::http::{HttpMethod, HttpRequest};
use crate::response::HttpResponse;

/// Synchronous HTTP executor. Cheap to clone, safe to share across threads.
#[derive(Debug, Clone, Default)]
pub struct HttpExecutor {
    config: ExecutorConfig,
}

/// Raw outcome of a completed exchange, before status classification.
struct Exchange {
    status: u16,
    headers: Vec<(String, String)>,
    body: String,
}

impl HttpExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ExecutorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// Perform `request` and block until it completes or fails.
    ///
    /// Returns `ApiError::Validation` without touching the network when the
    /// descriptor is malformed, and `ApiError::HttpStatus` for any status of
    /// 400 or above.
    pub fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        request.validate()?;

        let url = Url::parse(&request.url)
            .map_err(|e| ApiError::invalid_url(format!("{}: {e}", request.url)))?;
        let is_https = match url.scheme() {
            "https" => true,
            "http" => false,
            other => {
                return Err(ApiError::invalid_url(format!("unsupported scheme {other:?}")));
            }
        };

        let headers = merge_headers(
            &request.headers,
            &default_headers(request, &self.config.user_agent),
        );

        tracing::debug!(
            method = %request.method,
            url = %url,
            timeout_ms = request.timeout_ms,
            "dispatching request"
        );

        let exchange = self
            .exchange(request, &url, &headers)
            .map_err(|e| classify(e, is_https, request.timeout_ms));

        let result = exchange.and_then(|ex| {
            if ex.status >= 400 {
                Err(ApiError::HttpStatus {
                    status: ex.status,
                    body: ex.body,
                })
            } else {
                Ok(HttpResponse::new(ex.status, ex.headers, ex.body))
            }
        });

        match &result {
            Ok(response) => tracing::debug!(
                method = %request.method,
                url = %url,
                status = response.status,
                body_len = response.body.len(),
                "request completed"
            ),
            Err(err) => tracing::warn!(
                method = %request.method,
                url = %url,
                kind = ?err.kind(),
                "request failed: {err}"
            ),
        }

        result
    }

    pub fn get(&self, url: &str, options: RequestOptions) -> Result<HttpResponse, ApiError> {
        self.execute(&into_request(HttpMethod::Get, url, options))
    }

    pub fn post(&self, url: &str, options: RequestOptions) -> Result<HttpResponse, ApiError> {
        self.execute(&into_request(HttpMethod::Post, url, options))
    }

    pub fn put(&self, url: &str, options: RequestOptions) -> Result<HttpResponse, ApiError> {
        self.execute(&into_request(HttpMethod::Put, url, options))
    }

    pub fn delete(&self, url: &str, options: RequestOptions) -> Result<HttpResponse, ApiError> {
        self.execute(&into_request(HttpMethod::Delete, url, options))
    }

    /// Send the request and buffer the whole response.
    ///
    /// The agent and response are owned by this frame; the socket is
    /// released when they drop, on every return path.
    fn exchange(
        &self,
        request: &HttpRequest,
        url: &Url,
        headers: &[(String, String)],
    ) -> Result<Exchange, ureq::Error> {
        let timeout = Some(Duration::from_millis(request.timeout_ms));
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_connect(timeout)
            .timeout_recv_response(timeout)
            .timeout_recv_body(timeout)
            .max_redirects(self.config.max_redirects)
            .build()
            .new_agent();

        let target = url.as_str();
        let body = if request.sends_body() {
            request.body.as_deref()
        } else {
            None
        };

        let mut response = match request.method {
            HttpMethod::Get => apply_headers(agent.get(target), headers).call()?,
            HttpMethod::Delete => apply_headers(agent.delete(target), headers).call()?,
            HttpMethod::Post | HttpMethod::Put => {
                let builder = if request.method == HttpMethod::Post {
                    agent.post(target)
                } else {
                    agent.put(target)
                };
                let builder = apply_headers(builder, headers);
                match body {
                    Some(body) => builder.send(body.as_bytes())?,
                    None => builder.send_empty()?,
                }
            }
        };

        let status = response.status().as_u16();
        let received: Vec<(&str, String)> = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        let headers =
            collapse_headers(received.iter().map(|(name, value)| (*name, value.as_str())));
        drop(received);

        let body = response.body_mut();
        let bytes = match self.config.max_body_bytes {
            None => body.with_config().limit(u64::MAX).read_to_vec()?,
            // Error bodies are truncated, never turned into a transport failure.
            Some(cap) if status >= 400 => {
                let mut buf = Vec::new();
                body.with_config()
                    .limit(u64::MAX)
                    .reader()
                    .take(cap)
                    .read_to_end(&mut buf)
                    .map_err(ureq::Error::from)?;
                buf
            }
            Some(cap) => body.with_config().limit(cap).read_to_vec()?,
        };

        Ok(Exchange {
            status,
            headers,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        })
    }
}

fn into_request(method: HttpMethod, url: &str, options: RequestOptions) -> HttpRequest {
    let mut request = HttpRequest::new(method, url)
        .with_headers(options.headers)
        .with_timeout_ms(options.timeout_ms);
    request.body = options.body;
    request
}

fn apply_headers<B>(
    mut builder: ureq::RequestBuilder<B>,
    headers: &[(String, String)],
) -> ureq::RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

/// Which taxonomy kind a transport error belongs to.
fn kind_of(err: &ureq::Error, is_https: bool) -> ErrorKind {
    match err {
        ureq::Error::Timeout(_) => ErrorKind::Timeout,
        ureq::Error::BadUri(_) => ErrorKind::InvalidUrl,
        ureq::Error::Tls(_) | ureq::Error::Rustls(_) => ErrorKind::TlsFailure,
        ureq::Error::Io(io_err) => match io_err.kind() {
            io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => ErrorKind::Timeout,
            // rustls surfaces handshake failures as InvalidData.
            io::ErrorKind::InvalidData if is_https => ErrorKind::TlsFailure,
            _ => ErrorKind::ConnectionFailure,
        },
        _ => ErrorKind::ConnectionFailure,
    }
}

fn classify(err: ureq::Error, is_https: bool, timeout_ms: u64) -> ApiError {
    let message = err.to_string();
    match kind_of(&err, is_https) {
        ErrorKind::Timeout => ApiError::timeout(format!("{message} (limit {timeout_ms} ms)")),
        ErrorKind::InvalidUrl => ApiError::invalid_url(message),
        ErrorKind::TlsFailure => ApiError::tls(message, err),
        _ => ApiError::connection(message, err),
    }
}
