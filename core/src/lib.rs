//! Blocking HTTP request/response engine for the wiki client.
//!
//! # Overview
//! Callers describe a call as an `HttpRequest`, hand it to
//! `HttpExecutor::execute`, and get back either a fully buffered
//! `HttpResponse` or one `ApiError`. The request, the response and the
//! errors are plain owned data; the executor holds no state between calls.
//!
//! # Design
//! - `execute` validates first and performs no I/O on a rejected request.
//! - Outgoing headers are decided by the pure `headers::merge_headers`
//!   before a connection exists: caller headers win, defaults fill gaps.
//! - Any status of 400 or above is returned as `ApiError::HttpStatus`,
//!   never as a successful response.
//! - Nothing is retried. Retry and backoff belong to the caller.

pub mod config;
pub mod error;
pub mod executor;
pub mod headers;
pub mod http;
pub mod response;

pub use config::{ExecutorConfig, RequestOptions, DEFAULT_USER_AGENT};
pub use error::{ApiError, ErrorKind, ValidationError};
pub use executor::HttpExecutor;
pub use http::{HttpMethod, HttpRequest, DEFAULT_TIMEOUT_MS};
pub use response::HttpResponse;
