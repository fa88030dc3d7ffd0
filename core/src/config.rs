//! Executor-wide settings and per-call options.

use crate::http::DEFAULT_TIMEOUT_MS;

/// `User-Agent` sent when the caller does not supply one.
pub const DEFAULT_USER_AGENT: &str = concat!("wikinet/", env!("CARGO_PKG_VERSION"));

/// Settings shared by every call made through one `HttpExecutor`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutorConfig {
    pub user_agent: String,
    /// Redirects followed automatically before the call fails.
    pub max_redirects: u32,
    /// Optional body cap. A 2xx/3xx body over the cap fails with
    /// `ConnectionFailure`; a 4xx/5xx body is truncated to the cap and still
    /// reported as `HttpStatus`. `None` reads the full body.
    pub max_body_bytes: Option<u64>,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            max_redirects: 10,
            max_body_bytes: None,
        }
    }
}

impl ExecutorConfig {
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_max_redirects(mut self, max_redirects: u32) -> Self {
        self.max_redirects = max_redirects;
        self
    }

    pub fn with_max_body_bytes(mut self, max_body_bytes: u64) -> Self {
        self.max_body_bytes = Some(max_body_bytes);
        self
    }
}

/// Optional parts of a convenience call (`get`, `post`, `put`, `delete`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestOptions {
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
    pub timeout_ms: u64,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            headers: Vec::new(),
            body: None,
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

impl RequestOptions {
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }
}
