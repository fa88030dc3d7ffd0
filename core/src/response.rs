//! Response descriptor and its classification/decoding helpers.
//!
//! Everything here is a pure function of the buffered status, headers and
//! body; no method performs I/O.

use serde::de::DeserializeOwned;

use crate::error::ApiError;
use crate::headers::{find_header, CONTENT_LENGTH, CONTENT_TYPE};

/// A completed HTTP exchange described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, headers: Vec<(String, String)>, body: impl Into<String>) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
        }
    }

    pub fn is_successful(&self) -> bool {
        (200..=299).contains(&self.status)
    }

    pub fn is_redirect(&self) -> bool {
        (300..=399).contains(&self.status)
    }

    pub fn is_client_error(&self) -> bool {
        (400..=499).contains(&self.status)
    }

    pub fn is_server_error(&self) -> bool {
        (500..=599).contains(&self.status)
    }

    /// Header value for `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header(CONTENT_TYPE)
    }

    /// `Content-Length` as a non-negative integer; `None` when absent or
    /// not numeric.
    pub fn content_length(&self) -> Option<u64> {
        self.header(CONTENT_LENGTH)?.trim().parse().ok()
    }

    /// True iff the content type mentions `application/json`, ignoring case
    /// and any parameters such as `charset`.
    pub fn is_json(&self) -> bool {
        self.content_type()
            .map(|ct| ct.to_ascii_lowercase().contains("application/json"))
            .unwrap_or(false)
    }

    pub fn as_str(&self) -> &str {
        &self.body
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.body.as_bytes()
    }

    pub fn as_int(&self) -> Option<i32> {
        self.body.trim().parse().ok()
    }

    pub fn as_long(&self) -> Option<i64> {
        self.body.trim().parse().ok()
    }

    /// Only the exact literals `true` and `false` are accepted.
    pub fn as_boolean(&self) -> Option<bool> {
        match self.body.as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        }
    }

    /// The body unchanged, provided the response is declared as JSON.
    pub fn as_json_string(&self) -> Result<&str, ApiError> {
        if self.is_json() {
            Ok(&self.body)
        } else {
            Err(ApiError::decoding(format!(
                "expected application/json, got {}",
                self.content_type().unwrap_or("no content type")
            )))
        }
    }

    /// Deserialize a JSON body into `T`.
    pub fn as_json<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        let raw = self.as_json_string()?;
        serde_json::from_str(raw).map_err(|e| ApiError::decoding(e.to_string()))
    }
}
