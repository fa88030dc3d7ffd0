//! Pure header helpers shared by requests, responses and the executor.
//!
//! The executor decides the final outgoing header set here, before any
//! I/O, so the "caller wins, defaults fill gaps" rule is testable without
//! a socket.

use crate::http::HttpRequest;

pub const CONTENT_TYPE: &str = "Content-Type";
pub const CONTENT_LENGTH: &str = "Content-Length";
pub const ACCEPT: &str = "Accept";
pub const USER_AGENT: &str = "User-Agent";

pub const JSON_CONTENT_TYPE: &str = "application/json; charset=UTF-8";
pub const DEFAULT_ACCEPT: &str = "application/json, text/plain, */*";

/// First value for `name` in `headers`, compared case-insensitively.
pub fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

/// Candidate default headers for `request`.
///
/// `Content-Type` is only offered when the request will write a body.
pub fn default_headers(request: &HttpRequest, user_agent: &str) -> Vec<(String, String)> {
    let mut defaults = Vec::with_capacity(3);
    if request.sends_body() {
        defaults.push((CONTENT_TYPE.to_string(), JSON_CONTENT_TYPE.to_string()));
    }
    defaults.push((ACCEPT.to_string(), DEFAULT_ACCEPT.to_string()));
    defaults.push((USER_AGENT.to_string(), user_agent.to_string()));
    defaults
}

/// Explicit headers verbatim, followed by every default whose name the
/// caller did not already supply.
pub fn merge_headers(
    explicit: &[(String, String)],
    defaults: &[(String, String)],
) -> Vec<(String, String)> {
    let mut merged = explicit.to_vec();
    for (name, value) in defaults {
        if find_header(explicit, name).is_none() {
            merged.push((name.clone(), value.clone()));
        }
    }
    merged
}

/// Fold received headers into one entry per name.
///
/// Duplicate values are joined with `", "`; names keep the order in which
/// they were first seen and the casing of their first occurrence.
pub fn collapse_headers<'a, I>(pairs: I) -> Vec<(String, String)>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut collapsed: Vec<(String, String)> = Vec::new();
    for (name, value) in pairs {
        match collapsed
            .iter_mut()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
        {
            Some((_, existing)) => {
                existing.push_str(", ");
                existing.push_str(value);
            }
            None => collapsed.push((name.to_string(), value.to_string())),
        }
    }
    collapsed
}
