//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Each type mirrors a core type but uses C-compatible representations:
//! `*mut c_char` instead of `String`, pointer + length instead of `Vec`,
//! and enums with explicit discriminants. Conversion functions live here to
//! keep `lib.rs` focused on the `extern "C"` surface.

use std::ffi::{CStr, CString};
use std::os::raw::c_char;

use wikinet_core::{ApiError, ErrorKind, HttpExecutor, HttpMethod, HttpRequest, HttpResponse};

/// Opaque handle to an `HttpExecutor`. C callers receive a pointer to this
/// and pass it back into `wikinet_execute`.
pub struct FfiExecutor {
    pub(crate) inner: HttpExecutor,
}

// ---------------------------------------------------------------------------
// Request input (caller-owned, read but never freed by us)
// ---------------------------------------------------------------------------

/// HTTP method as a C enum.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiHttpMethod {
    Get = 0,
    Post = 1,
    Put = 2,
    Delete = 3,
}

impl From<FfiHttpMethod> for HttpMethod {
    fn from(m: FfiHttpMethod) -> Self {
        match m {
            FfiHttpMethod::Get => HttpMethod::Get,
            FfiHttpMethod::Post => HttpMethod::Post,
            FfiHttpMethod::Put => HttpMethod::Put,
            FfiHttpMethod::Delete => HttpMethod::Delete,
        }
    }
}

/// A single HTTP header as a key-value pair of C strings.
#[repr(C)]
pub struct FfiHeader {
    pub key: *mut c_char,
    pub value: *mut c_char,
}

/// An HTTP request described as C-compatible plain data.
///
/// `headers` may be null when `headers_len` is 0. `body` may be null for
/// "no body". `timeout_ms` of 0 is rejected as a validation error.
#[repr(C)]
pub struct FfiHttpRequest {
    pub method: FfiHttpMethod,
    pub url: *const c_char,
    pub headers: *const FfiHeader,
    pub headers_len: u32,
    pub body: *const c_char,
    pub timeout_ms: u64,
}

impl FfiHttpRequest {
    /// Copy the C request into a core `HttpRequest`.
    ///
    /// Returns the name of the offending field if a required pointer is null.
    ///
    /// # Safety
    /// Every non-null pointer must reference a valid NUL-terminated string,
    /// and `headers` must point to `headers_len` valid entries.
    pub(crate) unsafe fn to_core(&self) -> Result<HttpRequest, &'static str> {
        if self.url.is_null() {
            return Err("request.url");
        }
        if self.headers.is_null() && self.headers_len > 0 {
            return Err("request.headers");
        }

        let mut request = HttpRequest::new(self.method.into(), unsafe { read_str(self.url) })
            .with_timeout_ms(self.timeout_ms);

        if self.headers_len > 0 {
            let headers =
                unsafe { std::slice::from_raw_parts(self.headers, self.headers_len as usize) };
            for header in headers {
                if header.key.is_null() || header.value.is_null() {
                    return Err("request.headers");
                }
                request = request.with_header(unsafe { read_str(header.key) }, unsafe {
                    read_str(header.value)
                });
            }
        }

        if !self.body.is_null() {
            request = request.with_body(unsafe { read_str(self.body) });
        }
        Ok(request)
    }
}

/// Read a C string, replacing invalid UTF-8.
///
/// # Safety
/// `ptr` must be non-null and NUL-terminated.
unsafe fn read_str(ptr: *const c_char) -> String {
    unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned()
}

/// Allocate a C string, dropping interior NUL bytes.
pub(crate) fn to_c_string(s: impl Into<Vec<u8>>) -> *mut c_char {
    let mut bytes = s.into();
    bytes.retain(|b| *b != 0);
    CString::new(bytes).unwrap_or_default().into_raw()
}

// ---------------------------------------------------------------------------
// Result types (heap-allocated by us, freed by `wikinet_free_result`)
// ---------------------------------------------------------------------------

/// Error codes returned in `FfiHttpResult`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiErrorCode {
    Ok = 0,
    Validation = 1,
    ConnectionFailure = 2,
    Timeout = 3,
    TlsFailure = 4,
    InvalidUrl = 5,
    HttpStatus = 6,
    DecodingFailure = 7,
    NullArg = 8,
    Panic = 9,
}

impl From<ErrorKind> for FfiErrorCode {
    fn from(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::Validation => FfiErrorCode::Validation,
            ErrorKind::ConnectionFailure => FfiErrorCode::ConnectionFailure,
            ErrorKind::Timeout => FfiErrorCode::Timeout,
            ErrorKind::TlsFailure => FfiErrorCode::TlsFailure,
            ErrorKind::InvalidUrl => FfiErrorCode::InvalidUrl,
            ErrorKind::HttpStatus => FfiErrorCode::HttpStatus,
            ErrorKind::DecodingFailure => FfiErrorCode::DecodingFailure,
        }
    }
}

/// A completed exchange exposed to C.
#[repr(C)]
pub struct FfiHttpResponse {
    pub status: u16,
    pub headers: *mut FfiHeader,
    pub headers_len: u32,
    pub body: *mut c_char,
}

/// Result envelope for `wikinet_execute`.
///
/// On success `error_code` is `Ok`, `error_message` and `error_body` are
/// null, and `response` points to the buffered response.
/// On failure `response` is null, `error_message` is a human-readable C
/// string, and for `HttpStatus` the status and server body are carried in
/// `http_status` and `error_body`.
#[repr(C)]
pub struct FfiHttpResult {
    pub error_code: FfiErrorCode,
    pub error_message: *mut c_char,
    pub http_status: u16,
    pub error_body: *mut c_char,
    pub response: *mut FfiHttpResponse,
}

impl FfiHttpResult {
    /// Build a success result carrying `response`.
    pub(crate) fn ok(response: HttpResponse) -> *mut Self {
        let headers_len = response.headers.len() as u32;
        let headers = if response.headers.is_empty() {
            std::ptr::null_mut()
        } else {
            let boxed: Box<[FfiHeader]> = response
                .headers
                .into_iter()
                .map(|(k, v)| FfiHeader {
                    key: to_c_string(k),
                    value: to_c_string(v),
                })
                .collect();
            Box::into_raw(boxed) as *mut FfiHeader
        };

        let ffi_response = Box::new(FfiHttpResponse {
            status: response.status,
            headers,
            headers_len,
            body: to_c_string(response.body),
        });
        Box::into_raw(Box::new(FfiHttpResult {
            error_code: FfiErrorCode::Ok,
            error_message: std::ptr::null_mut(),
            http_status: response.status,
            error_body: std::ptr::null_mut(),
            response: Box::into_raw(ffi_response),
        }))
    }

    /// Build an error result from an `ApiError`.
    pub(crate) fn from_error(err: ApiError) -> *mut Self {
        let error_code = FfiErrorCode::from(err.kind());
        let error_message = to_c_string(err.to_string());
        let (http_status, error_body) = match err {
            ApiError::HttpStatus { status, body } => (status, to_c_string(body)),
            _ => (0, std::ptr::null_mut()),
        };
        Box::into_raw(Box::new(FfiHttpResult {
            error_code,
            error_message,
            http_status,
            error_body,
            response: std::ptr::null_mut(),
        }))
    }

    /// Build an error result for a null argument.
    pub(crate) fn null_arg(name: &str) -> *mut Self {
        Self::failure(FfiErrorCode::NullArg, format!("null argument: {name}"))
    }

    /// Build an error result for a caught panic.
    pub(crate) fn panic(msg: &str) -> *mut Self {
        Self::failure(FfiErrorCode::Panic, msg.to_string())
    }

    fn failure(error_code: FfiErrorCode, msg: String) -> *mut Self {
        Box::into_raw(Box::new(FfiHttpResult {
            error_code,
            error_message: to_c_string(msg),
            http_status: 0,
            error_body: std::ptr::null_mut(),
            response: std::ptr::null_mut(),
        }))
    }
}
