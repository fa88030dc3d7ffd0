//! C-ABI wrapper around `wikinet-core`.
//!
//! # Overview
//! Exposes the blocking HTTP executor through `extern "C"` functions so the
//! mobile host app can run requests without linking to Rust types. The host
//! is expected to call `wikinet_execute` from a worker thread; the call
//! blocks until the exchange completes or its timeout elapses.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - A single `FfiHttpResult` envelope carries either the buffered response
//!   or an `FfiErrorCode` mirroring the core error taxonomy.
//! - The C caller owns all returned pointers and must call the matching
//!   `wikinet_free_*` function to release them. Request structs passed in
//!   stay owned by the caller.

pub mod types;

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::panic::catch_unwind;

use wikinet_core::{ExecutorConfig, HttpExecutor};

use types::*;

// ---------------------------------------------------------------------------
// Executor lifecycle
// ---------------------------------------------------------------------------

/// Create a new executor.
///
/// `user_agent` may be null to use the library default. Returns null if an
/// internal panic occurs. The caller must free the returned pointer with
/// `wikinet_executor_free`.
#[unsafe(no_mangle)]
pub extern "C" fn wikinet_executor_new(user_agent: *const c_char) -> *mut FfiExecutor {
    catch_unwind(|| {
        let mut config = ExecutorConfig::default();
        if !user_agent.is_null() {
            let ua = unsafe { CStr::from_ptr(user_agent) }.to_string_lossy();
            if !ua.trim().is_empty() {
                config = config.with_user_agent(ua.into_owned());
            }
        }
        let executor = HttpExecutor::with_config(config);
        Box::into_raw(Box::new(FfiExecutor { inner: executor }))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free an executor created by `wikinet_executor_new`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn wikinet_executor_free(executor: *mut FfiExecutor) {
    if !executor.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { Box::from_raw(executor) });
        });
    }
}

// ---------------------------------------------------------------------------
// Execution
// ---------------------------------------------------------------------------

/// Perform one blocking HTTP exchange.
///
/// Never returns null. Inspect `error_code` on the result, then release it
/// with `wikinet_free_result`.
#[unsafe(no_mangle)]
pub extern "C" fn wikinet_execute(
    executor: *const FfiExecutor,
    request: *const FfiHttpRequest,
) -> *mut FfiHttpResult {
    catch_unwind(|| {
        if executor.is_null() {
            return FfiHttpResult::null_arg("executor");
        }
        if request.is_null() {
            return FfiHttpResult::null_arg("request");
        }
        let executor = unsafe { &*executor };
        let request = match unsafe { (*request).to_core() } {
            Ok(r) => r,
            Err(field) => return FfiHttpResult::null_arg(field),
        };
        match executor.inner.execute(&request) {
            Ok(response) => FfiHttpResult::ok(response),
            Err(e) => FfiHttpResult::from_error(e),
        }
    })
    .unwrap_or_else(|_| {
        tracing::error!("panic in wikinet_execute");
        FfiHttpResult::panic("panic in wikinet_execute")
    })
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free a result returned by `wikinet_execute`, including the response it
/// carries. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn wikinet_free_result(result: *mut FfiHttpResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let result = unsafe { Box::from_raw(result) };
        free_c_string(result.error_message);
        free_c_string(result.error_body);
        if !result.response.is_null() {
            let response = unsafe { Box::from_raw(result.response) };
            free_c_string(response.body);
            if !response.headers.is_null() {
                let headers: Box<[FfiHeader]> = unsafe {
                    Box::from_raw(std::ptr::slice_from_raw_parts_mut(
                        response.headers,
                        response.headers_len as usize,
                    ))
                };
                for header in headers.iter() {
                    free_c_string(header.key);
                    free_c_string(header.value);
                }
            }
        }
    });
}

/// Free a C string allocated by this library. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn wikinet_free_string(s: *mut c_char) {
    if !s.is_null() {
        let _ = catch_unwind(|| free_c_string(s));
    }
}

fn free_c_string(s: *mut c_char) {
    if !s.is_null() {
        drop(unsafe { CString::from_raw(s) });
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
