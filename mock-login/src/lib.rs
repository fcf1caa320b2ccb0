//! Stand-in for `get_login.dll`: same exports, no network.
//!
//! Build with `cargo build -p post-url-mock` and point the CLI at
//! `target/debug/libpost_url_mock.so` with `--free-symbol FreeCString`.

#![allow(non_snake_case)]

use std::ffi::CStr;
use std::os::raw::{c_char, c_void};
use std::ptr;

use serde_json::{json, Value};

/// Answers with a JSON envelope. Returns null when `url` is null.
///
/// # Safety
///
/// Non-null arguments must be NUL-terminated. The result must be released
/// with `FreeCString` or the C `free`.
#[no_mangle]
pub unsafe extern "C" fn PostUrlWithProxy(
    url: *const c_char,
    cookie: *const c_char,
    proxy_url: *const c_char,
) -> *mut c_char {
    if url.is_null() {
        return ptr::null_mut();
    }
    let envelope = respond(&read(url), &read(cookie), &read(proxy_url));
    into_c_string(&envelope.to_string())
}

/// # Safety
///
/// `ptr` must be null or come from `PostUrlWithProxy`, and be freed once.
#[no_mangle]
pub unsafe extern "C" fn FreeCString(ptr: *mut c_void) {
    if !ptr.is_null() {
        libc::free(ptr);
    }
}

unsafe fn read(ptr: *const c_char) -> String {
    if ptr.is_null() {
        return String::new();
    }
    CStr::from_ptr(ptr).to_string_lossy().into_owned()
}

/// The envelope the real library would produce for a 200 answer.
pub fn respond(url: &str, cookie: &str, proxy_url: &str) -> Value {
    if !proxy_url.is_empty() && !proxy_url.contains("://") {
        return json!({
            "success": false,
            "error": format!("proxy address parse failed: missing scheme in {proxy_url:?}"),
            "error_code": 4004,
            "result": null,
        });
    }

    let cookies = if cookie.is_empty() {
        Value::Null
    } else {
        json!([{ "name": "session", "value": cookie, "domain": "", "path": "/" }])
    };
    json!({
        "success": true,
        "error": null,
        "result": {
            "status": "200 OK",
            "status_code": 200,
            "protocol": "HTTP/1.1",
            "headers": { "Content-Type": ["text/plain; charset=utf-8"] },
            "content_length": 2,
            "body_size": 2,
            "cookies": cookies,
            "server": "post-url-mock",
            "content_type": "text/plain; charset=utf-8",
            "date": "",
            "body": "OK",
            "redirects": [url],
        },
    })
}

// malloc, so callers may release with either FreeCString or free.
unsafe fn into_c_string(text: &str) -> *mut c_char {
    let bytes = text.as_bytes();
    let buffer = libc::malloc(bytes.len() + 1).cast::<u8>();
    if buffer.is_null() {
        return ptr::null_mut();
    }
    ptr::copy_nonoverlapping(bytes.as_ptr(), buffer, bytes.len());
    *buffer.add(bytes.len()) = 0;
    buffer.cast()
}
