use std::ffi::CString;
use std::os::raw::c_char;

use url::Url;

use crate::error::{FfiError, FfiResult};

/// The three arguments of one `PostUrlWithProxy` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostRequest {
    pub url: Vec<u8>,
    pub cookie: Vec<u8>,
    pub proxy_url: Vec<u8>,
}

impl PostRequest {
    pub fn new(
        url: impl Into<Vec<u8>>,
        cookie: impl Into<Vec<u8>>,
        proxy_url: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            url: url.into(),
            cookie: cookie.into(),
            proxy_url: proxy_url.into(),
        }
    }

    /// Copies the triple into NUL-terminated buffers for a single call.
    pub(crate) fn marshal(&self) -> FfiResult<MarshalledRequest> {
        Ok(MarshalledRequest {
            url: to_c_string("url", &self.url)?,
            cookie: to_c_string("cookie", &self.cookie)?,
            proxy_url: to_c_string("proxy_url", &self.proxy_url)?,
        })
    }
}

/// Drops any `user:pass@` part so URLs can be logged.
pub fn redact_userinfo(bytes: &[u8]) -> String {
    let text = String::from_utf8_lossy(bytes);
    match Url::parse(&text) {
        Ok(mut parsed) if !parsed.cannot_be_a_base() => {
            let _ = parsed.set_username("");
            let _ = parsed.set_password(None);
            parsed.to_string()
        }
        _ => match text.rsplit_once('@') {
            Some((_, host)) => host.to_string(),
            None => text.to_string(),
        },
    }
}

fn to_c_string(field: &'static str, bytes: &[u8]) -> FfiResult<CString> {
    CString::new(bytes).map_err(|source| FfiError::InteriorNul { field, source })
}

/// Owns the C strings; pointers handed out stay valid while this lives.
pub(crate) struct MarshalledRequest {
    url: CString,
    cookie: CString,
    proxy_url: CString,
}

impl MarshalledRequest {
    pub(crate) fn pointers(&self) -> [*const c_char; 3] {
        [self.url.as_ptr(), self.cookie.as_ptr(), self.proxy_url.as_ptr()]
    }
}
