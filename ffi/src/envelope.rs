//! The JSON document the production library wraps around every response.
//!
//! ```json
//! {"success": true, "error": null, "result": {"status": "200 OK", ...}}
//! {"success": false, "error": "...", "error_code": 4004, "result": null}
//! ```

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{FfiError, FfiResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub enum ErrorCode {
    InvalidMethod,
    HeaderParse,
    MissingUserAgent,
    ProxyConfig,
    BodySize,
    RedirectLimit,
    Network,
    ReadResponse,
    Unknown,
    Other(i64),
}

impl ErrorCode {
    pub fn as_i64(self) -> i64 {
        match self {
            ErrorCode::InvalidMethod => 4001,
            ErrorCode::HeaderParse => 4002,
            ErrorCode::MissingUserAgent => 4003,
            ErrorCode::ProxyConfig => 4004,
            ErrorCode::BodySize => 4005,
            ErrorCode::RedirectLimit => 3001,
            ErrorCode::Network => 5001,
            ErrorCode::ReadResponse => 5002,
            ErrorCode::Unknown => 5000,
            ErrorCode::Other(code) => code,
        }
    }

    fn label(self) -> &'static str {
        match self {
            ErrorCode::InvalidMethod => "invalid HTTP method",
            ErrorCode::HeaderParse => "header parse error",
            ErrorCode::MissingUserAgent => "missing User-Agent",
            ErrorCode::ProxyConfig => "proxy configuration error",
            ErrorCode::BodySize => "body too large",
            ErrorCode::RedirectLimit => "too many redirects",
            ErrorCode::Network => "network error",
            ErrorCode::ReadResponse => "failed to read response",
            ErrorCode::Unknown | ErrorCode::Other(_) => "unknown error",
        }
    }
}

impl From<i64> for ErrorCode {
    fn from(code: i64) -> Self {
        match code {
            4001 => ErrorCode::InvalidMethod,
            4002 => ErrorCode::HeaderParse,
            4003 => ErrorCode::MissingUserAgent,
            4004 => ErrorCode::ProxyConfig,
            4005 => ErrorCode::BodySize,
            3001 => ErrorCode::RedirectLimit,
            5001 => ErrorCode::Network,
            5002 => ErrorCode::ReadResponse,
            5000 => ErrorCode::Unknown,
            other => ErrorCode::Other(other),
        }
    }
}

impl From<ErrorCode> for i64 {
    fn from(code: ErrorCode) -> Self {
        code.as_i64()
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.as_i64(), self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub error_code: Option<ErrorCode>,
    #[serde(default)]
    pub result: Option<HttpExchange>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpExchange {
    pub status: String,
    pub status_code: u16,
    pub protocol: String,
    #[serde(deserialize_with = "null_as_default")]
    pub headers: BTreeMap<String, Vec<String>>,
    pub content_length: i64,
    pub body_size: usize,
    #[serde(deserialize_with = "null_as_default")]
    pub cookies: Vec<ResponseCookie>,
    pub server: String,
    pub content_type: String,
    pub date: String,
    pub body: String,
    #[serde(deserialize_with = "null_as_default")]
    pub redirects: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResponseCookie {
    pub name: String,
    pub value: String,
    pub domain: String,
    pub path: String,
}

// Empty collections arrive as `null`.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl ResponseEnvelope {
    pub fn parse(text: &str) -> FfiResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// The exchange on success, the library's own error otherwise.
    /// A successful envelope without a `result` is malformed.
    pub fn into_exchange(self) -> FfiResult<HttpExchange> {
        if self.success {
            return self.result.ok_or_else(|| {
                FfiError::Envelope(serde::de::Error::custom(
                    "envelope reports success but carries no result",
                ))
            });
        }
        Err(FfiError::RemoteFailure {
            code: self.error_code.unwrap_or(ErrorCode::Unknown),
            message: self.error.unwrap_or_default(),
        })
    }
}
