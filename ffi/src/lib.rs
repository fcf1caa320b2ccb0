//! Binding for native libraries exporting
//! `char *PostUrlWithProxy(char *url, char *cookie, char *proxyUrl)`.
//!
//! ```no_run
//! use post_url_ffi::{BindingConfig, PostRequest, PostUrlBinding};
//!
//! let binding = PostUrlBinding::open(&BindingConfig::default())?;
//! let request = PostRequest::new("https://example.com", "your_cookie_here", "http://your.proxy:8080");
//! println!("Response: {}", binding.post_url(&request)?);
//! binding.close()?;
//! # Ok::<(), post_url_ffi::FfiError>(())
//! ```

pub mod binding;
pub mod buffer;
pub mod codec;
pub mod config;
pub mod envelope;
pub mod error;
pub mod request;

pub use binding::{PostUrlBinding, PostUrlFn};
pub use buffer::{ForeignString, FreeFn};
pub use codec::decode_response;
pub use config::BindingConfig;
pub use envelope::{ErrorCode, HttpExchange, ResponseCookie, ResponseEnvelope};
pub use error::{FfiError, FfiResult};
pub use request::PostRequest;
