use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use post_url_ffi::config::{DEFAULT_ENTRY_SYMBOL, DEFAULT_FREE_SYMBOL, DEFAULT_LIBRARY_PATH};
use post_url_ffi::{BindingConfig, FfiError, PostRequest, PostUrlBinding, ResponseEnvelope};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug, Clone)]
#[command(name = "post-url")]
#[command(about = "Call PostUrlWithProxy in a native library and print the response", long_about = None)]
pub struct Args {
    /// Shared library exporting PostUrlWithProxy
    #[arg(short, long, env = "POST_URL_LIBRARY", default_value = DEFAULT_LIBRARY_PATH)]
    pub library: PathBuf,

    /// Target URL
    #[arg(short, long, env = "POST_URL_TARGET", default_value = "https://example.com")]
    pub url: String,

    /// Cookie string sent with the request
    #[arg(short, long, env = "POST_URL_COOKIE", default_value = "your_cookie_here")]
    pub cookie: String,

    /// Proxy URL, empty for a direct connection
    #[arg(short, long, env = "POST_URL_PROXY", default_value = "http://your.proxy:8080")]
    pub proxy: String,

    #[arg(long, env = "POST_URL_ENTRY_SYMBOL", default_value = DEFAULT_ENTRY_SYMBOL)]
    pub entry_symbol: String,

    /// Deallocator for the returned string (`free` or `FreeCString`)
    #[arg(long, env = "POST_URL_FREE_SYMBOL", default_value = DEFAULT_FREE_SYMBOL)]
    pub free_symbol: String,

    /// Decode the response as the library's JSON envelope
    #[arg(long)]
    pub envelope: bool,

    /// Log filter, e.g. `debug` or `post_url_ffi=trace`
    #[arg(long, env = "POST_URL_LOG", default_value = "warn", value_parser = parse_log_filter)]
    pub log_level: String,
}

impl Args {
    pub fn binding_config(&self) -> BindingConfig {
        BindingConfig::new(&self.library)
            .with_entry_symbol(&self.entry_symbol)
            .with_free_symbol(&self.free_symbol)
    }

    pub fn request(&self) -> PostRequest {
        PostRequest::new(
            self.url.as_bytes(),
            self.cookie.as_bytes(),
            self.proxy.as_bytes(),
        )
    }
}

fn parse_log_filter(value: &str) -> std::result::Result<String, String> {
    EnvFilter::try_new(value)
        .map(|_| value.to_string())
        .map_err(|err| format!("invalid log filter: {err}"))
}

/// Logs go to stderr; stdout only carries the response.
pub fn init_tracing(filter: &str) {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|err| {
        eprintln!("warning: invalid log filter {filter:?} ({err}), using \"warn\"");
        EnvFilter::new("warn")
    });
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Performs the call and writes `Response: <text>` to `out`.
pub fn execute(
    binding: &PostUrlBinding,
    request: &PostRequest,
    envelope: bool,
    out: &mut impl Write,
) -> Result<()> {
    let text = binding
        .post_url(request)
        .context("PostUrlWithProxy call failed")?;
    debug!("received {} bytes", text.len());
    writeln!(out, "Response: {text}")?;

    if envelope {
        let exchange = ResponseEnvelope::parse(&text)
            .and_then(ResponseEnvelope::into_exchange)
            .context("failed to decode response envelope")?;
        info!(status_code = exchange.status_code, "envelope decoded");
        writeln!(out, "Status: {}", exchange.status)?;
    }
    Ok(())
}

pub fn run(args: &Args, out: &mut impl Write) -> Result<()> {
    let binding = PostUrlBinding::open(&args.binding_config())?;
    execute(&binding, &args.request(), args.envelope, out)?;
    binding.close()?;
    Ok(())
}

/// Exit status for a failed run: the first `FfiError` in the chain decides.
pub fn exit_code(err: &anyhow::Error) -> u8 {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<FfiError>())
        .map_or(1, |ffi| ffi.exit_code() as u8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CString;
    use std::os::raw::{c_char, c_void};

    unsafe extern "C" fn ok_post(_: *const c_char, _: *const c_char, _: *const c_char) -> *mut c_char {
        CString::new("OK").unwrap().into_raw()
    }

    unsafe extern "C" fn null_post(_: *const c_char, _: *const c_char, _: *const c_char) -> *mut c_char {
        std::ptr::null_mut()
    }

    unsafe extern "C" fn c_string_free(ptr: *mut c_void) {
        drop(CString::from_raw(ptr.cast()));
    }

    fn default_args() -> Args {
        Args::try_parse_from(["post-url"]).unwrap()
    }

    fn mock_binding() -> PostUrlBinding {
        unsafe {
            PostUrlBinding::from_raw(post_url_mock::PostUrlWithProxy, post_url_mock::FreeCString)
        }
    }

    #[test]
    fn prints_response_line() {
        let binding = unsafe { PostUrlBinding::from_raw(ok_post, c_string_free) };
        let mut out = Vec::new();
        execute(&binding, &default_args().request(), false, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "Response: OK\n");
    }

    #[test]
    fn null_result_maps_to_its_exit_code() {
        let binding = unsafe { PostUrlBinding::from_raw(null_post, c_string_free) };
        let mut out = Vec::new();
        let err = execute(&binding, &default_args().request(), false, &mut out).unwrap_err();
        assert_eq!(exit_code(&err), 4);
        assert!(out.is_empty());
    }

    #[test]
    fn envelope_mode_prints_status() {
        let mut out = Vec::new();
        execute(&mock_binding(), &default_args().request(), true, &mut out).unwrap();
        let printed = String::from_utf8(out).unwrap();
        assert!(printed.starts_with("Response: {"));
        assert!(printed.ends_with("Status: 200 OK\n"));
    }

    #[test]
    fn envelope_failure_is_a_remote_error() {
        let request = PostRequest::new("https://example.com", "", "your.proxy:8080");
        let mut out = Vec::new();
        let err = execute(&mock_binding(), &request, true, &mut out).unwrap_err();
        assert_eq!(exit_code(&err), 8);
        assert!(format!("{err:#}").contains("4004 (proxy configuration error)"));
    }

    #[test]
    fn plain_text_under_envelope_mode_is_malformed() {
        let binding = unsafe { PostUrlBinding::from_raw(ok_post, c_string_free) };
        let mut out = Vec::new();
        let err = execute(&binding, &default_args().request(), true, &mut out).unwrap_err();
        assert_eq!(exit_code(&err), 7);
    }

    #[test]
    fn args_build_config_and_request() {
        let args = Args::try_parse_from([
            "post-url",
            "--library",
            "/opt/libget_login.so",
            "--free-symbol",
            "FreeCString",
            "--proxy",
            "",
        ])
        .unwrap();
        let config = args.binding_config();
        assert_eq!(config.library_path, PathBuf::from("/opt/libget_login.so"));
        assert_eq!(config.free_symbol, "FreeCString");
        assert!(args.request().proxy_url.is_empty());
    }

    #[test]
    fn log_filter_is_validated_at_parse_time() {
        let args = Args::try_parse_from(["post-url", "--log-level", "post_url_ffi=trace"]).unwrap();
        assert_eq!(args.log_level, "post_url_ffi=trace");

        let err = Args::try_parse_from(["post-url", "--log-level", "post_url=loudest"]).unwrap_err();
        assert!(err.to_string().contains("invalid log filter"));
    }

    #[test]
    fn unrelated_errors_exit_with_one() {
        assert_eq!(exit_code(&anyhow::anyhow!("stdout closed")), 1);
    }
}
