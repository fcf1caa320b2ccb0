use std::ffi::NulError;
use std::path::PathBuf;
use std::str::Utf8Error;

use thiserror::Error;

use crate::envelope::ErrorCode;

/// Every way a foreign call can fail, one variant per failure point.
#[derive(Debug, Error)]
pub enum FfiError {
    #[error("failed to load library {}", .path.display())]
    LibraryLoad {
        path: PathBuf,
        #[source]
        source: libloading::Error,
    },

    #[error("symbol '{symbol}' not found in {}", .path.display())]
    SymbolNotFound {
        symbol: String,
        path: PathBuf,
        #[source]
        source: libloading::Error,
    },

    #[error("failed to unload library {}", .path.display())]
    LibraryUnload {
        path: PathBuf,
        #[source]
        source: libloading::Error,
    },

    #[error("argument '{field}' contains a NUL byte at offset {}", .source.nul_position())]
    InteriorNul {
        field: &'static str,
        #[source]
        source: NulError,
    },

    #[error("foreign call returned a null pointer")]
    NullResult,

    #[error("response is not valid UTF-8 ({len} bytes, first invalid byte at offset {})", .source.valid_up_to())]
    InvalidUtf8 {
        len: usize,
        #[source]
        source: Utf8Error,
    },

    #[error("response is not a valid envelope")]
    Envelope(#[from] serde_json::Error),

    #[error("library reported failure {code}: {message}")]
    RemoteFailure { code: ErrorCode, message: String },
}

impl FfiError {
    /// Process exit status used by the command-line front end.
    pub fn exit_code(&self) -> i32 {
        match self {
            FfiError::LibraryLoad { .. } => 2,
            FfiError::SymbolNotFound { .. } => 3,
            FfiError::NullResult => 4,
            FfiError::InvalidUtf8 { .. } => 5,
            FfiError::InteriorNul { .. } => 6,
            FfiError::Envelope(_) => 7,
            FfiError::RemoteFailure { .. } => 8,
            FfiError::LibraryUnload { .. } => 9,
        }
    }
}

pub type FfiResult<T> = std::result::Result<T, FfiError>;
