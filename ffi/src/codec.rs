use crate::error::{FfiError, FfiResult};

/// Decodes a response buffer as strict UTF-8.
///
/// Invalid sequences are an error; nothing is replaced or truncated.
pub fn decode_response(bytes: &[u8]) -> FfiResult<String> {
    std::str::from_utf8(bytes)
        .map(str::to_owned)
        .map_err(|source| FfiError::InvalidUtf8 {
            len: bytes.len(),
            source,
        })
}
