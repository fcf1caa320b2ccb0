use std::ffi::CStr;
use std::fmt;
use std::marker::PhantomData;
use std::os::raw::{c_char, c_void};
use std::ptr::NonNull;

use tracing::trace;

use crate::codec::decode_response;
use crate::error::{FfiError, FfiResult};

/// Deallocator exported by the library, e.g. `free` or `FreeCString`.
pub type FreeFn = unsafe extern "C" fn(*mut c_void);

/// A NUL-terminated string allocated by the library and owned by the caller.
///
/// Released exactly once, through the library's own deallocator, when the
/// guard is dropped. The `'lib` borrow keeps the library loaded until then.
pub struct ForeignString<'lib> {
    ptr: NonNull<c_char>,
    free: FreeFn,
    _library: PhantomData<&'lib ()>,
}

impl<'lib> ForeignString<'lib> {
    /// Takes ownership of `ptr`. A null pointer is rejected and never freed.
    ///
    /// # Safety
    ///
    /// `ptr` must be null or point to a NUL-terminated buffer that `free`
    /// can release, and nothing else may free it.
    pub(crate) unsafe fn from_raw(ptr: *mut c_char, free: FreeFn) -> FfiResult<Self> {
        let ptr = NonNull::new(ptr).ok_or(FfiError::NullResult)?;
        Ok(Self {
            ptr,
            free,
            _library: PhantomData,
        })
    }

    pub fn as_ptr(&self) -> *const c_char {
        self.ptr.as_ptr()
    }

    /// Bytes up to, not including, the terminator.
    pub fn as_bytes(&self) -> &[u8] {
        unsafe { CStr::from_ptr(self.ptr.as_ptr()) }.to_bytes()
    }

    pub fn to_text(&self) -> FfiResult<String> {
        decode_response(self.as_bytes())
    }
}

impl Drop for ForeignString<'_> {
    fn drop(&mut self) {
        trace!(ptr = ?self.ptr, "releasing foreign string");
        unsafe { (self.free)(self.ptr.as_ptr().cast()) };
    }
}

impl fmt::Debug for ForeignString<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ForeignString")
            .field("ptr", &self.ptr)
            .field("len", &self.as_bytes().len())
            .finish()
    }
}
