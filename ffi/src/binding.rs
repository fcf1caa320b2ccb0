use std::cell::Cell;
use std::marker::PhantomData;
use std::os::raw::c_char;
use std::path::{Path, PathBuf};

use libloading::Library;
use tracing::{debug, info};

use crate::buffer::{ForeignString, FreeFn};
use crate::config::BindingConfig;
use crate::error::{FfiError, FfiResult};
use crate::request::{redact_userinfo, PostRequest};

/// `char *PostUrlWithProxy(char *url, char *cookie, char *proxyUrl)`
pub type PostUrlFn =
    unsafe extern "C" fn(*const c_char, *const c_char, *const c_char) -> *mut c_char;

struct LoadedLibrary {
    library: Library,
    path: PathBuf,
}

/// A bound `PostUrlWithProxy` entry point together with its deallocator.
///
/// Both symbols are resolved when the binding is built. The library stays
/// loaded until [`PostUrlBinding::close`] or drop. The binding is not `Sync`
/// since nothing is known about the library's thread-safety.
pub struct PostUrlBinding {
    post_fn: PostUrlFn,
    free_fn: FreeFn,
    library: Option<LoadedLibrary>,
    _not_sync: PhantomData<Cell<()>>,
}

impl PostUrlBinding {
    pub fn open(config: &BindingConfig) -> FfiResult<Self> {
        let path = &config.library_path;
        debug!("loading library {}", path.display());

        // Safety: loading runs the library's initializers; the library is trusted.
        let library = unsafe { Library::new(path) }.map_err(|source| FfiError::LibraryLoad {
            path: path.clone(),
            source,
        })?;

        // Safety: the symbols are trusted to have the declared C signatures.
        let post_fn = unsafe { bind::<PostUrlFn>(&library, &config.entry_symbol, path)? };
        let free_fn = unsafe { bind::<FreeFn>(&library, &config.free_symbol, path)? };

        info!(
            "bound {} and {} from {}",
            config.entry_symbol,
            config.free_symbol,
            path.display()
        );
        Ok(Self {
            post_fn,
            free_fn,
            library: Some(LoadedLibrary {
                library,
                path: path.clone(),
            }),
            _not_sync: PhantomData,
        })
    }

    /// Builds a binding from function pointers already in the process.
    ///
    /// # Safety
    ///
    /// `post_fn` must return null or a NUL-terminated buffer that `free_fn`
    /// releases, and both must stay callable for the binding's lifetime.
    pub unsafe fn from_raw(post_fn: PostUrlFn, free_fn: FreeFn) -> Self {
        Self {
            post_fn,
            free_fn,
            library: None,
            _not_sync: PhantomData,
        }
    }

    pub fn library_path(&self) -> Option<&Path> {
        self.library.as_ref().map(|loaded| loaded.path.as_path())
    }

    /// Performs one blocking foreign call and takes ownership of the result.
    pub fn call(&self, request: &PostRequest) -> FfiResult<ForeignString<'_>> {
        let marshalled = request.marshal()?;
        let [url, cookie, proxy_url] = marshalled.pointers();
        debug!(
            url = %redact_userinfo(&request.url),
            proxy = %redact_userinfo(&request.proxy_url),
            "calling PostUrlWithProxy"
        );

        let raw = unsafe { (self.post_fn)(url, cookie, proxy_url) };
        drop(marshalled);

        unsafe { ForeignString::from_raw(raw, self.free_fn) }
    }

    /// Calls, decodes, then frees. The buffer is released on every path.
    pub fn post_url(&self, request: &PostRequest) -> FfiResult<String> {
        let buffer = self.call(request)?;
        let text = buffer.to_text();
        drop(buffer);
        text
    }

    /// Unloads the library, reporting a failed unload.
    pub fn close(mut self) -> FfiResult<()> {
        match self.library.take() {
            Some(LoadedLibrary { library, path }) => {
                debug!("unloading library {}", path.display());
                library
                    .close()
                    .map_err(|source| FfiError::LibraryUnload { path, source })
            }
            None => Ok(()),
        }
    }
}

unsafe fn bind<T: Copy>(library: &Library, symbol: &str, path: &Path) -> FfiResult<T> {
    let resolved = library
        .get::<T>(symbol.as_bytes())
        .map_err(|source| FfiError::SymbolNotFound {
            symbol: symbol.to_string(),
            path: path.to_path_buf(),
            source,
        })?;
    Ok(*resolved)
}
