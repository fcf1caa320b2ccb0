use std::path::{Path, PathBuf};

pub const DEFAULT_LIBRARY_PATH: &str = "./get_login.dll";
pub const DEFAULT_ENTRY_SYMBOL: &str = "PostUrlWithProxy";
pub const DEFAULT_FREE_SYMBOL: &str = "free";

/// Where the library lives and which symbols to bind from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingConfig {
    pub library_path: PathBuf,
    pub entry_symbol: String,
    pub free_symbol: String,
}

impl Default for BindingConfig {
    fn default() -> Self {
        Self::new(DEFAULT_LIBRARY_PATH)
    }
}

impl BindingConfig {
    pub fn new(library_path: impl AsRef<Path>) -> Self {
        Self {
            library_path: library_path.as_ref().to_path_buf(),
            entry_symbol: DEFAULT_ENTRY_SYMBOL.to_string(),
            free_symbol: DEFAULT_FREE_SYMBOL.to_string(),
        }
    }

    pub fn with_entry_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.entry_symbol = symbol.into();
        self
    }

    /// cgo builds also export `FreeCString`, which frees with the same allocator.
    pub fn with_free_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.free_symbol = symbol.into();
        self
    }
}
