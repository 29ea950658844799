//! Dynamic library loading
//!
//! Resolves a native library by name across search paths using the platform's
//! naming conventions, loads it with `libloading`, and resolves the entry
//! points of the call protocol into a `DynamicBinding`.

use crate::ffi::binding::NativeBinding;
use crate::ffi::types::{
    ContextHandle, CreateContextFn, DestroyContextFn, DestroyStringFn, ReadStringFn, RequestFn,
    ResponseHandler, StringData, StringHandle,
};
use libloading::Library;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Library loading errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LoadError {
    /// Library file not found in search paths
    #[error("Library not found: {0}")]
    LibraryNotFound(String),

    /// Entry point missing from the library
    #[error("Symbol '{symbol}' not found in library '{library}'")]
    SymbolNotFound { library: String, symbol: String },

    /// The dynamic loader rejected the library
    #[error("Failed to load library: {0}")]
    LoadFailed(String),
}

/// Library path resolution over an ordered list of search paths
pub struct LibraryLoader {
    search_paths: Vec<PathBuf>,
}

impl LibraryLoader {
    /// Create a loader with the platform default search paths
    pub fn new() -> Self {
        Self {
            search_paths: Self::default_search_paths(),
        }
    }

    /// Create a loader searching `paths` first, then the platform defaults
    pub fn with_search_paths(paths: &[PathBuf]) -> Self {
        let mut loader = Self::new();
        for path in paths.iter().rev() {
            loader.add_search_path(path.clone());
        }
        loader
    }

    /// Platform-specific default library search paths
    ///
    /// The current working directory always comes first.
    fn default_search_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        #[cfg(target_os = "linux")]
        {
            paths.push(PathBuf::from("/usr/lib"));
            paths.push(PathBuf::from("/usr/local/lib"));
            paths.push(PathBuf::from("/lib"));

            if cfg!(target_pointer_width = "64") {
                paths.push(PathBuf::from("/usr/lib64"));
                paths.push(PathBuf::from("/lib64"));
            }
        }

        #[cfg(target_os = "macos")]
        {
            paths.push(PathBuf::from("/usr/lib"));
            paths.push(PathBuf::from("/usr/local/lib"));
            paths.push(PathBuf::from("/opt/homebrew/lib"));
        }

        #[cfg(target_os = "windows")]
        {
            paths.push(PathBuf::from("C:\\Windows\\System32"));
            if let Ok(system_root) = std::env::var("SystemRoot") {
                paths.push(PathBuf::from(format!("{}\\System32", system_root)));
            }
        }

        if let Ok(cwd) = std::env::current_dir() {
            paths.insert(0, cwd);
        }

        paths
    }

    /// Candidate file names for a short library name, in priority order
    ///
    /// - Linux: lib{name}.so, {name}.so
    /// - macOS: lib{name}.dylib, lib{name}.so, {name}.dylib, {name}.so
    /// - Windows: {name}.dll, lib{name}.dll
    fn candidate_file_names(name: &str) -> Vec<String> {
        let extensions: &[&str] = if cfg!(target_os = "windows") {
            &["dll"]
        } else if cfg!(target_os = "macos") {
            &["dylib", "so"]
        } else {
            &["so"]
        };

        let prefixes: &[&str] = if cfg!(target_os = "windows") {
            &["", "lib"]
        } else {
            &["lib", ""]
        };

        prefixes
            .iter()
            .flat_map(|prefix| {
                extensions
                    .iter()
                    .map(move |ext| format!("{}{}.{}", prefix, name, ext))
            })
            .collect()
    }

    /// Resolve a library name or path to an existing file
    pub fn resolve(&self, name: &str) -> Option<PathBuf> {
        let path = Path::new(name);
        if (path.is_absolute() || path.components().count() > 1) && path.is_file() {
            return Some(path.to_path_buf());
        }

        let candidates = Self::candidate_file_names(name);
        self.search_paths.iter().find_map(|dir| {
            candidates
                .iter()
                .map(|file_name| dir.join(file_name))
                .find(|full_path| full_path.is_file())
        })
    }

    /// Add a search path with the highest priority
    pub fn add_search_path(&mut self, path: PathBuf) {
        self.search_paths.insert(0, path);
    }

    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }
}

impl Default for LibraryLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// `NativeBinding` over a loaded shared library
///
/// The entry points are resolved once at load time. The library stays loaded
/// for as long as the binding lives, which keeps the function pointers valid.
pub struct DynamicBinding {
    create_context: CreateContextFn,
    destroy_context: DestroyContextFn,
    request: RequestFn,
    read_string: ReadStringFn,
    destroy_string: DestroyStringFn,
    path: PathBuf,
    _library: Library,
}

impl DynamicBinding {
    /// Load `name` and resolve `<prefix>create_context`, `<prefix>destroy_context`,
    /// `<prefix>request`, `<prefix>read_string` and `<prefix>destroy_string`
    ///
    /// # Safety
    ///
    /// Loading a library runs its initialization code. The caller must trust
    /// the library and its exported signatures must match the protocol.
    pub fn open(
        name: &str,
        search_paths: &[PathBuf],
        symbol_prefix: &str,
    ) -> Result<Self, LoadError> {
        let loader = LibraryLoader::with_search_paths(search_paths);
        let path = loader
            .resolve(name)
            .ok_or_else(|| LoadError::LibraryNotFound(name.to_string()))?;

        let library =
            unsafe { Library::new(&path).map_err(|e| LoadError::LoadFailed(e.to_string()))? };

        unsafe {
            Ok(Self {
                create_context: lookup(&library, name, symbol_prefix, "create_context")?,
                destroy_context: lookup(&library, name, symbol_prefix, "destroy_context")?,
                request: lookup(&library, name, symbol_prefix, "request")?,
                read_string: lookup(&library, name, symbol_prefix, "read_string")?,
                destroy_string: lookup(&library, name, symbol_prefix, "destroy_string")?,
                path,
                _library: library,
            })
        }
    }

    /// Path the library was loaded from
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Copy an entry point out of the library
///
/// # Safety
///
/// `T` must match the symbol's real signature, and the copied pointer must
/// not outlive `library`.
unsafe fn lookup<T: Copy>(
    library: &Library,
    library_name: &str,
    prefix: &str,
    entry_point: &str,
) -> Result<T, LoadError> {
    let symbol_name = format!("{}{}", prefix, entry_point);
    library
        .get::<T>(symbol_name.as_bytes())
        .map(|symbol| *symbol)
        .map_err(|_| LoadError::SymbolNotFound {
            library: library_name.to_string(),
            symbol: symbol_name,
        })
}

impl NativeBinding for DynamicBinding {
    unsafe fn create_context(&self, config: StringData) -> *const StringHandle {
        (self.create_context)(config)
    }

    unsafe fn destroy_context(&self, context: ContextHandle) {
        (self.destroy_context)(context)
    }

    unsafe fn request(
        &self,
        context: ContextHandle,
        function_name: StringData,
        params_json: StringData,
        request_id: u32,
        handler: ResponseHandler,
    ) {
        (self.request)(context, function_name, params_json, request_id, handler)
    }

    unsafe fn read_string(&self, handle: *const StringHandle) -> StringData {
        (self.read_string)(handle)
    }

    unsafe fn destroy_string(&self, handle: *const StringHandle) {
        (self.destroy_string)(handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_default_search_paths_start_with_cwd() {
        let paths = LibraryLoader::default_search_paths();
        assert!(!paths.is_empty());

        if let Ok(cwd) = std::env::current_dir() {
            assert_eq!(paths[0], cwd);
        }
    }

    #[test]
    fn test_custom_search_paths_take_priority() {
        let custom = vec![PathBuf::from("/opt/a"), PathBuf::from("/opt/b")];
        let loader = LibraryLoader::with_search_paths(&custom);
        assert_eq!(&loader.search_paths()[..2], &custom[..]);
    }

    #[test]
    fn test_candidate_file_names() {
        let names = LibraryLoader::candidate_file_names("tonclient");

        #[cfg(target_os = "linux")]
        assert_eq!(names, vec!["libtonclient.so", "tonclient.so"]);

        #[cfg(target_os = "windows")]
        assert_eq!(names, vec!["tonclient.dll", "libtonclient.dll"]);

        assert!(!names.is_empty());
    }

    #[test]
    fn test_resolve_in_custom_search_path() {
        let dir = TempDir::new().unwrap();
        let file_name = LibraryLoader::candidate_file_names("fakebridge")[0].clone();
        let lib_path = dir.path().join(&file_name);
        fs::write(&lib_path, b"not really a library").unwrap();

        let loader = LibraryLoader::with_search_paths(&[dir.path().to_path_buf()]);
        assert_eq!(loader.resolve("fakebridge"), Some(lib_path.clone()));

        // Full paths resolve directly
        let full = lib_path.to_str().unwrap();
        assert_eq!(loader.resolve(full), Some(lib_path));
    }

    #[test]
    fn test_library_not_found() {
        let result = DynamicBinding::open("nonexistent_library_xyz", &[], "tc_");
        assert!(matches!(result, Err(LoadError::LibraryNotFound(_))));
    }

    #[test]
    fn test_load_failed_for_invalid_file() {
        let dir = TempDir::new().unwrap();
        let file_name = LibraryLoader::candidate_file_names("brokenlib")[0].clone();
        fs::write(dir.path().join(file_name), b"garbage").unwrap();

        let result = DynamicBinding::open("brokenlib", &[dir.path().to_path_buf()], "tc_");
        assert!(matches!(result, Err(LoadError::LoadFailed(_))));
    }

    #[test]
    fn test_load_error_display() {
        let err = LoadError::SymbolNotFound {
            library: "tonclient".to_string(),
            symbol: "tc_request".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Symbol 'tc_request' not found in library 'tonclient'"
        );
    }
}
