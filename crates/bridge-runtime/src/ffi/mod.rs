//! Foreign Function Interface (FFI) layer
//!
//! Everything that touches raw native memory lives here:
//! - C-compatible types of the native ABI (`types`)
//! - Caller-owned and native-owned string buffers (`marshal`)
//! - The `NativeBinding` seam over the native entry points (`binding`)
//! - Dynamic library loading (`loader`)
//!
//! # Safety
//!
//! Raw pointers are only dereferenced in this module. Callers outside it go
//! through `NativeBinding` and the owning string wrappers.

pub mod binding;
pub mod loader;
pub mod marshal;
pub mod types;

pub use binding::NativeBinding;
pub use loader::{DynamicBinding, LibraryLoader, LoadError};
pub use marshal::{NativeString, NativeStringBuffer};
pub use types::{ContextHandle, ResponseHandler, StringData, StringHandle};
